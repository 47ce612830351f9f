//! # feature-index-types
//!
//! Value types shared by the `feature-index` crate.
//!
//! - **Envelope**: a validated 2D axis-aligned bounding box with union,
//!   padding, strict point containment and inclusive intersection.
//!
//! The type is serializable with Serde and converts to and from the `geo`
//! crate's `Rect`.
//!
//! ## Examples
//!
//! ```rust
//! use feature_index_types::envelope::Envelope;
//!
//! let a = Envelope::from_extent(0.0, 0.0, 10.0, 10.0).unwrap();
//! let b = Envelope::from_extent(5.0, 5.0, 15.0, 15.0).unwrap();
//!
//! let both = a.union(&b);
//! assert_eq!(both.max_x(), 15.0);
//! ```

pub mod envelope;

pub use envelope::{Envelope, EnvelopeError};
