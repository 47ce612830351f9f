//! Tolerance-aware spatial index for point, line and polygon features.
//!
//! Geometries are wrapped in [`IndexedEntity`] records whose envelopes are
//! padded by a configurable tolerance, bulk loaded into an R-tree backed
//! [`SpatialIndex`], and queried by region or point. Queries return a
//! superset of the true matches; [`RelationshipEvaluator`] refines candidates
//! with exact predicates from the `geo` crate or any other [`GeometryEngine`].
//!
//! ```rust
//! use feature_index::{IndexConfig, PolygonEntity, Relationship, RelationshipEvaluator, SpatialIndex};
//! use geo::{Geometry, Point, polygon};
//!
//! let config = IndexConfig::default();
//! let parcel = polygon![(x: 0.0, y: 0.0), (x: 4.0, y: 0.0), (x: 4.0, y: 4.0), (x: 0.0, y: 4.0)];
//! let index = SpatialIndex::bulk_load(vec![PolygonEntity::new(parcel, 42, &config)?])?;
//!
//! let evaluator = RelationshipEvaluator::new();
//! let query = Geometry::Point(Point::new(1.0, 1.0));
//! let hits = index.search(&query, Relationship::Contains, &evaluator)?;
//! assert_eq!(hits[0].object_id(), 42);
//! # Ok::<(), feature_index::IndexError>(())
//! ```

pub mod config;
pub mod entity;
pub mod error;
pub mod geometry;
pub mod index;
pub mod relation;

#[cfg(feature = "sync")]
pub mod sync;

pub use config::{DEFAULT_TOLERANCE, EmptyIndexPolicy, IndexConfig};
pub use entity::{IndexedEntity, LineEntity, ObjectId, PointEntity, PolygonEntity};
pub use error::{IndexError, Result};
pub use geometry::{GeometryKind, GeometryType, geometry_extent};
pub use index::{IndexStats, SpatialIndex};
pub use relation::{GeoEngine, GeometryEngine, Relationship, RelationshipEvaluator};

#[cfg(feature = "sync")]
pub use sync::SharedIndex;

pub use feature_index_types::{Envelope, EnvelopeError};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common imports
pub mod prelude {

    pub use crate::{Envelope, IndexConfig, IndexError, Result, SpatialIndex};

    pub use crate::{IndexedEntity, LineEntity, ObjectId, PointEntity, PolygonEntity};

    pub use crate::{GeoEngine, GeometryEngine, Relationship, RelationshipEvaluator};

    #[cfg(feature = "sync")]
    pub use crate::SharedIndex;

    pub use geo::{Geometry, LineString, Point, Polygon};
}
