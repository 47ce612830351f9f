//! Thread-safe wrapper for sharing one index between threads.
//!
//! `SpatialIndex` itself is meant for single-threaded ownership. `SharedIndex`
//! wraps it in `Arc<RwLock<_>>` so that inserts take the lock exclusively and
//! queries share it. Query results are returned as owned object ids because a
//! borrowed iterator cannot outlive the read guard.
//!
//! # Features
//!
//! Enabled by the `sync` feature (on by default):
//!
//! ```toml
//! [dependencies]
//! feature-index = { version = "0.1", features = ["sync"] }
//! ```
//!
//! # Examples
//!
//! ```rust
//! use feature_index::{IndexConfig, SharedIndex};
//! use geo::Point;
//! use std::thread;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let index = SharedIndex::<Point<f64>>::new(IndexConfig::default())?;
//!
//! let writer = index.clone();
//! let handle = thread::spawn(move || writer.insert_geometry(Point::new(1.0, 1.0), 1));
//! handle.join().unwrap()?;
//!
//! assert_eq!(index.query_point_ids(1.0, 1.0), vec![1]);
//! # Ok(())
//! # }
//! ```

use crate::config::IndexConfig;
use crate::entity::{IndexedEntity, ObjectId};
use crate::error::Result;
use crate::geometry::GeometryKind;
use crate::index::{IndexStats, SpatialIndex};
use crate::relation::{GeometryEngine, Relationship, RelationshipEvaluator};
use feature_index_types::Envelope;
use geo::Geometry;
use parking_lot::RwLock;
use std::sync::Arc;

/// Single-writer, multi-reader handle around a [`SpatialIndex`].
///
/// - Implements `Clone`; clones share the same index
/// - `insert` waits for in-progress queries and blocks new ones until done
/// - Queries run concurrently with each other
pub struct SharedIndex<G: GeometryKind> {
    inner: Arc<RwLock<SpatialIndex<G>>>,
}

impl<G: GeometryKind> Clone for SharedIndex<G> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<G: GeometryKind> SharedIndex<G> {
    /// Creates an empty shared index.
    pub fn new(config: IndexConfig) -> Result<Self> {
        Ok(Self::from_index(SpatialIndex::new(config)?))
    }

    /// Bulk loads entities into a shared index.
    pub fn bulk_load<I>(entities: I, config: IndexConfig) -> Result<Self>
    where
        I: IntoIterator<Item = IndexedEntity<G>>,
    {
        Ok(Self::from_index(SpatialIndex::bulk_load_with_config(
            entities, config,
        )?))
    }

    /// Takes ownership of an existing index.
    pub fn from_index(index: SpatialIndex<G>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(index)),
        }
    }

    // ===== Mutation (exclusive lock) =====

    /// Insert an entity under the exclusive lock.
    pub fn insert(&self, entity: IndexedEntity<G>) -> Result<()> {
        self.inner.write().insert(entity)
    }

    /// Wrap and insert a geometry under the exclusive lock.
    pub fn insert_geometry(&self, geometry: G, object_id: ObjectId) -> Result<()> {
        self.inner.write().insert_geometry(geometry, object_id)
    }

    // ===== Queries (shared lock) =====

    /// Object ids from [`SpatialIndex::query_region`], ascending.
    pub fn query_region_ids(&self, region: &Envelope) -> Vec<ObjectId> {
        let guard = self.inner.read();
        sorted_ids(guard.query_region(region))
    }

    /// Object ids from [`SpatialIndex::query_point`], ascending.
    pub fn query_point_ids(&self, x: f64, y: f64) -> Vec<ObjectId> {
        let guard = self.inner.read();
        sorted_ids(guard.query_point(x, y))
    }

    /// Object ids from [`SpatialIndex::search`], ascending.
    pub fn search_ids<E: GeometryEngine>(
        &self,
        query: &Geometry<f64>,
        relationship: Relationship,
        evaluator: &RelationshipEvaluator<E>,
    ) -> Result<Vec<ObjectId>> {
        let guard = self.inner.read();
        let matches = guard.search(query, relationship, evaluator)?;
        Ok(matches.iter().map(|e| e.object_id()).collect())
    }

    /// Runs `f` against the index under the shared lock.
    pub fn read<R>(&self, f: impl FnOnce(&SpatialIndex<G>) -> R) -> R {
        f(&self.inner.read())
    }

    /// Number of indexed entities.
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    /// Whether the index holds no entities.
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// Get index statistics.
    pub fn stats(&self) -> IndexStats {
        self.inner.read().stats()
    }
}

fn sorted_ids<'a, G: GeometryKind + 'a>(
    entities: impl Iterator<Item = &'a IndexedEntity<G>>,
) -> Vec<ObjectId> {
    let mut ids: Vec<_> = entities.map(|e| e.object_id()).collect();
    ids.sort_unstable();
    ids
}
