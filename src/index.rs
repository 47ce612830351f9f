//! Bounding-box spatial index over [`IndexedEntity`] records.
//!
//! The index is an R*-tree from `rstar`. Every parent node's envelope bounds
//! the envelopes of its children, so a region query descends only into
//! subtrees whose bounds intersect the region.
//!
//! ## Query contract
//!
//! All queries return a *conservative superset*: an entity is returned when
//! its padded envelope intersects the query region, whether or not the
//! geometry itself does. Exact answers come from post-filtering with a
//! [`RelationshipEvaluator`], which [`SpatialIndex::search`] does in one step:
//!
//! 1. **Prune**: locate entities whose envelope intersects the query extent
//! 2. **Verify**: run the exact predicate on the surviving candidates only
//!
//! ## Lifecycle
//!
//! An index is either bulk loaded from a finite collection or created empty
//! and grown with [`SpatialIndex::insert`]. Entities are never removed or
//! updated. Queries borrow the index immutably while `insert` borrows it
//! mutably, so a live query iterator can never observe a mutation.
//!
//! ## Example
//!
//! ```rust
//! use feature_index::{Envelope, PointEntity, SpatialIndex, IndexConfig};
//! use geo::Point;
//!
//! let config = IndexConfig::default();
//! let entities = vec![
//!     PointEntity::new(Point::new(0.0, 0.0), 1, &config)?,
//!     PointEntity::new(Point::new(5.0, 5.0), 2, &config)?,
//!     PointEntity::new(Point::new(100.0, 100.0), 3, &config)?,
//! ];
//! let index = SpatialIndex::bulk_load(entities)?;
//!
//! let hits: Vec<u64> = index.query_point(5.0, 5.0).map(|e| e.object_id()).collect();
//! assert_eq!(hits, vec![2]);
//!
//! let region = Envelope::from_extent(0.0, 0.0, 10.0, 10.0)?;
//! let ids: Vec<u64> = index
//!     .query_region_sorted(&region)
//!     .iter()
//!     .map(|e| e.object_id())
//!     .collect();
//! assert_eq!(ids, vec![1, 2]);
//! # Ok::<(), feature_index::IndexError>(())
//! ```

use crate::config::{EmptyIndexPolicy, IndexConfig};
use crate::entity::{IndexedEntity, ObjectId, to_aabb};
use crate::error::{IndexError, Result};
use crate::geometry::{GeometryKind, GeometryType, geometry_extent};
use crate::relation::{GeometryEngine, Relationship, RelationshipEvaluator};
use feature_index_types::Envelope;
use geo::Geometry;
use rstar::{AABB, RTree};
use rustc_hash::FxHashSet;

/// R-tree index holding entities of a single geometry kind.
#[derive(Debug)]
pub struct SpatialIndex<G: GeometryKind> {
    tree: RTree<IndexedEntity<G>>,
    ids: FxHashSet<ObjectId>,
    config: IndexConfig,
}

/// Statistics about an index.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexStats {
    /// Geometry kind held by the index
    pub kind: GeometryType,
    /// Number of indexed entities
    pub entity_count: usize,
    /// Union of all entity envelopes, `None` when the index is empty
    pub bounds: Option<Envelope>,
}

impl<G: GeometryKind> SpatialIndex<G> {
    /// Create an empty index to be grown with [`SpatialIndex::insert`].
    ///
    /// The empty-input policy does not apply here; it governs bulk loading.
    pub fn new(config: IndexConfig) -> Result<Self> {
        config.validate()?;

        log::debug!("Created empty {} index", G::KIND);

        Ok(Self {
            tree: RTree::new(),
            ids: FxHashSet::default(),
            config,
        })
    }

    /// Build an index from `entities` using the default configuration.
    pub fn bulk_load<I>(entities: I) -> Result<Self>
    where
        I: IntoIterator<Item = IndexedEntity<G>>,
    {
        Self::bulk_load_with_config(entities, IndexConfig::default())
    }

    /// Build a balanced index from `entities` in O(n log n).
    ///
    /// # Errors
    ///
    /// * [`IndexError::DuplicateObjectId`] if two entities share an id; no index is built
    /// * [`IndexError::EmptyInput`] if `entities` is empty and the policy is
    ///   [`EmptyIndexPolicy::Reject`]
    pub fn bulk_load_with_config<I>(entities: I, config: IndexConfig) -> Result<Self>
    where
        I: IntoIterator<Item = IndexedEntity<G>>,
    {
        config.validate()?;

        let entities: Vec<_> = entities.into_iter().collect();
        if entities.is_empty() && config.empty_policy == EmptyIndexPolicy::Reject {
            return Err(IndexError::EmptyInput);
        }

        let mut ids = FxHashSet::default();
        ids.reserve(entities.len());
        for entity in &entities {
            if !ids.insert(entity.object_id()) {
                log::debug!(
                    "Rejecting bulk load: object id {} appears more than once",
                    entity.object_id()
                );
                return Err(IndexError::DuplicateObjectId(entity.object_id()));
            }
        }

        let count = entities.len();
        let tree = RTree::bulk_load(entities);

        log::debug!("Bulk loaded {} {} entities", count, G::KIND);

        Ok(Self { tree, ids, config })
    }

    /// Insert a single entity, extending ancestor envelopes along the way.
    ///
    /// On [`IndexError::DuplicateObjectId`] the index is left unchanged.
    pub fn insert(&mut self, entity: IndexedEntity<G>) -> Result<()> {
        let object_id = entity.object_id();
        if self.ids.contains(&object_id) {
            log::debug!("Rejecting insert of duplicate object id {}", object_id);
            return Err(IndexError::DuplicateObjectId(object_id));
        }

        self.ids.insert(object_id);
        self.tree.insert(entity);

        log::trace!("Inserted {} entity {}", G::KIND, object_id);
        Ok(())
    }

    /// Wrap `geometry` with this index's tolerance and insert it.
    pub fn insert_geometry(&mut self, geometry: G, object_id: ObjectId) -> Result<()> {
        let entity = IndexedEntity::new(geometry, object_id, &self.config)?;
        self.insert(entity)
    }

    /// Entities whose envelope intersects `region`, touching edges included.
    ///
    /// The iterator is lazy and may be restarted by calling this again.
    /// Results come in tree order; use [`SpatialIndex::query_region_sorted`]
    /// for a deterministic order.
    pub fn query_region(&self, region: &Envelope) -> impl Iterator<Item = &IndexedEntity<G>> + '_ {
        self.locate(to_aabb(region))
    }

    /// Same as [`SpatialIndex::query_region`], ordered by ascending object id.
    pub fn query_region_sorted(&self, region: &Envelope) -> Vec<&IndexedEntity<G>> {
        let mut results: Vec<_> = self.query_region(region).collect();
        results.sort();
        results
    }

    /// Entities whose envelope covers `(x, y)`.
    ///
    /// Equivalent to a region query with a zero-area region. Near-coincident
    /// points are caught by the tolerance padding on each entity. Non-finite
    /// coordinates match nothing.
    pub fn query_point(&self, x: f64, y: f64) -> impl Iterator<Item = &IndexedEntity<G>> + '_ {
        self.locate(AABB::from_point([x, y]))
    }

    /// Entities whose envelope intersects the square of half-side `distance`
    /// centred on `(x, y)`.
    ///
    /// # Errors
    ///
    /// * [`IndexError::InvalidTolerance`] if `distance` is negative or not finite
    /// * [`IndexError::InvalidExtent`] if the coordinates are not finite
    pub fn query_near(
        &self,
        x: f64,
        y: f64,
        distance: f64,
    ) -> Result<impl Iterator<Item = &IndexedEntity<G>> + '_> {
        if !distance.is_finite() || distance < 0.0 {
            return Err(IndexError::InvalidTolerance(distance));
        }

        let region = Envelope::from_point(x, y)?.padded(distance)?;
        Ok(self.locate(to_aabb(&region)))
    }

    /// Up to `k` entities ordered by the distance from `(x, y)` to their
    /// envelope.
    pub fn nearest(&self, x: f64, y: f64, k: usize) -> Vec<&IndexedEntity<G>> {
        if !x.is_finite() || !y.is_finite() {
            log::warn!("Rejecting nearest query with non-finite coordinates");
            return Vec::new();
        }

        self.tree.nearest_neighbor_iter(&[x, y]).take(k).collect()
    }

    /// Entities standing in `relationship` to `query`, ordered by object id.
    ///
    /// Candidates are pruned by the query's extent (padded by the index
    /// tolerance), then each one is checked with
    /// `evaluator.test(relationship, candidate, query)`. A query geometry
    /// without an extent matches nothing.
    pub fn search<E: GeometryEngine>(
        &self,
        query: &Geometry<f64>,
        relationship: Relationship,
        evaluator: &RelationshipEvaluator<E>,
    ) -> Result<Vec<&IndexedEntity<G>>> {
        let Some(extent) = geometry_extent(query) else {
            return Ok(Vec::new());
        };
        let region = extent.padded(self.config.tolerance)?;

        let mut candidates = 0usize;
        let mut matches: Vec<_> = self
            .query_region(&region)
            .inspect(|_| candidates += 1)
            .filter(|candidate| {
                evaluator.test(relationship, &candidate.geometry().to_geometry(), query)
            })
            .collect();
        matches.sort();

        log::trace!(
            "{} search: {} candidates, {} matches",
            relationship,
            candidates,
            matches.len()
        );

        Ok(matches)
    }

    fn locate(&self, region: AABB<[f64; 2]>) -> impl Iterator<Item = &IndexedEntity<G>> + '_ {
        self.tree.locate_in_envelope_intersecting(&region)
    }

    /// Number of indexed entities.
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    /// Whether the index holds no entities.
    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Whether an entity with `object_id` has been indexed.
    pub fn contains_id(&self, object_id: ObjectId) -> bool {
        self.ids.contains(&object_id)
    }

    /// All entities, in tree order.
    pub fn iter(&self) -> impl Iterator<Item = &IndexedEntity<G>> + '_ {
        self.tree.iter()
    }

    /// All entities, ordered by object id.
    pub fn iter_sorted(&self) -> Vec<&IndexedEntity<G>> {
        let mut entities: Vec<_> = self.tree.iter().collect();
        entities.sort();
        entities
    }

    /// Union of every entity envelope.
    pub fn bounds(&self) -> Option<Envelope> {
        if self.is_empty() {
            return None;
        }

        let aabb = self.tree.root().envelope();
        let (lower, upper) = (aabb.lower(), aabb.upper());
        Envelope::from_extent(lower[0], lower[1], upper[0], upper[1]).ok()
    }

    /// Get the configuration the index was built with.
    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    /// Geometry kind held by the index.
    pub fn kind(&self) -> GeometryType {
        G::KIND
    }

    /// Get index statistics.
    pub fn stats(&self) -> IndexStats {
        IndexStats {
            kind: G::KIND,
            entity_count: self.len(),
            bounds: self.bounds(),
        }
    }
}

impl<G: GeometryKind> Default for SpatialIndex<G> {
    fn default() -> Self {
        Self {
            tree: RTree::new(),
            ids: FxHashSet::default(),
            config: IndexConfig::default(),
        }
    }
}
