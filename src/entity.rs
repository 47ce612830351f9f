//! Indexable entity wrappers.
//!
//! An [`IndexedEntity`] pairs an object id with an owned geometry and a
//! padded envelope computed once at construction. The envelope is never
//! recomputed, so the geometry must not change after the entity is built.
//! The type hands out only shared references to its geometry, which keeps
//! that precondition inside the API; rebuilding an entity under a new object
//! id is the supported way to index a changed geometry.

use crate::config::IndexConfig;
use crate::error::{IndexError, Result};
use crate::geometry::{GeometryKind, GeometryType};
use feature_index_types::Envelope;
use geo::{LineString, Point, Polygon};
use rstar::{AABB, PointDistance, RTreeObject};
use std::cmp::Ordering;

/// Stable identifier of an indexed feature, unique within one index.
pub type ObjectId = u64;

/// A geometry wrapped for indexing.
///
/// Equality and ordering consider the object id only.
#[derive(Debug, Clone)]
pub struct IndexedEntity<G: GeometryKind> {
    object_id: ObjectId,
    geometry: G,
    envelope: Envelope,
}

pub type PointEntity = IndexedEntity<Point<f64>>;
pub type LineEntity = IndexedEntity<LineString<f64>>;
pub type PolygonEntity = IndexedEntity<Polygon<f64>>;

impl<G: GeometryKind> IndexedEntity<G> {
    /// Wrap `geometry`, padding its extent by the configured tolerance.
    ///
    /// # Errors
    ///
    /// * [`IndexError::InvalidTolerance`] if the configured tolerance is negative or not finite
    /// * [`IndexError::InvalidGeometry`] if the geometry has no vertices or non-finite coordinates
    pub fn new(geometry: G, object_id: ObjectId, config: &IndexConfig) -> Result<Self> {
        Self::with_tolerance(geometry, object_id, config.tolerance)
    }

    /// Wrap `geometry`, padding its extent by `tolerance` on all four sides.
    ///
    /// # Examples
    ///
    /// ```
    /// use feature_index::entity::PointEntity;
    /// use geo::Point;
    ///
    /// let entity = PointEntity::with_tolerance(Point::new(5.0, 5.0), 2, 1e-6).unwrap();
    /// assert!(entity.envelope().contains_point_2d(5.0, 5.0));
    /// ```
    pub fn with_tolerance(geometry: G, object_id: ObjectId, tolerance: f64) -> Result<Self> {
        if !tolerance.is_finite() || tolerance < 0.0 {
            return Err(IndexError::InvalidTolerance(tolerance));
        }

        let rect = geometry.extent().ok_or_else(|| {
            IndexError::InvalidGeometry(format!(
                "{} geometry for object {} has no vertices",
                G::KIND,
                object_id
            ))
        })?;

        let extent = Envelope::try_from(rect).map_err(|_| {
            IndexError::InvalidGeometry(format!(
                "{} geometry for object {} has non-finite coordinates",
                G::KIND,
                object_id
            ))
        })?;

        Ok(Self {
            object_id,
            geometry,
            envelope: extent.padded(tolerance)?,
        })
    }

    /// Identifier supplied at construction.
    pub fn object_id(&self) -> ObjectId {
        self.object_id
    }

    /// Get the wrapped geometry.
    pub fn geometry(&self) -> &G {
        &self.geometry
    }

    /// Padded envelope frozen at construction.
    pub fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    /// Kind tag of the wrapped geometry.
    pub fn kind(&self) -> GeometryType {
        G::KIND
    }

    /// Unwrap the entity, returning the geometry.
    pub fn into_geometry(self) -> G {
        self.geometry
    }
}

impl<G: GeometryKind> PartialEq for IndexedEntity<G> {
    fn eq(&self, other: &Self) -> bool {
        self.object_id == other.object_id
    }
}

impl<G: GeometryKind> Eq for IndexedEntity<G> {}

impl<G: GeometryKind> PartialOrd for IndexedEntity<G> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<G: GeometryKind> Ord for IndexedEntity<G> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.object_id.cmp(&other.object_id)
    }
}

pub(crate) fn to_aabb(envelope: &Envelope) -> AABB<[f64; 2]> {
    AABB::from_corners(
        [envelope.min_x(), envelope.min_y()],
        [envelope.max_x(), envelope.max_y()],
    )
}

impl<G: GeometryKind> RTreeObject for IndexedEntity<G> {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        to_aabb(&self.envelope)
    }
}

// Distance to the envelope, not the geometry: nearest-neighbour results are
// candidates just like region query results.
impl<G: GeometryKind> PointDistance for IndexedEntity<G> {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        to_aabb(&self.envelope).distance_2(point)
    }
}
