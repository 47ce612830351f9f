//! Geometry kinds accepted by the index.
//!
//! [`GeometryKind`] is the extent-provider capability: it reports the
//! axis-aligned bounds of a geometry and a tag naming its kind. One
//! implementation per `geo` type lets a single generic entity type replace
//! separate point, line and polygon wrappers.

use feature_index_types::Envelope;
use geo::{
    BoundingRect, Geometry, LineString, MultiLineString, MultiPolygon, Point, Polygon, Rect,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind tag for indexed geometries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeometryType {
    Point,
    Line,
    Polygon,
}

impl fmt::Display for GeometryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GeometryType::Point => "point",
            GeometryType::Line => "line",
            GeometryType::Polygon => "polygon",
        };
        f.write_str(name)
    }
}

/// A geometry that can be wrapped in an index entity.
///
/// `extent` must be deterministic and free of side effects. It returns `None`
/// for geometries without vertices.
pub trait GeometryKind {
    const KIND: GeometryType;

    fn extent(&self) -> Option<Rect<f64>>;

    /// Owned copy handed to the exact geometry engine.
    fn to_geometry(&self) -> Geometry<f64>;
}

impl GeometryKind for Point<f64> {
    const KIND: GeometryType = GeometryType::Point;

    fn extent(&self) -> Option<Rect<f64>> {
        Some(self.bounding_rect())
    }

    fn to_geometry(&self) -> Geometry<f64> {
        Geometry::Point(*self)
    }
}

impl GeometryKind for LineString<f64> {
    const KIND: GeometryType = GeometryType::Line;

    fn extent(&self) -> Option<Rect<f64>> {
        self.bounding_rect()
    }

    fn to_geometry(&self) -> Geometry<f64> {
        Geometry::LineString(self.clone())
    }
}

impl GeometryKind for MultiLineString<f64> {
    const KIND: GeometryType = GeometryType::Line;

    fn extent(&self) -> Option<Rect<f64>> {
        self.bounding_rect()
    }

    fn to_geometry(&self) -> Geometry<f64> {
        Geometry::MultiLineString(self.clone())
    }
}

impl GeometryKind for Polygon<f64> {
    const KIND: GeometryType = GeometryType::Polygon;

    fn extent(&self) -> Option<Rect<f64>> {
        self.bounding_rect()
    }

    fn to_geometry(&self) -> Geometry<f64> {
        Geometry::Polygon(self.clone())
    }
}

impl GeometryKind for MultiPolygon<f64> {
    const KIND: GeometryType = GeometryType::Polygon;

    fn extent(&self) -> Option<Rect<f64>> {
        self.bounding_rect()
    }

    fn to_geometry(&self) -> Geometry<f64> {
        Geometry::MultiPolygon(self.clone())
    }
}

/// Raw, unpadded extent of an arbitrary geometry.
///
/// Returns `None` for empty geometries and for geometries with non-finite
/// coordinates.
pub fn geometry_extent(geometry: &Geometry<f64>) -> Option<Envelope> {
    geometry
        .bounding_rect()
        .and_then(|rect| Envelope::try_from(rect).ok())
}
