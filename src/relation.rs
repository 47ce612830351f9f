//! Spatial relationship evaluation.
//!
//! The index answers "which envelopes overlap"; this module answers "does the
//! geometry actually stand in this relationship". Exact predicates are
//! delegated to a [`GeometryEngine`]; the default [`GeoEngine`] builds them
//! from the `geo` crate's DE-9IM matrix.
//!
//! Dispatch goes through a single lookup table keyed on
//! [`Relationship::canonical`]. `IndexIntersects` is an alias of `Intersects`
//! kept for callers that use the older name; the alias is resolved in
//! `canonical` and nowhere else, so both names always give the same answer.
//!
//! `EnvelopeIntersects` is evaluated locally from the two raw extents and is
//! an accepted approximation: two geometries far apart inside overlapping
//! bounding boxes still report `true`.

use crate::entity::IndexedEntity;
use crate::error::{IndexError, Result};
use crate::geometry::{GeometryKind, geometry_extent};
use geo::{Geometry, Intersects, Relate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Named spatial relationship between two geometries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relationship {
    Intersects,
    /// Alias of [`Relationship::Intersects`].
    IndexIntersects,
    /// Bounding boxes overlap; evaluated without the geometry engine.
    EnvelopeIntersects,
    Contains,
    Crosses,
    Overlaps,
    Touches,
    Within,
}

impl Relationship {
    pub const ALL: [Relationship; 8] = [
        Relationship::Intersects,
        Relationship::IndexIntersects,
        Relationship::EnvelopeIntersects,
        Relationship::Contains,
        Relationship::Crosses,
        Relationship::Overlaps,
        Relationship::Touches,
        Relationship::Within,
    ];

    /// The relationship actually evaluated for `self`.
    pub fn canonical(self) -> Relationship {
        match self {
            Relationship::IndexIntersects => Relationship::Intersects,
            other => other,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Relationship::Intersects => "intersects",
            Relationship::IndexIntersects => "index_intersects",
            Relationship::EnvelopeIntersects => "envelope_intersects",
            Relationship::Contains => "contains",
            Relationship::Crosses => "crosses",
            Relationship::Overlaps => "overlaps",
            Relationship::Touches => "touches",
            Relationship::Within => "within",
        }
    }
}

impl fmt::Display for Relationship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Relationship {
    type Err = IndexError;

    /// Case-insensitive; underscores, hyphens and spaces are ignored, so
    /// `"EnvelopeIntersects"`, `"envelope_intersects"` and
    /// `"envelope-intersects"` all parse.
    fn from_str(s: &str) -> Result<Self> {
        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .map(|c| c.to_ascii_lowercase())
            .collect();

        let relationship = match normalized.as_str() {
            "intersects" => Relationship::Intersects,
            "indexintersects" => Relationship::IndexIntersects,
            "envelopeintersects" => Relationship::EnvelopeIntersects,
            "contains" => Relationship::Contains,
            "crosses" => Relationship::Crosses,
            "overlaps" => Relationship::Overlaps,
            "touches" => Relationship::Touches,
            "within" => Relationship::Within,
            _ => return Err(IndexError::UnsupportedRelationship(s.to_string())),
        };

        Ok(relationship)
    }
}

/// Exact geometric predicates.
///
/// Implementations are treated as authoritative; the index only reduces how
/// often they are called.
pub trait GeometryEngine {
    fn intersects(&self, a: &Geometry<f64>, b: &Geometry<f64>) -> bool;
    /// `a` contains `b`.
    fn contains(&self, a: &Geometry<f64>, b: &Geometry<f64>) -> bool;
    fn crosses(&self, a: &Geometry<f64>, b: &Geometry<f64>) -> bool;
    fn overlaps(&self, a: &Geometry<f64>, b: &Geometry<f64>) -> bool;
    fn touches(&self, a: &Geometry<f64>, b: &Geometry<f64>) -> bool;
    /// `a` lies within `b`.
    fn within(&self, a: &Geometry<f64>, b: &Geometry<f64>) -> bool;
}

/// Geometry engine backed by the `geo` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct GeoEngine;

impl GeometryEngine for GeoEngine {
    fn intersects(&self, a: &Geometry<f64>, b: &Geometry<f64>) -> bool {
        a.intersects(b)
    }

    fn contains(&self, a: &Geometry<f64>, b: &Geometry<f64>) -> bool {
        a.relate(b).is_contains()
    }

    fn crosses(&self, a: &Geometry<f64>, b: &Geometry<f64>) -> bool {
        a.relate(b).is_crosses()
    }

    fn overlaps(&self, a: &Geometry<f64>, b: &Geometry<f64>) -> bool {
        a.relate(b).is_overlaps()
    }

    fn touches(&self, a: &Geometry<f64>, b: &Geometry<f64>) -> bool {
        a.relate(b).is_touches()
    }

    fn within(&self, a: &Geometry<f64>, b: &Geometry<f64>) -> bool {
        a.relate(b).is_within()
    }
}

type Predicate = fn(&dyn GeometryEngine, &Geometry<f64>, &Geometry<f64>) -> bool;

fn envelope_intersects(_: &dyn GeometryEngine, a: &Geometry<f64>, b: &Geometry<f64>) -> bool {
    match (geometry_extent(a), geometry_extent(b)) {
        (Some(a), Some(b)) => a.intersects(&b),
        _ => false,
    }
}

fn intersects(engine: &dyn GeometryEngine, a: &Geometry<f64>, b: &Geometry<f64>) -> bool {
    engine.intersects(a, b)
}

fn contains(engine: &dyn GeometryEngine, a: &Geometry<f64>, b: &Geometry<f64>) -> bool {
    engine.contains(a, b)
}

fn crosses(engine: &dyn GeometryEngine, a: &Geometry<f64>, b: &Geometry<f64>) -> bool {
    engine.crosses(a, b)
}

fn overlaps(engine: &dyn GeometryEngine, a: &Geometry<f64>, b: &Geometry<f64>) -> bool {
    engine.overlaps(a, b)
}

fn touches(engine: &dyn GeometryEngine, a: &Geometry<f64>, b: &Geometry<f64>) -> bool {
    engine.touches(a, b)
}

fn within(engine: &dyn GeometryEngine, a: &Geometry<f64>, b: &Geometry<f64>) -> bool {
    engine.within(a, b)
}

// Keyed on canonical relationships only.
static PREDICATES: &[(Relationship, Predicate)] = &[
    (Relationship::Intersects, intersects),
    (Relationship::EnvelopeIntersects, envelope_intersects),
    (Relationship::Contains, contains),
    (Relationship::Crosses, crosses),
    (Relationship::Overlaps, overlaps),
    (Relationship::Touches, touches),
    (Relationship::Within, within),
];

fn lookup(relationship: Relationship) -> Option<Predicate> {
    let key = relationship.canonical();
    PREDICATES
        .iter()
        .find(|(candidate, _)| *candidate == key)
        .map(|(_, predicate)| *predicate)
}

/// Maps a [`Relationship`] onto a predicate of the configured engine.
///
/// # Examples
///
/// ```
/// use feature_index::{Relationship, RelationshipEvaluator};
/// use geo::{Geometry, Point, polygon};
///
/// let evaluator = RelationshipEvaluator::new();
/// let square: Geometry<f64> = polygon![
///     (x: 0.0, y: 0.0), (x: 4.0, y: 0.0), (x: 4.0, y: 4.0), (x: 0.0, y: 4.0),
/// ].into();
/// let inside: Geometry<f64> = Point::new(1.0, 1.0).into();
///
/// assert!(evaluator.test(Relationship::Contains, &square, &inside));
/// assert!(evaluator.test(Relationship::Within, &inside, &square));
/// ```
#[derive(Debug, Clone)]
pub struct RelationshipEvaluator<E = GeoEngine> {
    engine: E,
}

impl RelationshipEvaluator<GeoEngine> {
    /// Evaluator backed by [`GeoEngine`].
    pub fn new() -> Self {
        Self { engine: GeoEngine }
    }
}

impl Default for RelationshipEvaluator<GeoEngine> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: GeometryEngine> RelationshipEvaluator<E> {
    /// Evaluator backed by a custom engine.
    pub fn with_engine(engine: E) -> Self {
        Self { engine }
    }

    /// Get the underlying geometry engine.
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Whether a predicate is registered for `relationship`.
    ///
    /// Every [`Relationship`] variant currently has one, so this only turns
    /// false if a variant is added without a table entry.
    pub fn supports(&self, relationship: Relationship) -> bool {
        lookup(relationship).is_some()
    }

    /// Evaluate `a <relationship> b`.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::UnsupportedRelationship`] when no predicate is
    /// registered for the relationship. No current variant lacks one; unknown
    /// names are rejected earlier, by [`RelationshipEvaluator::test_named`].
    pub fn try_test(
        &self,
        relationship: Relationship,
        a: &Geometry<f64>,
        b: &Geometry<f64>,
    ) -> Result<bool> {
        let predicate = lookup(relationship)
            .ok_or_else(|| IndexError::UnsupportedRelationship(relationship.to_string()))?;
        Ok(predicate(&self.engine, a, b))
    }

    /// Evaluate `a <relationship> b`, logging a warning and returning
    /// `false` for unsupported relationships.
    ///
    /// Every variant is supported today, so the fallback only matters for
    /// variants added without a predicate. Use
    /// [`RelationshipEvaluator::test_named`] for caller-supplied names.
    pub fn test(&self, relationship: Relationship, a: &Geometry<f64>, b: &Geometry<f64>) -> bool {
        match self.try_test(relationship, a, b) {
            Ok(result) => result,
            Err(err) => {
                log::warn!("{}; treating as no match", err);
                false
            }
        }
    }

    /// Parse `name` and evaluate it.
    ///
    /// Unknown names are logged and reported as
    /// [`IndexError::UnsupportedRelationship`]; callers that want the lenient
    /// behaviour can use `.unwrap_or(false)`.
    pub fn test_named(&self, name: &str, a: &Geometry<f64>, b: &Geometry<f64>) -> Result<bool> {
        let relationship = name.parse::<Relationship>().inspect_err(|err| {
            log::warn!("{}", err);
        })?;
        self.try_test(relationship, a, b)
    }

    /// Evaluate the relationship between the geometries of two entities.
    pub fn test_entities<A: GeometryKind, B: GeometryKind>(
        &self,
        relationship: Relationship,
        a: &IndexedEntity<A>,
        b: &IndexedEntity<B>,
    ) -> bool {
        self.test(
            relationship,
            &a.geometry().to_geometry(),
            &b.geometry().to_geometry(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IndexConfig;
    use crate::entity::{LineEntity, PolygonEntity};
    use geo::{LineString, Point, Polygon, line_string, polygon};
    use std::cell::Cell;

    fn square(min: f64, max: f64) -> Geometry<f64> {
        Geometry::Polygon(rect_polygon(min, min, max, max))
    }

    fn rect_polygon(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Polygon<f64> {
        polygon![
            (x: min_x, y: min_y),
            (x: max_x, y: min_y),
            (x: max_x, y: max_y),
            (x: min_x, y: max_y),
        ]
    }

    #[derive(Default)]
    struct CountingEngine {
        intersects: Cell<usize>,
        other: Cell<usize>,
    }

    impl CountingEngine {
        fn bump_other(&self) -> bool {
            self.other.set(self.other.get() + 1);
            true
        }
    }

    impl GeometryEngine for CountingEngine {
        fn intersects(&self, _: &Geometry<f64>, _: &Geometry<f64>) -> bool {
            self.intersects.set(self.intersects.get() + 1);
            true
        }
        fn contains(&self, _: &Geometry<f64>, _: &Geometry<f64>) -> bool {
            self.bump_other()
        }
        fn crosses(&self, _: &Geometry<f64>, _: &Geometry<f64>) -> bool {
            self.bump_other()
        }
        fn overlaps(&self, _: &Geometry<f64>, _: &Geometry<f64>) -> bool {
            self.bump_other()
        }
        fn touches(&self, _: &Geometry<f64>, _: &Geometry<f64>) -> bool {
            self.bump_other()
        }
        fn within(&self, _: &Geometry<f64>, _: &Geometry<f64>) -> bool {
            self.bump_other()
        }
    }

    #[test]
    fn test_every_relationship_is_supported() {
        let evaluator = RelationshipEvaluator::new();
        for relationship in Relationship::ALL {
            assert!(evaluator.supports(relationship), "{relationship} missing");
        }

        // Only string names can be unsupported.
        let point = Geometry::Point(Point::new(0.0, 0.0));
        for relationship in Relationship::ALL {
            assert!(evaluator.try_test(relationship, &point, &point).is_ok());
            assert!(evaluator.test_named(relationship.as_str(), &point, &point).is_ok());
        }
        assert!(matches!(
            evaluator.test_named("adjacent", &point, &point),
            Err(IndexError::UnsupportedRelationship(_))
        ));
    }

    #[test]
    fn test_index_intersects_is_an_alias() {
        assert_eq!(
            Relationship::IndexIntersects.canonical(),
            Relationship::Intersects
        );

        let evaluator = RelationshipEvaluator::with_engine(CountingEngine::default());
        let (a, b) = (square(0.0, 1.0), square(5.0, 6.0));

        assert!(evaluator.test(Relationship::Intersects, &a, &b));
        assert!(evaluator.test(Relationship::IndexIntersects, &a, &b));
        assert_eq!(evaluator.engine().intersects.get(), 2);
        assert_eq!(evaluator.engine().other.get(), 0);
    }

    #[test]
    fn test_envelope_intersects_skips_engine() {
        let evaluator = RelationshipEvaluator::with_engine(CountingEngine::default());

        assert!(evaluator.test(
            Relationship::EnvelopeIntersects,
            &square(0.0, 10.0),
            &square(5.0, 15.0)
        ));
        assert!(!evaluator.test(
            Relationship::EnvelopeIntersects,
            &square(0.0, 1.0),
            &square(5.0, 6.0)
        ));
        assert_eq!(evaluator.engine().intersects.get(), 0);
        assert_eq!(evaluator.engine().other.get(), 0);
    }

    #[test]
    fn test_envelope_intersects_with_empty_geometry() {
        let evaluator = RelationshipEvaluator::new();
        let empty = Geometry::LineString(LineString::new(vec![]));
        assert!(!evaluator.test(Relationship::EnvelopeIntersects, &empty, &square(0.0, 1.0)));
    }

    #[test]
    fn test_geo_engine_predicates() {
        let evaluator = RelationshipEvaluator::new();
        let big = square(0.0, 4.0);
        let small = square(1.0, 2.0);
        let neighbour = Geometry::Polygon(rect_polygon(4.0, 0.0, 8.0, 4.0));
        let shifted = square(2.0, 6.0);
        let crossing = Geometry::LineString(line_string![(x: -1.0, y: 1.0), (x: 1.0, y: 1.0)]);

        assert!(evaluator.test(Relationship::Contains, &big, &small));
        assert!(!evaluator.test(Relationship::Contains, &small, &big));
        assert!(evaluator.test(Relationship::Within, &small, &big));

        assert!(evaluator.test(Relationship::Touches, &big, &neighbour));
        assert!(!evaluator.test(Relationship::Overlaps, &big, &neighbour));
        assert!(evaluator.test(Relationship::Intersects, &big, &neighbour));

        assert!(evaluator.test(Relationship::Overlaps, &big, &shifted));
        assert!(!evaluator.test(Relationship::Touches, &big, &shifted));

        assert!(evaluator.test(Relationship::Crosses, &crossing, &big));
        assert!(!evaluator.test(Relationship::Crosses, &small, &big));
    }

    #[test]
    fn test_envelope_approximation_differs_from_exact() {
        let evaluator = RelationshipEvaluator::new();
        let a = Geometry::Polygon(polygon![(x: 0.0, y: 0.0), (x: 10.0, y: 0.0), (x: 0.0, y: 10.0)]);
        let b =
            Geometry::Polygon(polygon![(x: 15.0, y: 15.0), (x: 5.0, y: 15.0), (x: 15.0, y: 5.0)]);

        assert!(evaluator.test(Relationship::EnvelopeIntersects, &a, &b));
        assert!(!evaluator.test(Relationship::Intersects, &a, &b));
    }

    #[test]
    fn test_parse_names() {
        assert_eq!(
            "intersects".parse::<Relationship>().unwrap(),
            Relationship::Intersects
        );
        assert_eq!(
            "IndexIntersects".parse::<Relationship>().unwrap(),
            Relationship::IndexIntersects
        );
        assert_eq!(
            "envelope_intersects".parse::<Relationship>().unwrap(),
            Relationship::EnvelopeIntersects
        );
        assert_eq!("WITHIN".parse::<Relationship>().unwrap(), Relationship::Within);

        for relationship in Relationship::ALL {
            assert_eq!(
                relationship.to_string().parse::<Relationship>().unwrap(),
                relationship
            );
        }
    }

    #[test]
    fn test_named_unknown_relationship() {
        let evaluator = RelationshipEvaluator::new();
        let result = evaluator.test_named("relation", &square(0.0, 1.0), &square(0.0, 1.0));
        assert!(matches!(
            result,
            Err(IndexError::UnsupportedRelationship(name)) if name == "relation"
        ));

        let ok = evaluator.test_named("touches", &square(0.0, 1.0), &square(1.0, 2.0));
        assert!(ok.unwrap());
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&Relationship::EnvelopeIntersects).unwrap();
        assert_eq!(json, "\"envelope_intersects\"");
        let parsed: Relationship = serde_json::from_str("\"index_intersects\"").unwrap();
        assert_eq!(parsed, Relationship::IndexIntersects);
    }

    #[test]
    fn test_entities() {
        let config = IndexConfig::default();
        let road = LineEntity::new(line_string![(x: -1.0, y: 2.0), (x: 5.0, y: 2.0)], 1, &config)
            .unwrap();
        let parcel = PolygonEntity::new(rect_polygon(0.0, 0.0, 4.0, 4.0), 2, &config).unwrap();
        let far = Point::new(50.0, 50.0);

        let evaluator = RelationshipEvaluator::new();
        assert!(evaluator.test_entities(Relationship::Crosses, &road, &parcel));
        assert!(!evaluator.test(
            Relationship::Intersects,
            &Geometry::Point(far),
            &parcel.geometry().to_geometry()
        ));
    }
}
