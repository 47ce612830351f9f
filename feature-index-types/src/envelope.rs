use geo::{Coord, Point, Rect};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while constructing or padding an [`Envelope`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EnvelopeError {
    #[error("Invalid extent: ({min_x}, {min_y}, {max_x}, {max_y})")]
    InvalidExtent {
        min_x: f64,
        min_y: f64,
        max_x: f64,
        max_y: f64,
    },
    #[error("Invalid tolerance: {0} (must be finite and >= 0)")]
    InvalidTolerance(f64),
}

/// A 2D axis-aligned bounding box.
///
/// All four bounds are finite and `min <= max` on both axes. The fields are
/// private so that the invariant holds for every value in circulation,
/// including deserialized ones.
///
/// Point containment and envelope intersection use different boundary rules:
/// [`Envelope::contains_point_2d`] is strict, [`Envelope::intersects`] is not.
/// A point lying exactly on an edge is therefore *not* contained, but a
/// zero-area envelope at the same position *does* intersect. Callers that want
/// boundary inclusion for containment pad the envelope first.
///
/// # Examples
///
/// ```
/// use feature_index_types::envelope::Envelope;
///
/// let a = Envelope::from_extent(0.0, 0.0, 10.0, 10.0).unwrap();
/// let b = Envelope::from_extent(10.0, 10.0, 20.0, 20.0).unwrap();
///
/// assert!(a.intersects(&b));
/// assert!(!a.contains_point_2d(10.0, 10.0));
/// assert!(a.padded(1e-6).unwrap().contains_point_2d(10.0, 10.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "EnvelopeRepr")]
pub struct Envelope {
    min_x: f64,
    min_y: f64,
    max_x: f64,
    max_y: f64,
}

#[derive(Deserialize)]
struct EnvelopeRepr {
    min_x: f64,
    min_y: f64,
    max_x: f64,
    max_y: f64,
}

impl TryFrom<EnvelopeRepr> for Envelope {
    type Error = EnvelopeError;

    fn try_from(repr: EnvelopeRepr) -> Result<Self, Self::Error> {
        Envelope::from_extent(repr.min_x, repr.min_y, repr.max_x, repr.max_y)
    }
}

impl Envelope {
    /// Create an envelope from its four bounds.
    ///
    /// # Errors
    ///
    /// Returns [`EnvelopeError::InvalidExtent`] if any bound is not finite or
    /// if a minimum exceeds its maximum.
    pub fn from_extent(
        min_x: f64,
        min_y: f64,
        max_x: f64,
        max_y: f64,
    ) -> Result<Self, EnvelopeError> {
        let finite = [min_x, min_y, max_x, max_y].iter().all(|v| v.is_finite());
        if !finite || min_x > max_x || min_y > max_y {
            return Err(EnvelopeError::InvalidExtent {
                min_x,
                min_y,
                max_x,
                max_y,
            });
        }

        Ok(Self {
            min_x,
            min_y,
            max_x,
            max_y,
        })
    }

    /// Create a zero-area envelope located at `(x, y)`.
    pub fn from_point(x: f64, y: f64) -> Result<Self, EnvelopeError> {
        Self::from_extent(x, y, x, y)
    }

    pub fn min_x(&self) -> f64 {
        self.min_x
    }

    pub fn min_y(&self) -> f64 {
        self.min_y
    }

    pub fn max_x(&self) -> f64 {
        self.max_x
    }

    pub fn max_y(&self) -> f64 {
        self.max_y
    }

    /// Extent along the x axis.
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Extent along the y axis.
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Center of the envelope.
    pub fn center(&self) -> Point<f64> {
        Point::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    /// True when the envelope has zero width or zero height.
    pub fn is_degenerate(&self) -> bool {
        self.width() == 0.0 || self.height() == 0.0
    }

    /// Return a copy expanded by `eps` on all four sides.
    ///
    /// # Errors
    ///
    /// Returns [`EnvelopeError::InvalidTolerance`] if `eps` is negative or not
    /// finite, and [`EnvelopeError::InvalidExtent`] if the padded bounds
    /// overflow to infinity.
    ///
    /// A positive `eps` always moves every bound outward by at least one
    /// representable step, even where `eps` is smaller than the float spacing
    /// at that coordinate.
    pub fn padded(&self, eps: f64) -> Result<Self, EnvelopeError> {
        if !eps.is_finite() || eps < 0.0 {
            return Err(EnvelopeError::InvalidTolerance(eps));
        }

        if eps == 0.0 {
            return Ok(*self);
        }

        Self::from_extent(
            pad_down(self.min_x, eps),
            pad_down(self.min_y, eps),
            pad_up(self.max_x, eps),
            pad_up(self.max_y, eps),
        )
    }

    /// Smallest envelope containing both `self` and `other`.
    pub fn union(&self, other: &Envelope) -> Envelope {
        Envelope {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    /// Strict point containment: the point must lie inside all four bounds.
    ///
    /// Points exactly on the boundary are rejected. Pad the envelope when
    /// on-boundary points should count.
    pub fn contains_point_2d(&self, x: f64, y: f64) -> bool {
        x > self.min_x && x < self.max_x && y > self.min_y && y < self.max_y
    }

    /// Axis-aligned overlap test. Touching edges or corners count as
    /// intersecting.
    pub fn intersects(&self, other: &Envelope) -> bool {
        !(self.max_x < other.min_x
            || self.min_x > other.max_x
            || self.max_y < other.min_y
            || self.min_y > other.max_y)
    }

    /// Convert to a `geo::Rect`.
    pub fn to_rect(&self) -> Rect<f64> {
        Rect::new(
            Coord {
                x: self.min_x,
                y: self.min_y,
            },
            Coord {
                x: self.max_x,
                y: self.max_y,
            },
        )
    }
}

impl TryFrom<Rect<f64>> for Envelope {
    type Error = EnvelopeError;

    fn try_from(rect: Rect<f64>) -> Result<Self, Self::Error> {
        let (min, max) = (rect.min(), rect.max());
        Envelope::from_extent(min.x, min.y, max.x, max.y)
    }
}

impl From<Envelope> for Rect<f64> {
    fn from(envelope: Envelope) -> Self {
        envelope.to_rect()
    }
}

fn pad_down(value: f64, eps: f64) -> f64 {
    let padded = value - eps;
    if padded < value { padded } else { value.next_down() }
}

fn pad_up(value: f64, eps: f64) -> f64 {
    let padded = value + eps;
    if padded > value { padded } else { value.next_up() }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Envelope {
        Envelope::from_extent(min_x, min_y, max_x, max_y).unwrap()
    }

    #[test]
    fn test_from_extent_rejects_inverted_bounds() {
        assert!(matches!(
            Envelope::from_extent(1.0, 0.0, 0.0, 1.0),
            Err(EnvelopeError::InvalidExtent { .. })
        ));
        assert!(matches!(
            Envelope::from_extent(0.0, 1.0, 1.0, 0.0),
            Err(EnvelopeError::InvalidExtent { .. })
        ));
    }

    #[test]
    fn test_from_extent_rejects_non_finite() {
        assert!(Envelope::from_extent(f64::NAN, 0.0, 1.0, 1.0).is_err());
        assert!(Envelope::from_extent(0.0, 0.0, f64::INFINITY, 1.0).is_err());
        assert!(Envelope::from_point(f64::NEG_INFINITY, 0.0).is_err());
    }

    #[test]
    fn test_padded() {
        let padded = env(0.0, 0.0, 1.0, 1.0).padded(0.5).unwrap();
        assert_eq!(padded, env(-0.5, -0.5, 1.5, 1.5));

        assert_eq!(
            env(0.0, 0.0, 1.0, 1.0).padded(-0.1),
            Err(EnvelopeError::InvalidTolerance(-0.1))
        );
        assert!(env(0.0, 0.0, 1.0, 1.0).padded(f64::NAN).is_err());
    }

    #[test]
    fn test_padding_makes_degenerate_envelope_non_degenerate() {
        let point = Envelope::from_point(3.0, 4.0).unwrap();
        assert!(point.is_degenerate());
        assert_eq!(point.width(), 0.0);

        let padded = point.padded(1e-6).unwrap();
        assert!(!padded.is_degenerate());
        assert!(padded.contains_point_2d(3.0, 4.0));
    }

    #[test]
    fn test_union_laws() {
        let a = env(0.0, 0.0, 2.0, 2.0);
        let b = env(1.0, -1.0, 3.0, 1.0);
        let c = env(-5.0, 4.0, -4.0, 6.0);

        assert_eq!(a.union(&b), b.union(&a));
        assert_eq!(a.union(&b).union(&c), a.union(&b.union(&c)));
        assert_eq!(a.union(&a), a);
        assert_eq!(a.union(&b), env(0.0, -1.0, 3.0, 2.0));
    }

    #[test]
    fn test_contains_point_is_strict() {
        let e = env(0.0, 0.0, 10.0, 10.0);
        assert!(e.contains_point_2d(5.0, 5.0));
        assert!(!e.contains_point_2d(0.0, 5.0));
        assert!(!e.contains_point_2d(10.0, 10.0));
        assert!(!e.contains_point_2d(11.0, 5.0));
    }

    #[test]
    fn test_intersects_is_inclusive() {
        let a = env(0.0, 0.0, 10.0, 10.0);
        assert!(a.intersects(&env(5.0, 5.0, 15.0, 15.0)));
        assert!(a.intersects(&env(10.0, 0.0, 20.0, 10.0)));
        assert!(a.intersects(&Envelope::from_point(10.0, 10.0).unwrap()));
        assert!(!a.intersects(&env(10.1, 0.0, 20.0, 10.0)));
    }

    #[test]
    fn test_rect_conversion() {
        let e = env(-74.1, 40.6, -73.9, 40.8);
        let rect = e.to_rect();
        assert_eq!(Envelope::try_from(rect).unwrap(), e);
        assert_eq!(e.center().x(), (-74.1 + -73.9) / 2.0);
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: Envelope =
            serde_json::from_str(r#"{"min_x":0.0,"min_y":0.0,"max_x":1.0,"max_y":2.0}"#).unwrap();
        assert_eq!(ok, env(0.0, 0.0, 1.0, 2.0));

        let bad = serde_json::from_str::<Envelope>(
            r#"{"min_x":5.0,"min_y":0.0,"max_x":1.0,"max_y":2.0}"#,
        );
        assert!(bad.is_err());
    }

    #[test]
    fn test_padding_survives_large_coordinates() {
        for x in [1e7, 2e10, 1e12, -1e15] {
            let env = Envelope::from_point(x, x).unwrap().padded(1e-6).unwrap();
            assert!(!env.is_degenerate(), "degenerate at {x}");
            assert!(env.contains_point_2d(x, x), "lost own point at {x}");
        }
    }

    #[test]
    fn test_padding_overflow_is_an_error() {
        let env = Envelope::from_point(f64::MAX, 0.0).unwrap();
        assert!(matches!(
            env.padded(1e-6),
            Err(EnvelopeError::InvalidExtent { .. })
        ));
        assert_eq!(env.padded(0.0).unwrap(), env);
    }
}
