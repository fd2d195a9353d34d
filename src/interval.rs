//! Intervals between lattice points
//!
//! Ratio-based lattices (fractions, decimal ratios) compare intervals as
//! exact reduced ratios. Cents, string length and other lattices compare
//! cents differences within a tolerance.

use std::fmt;

use num::rational::Ratio;
use num_traits::{ToPrimitive, Zero};
use serde::{Serialize, Serializer};

use crate::lattice::pitch_value::decimal_to_cents;
use crate::lattice::PitchPoint;

/// Melodic direction of a sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Direction {
    /// Rising pitch
    Ascending,
    /// Falling pitch
    Descending,
}

/// Interval from one pitch point to the next
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Interval {
    /// Exact reduced frequency ratio
    Ratio(Ratio<u64>),
    /// Difference in cents
    Cents(f64),
}

impl Interval {
    /// Interval from `from` to `to`; `exact` selects ratio arithmetic.
    pub fn between(from: &PitchPoint, to: &PitchPoint, exact: bool) -> Self {
        if exact {
            if from.fraction.is_zero() {
                return Interval::Ratio(Ratio::zero());
            }
            Interval::Ratio(to.fraction / from.fraction)
        } else {
            Interval::Cents(to.cents - from.cents)
        }
    }

    /// Size of the interval in cents
    pub fn cents(&self) -> f64 {
        match self {
            Interval::Ratio(r) => decimal_to_cents(r.to_f64().unwrap_or(f64::NAN)),
            Interval::Cents(c) => *c,
        }
    }

    /// Whether this interval reproduces `target`: ratios must be equal,
    /// cents within `tolerance` either side.
    pub fn matches(&self, target: &Interval, tolerance: f64) -> bool {
        match (self, target) {
            (Interval::Ratio(a), Interval::Ratio(b)) => a == b,
            (Interval::Cents(a), Interval::Cents(b)) => (a - b).abs() <= tolerance + f64::EPSILON * 1024.0,
            _ => false,
        }
    }

    /// Whether this interval has grown past `target` in `direction`, so
    /// that no later candidate can match.
    pub fn overshoots(&self, target: &Interval, tolerance: f64, direction: Direction) -> bool {
        match (self, target) {
            (Interval::Ratio(a), Interval::Ratio(b)) => match direction {
                Direction::Ascending => a > b,
                Direction::Descending => a < b,
            },
            (Interval::Cents(a), Interval::Cents(b)) => b.abs() + tolerance < a.abs(),
            _ => false,
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Interval::Ratio(r) => write!(f, "{}/{}", r.numer(), r.denom()),
            Interval::Cents(c) => write!(f, "{c:.3}"),
        }
    }
}

impl Serialize for Interval {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Interval::Ratio(_) => serializer.collect_str(self),
            Interval::Cents(c) => serializer.serialize_f64(*c),
        }
    }
}

/// Successive intervals of a sequence of points
pub fn interval_pattern<'a>(points: impl IntoIterator<Item = &'a PitchPoint>, exact: bool) -> Vec<Interval> {
    let points: Vec<&PitchPoint> = points.into_iter().collect();
    points
        .windows(2)
        .map(|pair| Interval::between(pair[0], pair[1], exact))
        .collect()
}

/// Whether two interval patterns are pointwise equal under `tolerance`
pub fn patterns_match(a: &[Interval], b: &[Interval], tolerance: f64) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.matches(y, tolerance))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lattice::build_lattice;

    #[test]
    fn test_ratio_intervals_are_reduced() {
        let lattice = build_lattice(&["1/1", "9/8", "4/3", "3/2"], None, 0.0, 100.0, &[] as &[&str]);
        let p = lattice.points();
        assert_eq!(Interval::between(&p[5], &p[6], true), Interval::Ratio(Ratio::new(32, 27)));
        assert_eq!(Interval::between(&p[6], &p[5], true), Interval::Ratio(Ratio::new(27, 32)));
        assert_eq!(Interval::between(&p[4], &p[8], true), Interval::Ratio(Ratio::new(2, 1)));
        assert!((Interval::between(&p[4], &p[7], true).cents() - 701.955).abs() < 1e-3);
    }

    #[test]
    fn test_ratio_match_is_exact() {
        let tone = Interval::Ratio(Ratio::new(9, 8));
        assert!(tone.matches(&Interval::Ratio(Ratio::new(18, 16)), 50.0));
        assert!(!tone.matches(&Interval::Ratio(Ratio::new(10, 9)), 50.0));
        assert!(!tone.matches(&Interval::Cents(203.91), 50.0));
    }

    #[test]
    fn test_cents_tolerance_is_symmetric() {
        let target = Interval::Cents(200.0);
        assert!(Interval::Cents(205.0).matches(&target, 5.0));
        assert!(Interval::Cents(195.0).matches(&target, 5.0));
        assert!(!Interval::Cents(206.0).matches(&target, 5.0));
        assert!(!Interval::Cents(194.0).matches(&target, 5.0));
        assert!(Interval::Cents(-195.0).matches(&Interval::Cents(-200.0), 5.0));
    }

    #[test]
    fn test_overshoot() {
        let target = Interval::Ratio(Ratio::new(9, 8));
        assert!(Interval::Ratio(Ratio::new(6, 5)).overshoots(&target, 0.0, Direction::Ascending));
        assert!(!Interval::Ratio(Ratio::new(16, 15)).overshoots(&target, 0.0, Direction::Ascending));

        let down = Interval::Ratio(Ratio::new(8, 9));
        assert!(Interval::Ratio(Ratio::new(5, 6)).overshoots(&down, 0.0, Direction::Descending));
        assert!(!Interval::Ratio(Ratio::new(15, 16)).overshoots(&down, 0.0, Direction::Descending));

        let cents = Interval::Cents(-200.0);
        assert!(!Interval::Cents(-205.0).overshoots(&cents, 5.0, Direction::Descending));
        assert!(Interval::Cents(-206.0).overshoots(&cents, 5.0, Direction::Descending));
    }

    #[test]
    fn test_patterns_match() {
        let a = [Interval::Cents(200.0), Interval::Cents(100.0)];
        let b = [Interval::Cents(203.0), Interval::Cents(98.0)];
        assert!(patterns_match(&a, &b, 5.0));
        assert!(!patterns_match(&a, &b, 2.0));
        assert!(!patterns_match(&a, &b[..1], 5.0));
    }

    #[test]
    fn test_serialize() {
        assert_eq!(serde_json::to_string(&Interval::Ratio(Ratio::new(9, 8))).unwrap(), "\"9/8\"");
        assert_eq!(serde_json::to_string(&Interval::Cents(150.5)).unwrap(), "150.5");
    }
}
