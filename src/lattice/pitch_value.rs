//! Pitch value representations
//!
//! Tuning systems document one octave of pitch values in one of four
//! notations. This module detects which one, parses it, shifts it by octaves
//! in its own arithmetic and converts it to a decimal frequency ratio.

use std::fmt;

use num::rational::Ratio;
use num_traits::ToPrimitive;
use serde::{Deserialize, Serialize, Serializer};

/// Largest denominator used when approximating a decimal ratio by a fraction
pub const MAX_APPROXIMATION_DENOMINATOR: u64 = 64;

/// Notation a tuning system's pitch values are written in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ValueKind {
    /// Frequency ratio fraction, "n/d"
    Fraction,
    /// Cents above the tonic
    Cents,
    /// Frequency ratio as a decimal number
    DecimalRatio,
    /// Vibrating string length, shorter is higher
    StringLength,
}

impl ValueKind {
    /// Detect the notation of a list of values.
    ///
    /// Returns `None` when the values fit none of the notations.
    pub fn detect<S: AsRef<str>>(values: &[S]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }

        if values.iter().all(|v| parse_fraction(v.as_ref()).is_some()) {
            return Some(ValueKind::Fraction);
        }

        let numbers = values
            .iter()
            .map(|v| parse_number(v.as_ref()))
            .collect::<Option<Vec<f64>>>()?;

        let ascending = numbers.windows(2).all(|w| w[0] < w[1]);
        let descending = numbers.windows(2).all(|w| w[0] > w[1]);

        if ascending && numbers.iter().all(|&n| (1.0..2.0).contains(&n)) {
            Some(ValueKind::DecimalRatio)
        } else if ascending && numbers.iter().all(|&n| (0.0..1200.0).contains(&n)) {
            Some(ValueKind::Cents)
        } else if descending && numbers.iter().all(|&n| n > 0.0) {
            Some(ValueKind::StringLength)
        } else {
            None
        }
    }

    /// Whether intervals in this notation compare as exact ratios
    pub fn is_ratio(self) -> bool {
        matches!(self, ValueKind::Fraction | ValueKind::DecimalRatio)
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ValueKind::Fraction => "fraction",
            ValueKind::Cents => "cents",
            ValueKind::DecimalRatio => "decimalRatio",
            ValueKind::StringLength => "stringLength",
        };
        f.write_str(s)
    }
}

/// A single pitch value in its documented notation
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PitchValue {
    /// Exact frequency ratio
    Fraction(Ratio<u64>),
    /// Cents above the tonic
    Cents(f64),
    /// Decimal frequency ratio
    DecimalRatio(f64),
    /// String length
    StringLength(f64),
}

impl PitchValue {
    /// Parse `text` as a value of `kind`.
    pub fn parse(text: &str, kind: ValueKind) -> Option<Self> {
        match kind {
            ValueKind::Fraction => parse_fraction(text).map(PitchValue::Fraction),
            ValueKind::Cents => parse_number(text).map(PitchValue::Cents),
            ValueKind::DecimalRatio => parse_number(text).filter(|&n| n > 0.0).map(PitchValue::DecimalRatio),
            ValueKind::StringLength => parse_number(text).filter(|&n| n > 0.0).map(PitchValue::StringLength),
        }
    }

    /// Notation of this value
    pub fn kind(&self) -> ValueKind {
        match self {
            PitchValue::Fraction(_) => ValueKind::Fraction,
            PitchValue::Cents(_) => ValueKind::Cents,
            PitchValue::DecimalRatio(_) => ValueKind::DecimalRatio,
            PitchValue::StringLength(_) => ValueKind::StringLength,
        }
    }

    /// Shift by whole octaves (negative is down).
    pub fn shift_octaves(self, octaves: i32) -> Self {
        let factor = 2f64.powi(octaves);
        match self {
            PitchValue::Fraction(r) => {
                let power = Ratio::from_integer(1u64 << octaves.unsigned_abs());
                if octaves >= 0 {
                    PitchValue::Fraction(r * power)
                } else {
                    PitchValue::Fraction(r / power)
                }
            }
            PitchValue::Cents(c) => PitchValue::Cents(c + 1200.0 * octaves as f64),
            PitchValue::DecimalRatio(d) => PitchValue::DecimalRatio(d * factor),
            PitchValue::StringLength(l) => PitchValue::StringLength(l / factor),
        }
    }

    /// Decimal frequency ratio relative to the tonic.
    ///
    /// String lengths are taken relative to `reference_string_length`.
    pub fn decimal_ratio(&self, reference_string_length: f64) -> f64 {
        match self {
            PitchValue::Fraction(r) => r.to_f64().unwrap_or(f64::NAN),
            PitchValue::Cents(c) => 2f64.powf(c / 1200.0),
            PitchValue::DecimalRatio(d) => *d,
            PitchValue::StringLength(l) => reference_string_length / l,
        }
    }

    /// Exact fraction for fractions, a bounded-denominator approximation
    /// otherwise.
    pub fn fraction(&self, reference_string_length: f64) -> Ratio<u64> {
        match self {
            PitchValue::Fraction(r) => *r,
            other => approximate_fraction(other.decimal_ratio(reference_string_length), MAX_APPROXIMATION_DENOMINATOR),
        }
    }
}

impl fmt::Display for PitchValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PitchValue::Fraction(r) => write!(f, "{}/{}", r.numer(), r.denom()),
            PitchValue::Cents(c) => write!(f, "{c}"),
            PitchValue::DecimalRatio(d) => write!(f, "{d}"),
            PitchValue::StringLength(l) => write!(f, "{l}"),
        }
    }
}

impl Serialize for PitchValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Serialize an exact ratio as "n/d".
pub(crate) fn serialize_ratio<S: Serializer>(ratio: &Ratio<u64>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&format_args!("{}/{}", ratio.numer(), ratio.denom()))
}

/// Convert a decimal frequency ratio to cents.
pub fn decimal_to_cents(decimal: f64) -> f64 {
    1200.0 * decimal.log2()
}

/// Closest fraction to `value` with a denominator of at most `max_denominator`.
/// Ties keep the smaller denominator.
pub fn approximate_fraction(value: f64, max_denominator: u64) -> Ratio<u64> {
    if !value.is_finite() || value <= 0.0 {
        return Ratio::from_integer(0);
    }

    let mut best = (u64::MAX, 1u64, f64::INFINITY);
    for denominator in 1..=max_denominator.max(1) {
        let numerator = (value * denominator as f64).round().max(1.0) as u64;
        let error = (numerator as f64 / denominator as f64 - value).abs();
        if error < best.2 {
            best = (numerator, denominator, error);
        }
    }
    Ratio::new(best.0, best.1)
}

fn parse_fraction(text: &str) -> Option<Ratio<u64>> {
    let (n, d) = text.trim().split_once(['/', ':'])?;
    let n: u64 = n.trim().parse().ok()?;
    let d: u64 = d.trim().parse().ok()?;
    if n == 0 || d == 0 {
        return None;
    }
    Some(Ratio::new(n, d))
}

fn parse_number(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}
