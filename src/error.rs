//! Error taxonomy for the analysis core.
//!
//! Unsupported input (undetectable pitch values, unknown starting notes)
//! produces empty results instead of errors, and an exhausted route search is
//! a [`crate::route::RouteOutcome::NoPath`] value. What remains here are the
//! conditions a caller has to tell apart from "nothing found".

use std::fmt;

use thiserror::Error;

/// Kind of catalogue entity a lookup failed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    /// Tuning system id
    TuningSystem,
    /// Starting note of a tuning system's note-name assignment
    StartingNote,
    /// Jins or maqam template id
    Template,
    /// Tonic of a template transposition
    Tonic,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EntityKind::TuningSystem => "tuning system",
            EntityKind::StartingNote => "starting note",
            EntityKind::Template => "template",
            EntityKind::Tonic => "tonic",
        };
        f.write_str(s)
    }
}

/// Errors returned by the analysis core.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    /// A referenced catalogue entity does not exist (or is not realizable in
    /// the selected tuning system).
    #[error("{kind} '{id}' not found")]
    NotFound {
        /// What was being looked up
        kind: EntityKind,
        /// The identifier as supplied by the caller
        id: String,
    },

    /// A numeric parameter is outside its documented bounds.
    #[error("{name} must be between {min} and {max}, got {value}")]
    ParameterRange {
        /// Parameter name
        name: &'static str,
        /// Supplied value
        value: f64,
        /// Inclusive lower bound
        min: f64,
        /// Inclusive upper bound
        max: f64,
    },
}

impl CoreError {
    pub(crate) fn not_found(kind: EntityKind, id: impl Into<String>) -> Self {
        CoreError::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// True for the not-found family of errors.
    pub fn is_not_found(&self) -> bool {
        matches!(self, CoreError::NotFound { .. })
    }
}

/// Check `value` lies within `min..=max`.
pub(crate) fn check_range(name: &'static str, value: f64, min: f64, max: f64) -> Result<f64, CoreError> {
    if value.is_nan() || value < min || value > max {
        return Err(CoreError::ParameterRange {
            name,
            value,
            min,
            max,
        });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_bounds_are_inclusive() {
        assert_eq!(check_range("tolerance", 0.0, 0.0, 50.0), Ok(0.0));
        assert_eq!(check_range("tolerance", 50.0, 0.0, 50.0), Ok(50.0));
        assert!(check_range("tolerance", 50.5, 0.0, 50.0).is_err());
        assert!(check_range("tolerance", -1.0, 0.0, 50.0).is_err());
        assert!(check_range("tolerance", f64::NAN, 0.0, 50.0).is_err());
    }

    #[test]
    fn test_error_messages() {
        let err = CoreError::not_found(EntityKind::Template, "maqam_foo");
        assert_eq!(err.to_string(), "template 'maqam_foo' not found");
        assert!(err.is_not_found());

        let err = check_range("max_hops", 11.0, 1.0, 10.0).unwrap_err();
        assert_eq!(err.to_string(), "max_hops must be between 1 and 10, got 11");
        assert!(!err.is_not_found());
    }
}
