//! Input validation applied before any stop-store mutation.
//!
//! A failed validation leaves the store untouched; these errors are the only
//! ones the session surfaces for user input rather than collaborator
//! behavior.

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("{axis} is not a finite number")]
    NonFiniteCoordinate { axis: &'static str },

    #[error("{axis} {value} is out of range")]
    CoordinateOutOfRange { axis: &'static str, value: f64 },

    #[error("stop name must not be empty")]
    EmptyName,

    #[error("a stop named \"{0}\" already exists")]
    DuplicateName(String),
}

/// Checks that a latitude/longitude pair is finite and within
/// `[-90, 90]` / `[-180, 180]`.
///
/// # Errors
///
/// Returns the first failing axis as [`ValidationError::NonFiniteCoordinate`]
/// or [`ValidationError::CoordinateOutOfRange`].
pub fn validate_coordinates(lat: f64, lng: f64) -> Result<(), ValidationError> {
    for (axis, value, bound) in [("latitude", lat, 90.0), ("longitude", lng, 180.0)] {
        if !value.is_finite() {
            return Err(ValidationError::NonFiniteCoordinate { axis });
        }
        if value.abs() > bound {
            return Err(ValidationError::CoordinateOutOfRange { axis, value });
        }
    }
    Ok(())
}

/// Checks that a stop name is non-empty after trimming and does not collide
/// with any name in `existing`.
///
/// # Errors
///
/// Returns [`ValidationError::EmptyName`] or
/// [`ValidationError::DuplicateName`].
pub fn validate_stop_name<'a, I>(name: &str, existing: I) -> Result<(), ValidationError>
where
    I: IntoIterator<Item = &'a str>,
{
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyName);
    }
    if existing.into_iter().any(|n| n == trimmed) {
        return Err(ValidationError::DuplicateName(trimmed.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_ordinary_coordinates() {
        assert_eq!(validate_coordinates(37.7749, -122.4194), Ok(()));
        assert_eq!(validate_coordinates(-90.0, 180.0), Ok(()));
    }

    #[test]
    fn rejects_nan_latitude() {
        assert_eq!(
            validate_coordinates(f64::NAN, 0.0),
            Err(ValidationError::NonFiniteCoordinate { axis: "latitude" })
        );
    }

    #[test]
    fn rejects_infinite_longitude() {
        assert_eq!(
            validate_coordinates(0.0, f64::INFINITY),
            Err(ValidationError::NonFiniteCoordinate { axis: "longitude" })
        );
    }

    #[test]
    fn rejects_out_of_range_latitude() {
        assert!(matches!(
            validate_coordinates(90.5, 0.0),
            Err(ValidationError::CoordinateOutOfRange {
                axis: "latitude",
                ..
            })
        ));
    }

    #[test]
    fn rejects_out_of_range_longitude() {
        assert!(matches!(
            validate_coordinates(0.0, -180.5),
            Err(ValidationError::CoordinateOutOfRange {
                axis: "longitude",
                ..
            })
        ));
    }

    #[test]
    fn rejects_empty_and_whitespace_names() {
        assert_eq!(
            validate_stop_name("", std::iter::empty()),
            Err(ValidationError::EmptyName)
        );
        assert_eq!(
            validate_stop_name("   ", std::iter::empty()),
            Err(ValidationError::EmptyName)
        );
    }

    #[test]
    fn rejects_duplicate_name() {
        let existing = ["Office", "Depot"];
        assert_eq!(
            validate_stop_name("Depot", existing),
            Err(ValidationError::DuplicateName("Depot".into()))
        );
    }

    #[test]
    fn accepts_fresh_name() {
        let existing = ["Office"];
        assert_eq!(validate_stop_name("Depot", existing), Ok(()));
    }
}
