//! Field validators.
//!
//! A [`Validator`] is an independent predicate over a single field value.
//! Validators are composed into an ordered [`Validators`] list; running the
//! list evaluates every predicate and merges the failures, so the
//! presentation layer can show all problems with a field at once.
//!
//! Every predicate except [`required`] accepts an empty value. Emptiness
//! is reported once, by `required`, rather than by each length or pattern
//! check.

use std::sync::OnceLock;

use regex::Regex;

use crate::error::ModelError;
use crate::flight::CITIES;

/// Characters allowed in a city name.
pub const CITY_PATTERN: &str = "[a-zA-ZäöüÄÖÜß ]*";

/// Minimum length of a city name in the editing flow.
pub const CITY_MIN_LEN: usize = 3;

/// Maximum length of a city name in the editing flow.
pub const CITY_MAX_LEN: usize = 15;

/// Why a single field value was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, strum::IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum FieldError {
    /// The value is empty.
    #[error("a value is required")]
    Required,

    /// The value is shorter than allowed.
    #[error("must be at least {required} characters (got {actual})")]
    MinLength {
        /// Minimum number of characters.
        required: usize,
        /// Number of characters in the value.
        actual: usize,
    },

    /// The value is longer than allowed.
    #[error("must be at most {required} characters (got {actual})")]
    MaxLength {
        /// Maximum number of characters.
        required: usize,
        /// Number of characters in the value.
        actual: usize,
    },

    /// The value does not match the required pattern.
    #[error("\"{actual}\" does not match {pattern}")]
    Pattern {
        /// The anchored pattern.
        pattern: String,
        /// The rejected value.
        actual: String,
    },

    /// The value is not one of the accepted cities.
    #[error("\"{actual_city}\" is not one of: {valid_cities}")]
    City {
        /// The rejected city.
        actual_city: String,
        /// Accepted cities, comma separated.
        valid_cities: String,
    },

    /// Departure and arrival are the same city.
    #[error("round trips to \"{city}\" are not bookable")]
    RoundTrip {
        /// The city used on both ends.
        city: String,
    },

    /// The booking service knows no flight departing from this city.
    #[error("no flights depart from \"{city}\"")]
    AsyncCity {
        /// The rejected city.
        city: String,
    },
}

impl FieldError {
    /// Short machine-readable key, e.g. `"minlength"` or `"city"`.
    pub fn key(&self) -> &'static str {
        self.into()
    }
}

/// A predicate over one field value.
pub type Validator = Box<dyn Fn(&str) -> Result<(), FieldError> + Send + Sync>;

/// Reject empty (or whitespace-only) values.
pub fn required() -> Validator {
    Box::new(|value| {
        if value.trim().is_empty() {
            Err(FieldError::Required)
        } else {
            Ok(())
        }
    })
}

/// Reject values shorter than `min` characters.
pub fn min_length(min: usize) -> Validator {
    Box::new(move |value| {
        let actual = value.chars().count();
        if actual > 0 && actual < min {
            Err(FieldError::MinLength {
                required: min,
                actual,
            })
        } else {
            Ok(())
        }
    })
}

/// Reject values longer than `max` characters.
pub fn max_length(max: usize) -> Validator {
    Box::new(move |value| {
        let actual = value.chars().count();
        if actual > max {
            Err(FieldError::MaxLength {
                required: max,
                actual,
            })
        } else {
            Ok(())
        }
    })
}

/// Reject values that do not match `pattern` in full.
///
/// The pattern is anchored at both ends before compiling.
pub fn pattern(pattern: &str) -> Result<Validator, ModelError> {
    let anchored = format!("^(?:{pattern})$");
    let regex = Regex::new(&anchored).map_err(|e| ModelError::InvalidPattern {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })?;
    Ok(regex_validator(regex, pattern.to_string()))
}

fn regex_validator(regex: Regex, source: String) -> Validator {
    Box::new(move |value| {
        if value.is_empty() || regex.is_match(value) {
            Ok(())
        } else {
            Err(FieldError::Pattern {
                pattern: source.clone(),
                actual: value.to_string(),
            })
        }
    })
}

/// Reject values containing anything but ASCII digits.
pub fn numeric() -> Validator {
    Box::new(|value| {
        if value.chars().all(|c| c.is_ascii_digit()) {
            Ok(())
        } else {
            Err(FieldError::Pattern {
                pattern: "[0-9]+".to_string(),
                actual: value.to_string(),
            })
        }
    })
}

/// Reject values that are not in `valid_cities` (exact, case-sensitive).
pub fn city(valid_cities: &[&str]) -> Validator {
    let valid: Vec<String> = valid_cities.iter().map(|c| c.to_string()).collect();
    Box::new(move |value| {
        if value.is_empty() || valid.iter().any(|c| c == value) {
            Ok(())
        } else {
            Err(FieldError::City {
                actual_city: value.to_string(),
                valid_cities: valid.join(", "),
            })
        }
    })
}

/// Cross-field check: departure and arrival must differ.
pub fn round_trip(from: &str, to: &str) -> Result<(), FieldError> {
    if !from.is_empty() && from == to {
        Err(FieldError::RoundTrip {
            city: from.to_string(),
        })
    } else {
        Ok(())
    }
}

/// An ordered list of validators for one field.
#[derive(Default)]
pub struct Validators {
    validators: Vec<Validator>,
}

impl Validators {
    /// Create an empty list; every value passes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a validator.
    pub fn with(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }

    /// Run every validator and collect the failures in order.
    pub fn validate(&self, value: &str) -> Vec<FieldError> {
        self.validators
            .iter()
            .filter_map(|validate| validate(value).err())
            .collect()
    }

    /// Number of validators in the list.
    pub fn len(&self) -> usize {
        self.validators.len()
    }

    /// Return `true` if the list holds no validators.
    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }
}

fn city_regex() -> &'static Regex {
    static CITY_REGEX: OnceLock<Regex> = OnceLock::new();
    CITY_REGEX.get_or_init(|| {
        Regex::new(&format!("^(?:{CITY_PATTERN})$")).expect("CITY_PATTERN is a valid regex")
    })
}

/// The validator chain applied to `from` and `to` in the editing flow:
/// required, 3 to 15 characters, [`CITY_PATTERN`], and membership in
/// [`CITIES`].
pub fn city_validators() -> Validators {
    Validators::new()
        .with(required())
        .with(min_length(CITY_MIN_LEN))
        .with(max_length(CITY_MAX_LEN))
        .with(regex_validator(city_regex().clone(), CITY_PATTERN.to_string()))
        .with(city(&CITIES))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_rejects_blank() {
        let v = required();
        assert_eq!(v(""), Err(FieldError::Required));
        assert_eq!(v("   "), Err(FieldError::Required));
        assert_eq!(v("Graz"), Ok(()));
    }

    #[test]
    fn length_checks_skip_empty_values() {
        assert_eq!(min_length(3)(""), Ok(()));
        assert_eq!(
            min_length(3)("Gr"),
            Err(FieldError::MinLength {
                required: 3,
                actual: 2
            })
        );
        assert_eq!(
            max_length(4)("Hamburg"),
            Err(FieldError::MaxLength {
                required: 4,
                actual: 7
            })
        );
    }

    #[test]
    fn lengths_count_characters_not_bytes() {
        // "Köln" is 4 chars but 5 bytes
        assert_eq!(max_length(4)("Köln"), Ok(()));
    }

    #[test]
    fn pattern_is_anchored() {
        let v = pattern("[a-z]+").unwrap();
        assert_eq!(v("graz"), Ok(()));
        assert!(matches!(v("graz1"), Err(FieldError::Pattern { .. })));
        assert_eq!(v(""), Ok(()));
    }

    #[test]
    fn invalid_pattern_is_reported() {
        let err = pattern("[unclosed").err().unwrap();
        assert!(matches!(err, ModelError::InvalidPattern { .. }));
    }

    #[test]
    fn numeric_accepts_digits_only() {
        assert_eq!(numeric()("42"), Ok(()));
        assert_eq!(numeric()(""), Ok(()));
        assert!(matches!(numeric()("4 2"), Err(FieldError::Pattern { .. })));
    }

    #[test]
    fn city_membership() {
        let v = city(&CITIES);
        assert_eq!(v("Wien"), Ok(()));
        assert_eq!(
            v("Paris"),
            Err(FieldError::City {
                actual_city: "Paris".into(),
                valid_cities: "Graz, Wien, Hamburg, Berlin".into(),
            })
        );
    }

    #[test]
    fn chain_merges_all_failures() {
        let errors = city_validators().validate("P4");
        let keys: Vec<&str> = errors.iter().map(FieldError::key).collect();
        assert_eq!(keys, vec!["minlength", "pattern", "city"]);
    }

    #[test]
    fn chain_accepts_known_city() {
        assert!(city_validators().validate("Hamburg").is_empty());
    }

    #[test]
    fn chain_reports_only_required_for_empty() {
        assert_eq!(city_validators().validate(""), vec![FieldError::Required]);
    }

    #[test]
    fn round_trip_rejects_same_city() {
        assert_eq!(round_trip("Graz", "Wien"), Ok(()));
        assert_eq!(round_trip("", ""), Ok(()));
        assert_eq!(
            round_trip("Graz", "Graz"),
            Err(FieldError::RoundTrip {
                city: "Graz".into()
            })
        );
    }

    #[test]
    fn field_error_display() {
        let err = FieldError::MinLength {
            required: 3,
            actual: 1,
        };
        assert_eq!(err.to_string(), "must be at least 3 characters (got 1)");
        assert_eq!(FieldError::Required.key(), "required");
        assert_eq!(
            FieldError::AsyncCity {
                city: "Linz".into()
            }
            .key(),
            "asynccity"
        );
    }
}
