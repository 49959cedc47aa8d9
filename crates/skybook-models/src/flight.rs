//! The flight record exchanged with the booking service.
//!
//! A [`Flight`] is a plain value: the client never mutates one in place.
//! Updates such as toggling the delay flag produce a new record that
//! replaces the old one wholesale.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Length of a timestamp as emitted by the booking service, e.g.
/// `2024-01-01T10:00:00.0000000+00:00` (seven fractional-second digits
/// and a `+HH:MM` offset).
pub const FLIGHT_DATE_LEN: usize = 33;

/// Cities accepted by the editing flow.
pub const CITIES: [&str; 4] = ["Graz", "Wien", "Hamburg", "Berlin"];

/// A bookable route/date/delay-status tuple.
///
/// # Examples
///
/// ```
/// use skybook_models::Flight;
///
/// let flight = Flight::new("Graz", "Hamburg", "2024-01-01T10:00:00.0000000+00:00");
/// assert!(!flight.is_persisted());
///
/// let delayed = flight.with_delayed(true);
/// assert!(delayed.delayed);
/// assert!(!flight.delayed);
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct Flight {
    /// Identifier assigned by the booking service; `0` until persisted.
    #[serde(default)]
    pub id: i64,
    /// Departure city.
    pub from: String,
    /// Arrival city.
    pub to: String,
    /// Departure timestamp, kept as the service formats it.
    pub date: String,
    /// Whether the flight is currently delayed.
    #[serde(default)]
    pub delayed: bool,
}

impl Flight {
    /// Create a new, not yet persisted, on-time flight.
    pub fn new(from: &str, to: &str, date: &str) -> Self {
        Self {
            id: 0,
            from: from.to_string(),
            to: to.to_string(),
            date: date.to_string(),
            delayed: false,
        }
    }

    /// Return `true` once the booking service has assigned an id.
    pub fn is_persisted(&self) -> bool {
        self.id != 0
    }

    /// Return a copy of this record with the given delay status.
    pub fn with_delayed(&self, delayed: bool) -> Self {
        Self {
            delayed,
            ..self.clone()
        }
    }
}

/// Parse a flight id as typed into a form or on the command line.
///
/// Surrounding whitespace is ignored; an empty value means "not yet
/// persisted" and yields `0`.
pub fn parse_flight_id(value: &str) -> Result<i64, ModelError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(0);
    }
    trimmed
        .parse::<i64>()
        .map_err(|e| ModelError::InvalidFlightId {
            value: value.to_string(),
            reason: e.to_string(),
        })
}

impl fmt::Display for Flight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {} -> {} @ {}", self.id, self.from, self.to, self.date)?;
        if self.delayed {
            f.write_str(" (delayed)")?;
        }
        Ok(())
    }
}
