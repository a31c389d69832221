//! Identifiers for registration records.
//!
//! `RecordId` wraps the numeric id stored with every registration: a
//! millisecond timestamp for records created locally, or a timestamp plus a
//! random fraction for imported records.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Largest integer an `f64` represents exactly.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// A numeric registration identifier.
///
/// Integral ids serialize as JSON integers, fractional ids as JSON floats.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct RecordId(f64);

impl RecordId {
    /// Create an id from a raw value, rejecting NaN and infinities.
    pub fn new(value: f64) -> Option<Self> {
        value.is_finite().then_some(Self(value))
    }

    /// Id for a record created at `at`: its Unix time in milliseconds.
    pub fn from_timestamp(at: DateTime<Utc>) -> Self {
        Self(at.timestamp_millis() as f64)
    }

    /// Id for an imported record: the timestamp perturbed by a random
    /// fraction in `(0, 1)`.
    ///
    /// The fraction is kept well above the `f64` spacing at millisecond
    /// timestamps (about 2.4e-4) so it survives the addition.
    pub fn perturbed(at: DateTime<Utc>) -> Self {
        let mut rng = rand::thread_rng();
        let fraction: f64 = rng.gen_range(0.001..0.999);
        Self(at.timestamp_millis() as f64 + fraction)
    }

    /// The smallest integral id strictly greater than this one.
    pub fn next_after(self) -> Self {
        Self(self.0.floor() + 1.0)
    }

    /// Get the raw numeric value.
    pub fn as_f64(self) -> f64 {
        self.0
    }

    /// Bit pattern of the value, usable as a hash key.
    pub fn to_bits(self) -> u64 {
        self.0.to_bits()
    }

    fn is_integral(self) -> bool {
        self.0.fract() == 0.0 && self.0.abs() <= MAX_EXACT_INTEGER
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_integral() {
            f.pad(&(self.0 as i64).to_string())
        } else {
            f.pad(&self.0.to_string())
        }
    }
}

impl FromStr for RecordId {
    type Err = RecordIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: f64 = s
            .trim()
            .parse()
            .map_err(|_| RecordIdError::InvalidFormat(s.to_string()))?;
        Self::new(value).ok_or_else(|| RecordIdError::InvalidFormat(s.to_string()))
    }
}

impl Serialize for RecordId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.is_integral() {
            serializer.serialize_i64(self.0 as i64)
        } else {
            serializer.serialize_f64(self.0)
        }
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = f64::deserialize(deserializer)?;
        Self::new(value).ok_or_else(|| serde::de::Error::custom("record id must be finite"))
    }
}

/// Error type for RecordId parsing.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RecordIdError {
    #[error("invalid record ID format: {0}")]
    InvalidFormat(String),
}
