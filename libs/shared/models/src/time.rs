use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate, NaiveTime};
use regex::Regex;

use crate::error::ValidationError;

static HHMM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([01]\d|2[0-3]):[0-5]\d$").expect("valid HH:MM pattern"));

/// Parse a strict 24-hour `HH:MM` string.
pub fn parse_hhmm(field: &str, raw: &str) -> Result<NaiveTime, ValidationError> {
    if !HHMM.is_match(raw) {
        return Err(ValidationError::new(field, format!("'{}' is not a valid HH:MM time", raw)));
    }

    NaiveTime::parse_from_str(raw, "%H:%M")
        .map_err(|e| ValidationError::new(field, e.to_string()))
}

pub fn format_hhmm(time: &NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

/// 0 = Sunday .. 6 = Saturday.
pub fn day_of_week(date: &NaiveDate) -> i32 {
    date.weekday().num_days_from_sunday() as i32
}

/// Serde adapter writing `HH:MM` and reading either `HH:MM` or the
/// `HH:MM:SS` form Postgres returns for `time` columns.
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::format_hhmm(time))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&raw, "%H:%M:%S")
            .or_else(|_| NaiveTime::parse_from_str(&raw, "%H:%M"))
            .map_err(de::Error::custom)
    }
}
