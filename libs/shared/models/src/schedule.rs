use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::error::ValidationError;
use crate::time::{format_hhmm, hhmm, parse_hhmm};
use crate::validation::require_non_blank;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Veterinarian {
    /// Same id as the veterinarian's `User`.
    pub id: Uuid,
    pub name: String,
    pub specialty: Option<String>,
    pub license_number: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Veterinarian {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_non_blank("name", &self.name)
    }
}

/// Recurring weekly window during which a veterinarian accepts bookings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AvailabilityRule {
    pub id: Uuid,
    pub vet_id: Uuid,
    /// 0 = Sunday .. 6 = Saturday
    pub day_of_week: i32,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAvailabilityRuleRequest {
    pub day_of_week: i32,
    pub start_time: String,
    pub end_time: String,
}

impl AvailabilityRule {
    pub fn from_request(vet_id: Uuid, request: &CreateAvailabilityRuleRequest) -> Result<Self, ValidationError> {
        let rule = Self {
            id: Uuid::new_v4(),
            vet_id,
            day_of_week: request.day_of_week,
            start_time: parse_hhmm("start_time", &request.start_time)?,
            end_time: parse_hhmm("end_time", &request.end_time)?,
            created_at: Utc::now(),
        };
        rule.validate()?;
        Ok(rule)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(0..=6).contains(&self.day_of_week) {
            return Err(ValidationError::new(
                "day_of_week",
                "must be between 0 (Sunday) and 6 (Saturday)",
            ));
        }
        if self.start_time >= self.end_time {
            return Err(ValidationError::new("start_time", "must be before end_time"));
        }
        Ok(())
    }

    /// Half-open ranges on the same weekday; touching windows do not overlap.
    pub fn overlaps(&self, other: &AvailabilityRule) -> bool {
        self.vet_id == other.vet_id
            && self.day_of_week == other.day_of_week
            && self.start_time < other.end_time
            && other.start_time < self.end_time
    }
}

/// One bookable start time, serialized as `"HH:MM"`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct TimeSlot(#[serde(with = "hhmm")] pub NaiveTime);

impl TimeSlot {
    pub fn time(&self) -> NaiveTime {
        self.0
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", format_hhmm(&self.0))
    }
}
