use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::time::hhmm;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    #[serde(alias = "agendado")]
    Scheduled,
    #[serde(alias = "confirmado")]
    Confirmed,
    #[serde(alias = "concluido")]
    Completed,
    #[serde(alias = "cancelado")]
    Cancelled,
}

impl AppointmentStatus {
    /// No transition leaves a terminal status.
    pub fn is_terminal(&self) -> bool {
        matches!(self, AppointmentStatus::Completed | AppointmentStatus::Cancelled)
    }

    /// Whether an appointment in this status still holds its slot.
    pub fn holds_slot(&self) -> bool {
        !matches!(self, AppointmentStatus::Cancelled)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Scheduled => "scheduled",
            AppointmentStatus::Confirmed => "confirmed",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Appointment {
    pub id: Uuid,
    pub client_id: Uuid,
    pub vet_id: Uuid,
    pub pet_id: Uuid,
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub time: NaiveTime,
    pub status: AppointmentStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    pub fn slot_key(&self) -> SlotKey {
        SlotKey {
            vet_id: self.vet_id,
            date: self.date,
            time: self.time,
        }
    }

    pub fn is_participant(&self, user_id: Uuid) -> bool {
        self.client_id == user_id || self.vet_id == user_id
    }
}

/// The `(vet, date, time)` tuple a non-cancelled appointment holds exclusively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotKey {
    pub vet_id: Uuid,
    pub date: NaiveDate,
    pub time: NaiveTime,
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.vet_id, self.date, self.time.format("%H:%M"))
    }
}

/// Filter for appointment listings. Date bounds are inclusive.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppointmentFilter {
    pub client_id: Option<Uuid>,
    pub vet_id: Option<Uuid>,
    pub pet_id: Option<Uuid>,
    pub status: Option<AppointmentStatus>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

impl AppointmentFilter {
    pub fn matches(&self, appointment: &Appointment) -> bool {
        self.client_id.map_or(true, |id| appointment.client_id == id)
            && self.vet_id.map_or(true, |id| appointment.vet_id == id)
            && self.pet_id.map_or(true, |id| appointment.pet_id == id)
            && self.status.map_or(true, |status| appointment.status == status)
            && self.date_from.map_or(true, |from| appointment.date >= from)
            && self.date_to.map_or(true, |to| appointment.date <= to)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MedicalRecord {
    pub id: Uuid,
    pub appointment_id: Uuid,
    pub vet_id: Uuid,
    pub pet_id: Uuid,
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub time: NaiveTime,
    pub anamnesis: String,
    pub diagnosis: String,
    pub prescription: String,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MedicalRecordFields {
    #[serde(default)]
    pub anamnesis: String,
    #[serde(default)]
    pub diagnosis: String,
    #[serde(default)]
    pub prescription: String,
    #[serde(default)]
    pub notes: String,
}

impl MedicalRecord {
    pub fn for_appointment(appointment: &Appointment, fields: MedicalRecordFields) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            appointment_id: appointment.id,
            vet_id: appointment.vet_id,
            pet_id: appointment.pet_id,
            date: appointment.date,
            time: appointment.time,
            anamnesis: fields.anamnesis,
            diagnosis: fields.diagnosis,
            prescription: fields.prescription,
            notes: fields.notes,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply_fields(&mut self, fields: MedicalRecordFields) {
        self.anamnesis = fields.anamnesis;
        self.diagnosis = fields.diagnosis;
        self.prescription = fields.prescription;
        self.notes = fields.notes;
        self.updated_at = Utc::now();
    }
}
