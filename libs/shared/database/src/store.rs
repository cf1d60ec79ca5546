use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use shared_models::{
    Appointment, AppointmentFilter, AppointmentStatus, AvailabilityRule, MedicalRecord, Pet,
    StorageError, User, Veterinarian,
};

/// Outcome of the atomic booking insert.
#[derive(Debug, Clone, PartialEq)]
pub enum SlotClaim {
    Claimed(Appointment),
    /// A non-cancelled appointment already holds the `(vet, date, time)` slot.
    Taken,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RuleInsert {
    Inserted(AvailabilityRule),
    /// Another rule of the same vet on the same weekday intersects this one.
    Overlapping,
}

/// Persistence substrate for the clinic. Also serves as the identity/role
/// lookup for actors.
///
/// Listing methods return rows already ordered:
/// appointments by `(date, time)` ascending, medical records by
/// `(date, time)` descending, rules by `(day_of_week, start_time)`.
#[async_trait]
pub trait ClinicStore: Send + Sync {
    async fn get_user(&self, id: Uuid) -> Result<Option<User>, StorageError>;

    /// Insert or replace by id.
    async fn save_user(&self, user: User) -> Result<User, StorageError>;

    async fn get_veterinarian(&self, id: Uuid) -> Result<Option<Veterinarian>, StorageError>;

    async fn list_veterinarians(&self) -> Result<Vec<Veterinarian>, StorageError>;

    async fn save_veterinarian(&self, vet: Veterinarian) -> Result<Veterinarian, StorageError>;

    async fn get_pet(&self, id: Uuid) -> Result<Option<Pet>, StorageError>;

    async fn list_pets_by_owner(&self, owner_id: Uuid) -> Result<Vec<Pet>, StorageError>;

    async fn save_pet(&self, pet: Pet) -> Result<Pet, StorageError>;

    /// Inserts unless the rule overlaps an existing one.
    async fn insert_availability_rule(&self, rule: AvailabilityRule) -> Result<RuleInsert, StorageError>;

    async fn get_availability_rule(&self, id: Uuid) -> Result<Option<AvailabilityRule>, StorageError>;

    async fn list_availability_rules(&self, vet_id: Uuid) -> Result<Vec<AvailabilityRule>, StorageError>;

    /// Returns whether a rule was removed.
    async fn delete_availability_rule(&self, id: Uuid) -> Result<bool, StorageError>;

    /// Check-and-set: re-validates that no non-cancelled appointment holds
    /// the slot and inserts in the same atomic step.
    async fn insert_appointment_if_slot_free(&self, appointment: Appointment) -> Result<SlotClaim, StorageError>;

    async fn get_appointment(&self, id: Uuid) -> Result<Option<Appointment>, StorageError>;

    /// Compare-and-set on status. `None` when the appointment is missing or
    /// no longer in `expected`.
    async fn update_appointment_status(
        &self,
        id: Uuid,
        expected: AppointmentStatus,
        next: AppointmentStatus,
        at: DateTime<Utc>,
    ) -> Result<Option<Appointment>, StorageError>;

    async fn list_appointments(&self, filter: &AppointmentFilter) -> Result<Vec<Appointment>, StorageError>;

    /// `None` when the appointment already has a record.
    async fn insert_medical_record(&self, record: MedicalRecord) -> Result<Option<MedicalRecord>, StorageError>;

    async fn get_medical_record(&self, id: Uuid) -> Result<Option<MedicalRecord>, StorageError>;

    async fn get_medical_record_for_appointment(
        &self,
        appointment_id: Uuid,
    ) -> Result<Option<MedicalRecord>, StorageError>;

    async fn update_medical_record(&self, record: MedicalRecord) -> Result<MedicalRecord, StorageError>;

    async fn list_medical_records_for_pet(&self, pet_id: Uuid) -> Result<Vec<MedicalRecord>, StorageError>;
}
