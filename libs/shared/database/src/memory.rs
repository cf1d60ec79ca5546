use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use shared_models::{
    Appointment, AppointmentFilter, AppointmentStatus, AvailabilityRule, MedicalRecord, Pet,
    StorageError, User, Veterinarian,
};

use crate::store::{ClinicStore, RuleInsert, SlotClaim};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    veterinarians: HashMap<Uuid, Veterinarian>,
    pets: HashMap<Uuid, Pet>,
    rules: HashMap<Uuid, AvailabilityRule>,
    appointments: HashMap<Uuid, Appointment>,
    records: HashMap<Uuid, MedicalRecord>,
}

/// Process-local store. Every mutation runs under a single write lock, which
/// makes the check-and-set operations atomic.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ClinicStore for InMemoryStore {
    async fn get_user(&self, id: Uuid) -> Result<Option<User>, StorageError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn save_user(&self, user: User) -> Result<User, StorageError> {
        self.tables.write().await.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_veterinarian(&self, id: Uuid) -> Result<Option<Veterinarian>, StorageError> {
        Ok(self.tables.read().await.veterinarians.get(&id).cloned())
    }

    async fn list_veterinarians(&self) -> Result<Vec<Veterinarian>, StorageError> {
        let mut vets: Vec<Veterinarian> = self.tables.read().await.veterinarians.values().cloned().collect();
        vets.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(vets)
    }

    async fn save_veterinarian(&self, vet: Veterinarian) -> Result<Veterinarian, StorageError> {
        self.tables.write().await.veterinarians.insert(vet.id, vet.clone());
        Ok(vet)
    }

    async fn get_pet(&self, id: Uuid) -> Result<Option<Pet>, StorageError> {
        Ok(self.tables.read().await.pets.get(&id).cloned())
    }

    async fn list_pets_by_owner(&self, owner_id: Uuid) -> Result<Vec<Pet>, StorageError> {
        let mut pets: Vec<Pet> = self
            .tables
            .read()
            .await
            .pets
            .values()
            .filter(|pet| pet.owner_id == owner_id)
            .cloned()
            .collect();
        pets.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(pets)
    }

    async fn save_pet(&self, pet: Pet) -> Result<Pet, StorageError> {
        self.tables.write().await.pets.insert(pet.id, pet.clone());
        Ok(pet)
    }

    async fn insert_availability_rule(&self, rule: AvailabilityRule) -> Result<RuleInsert, StorageError> {
        let mut tables = self.tables.write().await;
        if tables.rules.values().any(|existing| existing.overlaps(&rule)) {
            return Ok(RuleInsert::Overlapping);
        }
        tables.rules.insert(rule.id, rule.clone());
        Ok(RuleInsert::Inserted(rule))
    }

    async fn get_availability_rule(&self, id: Uuid) -> Result<Option<AvailabilityRule>, StorageError> {
        Ok(self.tables.read().await.rules.get(&id).cloned())
    }

    async fn list_availability_rules(&self, vet_id: Uuid) -> Result<Vec<AvailabilityRule>, StorageError> {
        let mut rules: Vec<AvailabilityRule> = self
            .tables
            .read()
            .await
            .rules
            .values()
            .filter(|rule| rule.vet_id == vet_id)
            .cloned()
            .collect();
        rules.sort_by_key(|rule| (rule.day_of_week, rule.start_time));
        Ok(rules)
    }

    async fn delete_availability_rule(&self, id: Uuid) -> Result<bool, StorageError> {
        Ok(self.tables.write().await.rules.remove(&id).is_some())
    }

    async fn insert_appointment_if_slot_free(&self, appointment: Appointment) -> Result<SlotClaim, StorageError> {
        let mut tables = self.tables.write().await;
        let key = appointment.slot_key();

        let held = tables
            .appointments
            .values()
            .any(|existing| existing.status.holds_slot() && existing.slot_key() == key);

        if held {
            debug!("Slot {} already held", key);
            return Ok(SlotClaim::Taken);
        }

        tables.appointments.insert(appointment.id, appointment.clone());
        Ok(SlotClaim::Claimed(appointment))
    }

    async fn get_appointment(&self, id: Uuid) -> Result<Option<Appointment>, StorageError> {
        Ok(self.tables.read().await.appointments.get(&id).cloned())
    }

    async fn update_appointment_status(
        &self,
        id: Uuid,
        expected: AppointmentStatus,
        next: AppointmentStatus,
        at: DateTime<Utc>,
    ) -> Result<Option<Appointment>, StorageError> {
        let mut tables = self.tables.write().await;
        match tables.appointments.get_mut(&id) {
            Some(appointment) if appointment.status == expected => {
                appointment.status = next;
                appointment.updated_at = at;
                Ok(Some(appointment.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn list_appointments(&self, filter: &AppointmentFilter) -> Result<Vec<Appointment>, StorageError> {
        let mut appointments: Vec<Appointment> = self
            .tables
            .read()
            .await
            .appointments
            .values()
            .filter(|appointment| filter.matches(appointment))
            .cloned()
            .collect();
        appointments.sort_by_key(|appointment| (appointment.date, appointment.time, appointment.created_at));
        Ok(appointments)
    }

    async fn insert_medical_record(&self, record: MedicalRecord) -> Result<Option<MedicalRecord>, StorageError> {
        let mut tables = self.tables.write().await;
        if tables
            .records
            .values()
            .any(|existing| existing.appointment_id == record.appointment_id)
        {
            return Ok(None);
        }
        tables.records.insert(record.id, record.clone());
        Ok(Some(record))
    }

    async fn get_medical_record(&self, id: Uuid) -> Result<Option<MedicalRecord>, StorageError> {
        Ok(self.tables.read().await.records.get(&id).cloned())
    }

    async fn get_medical_record_for_appointment(
        &self,
        appointment_id: Uuid,
    ) -> Result<Option<MedicalRecord>, StorageError> {
        Ok(self
            .tables
            .read()
            .await
            .records
            .values()
            .find(|record| record.appointment_id == appointment_id)
            .cloned())
    }

    async fn update_medical_record(&self, record: MedicalRecord) -> Result<MedicalRecord, StorageError> {
        let mut tables = self.tables.write().await;
        match tables.records.get_mut(&record.id) {
            Some(existing) => {
                *existing = record.clone();
                Ok(record)
            }
            None => Err(StorageError::new(format!("medical record {} does not exist", record.id))),
        }
    }

    async fn list_medical_records_for_pet(&self, pet_id: Uuid) -> Result<Vec<MedicalRecord>, StorageError> {
        let mut records: Vec<MedicalRecord> = self
            .tables
            .read()
            .await
            .records
            .values()
            .filter(|record| record.pet_id == pet_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| (b.date, b.time).cmp(&(a.date, a.time)));
        Ok(records)
    }
}
