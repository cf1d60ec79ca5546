// libs/appointment-cell/src/services/medical_record.rs
use std::sync::Arc;

use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use shared_database::{AppState, ClinicStore};
use shared_models::{AppointmentStatus, MedicalRecord, MedicalRecordFields, UserRole};

use crate::models::AppointmentError;

pub struct MedicalRecordService {
    store: Arc<dyn ClinicStore>,
}

impl MedicalRecordService {
    pub fn new(state: &AppState) -> Self {
        Self {
            store: state.store.clone(),
        }
    }

    /// Documents a completed appointment. Only its veterinarian may write the
    /// record, and only once.
    #[instrument(skip(self, fields))]
    pub async fn create_medical_record(
        &self,
        appointment_id: Uuid,
        vet_id: Uuid,
        fields: MedicalRecordFields,
    ) -> Result<MedicalRecord, AppointmentError> {
        let appointment = self
            .store
            .get_appointment(appointment_id)
            .await?
            .ok_or(AppointmentError::NotFound("Appointment"))?;

        if appointment.vet_id != vet_id {
            warn!("User {} is not the veterinarian of appointment {}", vet_id, appointment_id);
            return Err(AppointmentError::IllegalTransition(
                "only the veterinarian of record may document this appointment".to_string(),
            ));
        }

        if appointment.status != AppointmentStatus::Completed {
            warn!("Appointment {} is {}, not completed", appointment_id, appointment.status);
            return Err(AppointmentError::IllegalTransition(format!(
                "medical records require a completed appointment, this one is {}",
                appointment.status
            )));
        }

        if self
            .store
            .get_medical_record_for_appointment(appointment_id)
            .await?
            .is_some()
        {
            return Err(AppointmentError::MedicalRecordExists);
        }

        let record = MedicalRecord::for_appointment(&appointment, fields);
        let record = self
            .store
            .insert_medical_record(record)
            .await?
            .ok_or(AppointmentError::MedicalRecordExists)?;

        info!("Medical record {} created for appointment {}", record.id, appointment_id);
        Ok(record)
    }

    #[instrument(skip(self, fields))]
    pub async fn update_medical_record(
        &self,
        record_id: Uuid,
        vet_id: Uuid,
        fields: MedicalRecordFields,
    ) -> Result<MedicalRecord, AppointmentError> {
        let mut record = self
            .store
            .get_medical_record(record_id)
            .await?
            .ok_or(AppointmentError::NotFound("Medical record"))?;

        if record.vet_id != vet_id {
            return Err(AppointmentError::Forbidden(
                "only the authoring veterinarian may edit this record".to_string(),
            ));
        }

        record.apply_fields(fields);
        let record = self.store.update_medical_record(record).await?;

        info!("Medical record {} updated", record_id);
        Ok(record)
    }

    /// Newest first. Visible to the pet's owner, veterinarians and admins.
    pub async fn medical_records_for_pet(
        &self,
        pet_id: Uuid,
        actor_id: Uuid,
    ) -> Result<Vec<MedicalRecord>, AppointmentError> {
        debug!("Loading medical history for pet {}", pet_id);

        let pet = self
            .store
            .get_pet(pet_id)
            .await?
            .ok_or(AppointmentError::NotFound("Pet"))?;

        if pet.owner_id != actor_id {
            let staff = self
                .store
                .get_user(actor_id)
                .await?
                .is_some_and(|user| matches!(user.role, UserRole::Veterinarian | UserRole::Admin));
            if !staff {
                return Err(AppointmentError::Forbidden(
                    "only the owner or clinic staff may read this history".to_string(),
                ));
            }
        }

        Ok(self.store.list_medical_records_for_pet(pet_id).await?)
    }
}
