// libs/appointment-cell/src/services/booking.rs
use std::sync::Arc;

use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use shared_database::{AppState, ClinicStore, SlotClaim};
use shared_models::time::parse_hhmm;
use shared_models::{
    Appointment, AppointmentFilter, AppointmentStatus, SlotKey, TimeSlot, UserRole, ValidationError,
};
use shared_utils::clock::Clock;
use veterinarian_cell::AvailabilityService;

use crate::models::{AppointmentError, CreateAppointmentRequest};
use crate::services::lifecycle::{check_transition, Party};

/// Books appointments and drives them through their lifecycle.
pub struct AppointmentBookingService {
    store: Arc<dyn ClinicStore>,
    clock: Arc<dyn Clock>,
    availability: AvailabilityService,
    auto_confirm: bool,
}

impl AppointmentBookingService {
    pub fn new(state: &AppState) -> Self {
        Self {
            store: state.store.clone(),
            clock: state.clock.clone(),
            availability: AvailabilityService::new(state),
            auto_confirm: state.config.auto_confirm_appointments,
        }
    }

    /// Book `request` for `client_id`.
    ///
    /// Checks run in order: participants, time format, slot already held
    /// (`SlotConflict`), slot outside availability (`SlotUnavailable`). The
    /// final insert is a check-and-set, so a booking that lost a race after
    /// the checks still ends in `SlotConflict`. Under auto-confirmation the
    /// appointment is inserted already `confirmed`, in the same single write.
    #[instrument(skip(self, request), fields(vet_id = %request.vet_id, date = %request.date))]
    pub async fn create_appointment(
        &self,
        client_id: Uuid,
        request: CreateAppointmentRequest,
    ) -> Result<Appointment, AppointmentError> {
        debug!("Booking appointment for client {} at {}", client_id, request.time);

        self.validate_participants(client_id, &request).await?;
        let time = parse_hhmm("time", &request.time)?;

        let slot = SlotKey {
            vet_id: request.vet_id,
            date: request.date,
            time,
        };

        if self.slot_is_held(&slot).await? {
            warn!("Slot {} is already held", slot);
            return Err(AppointmentError::SlotConflict(slot));
        }

        let open_slots = self.availability.resolve_slots(slot.vet_id, slot.date).await?;
        if !open_slots.contains(&TimeSlot(time)) {
            warn!("Slot {} is not offered", slot);
            return Err(AppointmentError::SlotUnavailable(slot));
        }

        let status = if self.auto_confirm {
            check_transition(AppointmentStatus::Scheduled, AppointmentStatus::Confirmed, Party::System)?;
            AppointmentStatus::Confirmed
        } else {
            AppointmentStatus::Scheduled
        };

        let now = self.clock.now();
        let candidate = Appointment {
            id: Uuid::new_v4(),
            client_id,
            vet_id: slot.vet_id,
            pet_id: request.pet_id,
            date: slot.date,
            time: slot.time,
            status,
            notes: request.notes,
            created_at: now,
            updated_at: now,
        };

        let appointment = match self.store.insert_appointment_if_slot_free(candidate).await? {
            SlotClaim::Claimed(appointment) => appointment,
            SlotClaim::Taken => {
                warn!("Slot {} was taken while booking", slot);
                return Err(AppointmentError::SlotConflict(slot));
            }
        };

        info!("Appointment {} booked at {} as {}", appointment.id, slot, appointment.status);
        Ok(appointment)
    }

    #[instrument(skip(self))]
    pub async fn transition_appointment(
        &self,
        appointment_id: Uuid,
        actor_id: Uuid,
        target: AppointmentStatus,
    ) -> Result<Appointment, AppointmentError> {
        let appointment = self
            .store
            .get_appointment(appointment_id)
            .await?
            .ok_or(AppointmentError::NotFound("Appointment"))?;

        let party = Party::of(&appointment, actor_id);
        self.apply_transition(appointment, target, party).await
    }

    /// Participants and admins only.
    pub async fn get_appointment(&self, appointment_id: Uuid, actor_id: Uuid) -> Result<Appointment, AppointmentError> {
        let appointment = self
            .store
            .get_appointment(appointment_id)
            .await?
            .ok_or(AppointmentError::NotFound("Appointment"))?;

        if appointment.is_participant(actor_id) || self.is_admin(actor_id).await? {
            return Ok(appointment);
        }

        Err(AppointmentError::Forbidden(
            "only participants may view this appointment".to_string(),
        ))
    }

    async fn apply_transition(
        &self,
        appointment: Appointment,
        target: AppointmentStatus,
        party: Party,
    ) -> Result<Appointment, AppointmentError> {
        check_transition(appointment.status, target, party)?;

        let updated = self
            .store
            .update_appointment_status(appointment.id, appointment.status, target, self.clock.now())
            .await?
            .ok_or_else(|| {
                warn!("Appointment {} changed status concurrently", appointment.id);
                AppointmentError::IllegalTransition(format!(
                    "appointment is no longer {}",
                    appointment.status
                ))
            })?;

        info!(
            "Appointment {} moved {} -> {} by {:?}",
            updated.id, appointment.status, updated.status, party
        );
        Ok(updated)
    }

    async fn validate_participants(
        &self,
        client_id: Uuid,
        request: &CreateAppointmentRequest,
    ) -> Result<(), AppointmentError> {
        let client = self.store.get_user(client_id).await?;
        if !client.is_some_and(|user| user.has_role(UserRole::Client)) {
            return Err(ValidationError::new("client_id", "must be a registered client").into());
        }

        let vet = self.store.get_user(request.vet_id).await?;
        if !vet.is_some_and(|user| user.has_role(UserRole::Veterinarian)) {
            return Err(ValidationError::new("vet_id", "must be a registered veterinarian").into());
        }

        let pet = self.store.get_pet(request.pet_id).await?;
        if !pet.is_some_and(|pet| pet.owner_id == client_id) {
            return Err(ValidationError::new("pet_id", "must be a pet owned by the client").into());
        }

        Ok(())
    }

    async fn slot_is_held(&self, slot: &SlotKey) -> Result<bool, AppointmentError> {
        let booked = self
            .store
            .list_appointments(&AppointmentFilter {
                vet_id: Some(slot.vet_id),
                date_from: Some(slot.date),
                date_to: Some(slot.date),
                ..AppointmentFilter::default()
            })
            .await?;

        Ok(booked
            .iter()
            .any(|appointment| appointment.status.holds_slot() && appointment.time == slot.time))
    }

    async fn is_admin(&self, user_id: Uuid) -> Result<bool, AppointmentError> {
        Ok(self
            .store
            .get_user(user_id)
            .await?
            .is_some_and(|user| user.has_role(UserRole::Admin)))
    }
}
