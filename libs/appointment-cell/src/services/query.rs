// libs/appointment-cell/src/services/query.rs
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, warn};
use uuid::Uuid;

use shared_database::{AppState, ClinicStore};
use shared_models::{Appointment, AppointmentFilter, UserRole};

use crate::models::AppointmentError;

/// Read-side projections, derived from the store on every call.
pub struct AppointmentQueryService {
    store: Arc<dyn ClinicStore>,
}

impl AppointmentQueryService {
    pub fn new(state: &AppState) -> Self {
        Self {
            store: state.store.clone(),
        }
    }

    /// Ordered by `(date, time)` ascending.
    pub async fn list_appointments(&self, filter: &AppointmentFilter) -> Result<Vec<Appointment>, AppointmentError> {
        debug!("Listing appointments with {:?}", filter);
        Ok(self.store.list_appointments(filter).await?)
    }

    pub async fn appointments_for_vet_on_date(
        &self,
        vet_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        self.list_appointments(&AppointmentFilter {
            vet_id: Some(vet_id),
            date_from: Some(date),
            date_to: Some(date),
            ..AppointmentFilter::default()
        })
        .await
    }

    /// `vet_id` defaults to the caller. Reading another veterinarian's agenda
    /// requires the admin role.
    pub async fn agenda_for(
        &self,
        actor_id: Uuid,
        vet_id: Option<Uuid>,
        date: NaiveDate,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        let vet_id = vet_id.unwrap_or(actor_id);
        if vet_id != actor_id && !self.has_role(actor_id, UserRole::Admin).await? {
            warn!("User {} tried to read the agenda of {}", actor_id, vet_id);
            return Err(AppointmentError::Forbidden(
                "veterinarians may only read their own agenda".to_string(),
            ));
        }

        self.appointments_for_vet_on_date(vet_id, date).await
    }

    /// Clients only ever see their own appointments and veterinarians their
    /// own agenda; admins see everything.
    pub async fn list_for_actor(
        &self,
        actor_id: Uuid,
        mut filter: AppointmentFilter,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        let role = self
            .store
            .get_user(actor_id)
            .await?
            .map(|user| user.role)
            .ok_or_else(|| AppointmentError::Forbidden("caller has no clinic profile".to_string()))?;

        match role {
            UserRole::Client => filter.client_id = Some(actor_id),
            UserRole::Veterinarian => filter.vet_id = Some(actor_id),
            UserRole::Admin => {}
        }

        self.list_appointments(&filter).await
    }

    async fn has_role(&self, user_id: Uuid, role: UserRole) -> Result<bool, AppointmentError> {
        Ok(self
            .store
            .get_user(user_id)
            .await?
            .is_some_and(|user| user.has_role(role)))
    }
}
