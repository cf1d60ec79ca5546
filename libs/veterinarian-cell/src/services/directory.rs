use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use shared_database::{AppState, ClinicStore};
use shared_models::{UserRole, ValidationError, Veterinarian};

use crate::models::{AvailabilityError, RegisterVeterinarianRequest};

pub struct VeterinarianService {
    store: Arc<dyn ClinicStore>,
}

impl VeterinarianService {
    pub fn new(state: &AppState) -> Self {
        Self {
            store: state.store.clone(),
        }
    }

    /// Admins publish a veterinarian-role user to the clinic directory.
    pub async fn register(
        &self,
        actor_id: Uuid,
        request: RegisterVeterinarianRequest,
    ) -> Result<Veterinarian, AvailabilityError> {
        debug!("Registering veterinarian profile for user {}", request.user_id);

        let actor = self.store.get_user(actor_id).await?;
        if !actor.is_some_and(|user| user.has_role(UserRole::Admin)) {
            return Err(AvailabilityError::Forbidden(
                "only admins may register veterinarians".to_string(),
            ));
        }

        let user = self
            .store
            .get_user(request.user_id)
            .await?
            .ok_or_else(|| ValidationError::new("user_id", "no such user"))?;

        if !user.has_role(UserRole::Veterinarian) {
            return Err(ValidationError::new("user_id", "user does not have the veterinarian role").into());
        }

        let vet = Veterinarian {
            id: user.id,
            name: user.name,
            specialty: request.specialty,
            license_number: request.license_number,
            created_at: Utc::now(),
        };
        vet.validate()?;

        let vet = self.store.save_veterinarian(vet).await?;
        info!("Veterinarian {} registered", vet.id);
        Ok(vet)
    }

    pub async fn get(&self, vet_id: Uuid) -> Result<Veterinarian, AvailabilityError> {
        self.store
            .get_veterinarian(vet_id)
            .await?
            .ok_or(AvailabilityError::VeterinarianNotFound)
    }

    pub async fn list(&self) -> Result<Vec<Veterinarian>, AvailabilityError> {
        Ok(self.store.list_veterinarians().await?)
    }
}
