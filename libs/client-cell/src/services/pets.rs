use std::sync::Arc;

use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use shared_database::{AppState, ClinicStore};
use shared_models::{CreatePetRequest, Pet, UpdatePetRequest, User, UserRole};

use crate::models::ClientError;

/// Pet registry. Pets are created and edited only by their owning client.
pub struct PetService {
    store: Arc<dyn ClinicStore>,
}

impl PetService {
    pub fn new(state: &AppState) -> Self {
        Self {
            store: state.store.clone(),
        }
    }

    #[instrument(skip(self, request))]
    pub async fn create_pet(&self, owner_id: Uuid, request: CreatePetRequest) -> Result<Pet, ClientError> {
        debug!("Registering pet {} for owner {}", request.name, owner_id);

        let owner = self.load_user(owner_id).await?;
        if !owner.has_role(UserRole::Client) {
            warn!("User {} with role {} tried to register a pet", owner_id, owner.role);
            return Err(ClientError::Forbidden("only clients may register pets".to_string()));
        }

        let pet = Pet::from_request(owner_id, request)?;
        let pet = self.store.save_pet(pet).await?;

        info!("Pet {} registered for owner {}", pet.id, owner_id);
        Ok(pet)
    }

    pub async fn list_pets_for_owner(&self, owner_id: Uuid) -> Result<Vec<Pet>, ClientError> {
        Ok(self.store.list_pets_by_owner(owner_id).await?)
    }

    /// Owners read their own pets; veterinarians and admins read any pet.
    pub async fn get_pet(&self, pet_id: Uuid, actor_id: Uuid) -> Result<Pet, ClientError> {
        let pet = self
            .store
            .get_pet(pet_id)
            .await?
            .ok_or(ClientError::PetNotFound)?;

        if pet.owner_id == actor_id {
            return Ok(pet);
        }

        let actor = self.load_user(actor_id).await?;
        match actor.role {
            UserRole::Veterinarian | UserRole::Admin => Ok(pet),
            UserRole::Client => Err(ClientError::Forbidden("pet belongs to another client".to_string())),
        }
    }

    #[instrument(skip(self, request))]
    pub async fn update_pet(&self, pet_id: Uuid, actor_id: Uuid, request: UpdatePetRequest) -> Result<Pet, ClientError> {
        let pet = self
            .store
            .get_pet(pet_id)
            .await?
            .ok_or(ClientError::PetNotFound)?;

        if pet.owner_id != actor_id {
            warn!("User {} tried to edit pet {} owned by {}", actor_id, pet_id, pet.owner_id);
            return Err(ClientError::Forbidden("only the owner may edit this pet".to_string()));
        }

        let updated = pet.with_update(request)?;
        let updated = self.store.save_pet(updated).await?;

        info!("Pet {} updated", pet_id);
        Ok(updated)
    }

    async fn load_user(&self, user_id: Uuid) -> Result<User, ClientError> {
        self.store
            .get_user(user_id)
            .await?
            .ok_or(ClientError::ProfileNotFound)
    }
}
