use std::sync::Arc;

use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use shared_database::{AppState, ClinicStore};
use shared_models::auth::AuthUser;
use shared_models::{ContactUpdate, User};

use crate::models::{role_from_claim, ClientError, RegisterProfileRequest};

pub struct ProfileService {
    store: Arc<dyn ClinicStore>,
}

impl ProfileService {
    pub fn new(state: &AppState) -> Self {
        Self {
            store: state.store.clone(),
        }
    }

    /// Creates the clinic profile for the token holder. Registration happens
    /// once; later edits go through `update_contact`.
    #[instrument(skip(self, caller, request), fields(user_id = %caller.id))]
    pub async fn register(&self, caller: &AuthUser, request: RegisterProfileRequest) -> Result<User, ClientError> {
        if self.store.get_user(caller.id).await?.is_some() {
            warn!("Profile for user {} already exists", caller.id);
            return Err(ClientError::ProfileExists);
        }

        let email = request
            .email
            .or_else(|| caller.email.clone())
            .unwrap_or_default();
        let role = role_from_claim(caller.role.as_deref());

        let user = User::new(caller.id, request.name, email, request.phone, role);
        user.validate()?;

        let user = self.store.save_user(user).await?;
        info!("Registered {} profile for user {}", user.role, user.id);
        Ok(user)
    }

    pub async fn get(&self, user_id: Uuid) -> Result<User, ClientError> {
        self.store
            .get_user(user_id)
            .await?
            .ok_or(ClientError::ProfileNotFound)
    }

    #[instrument(skip(self, update))]
    pub async fn update_contact(&self, user_id: Uuid, update: ContactUpdate) -> Result<User, ClientError> {
        debug!("Updating contact details for user {}", user_id);

        let mut user = self.get(user_id).await?;
        user.apply_contact_update(update)?;

        let user = self.store.save_user(user).await?;
        info!("Contact details updated for user {}", user_id);
        Ok(user)
    }
}
