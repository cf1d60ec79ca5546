use std::sync::Arc;

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::{AvailabilityRule, CreatePetRequest, Pet, Species, User, UserRole, Veterinarian};
use shared_utils::clock::{Clock, FixedClock};

use crate::memory::InMemoryStore;
use crate::state::AppState;
use crate::store::{ClinicStore, RuleInsert};

/// A seeded in-memory clinic: one client owning one pet and one
/// veterinarian, with the clock frozen at `now`.
pub struct ClinicFixture {
    pub store: Arc<InMemoryStore>,
    pub clock: Arc<FixedClock>,
    pub config: AppConfig,
    pub client: User,
    pub vet: User,
    pub pet: Pet,
}

impl ClinicFixture {
    /// Frozen at Sunday 2026-10-18 08:00 UTC.
    pub async fn new() -> Self {
        Self::at(Utc.with_ymd_and_hms(2026, 10, 18, 8, 0, 0).unwrap()).await
    }

    pub async fn at(now: DateTime<Utc>) -> Self {
        let store = Arc::new(InMemoryStore::new());
        let clock = Arc::new(FixedClock::new(now));

        let client = seed_user(store.as_ref(), "Ana Souza", "ana@example.com", UserRole::Client).await;
        let vet = seed_veterinarian(store.as_ref(), "Dr. Carlos Lima").await;
        let pet = seed_pet(store.as_ref(), client.id, "Thor").await;

        Self {
            store,
            clock,
            config: AppConfig::default(),
            client,
            vet,
            pet,
        }
    }

    pub fn state(&self) -> AppState {
        AppState::new(self.config.clone(), self.store.clone(), self.clock.clone())
    }

    pub async fn add_client(&self, name: &str) -> User {
        let email = format!("{}@example.com", name.to_lowercase().replace(' ', "."));
        seed_user(self.store.as_ref(), name, &email, UserRole::Client).await
    }

    pub async fn add_admin(&self) -> User {
        seed_user(self.store.as_ref(), "Clinic Admin", "admin@example.com", UserRole::Admin).await
    }

    pub async fn add_vet(&self, name: &str) -> User {
        seed_veterinarian(self.store.as_ref(), name).await
    }

    pub async fn add_pet(&self, owner_id: Uuid, name: &str) -> Pet {
        seed_pet(self.store.as_ref(), owner_id, name).await
    }

    /// Stores a rule directly, bypassing role checks.
    pub async fn add_rule(&self, vet_id: Uuid, day_of_week: i32, start: &str, end: &str) -> AvailabilityRule {
        let rule = AvailabilityRule {
            id: Uuid::new_v4(),
            vet_id,
            day_of_week,
            start_time: shared_models::time::parse_hhmm("start_time", start).unwrap(),
            end_time: shared_models::time::parse_hhmm("end_time", end).unwrap(),
            created_at: Utc::now(),
        };
        match self.store.insert_availability_rule(rule).await.unwrap() {
            RuleInsert::Inserted(rule) => rule,
            RuleInsert::Overlapping => panic!("fixture rule overlaps an existing rule"),
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.local_now(self.config.clinic_utc_offset_minutes).date()
    }

    /// First date strictly after today falling on `day_of_week` (0 = Sunday).
    pub fn next_weekday(&self, day_of_week: i32) -> NaiveDate {
        next_weekday_after(self.today(), day_of_week)
    }
}

pub fn next_weekday_after(from: NaiveDate, day_of_week: i32) -> NaiveDate {
    let current = from.weekday().num_days_from_sunday() as i32;
    let mut delta = (day_of_week - current).rem_euclid(7);
    if delta == 0 {
        delta = 7;
    }
    from + Duration::days(delta as i64)
}

async fn seed_user(store: &InMemoryStore, name: &str, email: &str, role: UserRole) -> User {
    let user = User::new(Uuid::new_v4(), name.to_string(), email.to_string(), None, role);
    store.save_user(user).await.unwrap()
}

async fn seed_veterinarian(store: &InMemoryStore, name: &str) -> User {
    let email = format!("{}@clinic.example.com", name.to_lowercase().replace(['.', ' '], ""));
    let user = seed_user(store, name, &email, UserRole::Veterinarian).await;
    store
        .save_veterinarian(Veterinarian {
            id: user.id,
            name: user.name.clone(),
            specialty: Some("Clinical practice".to_string()),
            license_number: None,
            created_at: Utc::now(),
        })
        .await
        .unwrap();
    user
}

async fn seed_pet(store: &InMemoryStore, owner_id: Uuid, name: &str) -> Pet {
    let pet = Pet::from_request(
        owner_id,
        CreatePetRequest {
            name: name.to_string(),
            species: Species::Dog,
            breed: "Mixed".to_string(),
            age: 3,
            weight: 12.0,
            notes: None,
        },
    )
    .unwrap();
    store.save_pet(pet).await.unwrap()
}
