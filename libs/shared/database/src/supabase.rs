use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Client, Method,
};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, error, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::{
    Appointment, AppointmentFilter, AppointmentStatus, AvailabilityRule, MedicalRecord, Pet,
    StorageError, User, Veterinarian,
};

use crate::store::{ClinicStore, RuleInsert, SlotClaim};

#[derive(Debug, Error)]
pub enum SupabaseError {
    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },
}

pub struct SupabaseClient {
    client: Client,
    base_url: String,
    anon_key: String,
    service_role_key: String,
}

impl SupabaseClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.supabase_url.trim_end_matches('/').to_string(),
            anon_key: config.supabase_anon_key.clone(),
            service_role_key: config.supabase_service_role_key.clone(),
        }
    }

    fn get_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();

        headers.insert("apikey", HeaderValue::from_str(&self.anon_key)?);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.service_role_key))?,
        );

        Ok(headers)
    }

    pub async fn request<T>(&self, method: Method, path: &str, body: Option<Value>) -> Result<T>
    where
        T: DeserializeOwned,
    {
        self.request_with_headers(method, path, body, None).await
    }

    pub async fn request_with_headers<T>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        extra_headers: Option<HeaderMap>,
    ) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!("Making {} request to {}", method, url);

        let mut headers = self.get_headers()?;
        if let Some(extra) = extra_headers {
            headers.extend(extra);
        }

        let mut req = self.client.request(method, &url).headers(headers);

        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = req.send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            error!("API error ({}): {}", status, error_text);

            return Err(match status.as_u16() {
                401 | 403 => SupabaseError::Auth(error_text),
                404 => SupabaseError::NotFound(error_text),
                409 => SupabaseError::Conflict(error_text),
                code => SupabaseError::Api { status: code, message: error_text },
            }
            .into());
        }

        let data = response.json::<T>().await?;
        Ok(data)
    }
}

fn is_conflict(err: &anyhow::Error) -> bool {
    matches!(err.downcast_ref::<SupabaseError>(), Some(SupabaseError::Conflict(_)))
}

fn storage_error(err: anyhow::Error) -> StorageError {
    StorageError::new(err.to_string())
}

fn representation_headers(upsert: bool) -> HeaderMap {
    let mut headers = HeaderMap::new();
    let prefer = if upsert {
        "resolution=merge-duplicates,return=representation"
    } else {
        "return=representation"
    };
    headers.insert("Prefer", HeaderValue::from_static(prefer));
    headers
}

fn encode(value: impl ToString) -> String {
    urlencoding::encode(&value.to_string()).into_owned()
}

/// PostgREST query string for an appointment listing.
pub fn appointment_query(filter: &AppointmentFilter) -> String {
    let mut params = Vec::new();

    if let Some(client_id) = filter.client_id {
        params.push(format!("client_id=eq.{}", encode(client_id)));
    }
    if let Some(vet_id) = filter.vet_id {
        params.push(format!("vet_id=eq.{}", encode(vet_id)));
    }
    if let Some(pet_id) = filter.pet_id {
        params.push(format!("pet_id=eq.{}", encode(pet_id)));
    }
    if let Some(status) = filter.status {
        params.push(format!("status=eq.{}", encode(status)));
    }
    if let Some(from) = filter.date_from {
        params.push(format!("date=gte.{}", encode(from)));
    }
    if let Some(to) = filter.date_to {
        params.push(format!("date=lte.{}", encode(to)));
    }
    params.push("order=date.asc,time.asc,created_at.asc".to_string());

    format!("/rest/v1/appointments?{}", params.join("&"))
}

/// `ClinicStore` backed by Supabase's PostgREST API.
///
/// Expects a partial unique index on `appointments (vet_id, date, time)
/// WHERE status <> 'cancelled'` and a unique index on
/// `medical_records (appointment_id)`; both surface as HTTP 409.
pub struct SupabaseStore {
    supabase: SupabaseClient,
}

impl SupabaseStore {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    async fn select<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, StorageError> {
        self.supabase
            .request::<Vec<T>>(Method::GET, path, None)
            .await
            .map_err(storage_error)
    }

    async fn select_one<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>, StorageError> {
        Ok(self.select(path).await?.into_iter().next())
    }

    /// Insert (or upsert) a row and return the stored representation. The raw
    /// error is kept so callers can recognise constraint conflicts.
    async fn write_row<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        row: Value,
        upsert: bool,
    ) -> Result<Option<T>> {
        let rows: Vec<T> = self
            .supabase
            .request_with_headers(method, path, Some(row), Some(representation_headers(upsert)))
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn save<T>(&self, table: &str, row: &T) -> Result<T, StorageError>
    where
        T: serde::Serialize + DeserializeOwned,
    {
        let body = serde_json::to_value(row).map_err(|e| StorageError::new(e.to_string()))?;
        self.write_row(Method::POST, &format!("/rest/v1/{}", table), body, true)
            .await
            .map_err(storage_error)?
            .ok_or_else(|| StorageError::new(format!("{} upsert returned no rows", table)))
    }
}

#[async_trait]
impl ClinicStore for SupabaseStore {
    async fn get_user(&self, id: Uuid) -> Result<Option<User>, StorageError> {
        self.select_one(&format!("/rest/v1/users?id=eq.{}", id)).await
    }

    async fn save_user(&self, user: User) -> Result<User, StorageError> {
        self.save("users", &user).await
    }

    async fn get_veterinarian(&self, id: Uuid) -> Result<Option<Veterinarian>, StorageError> {
        self.select_one(&format!("/rest/v1/veterinarians?id=eq.{}", id)).await
    }

    async fn list_veterinarians(&self) -> Result<Vec<Veterinarian>, StorageError> {
        self.select("/rest/v1/veterinarians?order=name.asc").await
    }

    async fn save_veterinarian(&self, vet: Veterinarian) -> Result<Veterinarian, StorageError> {
        self.save("veterinarians", &vet).await
    }

    async fn get_pet(&self, id: Uuid) -> Result<Option<Pet>, StorageError> {
        self.select_one(&format!("/rest/v1/pets?id=eq.{}", id)).await
    }

    async fn list_pets_by_owner(&self, owner_id: Uuid) -> Result<Vec<Pet>, StorageError> {
        self.select(&format!("/rest/v1/pets?owner_id=eq.{}&order=name.asc", owner_id)).await
    }

    async fn save_pet(&self, pet: Pet) -> Result<Pet, StorageError> {
        self.save("pets", &pet).await
    }

    async fn insert_availability_rule(&self, rule: AvailabilityRule) -> Result<RuleInsert, StorageError> {
        // Also enforced by an exclusion constraint, which surfaces as 409.
        let existing = self.list_availability_rules(rule.vet_id).await?;
        if existing.iter().any(|other| other.overlaps(&rule)) {
            return Ok(RuleInsert::Overlapping);
        }

        let body = serde_json::to_value(&rule).map_err(|e| StorageError::new(e.to_string()))?;
        match self
            .write_row::<AvailabilityRule>(Method::POST, "/rest/v1/availability_rules", body, false)
            .await
        {
            Ok(Some(stored)) => Ok(RuleInsert::Inserted(stored)),
            Ok(None) => Err(StorageError::new("availability rule insert returned no rows")),
            Err(e) if is_conflict(&e) => Ok(RuleInsert::Overlapping),
            Err(e) => Err(storage_error(e)),
        }
    }

    async fn get_availability_rule(&self, id: Uuid) -> Result<Option<AvailabilityRule>, StorageError> {
        self.select_one(&format!("/rest/v1/availability_rules?id=eq.{}", id)).await
    }

    async fn list_availability_rules(&self, vet_id: Uuid) -> Result<Vec<AvailabilityRule>, StorageError> {
        self.select(&format!(
            "/rest/v1/availability_rules?vet_id=eq.{}&order=day_of_week.asc,start_time.asc",
            vet_id
        ))
        .await
    }

    async fn delete_availability_rule(&self, id: Uuid) -> Result<bool, StorageError> {
        let removed: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::DELETE,
                &format!("/rest/v1/availability_rules?id=eq.{}", id),
                None,
                Some(representation_headers(false)),
            )
            .await
            .map_err(storage_error)?;
        Ok(!removed.is_empty())
    }

    async fn insert_appointment_if_slot_free(&self, appointment: Appointment) -> Result<SlotClaim, StorageError> {
        let body = serde_json::to_value(&appointment).map_err(|e| StorageError::new(e.to_string()))?;
        match self
            .write_row::<Appointment>(Method::POST, "/rest/v1/appointments", body, false)
            .await
        {
            Ok(Some(stored)) => Ok(SlotClaim::Claimed(stored)),
            Ok(None) => Err(StorageError::new("appointment insert returned no rows")),
            Err(e) if is_conflict(&e) => {
                warn!("Slot {} rejected by unique index", appointment.slot_key());
                Ok(SlotClaim::Taken)
            }
            Err(e) => Err(storage_error(e)),
        }
    }

    async fn get_appointment(&self, id: Uuid) -> Result<Option<Appointment>, StorageError> {
        self.select_one(&format!("/rest/v1/appointments?id=eq.{}", id)).await
    }

    async fn update_appointment_status(
        &self,
        id: Uuid,
        expected: AppointmentStatus,
        next: AppointmentStatus,
        at: DateTime<Utc>,
    ) -> Result<Option<Appointment>, StorageError> {
        let path = format!("/rest/v1/appointments?id=eq.{}&status=eq.{}", id, expected);
        let body = json!({
            "status": next,
            "updated_at": at.to_rfc3339(),
        });

        self.write_row(Method::PATCH, &path, body, false)
            .await
            .map_err(storage_error)
    }

    async fn list_appointments(&self, filter: &AppointmentFilter) -> Result<Vec<Appointment>, StorageError> {
        self.select(&appointment_query(filter)).await
    }

    async fn insert_medical_record(&self, record: MedicalRecord) -> Result<Option<MedicalRecord>, StorageError> {
        let body = serde_json::to_value(&record).map_err(|e| StorageError::new(e.to_string()))?;
        match self
            .write_row::<MedicalRecord>(Method::POST, "/rest/v1/medical_records", body, false)
            .await
        {
            Ok(Some(stored)) => Ok(Some(stored)),
            Ok(None) => Err(StorageError::new("medical record insert returned no rows")),
            Err(e) if is_conflict(&e) => Ok(None),
            Err(e) => Err(storage_error(e)),
        }
    }

    async fn get_medical_record(&self, id: Uuid) -> Result<Option<MedicalRecord>, StorageError> {
        self.select_one(&format!("/rest/v1/medical_records?id=eq.{}", id)).await
    }

    async fn get_medical_record_for_appointment(
        &self,
        appointment_id: Uuid,
    ) -> Result<Option<MedicalRecord>, StorageError> {
        self.select_one(&format!("/rest/v1/medical_records?appointment_id=eq.{}", appointment_id))
            .await
    }

    async fn update_medical_record(&self, record: MedicalRecord) -> Result<MedicalRecord, StorageError> {
        let body = json!({
            "anamnesis": record.anamnesis,
            "diagnosis": record.diagnosis,
            "prescription": record.prescription,
            "notes": record.notes,
            "updated_at": record.updated_at.to_rfc3339(),
        });

        self.write_row(
            Method::PATCH,
            &format!("/rest/v1/medical_records?id=eq.{}", record.id),
            body,
            false,
        )
        .await
        .map_err(storage_error)?
        .ok_or_else(|| StorageError::new(format!("medical record {} does not exist", record.id)))
    }

    async fn list_medical_records_for_pet(&self, pet_id: Uuid) -> Result<Vec<MedicalRecord>, StorageError> {
        self.select(&format!(
            "/rest/v1/medical_records?pet_id=eq.{}&order=date.desc,time.desc",
            pet_id
        ))
        .await
    }
}
