// libs/veterinarian-cell/src/services/availability.rs
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use chrono::{Duration, NaiveDate, NaiveTime};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use shared_database::{AppState, ClinicStore, RuleInsert};
use shared_models::time::day_of_week;
use shared_models::{
    AppointmentFilter, AvailabilityRule, CreateAvailabilityRuleRequest, TimeSlot, UserRole,
    ValidationError,
};
use shared_utils::clock::Clock;

use crate::models::AvailabilityError;

/// Availability rules and the slot resolver built on top of them.
pub struct AvailabilityService {
    store: Arc<dyn ClinicStore>,
    clock: Arc<dyn Clock>,
    granularity: Duration,
    utc_offset_minutes: i32,
}

impl AvailabilityService {
    pub fn new(state: &AppState) -> Self {
        Self {
            store: state.store.clone(),
            clock: state.clock.clone(),
            granularity: Duration::minutes(state.config.slot_granularity_minutes as i64),
            utc_offset_minutes: state.config.clinic_utc_offset_minutes,
        }
    }

    /// Create a weekly availability rule. Only the veterinarian themself or
    /// an admin may do so.
    #[instrument(skip(self, request))]
    pub async fn create_rule(
        &self,
        vet_id: Uuid,
        actor_id: Uuid,
        request: CreateAvailabilityRuleRequest,
    ) -> Result<AvailabilityRule, AvailabilityError> {
        debug!("Creating availability rule for veterinarian {}", vet_id);

        self.authorize_rule_management(vet_id, actor_id).await?;

        if self.store.get_veterinarian(vet_id).await?.is_none() {
            return Err(AvailabilityError::VeterinarianNotFound);
        }

        let rule = AvailabilityRule::from_request(vet_id, &request)?;

        match self.store.insert_availability_rule(rule).await? {
            RuleInsert::Inserted(rule) => {
                info!("Availability rule {} created for veterinarian {}", rule.id, vet_id);
                Ok(rule)
            }
            RuleInsert::Overlapping => {
                warn!("Rejected overlapping availability rule for veterinarian {}", vet_id);
                Err(ValidationError::new(
                    "start_time",
                    "overlaps an existing availability rule on the same day",
                )
                .into())
            }
        }
    }

    pub async fn list_rules(&self, vet_id: Uuid) -> Result<Vec<AvailabilityRule>, AvailabilityError> {
        Ok(self.store.list_availability_rules(vet_id).await?)
    }

    #[instrument(skip(self))]
    pub async fn delete_rule(&self, vet_id: Uuid, rule_id: Uuid, actor_id: Uuid) -> Result<(), AvailabilityError> {
        self.authorize_rule_management(vet_id, actor_id).await?;

        let rule = self
            .store
            .get_availability_rule(rule_id)
            .await?
            .filter(|rule| rule.vet_id == vet_id)
            .ok_or(AvailabilityError::RuleNotFound)?;

        if !self.store.delete_availability_rule(rule.id).await? {
            return Err(AvailabilityError::RuleNotFound);
        }

        info!("Availability rule {} removed for veterinarian {}", rule_id, vet_id);
        Ok(())
    }

    /// Bookable start times for a veterinarian on a date, ascending.
    ///
    /// An empty result covers "no hours that day", "fully booked" and
    /// "already past" alike.
    #[instrument(skip(self))]
    pub async fn resolve_slots(&self, vet_id: Uuid, date: NaiveDate) -> Result<Vec<TimeSlot>, AvailabilityError> {
        let local_now = self.clock.local_now(self.utc_offset_minutes);
        if date < local_now.date() {
            debug!("Date {} is in the past, no slots", date);
            return Ok(Vec::new());
        }

        let weekday = day_of_week(&date);
        let rules = self.store.list_availability_rules(vet_id).await?;
        let mut grid: BTreeSet<NaiveTime> = rules
            .iter()
            .filter(|rule| rule.day_of_week == weekday)
            .flat_map(|rule| expand_rule(rule, self.granularity))
            .collect();

        if grid.is_empty() {
            return Ok(Vec::new());
        }

        let held: HashSet<NaiveTime> = self
            .store
            .list_appointments(&AppointmentFilter {
                vet_id: Some(vet_id),
                date_from: Some(date),
                date_to: Some(date),
                ..AppointmentFilter::default()
            })
            .await?
            .into_iter()
            .filter(|appointment| appointment.status.holds_slot())
            .map(|appointment| appointment.time)
            .collect();

        grid.retain(|time| !held.contains(time));

        if date == local_now.date() {
            let current_time = local_now.time();
            grid.retain(|time| *time >= current_time);
        }

        debug!("Resolved {} slots for veterinarian {} on {}", grid.len(), vet_id, date);
        Ok(grid.into_iter().map(TimeSlot).collect())
    }

    async fn authorize_rule_management(&self, vet_id: Uuid, actor_id: Uuid) -> Result<(), AvailabilityError> {
        if actor_id == vet_id {
            return Ok(());
        }

        let actor = self.store.get_user(actor_id).await?;
        match actor {
            Some(user) if user.has_role(UserRole::Admin) => Ok(()),
            _ => Err(AvailabilityError::Forbidden(
                "only the veterinarian or an admin may manage this schedule".to_string(),
            )),
        }
    }
}

/// Start times of every full slot that fits inside the rule's window.
pub fn expand_rule(rule: &AvailabilityRule, granularity: Duration) -> Vec<NaiveTime> {
    let mut slots = Vec::new();
    if granularity <= Duration::zero() {
        return slots;
    }

    let mut start = rule.start_time;
    loop {
        let (end, wrapped) = start.overflowing_add_signed(granularity);
        if wrapped != 0 || end > rule.end_time {
            break;
        }
        slots.push(start);
        start = end;
    }
    slots
}
