use assert_matches::assert_matches;
use chrono::{Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use uuid::Uuid;

use shared_database::test_support::ClinicFixture;
use shared_database::{ClinicStore, SlotClaim};
use shared_models::{Appointment, AppointmentStatus, CreateAvailabilityRuleRequest, TimeSlot};
use veterinarian_cell::{AvailabilityError, AvailabilityService, RegisterVeterinarianRequest, VeterinarianService};

fn labels(slots: &[TimeSlot]) -> Vec<String> {
    slots.iter().map(|slot| slot.to_string()).collect()
}

fn rule_request(day_of_week: i32, start: &str, end: &str) -> CreateAvailabilityRuleRequest {
    CreateAvailabilityRuleRequest {
        day_of_week,
        start_time: start.to_string(),
        end_time: end.to_string(),
    }
}

async fn hold_slot(fixture: &ClinicFixture, date: NaiveDate, hour: u32, minute: u32) -> Appointment {
    let now = Utc::now();
    let appointment = Appointment {
        id: Uuid::new_v4(),
        client_id: fixture.client.id,
        vet_id: fixture.vet.id,
        pet_id: fixture.pet.id,
        date,
        time: NaiveTime::from_hms_opt(hour, minute, 0).unwrap(),
        status: AppointmentStatus::Scheduled,
        notes: None,
        created_at: now,
        updated_at: now,
    };
    match fixture.store.insert_appointment_if_slot_free(appointment).await.unwrap() {
        SlotClaim::Claimed(stored) => stored,
        SlotClaim::Taken => panic!("slot already held"),
    }
}

#[tokio::test]
async fn test_weekly_rule_expands_into_slots() {
    let fixture = ClinicFixture::new().await;
    fixture.add_rule(fixture.vet.id, 2, "09:00", "10:00").await;
    let service = AvailabilityService::new(&fixture.state());

    let tuesday = fixture.next_weekday(2);
    let slots = service.resolve_slots(fixture.vet.id, tuesday).await.unwrap();

    assert_eq!(labels(&slots), vec!["09:00", "09:30"]);
}

#[tokio::test]
async fn test_held_slot_disappears_and_returns_after_cancel() {
    let fixture = ClinicFixture::new().await;
    fixture.add_rule(fixture.vet.id, 2, "09:00", "10:00").await;
    let service = AvailabilityService::new(&fixture.state());
    let tuesday = fixture.next_weekday(2);

    let booked = hold_slot(&fixture, tuesday, 9, 0).await;
    let slots = service.resolve_slots(fixture.vet.id, tuesday).await.unwrap();
    assert_eq!(labels(&slots), vec!["09:30"]);

    fixture
        .store
        .update_appointment_status(booked.id, AppointmentStatus::Scheduled, AppointmentStatus::Cancelled, Utc::now())
        .await
        .unwrap()
        .unwrap();

    let slots = service.resolve_slots(fixture.vet.id, tuesday).await.unwrap();
    assert_eq!(labels(&slots), vec!["09:00", "09:30"]);
}

#[tokio::test]
async fn test_completed_appointment_keeps_holding_slot() {
    let fixture = ClinicFixture::new().await;
    fixture.add_rule(fixture.vet.id, 2, "09:00", "10:00").await;
    let service = AvailabilityService::new(&fixture.state());
    let tuesday = fixture.next_weekday(2);

    let booked = hold_slot(&fixture, tuesday, 9, 30).await;
    for (from, to) in [
        (AppointmentStatus::Scheduled, AppointmentStatus::Confirmed),
        (AppointmentStatus::Confirmed, AppointmentStatus::Completed),
    ] {
        fixture
            .store
            .update_appointment_status(booked.id, from, to, Utc::now())
            .await
            .unwrap()
            .unwrap();
    }

    let slots = service.resolve_slots(fixture.vet.id, tuesday).await.unwrap();
    assert_eq!(labels(&slots), vec!["09:00"]);
}

#[tokio::test]
async fn test_resolved_slots_are_a_sorted_subset_of_the_grid() {
    let fixture = ClinicFixture::new().await;
    fixture.add_rule(fixture.vet.id, 3, "14:00", "16:00").await;
    fixture.add_rule(fixture.vet.id, 3, "08:00", "09:30").await;
    let service = AvailabilityService::new(&fixture.state());
    let wednesday = fixture.next_weekday(3);

    hold_slot(&fixture, wednesday, 8, 30).await;
    hold_slot(&fixture, wednesday, 15, 0).await;

    let slots = service.resolve_slots(fixture.vet.id, wednesday).await.unwrap();
    assert_eq!(labels(&slots), vec!["08:00", "09:00", "14:00", "14:30", "15:30"]);

    let mut sorted = slots.clone();
    sorted.sort();
    sorted.dedup();
    assert_eq!(sorted, slots);
}

#[tokio::test]
async fn test_day_without_rules_has_no_slots() {
    let fixture = ClinicFixture::new().await;
    fixture.add_rule(fixture.vet.id, 2, "09:00", "10:00").await;
    let service = AvailabilityService::new(&fixture.state());

    let slots = service.resolve_slots(fixture.vet.id, fixture.next_weekday(4)).await.unwrap();
    assert!(slots.is_empty());
}

#[tokio::test]
async fn test_unknown_veterinarian_has_no_slots() {
    let fixture = ClinicFixture::new().await;
    let service = AvailabilityService::new(&fixture.state());

    let slots = service.resolve_slots(Uuid::new_v4(), fixture.next_weekday(2)).await.unwrap();
    assert!(slots.is_empty());
}

#[tokio::test]
async fn test_past_dates_have_no_slots() {
    let fixture = ClinicFixture::new().await;
    fixture.add_rule(fixture.vet.id, 2, "09:00", "10:00").await;
    let service = AvailabilityService::new(&fixture.state());

    let last_tuesday = fixture.next_weekday(2) - Duration::days(7);
    assert!(last_tuesday < fixture.today());

    let slots = service.resolve_slots(fixture.vet.id, last_tuesday).await.unwrap();
    assert!(slots.is_empty());
}

#[tokio::test]
async fn test_today_drops_slots_that_already_started() {
    // Sunday 08:00 UTC
    let fixture = ClinicFixture::new().await;
    fixture.add_rule(fixture.vet.id, 0, "07:00", "10:00").await;
    let state = fixture.state();
    let service = AvailabilityService::new(&state);
    let today = fixture.today();

    let slots = service.resolve_slots(fixture.vet.id, today).await.unwrap();
    assert_eq!(labels(&slots), vec!["08:00", "08:30", "09:00", "09:30"]);

    fixture.clock.advance(Duration::minutes(10));
    let slots = service.resolve_slots(fixture.vet.id, today).await.unwrap();
    assert_eq!(labels(&slots), vec!["08:30", "09:00", "09:30"]);
}

#[tokio::test]
async fn test_clinic_offset_decides_what_today_means() {
    // 01:00 UTC Monday is still Sunday 22:00 at UTC-3
    let mut fixture = ClinicFixture::at(Utc.with_ymd_and_hms(2026, 10, 19, 1, 0, 0).unwrap()).await;
    fixture.config.clinic_utc_offset_minutes = -180;
    fixture.add_rule(fixture.vet.id, 0, "21:00", "23:00").await;
    let service = AvailabilityService::new(&fixture.state());

    let sunday = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
    assert_eq!(fixture.today(), sunday);

    let slots = service.resolve_slots(fixture.vet.id, sunday).await.unwrap();
    assert_eq!(labels(&slots), vec!["22:00", "22:30"]);
}

#[tokio::test]
async fn test_granularity_comes_from_config() {
    let mut fixture = ClinicFixture::new().await;
    fixture.config.slot_granularity_minutes = 45;
    fixture.add_rule(fixture.vet.id, 2, "09:00", "11:00").await;
    let service = AvailabilityService::new(&fixture.state());

    let slots = service.resolve_slots(fixture.vet.id, fixture.next_weekday(2)).await.unwrap();
    assert_eq!(labels(&slots), vec!["09:00", "09:45"]);
}

#[tokio::test]
async fn test_vet_creates_own_rule() {
    let fixture = ClinicFixture::new().await;
    let service = AvailabilityService::new(&fixture.state());

    let rule = service
        .create_rule(fixture.vet.id, fixture.vet.id, rule_request(1, "13:00", "17:00"))
        .await
        .unwrap();

    assert_eq!(rule.vet_id, fixture.vet.id);
    assert_eq!(rule.day_of_week, 1);
    assert_eq!(service.list_rules(fixture.vet.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_overlapping_rule_is_a_validation_error() {
    let fixture = ClinicFixture::new().await;
    fixture.add_rule(fixture.vet.id, 2, "09:00", "12:00").await;
    let service = AvailabilityService::new(&fixture.state());

    let result = service
        .create_rule(fixture.vet.id, fixture.vet.id, rule_request(2, "11:30", "13:00"))
        .await;

    assert_matches!(result, Err(AvailabilityError::Validation(e)) if e.field == "start_time");
}

#[tokio::test]
async fn test_adjacent_rules_do_not_overlap() {
    let fixture = ClinicFixture::new().await;
    fixture.add_rule(fixture.vet.id, 2, "09:00", "12:00").await;
    let service = AvailabilityService::new(&fixture.state());

    service
        .create_rule(fixture.vet.id, fixture.vet.id, rule_request(2, "12:00", "13:00"))
        .await
        .unwrap();

    let slots = service.resolve_slots(fixture.vet.id, fixture.next_weekday(2)).await.unwrap();
    assert_eq!(slots.len(), 8);
}

#[tokio::test]
async fn test_inverted_rule_window_is_rejected() {
    let fixture = ClinicFixture::new().await;
    let service = AvailabilityService::new(&fixture.state());

    let result = service
        .create_rule(fixture.vet.id, fixture.vet.id, rule_request(2, "12:00", "09:00"))
        .await;
    assert_matches!(result, Err(AvailabilityError::Validation(_)));

    let result = service
        .create_rule(fixture.vet.id, fixture.vet.id, rule_request(7, "09:00", "10:00"))
        .await;
    assert_matches!(result, Err(AvailabilityError::Validation(e)) if e.field == "day_of_week");
}

#[tokio::test]
async fn test_other_users_cannot_manage_schedule() {
    let fixture = ClinicFixture::new().await;
    let other_vet = fixture.add_vet("Dr. Paula Reis").await;
    let service = AvailabilityService::new(&fixture.state());

    let by_client = service
        .create_rule(fixture.vet.id, fixture.client.id, rule_request(2, "09:00", "10:00"))
        .await;
    assert_matches!(by_client, Err(AvailabilityError::Forbidden(_)));

    let rule = fixture.add_rule(fixture.vet.id, 2, "09:00", "10:00").await;
    let by_other_vet = service.delete_rule(fixture.vet.id, rule.id, other_vet.id).await;
    assert_matches!(by_other_vet, Err(AvailabilityError::Forbidden(_)));
}

#[tokio::test]
async fn test_admin_manages_any_schedule() {
    let fixture = ClinicFixture::new().await;
    let admin = fixture.add_admin().await;
    let service = AvailabilityService::new(&fixture.state());

    let rule = service
        .create_rule(fixture.vet.id, admin.id, rule_request(5, "08:00", "12:00"))
        .await
        .unwrap();
    service.delete_rule(fixture.vet.id, rule.id, admin.id).await.unwrap();

    assert!(service.list_rules(fixture.vet.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_rule_for_unregistered_vet_is_not_found() {
    let fixture = ClinicFixture::new().await;
    let admin = fixture.add_admin().await;
    let service = AvailabilityService::new(&fixture.state());

    let result = service
        .create_rule(Uuid::new_v4(), admin.id, rule_request(2, "09:00", "10:00"))
        .await;
    assert_matches!(result, Err(AvailabilityError::VeterinarianNotFound));
}

#[tokio::test]
async fn test_deleting_missing_rule_is_not_found() {
    let fixture = ClinicFixture::new().await;
    let other_vet = fixture.add_vet("Dr. Paula Reis").await;
    let foreign_rule = fixture.add_rule(other_vet.id, 2, "09:00", "10:00").await;
    let service = AvailabilityService::new(&fixture.state());

    assert_matches!(
        service.delete_rule(fixture.vet.id, Uuid::new_v4(), fixture.vet.id).await,
        Err(AvailabilityError::RuleNotFound)
    );
    assert_matches!(
        service.delete_rule(fixture.vet.id, foreign_rule.id, fixture.vet.id).await,
        Err(AvailabilityError::RuleNotFound)
    );
}

#[tokio::test]
async fn test_admin_registers_veterinarian() {
    let fixture = ClinicFixture::new().await;
    let admin = fixture.add_admin().await;
    let service = VeterinarianService::new(&fixture.state());

    let user = shared_models::User::new(
        Uuid::new_v4(),
        "Dr. Marta Alves".to_string(),
        "marta@clinic.example.com".to_string(),
        None,
        shared_models::UserRole::Veterinarian,
    );
    fixture.store.save_user(user.clone()).await.unwrap();

    let vet = service
        .register(
            admin.id,
            RegisterVeterinarianRequest {
                user_id: user.id,
                specialty: Some("Dermatology".to_string()),
                license_number: Some("CRMV-SP 12345".to_string()),
            },
        )
        .await
        .unwrap();

    assert_eq!(vet.id, user.id);
    assert_eq!(vet.name, "Dr. Marta Alves");
    assert_eq!(service.list().await.unwrap().len(), 2);
    assert_eq!(service.get(user.id).await.unwrap().specialty.as_deref(), Some("Dermatology"));
}

#[tokio::test]
async fn test_register_requires_admin_and_vet_role() {
    let fixture = ClinicFixture::new().await;
    let admin = fixture.add_admin().await;
    let service = VeterinarianService::new(&fixture.state());

    let request = |user_id| RegisterVeterinarianRequest {
        user_id,
        specialty: None,
        license_number: None,
    };

    assert_matches!(
        service.register(fixture.vet.id, request(fixture.vet.id)).await,
        Err(AvailabilityError::Forbidden(_))
    );
    assert_matches!(
        service.register(admin.id, request(fixture.client.id)).await,
        Err(AvailabilityError::Validation(e)) if e.field == "user_id"
    );
    assert_matches!(service.get(Uuid::new_v4()).await, Err(AvailabilityError::VeterinarianNotFound));
}
