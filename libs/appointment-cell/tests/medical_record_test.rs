use assert_matches::assert_matches;
use chrono::NaiveDate;

use appointment_cell::{
    AppointmentBookingService, AppointmentError, AppointmentQueryService, CreateAppointmentRequest,
    MedicalRecordService,
};
use shared_database::test_support::ClinicFixture;
use shared_models::{Appointment, AppointmentFilter, AppointmentStatus, MedicalRecordFields};

fn fields(diagnosis: &str) -> MedicalRecordFields {
    MedicalRecordFields {
        anamnesis: "Limping on the front left paw for two days".to_string(),
        diagnosis: diagnosis.to_string(),
        prescription: "Rest and anti-inflammatory for 5 days".to_string(),
        notes: String::new(),
    }
}

async fn book(fixture: &ClinicFixture, date: NaiveDate, time: &str) -> Appointment {
    AppointmentBookingService::new(&fixture.state())
        .create_appointment(
            fixture.client.id,
            CreateAppointmentRequest {
                vet_id: fixture.vet.id,
                pet_id: fixture.pet.id,
                date,
                time: time.to_string(),
                notes: None,
            },
        )
        .await
        .unwrap()
}

async fn complete(fixture: &ClinicFixture, appointment: &Appointment) {
    let service = AppointmentBookingService::new(&fixture.state());
    for status in [AppointmentStatus::Confirmed, AppointmentStatus::Completed] {
        service
            .transition_appointment(appointment.id, fixture.vet.id, status)
            .await
            .unwrap();
    }
}

async fn clinic() -> ClinicFixture {
    let fixture = ClinicFixture::new().await;
    fixture.add_rule(fixture.vet.id, 2, "09:00", "12:00").await;
    fixture.add_rule(fixture.vet.id, 4, "14:00", "16:00").await;
    fixture
}

#[tokio::test]
async fn test_record_requires_completed_appointment() {
    let fixture = clinic().await;
    let service = MedicalRecordService::new(&fixture.state());
    let appointment = book(&fixture, fixture.next_weekday(2), "09:00").await;

    assert_matches!(
        service
            .create_medical_record(appointment.id, fixture.vet.id, fields("Sprain"))
            .await,
        Err(AppointmentError::IllegalTransition(_))
    );

    complete(&fixture, &appointment).await;

    let record = service
        .create_medical_record(appointment.id, fixture.vet.id, fields("Sprain"))
        .await
        .unwrap();
    assert_eq!(record.appointment_id, appointment.id);
    assert_eq!(record.pet_id, fixture.pet.id);
    assert_eq!(record.vet_id, fixture.vet.id);
    assert_eq!(record.date, appointment.date);
}

#[tokio::test]
async fn test_one_record_per_appointment() {
    let fixture = clinic().await;
    let service = MedicalRecordService::new(&fixture.state());
    let appointment = book(&fixture, fixture.next_weekday(2), "09:00").await;
    complete(&fixture, &appointment).await;

    service
        .create_medical_record(appointment.id, fixture.vet.id, fields("Sprain"))
        .await
        .unwrap();

    assert_matches!(
        service
            .create_medical_record(appointment.id, fixture.vet.id, fields("Fracture"))
            .await,
        Err(AppointmentError::MedicalRecordExists)
    );
}

#[tokio::test]
async fn test_only_vet_of_record_documents_and_edits() {
    let fixture = clinic().await;
    let other_vet = fixture.add_vet("Dr. Paula Reis").await;
    let service = MedicalRecordService::new(&fixture.state());
    let appointment = book(&fixture, fixture.next_weekday(2), "09:00").await;
    complete(&fixture, &appointment).await;

    assert_matches!(
        service
            .create_medical_record(appointment.id, other_vet.id, fields("Sprain"))
            .await,
        Err(AppointmentError::IllegalTransition(_))
    );
    assert_matches!(
        service
            .create_medical_record(appointment.id, fixture.client.id, fields("Sprain"))
            .await,
        Err(AppointmentError::IllegalTransition(_))
    );

    let record = service
        .create_medical_record(appointment.id, fixture.vet.id, fields("Sprain"))
        .await
        .unwrap();

    assert_matches!(
        service.update_medical_record(record.id, other_vet.id, fields("Fracture")).await,
        Err(AppointmentError::Forbidden(_))
    );

    let updated = service
        .update_medical_record(record.id, fixture.vet.id, fields("Hairline fracture"))
        .await
        .unwrap();
    assert_eq!(updated.id, record.id);
    assert_eq!(updated.diagnosis, "Hairline fracture");
    assert_eq!(updated.appointment_id, appointment.id);
}

#[tokio::test]
async fn test_pet_history_is_newest_first() {
    let fixture = clinic().await;
    let service = MedicalRecordService::new(&fixture.state());

    let tuesday = fixture.next_weekday(2);
    let thursday = fixture.next_weekday(4);
    let earlier = book(&fixture, tuesday, "10:00").await;
    let later = book(&fixture, thursday, "14:30").await;
    let same_day_earlier = book(&fixture, tuesday, "09:00").await;

    for (appointment, diagnosis) in [
        (&earlier, "Otitis"),
        (&later, "Follow-up, healed"),
        (&same_day_earlier, "Vaccination"),
    ] {
        complete(&fixture, appointment).await;
        service
            .create_medical_record(appointment.id, fixture.vet.id, fields(diagnosis))
            .await
            .unwrap();
    }

    let history = service
        .medical_records_for_pet(fixture.pet.id, fixture.client.id)
        .await
        .unwrap();
    let order: Vec<&str> = history.iter().map(|r| r.diagnosis.as_str()).collect();
    assert_eq!(order, vec!["Follow-up, healed", "Otitis", "Vaccination"]);

    assert!(service.medical_records_for_pet(fixture.pet.id, fixture.vet.id).await.is_ok());

    let stranger = fixture.add_client("Bruno Dias").await;
    assert_matches!(
        service.medical_records_for_pet(fixture.pet.id, stranger.id).await,
        Err(AppointmentError::Forbidden(_))
    );
}

#[tokio::test]
async fn test_listings_are_scoped_and_ordered() {
    let fixture = clinic().await;
    let queries = AppointmentQueryService::new(&fixture.state());
    let tuesday = fixture.next_weekday(2);
    let thursday = fixture.next_weekday(4);

    book(&fixture, thursday, "14:00").await;
    book(&fixture, tuesday, "11:00").await;
    book(&fixture, tuesday, "09:30").await;

    let other = fixture.add_client("Bruno Dias").await;
    let other_pet = fixture.add_pet(other.id, "Mel").await;
    AppointmentBookingService::new(&fixture.state())
        .create_appointment(
            other.id,
            CreateAppointmentRequest {
                vet_id: fixture.vet.id,
                pet_id: other_pet.id,
                date: tuesday,
                time: "10:00".to_string(),
                notes: None,
            },
        )
        .await
        .unwrap();

    let mine = queries
        .list_for_actor(fixture.client.id, AppointmentFilter::default())
        .await
        .unwrap();
    let slots: Vec<String> = mine
        .iter()
        .map(|a| format!("{} {}", a.date, a.time.format("%H:%M")))
        .collect();
    assert_eq!(
        slots,
        vec![
            format!("{} 09:30", tuesday),
            format!("{} 11:00", tuesday),
            format!("{} 14:00", thursday),
        ]
    );

    let spoofed = queries
        .list_for_actor(
            other.id,
            AppointmentFilter {
                client_id: Some(fixture.client.id),
                ..AppointmentFilter::default()
            },
        )
        .await
        .unwrap();
    assert!(spoofed.iter().all(|a| a.client_id == other.id));
    assert_eq!(spoofed.len(), 1);

    let agenda = queries
        .appointments_for_vet_on_date(fixture.vet.id, tuesday)
        .await
        .unwrap();
    assert_eq!(agenda.len(), 3);
    assert!(agenda.windows(2).all(|pair| pair[0].time < pair[1].time));

    let scheduled = queries
        .list_for_actor(
            fixture.vet.id,
            AppointmentFilter {
                status: Some(AppointmentStatus::Scheduled),
                date_from: Some(thursday),
                ..AppointmentFilter::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(scheduled.len(), 1);
}

#[tokio::test]
async fn test_agenda_of_another_vet_needs_stored_admin_role() {
    let fixture = clinic().await;
    let queries = AppointmentQueryService::new(&fixture.state());
    let tuesday = fixture.next_weekday(2);
    book(&fixture, tuesday, "09:00").await;

    let own = queries.agenda_for(fixture.vet.id, None, tuesday).await.unwrap();
    assert_eq!(own.len(), 1);

    let other_vet = fixture.add_vet("Dr. Paula Reis").await;
    assert_matches!(
        queries.agenda_for(other_vet.id, Some(fixture.vet.id), tuesday).await,
        Err(AppointmentError::Forbidden(_))
    );
    assert_matches!(
        queries.agenda_for(fixture.client.id, Some(fixture.vet.id), tuesday).await,
        Err(AppointmentError::Forbidden(_))
    );

    let admin = fixture.add_admin().await;
    let seen_by_admin = queries
        .agenda_for(admin.id, Some(fixture.vet.id), tuesday)
        .await
        .unwrap();
    assert_eq!(seen_by_admin, own);
}
