pub mod booking;
pub mod lifecycle;
pub mod medical_record;
pub mod query;

pub use booking::AppointmentBookingService;
pub use lifecycle::{check_transition, Party};
pub use medical_record::MedicalRecordService;
pub use query::AppointmentQueryService;
