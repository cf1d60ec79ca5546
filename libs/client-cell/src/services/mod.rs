pub mod pets;
pub mod profile;

pub use pets::PetService;
pub use profile::ProfileService;
