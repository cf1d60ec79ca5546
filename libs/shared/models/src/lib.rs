pub mod appointment;
pub mod auth;
pub mod error;
pub mod pet;
pub mod schedule;
pub mod time;
pub mod user;
pub mod validation;

pub use appointment::*;
pub use error::{AppError, StorageError, ValidationError};
pub use pet::*;
pub use schedule::*;
pub use user::*;
