pub mod categories;
pub mod db;
pub mod membership;
pub mod models;
pub mod queries;
pub mod reminders;
pub mod retry;
pub mod schema;

mod error;

pub use error::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;
