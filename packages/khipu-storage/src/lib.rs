pub mod db;
pub mod models;
pub mod positions;
pub mod relations;
pub mod schema;
pub mod views;

mod error;

pub use error::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;
