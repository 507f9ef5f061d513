//! SeaORM-backed implementations of the store ports.

pub mod entity;
pub mod migrations;

mod calculations_sea_repo;
mod events_sea_repo;
mod mapper;

pub use calculations_sea_repo::SeaCalculationStore;
pub use events_sea_repo::SeaEventJournal;
