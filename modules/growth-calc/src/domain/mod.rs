//! Domain layer - calculation engine, growth math, and store ports.
//!
//! ## Layering Rules
//!
//! The domain layer:
//! - **MAY** import: `config`, `util`
//! - **MUST NOT** import: `api::*` or `infra::*` (one-way dependency:
//!   API -> Domain <- Infra)
//!
//! The engine (`Service`) receives its store collaborators as trait
//! objects at construction; it never reaches for ambient global state.

pub mod error;
pub mod events;
pub mod growth;
pub mod model;
pub mod ports;
pub mod service;

pub use error::DomainError;
pub use events::{RunSummary, StreamUpdate};
pub use model::{
    CalculationRecord, CalculationRequest, CalculationStatus, EventType, FinishedCalculation,
    GrowthStep, JournalEvent,
};
pub use service::{Service, ServiceConfig};
