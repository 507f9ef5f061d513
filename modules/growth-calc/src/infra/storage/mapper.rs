//! Conversions between SeaORM models and domain types.

use std::str::FromStr;

use crate::domain::ports::StoreError;
use crate::domain::{CalculationRecord, CalculationStatus, EventType, JournalEvent};

use super::entity::{calculation, calculation_event};

impl TryFrom<calculation::Model> for CalculationRecord {
    type Error = StoreError;

    fn try_from(model: calculation::Model) -> Result<Self, Self::Error> {
        let status = CalculationStatus::from_str(&model.status).map_err(StoreError::new)?;

        Ok(Self {
            id: model.id,
            base: model.base,
            exponent: model.exponent,
            status,
            started_at: model.started_at,
            completed_at: model.completed_at,
            linear_result: model.linear_result,
            exponential_result: model.exponential_result,
            total_steps: model.total_steps,
        })
    }
}

impl TryFrom<calculation_event::Model> for JournalEvent {
    type Error = StoreError;

    fn try_from(model: calculation_event::Model) -> Result<Self, Self::Error> {
        let event_type = EventType::from_str(&model.event_type).map_err(StoreError::new)?;

        Ok(Self {
            id: model.id,
            calculation_id: model.calculation_id,
            event_type,
            message: model.message,
            at: model.timestamp,
            payload: model.payload,
        })
    }
}
