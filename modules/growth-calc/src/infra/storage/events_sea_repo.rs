//! SeaORM implementation of the append-only event journal.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use uuid::Uuid;

use crate::domain::ports::{EventJournal, StoreError};
use crate::domain::JournalEvent;

use super::entity::calculation_event;

pub struct SeaEventJournal {
    db: DatabaseConnection,
}

impl SeaEventJournal {
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn db_err(e: sea_orm::DbErr) -> StoreError {
    StoreError::new(e.to_string())
}

#[async_trait]
impl EventJournal for SeaEventJournal {
    async fn append(&self, event: JournalEvent) -> Result<(), StoreError> {
        let model = calculation_event::ActiveModel {
            id: Set(event.id),
            calculation_id: Set(event.calculation_id),
            event_type: Set(event.event_type.as_str().to_owned()),
            message: Set(event.message),
            timestamp: Set(event.at),
            payload: Set(event.payload),
        };

        model.insert(&self.db).await.map_err(db_err)?;
        Ok(())
    }

    async fn for_calculation(&self, calculation_id: Uuid) -> Result<Vec<JournalEvent>, StoreError> {
        calculation_event::Entity::find()
            .filter(calculation_event::Column::CalculationId.eq(calculation_id))
            .order_by_asc(calculation_event::Column::Timestamp)
            .all(&self.db)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(JournalEvent::try_from)
            .collect()
    }

    async fn recent(&self, limit: u64) -> Result<Vec<JournalEvent>, StoreError> {
        calculation_event::Entity::find()
            .order_by_desc(calculation_event::Column::Timestamp)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(JournalEvent::try_from)
            .collect()
    }
}
