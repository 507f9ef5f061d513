//! SeaORM implementation of the calculation record store.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, QuerySelect, Set,
};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::ports::{CalculationStore, StoreError};
use crate::domain::CalculationRecord;

use super::entity::calculation;

pub struct SeaCalculationStore {
    db: DatabaseConnection,
}

impl SeaCalculationStore {
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn db_err(e: sea_orm::DbErr) -> StoreError {
    StoreError::new(e.to_string())
}

#[async_trait]
impl CalculationStore for SeaCalculationStore {
    async fn insert(&self, record: &CalculationRecord) -> Result<(), StoreError> {
        let model = calculation::ActiveModel {
            id: Set(record.id),
            base: Set(record.base),
            exponent: Set(record.exponent),
            status: Set(record.status.as_str().to_owned()),
            started_at: Set(record.started_at),
            completed_at: Set(record.completed_at),
            linear_result: Set(record.linear_result),
            exponential_result: Set(record.exponential_result),
            total_steps: Set(record.total_steps),
        };

        model.insert(&self.db).await.map_err(db_err)?;
        Ok(())
    }

    async fn mark_completed(
        &self,
        id: Uuid,
        completed_at: OffsetDateTime,
        linear_result: f64,
        exponential_result: f64,
        total_steps: i32,
    ) -> Result<(), StoreError> {
        let model = calculation::ActiveModel {
            id: Set(id),
            status: Set(crate::domain::CalculationStatus::Completed.as_str().to_owned()),
            completed_at: Set(Some(completed_at)),
            linear_result: Set(Some(linear_result)),
            exponential_result: Set(Some(exponential_result)),
            total_steps: Set(Some(total_steps)),
            ..Default::default()
        };

        calculation::Entity::update(model)
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn mark_error(&self, id: Uuid, completed_at: OffsetDateTime) -> Result<(), StoreError> {
        let model = calculation::ActiveModel {
            id: Set(id),
            status: Set(crate::domain::CalculationStatus::Error.as_str().to_owned()),
            completed_at: Set(Some(completed_at)),
            ..Default::default()
        };

        calculation::Entity::update(model)
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn list_recent(&self, limit: u64) -> Result<Vec<CalculationRecord>, StoreError> {
        calculation::Entity::find()
            .order_by_desc(calculation::Column::StartedAt)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(CalculationRecord::try_from)
            .collect()
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.db.ping().await.map_err(db_err)
    }
}
