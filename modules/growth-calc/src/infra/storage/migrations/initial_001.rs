use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::ConnectionTrait;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();
        let conn = manager.get_connection();

        let sql = match backend {
            sea_orm::DatabaseBackend::Postgres => {
                r#"
CREATE TABLE IF NOT EXISTS calculations (
    id UUID PRIMARY KEY NOT NULL,
    base DOUBLE PRECISION NOT NULL,
    exponent INTEGER NOT NULL,
    status VARCHAR(32) NOT NULL,
    started_at TIMESTAMPTZ NOT NULL,
    completed_at TIMESTAMPTZ,
    linear_result DOUBLE PRECISION,
    exponential_result DOUBLE PRECISION,
    total_steps INTEGER
);

CREATE INDEX IF NOT EXISTS idx_calculations_started_at ON calculations(started_at);

CREATE TABLE IF NOT EXISTS calculation_events (
    id UUID PRIMARY KEY NOT NULL,
    calculation_id UUID NOT NULL,
    event_type VARCHAR(64) NOT NULL,
    message TEXT NOT NULL,
    timestamp TIMESTAMPTZ NOT NULL,
    payload JSONB
);

CREATE INDEX IF NOT EXISTS idx_events_calculation_id ON calculation_events(calculation_id);
CREATE INDEX IF NOT EXISTS idx_events_timestamp ON calculation_events(timestamp);
                "#
            }
            sea_orm::DatabaseBackend::MySql => {
                r#"
CREATE TABLE IF NOT EXISTS calculations (
    id VARCHAR(36) PRIMARY KEY NOT NULL,
    base DOUBLE NOT NULL,
    exponent INT NOT NULL,
    status VARCHAR(32) NOT NULL,
    started_at TIMESTAMP(6) NOT NULL,
    completed_at TIMESTAMP(6) NULL,
    linear_result DOUBLE NULL,
    exponential_result DOUBLE NULL,
    total_steps INT NULL,
    KEY idx_calculations_started_at (started_at)
);

CREATE TABLE IF NOT EXISTS calculation_events (
    id VARCHAR(36) PRIMARY KEY NOT NULL,
    calculation_id VARCHAR(36) NOT NULL,
    event_type VARCHAR(64) NOT NULL,
    message TEXT NOT NULL,
    timestamp TIMESTAMP(6) NOT NULL,
    payload JSON NULL,
    KEY idx_events_calculation_id (calculation_id),
    KEY idx_events_timestamp (timestamp)
);
                "#
            }
            sea_orm::DatabaseBackend::Sqlite => {
                r#"
CREATE TABLE IF NOT EXISTS calculations (
    id TEXT PRIMARY KEY NOT NULL,
    base REAL NOT NULL,
    exponent INTEGER NOT NULL,
    status TEXT NOT NULL,
    started_at TEXT NOT NULL,
    completed_at TEXT,
    linear_result REAL,
    exponential_result REAL,
    total_steps INTEGER
);

CREATE INDEX IF NOT EXISTS idx_calculations_started_at ON calculations(started_at);

CREATE TABLE IF NOT EXISTS calculation_events (
    id TEXT PRIMARY KEY NOT NULL,
    calculation_id TEXT NOT NULL,
    event_type TEXT NOT NULL,
    message TEXT NOT NULL,
    timestamp TEXT NOT NULL,
    payload TEXT
);

CREATE INDEX IF NOT EXISTS idx_events_calculation_id ON calculation_events(calculation_id);
CREATE INDEX IF NOT EXISTS idx_events_timestamp ON calculation_events(timestamp);
                "#
            }
        };

        conn.execute_unprepared(sql).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let conn = manager.get_connection();
        conn.execute_unprepared("DROP TABLE IF EXISTS calculation_events;")
            .await?;
        conn.execute_unprepared("DROP TABLE IF EXISTS calculations;")
            .await?;
        Ok(())
    }
}
