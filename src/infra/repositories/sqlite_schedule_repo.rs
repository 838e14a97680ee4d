use crate::domain::{models::schedule::ScheduleRecord, ports::ScheduleRepository};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;

pub struct SqliteScheduleRepo {
    pool: SqlitePool,
}

impl SqliteScheduleRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ScheduleRepository for SqliteScheduleRepo {
    async fn get(&self, schedule_id: &str) -> Result<Option<ScheduleRecord>, AppError> {
        sqlx::query_as::<_, ScheduleRecord>("SELECT * FROM schedules WHERE id = ?")
            .bind(schedule_id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn upsert(&self, schedule_id: &str, config_json: &str) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO schedules (id, config_json, updated_at) VALUES (?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET config_json = excluded.config_json, updated_at = excluded.updated_at"
        )
            .bind(schedule_id).bind(config_json).bind(Utc::now())
            .execute(&self.pool).await.map_err(AppError::Database)?;
        Ok(())
    }
}
