//! Slot repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use slothub_core::error::{AppError, ErrorKind};
use slothub_core::result::AppResult;
use slothub_core::types::SlotId;
use slothub_entity::slot::{NewSlot, SlotRow};

use crate::store::SlotStore;

/// PostgreSQL-backed slot storage.
#[derive(Debug, Clone)]
pub struct SlotRepository {
    pool: PgPool,
}

impl SlotRepository {
    /// Create a new slot repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SlotStore for SlotRepository {
    async fn load_all_slots(&self) -> AppResult<Vec<SlotRow>> {
        sqlx::query_as::<_, SlotRow>(
            "SELECT timeslot_id, assistant_id, time, booked, booked_by \
             FROM timeslots ORDER BY time, timeslot_id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load timeslots", e))
    }

    async fn insert_slot(&self, slot: &NewSlot) -> AppResult<SlotId> {
        let id: SlotId = sqlx::query_scalar(
            "INSERT INTO timeslots (assistant_id, time, booked, booked_by) \
             VALUES ($1, $2, FALSE, NULL) RETURNING timeslot_id",
        )
        .bind(&slot.assistant_id)
        .bind(&slot.time)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            let unique = e
                .as_database_error()
                .is_some_and(|db| db.is_unique_violation());
            if unique {
                AppError::with_source(ErrorKind::Conflict, "Timeslot already exists", e)
            } else {
                AppError::with_source(ErrorKind::Database, "Failed to insert timeslot", e)
            }
        })?;

        debug!(slot_id = %id, assistant_id = %slot.assistant_id, "Timeslot row inserted");
        Ok(id)
    }

    async fn upsert_booking(&self, slot_id: SlotId, student_name: &str) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE timeslots SET booked = TRUE, booked_by = $1 WHERE timeslot_id = $2",
        )
        .bind(student_name)
        .bind(slot_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to record booking", e))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!(
                "Timeslot {slot_id} has no durable row"
            )));
        }
        Ok(())
    }

    async fn delete_slot(&self, slot_id: SlotId) -> AppResult<()> {
        sqlx::query("DELETE FROM timeslots WHERE timeslot_id = $1")
            .bind(slot_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete timeslot", e)
            })?;
        Ok(())
    }

    async fn health_check(&self) -> AppResult<bool> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|v| v == 1)
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Health check failed", e))
    }
}
