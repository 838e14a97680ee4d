use crate::domain::{models::booking::Booking, ports::BookingRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::{PgPool, Row};
use chrono::NaiveDate;

pub struct PostgresBookingRepo {
    pool: PgPool,
}

impl PostgresBookingRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookingRepository for PostgresBookingRepo {
    async fn create_if_slot_free(&self, booking: &Booking, day_capacity: i64, slot_capacity: i64) -> Result<Option<Booking>, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        // Serialize writers per schedule+date; under READ COMMITTED two
        // concurrent capacity checks could otherwise both pass.
        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
            .bind(format!("{}|{}", booking.schedule_id, booking.date))
            .execute(&mut *tx).await.map_err(AppError::Database)?;

        let counts = sqlx::query(
            "SELECT
                COUNT(*) FILTER (WHERE time = $3) AS slot_count,
                COUNT(*) AS day_count
             FROM bookings
             WHERE schedule_id = $1 AND date = $2 AND status IN ('PENDING', 'CONFIRMED')"
        )
            .bind(&booking.schedule_id).bind(booking.date).bind(&booking.time)
            .fetch_one(&mut *tx).await.map_err(AppError::Database)?;

        let slot_count: i64 = counts.get("slot_count");
        let day_count: i64 = counts.get("day_count");

        if slot_count >= slot_capacity || day_count >= day_capacity {
            tx.rollback().await.map_err(AppError::Database)?;
            return Ok(None);
        }

        let created = sqlx::query_as::<_, Booking>(
            "INSERT INTO bookings (id, schedule_id, date, time, customer_name, customer_email, customer_note, status, management_token, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING *"
        )
            .bind(&booking.id).bind(&booking.schedule_id).bind(booking.date).bind(&booking.time)
            .bind(&booking.customer_name).bind(&booking.customer_email).bind(&booking.customer_note)
            .bind(&booking.status).bind(&booking.management_token).bind(booking.created_at)
            .fetch_one(&mut *tx).await.map_err(AppError::Database)?;

        tx.commit().await.map_err(AppError::Database)?;
        Ok(Some(created))
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<Booking>, AppError> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE management_token = $1")
            .bind(token).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_by_date(&self, schedule_id: &str, date: NaiveDate) -> Result<Vec<Booking>, AppError> {
        sqlx::query_as::<_, Booking>(
            "SELECT * FROM bookings WHERE schedule_id = $1 AND date = $2 AND status IN ('PENDING', 'CONFIRMED') ORDER BY time ASC"
        )
            .bind(schedule_id).bind(date).fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_by_range(&self, schedule_id: &str, start: NaiveDate, end: NaiveDate) -> Result<Vec<Booking>, AppError> {
        sqlx::query_as::<_, Booking>(
            "SELECT * FROM bookings WHERE schedule_id = $1 AND date >= $2 AND date <= $3 AND status IN ('PENDING', 'CONFIRMED') ORDER BY date ASC, time ASC"
        )
            .bind(schedule_id).bind(start).bind(end).fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn cancel(&self, booking: &Booking) -> Result<Booking, AppError> {
        sqlx::query_as::<_, Booking>("UPDATE bookings SET status = 'CANCELLED' WHERE id = $1 RETURNING *")
            .bind(&booking.id).fetch_one(&self.pool).await.map_err(AppError::Database)
    }
}
