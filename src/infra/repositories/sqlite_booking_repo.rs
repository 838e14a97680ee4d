use crate::domain::{models::booking::Booking, ports::BookingRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;
use chrono::NaiveDate;

pub struct SqliteBookingRepo {
    pool: SqlitePool,
}

impl SqliteBookingRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookingRepository for SqliteBookingRepo {
    async fn create_if_slot_free(&self, booking: &Booking, day_capacity: i64, slot_capacity: i64) -> Result<Option<Booking>, AppError> {
        // Check-and-set in a single statement; SQLite's write lock makes the
        // capacity subqueries and the insert atomic with respect to other writers.
        sqlx::query_as::<_, Booking>(
            "INSERT INTO bookings (id, schedule_id, date, time, customer_name, customer_email, customer_note, status, management_token, created_at)
             SELECT ?, ?, ?, ?, ?, ?, ?, ?, ?, ?
             WHERE (SELECT COUNT(*) FROM bookings WHERE schedule_id = ? AND date = ? AND time = ? AND status IN ('PENDING', 'CONFIRMED')) < ?
               AND (SELECT COUNT(*) FROM bookings WHERE schedule_id = ? AND date = ? AND status IN ('PENDING', 'CONFIRMED')) < ?
             RETURNING *"
        )
            .bind(&booking.id).bind(&booking.schedule_id).bind(booking.date).bind(&booking.time)
            .bind(&booking.customer_name).bind(&booking.customer_email).bind(&booking.customer_note)
            .bind(&booking.status).bind(&booking.management_token).bind(booking.created_at)
            .bind(&booking.schedule_id).bind(booking.date).bind(&booking.time).bind(slot_capacity)
            .bind(&booking.schedule_id).bind(booking.date).bind(day_capacity)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<Booking>, AppError> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE management_token = ?")
            .bind(token).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_by_date(&self, schedule_id: &str, date: NaiveDate) -> Result<Vec<Booking>, AppError> {
        sqlx::query_as::<_, Booking>(
            "SELECT * FROM bookings WHERE schedule_id = ? AND date = ? AND status IN ('PENDING', 'CONFIRMED') ORDER BY time ASC"
        )
            .bind(schedule_id).bind(date).fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_by_range(&self, schedule_id: &str, start: NaiveDate, end: NaiveDate) -> Result<Vec<Booking>, AppError> {
        sqlx::query_as::<_, Booking>(
            "SELECT * FROM bookings WHERE schedule_id = ? AND date >= ? AND date <= ? AND status IN ('PENDING', 'CONFIRMED') ORDER BY date ASC, time ASC"
        )
            .bind(schedule_id).bind(start).bind(end).fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn cancel(&self, booking: &Booking) -> Result<Booking, AppError> {
        sqlx::query_as::<_, Booking>("UPDATE bookings SET status = 'CANCELLED' WHERE id = ? RETURNING *")
            .bind(&booking.id).fetch_one(&self.pool).await.map_err(AppError::Database)
    }
}
