use crate::domain::models::{booking::Booking, schedule::ScheduleRecord};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::NaiveDate;

#[async_trait]
pub trait ScheduleRepository: Send + Sync {
    async fn get(&self, schedule_id: &str) -> Result<Option<ScheduleRecord>, AppError>;
    async fn upsert(&self, schedule_id: &str, config_json: &str) -> Result<(), AppError>;
}

#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Conditional create: inserts only while both the per-slot and the
    /// per-day counts of active bookings are below their caps, atomically
    /// with respect to other writers on the same date. Returns None when
    /// the slot was taken in the meantime.
    async fn create_if_slot_free(
        &self,
        booking: &Booking,
        day_capacity: i64,
        slot_capacity: i64,
    ) -> Result<Option<Booking>, AppError>;

    async fn find_by_token(&self, token: &str) -> Result<Option<Booking>, AppError>;
    async fn list_by_date(&self, schedule_id: &str, date: NaiveDate) -> Result<Vec<Booking>, AppError>;
    async fn list_by_range(&self, schedule_id: &str, start: NaiveDate, end: NaiveDate) -> Result<Vec<Booking>, AppError>;
    async fn cancel(&self, booking: &Booking) -> Result<Booking, AppError>;
}
