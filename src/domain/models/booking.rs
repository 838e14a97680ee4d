use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;
use rand::{distributions::Alphanumeric, Rng};

pub const STATUS_PENDING: &str = "PENDING";
pub const STATUS_CONFIRMED: &str = "CONFIRMED";
pub const STATUS_COMPLETED: &str = "COMPLETED";
pub const STATUS_CANCELLED: &str = "CANCELLED";

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Booking {
    pub id: String,
    pub schedule_id: String,
    pub date: NaiveDate,
    /// Slot start in salon-local "HH:MM".
    pub time: String,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_note: Option<String>,
    pub status: String,
    pub management_token: String,
    pub created_at: DateTime<Utc>,
}

pub struct NewBookingParams {
    pub schedule_id: String,
    pub date: NaiveDate,
    pub time: String,
    pub name: String,
    pub email: String,
    pub note: Option<String>,
}

impl Booking {
    pub fn new(params: NewBookingParams) -> Self {
        let token: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(48)
            .map(char::from)
            .collect();

        Self {
            id: Uuid::new_v4().to_string(),
            schedule_id: params.schedule_id,
            date: params.date,
            time: params.time,
            customer_name: params.name,
            customer_email: params.email,
            customer_note: params.note,
            status: STATUS_CONFIRMED.to_string(),
            management_token: token,
            created_at: Utc::now(),
        }
    }

    /// Only pending and confirmed bookings count against capacity.
    pub fn is_active(&self) -> bool {
        self.status == STATUS_PENDING || self.status == STATUS_CONFIRMED
    }
}
