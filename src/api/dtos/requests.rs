use serde::Deserialize;

#[derive(Deserialize)]
pub struct CreateBookingRequest {
    pub date: String,
    pub time: String,
    pub name: String,
    pub email: String,
    pub notes: Option<String>,
}

#[derive(Deserialize)]
pub struct SlotsQuery {
    pub date: String,
}

#[derive(Deserialize)]
pub struct AvailabilityQuery {
    pub year: i32,
    pub month: u32,
    pub mode: Option<String>,
}
