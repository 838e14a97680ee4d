use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Serialize)]
pub struct AvailabilityResponse {
    pub availability: BTreeMap<String, bool>,
    pub fallback: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

#[derive(Serialize)]
pub struct ScheduleDaySummary {
    pub weekday: u8,
    pub is_open: bool,
    pub open: String,
    pub close: String,
    pub allow_multiple_slots: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anchor_times: Option<Vec<String>>,
}

#[derive(Serialize)]
pub struct ScheduleSummaryResponse {
    pub timezone: String,
    pub cancellation_deadline_hours: i64,
    pub days: Vec<ScheduleDaySummary>,
}
