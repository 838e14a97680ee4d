use axum::http::{header, HeaderName, HeaderValue};

/// Per-endpoint cache directives. TTLs are intentionally tiny for anything
/// derived from live booking state: with no shared memory across serving
/// instances, a longer cache would let two instances contradict each other.
/// Caching here is a latency optimization only; the admission check on the
/// write path is what enforces correctness.
pub const MONTH_AVAILABILITY: &str = "public, max-age=5, stale-while-revalidate=25";
pub const DAY_SLOTS: &str = "public, max-age=3, stale-while-revalidate=15";
/// The weekly schedule summary (hours, anchor times) changes rarely.
pub const SCHEDULE_SUMMARY: &str = "public, max-age=3600, stale-while-revalidate=600";

pub fn cache_control(directive: &'static str) -> [(HeaderName, HeaderValue); 1] {
    [(header::CACHE_CONTROL, HeaderValue::from_static(directive))]
}
