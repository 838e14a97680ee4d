use axum::{extract::State, response::IntoResponse, Json};
use crate::api::cache::{self, cache_control};
use crate::api::dtos::responses::{ScheduleDaySummary, ScheduleSummaryResponse};
use crate::domain::services::settings::anchor_times_for;
use crate::error::AppError;
use crate::state::AppState;
use std::sync::Arc;

/// GET /api/v1/schedule. Public weekly summary for the booking form. This
/// is the one availability-adjacent payload that changes rarely, so it gets
/// the long cache TTL.
pub async fn get_schedule(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let config = state.load_settings().await;

    let days = config
        .weekday_rules
        .iter()
        .map(|rule| ScheduleDaySummary {
            weekday: rule.weekday,
            is_open: rule.is_open,
            open: rule.open.clone(),
            close: rule.close.clone(),
            allow_multiple_slots: rule.allow_multiple_slots,
            anchor_times: (rule.is_open && !rule.allow_multiple_slots).then(|| {
                anchor_times_for(rule.weekday)
                    .iter()
                    .map(|t| t.to_string())
                    .collect()
            }),
        })
        .collect();

    Ok((
        cache_control(cache::SCHEDULE_SUMMARY),
        Json(ScheduleSummaryResponse {
            timezone: config.timezone.clone(),
            cancellation_deadline_hours: config.cancellation_deadline_hours,
            days,
        }),
    ))
}
