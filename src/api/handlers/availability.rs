use axum::{extract::{Query, State}, response::IntoResponse, Json};
use crate::api::cache::{self, cache_control};
use crate::api::dtos::requests::{AvailabilityQuery, SlotsQuery};
use crate::api::dtos::responses::AvailabilityResponse;
use crate::domain::services::availability::resolve_day;
use crate::domain::services::month::{coarse_month, precise_month};
use crate::error::AppError;
use crate::state::AppState;
use chrono::{NaiveDate, Utc};
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// GET /api/v1/slots?date=YYYY-MM-DD. Per-slot availability for one date.
pub async fn get_slots(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SlotsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let date = NaiveDate::parse_from_str(&params.date, "%Y-%m-%d")
        .map_err(|_| AppError::Validation("Invalid date format (YYYY-MM-DD)".into()))?;

    let config = state.load_settings().await;
    let now = Utc::now().with_timezone(&config.tz());

    // Read paths show optimistically-open slots when the booking store is
    // down; the admission check still rejects stale submissions.
    let bookings = match state
        .booking_repo
        .list_by_date(&state.config.schedule_id, date)
        .await
    {
        Ok(bookings) => bookings,
        Err(e) => {
            warn!("Booking query failed for {}, showing unoccupied slots: {:?}", date, e);
            Vec::new()
        }
    };

    let slots = resolve_day(&config, date, &bookings, now);

    Ok((cache_control(cache::DAY_SLOTS), Json(slots)))
}

/// GET /api/v1/availability?year&month&mode=fast|full. Maps each date of the
/// month to a bookable-at-all flag.
pub async fn get_month_availability(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AvailabilityQuery>,
) -> Result<impl IntoResponse, AppError> {
    if !(1..=12).contains(&params.month) {
        return Err(AppError::Validation("month must be between 1 and 12".into()));
    }
    if !(2000..=2100).contains(&params.year) {
        return Err(AppError::Validation("year out of range".into()));
    }

    let config = state.load_settings().await;
    let now = Utc::now().with_timezone(&config.tz());

    let mode = params.mode.as_deref().unwrap_or("fast");
    if mode != "fast" && mode != "full" {
        return Err(AppError::Validation("mode must be 'fast' or 'full'".into()));
    }

    if mode == "full" {
        let budget = Duration::from_millis(state.config.full_month_budget_ms);
        match precise_month(
            state.booking_repo.as_ref(),
            &state.config.schedule_id,
            &config,
            params.year,
            params.month,
            now,
            budget,
        )
        .await
        {
            Some(availability) => {
                return Ok((
                    cache_control(cache::MONTH_AVAILABILITY),
                    Json(AvailabilityResponse {
                        availability,
                        fallback: false,
                        warning: None,
                    }),
                ));
            }
            None => {
                warn!(
                    "Precise month scan for {}-{:02} exceeded {}ms budget, serving coarse map",
                    params.year, params.month, state.config.full_month_budget_ms
                );
            }
        }
    }

    let availability = coarse_month(&config, params.year, params.month, now.date_naive());
    let degraded = mode == "full";

    Ok((
        cache_control(cache::MONTH_AVAILABILITY),
        Json(AvailabilityResponse {
            availability,
            fallback: degraded,
            warning: degraded.then(|| {
                "Detailed availability took too long; dates shown may already be fully booked.".to_string()
            }),
        }),
    ))
}
