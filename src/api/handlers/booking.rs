use axum::{extract::{Path, State}, http::StatusCode, response::IntoResponse, Json};
use crate::api::dtos::requests::CreateBookingRequest;
use crate::domain::models::booking::{Booking, NewBookingParams, STATUS_CANCELLED};
use crate::domain::services::availability::resolve_day;
use crate::error::AppError;
use crate::state::AppState;
use chrono::{Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use std::sync::Arc;
use tracing::{info, warn};

/// POST /api/v1/bookings. The admission check lives here: availability is
/// re-resolved from live data, then the insert itself is conditional, so two
/// racing customers cannot both take the last slot.
pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateBookingRequest>,
) -> Result<impl IntoResponse, AppError> {
    let date = NaiveDate::parse_from_str(&payload.date, "%Y-%m-%d")
        .map_err(|_| AppError::Validation("Invalid date format (YYYY-MM-DD)".into()))?;
    let time = NaiveTime::parse_from_str(&payload.time, "%H:%M")
        .map_err(|_| AppError::Validation("Invalid time format (HH:MM)".into()))?;
    let time = time.format("%H:%M").to_string();

    if payload.name.trim().is_empty() {
        return Err(AppError::Validation("Name is required".into()));
    }

    let config = state.load_settings().await;
    let now = Utc::now().with_timezone(&config.tz());

    if date < now.date_naive() {
        return Err(AppError::Validation("Cannot book in the past".into()));
    }
    if config.is_blocked(date) {
        return Err(AppError::Conflict("Date is not open for booking".into()));
    }

    // Unlike the display paths, the write path does not degrade on a failed
    // booking read; stale admission data is exactly what this guard exists
    // to prevent.
    let existing = state
        .booking_repo
        .list_by_date(&state.config.schedule_id, date)
        .await?;

    let slots = resolve_day(&config, date, &existing, now);
    let requested = slots.iter().find(|s| s.time == time);
    match requested {
        Some(slot) if slot.available => {}
        Some(_) => {
            warn!("Booking rejected: slot {} {} already occupied", date, time);
            return Err(AppError::SlotTaken);
        }
        None => {
            return Err(AppError::Validation("Selected time is not a bookable slot".into()));
        }
    }

    let rule = config.rule_for(date);
    let slot_capacity = if rule.allow_multiple_slots {
        config.default_slot_capacity as i64
    } else {
        1
    };

    let booking = Booking::new(NewBookingParams {
        schedule_id: state.config.schedule_id.clone(),
        date,
        time: time.clone(),
        name: payload.name,
        email: payload.email,
        note: payload.notes,
    });

    let created = state
        .booking_repo
        .create_if_slot_free(&booking, rule.max_capacity_per_day as i64, slot_capacity)
        .await?
        .ok_or_else(|| {
            warn!("Booking rejected at write time: slot {} {} taken concurrently", date, time);
            AppError::SlotTaken
        })?;

    info!("Booking confirmed: {} for {} {}", created.id, date, time);
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /api/v1/bookings/manage/{token}
pub async fn get_booking_by_token(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let booking = state
        .booking_repo
        .find_by_token(&token)
        .await?
        .ok_or(AppError::NotFound("Booking not found".into()))?;

    Ok(Json(booking))
}

/// POST /api/v1/bookings/manage/{token}/cancel. Idempotent; enforces the
/// schedule's cancellation deadline. A cancelled slot is free again for the
/// next read, and reinstating it later is an ordinary fresh booking.
pub async fn cancel_booking(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let booking = state
        .booking_repo
        .find_by_token(&token)
        .await?
        .ok_or(AppError::NotFound("Booking not found".into()))?;

    if booking.status == STATUS_CANCELLED {
        return Ok(Json(booking));
    }

    let config = state.load_settings().await;
    let tz = config.tz();
    let now = Utc::now().with_timezone(&tz);

    let start_time = NaiveTime::parse_from_str(&booking.time, "%H:%M")
        .map_err(|_| AppError::Internal)?;
    let start = tz
        .from_local_datetime(&booking.date.and_time(start_time))
        .single()
        .ok_or(AppError::Internal)?;

    if now + Duration::hours(config.cancellation_deadline_hours) > start {
        return Err(AppError::Forbidden(format!(
            "Bookings must be cancelled at least {} hours in advance",
            config.cancellation_deadline_hours
        )));
    }

    let cancelled = state.booking_repo.cancel(&booking).await?;
    info!("Booking cancelled via management token: {}", cancelled.id);
    Ok(Json(cancelled))
}
