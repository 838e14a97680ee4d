use crate::domain::models::booking::Booking;
use crate::domain::models::schedule::ScheduleConfig;
use crate::domain::ports::BookingRepository;
use crate::domain::services::availability::resolve_day;
use chrono::{DateTime, Datelike, NaiveDate};
use chrono_tz::Tz;
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;
use tracing::warn;

pub fn month_dates(year: i32, month: u32) -> Vec<NaiveDate> {
    let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return Vec::new();
    };
    let mut dates = Vec::with_capacity(31);
    let mut current = first;
    while current.month() == month {
        dates.push(current);
        match current.succ_opt() {
            Some(next) => current = next,
            None => break,
        }
    }
    dates
}

/// Coarse month map: past and blocked gates plus "is this weekday open at
/// all". Deliberately skips the capacity evaluator, so a fully-booked day may
/// still read as available; callers finalize against the day resolver.
pub fn coarse_month(
    config: &ScheduleConfig,
    year: i32,
    month: u32,
    today: NaiveDate,
) -> BTreeMap<String, bool> {
    month_dates(year, month)
        .into_iter()
        .map(|date| {
            let available = date >= today
                && !config.is_blocked(date)
                && config.rule_for(date).is_bookable_weekday();
            (date.format("%Y-%m-%d").to_string(), available)
        })
        .collect()
}

/// Precise month map: full per-day resolution over a single range query,
/// raced against a hard time budget. Returns None when the budget elapses;
/// the caller must fall back to the coarse result rather than fail.
pub async fn precise_month(
    booking_repo: &dyn BookingRepository,
    schedule_id: &str,
    config: &ScheduleConfig,
    year: i32,
    month: u32,
    now: DateTime<Tz>,
    budget: Duration,
) -> Option<BTreeMap<String, bool>> {
    let dates = month_dates(year, month);
    let (first, last) = (*dates.first()?, *dates.last()?);

    let scan = async {
        let bookings = match booking_repo.list_by_range(schedule_id, first, last).await {
            Ok(bookings) => bookings,
            Err(e) => {
                // Optimistic degradation: an unreachable booking store reads
                // as "no known bookings"; the admission check still holds the line.
                warn!("Booking range query failed, assuming empty month: {:?}", e);
                Vec::new()
            }
        };

        let mut by_date: HashMap<NaiveDate, Vec<Booking>> = HashMap::new();
        for booking in bookings {
            by_date.entry(booking.date).or_default().push(booking);
        }

        dates
            .iter()
            .map(|date| {
                let day_bookings = by_date.get(date).map(Vec::as_slice).unwrap_or(&[]);
                let any_open = resolve_day(config, *date, day_bookings, now)
                    .iter()
                    .any(|s| s.available);
                (date.format("%Y-%m-%d").to_string(), any_open)
            })
            .collect()
    };

    tokio::time::timeout(budget, scan).await.ok()
}
