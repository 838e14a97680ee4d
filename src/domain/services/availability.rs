use crate::domain::models::booking::Booking;
use crate::domain::models::schedule::{ScheduleConfig, TimeSlot, WeekdayRule};
use crate::domain::services::settings::anchor_times_for;
use chrono::{DateTime, NaiveDate, NaiveTime, Timelike};
use chrono_tz::Tz;

fn minutes_of(time: &str) -> Option<u32> {
    let t = NaiveTime::parse_from_str(time, "%H:%M").ok()?;
    Some(t.hour() * 60 + t.minute())
}

fn format_minutes(minutes: u32) -> String {
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

/// Raw candidate start times for one date, earliest first. Single-slot days
/// expose their curated anchor times; multi-slot days sweep the open window
/// in interval steps, keeping only slots that finish by closing time.
pub fn generate_slots(rule: &WeekdayRule, config: &ScheduleConfig) -> Vec<String> {
    if !rule.is_open {
        return Vec::new();
    }

    if !rule.allow_multiple_slots {
        return anchor_times_for(rule.weekday)
            .iter()
            .map(|t| t.to_string())
            .collect();
    }

    let (Some(open), Some(close)) = (minutes_of(&rule.open), minutes_of(&rule.close)) else {
        return Vec::new();
    };

    let interval = rule
        .slot_interval_minutes
        .unwrap_or(config.default_duration_min)
        .max(1);
    let duration = config.default_duration_min;

    let mut slots = Vec::new();
    let mut cursor = open;
    while cursor + duration <= close {
        slots.push(format_minutes(cursor));
        cursor += interval;
    }
    slots
}

/// Marks each candidate against the non-cancelled bookings of the date. The
/// day cap is evaluated first and short-circuits every slot to unavailable
/// once reached; per-slot occupancy is checked after.
pub fn evaluate_capacity(
    candidates: &[String],
    bookings: &[Booking],
    rule: &WeekdayRule,
    config: &ScheduleConfig,
) -> Vec<TimeSlot> {
    let occupied: Vec<&str> = bookings
        .iter()
        .filter(|b| b.is_active())
        .map(|b| b.time.as_str())
        .collect();

    let day_cap_reached = occupied.len() >= rule.max_capacity_per_day as usize;

    // Single-slot days are strict one-booking-per-anchor; multi-slot days
    // honor the configured per-slot capacity.
    let slot_capacity = if rule.allow_multiple_slots {
        config.default_slot_capacity as usize
    } else {
        1
    };

    candidates
        .iter()
        .map(|time| {
            let taken = occupied.iter().filter(|&&t| t == time.as_str()).count();
            TimeSlot {
                time: time.clone(),
                available: !day_cap_reached && taken < slot_capacity,
            }
        })
        .collect()
}

/// Full per-date resolution: past and blocked dates yield an empty set before
/// any slot work; otherwise candidates are capacity-evaluated, and for today
/// every slot whose start hour is not strictly after the current hour is
/// closed off (no same-hour walk-ins through this path).
pub fn resolve_day(
    config: &ScheduleConfig,
    date: NaiveDate,
    bookings: &[Booking],
    now: DateTime<Tz>,
) -> Vec<TimeSlot> {
    let today = now.date_naive();

    if date < today || config.is_blocked(date) {
        return Vec::new();
    }

    let rule = config.rule_for(date);
    let candidates = generate_slots(rule, config);
    let mut slots = evaluate_capacity(&candidates, bookings, rule, config);

    if date == today {
        for slot in &mut slots {
            match NaiveTime::parse_from_str(&slot.time, "%H:%M") {
                Ok(t) if t.hour() > now.hour() => {}
                _ => slot.available = false,
            }
        }
    }

    slots
}
