use chrono::{DateTime, Datelike, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub const WEEKDAY_COUNT: usize = 7;

/// One entry per weekday, 0 = Sunday. `open`/`close` are ignored while
/// `is_open` is false; `slot_interval_minutes` only applies when
/// `allow_multiple_slots` is set.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct WeekdayRule {
    pub weekday: u8,
    pub is_open: bool,
    pub open: String,
    pub close: String,
    pub max_capacity_per_day: u32,
    pub allow_multiple_slots: bool,
    pub slot_interval_minutes: Option<u32>,
}

impl WeekdayRule {
    /// Coarse openness check used by the month view. Multi-slot days need two
    /// parseable HH:MM bounds for the interval sweep to produce anything;
    /// single-slot days book against curated anchor times, so their hours are
    /// not required.
    pub fn is_bookable_weekday(&self) -> bool {
        if !self.is_open {
            return false;
        }
        !self.allow_multiple_slots
            || (chrono::NaiveTime::parse_from_str(&self.open, "%H:%M").is_ok()
                && chrono::NaiveTime::parse_from_str(&self.close, "%H:%M").is_ok())
    }
}

/// Fully-normalized schedule. Everything downstream of the settings
/// normalizer operates on this type; invariant: exactly 7 weekday rules
/// sorted by weekday ascending.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ScheduleConfig {
    pub weekday_rules: Vec<WeekdayRule>,
    pub default_duration_min: u32,
    pub default_slot_capacity: u32,
    pub blocked_dates: Vec<String>,
    pub cancellation_deadline_hours: i64,
    pub timezone: String,
}

impl ScheduleConfig {
    pub fn rule_for(&self, date: NaiveDate) -> &WeekdayRule {
        &self.weekday_rules[date.weekday().num_days_from_sunday() as usize]
    }

    /// Blocked dates match exactly on the YYYY-MM-DD string and take
    /// precedence over every other availability rule.
    pub fn is_blocked(&self, date: NaiveDate) -> bool {
        let key = date.format("%Y-%m-%d").to_string();
        self.blocked_dates.iter().any(|d| *d == key)
    }

    pub fn tz(&self) -> Tz {
        self.timezone.parse().unwrap_or(chrono_tz::UTC)
    }
}

/// Raw shapes as they come out of the store. Only the settings normalizer
/// reads these; numbers arrive as f64 so that junk values can be rejected
/// field by field instead of failing the whole document.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct PartialWeekdayRule {
    pub weekday: Option<i64>,
    pub is_open: Option<bool>,
    pub open: Option<String>,
    pub close: Option<String>,
    pub max_capacity_per_day: Option<f64>,
    pub allow_multiple_slots: Option<bool>,
    pub slot_interval_minutes: Option<f64>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct PartialScheduleConfig {
    pub weekday_rules: Vec<PartialWeekdayRule>,
    pub default_duration_min: Option<f64>,
    pub default_slot_capacity: Option<f64>,
    pub blocked_dates: Option<Vec<String>>,
    pub cancellation_deadline_hours: Option<f64>,
    pub timezone: Option<String>,
}

/// Stored schedule document, config kept as opaque JSON until normalized.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct ScheduleRecord {
    pub id: String,
    pub config_json: String,
    pub updated_at: DateTime<Utc>,
}

/// Derived per-slot availability; recomputed on every read, never stored.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TimeSlot {
    pub time: String,
    pub available: bool,
}
