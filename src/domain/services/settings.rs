use crate::domain::models::schedule::{
    PartialScheduleConfig, PartialWeekdayRule, ScheduleConfig, WeekdayRule, WEEKDAY_COUNT,
};
use crate::domain::ports::ScheduleRepository;
use chrono::{NaiveDate, NaiveTime};
use chrono_tz::Tz;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::warn;

pub const DEFAULT_TIMEZONE: &str = "Asia/Tokyo";
pub const DEFAULT_DURATION_MIN: u32 = 30;
pub const DEFAULT_SLOT_CAPACITY: u32 = 1;
pub const DEFAULT_DAY_CAPACITY: u32 = 4;
pub const DEFAULT_CANCELLATION_DEADLINE_HOURS: i64 = 24;

/// Curated start times for single-slot days. These are business anchors,
/// deliberately not derived from the open/close window.
pub const EVENING_ANCHOR_TIMES: &[&str] = &["18:30", "19:30"];
pub const DAYTIME_ANCHOR_TIMES: &[&str] = &["11:00", "14:00", "15:00", "17:00"];

/// Anchor group by weekday: weekends follow the daytime pattern, the
/// evening pattern covers the after-work weekdays.
pub fn anchor_times_for(weekday: u8) -> &'static [&'static str] {
    match weekday {
        0 | 6 => DAYTIME_ANCHOR_TIMES,
        _ => EVENING_ANCHOR_TIMES,
    }
}

/// Built-in weekly template: Sunday closed, evening hours Monday through
/// Friday, all-day multi-slot Saturday for the walk-in-heavy weekend.
fn default_rules() -> Vec<WeekdayRule> {
    (0..WEEKDAY_COUNT as u8)
        .map(|weekday| match weekday {
            0 => WeekdayRule {
                weekday,
                is_open: false,
                open: String::new(),
                close: String::new(),
                max_capacity_per_day: DEFAULT_DAY_CAPACITY,
                allow_multiple_slots: false,
                slot_interval_minutes: None,
            },
            6 => WeekdayRule {
                weekday,
                is_open: true,
                open: "10:00".to_string(),
                close: "19:00".to_string(),
                max_capacity_per_day: 8,
                allow_multiple_slots: true,
                slot_interval_minutes: Some(DEFAULT_DURATION_MIN),
            },
            _ => WeekdayRule {
                weekday,
                is_open: true,
                open: "17:00".to_string(),
                close: "21:30".to_string(),
                max_capacity_per_day: DEFAULT_DAY_CAPACITY,
                allow_multiple_slots: false,
                slot_interval_minutes: None,
            },
        })
        .collect()
}

fn valid_time(value: Option<&String>) -> Option<String> {
    let v = value?;
    NaiveTime::parse_from_str(v, "%H:%M").ok()?;
    Some(v.clone())
}

fn positive_int(value: Option<f64>) -> Option<u32> {
    let v = value?;
    if v.is_finite() && v >= 1.0 { Some(v as u32) } else { None }
}

fn merge_rule(base: &mut WeekdayRule, partial: &PartialWeekdayRule) {
    if let Some(is_open) = partial.is_open {
        base.is_open = is_open;
    }
    if let Some(open) = valid_time(partial.open.as_ref()) {
        base.open = open;
    }
    if let Some(close) = valid_time(partial.close.as_ref()) {
        base.close = close;
    }
    if let Some(cap) = positive_int(partial.max_capacity_per_day) {
        base.max_capacity_per_day = cap;
    }
    if let Some(multi) = partial.allow_multiple_slots {
        base.allow_multiple_slots = multi;
    }
    // The interval is only meaningful on multi-slot days.
    base.slot_interval_minutes = if base.allow_multiple_slots {
        positive_int(partial.slot_interval_minutes).or(base.slot_interval_minutes)
    } else {
        None
    };
}

/// Total normalization: any input, including none at all, yields a complete
/// schedule with one well-formed rule per weekday 0..6. This is also the
/// safety net when the backing store is unreachable, so it has no error path.
pub fn normalize_settings(raw: Option<&str>) -> ScheduleConfig {
    let partial: PartialScheduleConfig = raw
        .and_then(|json| serde_json::from_str(json).ok())
        .unwrap_or_default();

    let mut rules = default_rules();

    for p in &partial.weekday_rules {
        if let Some(weekday) = p.weekday
            && (0..WEEKDAY_COUNT as i64).contains(&weekday) {
            merge_rule(&mut rules[weekday as usize], p);
        }
    }

    let blocked_dates = partial
        .blocked_dates
        .unwrap_or_default()
        .into_iter()
        .filter(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").is_ok())
        .collect();

    let timezone = partial
        .timezone
        .filter(|tz| tz.parse::<Tz>().is_ok())
        .unwrap_or_else(|| DEFAULT_TIMEZONE.to_string());

    ScheduleConfig {
        weekday_rules: rules,
        default_duration_min: positive_int(partial.default_duration_min)
            .unwrap_or(DEFAULT_DURATION_MIN),
        default_slot_capacity: positive_int(partial.default_slot_capacity)
            .unwrap_or(DEFAULT_SLOT_CAPACITY),
        blocked_dates,
        cancellation_deadline_hours: positive_int(partial.cancellation_deadline_hours)
            .map(i64::from)
            .unwrap_or(DEFAULT_CANCELLATION_DEADLINE_HOURS),
        timezone,
    }
}

/// Read-through settings cache with a short TTL. The serving layer has no
/// cross-instance shared memory, so this is a latency optimization only;
/// write-path decisions never rely on it being fresh.
pub struct SettingsCache {
    ttl: Duration,
    inner: RwLock<Option<(Instant, ScheduleConfig)>>,
}

impl SettingsCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            inner: RwLock::new(None),
        }
    }

    /// Returns the cached schedule if fresh, otherwise loads and normalizes
    /// it from the store. A failed or timed-out fetch degrades to the default
    /// template without being cached, so the next call retries the store.
    pub async fn get_or_load(
        &self,
        repo: &dyn ScheduleRepository,
        schedule_id: &str,
        fetch_timeout: Duration,
    ) -> ScheduleConfig {
        {
            let guard = self.inner.read().await;
            if let Some((loaded_at, config)) = guard.as_ref()
                && loaded_at.elapsed() < self.ttl {
                return config.clone();
            }
        }

        let fetched = tokio::time::timeout(fetch_timeout, repo.get(schedule_id)).await;

        match fetched {
            Ok(Ok(record)) => {
                let config = normalize_settings(record.as_ref().map(|r| r.config_json.as_str()));
                let mut guard = self.inner.write().await;
                *guard = Some((Instant::now(), config.clone()));
                config
            }
            Ok(Err(e)) => {
                warn!("Settings fetch failed, using defaults: {:?}", e);
                normalize_settings(None)
            }
            Err(_) => {
                warn!("Settings fetch timed out after {:?}, using defaults", fetch_timeout);
                normalize_settings(None)
            }
        }
    }

    pub async fn invalidate(&self) {
        let mut guard = self.inner.write().await;
        *guard = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_none_is_total() {
        let config = normalize_settings(None);

        assert_eq!(config.weekday_rules.len(), 7);
        for (idx, rule) in config.weekday_rules.iter().enumerate() {
            assert_eq!(rule.weekday as usize, idx);
            assert!(rule.max_capacity_per_day >= 1);
        }
        assert!(!config.weekday_rules[0].is_open, "Sunday closed by default");
        assert!(config.weekday_rules[6].allow_multiple_slots, "Saturday is multi-slot");
        assert_eq!(config.timezone, DEFAULT_TIMEZONE);
    }

    #[test]
    fn test_normalize_garbage_json_falls_back() {
        let config = normalize_settings(Some("{not valid json"));
        assert_eq!(config.weekday_rules.len(), 7);
        assert_eq!(config.default_duration_min, DEFAULT_DURATION_MIN);
    }

    #[test]
    fn test_partial_overlay_keeps_other_weekdays() {
        let raw = r#"{
            "weekday_rules": [
                {"weekday": 1, "is_open": false},
                {"weekday": 3, "open": "10:00", "close": "14:00", "max_capacity_per_day": 2}
            ],
            "default_duration_min": 45
        }"#;
        let config = normalize_settings(Some(raw));

        assert!(!config.weekday_rules[1].is_open);
        assert_eq!(config.weekday_rules[3].open, "10:00");
        assert_eq!(config.weekday_rules[3].max_capacity_per_day, 2);
        // Untouched weekday keeps the template.
        assert_eq!(config.weekday_rules[2].open, "17:00");
        assert_eq!(config.default_duration_min, 45);
    }

    #[test]
    fn test_invalid_numbers_fall_back_per_field() {
        let raw = r#"{
            "weekday_rules": [
                {"weekday": 2, "max_capacity_per_day": -5, "slot_interval_minutes": 0}
            ],
            "default_duration_min": -1,
            "default_slot_capacity": 0
        }"#;
        let config = normalize_settings(Some(raw));

        assert_eq!(config.weekday_rules[2].max_capacity_per_day, DEFAULT_DAY_CAPACITY);
        assert_eq!(config.default_duration_min, DEFAULT_DURATION_MIN);
        assert_eq!(config.default_slot_capacity, DEFAULT_SLOT_CAPACITY);
    }

    #[test]
    fn test_interval_only_honored_on_multi_slot_days() {
        let raw = r#"{
            "weekday_rules": [
                {"weekday": 1, "slot_interval_minutes": 15},
                {"weekday": 6, "slot_interval_minutes": 15}
            ]
        }"#;
        let config = normalize_settings(Some(raw));

        assert_eq!(config.weekday_rules[1].slot_interval_minutes, None, "single-slot Monday ignores interval");
        assert_eq!(config.weekday_rules[6].slot_interval_minutes, Some(15));
    }

    #[test]
    fn test_malformed_blocked_dates_and_timezone_dropped() {
        let raw = r#"{
            "blocked_dates": ["2026-12-29", "next tuesday", "2026-13-40"],
            "timezone": "Mars/Olympus"
        }"#;
        let config = normalize_settings(Some(raw));

        assert_eq!(config.blocked_dates, vec!["2026-12-29".to_string()]);
        assert_eq!(config.timezone, DEFAULT_TIMEZONE);
    }

    #[test]
    fn test_anchor_groups() {
        assert_eq!(anchor_times_for(0), DAYTIME_ANCHOR_TIMES);
        assert_eq!(anchor_times_for(6), DAYTIME_ANCHOR_TIMES);
        assert_eq!(anchor_times_for(3), EVENING_ANCHOR_TIMES);
    }
}
