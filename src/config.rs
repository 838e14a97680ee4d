use std::env;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    /// Id of the schedule document this deployment serves (single salon).
    pub schedule_id: String,
    /// How long a settings fetch may block before the caller falls back to defaults.
    pub settings_timeout_ms: u64,
    /// Hard budget for the precise (mode=full) month scan.
    pub full_month_budget_ms: u64,
    /// TTL of the in-process read-through settings cache.
    pub settings_cache_ttl_ms: u64,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            port: env::var("PORT").unwrap_or_else(|_| "3000".to_string()).parse().expect("PORT must be a number"),
            schedule_id: env::var("SCHEDULE_ID").unwrap_or_else(|_| "default".to_string()),
            settings_timeout_ms: env::var("SETTINGS_TIMEOUT_MS").ok()
                .and_then(|v| v.parse().ok()).unwrap_or(800),
            full_month_budget_ms: env::var("FULL_MONTH_BUDGET_MS").ok()
                .and_then(|v| v.parse().ok()).unwrap_or(1500),
            settings_cache_ttl_ms: env::var("SETTINGS_CACHE_TTL_MS").ok()
                .and_then(|v| v.parse().ok()).unwrap_or(3000),
        }
    }
}
