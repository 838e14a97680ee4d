use salon_backend::{
    api::router::create_router,
    state::AppState,
    config::Config,
    domain::services::settings::SettingsCache,
    infra::repositories::{
        sqlite_booking_repo::SqliteBookingRepo,
        sqlite_schedule_repo::SqliteScheduleRepo,
    },
};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use axum::Router;
use serde_json::{json, Value};
use uuid::Uuid;

#[allow(dead_code)]
pub struct TestApp {
    pub router: Router,
    pub pool: Pool<Sqlite>,
    pub db_filename: String,
    pub state: Arc<AppState>,
}

#[allow(dead_code)]
impl TestApp {
    pub async fn new() -> Self {
        Self::new_with_budget(1500).await
    }

    pub async fn new_with_budget(full_month_budget_ms: u64) -> Self {
        let db_filename = format!("test_{}.db", Uuid::new_v4());
        let db_url = format!("sqlite://{}?mode=rwc", db_filename);

        let connection_options = SqliteConnectOptions::from_str(&db_url)
            .unwrap()
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .connect_with(connection_options)
            .await
            .expect("Failed to connect to test db");

        sqlx::migrate!("./migrations/sqlite")
            .run(&pool)
            .await
            .expect("Failed to migrate test db");

        let config = Config {
            database_url: db_url.clone(),
            port: 0,
            schedule_id: "default".to_string(),
            settings_timeout_ms: 800,
            full_month_budget_ms,
            settings_cache_ttl_ms: 3000,
        };

        let state = Arc::new(AppState {
            config: config.clone(),
            schedule_repo: Arc::new(SqliteScheduleRepo::new(pool.clone())),
            booking_repo: Arc::new(SqliteBookingRepo::new(pool.clone())),
            settings_cache: Arc::new(SettingsCache::new(Duration::from_millis(
                config.settings_cache_ttl_ms,
            ))),
        });

        let router = create_router(state.clone());

        Self {
            router,
            pool,
            db_filename,
            state,
        }
    }

    /// Writes the schedule document directly and drops the settings cache,
    /// standing in for the out-of-scope admin surface.
    pub async fn seed_schedule(&self, config_json: Value) {
        self.state
            .schedule_repo
            .upsert("default", &config_json.to_string())
            .await
            .expect("Failed to seed schedule");
        self.state.settings_cache.invalidate().await;
    }

    /// A week of identical multi-slot days (09:00-17:00, 30-minute steps) in
    /// UTC so that test dates line up with Utc::now().
    pub fn open_week_config(day_cap: u32, blocked_dates: Vec<String>) -> Value {
        let rules: Vec<Value> = (0..7)
            .map(|weekday| {
                json!({
                    "weekday": weekday,
                    "is_open": true,
                    "open": "09:00",
                    "close": "17:00",
                    "max_capacity_per_day": day_cap,
                    "allow_multiple_slots": true,
                    "slot_interval_minutes": 30
                })
            })
            .collect();

        json!({
            "weekday_rules": rules,
            "default_duration_min": 30,
            "default_slot_capacity": 1,
            "blocked_dates": blocked_dates,
            "cancellation_deadline_hours": 24,
            "timezone": "UTC"
        })
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_filename);
        let _ = std::fs::remove_file(format!("{}-wal", self.db_filename));
        let _ = std::fs::remove_file(format!("{}-shm", self.db_filename));
    }
}
