use std::sync::Arc;
use std::time::Duration;
use crate::domain::models::schedule::ScheduleConfig;
use crate::domain::ports::{BookingRepository, ScheduleRepository};
use crate::domain::services::settings::SettingsCache;
use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub schedule_repo: Arc<dyn ScheduleRepository>,
    pub booking_repo: Arc<dyn BookingRepository>,
    pub settings_cache: Arc<SettingsCache>,
}

impl AppState {
    /// Read-through settings load; degrades to the default template when the
    /// store is slow or unreachable, so it cannot fail.
    pub async fn load_settings(&self) -> ScheduleConfig {
        self.settings_cache
            .get_or_load(
                self.schedule_repo.as_ref(),
                &self.config.schedule_id,
                Duration::from_millis(self.config.settings_timeout_ms),
            )
            .await
    }
}
