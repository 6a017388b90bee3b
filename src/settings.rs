use config::{Config, ConfigError, Environment};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::geometry::TimelineGeometry;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Settings {
    /// Base URL of the session directory service.
    pub directory_base_url: Url,
    /// Bearer token for the directory session, loaded at startup.
    pub directory_token: String,
    pub debug: bool,
    /// Token callers of this gateway must present.
    pub auth_token: String,
    pub enable_swagger: bool,
    pub port: u16,
    pub window_start_hour: u32,
    pub window_end_hour: u32,
    pub px_per_hour: f64,
    pub snap_minutes: u32,
    pub min_card_height_px: f64,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let config = Config::builder()
            // Load from environment variables with APP_ prefix
            .add_source(Environment::with_prefix("APP").separator("_"))
            .set_default("directory_base_url", "http://localhost:8000")?
            .set_default("directory_token", "default-token-change-me")?
            .set_default("debug", false)?
            .set_default("auth_token", "default-token-change-me")?
            .set_default("enable_swagger", true)?
            .set_default("port", 8080)?
            .set_default("window_start_hour", 6)?
            .set_default("window_end_hour", 22)?
            .set_default("px_per_hour", 60.0)?
            .set_default("snap_minutes", 30)?
            .set_default("min_card_height_px", 28.0)?
            .build()?;

        let settings: Settings = config.try_deserialize()?;
        settings.validated()
    }

    // Geometry math subtracts these, so a misconfigured environment must be
    // rejected here rather than underflow later.
    fn validated(self) -> Result<Self, ConfigError> {
        if self.window_end_hour <= self.window_start_hour || self.window_end_hour > 24 {
            return Err(ConfigError::Message(format!(
                "window_end_hour ({}) must be greater than window_start_hour ({}) and at most 24",
                self.window_end_hour, self.window_start_hour
            )));
        }
        if !(1..=60).contains(&self.snap_minutes) {
            return Err(ConfigError::Message(format!(
                "snap_minutes ({}) must be between 1 and 60",
                self.snap_minutes
            )));
        }
        Ok(self)
    }

    pub fn geometry(&self) -> TimelineGeometry {
        TimelineGeometry {
            window_start_hour: self.window_start_hour,
            window_end_hour: self.window_end_hour,
            px_per_hour: self.px_per_hour,
            snap_minutes: self.snap_minutes,
            min_card_height_px: self.min_card_height_px,
        }
    }
}
