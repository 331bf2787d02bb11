use serde_derive::Deserialize;

pub const CONFIG_PATH_VAR: &str = "TRACK_API_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "api_config.toml";

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Settings {
    pub environment: String,
    /// Shared secret for the API-key gate. Unset means open access
    /// (development).
    pub api_key: Option<String>,
    pub rate_limit: RateLimitSettings,
    pub store: StoreSettings,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct RateLimitSettings {
    pub window_secs: u64,
    pub max_requests: u32,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct StoreSettings {
    pub url: String,
    pub database: String,
    pub gps_collection: String,
    pub mobile_collection: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            api_key: None,
            rate_limit: Default::default(),
            store: Default::default(),
        }
    }
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            window_secs: 15 * 60,
            max_requests: 100,
        }
    }
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            url: "mongodb://127.0.0.1:27017".to_string(),
            database: "tracking".to_string(),
            gps_collection: "gps_points".to_string(),
            mobile_collection: "mobile_points".to_string(),
        }
    }
}

impl Settings {
    /// Reads the TOML file named by `TRACK_API_CONFIG` (default
    /// `api_config.toml`). A missing file falls back to defaults, which
    /// suit local development; `MONGODB_URL` and `API_KEY` environment
    /// variables override whatever the file says.
    pub fn read() -> Settings {
        let path =
            std::env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

        let mut settings = match std::fs::read_to_string(&path) {
            Ok(content) => toml::from_str(&content)
                .unwrap_or_else(|e| panic!("Malformed config file {}: {}", path, e)),
            Err(_) => Settings::default(),
        };

        settings.apply_env_overrides();
        settings
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("MONGODB_URL") {
            self.store.url = url;
        }
        if let Ok(key) = std::env::var("API_KEY") {
            self.api_key = Some(key);
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_development_friendly() {
        let settings = Settings::default();

        assert!(!settings.is_production());
        assert_eq!(settings.api_key, None);
        assert_eq!(settings.rate_limit.window_secs, 900);
        assert_eq!(settings.rate_limit.max_requests, 100);
        assert_eq!(settings.store.database, "tracking");
    }

    #[test]
    fn partial_file_keeps_defaults_for_the_rest() {
        let settings: Settings = toml::from_str(
            r#"
            environment = "production"

            [store]
            url = "mongodb://store.internal:27017"
            "#,
        )
        .unwrap();

        assert!(settings.is_production());
        assert_eq!(settings.store.url, "mongodb://store.internal:27017");
        // Unset sections and fields keep their defaults.
        assert_eq!(settings.store.gps_collection, "gps_points");
        assert_eq!(settings.rate_limit.max_requests, 100);
    }

    #[test]
    fn env_overrides_beat_the_file() {
        let mut settings = Settings::default();
        std::env::set_var("MONGODB_URL", "mongodb://override:27017");
        std::env::set_var("API_KEY", "sekret");

        settings.apply_env_overrides();

        assert_eq!(settings.store.url, "mongodb://override:27017");
        assert_eq!(settings.api_key.as_deref(), Some("sekret"));

        std::env::remove_var("MONGODB_URL");
        std::env::remove_var("API_KEY");
    }
}
