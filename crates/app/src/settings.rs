//! Handles settings for the application.
//!
//! Values come from an optional `settings.toml` in the working directory,
//! overridden by `FINPAL__SECTION__KEY` environment variables.
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct App {
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

impl Default for Database {
    fn default() -> Self {
        Database::Sqlite("finpal.db".to_string())
    }
}

#[derive(Debug, Deserialize)]
pub struct Telegram {
    pub token: String,
    #[serde(default)]
    pub allowed_users: Vec<u64>,
}

#[derive(Debug, Deserialize)]
pub struct Rates {
    #[serde(default = "default_rates_url")]
    pub url: String,
    #[serde(default = "default_rates_timeout")]
    pub timeout_secs: u64,
}

impl Default for Rates {
    fn default() -> Self {
        Self {
            url: default_rates_url(),
            timeout_secs: default_rates_timeout(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Storage {
    #[serde(default = "default_attempts")]
    pub attempts: u32,
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
}

impl Default for Storage {
    fn default() -> Self {
        Self {
            attempts: default_attempts(),
            delay_ms: default_delay_ms(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub app: App,
    #[serde(default)]
    pub database: Database,
    pub telegram: Option<Telegram>,
    #[serde(default)]
    pub rates: Rates,
    #[serde(default)]
    pub storage: Storage,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("settings").required(false))
            .add_source(Environment::with_prefix("FINPAL").separator("__"))
            .build()?;

        settings.try_deserialize()
    }
}

fn default_level() -> String {
    "info".to_string()
}

fn default_rates_url() -> String {
    telegram_bot::rates::DEFAULT_RATES_URL.to_string()
}

fn default_rates_timeout() -> u64 {
    10
}

fn default_attempts() -> u32 {
    3
}

fn default_delay_ms() -> u64 {
    50
}

#[cfg(test)]
mod tests {
    use config::FileFormat;

    use super::*;

    fn parse(raw: &str) -> Settings {
        Config::builder()
            .add_source(File::from_str(raw, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn defaults_fill_missing_sections() {
        let settings = parse("");
        assert_eq!(settings.app.level, "info");
        assert!(matches!(settings.database, Database::Sqlite(ref p) if p == "finpal.db"));
        assert!(settings.telegram.is_none());
        assert_eq!(settings.storage.attempts, 3);
        assert_eq!(settings.rates.timeout_secs, 10);
    }

    #[test]
    fn full_file() {
        let settings = parse(
            r#"
            database = "memory"

            [app]
            level = "debug"

            [telegram]
            token = "123:abc"
            allowed_users = [1, 2]

            [rates]
            url = "http://localhost:8080/latest"

            [storage]
            attempts = 5
            delay_ms = 10
            "#,
        );
        assert_eq!(settings.app.level, "debug");
        assert!(matches!(settings.database, Database::Memory));
        let telegram = settings.telegram.unwrap();
        assert_eq!(telegram.token, "123:abc");
        assert_eq!(telegram.allowed_users, vec![1, 2]);
        assert_eq!(settings.rates.url, "http://localhost:8080/latest");
        assert_eq!(settings.storage.attempts, 5);
    }

    #[test]
    fn sqlite_path() {
        let settings = parse(r#"database = { sqlite = "/var/lib/finpal/ledger.db" }"#);
        assert!(
            matches!(settings.database, Database::Sqlite(ref p) if p == "/var/lib/finpal/ledger.db")
        );
    }
}
