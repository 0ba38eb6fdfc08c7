//! Application settings loaded via OrthoConfig.
//!
//! Values come from CLI flags, `GEODATA_*` environment variables, and config
//! files, in OrthoConfig's usual precedence. The signing key is deliberately
//! absent here; it is read by the token adapter so it never lands in a
//! settings dump.

use std::net::SocketAddr;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use geodata::inbound::http::json::DEFAULT_MAX_BODY_BYTES;
use geodata::outbound::credentials::Argon2Settings;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_DB_CONNECTION_TIMEOUT_SECS: u64 = 30;
const DEFAULT_CORS_ORIGIN: &str = "*";

/// Rejected configuration values.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid bind address '{value}': {source}")]
    InvalidBindAddr {
        value: String,
        source: std::net::AddrParseError,
    },
}

/// Runtime configuration for the HTTP server.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "GEODATA")]
pub struct AppSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL. In-memory repositories are used when absent.
    pub database_url: Option<String>,
    pub db_max_connections: Option<u32>,
    pub db_connection_timeout_secs: Option<u64>,
    /// Apply embedded migrations before serving. Defaults to on.
    pub run_migrations: Option<bool>,
    /// Value of `Access-Control-Allow-Origin`.
    pub cors_allowed_origin: Option<String>,
    /// JSON body limit in bytes.
    pub max_body_bytes: Option<usize>,
    pub argon2_memory_kib: Option<u32>,
    pub argon2_iterations: Option<u32>,
    pub argon2_parallelism: Option<u32>,
}

impl AppSettings {
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let value = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        value
            .parse()
            .map_err(|source| SettingsError::InvalidBindAddr {
                value: value.to_owned(),
                source,
            })
    }

    pub fn db_max_connections(&self) -> u32 {
        self.db_max_connections
            .unwrap_or(DEFAULT_DB_MAX_CONNECTIONS)
    }

    pub fn db_connection_timeout(&self) -> Duration {
        Duration::from_secs(
            self.db_connection_timeout_secs
                .unwrap_or(DEFAULT_DB_CONNECTION_TIMEOUT_SECS),
        )
    }

    pub fn run_migrations(&self) -> bool {
        self.run_migrations.unwrap_or(true)
    }

    pub fn cors_allowed_origin(&self) -> &str {
        self.cors_allowed_origin
            .as_deref()
            .unwrap_or(DEFAULT_CORS_ORIGIN)
    }

    pub fn max_body_bytes(&self) -> usize {
        self.max_body_bytes.unwrap_or(DEFAULT_MAX_BODY_BYTES)
    }

    /// Argon2 costs, falling back field by field to the library defaults.
    pub fn argon2_settings(&self) -> Argon2Settings {
        let defaults = Argon2Settings::default();
        Argon2Settings {
            memory_kib: self.argon2_memory_kib.unwrap_or(defaults.memory_kib),
            iterations: self.argon2_iterations.unwrap_or(defaults.iterations),
            parallelism: self.argon2_parallelism.unwrap_or(defaults.parallelism),
        }
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for settings parsing and defaults.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 11] = [
        "GEODATA_BIND_ADDR",
        "GEODATA_DATABASE_URL",
        "GEODATA_DB_MAX_CONNECTIONS",
        "GEODATA_DB_CONNECTION_TIMEOUT_SECS",
        "GEODATA_RUN_MIGRATIONS",
        "GEODATA_CORS_ALLOWED_ORIGIN",
        "GEODATA_MAX_BODY_BYTES",
        "GEODATA_ARGON2_MEMORY_KIB",
        "GEODATA_ARGON2_ITERATIONS",
        "GEODATA_ARGON2_PARALLELISM",
        "GEODATA_CONFIG_PATH",
    ];

    fn load_from_empty_args() -> AppSettings {
        AppSettings::load_from_iter([OsString::from("geodata")]).expect("config should load")
    }

    #[rstest]
    fn defaults_apply_when_nothing_is_configured() {
        let _guard = lock_env(VARS.map(|name| (name, None::<String>)));

        let settings = load_from_empty_args();
        assert_eq!(
            settings.bind_addr().expect("default bind addr"),
            "0.0.0.0:8080".parse::<SocketAddr>().expect("socket addr")
        );
        assert!(settings.database_url.is_none());
        assert_eq!(settings.db_max_connections(), 10);
        assert_eq!(settings.db_connection_timeout(), Duration::from_secs(30));
        assert!(settings.run_migrations());
        assert_eq!(settings.cors_allowed_origin(), "*");
        assert_eq!(settings.max_body_bytes(), 5 * 1024 * 1024);
        assert_eq!(settings.argon2_settings(), Argon2Settings::default());
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let mut vars = VARS.map(|name| (name, None::<String>));
        for (name, value) in &mut vars {
            *value = match *name {
                "GEODATA_BIND_ADDR" => Some("127.0.0.1:9000".to_owned()),
                "GEODATA_DATABASE_URL" => Some("postgres://localhost/geodata".to_owned()),
                "GEODATA_DB_MAX_CONNECTIONS" => Some("4".to_owned()),
                "GEODATA_RUN_MIGRATIONS" => Some("false".to_owned()),
                "GEODATA_CORS_ALLOWED_ORIGIN" => Some("https://maps.example.com".to_owned()),
                "GEODATA_ARGON2_ITERATIONS" => Some("3".to_owned()),
                _ => None,
            };
        }
        let _guard = lock_env(vars);

        let settings = load_from_empty_args();
        assert_eq!(
            settings.bind_addr().expect("bind addr"),
            "127.0.0.1:9000".parse::<SocketAddr>().expect("socket addr")
        );
        assert_eq!(
            settings.database_url.as_deref(),
            Some("postgres://localhost/geodata")
        );
        assert_eq!(settings.db_max_connections(), 4);
        assert!(!settings.run_migrations());
        assert_eq!(settings.cors_allowed_origin(), "https://maps.example.com");
        let argon2 = settings.argon2_settings();
        assert_eq!(argon2.iterations, 3);
        assert_eq!(argon2.memory_kib, Argon2Settings::default().memory_kib);
    }

    #[rstest]
    fn migrations_run_when_only_a_database_url_is_set() {
        let mut vars = VARS.map(|name| (name, None::<String>));
        for (name, value) in &mut vars {
            if *name == "GEODATA_DATABASE_URL" {
                *value = Some("postgres://localhost/geodata".to_owned());
            }
        }
        let _guard = lock_env(vars);

        let settings = load_from_empty_args();
        assert!(settings.database_url.is_some());
        assert!(settings.run_migrations());
    }

    #[rstest]
    fn invalid_bind_addr_is_reported() {
        let settings = AppSettings {
            bind_addr: Some("not-an-address".to_owned()),
            ..load_from_empty_args_unlocked()
        };
        let err = settings.bind_addr().expect_err("invalid address");
        assert!(err.to_string().contains("not-an-address"));
    }

    fn load_from_empty_args_unlocked() -> AppSettings {
        let _guard = lock_env(VARS.map(|name| (name, None::<String>)));
        load_from_empty_args()
    }
}
