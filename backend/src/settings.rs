//! Service configuration loaded via OrthoConfig.
//!
//! Values layer CLI flags over `BEERS_`-prefixed environment variables over
//! an optional configuration file. Every field is optional on the wire; the
//! accessors apply defaults and reject values the service cannot run with.

use std::net::SocketAddr;
use std::time::Duration;

use ortho_config::OrthoConfig;
use reqwest::Url;
use serde::Deserialize;

use crate::outbound::currency::DEFAULT_CURRENCY_ENDPOINT;
use crate::outbound::persistence::DEFAULT_MAX_CONNECTIONS;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_CURRENCY_TIMEOUT_SECS: u64 = 10;

/// Document store backing the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    /// Process-local store; contents vanish on restart.
    Memory,
    /// PostgreSQL `documents` table.
    Postgres,
}

/// Errors raised when settings cannot drive the service.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    /// `bind_addr` is not a socket address.
    #[error("bind address `{value}` is not a socket address")]
    InvalidBindAddr { value: String },
    /// `storage` names an unknown backend.
    #[error("storage backend `{value}` must be `memory` or `postgres`")]
    UnknownStorage { value: String },
    /// `storage = postgres` without a `database_url`.
    #[error("database_url is required when storage is postgres")]
    MissingDatabaseUrl,
    /// `currency_api_url` is not an absolute URL.
    #[error("currency API URL `{value}` is invalid: {message}")]
    InvalidCurrencyUrl { value: String, message: String },
}

/// Configuration values for the catalog service.
#[derive(Debug, Clone, Default, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "BEERS")]
pub struct ServiceSettings {
    /// Address the HTTP server listens on.
    pub bind_addr: Option<String>,
    /// Storage backend: `memory` or `postgres`.
    pub storage: Option<String>,
    /// PostgreSQL connection string.
    pub database_url: Option<String>,
    /// Upper bound on pooled database connections.
    pub db_max_connections: Option<u32>,
    /// Base URL of the currencylayer-compatible rate service.
    pub currency_api_url: Option<String>,
    /// Access key for the rate service; enables live conversion.
    pub currency_api_key: Option<String>,
    /// Timeout for one rate lookup, in seconds.
    pub currency_timeout_secs: Option<u64>,
    /// Comma-separated `CODE=quote` pairs against USD, used without an API key.
    pub static_rates: Option<String>,
}

impl ServiceSettings {
    /// Socket address to bind, defaulting to `0.0.0.0:3000`.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::InvalidBindAddr`] for unparsable addresses.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.trim()
            .parse()
            .map_err(|_| SettingsError::InvalidBindAddr {
                value: raw.to_owned(),
            })
    }

    /// Configured storage backend, defaulting to memory.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::UnknownStorage`] for unknown names.
    pub fn storage(&self) -> Result<StorageBackend, SettingsError> {
        match self.storage.as_deref().map(str::trim) {
            None | Some("") => Ok(StorageBackend::Memory),
            Some(raw) if raw.eq_ignore_ascii_case("memory") => Ok(StorageBackend::Memory),
            Some(raw) if raw.eq_ignore_ascii_case("postgres") => Ok(StorageBackend::Postgres),
            Some(raw) => Err(SettingsError::UnknownStorage {
                value: raw.to_owned(),
            }),
        }
    }

    /// Database URL, required by the postgres backend.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::MissingDatabaseUrl`] when unset or blank.
    pub fn database_url(&self) -> Result<&str, SettingsError> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .ok_or(SettingsError::MissingDatabaseUrl)
    }

    /// Pool size, defaulting to [`DEFAULT_MAX_CONNECTIONS`].
    pub fn db_max_connections(&self) -> u32 {
        self.db_max_connections.unwrap_or(DEFAULT_MAX_CONNECTIONS)
    }

    /// Rate service endpoint, defaulting to the public currencylayer API.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::InvalidCurrencyUrl`] for malformed URLs.
    pub fn currency_api_url(&self) -> Result<Url, SettingsError> {
        let raw = self
            .currency_api_url
            .as_deref()
            .unwrap_or(DEFAULT_CURRENCY_ENDPOINT);
        Url::parse(raw.trim()).map_err(|err| SettingsError::InvalidCurrencyUrl {
            value: raw.to_owned(),
            message: err.to_string(),
        })
    }

    /// Access key for live conversion; `None` when unset or blank.
    pub fn currency_api_key(&self) -> Option<&str> {
        self.currency_api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    /// Rate lookup timeout, defaulting to ten seconds.
    pub fn currency_timeout(&self) -> Duration {
        Duration::from_secs(
            self.currency_timeout_secs
                .unwrap_or(DEFAULT_CURRENCY_TIMEOUT_SECS),
        )
    }

    /// Non-blank `CODE=quote` entries from `static_rates`.
    pub fn static_rate_entries(&self) -> Vec<&str> {
        self.static_rates
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for service configuration parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 8] = [
        "BEERS_BIND_ADDR",
        "BEERS_STORAGE",
        "BEERS_DATABASE_URL",
        "BEERS_DB_MAX_CONNECTIONS",
        "BEERS_CURRENCY_API_URL",
        "BEERS_CURRENCY_API_KEY",
        "BEERS_CURRENCY_TIMEOUT_SECS",
        "BEERS_STATIC_RATES",
    ];

    fn load_from_empty_args() -> ServiceSettings {
        ServiceSettings::load_from_iter([OsString::from("beer-catalog")])
            .expect("config should load")
    }

    #[rstest]
    fn default_values_are_used_when_missing() {
        let _guard = lock_env(VARS.map(|name| (name, None::<String>)));

        let settings = load_from_empty_args();
        assert_eq!(
            settings.bind_addr(),
            Ok(SocketAddr::from(([0, 0, 0, 0], 3000)))
        );
        assert_eq!(settings.storage(), Ok(StorageBackend::Memory));
        assert_eq!(settings.db_max_connections(), DEFAULT_MAX_CONNECTIONS);
        assert_eq!(
            settings.currency_api_url().map(|url| url.host_str().map(str::to_owned)),
            Ok(Some("api.currencylayer.com".to_owned()))
        );
        assert_eq!(settings.currency_api_key(), None);
        assert_eq!(settings.currency_timeout(), Duration::from_secs(10));
        assert!(settings.static_rate_entries().is_empty());
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("BEERS_BIND_ADDR", Some("127.0.0.1:8080".to_owned())),
            ("BEERS_STORAGE", Some("postgres".to_owned())),
            (
                "BEERS_DATABASE_URL",
                Some("postgres://beers@localhost/beers".to_owned()),
            ),
            ("BEERS_DB_MAX_CONNECTIONS", Some("4".to_owned())),
            ("BEERS_CURRENCY_API_URL", Some("http://rates.test".to_owned())),
            ("BEERS_CURRENCY_API_KEY", Some("secret".to_owned())),
            ("BEERS_CURRENCY_TIMEOUT_SECS", Some("3".to_owned())),
            ("BEERS_STATIC_RATES", Some("EUR=0.9, GBP=0.8,".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(
            settings.bind_addr(),
            Ok(SocketAddr::from(([127, 0, 0, 1], 8080)))
        );
        assert_eq!(settings.storage(), Ok(StorageBackend::Postgres));
        assert_eq!(
            settings.database_url(),
            Ok("postgres://beers@localhost/beers")
        );
        assert_eq!(settings.db_max_connections(), 4);
        assert_eq!(settings.currency_api_key(), Some("secret"));
        assert_eq!(settings.currency_timeout(), Duration::from_secs(3));
        assert_eq!(settings.static_rate_entries(), vec!["EUR=0.9", "GBP=0.8"]);
    }

    #[rstest]
    #[case::memory(Some("memory"), Ok(StorageBackend::Memory))]
    #[case::postgres_any_case(Some("Postgres"), Ok(StorageBackend::Postgres))]
    #[case::blank(Some(" "), Ok(StorageBackend::Memory))]
    #[case::unknown(
        Some("mongo"),
        Err(SettingsError::UnknownStorage { value: "mongo".to_owned() })
    )]
    fn storage_names_are_parsed(
        #[case] raw: Option<&str>,
        #[case] expected: Result<StorageBackend, SettingsError>,
    ) {
        let settings = ServiceSettings {
            storage: raw.map(str::to_owned),
            ..ServiceSettings::default()
        };
        assert_eq!(settings.storage(), expected);
    }

    #[rstest]
    #[case::unset(None)]
    #[case::blank(Some("  "))]
    fn postgres_needs_a_database_url(#[case] raw: Option<&str>) {
        let settings = ServiceSettings {
            database_url: raw.map(str::to_owned),
            ..ServiceSettings::default()
        };
        assert_eq!(
            settings.database_url(),
            Err(SettingsError::MissingDatabaseUrl)
        );
    }

    #[rstest]
    fn malformed_values_are_rejected() {
        let settings = ServiceSettings {
            bind_addr: Some("localhost".to_owned()),
            currency_api_url: Some("not a url".to_owned()),
            ..ServiceSettings::default()
        };
        assert!(matches!(
            settings.bind_addr(),
            Err(SettingsError::InvalidBindAddr { .. })
        ));
        assert!(matches!(
            settings.currency_api_url(),
            Err(SettingsError::InvalidCurrencyUrl { .. })
        ));
    }
}
