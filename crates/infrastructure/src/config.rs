//! Runtime settings read from the environment.
//!
//! Reads the following variables:
//! - `POKEFETCH_REST_BASE_URL`: REST API base (default `https://pokeapi.co/api/v2`)
//! - `POKEFETCH_GRAPHQL_URL`: CMS GraphQL endpoint or its base URL
//! - `POKEFETCH_CMS_TOKEN`: bearer token for CMS calls
//! - `POKEFETCH_TIMEOUT_MS`: default per-request timeout
//! - `POKEFETCH_ADAPTER`: `reqwest` (default) or `in-memory`
//! - `POKEFETCH_FIXTURES`: fixture file for the in-memory adapter
//! - `POKEFETCH_HISTORY_DIR`: directory for persisted history
//! - `POKEFETCH_HISTORY_SIZE`: recently-viewed capacity (default 5)

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use pokefetch_domain::DEFAULT_HISTORY_SIZE;
use thiserror::Error;
use url::Url;

/// Default REST API base URL.
pub const DEFAULT_REST_BASE_URL: &str = "https://pokeapi.co/api/v2";

const REST_BASE_URL: &str = "POKEFETCH_REST_BASE_URL";
const GRAPHQL_URL: &str = "POKEFETCH_GRAPHQL_URL";
const CMS_TOKEN: &str = "POKEFETCH_CMS_TOKEN";
const TIMEOUT_MS: &str = "POKEFETCH_TIMEOUT_MS";
const ADAPTER: &str = "POKEFETCH_ADAPTER";
const FIXTURES: &str = "POKEFETCH_FIXTURES";
const HISTORY_DIR: &str = "POKEFETCH_HISTORY_DIR";
const HISTORY_SIZE: &str = "POKEFETCH_HISTORY_SIZE";

/// Errors raised while reading or validating settings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    /// A variable holds a value of the wrong shape.
    #[error("{name} has an invalid value {value:?}: {reason}")]
    InvalidValue {
        /// Variable name.
        name: &'static str,
        /// Raw value.
        value: String,
        /// What was expected.
        reason: String,
    },

    /// A URL is not an absolute http(s) URL.
    #[error("{name} must be an absolute http(s) URL, got {value:?}")]
    InvalidUrl {
        /// Variable name.
        name: &'static str,
        /// Raw value.
        value: String,
    },
}

/// Which transport backs the clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AdapterKind {
    /// HTTP over the network via reqwest.
    #[default]
    Reqwest,
    /// Canned responses from fixtures.
    InMemory,
}

impl AdapterKind {
    /// Returns the settings name of this kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Reqwest => "reqwest",
            Self::InMemory => "in-memory",
        }
    }
}

impl fmt::Display for AdapterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AdapterKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reqwest" | "http" => Ok(Self::Reqwest),
            "in-memory" | "inmemory" | "memory" | "offline" => Ok(Self::InMemory),
            other => Err(format!("unknown adapter {other:?}, expected reqwest or in-memory")),
        }
    }
}

/// Client settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// REST API base URL.
    pub rest_base_url: String,
    /// CMS GraphQL endpoint or base URL.
    pub graphql_url: Option<String>,
    /// Bearer token for CMS calls.
    pub cms_token: Option<String>,
    /// Default per-request timeout.
    pub timeout_ms: Option<u64>,
    /// Transport selection.
    pub adapter: AdapterKind,
    /// Fixture file for the in-memory adapter.
    pub fixtures: Option<PathBuf>,
    /// Directory for persisted history. Platform default when unset.
    pub history_dir: Option<PathBuf>,
    /// Recently-viewed capacity.
    pub history_size: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            rest_base_url: DEFAULT_REST_BASE_URL.to_string(),
            graphql_url: None,
            cms_token: None,
            timeout_ms: None,
            adapter: AdapterKind::default(),
            fixtures: None,
            history_dir: None,
            history_size: DEFAULT_HISTORY_SIZE,
        }
    }
}

impl Settings {
    /// Reads settings from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is malformed or validation fails.
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Reads settings through `lookup`, which maps a variable name to its
    /// value. Blank values count as unset.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is malformed or validation fails.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();

        let adapter = get(ADAPTER)
            .map(|raw| {
                raw.parse::<AdapterKind>().map_err(|reason| SettingsError::InvalidValue {
                    name: ADAPTER,
                    value: raw,
                    reason,
                })
            })
            .transpose()?
            .unwrap_or_default();

        let settings = Self {
            rest_base_url: get(REST_BASE_URL).unwrap_or(defaults.rest_base_url),
            graphql_url: get(GRAPHQL_URL),
            cms_token: get(CMS_TOKEN),
            timeout_ms: get(TIMEOUT_MS)
                .map(|raw| parse_number(TIMEOUT_MS, raw))
                .transpose()?,
            adapter,
            fixtures: get(FIXTURES).map(PathBuf::from),
            history_dir: get(HISTORY_DIR).map(PathBuf::from),
            history_size: get(HISTORY_SIZE)
                .map(|raw| parse_number(HISTORY_SIZE, raw))
                .transpose()?
                .unwrap_or(defaults.history_size),
        };

        settings.validate()?;
        Ok(settings)
    }

    /// Checks URLs and numeric limits.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<(), SettingsError> {
        check_url(REST_BASE_URL, &self.rest_base_url)?;
        if let Some(url) = &self.graphql_url {
            check_url(GRAPHQL_URL, url)?;
        }
        if self.timeout_ms == Some(0) {
            return Err(SettingsError::InvalidValue {
                name: TIMEOUT_MS,
                value: "0".into(),
                reason: "timeout must be greater than zero".into(),
            });
        }
        if self.history_size == 0 {
            return Err(SettingsError::InvalidValue {
                name: HISTORY_SIZE,
                value: "0".into(),
                reason: "history must hold at least one entry".into(),
            });
        }
        Ok(())
    }
}

fn parse_number<T: FromStr>(name: &'static str, raw: String) -> Result<T, SettingsError> {
    raw.parse().map_err(|_| SettingsError::InvalidValue {
        name,
        value: raw,
        reason: "expected a non-negative integer".into(),
    })
}

fn check_url(name: &'static str, value: &str) -> Result<(), SettingsError> {
    match Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(()),
        _ => Err(SettingsError::InvalidUrl {
            name,
            value: value.to_string(),
        }),
    }
}
