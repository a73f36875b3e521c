//! Application settings loaded via OrthoConfig.
//!
//! Values come from CLI flags, `COACHING_*` environment variables and config
//! files, in increasing order of precedence: file, environment, CLI.

use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;
use zeroize::Zeroizing;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// Settings that cannot be turned into a running server.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("missing required setting: {0}")]
    Missing(&'static str),
    #[error("invalid bind address {value}: {source}")]
    BindAddr {
        value: String,
        source: std::net::AddrParseError,
    },
    #[error("invalid Supabase URL {value}: {source}")]
    SupabaseUrl {
        value: String,
        source: url::ParseError,
    },
    #[error("request timeout must be at least one second")]
    ZeroTimeout,
}

/// Server and upstream settings.
#[derive(Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "COACHING")]
pub struct AppSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// Project URL of the hosted store and identity provider.
    pub supabase_url: Option<String>,
    /// Service role key used for store and auth requests.
    pub supabase_service_key: Option<String>,
    /// Per-request timeout for upstream calls, in seconds.
    #[ortho_config(default = 10)]
    pub request_timeout_secs: u64,
}

impl fmt::Debug for AppSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppSettings")
            .field("bind_addr", &self.bind_addr)
            .field("supabase_url", &self.supabase_url)
            .field(
                "supabase_service_key",
                &self.supabase_service_key.as_ref().map(|_| "<redacted>"),
            )
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

impl AppSettings {
    /// Listen address, defaulting to all interfaces on port 8080.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::BindAddr`] when the value does not parse.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse().map_err(|source| SettingsError::BindAddr {
            value: raw.to_owned(),
            source,
        })
    }

    /// # Errors
    ///
    /// Returns an error when the URL is absent or malformed.
    pub fn supabase_url(&self) -> Result<Url, SettingsError> {
        let raw = self
            .supabase_url
            .as_deref()
            .ok_or(SettingsError::Missing("supabase_url"))?;
        Url::parse(raw).map_err(|source| SettingsError::SupabaseUrl {
            value: raw.to_owned(),
            source,
        })
    }

    /// # Errors
    ///
    /// Returns [`SettingsError::Missing`] when no key is configured.
    pub fn supabase_service_key(&self) -> Result<Zeroizing<String>, SettingsError> {
        self.supabase_service_key
            .as_ref()
            .filter(|key| !key.trim().is_empty())
            .map(|key| Zeroizing::new(key.clone()))
            .ok_or(SettingsError::Missing("supabase_service_key"))
    }

    /// # Errors
    ///
    /// Returns [`SettingsError::ZeroTimeout`] for a zero timeout.
    pub fn request_timeout(&self) -> Result<Duration, SettingsError> {
        if self.request_timeout_secs == 0 {
            return Err(SettingsError::ZeroTimeout);
        }
        Ok(Duration::from_secs(self.request_timeout_secs))
    }
}
