//! HTTP server configuration object and helpers.

use std::net::SocketAddr;
use std::time::Duration;

use coaching_backend::settings::{AppSettings, SettingsError};
use url::Url;
use zeroize::Zeroizing;

/// Validated inputs for creating the HTTP server and its adapters.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) project_url: Url,
    pub(crate) service_key: Zeroizing<String>,
    pub(crate) request_timeout: Duration,
}

impl ServerConfig {
    /// Validate loaded settings.
    ///
    /// # Errors
    /// Returns [`SettingsError`] when a required value is missing or malformed.
    pub fn from_settings(settings: &AppSettings) -> Result<Self, SettingsError> {
        Ok(Self {
            bind_addr: settings.bind_addr()?,
            project_url: settings.supabase_url()?,
            service_key: settings.supabase_service_key()?,
            request_timeout: settings.request_timeout()?,
        })
    }

    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
