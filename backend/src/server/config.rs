//! HTTP server configuration object and helpers.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use actix_web::cookie::{Key, SameSite};

use cadinet::domain::AuthSettings;
use cadinet::inbound::http::state::DEFAULT_MAX_UPLOAD_BYTES;
use cadinet::settings::AuthStrategyKind;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) same_site: SameSite,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) data_dir: PathBuf,
    pub(crate) auth: AuthSettings,
    pub(crate) strategy: AuthStrategyKind,
    pub(crate) max_upload_bytes: usize,
}

impl ServerConfig {
    /// Configuration with default auth settings and upload limit.
    #[must_use]
    pub fn new(key: Key, bind_addr: SocketAddr, data_dir: impl Into<PathBuf>) -> Self {
        Self {
            key,
            same_site: SameSite::Lax,
            bind_addr,
            data_dir: data_dir.into(),
            auth: AuthSettings::default(),
            strategy: AuthStrategyKind::default(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    #[must_use]
    pub fn with_auth(mut self, auth: AuthSettings, strategy: AuthStrategyKind) -> Self {
        self.auth = auth;
        self.strategy = strategy;
        self
    }

    #[must_use]
    pub fn with_max_upload_bytes(mut self, limit: usize) -> Self {
        self.max_upload_bytes = limit;
        self
    }

    /// Session cookies are `Secure` whenever secure transport is required.
    pub(crate) fn cookie_secure(&self) -> bool {
        self.auth.require_secure_transport
    }

    pub(crate) fn records_dir(&self) -> PathBuf {
        self.data_dir.clone()
    }

    pub(crate) fn artifacts_dir(&self) -> PathBuf {
        Path::new(&self.data_dir).join("artifacts")
    }
}
