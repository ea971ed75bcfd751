//! Runtime settings loaded via OrthoConfig.
//!
//! Values come from `VAULT_*` environment variables, the matching CLI flags,
//! or a configuration file. Session settings are read separately, see
//! [`crate::inbound::http::session_config`].

use std::net::SocketAddr;
use std::path::PathBuf;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::domain::Error;
use crate::inbound::http::state::DEFAULT_MAX_UPLOAD_BYTES;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8081";
const DEFAULT_UPLOADS_DIR: &str = "uploads";
const DEFAULT_ADMIN_PASSWORD: &str = "cle";
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;

/// Settings for the vault server process.
///
/// Every field is optional; the accessors supply defaults.
#[derive(Debug, Clone, Default, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "VAULT")]
#[serde(default)]
pub struct VaultSettings {
    /// PostgreSQL connection string. Required to start the server.
    pub database_url: Option<String>,
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// Directory holding uploaded file blobs.
    pub uploads_dir: Option<PathBuf>,
    /// Password given to the `admin` account when it is first created.
    pub admin_password: Option<String>,
    /// Largest accepted upload, in bytes.
    pub max_upload_bytes: Option<usize>,
    /// Size of the database connection pool.
    pub db_max_connections: Option<u32>,
}

impl VaultSettings {
    /// Return the database URL or fail when it is unset.
    pub fn database_url(&self) -> Result<&str, Error> {
        self.database_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| Error::invalid_request("VAULT_DATABASE_URL must be set"))
    }

    /// Parse the configured bind address, falling back to the default.
    pub fn bind_addr(&self) -> Result<SocketAddr, Error> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse()
            .map_err(|err| Error::invalid_request(format!("invalid bind address {raw}: {err}")))
    }

    /// Directory for upload blobs, `uploads` when unset.
    pub fn uploads_dir(&self) -> PathBuf {
        self.uploads_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_UPLOADS_DIR))
    }

    /// Initial admin password.
    pub fn admin_password(&self) -> &str {
        self.admin_password
            .as_deref()
            .unwrap_or(DEFAULT_ADMIN_PASSWORD)
    }

    /// Upload size limit in bytes.
    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_bytes.unwrap_or(DEFAULT_MAX_UPLOAD_BYTES)
    }

    /// Connection pool size.
    pub fn db_max_connections(&self) -> u32 {
        self.db_max_connections
            .unwrap_or(DEFAULT_DB_MAX_CONNECTIONS)
    }
}
