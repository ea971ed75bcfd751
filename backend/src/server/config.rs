//! HTTP server configuration object.

use std::net::SocketAddr;

use vault::inbound::http::session_config::SessionSettings;
use vault::inbound::http::state::DEFAULT_MAX_UPLOAD_BYTES;
use vault::outbound::persistence::DbPool;
use vault::outbound::storage::CapStdBlobStore;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) session: SessionSettings,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: DbPool,
    pub(crate) blobs: CapStdBlobStore,
    pub(crate) max_upload_bytes: usize,
}

impl ServerConfig {
    /// Construct a server configuration with the default upload cap.
    #[must_use]
    pub fn new(
        session: SessionSettings,
        bind_addr: SocketAddr,
        db_pool: DbPool,
        blobs: CapStdBlobStore,
    ) -> Self {
        Self {
            session,
            bind_addr,
            db_pool,
            blobs,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    /// Override the largest accepted upload, in bytes.
    #[must_use]
    pub fn with_max_upload_bytes(mut self, max_upload_bytes: usize) -> Self {
        self.max_upload_bytes = max_upload_bytes;
        self
    }
}
