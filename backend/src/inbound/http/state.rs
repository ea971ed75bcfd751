//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    AccountsCommand, FilesCommand, FilesQuery, NotesCommand, NotesQuery, UsersQuery,
};

/// Upload cap applied when none is configured (10 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Parameter object bundling the driving ports used by handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    /// Account use-cases.
    pub accounts: Arc<dyn AccountsCommand>,
    /// Admin user listing.
    pub users: Arc<dyn UsersQuery>,
    /// Note writes.
    pub notes: Arc<dyn NotesCommand>,
    /// Note reads.
    pub notes_query: Arc<dyn NotesQuery>,
    /// File writes.
    pub files: Arc<dyn FilesCommand>,
    /// File reads.
    pub files_query: Arc<dyn FilesQuery>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Account use-cases.
    pub accounts: Arc<dyn AccountsCommand>,
    /// Admin user listing.
    pub users: Arc<dyn UsersQuery>,
    /// Note writes.
    pub notes: Arc<dyn NotesCommand>,
    /// Note reads.
    pub notes_query: Arc<dyn NotesQuery>,
    /// File writes.
    pub files: Arc<dyn FilesCommand>,
    /// File reads.
    pub files_query: Arc<dyn FilesQuery>,
    /// Largest accepted upload body, in bytes.
    pub max_upload_bytes: usize,
}

impl HttpState {
    /// Construct state from a ports bundle with the default upload cap.
    pub fn new(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            accounts,
            users,
            notes,
            notes_query,
            files,
            files_query,
        } = ports;
        Self {
            accounts,
            users,
            notes,
            notes_query,
            files,
            files_query,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    /// Override the upload cap.
    #[must_use]
    pub fn with_max_upload_bytes(mut self, max_upload_bytes: usize) -> Self {
        self.max_upload_bytes = max_upload_bytes;
        self
    }
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports)
    }
}
