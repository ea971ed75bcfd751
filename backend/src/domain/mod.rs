//! Domain primitives, ports and services.
//!
//! Purpose: define the vault's strongly typed entities (accounts, notes,
//! files) and the services that implement the driving ports. Nothing in here
//! knows about HTTP, SQL or the filesystem.
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic failure payload.
//! - User, Username, Role, SessionUser: account identity.
//! - Note, NoteDraft: text notes.
//! - StoredFile, FileName, StorageKey, ContentKind: uploaded files.
//! - AccountService, NoteService, FileService: use-case implementations.

pub mod accounts_service;
pub mod auth;
pub mod content_kind;
pub mod error;
pub mod file;
pub mod files_service;
pub mod note;
pub mod notes_service;
pub mod password;
pub mod ports;
pub mod trace_id;
pub mod user;

pub use self::accounts_service::{AccountService, AdminBootstrap};
pub use self::auth::{CredentialsValidationError, LoginCredentials, RegistrationRequest};
pub use self::content_kind::ContentKind;
pub use self::error::{Error, ErrorCode};
pub use self::file::{FileContent, FileId, FileName, FileValidationError, StorageKey, StoredFile};
pub use self::files_service::FileService;
pub use self::note::{Note, NoteDraft, NoteId, NoteValidationError};
pub use self::notes_service::NoteService;
pub use self::password::{PasswordHash, PasswordHashError};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    ADMIN_USERNAME, Role, SessionUser, User, UserAccount, UserId, UserValidationError, Username,
};
