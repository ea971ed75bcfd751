//! Uploaded file metadata.
//!
//! The display name chosen by the uploader is metadata only. Blobs live under
//! an opaque [`StorageKey`], so no user input ever becomes a path component.

use std::fmt;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{ContentKind, UserId};

/// Maximum display name length, in characters.
pub const FILE_NAME_MAX: usize = 255;

/// Validation errors for file identifiers and names.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FileValidationError {
    /// The identifier is not a UUID.
    #[error("file id must be a valid UUID")]
    InvalidId,
    /// The name is blank.
    #[error("file name must not be empty")]
    EmptyName,
    /// The name exceeds `max` characters.
    #[error("file name must be at most {max} characters")]
    NameTooLong { max: usize },
    /// The name contains control characters.
    #[error("file name must not contain control characters")]
    NameInvalidCharacters,
}

/// File metadata identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileId(Uuid);

impl FileId {
    /// Parse an identifier from its UUID text form.
    pub fn new(raw: &str) -> Result<Self, FileValidationError> {
        Uuid::parse_str(raw)
            .map(Self)
            .map_err(|_| FileValidationError::InvalidId)
    }

    /// Generate a fresh random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Borrow the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque name of a blob inside its owner's directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StorageKey(Uuid);

impl StorageKey {
    /// Generate a fresh key for a new blob.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap a key read back from storage.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Borrow the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Display name of an upload, unique per owner.
///
/// # Examples
/// ```
/// use vault::domain::FileName;
///
/// assert!(FileName::new("../../etc/passwd").is_ok());
/// assert!(FileName::new("").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileName(String);

impl FileName {
    /// Validate a display name.
    ///
    /// Names are kept verbatim and never become filesystem paths.
    pub fn new(raw: impl Into<String>) -> Result<Self, FileValidationError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(FileValidationError::EmptyName);
        }
        if raw.chars().count() > FILE_NAME_MAX {
            return Err(FileValidationError::NameTooLong { max: FILE_NAME_MAX });
        }
        if raw.chars().any(char::is_control) {
            return Err(FileValidationError::NameInvalidCharacters);
        }
        Ok(Self(raw))
    }
}

impl AsRef<str> for FileName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for FileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Metadata row describing one stored blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    /// Metadata identifier.
    pub id: FileId,
    /// Owning account.
    pub owner: UserId,
    /// Name shown to the owner, unique per owner.
    pub filename: FileName,
    /// Blob name inside the owner's directory.
    pub storage_key: StorageKey,
    /// Time of the most recent upload under this name.
    pub uploaded_at: DateTime<Utc>,
}

/// File bytes read back for display, with the sniffed content kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileContent {
    /// Metadata of the file.
    pub file: StoredFile,
    /// Raw blob contents.
    pub bytes: Vec<u8>,
    /// Sniffed rendering category.
    pub kind: ContentKind,
}
