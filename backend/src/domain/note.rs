//! Short text notes owned by a single user.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::UserId;

/// Validation errors for note identifiers and drafts.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NoteValidationError {
    /// The identifier is not a UUID.
    #[error("note id must be a valid UUID")]
    InvalidId,
    /// The title is blank after trimming.
    #[error("note title must not be empty")]
    EmptyTitle,
}

/// Note identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NoteId(Uuid);

impl NoteId {
    /// Parse a path segment into a [`NoteId`].
    pub fn new(raw: &str) -> Result<Self, NoteValidationError> {
        Uuid::parse_str(raw)
            .map(Self)
            .map_err(|_| NoteValidationError::InvalidId)
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

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Title and content submitted by the note form.
///
/// The title is trimmed and must not be empty; the content is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteDraft {
    title: String,
    content: String,
}

impl NoteDraft {
    /// Trim the title and reject it when blank. Content is kept verbatim.
    pub fn try_from_parts(title: &str, content: &str) -> Result<Self, NoteValidationError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(NoteValidationError::EmptyTitle);
        }
        Ok(Self {
            title: title.to_owned(),
            content: content.to_owned(),
        })
    }

    /// Trimmed title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Body text.
    pub fn content(&self) -> &str {
        &self.content
    }
}

/// A persisted note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    /// Note identifier.
    pub id: NoteId,
    /// Owning account.
    pub owner: UserId,
    /// Non-empty title.
    pub title: String,
    /// Body text, possibly empty.
    pub content: String,
    /// Creation time; listings sort on it.
    pub created_at: DateTime<Utc>,
}

impl Note {
    /// Materialise a draft for `owner` with a fresh identifier.
    pub fn from_draft(owner: UserId, draft: NoteDraft, created_at: DateTime<Utc>) -> Self {
        let NoteDraft { title, content } = draft;
        Self {
            id: NoteId::random(),
            owner,
            title,
            content,
            created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", NoteValidationError::EmptyTitle)]
    #[case("  \n", NoteValidationError::EmptyTitle)]
    fn blank_titles_are_rejected(#[case] title: &str, #[case] expected: NoteValidationError) {
        assert_eq!(NoteDraft::try_from_parts(title, "body"), Err(expected));
    }

    #[test]
    fn content_is_kept_verbatim() {
        let draft = NoteDraft::try_from_parts(" T ", "  <b>C</b>\n").expect("valid draft");
        assert_eq!(draft.title(), "T");
        assert_eq!(draft.content(), "  <b>C</b>\n");
    }

    #[test]
    fn note_id_requires_uuid() {
        assert_eq!(NoteId::new("42"), Err(NoteValidationError::InvalidId));
    }
}
