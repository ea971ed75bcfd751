//! Domain ports for the hexagonal boundary.
//!
//! Driving ports (`*Command`, `*Query`) are called by inbound adapters.
//! Driven ports (`*Repository`, [`BlobStore`]) are implemented by outbound
//! adapters and consumed by the domain services.

mod macros;
pub(crate) use macros::define_port_error;

mod accounts_command;
mod blob_store;
mod file_repository;
mod files_command;
mod files_query;
mod note_repository;
mod notes_command;
mod notes_query;
mod user_repository;
mod users_query;

pub use accounts_command::AccountsCommand;
#[cfg(test)]
pub use accounts_command::MockAccountsCommand;
pub use blob_store::{BlobStore, BlobStoreError};
#[cfg(test)]
pub use blob_store::MockBlobStore;
pub use file_repository::{FilePersistenceError, FileRepository};
#[cfg(test)]
pub use file_repository::MockFileRepository;
pub use files_command::FilesCommand;
#[cfg(test)]
pub use files_command::MockFilesCommand;
pub use files_query::FilesQuery;
#[cfg(test)]
pub use files_query::MockFilesQuery;
pub use note_repository::{NotePersistenceError, NoteRepository};
#[cfg(test)]
pub use note_repository::MockNoteRepository;
pub use notes_command::NotesCommand;
#[cfg(test)]
pub use notes_command::MockNotesCommand;
pub use notes_query::NotesQuery;
#[cfg(test)]
pub use notes_query::MockNotesQuery;
pub use user_repository::{UserPersistenceError, UserRepository};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use users_query::UsersQuery;
#[cfg(test)]
pub use users_query::MockUsersQuery;
