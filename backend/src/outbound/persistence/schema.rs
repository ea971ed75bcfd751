//! Diesel table definitions.
//!
//! Must match `migrations/` exactly; regenerate with `diesel print-schema`
//! after changing a migration.

diesel::table! {
    /// Accounts. `username` carries a unique index.
    users (id) {
        id -> Uuid,
        #[max_length = 64]
        username -> Varchar,
        password_hash -> Text,
        /// `admin` or `standard`.
        #[max_length = 16]
        role -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    notes (id) {
        id -> Uuid,
        owner_id -> Uuid,
        title -> Text,
        content -> Text,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Upload metadata; `(owner_id, filename)` is unique.
    files (id) {
        id -> Uuid,
        owner_id -> Uuid,
        #[max_length = 255]
        filename -> Varchar,
        storage_key -> Uuid,
        uploaded_at -> Timestamptz,
    }
}

diesel::joinable!(notes -> users (owner_id));
diesel::joinable!(files -> users (owner_id));

diesel::allow_tables_to_appear_in_same_query!(users, notes, files);
