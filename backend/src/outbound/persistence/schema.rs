//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Regenerate with
//! `diesel print-schema` when a migration changes the table.

diesel::table! {
    /// Identity records for local and federated accounts.
    ///
    /// `email` and `federated_id` carry unique constraints; a row must hold
    /// a `password_hash` or a `federated_id`.
    users (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Display name (max 64 characters).
        #[max_length = 64]
        name -> Varchar,
        /// Login email, unique when present.
        #[max_length = 320]
        email -> Nullable<Varchar>,
        /// bcrypt hash in modular crypt format.
        #[max_length = 255]
        password_hash -> Nullable<Varchar>,
        /// Identity-provider subject, unique when present.
        #[max_length = 255]
        federated_id -> Nullable<Varchar>,
        /// Profile image URL.
        thumbnail -> Nullable<Text>,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp (maintained by trigger).
        updated_at -> Timestamptz,
    }
}
