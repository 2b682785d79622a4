//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `migrations/` exactly. Regenerate them with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Registered users keyed by email.
    users (email) {
        /// Primary key; always contains an `@`.
        email -> Text,
        first_name -> Text,
        last_name -> Text,
        password -> Text,
        /// Extension attributes as a JSON object.
        attributes -> Jsonb,
    }
}
