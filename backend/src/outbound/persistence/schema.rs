//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `migrations/` exactly. Regenerate with
//! `diesel print-schema` after adding a migration.

diesel::table! {
    /// Documents of every collection.
    ///
    /// The primary key is `(collection, id)`, so identifiers are unique per
    /// collection only. `body` always holds a JSON object.
    documents (collection, id) {
        /// Collection the document belongs to, e.g. `beers`.
        collection -> Text,
        /// Caller-chosen document identifier.
        id -> Int8,
        /// Full document body, identifier included.
        body -> Jsonb,
    }
}
