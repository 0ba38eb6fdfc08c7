//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the database migrations exactly. They are used
//! by Diesel for compile-time query validation and type-safe SQL generation.
//!
//! # Maintenance
//!
//! When migrations change the schema, this file should be regenerated or
//! manually updated to reflect those changes. The `diesel print-schema`
//! command can generate these definitions from a live database.

diesel::table! {
    /// Registered accounts.
    ///
    /// `username` carries a unique constraint (`users_username_key`).
    users (id) {
        id -> Int8,
        username -> Varchar,
        /// PHC-encoded Argon2id hash.
        password_hash -> Text,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Uploaded GeoJSON/KML documents, one owner each.
    geo_files (id) {
        id -> Int8,
        owner_id -> Int8,
        name -> Varchar,
        /// Either `geojson` or `kml` (enforced by a check constraint).
        kind -> Varchar,
        content -> Text,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Shapes drawn on the map, one owner each.
    shapes (id) {
        id -> Int8,
        owner_id -> Int8,
        name -> Varchar,
        geometry -> Text,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(geo_files -> users (owner_id));
diesel::joinable!(shapes -> users (owner_id));

diesel::allow_tables_to_appear_in_same_query!(users, geo_files, shapes);
