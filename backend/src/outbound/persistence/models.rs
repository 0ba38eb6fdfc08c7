//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. They exist solely to satisfy Diesel's
//! type requirements for queries and mutations.

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use super::schema::{geo_files, shapes, users};

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for creating new user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub username: &'a str,
    pub password_hash: &'a str,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Geo file models
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = geo_files)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct GeoFileRow {
    pub id: i64,
    pub owner_id: i64,
    pub name: String,
    pub kind: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = geo_files)]
pub(crate) struct NewGeoFileRow<'a> {
    pub owner_id: i64,
    pub name: &'a str,
    pub kind: &'a str,
    pub content: &'a str,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Content replacement; name and kind never change after upload.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = geo_files)]
pub(crate) struct GeoFileUpdate<'a> {
    pub content: &'a str,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Shape models
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = shapes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ShapeRow {
    pub id: i64,
    pub owner_id: i64,
    pub name: String,
    pub geometry: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = shapes)]
pub(crate) struct NewShapeRow<'a> {
    pub owner_id: i64,
    pub name: &'a str,
    pub geometry: &'a str,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial update; `None` columns are left untouched.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = shapes)]
pub(crate) struct ShapeUpdate<'a> {
    pub name: Option<&'a str>,
    pub geometry: Option<&'a str>,
    pub updated_at: DateTime<Utc>,
}
