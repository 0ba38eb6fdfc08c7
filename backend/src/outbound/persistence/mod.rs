//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! This module provides concrete implementations of domain repository ports
//! backed by PostgreSQL via the Diesel ORM with async support through
//! `diesel-async` and `bb8` connection pooling.
//!
//! # Architecture
//!
//! - **Thin adapters**: Repository implementations only translate between
//!   Diesel models and domain types. The owner filter is part of every
//!   record statement.
//! - **Internal models**: Diesel row structs (`models.rs`) and schema
//!   definitions (`schema.rs`) are internal implementation details, never
//!   exposed to the domain layer.
//! - **Strongly typed errors**: All database errors are mapped to domain
//!   persistence error types.
//!
//! # Example
//!
//! ```ignore
//! use geodata::outbound::persistence::{DbPool, PoolConfig, DieselShapeRepository};
//!
//! let config = PoolConfig::new("postgres://localhost/geodata");
//! let pool = DbPool::new(config).await?;
//! let repo = DieselShapeRepository::new(pool);
//! ```

mod diesel_basic_error_mapping;
mod diesel_geo_file_repository;
mod diesel_shape_repository;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_geo_file_repository::DieselGeoFileRepository;
pub use diesel_shape_repository::DieselShapeRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
