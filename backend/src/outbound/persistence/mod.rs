//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Provides the document repository port backed by one `documents` table
//! via `diesel-async` and `bb8` connection pooling.
//!
//! # Architecture
//!
//! - **Thin adapters**: the repository only translates between JSON rows
//!   and domain documents. No business logic resides here.
//! - **Internal models**: row structs (`models.rs`) and schema definitions
//!   (`schema.rs`) are never exposed to the domain layer.
//! - **Strongly typed errors**: every database failure is mapped to a
//!   [`crate::domain::ports::DocumentRepositoryError`].
//!
//! # Example
//!
//! ```ignore
//! use beer_catalog::domain::Beer;
//! use beer_catalog::outbound::persistence::{DbPool, DieselDocumentRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/beers")).await?;
//! let beers = DieselDocumentRepository::<Beer>::new(pool);
//! ```

mod diesel_document_repository;
mod error_mapping;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_document_repository::DieselDocumentRepository;
pub use migrations::run_migrations;
pub use pool::{DbPool, DEFAULT_MAX_CONNECTIONS, PoolConfig, PoolError};
