//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL-backed document repository using Diesel ORM
//! - **memory**: in-process document store for development and tests
//! - **currency**: currencylayer and fixed-table exchange rate sources
//!
//! Adapters are thin translators between domain types and infrastructure
//! representations. They contain no business logic.

pub mod currency;
pub mod memory;
pub mod persistence;
