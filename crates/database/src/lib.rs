//! # Event Study Database Crate
//!
//! This crate is the PostgreSQL-backed archive of daily price history that the
//! event study reads its windows from.
//!
//! ## Architectural Principles
//!
//! - **Layer 3 Adapter:** All SQL lives here. The rest of the application only
//!   sees `PriceRequest` in and `PriceTable` out.
//! - **Asynchronous & Pooled:** All operations are asynchronous and share a
//!   connection pool (`PgPool`). The binary prefetches a padded window here and
//!   hands the result to the synchronous analytics layer.
//!
//! ## Public API
//!
//! - `connect`: The async function to establish the database connection pool.
//! - `run_migrations`: Applies the embedded migrations (the `daily_prices` table).
//! - `DbRepository`: Holds the pool and provides the price queries.
//! - `DbError`: The specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod connection;
pub mod error;
pub mod repository;

// Re-export the key components to create a clean, public-facing API.
pub use connection::{connect, run_migrations};
pub use error::DbError;
pub use repository::DbRepository;
