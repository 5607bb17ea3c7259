//! # stockroom-db: Database Layer for Stockroom
//!
//! This crate provides database access for Stockroom.
//! It uses SQLite for storage with sqlx for async operations, and
//! implements the [`SaleStore`](stockroom_core::SaleStore) contract the
//! core's `SaleCoordinator` runs sales against.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stockroom Data Flow                              │
//! │                                                                         │
//! │  SaleCoordinator::execute_sale (stockroom-core)                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  stockroom-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │  │   │
//! │  │   │               │    │ ArticleRepo   │    │ 001_init.sql │  │   │
//! │  │   │ SqlitePool    │◄───│ ProductRepo   │    │              │  │   │
//! │  │   │ DbConfig      │    │ SaleRepo      │    │              │  │   │
//! │  │   │               │    │ TransactionRepo    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │              $STOCKROOM_DATABASE_PATH (./stockroom.db)          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`config`] - Pool configuration and environment loading
//! - [`pool`] - Connection pool creation
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use stockroom_core::{SaleCoordinator, SaleRequest};
//! use stockroom_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::from_env()?).await?;
//!
//! let coordinator = SaleCoordinator::new(db.sales());
//! let record = coordinator
//!     .execute_sale(&SaleRequest::new().with(1, 2))
//!     .await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{ConfigError, DbConfig};
pub use error::{DbError, DbResult};
pub use pool::Database;

// Repository re-exports for convenience
pub use repository::article::ArticleRepository;
pub use repository::product::ProductRepository;
pub use repository::sale::{SaleRepository, SqliteSaleUnit};
pub use repository::transaction::TransactionRepository;
