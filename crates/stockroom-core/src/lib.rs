//! # stockroom-core: Stock Accounting and Sale Engine
//!
//! This crate is the **heart** of Stockroom. It decides how many units of a
//! product can be sold from the articles on hand, and runs multi-product
//! sales as a single all-or-nothing unit.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stockroom Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │          Callers (import binary, HTTP layer, batch jobs)        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ stockroom-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌─────────────┐  ┌─────────┐  │   │
//! │  │   │   stock   │  │   sale    │  │ coordinator │  │  store  │  │   │
//! │  │   │ available │  │ plan_sale │  │ execute_    │  │ traits  │  │   │
//! │  │   │ _quantity │  │ aggregate │  │ sale        │  │         │  │   │
//! │  │   └───────────┘  └───────────┘  └─────────────┘  └─────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO SQL • NO CONNECTION POOLS • STORAGE VIA TRAITS ONLY       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │ SaleStore / SaleUnit                   │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 stockroom-db (Database Layer)                   │   │
//! │  │              SQLite queries, migrations, repositories           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Article, Product, SaleRequest, TransactionRecord)
//! - [`stock`] - Availability calculation
//! - [`sale`] - Pure sale planning (validation, additive consumption)
//! - [`coordinator`] - Sale orchestration over a [`SaleStore`]
//! - [`store`] - Collaborator contracts for persistence
//! - [`ledger`] - Pagination shared by list operations
//! - [`validation`] - Catalog-write validation
//! - [`import`] - Parsing of inventory, product, and sale payloads
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use stockroom_core::stock::{available_quantity, ArticleStocks, Availability};
//! use stockroom_core::BomEntry;
//!
//! // 12 legs, 4 per chair; 17 screws, 8 per chair
//! let stocks = ArticleStocks::from([(1, 12), (2, 17)]);
//! let chair = [BomEntry::new(1, 4), BomEntry::new(2, 8)];
//!
//! assert_eq!(available_quantity(&chair, &stocks), Availability::Limited(2));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod coordinator;
pub mod error;
pub mod import;
pub mod ledger;
pub mod sale;
pub mod stock;
pub mod store;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use coordinator::SaleCoordinator;
pub use error::{CoreError, CoreResult, SaleError, SaleResult, StoreError, ValidationError};
pub use ledger::Page;
pub use sale::{plan_sale, SalePlan};
pub use stock::{available_quantity, ArticleStocks, Availability};
pub use store::{ProductDefinition, SaleSnapshot, SaleStore, SaleUnit, StockUpdate};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Page size used when a caller asks for none (or an invalid one).
pub const DEFAULT_PAGE_LIMIT: i64 = 100;

/// Largest page any list operation returns.
pub const MAX_PAGE_LIMIT: i64 = 1000;

/// Maximum length of an article or product name.
pub const MAX_NAME_LENGTH: usize = 200;
