//! # stocktag-db: Database Layer for StockTag
//!
//! This crate provides durable storage for the StockTag system.
//! It uses SQLite for local storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        StockTag Data Flow                               │
//! │                                                                         │
//! │  Tag Ingestion Pipeline (stocktag-scan)                                │
//! │       │  via the ScanStore trait                                       │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    stocktag-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │ (tag.rs, ...) │    │  (embedded)  │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ TagRepo       │    │ 001_init.sql │  │   │
//! │  │   │ Connection    │    │ SaleRepo      │    │              │  │   │
//! │  │   │ Management    │    │ OrderRepo ... │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  │   ScanStore trait ──► impl for Database (SQLite)               │   │
//! │  │                   └─► impl for MemoryStore (tests/dev)         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database file (or :memory: in tests)                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (tag, sale, order, ...)
//! - [`store`] - The `ScanStore` collaborator trait + SQLite impl
//! - [`memory`] - In-memory `ScanStore` for tests and development
//!
//! ## Usage
//!
//! ```rust,ignore
//! use stocktag_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/stocktag.db")).await?;
//! let tag = db.tags().find_by_uid("04A2B3C4").await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod memory;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use memory::MemoryStore;
pub use pool::{Database, DbConfig};
pub use store::ScanStore;

// Repository re-exports for convenience
pub use repository::ledger::LedgerRepository;
pub use repository::order::OrderRepository;
pub use repository::product::ProductRepository;
pub use repository::sale::SaleRepository;
pub use repository::tag::TagRepository;
