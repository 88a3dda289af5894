//! # stocktag-core: Pure Business Logic for StockTag
//!
//! This crate is the **heart** of StockTag, an RFID-driven inventory and
//! point-of-sale system. It contains all business logic as pure functions
//! with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       StockTag Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │               Scanner Devices (RFID readers)                    │   │
//! │  │        publish raw tag uids over pub/sub transport              │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             stocktag-scan (session + pipeline)                  │   │
//! │  │    SessionController ──► TagPipeline ──► result publish        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ stocktag-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  totals   │  │ validation│  │   │
//! │  │   │ Tag, Sale │  │   Money   │  │ recompute │  │   rules   │  │   │
//! │  │   │ SaleLine  │  │  (cents)  │  │ discount  │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  stocktag-db (Database Layer)                   │   │
//! │  │           SQLite queries, migrations, repositories              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Tag, PurchaseOrderLine, Sale, SaleLine, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`totals`] - Sale aggregate recompute math
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in cents (i64) to avoid float errors
//! 4. **Explicit Errors**: All errors are typed, never strings or panics

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod totals;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use stocktag_core::Money` instead of
// `use stocktag_core::money::Money`

pub use error::{CoreError, ValidationError};
pub use money::Money;
pub use totals::SaleTotals;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum accepted length for a raw tag uid.
///
/// ## Business Reason
/// Scanner firmware emits hex uids well under this length; anything longer
/// is a corrupt or malicious payload and is rejected before storage.
pub const MAX_UID_LENGTH: usize = 64;

/// Maximum accepted length for a SKU.
pub const MAX_SKU_LENGTH: usize = 50;
