//! # Repository Module
//!
//! Database repository implementations for StockTag.
//!
//! ## Repository Pattern
//! Each repository wraps the shared pool and isolates the SQL for one
//! aggregate. The scan pipeline never talks to repositories directly; it
//! goes through the [`crate::store::ScanStore`] trait, which the
//! [`crate::Database`] implements by delegating here.
//!
//! ## Available Repositories
//!
//! - [`product::ProductRepository`] - Product lookup and creation
//! - [`tag::TagRepository`] - RFID tag registration and lifecycle
//! - [`order::OrderRepository`] - Purchase-order lines and scan progress
//! - [`sale::SaleRepository`] - Draft sales, lines, totals, checkout
//! - [`ledger::LedgerRepository`] - Append-only tag event ledger

pub mod ledger;
pub mod order;
pub mod product;
pub mod sale;
pub mod tag;
