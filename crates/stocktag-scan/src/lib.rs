//! # stocktag-scan: Scan Session + Tag Ingestion Pipeline
//!
//! The runtime layer of StockTag: drives the single scan session and turns
//! raw RFID uids into stored tags and sale lines.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     StockTag Scan Runtime                               │
//! │                                                                         │
//! │  Scanner devices        rfid/store, rfid/sell (raw uids)               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  stocktag-scan (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │  ┌────────────┐   ┌───────────────────┐   ┌────────────────┐  │   │
//! │  │  │ ScanWorker │──►│    TagPipeline    │◄──│ Session        │  │   │
//! │  │  │ (select!)  │   │ register / sell   │   │ Controller     │  │   │
//! │  │  └────────────┘   └─────────┬─────────┘   │ store/sell/off │  │   │
//! │  │                             │             └────────────────┘  │   │
//! │  │        Transport trait ─────┤──── ScanStore trait              │   │
//! │  └─────────────────────────────┼─────────────────────────────────┘   │
//! │                                │                                        │
//! │       results on rfid/*/result, mode words on `mode`                   │
//! │       tags, sale lines, ledger events in stocktag-db                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`session`] - The exclusive Store / Sell / Idle mode state machine
//! - [`pipeline`] - Per-scan processing and result publication
//! - [`transport`] - Pub/sub trait, topic constants, in-memory broker
//! - [`worker`] - Subscription loop with graceful shutdown
//! - [`error`] - Scan error taxonomy and reason strings

pub mod error;
pub mod pipeline;
pub mod session;
pub mod transport;
pub mod worker;

pub use error::{ScanError, ScanResult};
pub use pipeline::{ScanOutcome, TagPipeline};
pub use session::{Mode, SessionController};
pub use transport::{
    InMemoryTransport, Subscription, Transport, TOPIC_MODE, TOPIC_SELL, TOPIC_SELL_RESULT,
    TOPIC_STORE, TOPIC_STORE_RESULT,
};
pub use worker::{ScanWorker, ScanWorkerHandle};
