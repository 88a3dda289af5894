//! # Scan Pipeline Error Types
//!
//! Error taxonomy for the session controller and tag ingestion pipeline.
//!
//! ## Two Kinds of Failure
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Scan Failure Handling                              │
//! │                                                                         │
//! │  REJECTIONS (expected, per-scan)                                       │
//! │  ──────────────────────────────                                        │
//! │  DuplicateUid, TagNotFound, TagUnassigned, AlreadySold,                │
//! │  TargetMissing, invalid uid                                            │
//! │    → published as { success: false, reason } on the result topic       │
//! │    → the session keeps running; the next scan is unaffected            │
//! │                                                                         │
//! │  INFRASTRUCTURE (unexpected)                                           │
//! │  ──────────────────────────                                            │
//! │  Db, Transport, Channel                                                │
//! │    → logged at error level                                             │
//! │    → surfaced to the scanner as the generic "processing error"         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use stocktag_db::DbError;

/// Result type for scan operations.
pub type ScanResult<T> = Result<T, ScanError>;

/// Errors from the session controller and ingestion pipeline.
#[derive(Debug, Error)]
pub enum ScanError {
    /// Session start rejected: the named target does not exist.
    #[error("Invalid session target: {entity} {id} not found")]
    InvalidTarget { entity: &'static str, id: String },

    /// Store-mode scan of a uid that is already registered.
    #[error("Tag uid already used: {uid}")]
    DuplicateUid { uid: String },

    /// Sell-mode scan of a uid with no stored tag.
    #[error("Tag not found: {uid}")]
    TagNotFound { uid: String },

    /// Sell-mode scan of a tag with no product assignment.
    #[error("Tag {uid} is not assigned to a product")]
    TagUnassigned { uid: String },

    /// Sell-mode scan of a tag that was already sold.
    #[error("Tag already sold: {uid}")]
    AlreadySold { uid: String },

    /// The session's target row disappeared between start and scan.
    #[error("Session target missing: {entity} {id}")]
    TargetMissing { entity: &'static str, id: String },

    /// Malformed uid payload.
    #[error("Invalid uid: {0}")]
    InvalidUid(#[from] stocktag_core::ValidationError),

    /// Storage failure.
    #[error("Database error: {0}")]
    Db(#[from] DbError),

    /// Transport publish/subscribe failure.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Internal channel closed.
    #[error("Channel error: {0}")]
    Channel(String),
}

impl ScanError {
    /// The operator-facing reason string published on the result topic.
    ///
    /// Rejection variants map to stable, specific reasons; everything
    /// else collapses into the generic processing error so internal
    /// details never reach the scanner.
    pub fn reason(&self) -> &'static str {
        match self {
            ScanError::DuplicateUid { .. } => "uid already used",
            ScanError::TagNotFound { .. } => "tag not found",
            ScanError::TagUnassigned { .. } => "tag not assigned to a product",
            ScanError::AlreadySold { .. } => "already sold",
            ScanError::InvalidUid(_) => "invalid uid",
            _ => "processing error",
        }
    }

    /// True for expected per-scan rejections, false for infrastructure
    /// failures that warrant an error-level log.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            ScanError::DuplicateUid { .. }
                | ScanError::TagNotFound { .. }
                | ScanError::TagUnassigned { .. }
                | ScanError::AlreadySold { .. }
                | ScanError::InvalidUid(_)
        )
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_strings() {
        assert_eq!(
            ScanError::DuplicateUid { uid: "x".into() }.reason(),
            "uid already used"
        );
        assert_eq!(
            ScanError::TagNotFound { uid: "x".into() }.reason(),
            "tag not found"
        );
        assert_eq!(
            ScanError::TagUnassigned { uid: "x".into() }.reason(),
            "tag not assigned to a product"
        );
        assert_eq!(
            ScanError::AlreadySold { uid: "x".into() }.reason(),
            "already sold"
        );
        assert_eq!(
            ScanError::TargetMissing {
                entity: "PurchaseOrderLine",
                id: "x".into()
            }
            .reason(),
            "processing error"
        );
    }

    #[test]
    fn test_db_errors_are_not_rejections() {
        let err = ScanError::Db(DbError::not_found("Tag", "x"));
        assert!(!err.is_rejection());
        assert_eq!(err.reason(), "processing error");
    }
}
