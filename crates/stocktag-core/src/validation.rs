//! # Validation Module
//!
//! Input validation utilities for StockTag.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Transport payload (raw uid string off the wire)              │
//! │  └── THIS MODULE: format checks before the pipeline touches storage    │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Business rules (session mode, tag lifecycle checks)          │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL constraints                                              │
//! │  ├── UNIQUE constraint on tag uid (the authoritative duplicate check)  │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use stocktag_core::validation::validate_uid;
//!
//! let uid = validate_uid("  04a2b3c4  ").unwrap();
//! assert_eq!(uid, "04a2b3c4");
//! ```

use crate::error::ValidationError;
use crate::{MAX_SKU_LENGTH, MAX_UID_LENGTH};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a raw tag uid and returns the normalized (trimmed) form.
///
/// ## Rules
/// - Must not be empty after trimming
/// - Must be at most [`MAX_UID_LENGTH`] characters
/// - Must contain only alphanumeric characters, hyphens, colons
///   (reader firmware formats differ: `04A2B3C4` vs `04:a2:b3:c4`)
pub fn validate_uid(uid: &str) -> ValidationResult<String> {
    let uid = uid.trim();

    if uid.is_empty() {
        return Err(ValidationError::Required {
            field: "uid".to_string(),
        });
    }

    if uid.len() > MAX_UID_LENGTH {
        return Err(ValidationError::TooLong {
            field: "uid".to_string(),
            max: MAX_UID_LENGTH,
        });
    }

    if !uid
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == ':')
    {
        return Err(ValidationError::InvalidFormat {
            field: "uid".to_string(),
            reason: "must contain only letters, numbers, hyphens, and colons".to_string(),
        });
    }

    Ok(uid.to_string())
}

/// Validates a SKU (Stock Keeping Unit).
///
/// ## Rules
/// - Must not be empty
/// - Must be at most [`MAX_SKU_LENGTH`] characters
/// - Should contain only alphanumeric characters, hyphens, underscores
pub fn validate_sku(sku: &str) -> ValidationResult<()> {
    let sku = sku.trim();

    if sku.is_empty() {
        return Err(ValidationError::Required {
            field: "sku".to_string(),
        });
    }

    if sku.len() > MAX_SKU_LENGTH {
        return Err(ValidationError::TooLong {
            field: "sku".to_string(),
            max: MAX_SKU_LENGTH,
        });
    }

    if !sku
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "sku".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates a quota / quantity value.
///
/// ## Rules
/// - Must be strictly positive
pub fn validate_quantity(quantity: i64) -> ValidationResult<()> {
    if quantity <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_uid_trims() {
        assert_eq!(validate_uid("  04A2B3C4 ").unwrap(), "04A2B3C4");
        assert_eq!(validate_uid("04:a2:b3:c4").unwrap(), "04:a2:b3:c4");
    }

    #[test]
    fn test_validate_uid_rejects_empty() {
        assert!(validate_uid("").is_err());
        assert!(validate_uid("   ").is_err());
    }

    #[test]
    fn test_validate_uid_rejects_too_long() {
        let long = "A".repeat(MAX_UID_LENGTH + 1);
        assert!(validate_uid(&long).is_err());
    }

    #[test]
    fn test_validate_uid_rejects_bad_chars() {
        assert!(validate_uid("04 A2").is_err());
        assert!(validate_uid("uid;drop").is_err());
    }

    #[test]
    fn test_validate_sku() {
        assert!(validate_sku("SHIRT-330").is_ok());
        assert!(validate_sku("").is_err());
        assert!(validate_sku("bad sku!").is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-3).is_err());
    }
}
