// ABOUTME: Error taxonomy for the pantry inventory core
// ABOUTME: Separates programmer-facing preconditions from infrastructure failures
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Larder Kitchen Intelligence

//! # Error Handling
//!
//! Errors here are deliberately narrow. Expected user-facing outcomes
//! (recipe not found, insufficient stock, unmatched ingredient) are reported
//! as result values from the service layer, never as errors. What remains:
//!
//! - item-level preconditions (`ItemNotFound`, `IncompatibleUnits`,
//!   `InvalidQuantity`) raised from `add_to_pantry`/`deduct_from_pantry`,
//!   where the orchestration layer is expected to pass a valid item id
//! - `Conflict` when concurrent writers exhaust the retry budget
//! - `Database` for infrastructure failures, propagated unmodified

use thiserror::Error;
use uuid::Uuid;

/// Result type used across the inventory service layer
pub type InventoryResult<T> = Result<T, InventoryError>;

/// Errors raised by inventory operations
#[derive(Debug, Error)]
pub enum InventoryError {
    /// The pantry item does not exist or is not owned by the caller
    #[error("pantry item {0} not found")]
    ItemNotFound(Uuid),

    /// The requested unit cannot be reconciled with the item's stored unit
    #[error("cannot convert {from} to {to}")]
    IncompatibleUnits {
        /// Unit the caller supplied
        from: String,
        /// Unit the quantity is stored in
        to: String,
    },

    /// The supplied quantity is not usable (negative or non-finite)
    #[error("invalid quantity: {0}")]
    InvalidQuantity(f64),

    /// Concurrent writers kept invalidating the read snapshot
    #[error("concurrent modification of pantry item {0}")]
    Conflict(Uuid),

    /// Storage-level failure; the caller's retry policy applies
    #[error(transparent)]
    Database(#[from] anyhow::Error),
}

impl InventoryError {
    /// Build an [`InventoryError::IncompatibleUnits`] from unit strings
    #[must_use]
    pub fn incompatible_units(from: Option<&str>, to: Option<&str>) -> Self {
        Self::IncompatibleUnits {
            from: from.unwrap_or("(none)").to_owned(),
            to: to.unwrap_or("(none)").to_owned(),
        }
    }
}
