// ABOUTME: Library entry point for the Larder pantry inventory core
// ABOUTME: Unit-aware stock tracking reconciled against recipe and meal demand
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Larder Kitchen Intelligence

#![deny(unsafe_code)]

//! # Larder Inventory Core
//!
//! The algorithmic heart of the Larder household food app: tracking a
//! pantry of perishables and reconciling it against recipe and meal demand.
//! Adding stock, deducting stock when a dish is cooked, and answering "can
//! this be made, and with how many servings?" before committing any change.
//!
//! This crate is a library invoked in-process by the surrounding web layer;
//! it has no network or file-format surface of its own.
//!
//! ## Architecture
//!
//! - **`units`**: canonical unit forms, categories, and in-category
//!   conversion (volume through milliliters, weight through grams)
//! - **`matching`**: fuzzy ingredient-name resolution from recipe lines to
//!   pantry items, with a three-tier deterministic scoring order
//! - **`database`**: `SQLite` persistence and the append-only pantry
//!   transaction ledger; every quantity mutation and its ledger row commit
//!   in one database transaction
//! - **`services`**: the `InventoryService` orchestration layer the web
//!   layer calls
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use larder_core::database::Database;
//! use larder_core::services::InventoryService;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let database = Arc::new(Database::new("sqlite:larder.db").await?);
//!     let inventory = InventoryService::new(database);
//!     // inventory.check_recipe_availability(user_id, recipe_id, 2).await?;
//!     Ok(())
//! }
//! ```

/// `SQLite` persistence layer and the store abstraction
pub mod database;

/// Error taxonomy for inventory operations
pub mod errors;

/// Fuzzy ingredient-name matching
pub mod matching;

/// Core data models
pub mod models;

/// Domain service layer
pub mod services;

/// Unit normalization and conversion
pub mod units;

pub use database::{Database, InventoryStore};
pub use errors::{InventoryError, InventoryResult};
pub use matching::{IngredientMatcher, MatcherTables};
pub use models::{
    PantryItem, PantryTransaction, Recipe, RecipeIngredient, TransactionKind, TransactionSource,
};
pub use services::{IngredientStatus, InventoryConfig, InventoryService};
pub use units::{UnitCategory, UnitConverter, UnitDefinitions};
