// ABOUTME: Domain service layer exposed to the surrounding web application
// ABOUTME: Protocol-agnostic orchestration over the unit converter, matcher, and stores
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Larder Kitchen Intelligence

//! Domain service layer
//!
//! Contains the orchestration logic the rest of the system calls into.
//! Services return plain outcome structures and never raise on expected
//! conditions (missing recipe, insufficient stock, unmatched ingredient);
//! only infrastructure failures propagate as errors.

/// Pantry mutation, recipe deduction, and availability checking
pub mod inventory;

pub use inventory::{
    IngredientAvailability, IngredientDeductionResult, IngredientStatus, InventoryConfig,
    InventoryService, MealAvailability, RecipeAvailability, RecipeDeductionResult,
    TransactionPage,
};
