// ABOUTME: Core data models for pantry inventory tracking and the transaction ledger
// ABOUTME: Defines PantryItem, PantryTransaction, and the read models for recipes and meals
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Larder Kitchen Intelligence

//! # Data Models
//!
//! Core data structures for the pantry inventory core. `PantryItem` and
//! `PantryTransaction` are owned by this crate; `Recipe`, `RecipeIngredient`
//! and `Meal` are read models for entities owned by other subsystems.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Broad food category for a pantry item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FoodCategory {
    Produce,
    Dairy,
    Meat,
    Seafood,
    Grains,
    Baking,
    Spices,
    Condiments,
    Snacks,
    Beverages,
    Frozen,
    Other,
}

impl FoodCategory {
    /// Parse from the database string representation
    #[must_use]
    pub fn from_str_lossy(s: &str) -> Self {
        match s {
            "produce" => Self::Produce,
            "dairy" => Self::Dairy,
            "meat" => Self::Meat,
            "seafood" => Self::Seafood,
            "grains" => Self::Grains,
            "baking" => Self::Baking,
            "spices" => Self::Spices,
            "condiments" => Self::Condiments,
            "snacks" => Self::Snacks,
            "beverages" => Self::Beverages,
            "frozen" => Self::Frozen,
            _ => Self::Other,
        }
    }

    /// Database string representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Produce => "produce",
            Self::Dairy => "dairy",
            Self::Meat => "meat",
            Self::Seafood => "seafood",
            Self::Grains => "grains",
            Self::Baking => "baking",
            Self::Spices => "spices",
            Self::Condiments => "condiments",
            Self::Snacks => "snacks",
            Self::Beverages => "beverages",
            Self::Frozen => "frozen",
            Self::Other => "other",
        }
    }
}

/// Where a pantry item is stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageLocation {
    #[default]
    Pantry,
    Fridge,
    Freezer,
    Other,
}

impl StorageLocation {
    /// Parse from the database string representation
    #[must_use]
    pub fn from_str_lossy(s: &str) -> Self {
        match s {
            "fridge" => Self::Fridge,
            "freezer" => Self::Freezer,
            "pantry" => Self::Pantry,
            _ => Self::Other,
        }
    }

    /// Database string representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pantry => "pantry",
            Self::Fridge => "fridge",
            Self::Freezer => "freezer",
            Self::Other => "other",
        }
    }
}

/// A quantity of a named ingredient owned by one user, stored in one location
///
/// `quantity` is never persisted negative: a deduction that would go below
/// zero is clamped, and the clamped amount is what the ledger records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PantryItem {
    /// Unique item identifier
    pub id: Uuid,
    /// Owning user
    pub user_id: Uuid,
    /// Free-text item name ("butter", "all-purpose flour")
    pub name: String,
    /// Current stock level, in `unit`; `None` when untracked
    pub quantity: Option<f64>,
    /// Free-text unit the quantity is stored in ("g", "ml", "can")
    pub unit: Option<String>,
    /// Broad food category, when known
    pub category: Option<FoodCategory>,
    /// Storage location
    pub location: StorageLocation,
    /// Expiry date, when known
    pub expiry_date: Option<NaiveDate>,
    /// Archived items are hidden from matching and listing
    pub is_archived: bool,
    /// Wasted items were thrown out; waste-marking also archives
    pub is_wasted: bool,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last mutation timestamp
    pub updated_at: DateTime<Utc>,
}

impl PantryItem {
    /// Whether this item is a live matching/deduction candidate
    #[must_use]
    pub const fn is_active(&self) -> bool {
        !self.is_archived && !self.is_wasted
    }
}

/// Kind of quantity mutation recorded in the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    /// Stock increase
    Add,
    /// Stock decrease (recorded with a negative `quantity_change`)
    Deduct,
    /// Explicit correction to a new absolute quantity
    Adjust,
}

impl TransactionKind {
    /// Parse from the database string representation
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "add" => Some(Self::Add),
            "deduct" => Some(Self::Deduct),
            "adjust" => Some(Self::Adjust),
            _ => None,
        }
    }

    /// Database string representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Deduct => "deduct",
            Self::Adjust => "adjust",
        }
    }
}

/// What triggered a ledger transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionSource {
    /// Direct user action
    #[default]
    Manual,
    /// Conversion from a purchased grocery item
    Grocery,
    /// Cooking a planned meal
    Meal,
    /// Cooking a recipe outside any meal plan
    Recipe,
}

impl TransactionSource {
    /// Parse from the database string representation
    #[must_use]
    pub fn from_str_lossy(s: &str) -> Self {
        match s {
            "grocery" => Self::Grocery,
            "meal" => Self::Meal,
            "recipe" => Self::Recipe,
            _ => Self::Manual,
        }
    }

    /// Database string representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::Grocery => "grocery",
            Self::Meal => "meal",
            Self::Recipe => "recipe",
        }
    }
}

/// Immutable audit record of one quantity change to one pantry item
///
/// `quantity_after = quantity_before + quantity_change` holds for every
/// record by construction. The ledger is append-only: rows are never
/// edited or deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PantryTransaction {
    /// Unique transaction identifier
    pub id: Uuid,
    /// Owning user
    pub user_id: Uuid,
    /// The pantry item this transaction mutated
    pub pantry_item_id: Uuid,
    /// Kind of mutation
    pub kind: TransactionKind,
    /// Signed quantity delta; negative for deductions
    pub quantity_change: f64,
    /// Stock level before the mutation
    pub quantity_before: f64,
    /// Stock level after the mutation
    pub quantity_after: f64,
    /// Unit the quantities were expressed in at transaction time
    pub unit: Option<String>,
    /// What triggered the mutation
    pub source: TransactionSource,
    /// Optional reference to the triggering entity (e.g. the meal cooked)
    pub source_id: Option<Uuid>,
    /// Free-text notes
    pub notes: Option<String>,
    /// When the mutation happened
    pub occurred_at: DateTime<Utc>,
}

/// One ingredient line of a recipe (read model, owned by the recipe subsystem)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeIngredient {
    /// Ingredient name as written in the recipe ("unsalted butter")
    pub name: String,
    /// Quantity needed at the recipe's base serving count
    pub quantity: Option<f64>,
    /// Unit for `quantity`
    pub unit: Option<String>,
}

/// Recipe read model: name, base servings, ordered ingredient list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    /// Unique recipe identifier
    pub id: Uuid,
    /// Owning user
    pub user_id: Uuid,
    /// Recipe name
    pub name: String,
    /// Declared base serving count (ingredient quantities refer to this)
    pub servings: i64,
    /// Ordered ingredient list
    pub ingredients: Vec<RecipeIngredient>,
}

/// Meal read model: links a recipe (or a custom entry) to a date and servings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meal {
    /// Unique meal identifier
    pub id: Uuid,
    /// Owning user
    pub user_id: Uuid,
    /// Linked recipe; `None` for custom entries (leftovers, eating out)
    pub recipe_id: Option<Uuid>,
    /// Display name
    pub name: String,
    /// Planned serving count
    pub servings: i64,
    /// Date the meal is planned for
    pub meal_date: NaiveDate,
}
