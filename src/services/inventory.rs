// ABOUTME: Inventory orchestration: add/deduct/adjust stock, recipe deduction, availability checks
// ABOUTME: Reconciles recipe demand against pantry stock with clamp-and-report deduction policy
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Larder Kitchen Intelligence

//! # Inventory Service
//!
//! The orchestration layer over the unit converter, the ingredient matcher,
//! and the stores. Recipe- and meal-level operations report expected
//! conditions (recipe not found, short stock, unmatched ingredient) inside
//! their result structures; item-level operations treat a bad item id or an
//! unconvertible unit as a programmer-facing precondition and raise.
//!
//! Deduction follows the clamp-and-report policy: cooking never fails
//! outright because the pantry is short. A deduction that would go negative
//! deducts what is available, records the clamped amount in the ledger, and
//! leaves the item at zero.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::sleep;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::database::{InventoryStore, QuantityChange, TransactionFilter};
use crate::errors::{InventoryError, InventoryResult};
use crate::matching::IngredientMatcher;
use crate::models::{
    PantryItem, PantryTransaction, RecipeIngredient, TransactionKind, TransactionSource,
};
use crate::units::UnitConverter;

/// Tolerance for "is this quantity effectively zero / covered" comparisons
const QUANTITY_EPSILON: f64 = 1e-9;

/// Tunables for matching and availability probing
#[derive(Debug, Clone, Copy)]
pub struct InventoryConfig {
    /// Minimum match score for an ingredient to count as matched
    pub min_match_score: f64,
    /// Ceiling for the `available_servings` upward probe
    pub max_probe_servings: i64,
    /// Attempts before a contended quantity mutation gives up
    pub max_mutation_retries: u32,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            min_match_score: crate::matching::DEFAULT_MIN_SCORE,
            max_probe_servings: 10,
            max_mutation_retries: 3,
        }
    }
}

/// Per-ingredient outcome classification during deduction or availability checks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IngredientStatus {
    /// The ingredient had no quantity specified; trivially satisfied
    NotNeeded,
    /// No pantry item matched the ingredient name
    Unmatched,
    /// Matched, but available quantity is short of needed (or unknowable)
    PartiallySatisfied,
    /// Matched with available quantity covering the full need
    FullySatisfied,
}

impl IngredientStatus {
    /// Whether this status counts toward "the recipe can be made"
    #[must_use]
    pub const fn is_satisfied(&self) -> bool {
        matches!(self, Self::FullySatisfied | Self::NotNeeded)
    }
}

/// Outcome of deducting one recipe ingredient from the pantry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngredientDeductionResult {
    /// Ingredient name as written in the recipe
    pub ingredient_name: String,
    /// Outcome classification
    pub status: IngredientStatus,
    /// Quantity the recipe needed (already scaled), in `unit`
    pub needed_quantity: Option<f64>,
    /// Unit the needed/deducted/missing quantities are expressed in
    pub unit: Option<String>,
    /// Quantity actually deducted, in `unit`
    pub deducted_quantity: f64,
    /// Shortfall still uncovered, in `unit`
    pub missing_quantity: f64,
    /// Matched pantry item, when any
    pub matched_item_id: Option<Uuid>,
    /// Matched pantry item name
    pub matched_item_name: Option<String>,
    /// Match confidence in [0, 1]
    pub match_score: Option<f64>,
    /// Ledger transaction recorded for the deduction, when one happened
    pub transaction_id: Option<Uuid>,
    /// Human-readable remark ("no matching pantry item found", ...)
    pub note: Option<String>,
}

/// Outcome of deducting a whole recipe's ingredients
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeDeductionResult {
    /// False when the recipe does not exist or is not owned by the caller
    pub success: bool,
    /// Failure explanation when `success` is false
    pub message: Option<String>,
    /// Recipe the deduction targeted
    pub recipe_id: Uuid,
    /// Recipe name, when found
    pub recipe_name: Option<String>,
    /// Servings cooked
    pub servings: i64,
    /// Applied scale: servings / recipe base servings
    pub scale_factor: f64,
    /// Per-ingredient outcomes, in recipe order
    pub ingredients: Vec<IngredientDeductionResult>,
    /// Ingredients fully covered (including trivially satisfied ones)
    pub fully_satisfied: usize,
    /// Ingredients only partially covered
    pub partially_satisfied: usize,
    /// Ingredients with no pantry match
    pub unmatched: usize,
}

/// Availability of one ingredient at a given scale, computed without mutation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngredientAvailability {
    /// Ingredient name as written in the recipe
    pub ingredient_name: String,
    /// Outcome classification
    pub status: IngredientStatus,
    /// Quantity needed at the checked scale, in `unit`
    pub needed_quantity: Option<f64>,
    /// Unit the quantities are expressed in
    pub unit: Option<String>,
    /// Stock available in the needed unit; `None` when units are incomparable
    pub available_quantity: Option<f64>,
    /// Matched pantry item, when any
    pub matched_item_id: Option<Uuid>,
    /// Matched pantry item name
    pub matched_item_name: Option<String>,
    /// Match confidence in [0, 1]
    pub match_score: Option<f64>,
    /// Human-readable remark
    pub note: Option<String>,
}

/// Whether a recipe can be made from current stock, and at how many servings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeAvailability {
    /// False when the recipe does not exist or is not owned by the caller
    pub success: bool,
    /// Failure explanation when `success` is false
    pub message: Option<String>,
    /// Recipe checked
    pub recipe_id: Uuid,
    /// Recipe name, when found
    pub recipe_name: Option<String>,
    /// Serving count the check was run at
    pub servings: i64,
    /// True only when every ingredient is fully (or trivially) satisfied
    pub can_make: bool,
    /// Largest serving count (probed upward from 1) that stays fully satisfied
    pub available_servings: i64,
    /// Per-ingredient availability, in recipe order
    pub ingredients: Vec<IngredientAvailability>,
}

/// Whether a planned meal can be made from current stock
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealAvailability {
    /// False when the meal does not exist or is not owned by the caller
    pub success: bool,
    /// Failure explanation when `success` is false
    pub message: Option<String>,
    /// Meal checked
    pub meal_id: Uuid,
    /// True when the meal's recipe is makeable, or the meal has no recipe
    pub can_make: bool,
    /// The meal's nominal serving count
    pub servings: i64,
    /// Recipe-level detail; `None` for custom meals with nothing to check
    pub recipe: Option<RecipeAvailability>,
}

/// One page of ledger history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionPage {
    /// Transactions, newest first
    pub transactions: Vec<PantryTransaction>,
    /// Total rows matching the filter, ignoring pagination
    pub total_count: i64,
    /// Page size requested
    pub limit: i64,
    /// Page offset requested
    pub offset: i64,
}

/// What a single pantry mutation should do to the stored quantity
#[derive(Debug, Clone, Copy)]
enum Mutation {
    Add { amount: f64 },
    Deduct { amount: f64, allow_negative: bool },
    Adjust { new_quantity: f64 },
}

/// Orchestrates pantry mutations, recipe deduction, and availability checks
#[derive(Clone)]
pub struct InventoryService {
    store: Arc<dyn InventoryStore>,
    converter: UnitConverter,
    matcher: IngredientMatcher,
    config: InventoryConfig,
}

impl InventoryService {
    /// Service over a store with the standard tables and defaults
    #[must_use]
    pub fn new(store: Arc<dyn InventoryStore>) -> Self {
        Self {
            store,
            converter: UnitConverter::new(),
            matcher: IngredientMatcher::new(),
            config: InventoryConfig::default(),
        }
    }

    /// Service with injected converter, matcher, and tunables
    #[must_use]
    pub fn with_components(
        store: Arc<dyn InventoryStore>,
        converter: UnitConverter,
        matcher: IngredientMatcher,
        config: InventoryConfig,
    ) -> Self {
        Self {
            store,
            converter,
            matcher,
            config,
        }
    }

    // ================================
    // Item-level mutations
    // ================================

    /// Increase a pantry item's stock and record an `add` transaction
    ///
    /// When `unit` differs from the item's stored unit the quantity is
    /// converted before applying.
    ///
    /// # Errors
    ///
    /// `ItemNotFound`, `IncompatibleUnits`, `InvalidQuantity`, `Conflict`,
    /// or `Database` on infrastructure failure
    #[allow(clippy::too_many_arguments)]
    pub async fn add_to_pantry(
        &self,
        user_id: Uuid,
        item_id: Uuid,
        quantity: f64,
        unit: Option<&str>,
        source: TransactionSource,
        source_id: Option<Uuid>,
        notes: Option<&str>,
    ) -> InventoryResult<PantryTransaction> {
        self.mutate_quantity(
            user_id,
            item_id,
            Mutation::Add { amount: quantity },
            unit,
            source,
            source_id,
            notes,
        )
        .await
    }

    /// Decrease a pantry item's stock and record a `deduct` transaction
    ///
    /// When the result would go below zero and `allow_negative` is false,
    /// the deduction silently clamps: only what is available is deducted,
    /// the clamped amount is recorded as `quantity_change`, and the item is
    /// left at zero.
    ///
    /// # Errors
    ///
    /// `ItemNotFound`, `IncompatibleUnits`, `InvalidQuantity`, `Conflict`,
    /// or `Database` on infrastructure failure
    #[allow(clippy::too_many_arguments)]
    pub async fn deduct_from_pantry(
        &self,
        user_id: Uuid,
        item_id: Uuid,
        quantity: f64,
        unit: Option<&str>,
        source: TransactionSource,
        source_id: Option<Uuid>,
        notes: Option<&str>,
        allow_negative: bool,
    ) -> InventoryResult<PantryTransaction> {
        self.mutate_quantity(
            user_id,
            item_id,
            Mutation::Deduct {
                amount: quantity,
                allow_negative,
            },
            unit,
            source,
            source_id,
            notes,
        )
        .await
    }

    /// Set a pantry item's stock outright and record an `adjust` transaction
    ///
    /// # Errors
    ///
    /// `ItemNotFound`, `InvalidQuantity` for a negative target, `Conflict`,
    /// or `Database` on infrastructure failure
    pub async fn adjust_pantry(
        &self,
        user_id: Uuid,
        item_id: Uuid,
        new_quantity: f64,
        notes: Option<&str>,
    ) -> InventoryResult<PantryTransaction> {
        self.mutate_quantity(
            user_id,
            item_id,
            Mutation::Adjust { new_quantity },
            None,
            TransactionSource::Manual,
            None,
            notes,
        )
        .await
    }

    /// Shared read-compute-CAS loop behind every item-level mutation
    ///
    /// The store applies the quantity write and the ledger insert in one
    /// database transaction; a CAS miss means a concurrent writer changed
    /// the quantity after our read, so re-read and retry with backoff.
    #[allow(clippy::too_many_arguments)]
    async fn mutate_quantity(
        &self,
        user_id: Uuid,
        item_id: Uuid,
        mutation: Mutation,
        unit: Option<&str>,
        source: TransactionSource,
        source_id: Option<Uuid>,
        notes: Option<&str>,
    ) -> InventoryResult<PantryTransaction> {
        let amount = match mutation {
            Mutation::Add { amount } | Mutation::Deduct { amount, .. } => amount,
            Mutation::Adjust { new_quantity } => new_quantity,
        };
        if !amount.is_finite() || amount < 0.0 {
            return Err(InventoryError::InvalidQuantity(amount));
        }

        let mut attempt = 0;
        loop {
            let item = self
                .store
                .get_pantry_item(user_id, item_id)
                .await?
                .ok_or(InventoryError::ItemNotFound(item_id))?;

            let before = item.quantity.unwrap_or(0.0);
            let (change, after) = match mutation {
                Mutation::Add { amount } => {
                    let delta = self.amount_in_item_unit(amount, unit, &item)?;
                    (delta, before + delta)
                }
                Mutation::Deduct {
                    amount,
                    allow_negative,
                } => {
                    let delta = self.amount_in_item_unit(amount, unit, &item)?;
                    let after = before - delta;
                    if after < 0.0 && !allow_negative {
                        // Clamp-and-report: deduct only what is there
                        (-before, 0.0)
                    } else {
                        (-delta, after)
                    }
                }
                Mutation::Adjust { new_quantity } => (new_quantity - before, new_quantity),
            };

            let quantity_change = QuantityChange {
                user_id,
                pantry_item_id: item_id,
                kind: match mutation {
                    Mutation::Add { .. } => TransactionKind::Add,
                    Mutation::Deduct { .. } => TransactionKind::Deduct,
                    Mutation::Adjust { .. } => TransactionKind::Adjust,
                },
                expected_quantity: item.quantity,
                quantity_before: before,
                quantity_change: change,
                quantity_after: after,
                unit: item.unit.clone().or_else(|| unit.map(str::to_owned)),
                source,
                source_id,
                notes: notes.map(str::to_owned),
            };

            if let Some(transaction) = self.store.apply_quantity_change(&quantity_change).await? {
                return Ok(transaction);
            }

            attempt += 1;
            if attempt >= self.config.max_mutation_retries {
                return Err(InventoryError::Conflict(item_id));
            }
            let backoff_ms = 10 * (1 << attempt);
            warn!(
                item = %item_id,
                attempt,
                backoff_ms,
                "pantry quantity contended, retrying after backoff"
            );
            sleep(Duration::from_millis(backoff_ms)).await;
        }
    }

    /// Express a caller-supplied amount in the item's stored unit
    ///
    /// A missing unit on either side means the caller speaks the item's
    /// unit (or the stock is unitless); only a unit mismatch that fails
    /// conversion is an error.
    fn amount_in_item_unit(
        &self,
        amount: f64,
        unit: Option<&str>,
        item: &PantryItem,
    ) -> InventoryResult<f64> {
        match (unit, item.unit.as_deref()) {
            (Some(from), Some(to)) => {
                if self.converter.normalize(from) == self.converter.normalize(to) {
                    Ok(amount)
                } else {
                    self.converter
                        .convert(amount, from, to)
                        .ok_or_else(|| InventoryError::incompatible_units(Some(from), Some(to)))
                }
            }
            _ => Ok(amount),
        }
    }

    // ================================
    // Ingredient-level deduction
    // ================================

    /// Deduct one recipe ingredient from the best-matching pantry item
    ///
    /// Unit trouble and missing matches are reported in the result, never
    /// raised; the per-item quantity-mutation-plus-ledger pair stays atomic.
    ///
    /// # Errors
    ///
    /// Only infrastructure failures (`Database`, `Conflict`)
    #[allow(clippy::too_many_arguments)]
    pub async fn deduct_ingredient(
        &self,
        user_id: Uuid,
        ingredient_name: &str,
        quantity: Option<f64>,
        unit: Option<&str>,
        pantry_items: &[PantryItem],
        source: TransactionSource,
        source_id: Option<Uuid>,
    ) -> InventoryResult<IngredientDeductionResult> {
        let mut result = IngredientDeductionResult {
            ingredient_name: ingredient_name.to_owned(),
            status: IngredientStatus::NotNeeded,
            needed_quantity: quantity,
            unit: unit.map(str::to_owned),
            deducted_quantity: 0.0,
            missing_quantity: 0.0,
            matched_item_id: None,
            matched_item_name: None,
            match_score: None,
            transaction_id: None,
            note: None,
        };

        let Some(needed) = quantity.filter(|q| *q > 0.0) else {
            return Ok(result);
        };

        let Some(matched) =
            self.matcher
                .find_best_match(ingredient_name, pantry_items, self.config.min_match_score)
        else {
            result.status = IngredientStatus::Unmatched;
            result.missing_quantity = needed;
            result.note = Some("no matching pantry item found".to_owned());
            return Ok(result);
        };

        let item = matched.item;
        result.matched_item_id = Some(item.id);
        result.matched_item_name = Some(item.name.clone());
        result.match_score = Some(matched.score);

        let available = match self.available_in_unit(item, unit) {
            Ok(available) => available,
            Err(note) => {
                // Units incomparable: the match stands but the stock is
                // unknowable in the needed unit, so nothing is deducted.
                result.status = IngredientStatus::PartiallySatisfied;
                result.missing_quantity = needed;
                result.note = Some(note);
                return Ok(result);
            }
        };

        let to_deduct = needed.min(available);
        if to_deduct > QUANTITY_EPSILON {
            let transaction = self
                .deduct_from_pantry(
                    user_id,
                    item.id,
                    to_deduct,
                    unit,
                    source,
                    source_id,
                    Some(&format!("deducted for {ingredient_name}")),
                    false,
                )
                .await?;
            result.transaction_id = Some(transaction.id);
            result.deducted_quantity = to_deduct;
        }

        result.missing_quantity = (needed - result.deducted_quantity).max(0.0);
        result.status = if result.missing_quantity <= QUANTITY_EPSILON {
            IngredientStatus::FullySatisfied
        } else {
            if result.note.is_none() {
                result.note = Some(format!(
                    "only {available:.3} available of {needed:.3} needed"
                ));
            }
            IngredientStatus::PartiallySatisfied
        };
        Ok(result)
    }

    /// Available stock of `item`, expressed in the needed unit
    ///
    /// `Err` carries the human-readable incomparability note. A missing
    /// unit on either side falls back to comparing raw numbers.
    fn available_in_unit(&self, item: &PantryItem, unit: Option<&str>) -> Result<f64, String> {
        let stock = item.quantity.unwrap_or(0.0);
        match (item.unit.as_deref(), unit) {
            (Some(from), Some(to)) => {
                if self.converter.normalize(from) == self.converter.normalize(to) {
                    Ok(stock)
                } else {
                    self.converter
                        .convert(stock, from, to)
                        .ok_or_else(|| format!("cannot convert {from} to {to}"))
                }
            }
            _ => Ok(stock),
        }
    }

    // ================================
    // Recipe-level operations
    // ================================

    /// Deduct every ingredient of a recipe, scaled to `servings`
    ///
    /// Per-ingredient deductions are independent: a partially-applied
    /// recipe deduction is an accepted, reported outcome. Pantry items are
    /// re-read between ingredients so repeated matches see updated stock.
    ///
    /// # Errors
    ///
    /// Only infrastructure failures; an unknown recipe is a
    /// `success = false` result
    pub async fn deduct_recipe_ingredients(
        &self,
        user_id: Uuid,
        recipe_id: Uuid,
        servings: i64,
        meal_id: Option<Uuid>,
    ) -> InventoryResult<RecipeDeductionResult> {
        let Some(recipe) = self.store.get_recipe(user_id, recipe_id).await? else {
            return Ok(RecipeDeductionResult {
                success: false,
                message: Some("recipe not found".to_owned()),
                recipe_id,
                recipe_name: None,
                servings,
                scale_factor: 0.0,
                ingredients: Vec::new(),
                fully_satisfied: 0,
                partially_satisfied: 0,
                unmatched: 0,
            });
        };

        let scale_factor = servings as f64 / recipe.servings.max(1) as f64;
        let source = if meal_id.is_some() {
            TransactionSource::Meal
        } else {
            TransactionSource::Recipe
        };
        let source_id = meal_id.or(Some(recipe_id));

        debug!(
            recipe = %recipe_id,
            servings,
            scale = scale_factor,
            "deducting recipe ingredients"
        );

        let mut ingredients = Vec::with_capacity(recipe.ingredients.len());
        let mut fully = 0usize;
        let mut partially = 0usize;
        let mut unmatched = 0usize;

        for ingredient in &recipe.ingredients {
            // Re-read so earlier deductions are visible when two ingredient
            // lines match the same pantry item
            let pantry_items = self.store.list_pantry_items(user_id).await?;
            let scaled = ingredient.quantity.map(|q| q * scale_factor);
            let outcome = self
                .deduct_ingredient(
                    user_id,
                    &ingredient.name,
                    scaled,
                    ingredient.unit.as_deref(),
                    &pantry_items,
                    source,
                    source_id,
                )
                .await?;

            match outcome.status {
                IngredientStatus::FullySatisfied | IngredientStatus::NotNeeded => fully += 1,
                IngredientStatus::PartiallySatisfied => partially += 1,
                IngredientStatus::Unmatched => unmatched += 1,
            }
            ingredients.push(outcome);
        }

        Ok(RecipeDeductionResult {
            success: true,
            message: None,
            recipe_id,
            recipe_name: Some(recipe.name),
            servings,
            scale_factor,
            ingredients,
            fully_satisfied: fully,
            partially_satisfied: partially,
            unmatched,
        })
    }

    /// Check whether a recipe can be made at `servings`, without mutating
    ///
    /// `available_servings` is probed upward from 1 to the configured
    /// ceiling, stopping at the first serving count that fails.
    ///
    /// # Errors
    ///
    /// Only infrastructure failures; an unknown recipe is a
    /// `success = false` result
    pub async fn check_recipe_availability(
        &self,
        user_id: Uuid,
        recipe_id: Uuid,
        servings: i64,
    ) -> InventoryResult<RecipeAvailability> {
        let Some(recipe) = self.store.get_recipe(user_id, recipe_id).await? else {
            return Ok(RecipeAvailability {
                success: false,
                message: Some("recipe not found".to_owned()),
                recipe_id,
                recipe_name: None,
                servings,
                can_make: false,
                available_servings: 0,
                ingredients: Vec::new(),
            });
        };

        let pantry_items = self.store.list_pantry_items(user_id).await?;
        let base = recipe.servings.max(1) as f64;
        let scale = servings as f64 / base;

        let ingredients: Vec<IngredientAvailability> = recipe
            .ingredients
            .iter()
            .map(|ingredient| self.ingredient_availability(ingredient, scale, &pantry_items))
            .collect();
        let can_make = ingredients.iter().all(|i| i.status.is_satisfied());

        let mut available_servings = 0;
        for probe in 1..=self.config.max_probe_servings {
            let probe_scale = probe as f64 / base;
            let all_satisfied = recipe.ingredients.iter().all(|ingredient| {
                self.ingredient_availability(ingredient, probe_scale, &pantry_items)
                    .status
                    .is_satisfied()
            });
            if !all_satisfied {
                break;
            }
            available_servings = probe;
        }

        Ok(RecipeAvailability {
            success: true,
            message: None,
            recipe_id,
            recipe_name: Some(recipe.name),
            servings,
            can_make,
            available_servings,
            ingredients,
        })
    }

    /// Availability of one ingredient at a given scale; pure computation
    fn ingredient_availability(
        &self,
        ingredient: &RecipeIngredient,
        scale: f64,
        pantry_items: &[PantryItem],
    ) -> IngredientAvailability {
        let needed = ingredient.quantity.map(|q| q * scale);
        let mut availability = IngredientAvailability {
            ingredient_name: ingredient.name.clone(),
            status: IngredientStatus::NotNeeded,
            needed_quantity: needed,
            unit: ingredient.unit.clone(),
            available_quantity: None,
            matched_item_id: None,
            matched_item_name: None,
            match_score: None,
            note: None,
        };

        let Some(needed) = needed.filter(|q| *q > 0.0) else {
            return availability;
        };

        let Some(matched) = self.matcher.find_best_match(
            &ingredient.name,
            pantry_items,
            self.config.min_match_score,
        ) else {
            availability.status = IngredientStatus::Unmatched;
            availability.note = Some("no matching pantry item found".to_owned());
            return availability;
        };

        availability.matched_item_id = Some(matched.item.id);
        availability.matched_item_name = Some(matched.item.name.clone());
        availability.match_score = Some(matched.score);

        match self.available_in_unit(matched.item, ingredient.unit.as_deref()) {
            Err(note) => {
                availability.status = IngredientStatus::PartiallySatisfied;
                availability.note = Some(note);
            }
            Ok(available) => {
                availability.available_quantity = Some(available);
                availability.status = if available + QUANTITY_EPSILON >= needed {
                    IngredientStatus::FullySatisfied
                } else {
                    IngredientStatus::PartiallySatisfied
                };
            }
        }
        availability
    }

    /// Check whether a planned meal can be made
    ///
    /// A meal with no linked recipe (custom entry, eating out) is always
    /// makeable at its nominal serving count; there is nothing to check.
    ///
    /// # Errors
    ///
    /// Only infrastructure failures; an unknown meal is a
    /// `success = false` result
    pub async fn check_meal_availability(
        &self,
        user_id: Uuid,
        meal_id: Uuid,
    ) -> InventoryResult<MealAvailability> {
        let Some(meal) = self.store.get_meal(user_id, meal_id).await? else {
            return Ok(MealAvailability {
                success: false,
                message: Some("meal not found".to_owned()),
                meal_id,
                can_make: false,
                servings: 0,
                recipe: None,
            });
        };

        let Some(recipe_id) = meal.recipe_id else {
            return Ok(MealAvailability {
                success: true,
                message: None,
                meal_id,
                can_make: true,
                servings: meal.servings,
                recipe: None,
            });
        };

        let recipe = self
            .check_recipe_availability(user_id, recipe_id, meal.servings)
            .await?;
        Ok(MealAvailability {
            success: recipe.success,
            message: recipe.message.clone(),
            meal_id,
            can_make: recipe.can_make,
            servings: meal.servings,
            recipe: Some(recipe),
        })
    }

    // ================================
    // Ledger history
    // ================================

    /// Paginated ledger history for a user, newest first
    ///
    /// # Errors
    ///
    /// Only infrastructure failures
    pub async fn transaction_history(
        &self,
        user_id: Uuid,
        pantry_item_id: Option<Uuid>,
        kind: Option<TransactionKind>,
        limit: i64,
        offset: i64,
    ) -> InventoryResult<TransactionPage> {
        let filter = TransactionFilter {
            user_id,
            pantry_item_id,
            kind,
            limit,
            offset,
        };
        let (transactions, total_count) = self.store.query_transactions(&filter).await?;
        Ok(TransactionPage {
            transactions,
            total_count,
            limit,
            offset,
        })
    }
}
