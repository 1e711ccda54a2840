// ABOUTME: SQLite persistence layer and the store abstraction consumed by the service layer
// ABOUTME: Owns schema migrations and the InventoryStore trait implemented by Database
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Larder Kitchen Intelligence

//! # Database Management
//!
//! `Database` wraps a `SQLx` `SQLite` pool and implements [`InventoryStore`],
//! the seam the service layer consumes. Migrations run in-code at startup.
//!
//! The one non-obvious contract lives in `apply_quantity_change`: the pantry
//! item's stored quantity and its ledger row are written in the same database
//! transaction, guarded by a compare-and-swap on the previously observed
//! quantity, so two concurrent deductions can never both read the same
//! `quantity_before` and silently lose one decrement.

mod ledger;
mod meals;
mod pantry;
mod recipes;

pub use ledger::{QuantityChange, TransactionFilter};
pub use pantry::NewPantryItem;

use anyhow::Result;
use async_trait::async_trait;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Pool, Sqlite};
use uuid::Uuid;

use crate::models::{Meal, PantryItem, PantryTransaction, Recipe};

/// Store contract the inventory service operates against
///
/// One trait covers the four collaborator stores (pantry items, ledger,
/// recipes, meals) so a single handle can be injected; recipes and meals
/// are read-only from this crate's point of view.
#[async_trait]
pub trait InventoryStore: Send + Sync {
    /// All non-archived, non-wasted pantry items for a user
    async fn list_pantry_items(&self, user_id: Uuid) -> Result<Vec<PantryItem>>;

    /// Point read of one pantry item, scoped to its owner
    async fn get_pantry_item(&self, user_id: Uuid, item_id: Uuid) -> Result<Option<PantryItem>>;

    /// Atomically persist one quantity mutation plus its ledger row
    ///
    /// Returns `None` when the compare-and-swap guard failed because a
    /// concurrent writer changed the quantity after it was read; the caller
    /// re-reads and retries.
    async fn apply_quantity_change(
        &self,
        change: &QuantityChange,
    ) -> Result<Option<PantryTransaction>>;

    /// Paginated, filtered ledger history, newest first, with total count
    async fn query_transactions(
        &self,
        filter: &TransactionFilter,
    ) -> Result<(Vec<PantryTransaction>, i64)>;

    /// Recipe with its ordered ingredient list, scoped to its owner
    async fn get_recipe(&self, user_id: Uuid, recipe_id: Uuid) -> Result<Option<Recipe>>;

    /// Point read of one meal, scoped to its owner
    async fn get_meal(&self, user_id: Uuid, meal_id: Uuid) -> Result<Option<Meal>>;
}

/// SQLite-backed store for pantry items, the ledger, recipes, and meals
#[derive(Clone)]
pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    /// Create a new database connection and run migrations
    ///
    /// # Errors
    ///
    /// Returns an error if the connection or a migration fails
    pub async fn new(database_url: &str) -> Result<Self> {
        // Ensure SQLite creates the database file if it doesn't exist
        let connection_options = if database_url.starts_with("sqlite:") && !database_url.contains(":memory:") {
            format!("{database_url}?mode=rwc")
        } else {
            database_url.to_owned()
        };

        // An in-memory SQLite database exists per connection; a pool larger
        // than one connection would hand out empty databases.
        let max_connections = if database_url.contains(":memory:") { 1 } else { 5 };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(&connection_options)
            .await?;

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    /// Get a reference to the database pool for advanced operations
    #[must_use]
    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    /// Run database migrations
    ///
    /// # Errors
    ///
    /// Returns an error if a schema statement fails
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS pantry_items (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                name TEXT NOT NULL,
                quantity REAL,
                unit TEXT,
                category TEXT,
                location TEXT NOT NULL DEFAULT 'pantry',
                expiry_date TEXT,
                is_archived BOOLEAN NOT NULL DEFAULT 0,
                is_wasted BOOLEAN NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_pantry_items_user ON pantry_items(user_id, is_archived, is_wasted)",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS pantry_transactions (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                pantry_item_id TEXT NOT NULL,
                kind TEXT NOT NULL,
                quantity_change REAL NOT NULL,
                quantity_before REAL NOT NULL,
                quantity_after REAL NOT NULL,
                unit TEXT,
                source TEXT NOT NULL DEFAULT 'manual',
                source_id TEXT,
                notes TEXT,
                occurred_at TEXT NOT NULL,
                FOREIGN KEY (pantry_item_id) REFERENCES pantry_items(id)
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_pantry_transactions_user ON pantry_transactions(user_id, occurred_at DESC)",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_pantry_transactions_item ON pantry_transactions(pantry_item_id)",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS recipes (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                name TEXT NOT NULL,
                servings INTEGER NOT NULL DEFAULT 1,
                created_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS recipe_ingredients (
                id TEXT PRIMARY KEY,
                recipe_id TEXT NOT NULL,
                position INTEGER NOT NULL,
                name TEXT NOT NULL,
                quantity REAL,
                unit TEXT,
                FOREIGN KEY (recipe_id) REFERENCES recipes(id)
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_recipe_ingredients_recipe ON recipe_ingredients(recipe_id, position)",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS meals (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                recipe_id TEXT,
                name TEXT NOT NULL,
                servings INTEGER NOT NULL DEFAULT 1,
                meal_date TEXT NOT NULL,
                FOREIGN KEY (recipe_id) REFERENCES recipes(id)
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl InventoryStore for Database {
    async fn list_pantry_items(&self, user_id: Uuid) -> Result<Vec<PantryItem>> {
        self.list_pantry_items_impl(user_id).await
    }

    async fn get_pantry_item(&self, user_id: Uuid, item_id: Uuid) -> Result<Option<PantryItem>> {
        self.get_pantry_item_impl(user_id, item_id).await
    }

    async fn apply_quantity_change(
        &self,
        change: &QuantityChange,
    ) -> Result<Option<PantryTransaction>> {
        self.apply_quantity_change_impl(change).await
    }

    async fn query_transactions(
        &self,
        filter: &TransactionFilter,
    ) -> Result<(Vec<PantryTransaction>, i64)> {
        self.query_transactions_impl(filter).await
    }

    async fn get_recipe(&self, user_id: Uuid, recipe_id: Uuid) -> Result<Option<Recipe>> {
        self.get_recipe_impl(user_id, recipe_id).await
    }

    async fn get_meal(&self, user_id: Uuid, meal_id: Uuid) -> Result<Option<Meal>> {
        self.get_meal_impl(user_id, meal_id).await
    }
}
