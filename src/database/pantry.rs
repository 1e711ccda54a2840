// ABOUTME: Pantry item reads and writes: listing, point reads, creation, waste-marking
// ABOUTME: All access is scoped to the owning user; archived/wasted items drop out of listings
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Larder Kitchen Intelligence

use anyhow::Result;
use chrono::{NaiveDate, Utc};
use sqlx::Row;
use uuid::Uuid;

use super::Database;
use crate::models::{FoodCategory, PantryItem, StorageLocation};

/// Fields for creating a pantry item
///
/// Creation normally happens in the surrounding CRUD surface or by grocery
/// conversion; this exists for those callers and for tests.
#[derive(Debug, Clone)]
pub struct NewPantryItem {
    /// Owning user
    pub user_id: Uuid,
    /// Free-text item name
    pub name: String,
    /// Initial stock level
    pub quantity: Option<f64>,
    /// Unit the quantity is stored in
    pub unit: Option<String>,
    /// Broad food category
    pub category: Option<FoodCategory>,
    /// Storage location
    pub location: StorageLocation,
    /// Expiry date, when known
    pub expiry_date: Option<NaiveDate>,
}

impl NewPantryItem {
    /// Minimal constructor: a named, quantified item in the default location
    #[must_use]
    pub fn new(user_id: Uuid, name: &str, quantity: Option<f64>, unit: Option<&str>) -> Self {
        Self {
            user_id,
            name: name.to_owned(),
            quantity,
            unit: unit.map(str::to_owned),
            category: None,
            location: StorageLocation::default(),
            expiry_date: None,
        }
    }
}

pub(super) fn row_to_pantry_item(row: &sqlx::sqlite::SqliteRow) -> Result<PantryItem> {
    let id: String = row.get("id");
    let user_id: String = row.get("user_id");
    let category: Option<String> = row.get("category");
    let location: String = row.get("location");
    Ok(PantryItem {
        id: Uuid::parse_str(&id)?,
        user_id: Uuid::parse_str(&user_id)?,
        name: row.get("name"),
        quantity: row.get("quantity"),
        unit: row.get("unit"),
        category: category.as_deref().map(FoodCategory::from_str_lossy),
        location: StorageLocation::from_str_lossy(&location),
        expiry_date: row.get("expiry_date"),
        is_archived: row.get("is_archived"),
        is_wasted: row.get("is_wasted"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

impl Database {
    /// Create a pantry item
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails
    pub async fn create_pantry_item(&self, new_item: &NewPantryItem) -> Result<PantryItem> {
        let item = PantryItem {
            id: Uuid::new_v4(),
            user_id: new_item.user_id,
            name: new_item.name.clone(),
            quantity: new_item.quantity,
            unit: new_item.unit.clone(),
            category: new_item.category,
            location: new_item.location,
            expiry_date: new_item.expiry_date,
            is_archived: false,
            is_wasted: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        sqlx::query(
            r"
            INSERT INTO pantry_items
                (id, user_id, name, quantity, unit, category, location, expiry_date,
                 is_archived, is_wasted, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 0, 0, $9, $10)
            ",
        )
        .bind(item.id.to_string())
        .bind(item.user_id.to_string())
        .bind(&item.name)
        .bind(item.quantity)
        .bind(&item.unit)
        .bind(item.category.map(|c| c.as_str()))
        .bind(item.location.as_str())
        .bind(item.expiry_date)
        .bind(item.created_at)
        .bind(item.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(item)
    }

    pub(super) async fn list_pantry_items_impl(&self, user_id: Uuid) -> Result<Vec<PantryItem>> {
        let rows = sqlx::query(
            r"
            SELECT id, user_id, name, quantity, unit, category, location, expiry_date,
                   is_archived, is_wasted, created_at, updated_at
            FROM pantry_items
            WHERE user_id = $1 AND is_archived = 0 AND is_wasted = 0
            ORDER BY name
            ",
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_pantry_item).collect()
    }

    pub(super) async fn get_pantry_item_impl(
        &self,
        user_id: Uuid,
        item_id: Uuid,
    ) -> Result<Option<PantryItem>> {
        let row = sqlx::query(
            r"
            SELECT id, user_id, name, quantity, unit, category, location, expiry_date,
                   is_archived, is_wasted, created_at, updated_at
            FROM pantry_items
            WHERE id = $1 AND user_id = $2
            ",
        )
        .bind(item_id.to_string())
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_pantry_item).transpose()
    }

    /// Archive a pantry item without deleting it
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails
    pub async fn archive_pantry_item(&self, user_id: Uuid, item_id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE pantry_items SET is_archived = 1, updated_at = $1 WHERE id = $2 AND user_id = $3",
        )
        .bind(Utc::now())
        .bind(item_id.to_string())
        .bind(user_id.to_string())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Mark a pantry item as wasted; waste-marking also archives
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails
    pub async fn mark_pantry_item_wasted(&self, user_id: Uuid, item_id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            r"
            UPDATE pantry_items
            SET is_wasted = 1, is_archived = 1, updated_at = $1
            WHERE id = $2 AND user_id = $3
            ",
        )
        .bind(Utc::now())
        .bind(item_id.to_string())
        .bind(user_id.to_string())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
