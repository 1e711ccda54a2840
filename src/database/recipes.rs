// ABOUTME: Read access to recipes and their ordered ingredient lists
// ABOUTME: Recipes are owned by the recipe subsystem; this crate only consumes them
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Larder Kitchen Intelligence

use anyhow::Result;
use chrono::Utc;
use sqlx::Row;
use uuid::Uuid;

use super::Database;
use crate::models::{Recipe, RecipeIngredient};

impl Database {
    /// Insert a recipe with its ingredient list
    ///
    /// Exists for the surrounding app and the test suite; the inventory
    /// core itself never writes recipes.
    ///
    /// # Errors
    ///
    /// Returns an error if an insert fails
    pub async fn create_recipe(
        &self,
        user_id: Uuid,
        name: &str,
        servings: i64,
        ingredients: &[RecipeIngredient],
    ) -> Result<Recipe> {
        let recipe_id = Uuid::new_v4();
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO recipes (id, user_id, name, servings, created_at) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(recipe_id.to_string())
        .bind(user_id.to_string())
        .bind(name)
        .bind(servings)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        for (position, ingredient) in ingredients.iter().enumerate() {
            sqlx::query(
                r"
                INSERT INTO recipe_ingredients (id, recipe_id, position, name, quantity, unit)
                VALUES ($1, $2, $3, $4, $5, $6)
                ",
            )
            .bind(Uuid::new_v4().to_string())
            .bind(recipe_id.to_string())
            .bind(position as i64)
            .bind(&ingredient.name)
            .bind(ingredient.quantity)
            .bind(&ingredient.unit)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(Recipe {
            id: recipe_id,
            user_id,
            name: name.to_owned(),
            servings,
            ingredients: ingredients.to_vec(),
        })
    }

    pub(super) async fn get_recipe_impl(
        &self,
        user_id: Uuid,
        recipe_id: Uuid,
    ) -> Result<Option<Recipe>> {
        let Some(row) = sqlx::query(
            "SELECT id, user_id, name, servings FROM recipes WHERE id = $1 AND user_id = $2",
        )
        .bind(recipe_id.to_string())
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await?
        else {
            return Ok(None);
        };

        let ingredient_rows = sqlx::query(
            r"
            SELECT name, quantity, unit
            FROM recipe_ingredients
            WHERE recipe_id = $1
            ORDER BY position
            ",
        )
        .bind(recipe_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        let ingredients = ingredient_rows
            .iter()
            .map(|r| RecipeIngredient {
                name: r.get("name"),
                quantity: r.get("quantity"),
                unit: r.get("unit"),
            })
            .collect();

        let id: String = row.get("id");
        let owner: String = row.get("user_id");
        Ok(Some(Recipe {
            id: Uuid::parse_str(&id)?,
            user_id: Uuid::parse_str(&owner)?,
            name: row.get("name"),
            servings: row.get("servings"),
            ingredients,
        }))
    }
}
