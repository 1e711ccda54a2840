// ABOUTME: Read access to planned meals and their optional recipe link
// ABOUTME: Meals are owned by the meal-planning subsystem; this crate only consumes them
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Larder Kitchen Intelligence

use anyhow::Result;
use chrono::NaiveDate;
use sqlx::Row;
use uuid::Uuid;

use super::Database;
use crate::models::Meal;

impl Database {
    /// Insert a meal, optionally linked to a recipe
    ///
    /// Exists for the surrounding app and the test suite; the inventory
    /// core itself never writes meals.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails
    pub async fn create_meal(
        &self,
        user_id: Uuid,
        recipe_id: Option<Uuid>,
        name: &str,
        servings: i64,
        meal_date: NaiveDate,
    ) -> Result<Meal> {
        let meal_id = Uuid::new_v4();
        sqlx::query(
            r"
            INSERT INTO meals (id, user_id, recipe_id, name, servings, meal_date)
            VALUES ($1, $2, $3, $4, $5, $6)
            ",
        )
        .bind(meal_id.to_string())
        .bind(user_id.to_string())
        .bind(recipe_id.map(|id| id.to_string()))
        .bind(name)
        .bind(servings)
        .bind(meal_date)
        .execute(&self.pool)
        .await?;

        Ok(Meal {
            id: meal_id,
            user_id,
            recipe_id,
            name: name.to_owned(),
            servings,
            meal_date,
        })
    }

    pub(super) async fn get_meal_impl(&self, user_id: Uuid, meal_id: Uuid) -> Result<Option<Meal>> {
        let Some(row) = sqlx::query(
            r"
            SELECT id, user_id, recipe_id, name, servings, meal_date
            FROM meals
            WHERE id = $1 AND user_id = $2
            ",
        )
        .bind(meal_id.to_string())
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await?
        else {
            return Ok(None);
        };

        let id: String = row.get("id");
        let owner: String = row.get("user_id");
        let recipe_id: Option<String> = row.get("recipe_id");
        Ok(Some(Meal {
            id: Uuid::parse_str(&id)?,
            user_id: Uuid::parse_str(&owner)?,
            recipe_id: recipe_id.as_deref().map(Uuid::parse_str).transpose()?,
            name: row.get("name"),
            servings: row.get("servings"),
            meal_date: row.get("meal_date"),
        }))
    }
}
