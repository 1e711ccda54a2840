// ABOUTME: Append-only pantry transaction ledger with atomic quantity mutation
// ABOUTME: Writes the item quantity and its ledger row in one database transaction, CAS-guarded
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Larder Kitchen Intelligence

use anyhow::Result;
use chrono::Utc;
use sqlx::Row;
use tracing::debug;
use uuid::Uuid;

use super::Database;
use crate::models::{PantryTransaction, TransactionKind, TransactionSource};

/// One quantity mutation plus the ledger row describing it
///
/// `quantity_after - quantity_before == quantity_change` is enforced by
/// construction in the service layer; this struct only carries the values.
/// `expected_quantity` is the raw stored quantity observed before computing
/// the change (including `NULL`), used as the compare-and-swap guard.
#[derive(Debug, Clone)]
pub struct QuantityChange {
    /// Owning user
    pub user_id: Uuid,
    /// Item being mutated
    pub pantry_item_id: Uuid,
    /// Kind of mutation
    pub kind: TransactionKind,
    /// Stored quantity as last read; the CAS guard
    pub expected_quantity: Option<f64>,
    /// Quantity before, with `NULL` treated as zero
    pub quantity_before: f64,
    /// Signed delta
    pub quantity_change: f64,
    /// Quantity written back
    pub quantity_after: f64,
    /// Unit the quantities are expressed in
    pub unit: Option<String>,
    /// What triggered the mutation
    pub source: TransactionSource,
    /// Optional triggering entity
    pub source_id: Option<Uuid>,
    /// Free-text notes
    pub notes: Option<String>,
}

/// Filter for paginated ledger history queries
#[derive(Debug, Clone)]
pub struct TransactionFilter {
    /// Owning user (required)
    pub user_id: Uuid,
    /// Restrict to one pantry item
    pub pantry_item_id: Option<Uuid>,
    /// Restrict to one transaction kind
    pub kind: Option<TransactionKind>,
    /// Page size
    pub limit: i64,
    /// Page offset
    pub offset: i64,
}

impl TransactionFilter {
    /// Unfiltered first page for a user
    #[must_use]
    pub fn for_user(user_id: Uuid) -> Self {
        Self {
            user_id,
            pantry_item_id: None,
            kind: None,
            limit: 50,
            offset: 0,
        }
    }
}

fn row_to_transaction(row: &sqlx::sqlite::SqliteRow) -> Result<PantryTransaction> {
    let id: String = row.get("id");
    let user_id: String = row.get("user_id");
    let pantry_item_id: String = row.get("pantry_item_id");
    let kind: String = row.get("kind");
    let source: String = row.get("source");
    let source_id: Option<String> = row.get("source_id");
    Ok(PantryTransaction {
        id: Uuid::parse_str(&id)?,
        user_id: Uuid::parse_str(&user_id)?,
        pantry_item_id: Uuid::parse_str(&pantry_item_id)?,
        kind: TransactionKind::parse(&kind)
            .ok_or_else(|| anyhow::anyhow!("unknown transaction kind: {kind}"))?,
        quantity_change: row.get("quantity_change"),
        quantity_before: row.get("quantity_before"),
        quantity_after: row.get("quantity_after"),
        unit: row.get("unit"),
        source: TransactionSource::from_str_lossy(&source),
        source_id: source_id.as_deref().map(Uuid::parse_str).transpose()?,
        notes: row.get("notes"),
        occurred_at: row.get("occurred_at"),
    })
}

impl Database {
    pub(super) async fn apply_quantity_change_impl(
        &self,
        change: &QuantityChange,
    ) -> Result<Option<PantryTransaction>> {
        let occurred_at = Utc::now();
        let mut tx = self.pool.begin().await?;

        // CAS guard: `IS` instead of `=` so a NULL expected quantity still
        // compares. Zero rows affected means a concurrent writer got in
        // between our read and this write.
        let updated = sqlx::query(
            r"
            UPDATE pantry_items
            SET quantity = $1, updated_at = $2
            WHERE id = $3 AND user_id = $4 AND quantity IS $5
            ",
        )
        .bind(change.quantity_after)
        .bind(occurred_at)
        .bind(change.pantry_item_id.to_string())
        .bind(change.user_id.to_string())
        .bind(change.expected_quantity)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            tx.rollback().await?;
            debug!(
                item = %change.pantry_item_id,
                "quantity CAS guard failed; caller will re-read and retry"
            );
            return Ok(None);
        }

        let transaction = PantryTransaction {
            id: Uuid::new_v4(),
            user_id: change.user_id,
            pantry_item_id: change.pantry_item_id,
            kind: change.kind,
            quantity_change: change.quantity_change,
            quantity_before: change.quantity_before,
            quantity_after: change.quantity_after,
            unit: change.unit.clone(),
            source: change.source,
            source_id: change.source_id,
            notes: change.notes.clone(),
            occurred_at,
        };

        sqlx::query(
            r"
            INSERT INTO pantry_transactions
                (id, user_id, pantry_item_id, kind, quantity_change, quantity_before,
                 quantity_after, unit, source, source_id, notes, occurred_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            ",
        )
        .bind(transaction.id.to_string())
        .bind(transaction.user_id.to_string())
        .bind(transaction.pantry_item_id.to_string())
        .bind(transaction.kind.as_str())
        .bind(transaction.quantity_change)
        .bind(transaction.quantity_before)
        .bind(transaction.quantity_after)
        .bind(&transaction.unit)
        .bind(transaction.source.as_str())
        .bind(transaction.source_id.map(|id| id.to_string()))
        .bind(&transaction.notes)
        .bind(transaction.occurred_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        debug!(
            item = %transaction.pantry_item_id,
            kind = transaction.kind.as_str(),
            change = transaction.quantity_change,
            "recorded pantry transaction"
        );

        Ok(Some(transaction))
    }

    pub(super) async fn query_transactions_impl(
        &self,
        filter: &TransactionFilter,
    ) -> Result<(Vec<PantryTransaction>, i64)> {
        let item_id = filter.pantry_item_id.map(|id| id.to_string());
        let kind = filter.kind.map(|k| k.as_str());

        let total: i64 = sqlx::query_scalar(
            r"
            SELECT COUNT(*)
            FROM pantry_transactions
            WHERE user_id = $1
              AND ($2 IS NULL OR pantry_item_id = $2)
              AND ($3 IS NULL OR kind = $3)
            ",
        )
        .bind(filter.user_id.to_string())
        .bind(&item_id)
        .bind(kind)
        .fetch_one(&self.pool)
        .await?;

        let rows = sqlx::query(
            r"
            SELECT id, user_id, pantry_item_id, kind, quantity_change, quantity_before,
                   quantity_after, unit, source, source_id, notes, occurred_at
            FROM pantry_transactions
            WHERE user_id = $1
              AND ($2 IS NULL OR pantry_item_id = $2)
              AND ($3 IS NULL OR kind = $3)
            ORDER BY occurred_at DESC, id DESC
            LIMIT $4 OFFSET $5
            ",
        )
        .bind(filter.user_id.to_string())
        .bind(&item_id)
        .bind(kind)
        .bind(filter.limit)
        .bind(filter.offset)
        .fetch_all(&self.pool)
        .await?;

        let transactions = rows.iter().map(row_to_transaction).collect::<Result<_>>()?;
        Ok((transactions, total))
    }
}
