// ABOUTME: Integration tests for item-level mutations and the transaction ledger
// ABOUTME: Covers add/deduct/adjust, unit conversion, clamping, pagination, and waste-marking
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Larder Kitchen Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use larder_core::database::{
    Database, InventoryStore, QuantityChange, TransactionFilter,
};
use larder_core::errors::InventoryError;
use larder_core::models::{
    Meal, PantryItem, PantryTransaction, Recipe, TransactionKind, TransactionSource,
};
use larder_core::services::InventoryService;
use uuid::Uuid;

mod common;
use common::{create_test_database, create_test_service, seed_pantry_item};

const TOLERANCE: f64 = 1e-9;

/// Store wrapper that reports a fixed number of compare-and-swap misses
/// before delegating, standing in for concurrent writers on the same item.
struct ContendedStore {
    inner: Arc<Database>,
    forced_misses: AtomicU32,
}

impl ContendedStore {
    fn new(inner: Arc<Database>, forced_misses: u32) -> Self {
        Self {
            inner,
            forced_misses: AtomicU32::new(forced_misses),
        }
    }
}

#[async_trait]
impl InventoryStore for ContendedStore {
    async fn list_pantry_items(&self, user_id: Uuid) -> Result<Vec<PantryItem>> {
        self.inner.list_pantry_items(user_id).await
    }

    async fn get_pantry_item(&self, user_id: Uuid, item_id: Uuid) -> Result<Option<PantryItem>> {
        self.inner.get_pantry_item(user_id, item_id).await
    }

    async fn apply_quantity_change(
        &self,
        change: &QuantityChange,
    ) -> Result<Option<PantryTransaction>> {
        let miss = self
            .forced_misses
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if miss {
            return Ok(None);
        }
        self.inner.apply_quantity_change(change).await
    }

    async fn query_transactions(
        &self,
        filter: &TransactionFilter,
    ) -> Result<(Vec<PantryTransaction>, i64)> {
        self.inner.query_transactions(filter).await
    }

    async fn get_recipe(&self, user_id: Uuid, recipe_id: Uuid) -> Result<Option<Recipe>> {
        self.inner.get_recipe(user_id, recipe_id).await
    }

    async fn get_meal(&self, user_id: Uuid, meal_id: Uuid) -> Result<Option<Meal>> {
        self.inner.get_meal(user_id, meal_id).await
    }
}

#[tokio::test]
async fn add_records_transaction_with_before_and_after() {
    let db = create_test_database().await.expect("test database");
    let service = create_test_service(&db);
    let user = Uuid::new_v4();
    let item = seed_pantry_item(&db, user, "flour", Some(100.0), Some("g")).await;

    let txn = service
        .add_to_pantry(user, item.id, 50.0, Some("g"), TransactionSource::Manual, None, None)
        .await
        .expect("add should succeed");

    assert_eq!(txn.kind, TransactionKind::Add);
    assert!((txn.quantity_before - 100.0).abs() < TOLERANCE);
    assert!((txn.quantity_change - 50.0).abs() < TOLERANCE);
    assert!((txn.quantity_after - 150.0).abs() < TOLERANCE);
    assert!((txn.quantity_after - (txn.quantity_before + txn.quantity_change)).abs() < TOLERANCE);

    let reloaded = db
        .get_pantry_item(user, item.id)
        .await
        .expect("read")
        .expect("item exists");
    assert!((reloaded.quantity.unwrap() - 150.0).abs() < TOLERANCE);
}

#[tokio::test]
async fn deduct_within_stock_matches_requested_amount() {
    let db = create_test_database().await.expect("test database");
    let service = create_test_service(&db);
    let user = Uuid::new_v4();
    let item = seed_pantry_item(&db, user, "sugar", Some(100.0), Some("g")).await;

    let txn = service
        .deduct_from_pantry(
            user,
            item.id,
            40.0,
            Some("g"),
            TransactionSource::Manual,
            None,
            None,
            false,
        )
        .await
        .expect("deduct should succeed");

    assert_eq!(txn.kind, TransactionKind::Deduct);
    assert!((txn.quantity_change - (-40.0)).abs() < TOLERANCE);
    assert!((txn.quantity_after - 60.0).abs() < TOLERANCE);
}

#[tokio::test]
async fn short_deduction_clamps_to_zero_and_records_clamped_change() {
    let db = create_test_database().await.expect("test database");
    let service = create_test_service(&db);
    let user = Uuid::new_v4();
    let item = seed_pantry_item(&db, user, "butter", Some(100.0), Some("g")).await;

    let txn = service
        .deduct_from_pantry(
            user,
            item.id,
            500.0,
            Some("g"),
            TransactionSource::Manual,
            None,
            None,
            false,
        )
        .await
        .expect("clamped deduct should succeed");

    // The clamped amount, not the requested amount, is what the ledger holds
    assert!((txn.quantity_change - (-100.0)).abs() < TOLERANCE);
    assert!(txn.quantity_after.abs() < TOLERANCE);

    let reloaded = db
        .get_pantry_item(user, item.id)
        .await
        .expect("read")
        .expect("item exists");
    assert!(reloaded.quantity.unwrap().abs() < TOLERANCE);
}

#[tokio::test]
async fn allow_negative_skips_the_clamp() {
    let db = create_test_database().await.expect("test database");
    let service = create_test_service(&db);
    let user = Uuid::new_v4();
    let item = seed_pantry_item(&db, user, "milk", Some(100.0), Some("ml")).await;

    let txn = service
        .deduct_from_pantry(
            user,
            item.id,
            150.0,
            Some("ml"),
            TransactionSource::Manual,
            None,
            None,
            true,
        )
        .await
        .expect("deduct should succeed");

    assert!((txn.quantity_after - (-50.0)).abs() < TOLERANCE);
    assert!((txn.quantity_change - (-150.0)).abs() < TOLERANCE);
}

#[tokio::test]
async fn deduction_converts_units_before_applying() {
    let db = create_test_database().await.expect("test database");
    let service = create_test_service(&db);
    let user = Uuid::new_v4();
    let item = seed_pantry_item(&db, user, "sugar", Some(1.0), Some("kg")).await;

    let txn = service
        .deduct_from_pantry(
            user,
            item.id,
            250.0,
            Some("g"),
            TransactionSource::Manual,
            None,
            None,
            false,
        )
        .await
        .expect("deduct should succeed");

    // Recorded in the item's stored unit
    assert_eq!(txn.unit.as_deref(), Some("kg"));
    assert!((txn.quantity_change - (-0.25)).abs() < 1e-6);
    assert!((txn.quantity_after - 0.75).abs() < 1e-6);
}

#[tokio::test]
async fn incompatible_unit_is_an_error_at_item_level() {
    let db = create_test_database().await.expect("test database");
    let service = create_test_service(&db);
    let user = Uuid::new_v4();
    let item = seed_pantry_item(&db, user, "flour", Some(500.0), Some("g")).await;

    let result = service
        .add_to_pantry(user, item.id, 1.0, Some("ml"), TransactionSource::Manual, None, None)
        .await;

    assert!(matches!(
        result,
        Err(InventoryError::IncompatibleUnits { .. })
    ));

    // No mutation and no ledger row on failure
    let reloaded = db
        .get_pantry_item(user, item.id)
        .await
        .expect("read")
        .expect("item exists");
    assert!((reloaded.quantity.unwrap() - 500.0).abs() < TOLERANCE);
    let history = service
        .transaction_history(user, Some(item.id), None, 10, 0)
        .await
        .expect("history");
    assert_eq!(history.total_count, 0);
}

#[tokio::test]
async fn unknown_item_is_an_error() {
    let db = create_test_database().await.expect("test database");
    let service = create_test_service(&db);
    let user = Uuid::new_v4();

    let result = service
        .add_to_pantry(
            user,
            Uuid::new_v4(),
            1.0,
            None,
            TransactionSource::Manual,
            None,
            None,
        )
        .await;

    assert!(matches!(result, Err(InventoryError::ItemNotFound(_))));
}

#[tokio::test]
async fn negative_quantity_is_rejected() {
    let db = create_test_database().await.expect("test database");
    let service = create_test_service(&db);
    let user = Uuid::new_v4();
    let item = seed_pantry_item(&db, user, "flour", Some(500.0), Some("g")).await;

    let result = service
        .add_to_pantry(user, item.id, -5.0, Some("g"), TransactionSource::Manual, None, None)
        .await;

    assert!(matches!(result, Err(InventoryError::InvalidQuantity(_))));
}

#[tokio::test]
async fn adjust_sets_quantity_and_records_signed_delta() {
    let db = create_test_database().await.expect("test database");
    let service = create_test_service(&db);
    let user = Uuid::new_v4();
    let item = seed_pantry_item(&db, user, "rice", Some(300.0), Some("g")).await;

    let txn = service
        .adjust_pantry(user, item.id, 42.0, Some("stock take"))
        .await
        .expect("adjust should succeed");

    assert_eq!(txn.kind, TransactionKind::Adjust);
    assert!((txn.quantity_change - (42.0 - 300.0)).abs() < TOLERANCE);
    assert!((txn.quantity_after - 42.0).abs() < TOLERANCE);
    assert_eq!(txn.notes.as_deref(), Some("stock take"));
}

#[tokio::test]
async fn history_is_paginated_filtered_and_newest_first() {
    let db = create_test_database().await.expect("test database");
    let service = create_test_service(&db);
    let user = Uuid::new_v4();
    let item = seed_pantry_item(&db, user, "flour", Some(1000.0), Some("g")).await;

    for amount in [10.0, 20.0, 30.0] {
        service
            .add_to_pantry(user, item.id, amount, Some("g"), TransactionSource::Grocery, None, None)
            .await
            .expect("add");
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }
    for amount in [5.0, 15.0] {
        service
            .deduct_from_pantry(
                user,
                item.id,
                amount,
                Some("g"),
                TransactionSource::Meal,
                None,
                None,
                false,
            )
            .await
            .expect("deduct");
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }

    let page = service
        .transaction_history(user, None, None, 2, 0)
        .await
        .expect("history");
    assert_eq!(page.total_count, 5);
    assert_eq!(page.transactions.len(), 2);
    assert!(page.transactions[0].occurred_at >= page.transactions[1].occurred_at);
    // Newest first: the last deduction leads
    assert!((page.transactions[0].quantity_change - (-15.0)).abs() < TOLERANCE);

    let deductions = service
        .transaction_history(user, Some(item.id), Some(TransactionKind::Deduct), 10, 0)
        .await
        .expect("history");
    assert_eq!(deductions.total_count, 2);
    assert!(deductions
        .transactions
        .iter()
        .all(|t| t.kind == TransactionKind::Deduct));

    let offset_page = service
        .transaction_history(user, None, None, 2, 4)
        .await
        .expect("history");
    assert_eq!(offset_page.transactions.len(), 1);
}

#[tokio::test]
async fn ledger_is_scoped_to_the_owning_user() {
    let db = create_test_database().await.expect("test database");
    let service = create_test_service(&db);
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();
    let item = seed_pantry_item(&db, alice, "flour", Some(100.0), Some("g")).await;

    service
        .add_to_pantry(alice, item.id, 10.0, Some("g"), TransactionSource::Manual, None, None)
        .await
        .expect("add");

    // Bob cannot see Alice's item or her history
    let result = service
        .add_to_pantry(bob, item.id, 10.0, Some("g"), TransactionSource::Manual, None, None)
        .await;
    assert!(matches!(result, Err(InventoryError::ItemNotFound(_))));

    let history = service
        .transaction_history(bob, None, None, 10, 0)
        .await
        .expect("history");
    assert_eq!(history.total_count, 0);
}

#[tokio::test]
async fn wasted_items_drop_out_of_listings() {
    let db = create_test_database().await.expect("test database");
    let user = Uuid::new_v4();
    let keep = seed_pantry_item(&db, user, "flour", Some(100.0), Some("g")).await;
    let waste = seed_pantry_item(&db, user, "old yogurt", Some(1.0), Some("pot")).await;

    let marked = db
        .mark_pantry_item_wasted(user, waste.id)
        .await
        .expect("mark wasted");
    assert!(marked);

    let items = db.list_pantry_items(user).await.expect("list");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].id, keep.id);

    // Waste-marking also archives
    let reloaded = db
        .get_pantry_item(user, waste.id)
        .await
        .expect("read")
        .expect("item still readable by id");
    assert!(reloaded.is_wasted);
    assert!(reloaded.is_archived);
}

#[tokio::test]
async fn cas_miss_is_retried_and_the_deduction_lands() {
    let db = create_test_database().await.expect("test database");
    let user = Uuid::new_v4();
    let item = seed_pantry_item(&db, user, "flour", Some(100.0), Some("g")).await;

    let store: Arc<dyn InventoryStore> = Arc::new(ContendedStore::new(db.clone(), 1));
    let service = InventoryService::new(store);

    let txn = service
        .deduct_from_pantry(
            user,
            item.id,
            40.0,
            Some("g"),
            TransactionSource::Manual,
            None,
            None,
            false,
        )
        .await
        .expect("deduct should retry past the contended write");

    assert!((txn.quantity_after - 60.0).abs() < TOLERANCE);
    assert!((txn.quantity_after - (txn.quantity_before + txn.quantity_change)).abs() < TOLERANCE);

    let reloaded = db
        .get_pantry_item(user, item.id)
        .await
        .expect("read")
        .expect("item exists");
    assert!((reloaded.quantity.unwrap() - 60.0).abs() < TOLERANCE);
}

#[tokio::test]
async fn contention_past_the_retry_budget_is_a_conflict() {
    let db = create_test_database().await.expect("test database");
    let user = Uuid::new_v4();
    let item = seed_pantry_item(&db, user, "flour", Some(100.0), Some("g")).await;

    let store: Arc<dyn InventoryStore> = Arc::new(ContendedStore::new(db.clone(), u32::MAX));
    let service = InventoryService::new(store);

    let result = service
        .deduct_from_pantry(
            user,
            item.id,
            40.0,
            Some("g"),
            TransactionSource::Manual,
            None,
            None,
            false,
        )
        .await;

    assert!(matches!(result, Err(InventoryError::Conflict(id)) if id == item.id));

    // Nothing landed: stock untouched, ledger empty
    let reloaded = db
        .get_pantry_item(user, item.id)
        .await
        .expect("read")
        .expect("item exists");
    assert!((reloaded.quantity.unwrap() - 100.0).abs() < TOLERANCE);
    let (transactions, total) = db
        .query_transactions(&TransactionFilter::for_user(user))
        .await
        .expect("history");
    assert!(transactions.is_empty());
    assert_eq!(total, 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn racing_deductions_never_lose_a_decrement() {
    let db = create_test_database().await.expect("test database");
    let service = create_test_service(&db);
    let user = Uuid::new_v4();
    let item = seed_pantry_item(&db, user, "flour", Some(100.0), Some("g")).await;
    let item_id = item.id;

    let first_service = service.clone();
    let second_service = service.clone();
    let first = tokio::spawn(async move {
        first_service
            .deduct_from_pantry(
                user,
                item_id,
                30.0,
                Some("g"),
                TransactionSource::Manual,
                None,
                None,
                false,
            )
            .await
    });
    let second = tokio::spawn(async move {
        second_service
            .deduct_from_pantry(
                user,
                item_id,
                50.0,
                Some("g"),
                TransactionSource::Meal,
                None,
                None,
                false,
            )
            .await
    });

    first.await.expect("task").expect("first deduct");
    second.await.expect("task").expect("second deduct");

    // Both decrements applied; neither was silently lost
    let reloaded = db
        .get_pantry_item(user, item_id)
        .await
        .expect("read")
        .expect("item exists");
    assert!((reloaded.quantity.unwrap() - 20.0).abs() < TOLERANCE);

    let page = service
        .transaction_history(user, Some(item_id), None, 10, 0)
        .await
        .expect("history");
    assert_eq!(page.total_count, 2);
    let total_change: f64 = page.transactions.iter().map(|t| t.quantity_change).sum();
    assert!((total_change - (-80.0)).abs() < TOLERANCE);
    for txn in &page.transactions {
        assert!(
            (txn.quantity_after - (txn.quantity_before + txn.quantity_change)).abs() < TOLERANCE
        );
    }
}
