// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides database creation, pantry seeding, and service construction helpers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Larder Kitchen Intelligence
#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate
)]

//! Shared test utilities for `larder_core`
//!
//! Common setup functions to reduce duplication across integration tests.

use std::sync::{Arc, Once};

use anyhow::Result;
use larder_core::database::{Database, InventoryStore, NewPantryItem};
use larder_core::models::PantryItem;
use larder_core::services::InventoryService;
use uuid::Uuid;

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            _ => tracing::Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// Standard test database setup
pub async fn create_test_database() -> Result<Arc<Database>> {
    init_test_logging();
    let database = Arc::new(Database::new("sqlite::memory:").await?);
    Ok(database)
}

/// Inventory service over a test database with default tables and config
pub fn create_test_service(database: &Arc<Database>) -> InventoryService {
    let store: Arc<dyn InventoryStore> = database.clone();
    InventoryService::new(store)
}

/// Seed one pantry item for a user
pub async fn seed_pantry_item(
    database: &Database,
    user_id: Uuid,
    name: &str,
    quantity: Option<f64>,
    unit: Option<&str>,
) -> PantryItem {
    database
        .create_pantry_item(&NewPantryItem::new(user_id, name, quantity, unit))
        .await
        .expect("Failed to seed pantry item")
}
