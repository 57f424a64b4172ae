//! # SQLite database methods
//!
//! This module contains the "low-level" SQLite database interactions.
//!
//! All these interactions are maintained by simple functions (rather than stateful structs) that accept a
//! `&mut SqliteConnection` argument. Callers can obtain a connection from a pool, or create an atomic transaction as
//! the need arises and call through to the functions without any other changes.
use std::env;

use log::info;
use sqlx::{sqlite::SqlitePoolOptions, Error as SqlxError, SqlitePool};

pub mod catalog;
pub mod documents;
pub mod ledger;

const SQLITE_DB_URL: &str = "sqlite://data/paystack_store.db";

pub fn db_url() -> String {
    let result = env::var("PPS_DATABASE_URL").unwrap_or_else(|_| {
        info!("PPS_DATABASE_URL is not set. Using the default.");
        SQLITE_DB_URL.to_string()
    });
    info!("Using database URL: {result}");
    result
}

pub async fn new_pool(url: &str, max_connections: u32) -> Result<SqlitePool, SqlxError> {
    let pool = SqlitePoolOptions::new().max_connections(max_connections).connect(url).await?;
    Ok(pool)
}

/// Creates the schema if it does not exist yet. Safe to run on every startup.
///
/// The `UNIQUE` constraint on `paystack_ledger.reference` is load-bearing: it is the synchronization point that
/// guarantees at-most-once processing when independent execution contexts race on the same transaction.
pub async fn create_schema(pool: &SqlitePool) -> Result<(), SqlxError> {
    const TABLES: [&str; 7] = [
        r#"CREATE TABLE IF NOT EXISTS paystack_ledger (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            amount REAL NOT NULL,
            currency TEXT NOT NULL,
            message TEXT NOT NULL,
            status TEXT NOT NULL,
            reference TEXT NOT NULL UNIQUE,
            payment_request TEXT NOT NULL,
            reference_doctype TEXT NOT NULL,
            reference_name TEXT NOT NULL,
            transaction_id INTEGER NOT NULL,
            data TEXT NOT NULL,
            created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
        )"#,
        r#"CREATE TABLE IF NOT EXISTS gateway_settings (
            gateway TEXT PRIMARY KEY,
            secret_key TEXT NOT NULL,
            public_key TEXT NOT NULL
        )"#,
        r#"CREATE TABLE IF NOT EXISTS payment_requests (
            name TEXT PRIMARY KEY,
            request_type TEXT NOT NULL,
            email_to TEXT,
            currency TEXT NOT NULL,
            status TEXT NOT NULL,
            payment_gateway TEXT NOT NULL,
            reference_doctype TEXT NOT NULL,
            reference_name TEXT NOT NULL
        )"#,
        r#"CREATE TABLE IF NOT EXISTS integration_requests (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            reference_doctype TEXT NOT NULL,
            reference_docname TEXT NOT NULL,
            status TEXT NOT NULL
        )"#,
        r#"CREATE TABLE IF NOT EXISTS sales_orders (
            name TEXT PRIMARY KEY,
            customer_name TEXT NOT NULL,
            contact_email TEXT,
            customer_email TEXT
        )"#,
        r#"CREATE TABLE IF NOT EXISTS sales_order_items (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            order_name TEXT NOT NULL REFERENCES sales_orders (name),
            item_code TEXT NOT NULL
        )"#,
        r#"CREATE TABLE IF NOT EXISTS course_provisioning (
            item_code TEXT PRIMARY KEY,
            enrollment_key TEXT,
            course_link TEXT
        )"#,
    ];
    for table in TABLES {
        sqlx::query(table).execute(pool).await?;
    }
    Ok(())
}
