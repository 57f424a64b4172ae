use pps_common::Secret;
use sqlx::SqliteConnection;

use crate::db_types::{GatewayCredentials, IntegrationRequest, OrderLineItem, PaymentRequest, SalesOrder};

/// The terminal status applied to payment requests and integration requests once a transaction is settled.
pub const SETTLED_STATUS: &str = "Completed";

pub async fn fetch_gateway_credentials(
    gateway: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<GatewayCredentials>, sqlx::Error> {
    let row: Option<(String, String, String)> =
        sqlx::query_as("SELECT gateway, secret_key, public_key FROM gateway_settings WHERE gateway = $1")
            .bind(gateway)
            .fetch_optional(&mut *conn)
            .await?;
    Ok(row.map(|(gateway, secret_key, public_key)| GatewayCredentials {
        gateway,
        secret_key: Secret::new(secret_key),
        public_key,
    }))
}

pub async fn upsert_gateway_settings(
    credentials: &GatewayCredentials,
    conn: &mut SqliteConnection,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
            INSERT INTO gateway_settings (gateway, secret_key, public_key) VALUES ($1, $2, $3)
            ON CONFLICT (gateway) DO UPDATE SET secret_key = excluded.secret_key, public_key = excluded.public_key;
        "#,
    )
    .bind(&credentials.gateway)
    .bind(credentials.secret_key.reveal())
    .bind(&credentials.public_key)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub async fn fetch_payment_request(
    name: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<PaymentRequest>, sqlx::Error> {
    let request = sqlx::query_as("SELECT * FROM payment_requests WHERE name = $1")
        .bind(name)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(request)
}

pub async fn insert_payment_request(request: &PaymentRequest, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
            INSERT INTO payment_requests (
                name, request_type, email_to, currency, status, payment_gateway, reference_doctype, reference_name
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8);
        "#,
    )
    .bind(&request.name)
    .bind(request.request_type)
    .bind(&request.email_to)
    .bind(&request.currency)
    .bind(&request.status)
    .bind(&request.payment_gateway)
    .bind(&request.reference_doctype)
    .bind(&request.reference_name)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// Marks the payment request as authorized with the settled status. Returns `false` if no such request exists.
pub async fn mark_payment_request_completed(name: &str, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE payment_requests SET status = $1 WHERE name = $2")
        .bind(SETTLED_STATUS)
        .bind(name)
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn fetch_integration_request(
    reference_doctype: &str,
    reference_docname: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<IntegrationRequest>, sqlx::Error> {
    let request = sqlx::query_as(
        "SELECT * FROM integration_requests WHERE reference_doctype = $1 AND reference_docname = $2 ORDER BY id LIMIT 1",
    )
    .bind(reference_doctype)
    .bind(reference_docname)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(request)
}

pub async fn insert_integration_request(
    reference_doctype: &str,
    reference_docname: &str,
    status: &str,
    conn: &mut SqliteConnection,
) -> Result<i64, sqlx::Error> {
    let (id,): (i64,) = sqlx::query_as(
        r#"
            INSERT INTO integration_requests (reference_doctype, reference_docname, status)
            VALUES ($1, $2, $3) RETURNING id;
        "#,
    )
    .bind(reference_doctype)
    .bind(reference_docname)
    .bind(status)
    .fetch_one(&mut *conn)
    .await?;
    Ok(id)
}

pub async fn mark_integration_request_completed(id: i64, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE integration_requests SET status = $1 WHERE id = $2")
        .bind(SETTLED_STATUS)
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

/// Returns the sales order and its line items, or `None` if no such order exists.
pub async fn fetch_sales_order(name: &str, conn: &mut SqliteConnection) -> Result<Option<SalesOrder>, sqlx::Error> {
    let base: Option<(String, String, Option<String>, Option<String>)> = sqlx::query_as(
        "SELECT name, customer_name, contact_email, customer_email FROM sales_orders WHERE name = $1",
    )
    .bind(name)
    .fetch_optional(&mut *conn)
    .await?;
    let Some((name, customer_name, contact_email, customer_email)) = base else {
        return Ok(None);
    };
    let items: Vec<OrderLineItem> = sqlx::query_as("SELECT item_code FROM sales_order_items WHERE order_name = $1")
        .bind(&name)
        .fetch_all(&mut *conn)
        .await?;
    Ok(Some(SalesOrder { name, customer_name, contact_email, customer_email, items }))
}

pub async fn insert_sales_order(order: &SalesOrder, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO sales_orders (name, customer_name, contact_email, customer_email) VALUES ($1, $2, $3, $4)")
        .bind(&order.name)
        .bind(&order.customer_name)
        .bind(&order.contact_email)
        .bind(&order.customer_email)
        .execute(&mut *conn)
        .await?;
    for item in &order.items {
        sqlx::query("INSERT INTO sales_order_items (order_name, item_code) VALUES ($1, $2)")
            .bind(&order.name)
            .bind(&item.item_code)
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}
