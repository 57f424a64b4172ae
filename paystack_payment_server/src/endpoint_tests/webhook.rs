use std::sync::{Arc, Mutex};

use actix_web::{test, test::TestRequest, web, App};
use log::*;
use paystack_payment_engine::db_types::TransactionStatus;

use super::mocks::*;
use crate::{
    data_objects::{JsonResponse, WebhookPayload},
    routes,
};

fn push_payload(reference: &str) -> WebhookPayload {
    // A realistic charge.success push. Only `reference` and `metadata.gateway` are read by the server.
    let envelope = serde_json::json!({
        "event": "charge.success",
        "reference": reference,
        "status": "success",
        "amount": 150000,
        "currency": "NGN",
        "metadata": {
            "gateway": "Paystack",
            "doctype": "Payment Request",
            "docname": "PR-0001",
            "reference_doctype": "Sales Order",
            "reference_name": "SO-0001"
        }
    });
    WebhookPayload { data: envelope.to_string() }
}

async fn post_webhook(api: MockApi, payload: WebhookPayload) -> JsonResponse {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(api))
            .route("/paystack/webhook", web::post().to(routes::webhook::<MockGateway, MockBackend, MockMailer>)),
    )
    .await;
    let req = TestRequest::post().uri("/paystack/webhook").set_form(payload).to_request();
    test::call_and_read_body_json(&app, req).await
}

#[actix_web::test]
async fn webhook_reverifies_settles_and_fulfills() {
    let _ = env_logger::try_init().ok();
    let log = Arc::new(Mutex::new(Vec::new()));
    let api = success_api(log.clone());
    let response = post_webhook(api, push_payload("TREF-1")).await;
    assert!(response.success, "was: {}", response.message);
    let events = log.lock().unwrap().clone();
    info!("Webhook effect log: {events:?}");
    assert_eq!(events, vec![
        "verify:TREF-1".to_string(),
        "record:TREF-1".to_string(),
        "settle:PR-0001".to_string(),
        "mail:ada@example.com".to_string(),
    ]);
}

#[actix_web::test]
async fn webhook_never_trusts_the_pushed_status() {
    let _ = env_logger::try_init().ok();
    // The push claims "success", but the provider says the charge failed. Settlement is recorded for the verified
    // (failed) attempt; fulfillment must not run, so no order/catalog/mailer expectations are registered.
    let mut gateway = MockGateway::new();
    gateway
        .expect_verify()
        .times(1)
        .returning(|reference, _| Ok(verification(TransactionStatus::Failed, reference.as_str())));
    let mut backend = MockBackend::new();
    backend.expect_fetch_gateway_credentials().times(1).returning(|_| Ok(Some(credentials())));
    backend.expect_record_if_absent().times(1).returning(|entry| Ok((ledger_entry_from(&entry), true)));
    backend.expect_settle_payment_request().times(1).returning(|_| Ok(()));
    let api = MockApi::new(gateway, backend, MockMailer::new());

    let response = post_webhook(api, push_payload("TREF-2")).await;
    assert!(response.success);
}

#[actix_web::test]
async fn duplicate_webhook_is_a_noop() {
    let _ = env_logger::try_init().ok();
    let mut gateway = MockGateway::new();
    gateway
        .expect_verify()
        .times(1)
        .returning(|reference, _| Ok(verification(TransactionStatus::Success, reference.as_str())));
    let mut backend = MockBackend::new();
    backend.expect_fetch_gateway_credentials().times(1).returning(|_| Ok(Some(credentials())));
    // The ledger already holds this reference: no settlement, no fulfillment.
    backend.expect_record_if_absent().times(1).returning(|entry| Ok((ledger_entry_from(&entry), false)));
    let api = MockApi::new(gateway, backend, MockMailer::new());

    let response = post_webhook(api, push_payload("TREF-3")).await;
    assert!(response.success);
    assert_eq!(response.message, "Transaction already processed.");
}

#[actix_web::test]
async fn malformed_webhook_payload_is_acknowledged_without_side_effects() {
    let _ = env_logger::try_init().ok();
    // No expectations at all: any reconciliation call would fail the test.
    let api = MockApi::new(MockGateway::new(), MockBackend::new(), MockMailer::new());
    let response = post_webhook(api, WebhookPayload { data: "this is not json".to_string() }).await;
    assert!(!response.success);
    assert_eq!(response.message, "Could not parse webhook payload.");
}

#[actix_web::test]
async fn webhook_acknowledges_gateway_failures_generically() {
    let _ = env_logger::try_init().ok();
    use paystack_payment_engine::traits::GatewayError;
    let mut gateway = MockGateway::new();
    gateway.expect_verify().times(1).returning(|_, _| {
        Err(GatewayError::Gateway { status: 502, message: "Bad gateway".to_string() })
    });
    let mut backend = MockBackend::new();
    backend.expect_fetch_gateway_credentials().times(1).returning(|_| Ok(Some(credentials())));
    let api = MockApi::new(gateway, backend, MockMailer::new());

    let response = post_webhook(api, push_payload("TREF-4")).await;
    assert!(!response.success);
    // No provider detail leaks to the caller.
    assert_eq!(response.message, "Could not verify transaction.");
}
