use actix_web::{body::MessageBody, http::StatusCode, test, test::TestRequest, web, App};
use paystack_payment_engine::db_types::PaymentRequestType;

use super::mocks::*;
use crate::{data_objects::PaymentRequestBootstrap, routes};

async fn get_bootstrap(backend: MockBackend, uri: &str) -> (StatusCode, String) {
    let api = MockApi::new(MockGateway::new(), backend, MockMailer::new());
    let app = test::init_service(App::new().app_data(web::Data::new(api)).route(
        "/paystack/payment_request",
        web::get().to(routes::payment_request_bootstrap::<MockGateway, MockBackend, MockMailer>),
    ))
    .await;
    let req = TestRequest::get().uri(uri).to_request();
    let (_req, res) = test::call_service(&app, req).await.into_parts();
    let status = res.status();
    let body = String::from_utf8_lossy(&res.into_body().try_into_bytes().unwrap()).into_owned();
    (status, body)
}

#[actix_web::test]
async fn bootstrap_returns_public_key_and_checkout_metadata() {
    let _ = env_logger::try_init().ok();
    let mut backend = MockBackend::new();
    backend
        .expect_fetch_payment_request()
        .times(1)
        .returning(|_| Ok(Some(payment_request(PaymentRequestType::Inward))));
    backend.expect_fetch_gateway_credentials().times(1).returning(|_| Ok(Some(credentials())));
    let (status, body) = get_bootstrap(
        backend,
        "/paystack/payment_request?reference_doctype=Payment%20Request&reference_docname=PR-0001",
    )
    .await;
    assert!(status.is_success(), "was: {body}");
    let response: PaymentRequestBootstrap = serde_json::from_str(&body).unwrap();
    assert_eq!(response.name, "PR-0001");
    assert_eq!(response.email.as_deref(), Some("buyer@example.com"));
    assert_eq!(response.currency, "NGN");
    assert_eq!(response.public_key, "pk_test_0000000000");
    assert_eq!(response.metadata.doctype, "Payment Request");
    assert_eq!(response.metadata.docname, "PR-0001");
    assert_eq!(response.metadata.reference_doctype, "Sales Order");
    assert_eq!(response.metadata.reference_name, "SO-0001");
    assert_eq!(response.metadata.gateway, "Paystack");
}

#[actix_web::test]
async fn outward_payment_requests_are_rejected() {
    let _ = env_logger::try_init().ok();
    let mut backend = MockBackend::new();
    backend
        .expect_fetch_payment_request()
        .times(1)
        .returning(|_| Ok(Some(payment_request(PaymentRequestType::Outward))));
    let (status, body) = get_bootstrap(
        backend,
        "/paystack/payment_request?reference_doctype=Payment%20Request&reference_docname=PR-0001",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("Only Inward payment allowed."), "was: {body}");
}

#[actix_web::test]
async fn missing_payment_request_is_not_found() {
    let _ = env_logger::try_init().ok();
    let mut backend = MockBackend::new();
    backend.expect_fetch_payment_request().times(1).returning(|_| Ok(None));
    let (status, body) = get_bootstrap(
        backend,
        "/paystack/payment_request?reference_doctype=Payment%20Request&reference_docname=PR-MISSING",
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("No payment request named 'PR-MISSING'."), "was: {body}");
}

#[actix_web::test]
async fn unsupported_reference_doctype_is_rejected() {
    let _ = env_logger::try_init().ok();
    // The document is never looked up: no expectations on the backend.
    let (status, body) = get_bootstrap(
        MockBackend::new(),
        "/paystack/payment_request?reference_doctype=Sales%20Order&reference_docname=SO-0001",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("Unsupported reference doctype"), "was: {body}");
}
