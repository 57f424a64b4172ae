use std::{
    future::Future,
    pin::Pin,
    sync::{Arc, Mutex},
    time::Duration,
};

use actix_web::{test, test::TestRequest, web, App};
use paystack_payment_engine::{
    db_types::TxReference,
    jobs::{JobHandler, JobQueue, VerifyJob},
};

use super::mocks::*;
use crate::{
    data_objects::{JsonResponse, VerifyRequest, WebhookPayload},
    routes,
};

#[actix_web::test]
async fn poll_acknowledges_immediately_and_queues_the_job() {
    let _ = env_logger::try_init().ok();
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let handler: JobHandler<VerifyJob> = Arc::new(move |job: VerifyJob| {
        let tx = tx.clone();
        Box::pin(async move {
            let _ = tx.send(job);
        }) as Pin<Box<dyn Future<Output = ()> + Send>>
    });
    let queue = JobQueue::new(8, handler);
    let sink = queue.sink();
    tokio::spawn(queue.run());

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(sink))
            .route("/paystack/verify", web::post().to(routes::verify_transaction)),
    )
    .await;
    let body = VerifyRequest { reference: TxReference::from("TREF-9".to_string()), gateway: "Paystack".to_string() };
    let req = TestRequest::post().uri("/paystack/verify").set_json(body).to_request();
    let response: JsonResponse = test::call_and_read_body_json(&app, req).await;
    assert!(response.success);
    assert_eq!(response.message, "Verification queued.");

    let job = tokio::time::timeout(Duration::from_secs(1), rx.recv())
        .await
        .expect("the job was not queued in time")
        .expect("the queue was closed without delivering the job");
    assert_eq!(job.reference.as_str(), "TREF-9");
    assert_eq!(job.gateway, "Paystack");
}

/// Feeding the webhook handler and the poll path the same valid reference must produce identical reconciliation
/// effects: same verification, same ledger write, same settlement, same fulfillment.
#[actix_web::test]
async fn poll_and_webhook_drive_identical_reconciliation_effects() {
    let _ = env_logger::try_init().ok();

    // --- Webhook path ---
    let webhook_log = Arc::new(Mutex::new(Vec::new()));
    let api = success_api(webhook_log.clone());
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(api))
            .route("/paystack/webhook", web::post().to(routes::webhook::<MockGateway, MockBackend, MockMailer>)),
    )
    .await;
    let envelope = serde_json::json!({
        "reference": "TREF-7",
        "metadata": { "gateway": "Paystack" }
    });
    let req = TestRequest::post()
        .uri("/paystack/webhook")
        .set_form(WebhookPayload { data: envelope.to_string() })
        .to_request();
    let response: JsonResponse = test::call_and_read_body_json(&app, req).await;
    assert!(response.success);

    // --- Poll path: the endpoint queues a job; the worker handler runs the same reconcile call. ---
    let poll_log = Arc::new(Mutex::new(Vec::new()));
    let api = Arc::new(success_api(poll_log.clone()));
    let (done_tx, mut done_rx) = tokio::sync::mpsc::unbounded_channel();
    let handler: JobHandler<VerifyJob> = Arc::new(move |job: VerifyJob| {
        let api = Arc::clone(&api);
        let done = done_tx.clone();
        Box::pin(async move {
            routes::reconcile_and_report(api.as_ref(), &job.reference, &job.gateway, "test worker").await;
            let _ = done.send(());
        }) as Pin<Box<dyn Future<Output = ()> + Send>>
    });
    let queue = JobQueue::new(8, handler);
    let sink = queue.sink();
    tokio::spawn(queue.run());
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(sink))
            .route("/paystack/verify", web::post().to(routes::verify_transaction)),
    )
    .await;
    let body = VerifyRequest { reference: TxReference::from("TREF-7".to_string()), gateway: "Paystack".to_string() };
    let req = TestRequest::post().uri("/paystack/verify").set_json(body).to_request();
    let response: JsonResponse = test::call_and_read_body_json(&app, req).await;
    assert!(response.success);
    tokio::time::timeout(Duration::from_secs(1), done_rx.recv()).await.expect("background reconciliation did not run");

    let webhook_effects = webhook_log.lock().unwrap().clone();
    let poll_effects = poll_log.lock().unwrap().clone();
    assert_eq!(webhook_effects, poll_effects);
    assert_eq!(webhook_effects, vec![
        "verify:TREF-7".to_string(),
        "record:TREF-7".to_string(),
        "settle:PR-0001".to_string(),
        "mail:ada@example.com".to_string(),
    ]);
}
