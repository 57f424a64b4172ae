use std::{future::Future, pin::Pin, sync::Arc};

use log::*;
use paystack_payment_engine::{
    jobs::{JobHandler, JobQueue, JobSink, VerifyJob},
    ReconciliationApi,
    SqliteDatabase,
};
use tokio::task::JoinHandle;

use crate::{integrations::paystack::PaystackGateway, mailer::CourseMailer, routes::reconcile_and_report};

pub const VERIFY_QUEUE_SIZE: usize = 50;

/// Starts the background verification worker. Do not await the returned JoinHandle, as it runs until the server
/// shuts down and the last [`JobSink`] is dropped.
pub fn start_verify_worker(
    api: ReconciliationApi<PaystackGateway, SqliteDatabase, CourseMailer>,
) -> (JobSink<VerifyJob>, JoinHandle<()>) {
    let handler: JobHandler<VerifyJob> = Arc::new(move |job: VerifyJob| {
        let api = api.clone();
        Box::pin(async move {
            trace!("🕰️ Background verification for [{}] started", job.reference);
            let report = reconcile_and_report(&api, &job.reference, &job.gateway, "background verification").await;
            debug!("🕰️ Background verification for [{}] finished: {}", job.reference, report.message);
        }) as Pin<Box<dyn Future<Output = ()> + Send>>
    });
    let queue = JobQueue::new(VERIFY_QUEUE_SIZE, handler);
    let sink = queue.sink();
    let handle = tokio::spawn(queue.run());
    info!("🕰️ Background verification worker started");
    (sink, handle)
}
