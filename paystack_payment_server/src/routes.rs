//! Request handler definitions
//!
//! Define each route and its handler here. Handlers that are more than a line or two MUST go into a separate module.
//! Keep this module neat and tidy 🙏
//!
//! Both payment entry points (the provider webhook and the client poll) converge on
//! [`ReconciliationApi::reconcile`] through [`reconcile_and_report`], so their observable effects are identical by
//! construction. Neither of them leaks internal failure detail to its caller; the bootstrap endpoint is the only
//! surface that returns descriptive errors, since it is a synchronous, user-initiated action where feedback is
//! actionable.
use actix_web::{get, web, HttpResponse, Responder};
use log::*;
use paystack_payment_engine::{
    db_types::{PaymentRequestType, TxReference, PAYMENT_REQUEST_DOCTYPE},
    jobs::{JobSink, VerifyJob},
    traits::{DocumentStore, EnrollmentMailer, GatewayClient, ReconciliationBackend},
    FulfillmentOutcome,
    ReconciliationApi,
    ReconciliationError,
    ReconciliationOutcome,
};

use crate::{
    data_objects::{
        BootstrapMetadata,
        BootstrapParams,
        JsonResponse,
        PaymentRequestBootstrap,
        VerifyRequest,
        WebhookEnvelope,
        WebhookPayload,
    },
    errors::ServerError,
};

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Webhook  ----------------------------------------------------
/// End point where the payment gateway pushes payment notifications.
///
/// The pushed envelope is only used to learn the transaction reference and the gateway name. Its claimed status is
/// never trusted: the reference is re-verified against the provider before anything is recorded, so a spoofed push
/// can at worst trigger a verification call. The response is always 200 — the provider retries non-2xx responses,
/// and a retry for an already-processed reference is a no-op anyway.
pub async fn webhook<G, B, M>(
    body: web::Form<WebhookPayload>,
    api: web::Data<ReconciliationApi<G, B, M>>,
) -> HttpResponse
where
    G: GatewayClient + 'static,
    B: ReconciliationBackend + 'static,
    M: EnrollmentMailer + 'static,
{
    let payload = body.into_inner();
    trace!("💳️ Received webhook push: {}", payload.data);
    let envelope = match serde_json::from_str::<WebhookEnvelope>(&payload.data) {
        Ok(envelope) => envelope,
        Err(e) => {
            warn!("💳️ Could not parse webhook envelope. {e}. Payload: {}", payload.data);
            return HttpResponse::Ok().json(JsonResponse::failure("Could not parse webhook payload."));
        },
    };
    let result = reconcile_and_report(&api, &envelope.reference, &envelope.metadata.gateway, &payload.data).await;
    HttpResponse::Ok().json(result)
}

/// The shared boundary between the two payment entry points: runs the reconciliation flow and converts every outcome
/// and error into a log line plus a generic acknowledgment.
pub(crate) async fn reconcile_and_report<G, B, M>(
    api: &ReconciliationApi<G, B, M>,
    reference: &TxReference,
    gateway: &str,
    context: &str,
) -> JsonResponse
where
    G: GatewayClient,
    B: ReconciliationBackend,
    M: EnrollmentMailer,
{
    match api.reconcile(reference, gateway).await {
        Ok(ReconciliationOutcome::Settled { entry, fulfillment }) => {
            info!("💳️ Transaction [{reference}] settled. {:.2} {}", entry.amount, entry.currency);
            report_fulfillment(reference, &fulfillment);
            JsonResponse::success("Transaction processed.")
        },
        Ok(ReconciliationOutcome::Duplicate(_)) => {
            debug!("💳️ Transaction [{reference}] was already processed.");
            JsonResponse::success("Transaction already processed.")
        },
        Ok(ReconciliationOutcome::VerifiedPending(_)) => {
            info!("💳️ Transaction [{reference}] is pending on the provider side.");
            JsonResponse::success("Transaction pending.")
        },
        Err(ReconciliationError::MissingAssociatedDocument { ref doctype, ref name }) => {
            error!(
                "💳️ Transaction [{reference}] was verified but the {doctype} document '{name}' is missing. Operator \
                 attention required. Context: {context}"
            );
            JsonResponse::failure("Transaction verified but could not be settled.")
        },
        Err(e @ ReconciliationError::Gateway(_)) => {
            warn!("💳️ Verification for [{reference}] failed. {e}. Context: {context}");
            JsonResponse::failure("Could not verify transaction.")
        },
        Err(e) => {
            error!("💳️ Unexpected error while reconciling [{reference}]. {e}. Context: {context}");
            JsonResponse::failure("Unexpected error processing transaction.")
        },
    }
}

fn report_fulfillment(reference: &TxReference, outcome: &FulfillmentOutcome) {
    match outcome {
        FulfillmentOutcome::Dispatched { recipient, courses } => {
            info!("💳️📦️ {courses} enrollment(s) for [{reference}] sent to {recipient}")
        },
        FulfillmentOutcome::Skipped => {},
        FulfillmentOutcome::NothingToDeliver => debug!("💳️📦️ No provisionable items for [{reference}]"),
        FulfillmentOutcome::MissingCustomerEmail => {
            warn!("💳️📦️ No customer email for [{reference}]; enrollment details were not delivered")
        },
        FulfillmentOutcome::Failed(reason) => {
            warn!("💳️📦️ Enrollment delivery for [{reference}] failed after settlement: {reason}")
        },
    }
}

//----------------------------------------------   Verify   ----------------------------------------------------
/// Client-initiated verification poll.
///
/// The caller is acknowledged immediately; verification and reconciliation run on the background queue, decoupling
/// client-facing latency from the provider round-trip. The response makes no promise about the final outcome — that
/// is observable only through the ledger.
pub async fn verify_transaction(body: web::Json<VerifyRequest>, queue: web::Data<JobSink<VerifyJob>>) -> HttpResponse {
    let request = body.into_inner();
    debug!("💻️ Queuing verification for [{}] via gateway '{}'", request.reference, request.gateway);
    queue.submit(VerifyJob { reference: request.reference, gateway: request.gateway }).await;
    HttpResponse::Ok().json(JsonResponse::success("Verification queued."))
}

//----------------------------------------------  Bootstrap  ---------------------------------------------------
/// Payment-page bootstrap data for an inward payment request.
pub async fn payment_request_bootstrap<G, B, M>(
    query: web::Query<BootstrapParams>,
    api: web::Data<ReconciliationApi<G, B, M>>,
) -> Result<HttpResponse, ServerError>
where
    G: GatewayClient + 'static,
    B: ReconciliationBackend + 'static,
    M: EnrollmentMailer + 'static,
{
    let params = query.into_inner();
    debug!("💻️ GET payment request bootstrap for {} '{}'", params.reference_doctype, params.reference_docname);
    if params.reference_doctype != PAYMENT_REQUEST_DOCTYPE {
        return Err(ServerError::ValidationError(format!(
            "Unsupported reference doctype '{}'.",
            params.reference_doctype
        )));
    }
    let request = api
        .db()
        .fetch_payment_request(&params.reference_docname)
        .await
        .map_err(|e| {
            debug!("💻️ Could not fetch payment request '{}'. {e}", params.reference_docname);
            ServerError::BackendError(e.to_string())
        })?
        .ok_or_else(|| ServerError::NoRecordFound(format!("No payment request named '{}'.", params.reference_docname)))?;
    if request.request_type != PaymentRequestType::Inward {
        return Err(ServerError::ValidationError("Only Inward payment allowed.".to_string()));
    }
    let credentials = api
        .db()
        .fetch_gateway_credentials(&request.payment_gateway)
        .await
        .map_err(|e| {
            debug!("💻️ Could not fetch gateway settings '{}'. {e}", request.payment_gateway);
            ServerError::BackendError(e.to_string())
        })?
        .ok_or_else(|| ServerError::NoRecordFound(format!("No gateway settings for '{}'.", request.payment_gateway)))?;
    let response = PaymentRequestBootstrap {
        name: request.name.clone(),
        email: request.email_to.clone(),
        currency: request.currency.clone(),
        status: request.status.clone(),
        public_key: credentials.public_key,
        metadata: BootstrapMetadata {
            doctype: PAYMENT_REQUEST_DOCTYPE.to_string(),
            docname: request.name,
            reference_doctype: request.reference_doctype,
            reference_name: request.reference_name,
            gateway: request.payment_gateway,
        },
    };
    Ok(HttpResponse::Ok().json(response))
}
