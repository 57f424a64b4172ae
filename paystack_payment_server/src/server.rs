use std::{
    net::{IpAddr, SocketAddr},
    str::FromStr,
    time::Duration,
};

use actix_web::{
    dev::{Server, Service},
    http::KeepAlive,
    middleware::Logger,
    web,
    App,
    HttpServer,
};
use futures::{future::ok, FutureExt};
use log::*;
use paystack_payment_engine::{
    jobs::{JobSink, VerifyJob},
    ReconciliationApi,
    SqliteDatabase,
};
use paystack_tools::{PaystackApi, PaystackConfig};

use crate::{
    config::ServerConfig,
    errors::ServerError,
    integrations::paystack::PaystackGateway,
    mailer::CourseMailer,
    routes::{health, payment_request_bootstrap, verify_transaction, webhook},
    worker::start_verify_worker,
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let gateway = PaystackGateway::new(
        PaystackApi::new(PaystackConfig::new_from_env_or_default())
            .map_err(|e| ServerError::InitializeError(e.to_string()))?,
    );
    let mailer = CourseMailer::new(&config.mail)?;
    let api = ReconciliationApi::new(gateway, db, mailer);
    let (verify_queue, _worker) = start_verify_worker(api.clone());
    let srv = create_server_instance(config, api, verify_queue)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(
    config: ServerConfig,
    api: ReconciliationApi<PaystackGateway, SqliteDatabase, CourseMailer>,
    verify_queue: JobSink<VerifyJob>,
) -> Result<Server, ServerError> {
    let host = config.host.clone();
    let port = config.port;
    let srv = HttpServer::new(move || {
        let use_x_forwarded_for = config.use_x_forwarded_for;
        let use_forwarded = config.use_forwarded;
        let whitelist = config.webhook_whitelist.clone();
        // The whitelist guards only the webhook route. The poll and bootstrap routes are client-facing and
        // guest-accessible; their safety comes from re-verification, not from origin checks.
        let webhook_scope = web::scope("/webhook")
            .wrap_fn(move |req, srv| {
                let peer_addr = req.connection_info().peer_addr().map(|a| a.to_string());
                let peer_ip = req
                    .headers()
                    .get("X-Forwarded-For")
                    .and_then(|v| use_x_forwarded_for.then(|| v.to_str().ok()).flatten())
                    .or_else(|| {
                        req.headers().get("Forwarded").and_then(|v| use_forwarded.then(|| v.to_str().ok()).flatten())
                    })
                    .or(peer_addr.as_deref())
                    .and_then(parse_peer_ip);
                let allowed = match (peer_ip, &whitelist) {
                    (Some(ip), Some(whitelist)) => {
                        debug!("💳️ Webhook push from {ip}");
                        whitelist.contains(&ip)
                    },
                    (_, None) => true,
                    (None, Some(_)) => {
                        warn!("💳️ No IP address found in webhook request, denying access.");
                        false
                    },
                };
                if allowed {
                    srv.call(req).boxed_local()
                } else {
                    ok(req.error_response(ServerError::ForbiddenPeer)).boxed_local()
                }
            })
            .route("", web::post().to(webhook::<PaystackGateway, SqliteDatabase, CourseMailer>));
        let paystack_scope = web::scope("/paystack")
            .route("/verify", web::post().to(verify_transaction))
            .route(
                "/payment_request",
                web::get().to(payment_request_bootstrap::<PaystackGateway, SqliteDatabase, CourseMailer>),
            )
            .service(webhook_scope);
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("pps::access_log"))
            .app_data(web::Data::new(api.clone()))
            .app_data(web::Data::new(verify_queue.clone()))
            .service(health)
            .service(paystack_scope)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((host.as_str(), port))?
    .run();
    Ok(srv)
}

/// Extracts the peer IP from a header value or socket address string. Forwarding headers may carry a list; the first
/// entry is the originating client.
fn parse_peer_ip(value: &str) -> Option<IpAddr> {
    let first = value.split(',').next().unwrap_or(value).trim();
    first.parse::<IpAddr>().ok().or_else(|| SocketAddr::from_str(first).ok().map(|addr| addr.ip()))
}
