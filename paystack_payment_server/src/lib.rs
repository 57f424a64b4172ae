//! # Paystack Payment Server
//! This module hosts the server code for the Paystack payment-confirmation service. It is responsible for:
//! Listening for incoming webhook pushes from Paystack and verification polls from the payment page.
//! Re-verifying every transaction with the provider before any state changes.
//! Recording each transaction exactly once and settling the originating payment request.
//! Dispatching course-enrollment details for settled purchases.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! The server exposes the following routes:
//! * `/health`: A health check route that returns a 200 OK response.
//! * `/paystack/webhook`: The route Paystack pushes payment notifications to.
//! * `/paystack/verify`: The client-initiated verification poll; reconciliation runs out-of-band.
//! * `/paystack/payment_request`: Payment-page bootstrap data for an inward payment request.

pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod integrations;
pub mod mailer;
pub mod routes;
pub mod server;
pub mod worker;

#[cfg(test)]
mod endpoint_tests;
