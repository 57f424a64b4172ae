use std::sync::Arc;

use log::*;
use pps_common::Secret;
use reqwest::{Client, StatusCode};

use crate::{config::PaystackConfig, data_objects::VerifyEnvelope, error::PaystackApiError};

#[derive(Debug, Clone)]
pub struct PaystackApi {
    config: PaystackConfig,
    client: Arc<Client>,
}

impl PaystackApi {
    pub fn new(config: PaystackConfig) -> Result<Self, PaystackApiError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| PaystackApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub fn url(&self, reference: &str) -> String {
        format!("{}/transaction/verify/{reference}", self.config.base_url)
    }

    /// Verifies the transaction `reference` against Paystack.
    ///
    /// The secret key is supplied per call, since each configured gateway carries its own credentials.
    /// A 200/201 response is parsed into the verification envelope; any other status is returned as a
    /// `QueryError` carrying the provider's reason string.
    pub async fn verify_transaction(
        &self,
        reference: &str,
        secret_key: &Secret<String>,
    ) -> Result<VerifyEnvelope, PaystackApiError> {
        let url = self.url(reference);
        trace!("Sending verification query: {url}");
        let response = self.client.get(url).bearer_auth(secret_key.reveal()).send().await.map_err(|e| {
            if e.is_timeout() {
                PaystackApiError::Timeout
            } else {
                PaystackApiError::RequestError(e.to_string())
            }
        })?;
        let status = response.status();
        if matches!(status, StatusCode::OK | StatusCode::CREATED) {
            trace!("Verification query successful. {status}");
            response.json::<VerifyEnvelope>().await.map_err(|e| PaystackApiError::MalformedResponse(e.to_string()))
        } else {
            let message = response.text().await.map_err(|e| PaystackApiError::RequestError(e.to_string()))?;
            Err(PaystackApiError::QueryError { status: status.as_u16(), message })
        }
    }
}
