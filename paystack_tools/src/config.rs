use std::time::Duration;

use log::*;

pub const DEFAULT_PAYSTACK_BASE_URL: &str = "https://api.paystack.co";

/// Upper bound on a single verification round-trip. There is no retry loop on top of this; a provider that does not
/// answer in time is reported as a timeout and the provider's own webhook retries take it from there.
pub const VERIFY_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct PaystackConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for PaystackConfig {
    fn default() -> Self {
        Self { base_url: DEFAULT_PAYSTACK_BASE_URL.to_string(), timeout: VERIFY_TIMEOUT }
    }
}

impl PaystackConfig {
    pub fn new_from_env_or_default() -> Self {
        let base_url = std::env::var("PPS_PAYSTACK_BASE_URL").unwrap_or_else(|_| {
            debug!("PPS_PAYSTACK_BASE_URL not set, using {DEFAULT_PAYSTACK_BASE_URL}");
            DEFAULT_PAYSTACK_BASE_URL.to_string()
        });
        Self { base_url, timeout: VERIFY_TIMEOUT }
    }
}
