use thiserror::Error;

#[derive(Debug, Error)]
pub enum PaystackApiError {
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("Could not reach Paystack: {0}")]
    RequestError(String),
    #[error("The verification call did not complete within the configured timeout")]
    Timeout,
    #[error("Verification failed. Error {status}. {message}")]
    QueryError { status: u16, message: String },
    #[error("Unexpected verification payload: {0}")]
    MalformedResponse(String),
}
