use thiserror::Error;

use crate::db_types::EnrollmentNotice;

/// Outbound delivery of enrollment notifications.
///
/// Delivery failures are non-fatal to reconciliation: settlement is authoritative regardless of whether the notice
/// reached the customer.
#[allow(async_fn_in_trait)]
pub trait EnrollmentMailer {
    async fn send_enrollment_notice(&self, notice: &EnrollmentNotice) -> Result<(), MailerError>;
}

#[derive(Debug, Clone, Error)]
pub enum MailerError {
    #[error("Could not build the notification message: {0}")]
    InvalidMessage(String),
    #[error("Could not deliver the notification: {0}")]
    Transport(String),
}
