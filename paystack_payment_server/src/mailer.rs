//! Outbound delivery of enrollment notices.
use std::sync::Arc;

use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncFileTransport,
    AsyncSmtpTransport,
    AsyncTransport,
    Message,
    Tokio1Executor,
};
use log::*;
use paystack_payment_engine::{
    db_types::EnrollmentNotice,
    traits::{EnrollmentMailer, MailerError},
};

use crate::{
    config::{MailConfig, MailTransportConfig},
    errors::ServerError,
};

#[derive(Clone)]
pub struct CourseMailer {
    transport: MailTransport,
    from: Mailbox,
}

#[derive(Clone)]
enum MailTransport {
    Smtp(AsyncSmtpTransport<Tokio1Executor>),
    File(Arc<AsyncFileTransport<Tokio1Executor>>),
}

impl CourseMailer {
    pub fn new(config: &MailConfig) -> Result<Self, ServerError> {
        let from = format!("{} <{}>", config.from_name, config.from_email)
            .parse::<Mailbox>()
            .map_err(|e| ServerError::ConfigurationError(format!("Invalid sender mailbox: {e}")))?;
        let transport = match &config.transport {
            MailTransportConfig::Smtp { host, port, username, password, use_tls } => {
                if !*use_tls {
                    warn!("📧️ SMTP TLS is disabled. Do not run like this in production.");
                }
                let builder = if *use_tls {
                    AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
                        .map_err(|e| ServerError::InitializeError(format!("Could not create SMTP transport: {e}")))?
                } else {
                    AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host)
                };
                let transport = builder
                    .port(*port)
                    .credentials(Credentials::new(username.clone(), password.reveal().clone()))
                    .build();
                MailTransport::Smtp(transport)
            },
            MailTransportConfig::File { path } => {
                std::fs::create_dir_all(path)
                    .map_err(|e| ServerError::InitializeError(format!("Could not create mail spool directory: {e}")))?;
                info!("📧️ Mail transport is file-based. Messages will be written to {path}.");
                MailTransport::File(Arc::new(AsyncFileTransport::new(path)))
            },
        };
        Ok(Self { transport, from })
    }
}

impl EnrollmentMailer for CourseMailer {
    async fn send_enrollment_notice(&self, notice: &EnrollmentNotice) -> Result<(), MailerError> {
        let to = notice
            .recipient
            .parse::<Mailbox>()
            .map_err(|e| MailerError::InvalidMessage(format!("Invalid recipient '{}': {e}", notice.recipient)))?;
        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(notice.subject.clone())
            .header(ContentType::TEXT_PLAIN)
            .body(notice.body.clone())
            .map_err(|e| MailerError::InvalidMessage(e.to_string()))?;
        match &self.transport {
            MailTransport::Smtp(transport) => {
                transport.send(message).await.map_err(|e| MailerError::Transport(e.to_string()))?;
            },
            MailTransport::File(transport) => {
                transport.send(message).await.map_err(|e| MailerError::Transport(e.to_string()))?;
            },
        }
        debug!("📧️ Enrollment notice sent to {}", notice.recipient);
        Ok(())
    }
}
