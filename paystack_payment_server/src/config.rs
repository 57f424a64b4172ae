use std::{env, net::IpAddr};

use log::*;
use pps_common::Secret;

const DEFAULT_PPS_HOST: &str = "127.0.0.1";
const DEFAULT_PPS_PORT: u16 = 8470;
const DEFAULT_DATABASE_URL: &str = "sqlite://data/paystack_store.db";
const DEFAULT_MAIL_FILE_DIR: &str = "data/outbox";
/// Paystack's published webhook origin addresses.
const DEFAULT_PAYSTACK_IPS: [&str; 3] = ["52.31.139.75", "52.49.173.169", "52.214.14.220"];

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// If true, the X-Forwarded-For header will be used to determine the client's IP address, rather than the
    /// connection's remote address.
    pub use_x_forwarded_for: bool,
    /// If true, the Forwarded header will be used to determine the client's IP address, rather than the
    /// connection's remote address.
    pub use_forwarded: bool,
    /// Incoming webhook pushes must originate from one of these addresses. `None` disables the check, in which case
    /// webhook authenticity rests on provider re-verification alone.
    pub webhook_whitelist: Option<Vec<IpAddr>>,
    pub mail: MailConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_PPS_HOST.to_string(),
            port: DEFAULT_PPS_PORT,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            use_x_forwarded_for: false,
            use_forwarded: false,
            webhook_whitelist: Some(default_webhook_whitelist()),
            mail: MailConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("PPS_HOST").ok().unwrap_or_else(|| DEFAULT_PPS_HOST.into());
        let port = env::var("PPS_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for PPS_PORT. {e} Using the default, {DEFAULT_PPS_PORT}, instead."
                    );
                    DEFAULT_PPS_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_PPS_PORT);
        let database_url = env::var("PPS_DATABASE_URL").ok().unwrap_or_else(|| {
            warn!("🪛️ PPS_DATABASE_URL is not set. Using the default, {DEFAULT_DATABASE_URL}.");
            DEFAULT_DATABASE_URL.to_string()
        });
        let use_x_forwarded_for =
            env::var("PPS_USE_X_FORWARDED_FOR").map(|s| &s == "1" || &s == "true").unwrap_or(false);
        let use_forwarded = env::var("PPS_USE_FORWARDED").map(|s| &s == "1" || &s == "true").unwrap_or(false);
        let webhook_whitelist = configure_webhook_whitelist();
        let mail = MailConfig::from_env_or_default();
        Self { host, port, database_url, use_x_forwarded_for, use_forwarded, webhook_whitelist, mail }
    }
}

fn default_webhook_whitelist() -> Vec<IpAddr> {
    DEFAULT_PAYSTACK_IPS.iter().filter_map(|s| s.parse().ok()).collect()
}

fn configure_webhook_whitelist() -> Option<Vec<IpAddr>> {
    let Ok(value) = env::var("PPS_PAYSTACK_IP_WHITELIST") else {
        info!("🪛️ PPS_PAYSTACK_IP_WHITELIST is not set. Using Paystack's published webhook origins.");
        return Some(default_webhook_whitelist());
    };
    if ["none", "false", "0"].contains(&value.to_lowercase().as_str()) {
        info!(
            "🪛️ The webhook IP whitelist is disabled. Webhook authenticity rests on provider re-verification alone."
        );
        return None;
    }
    let ip_addrs = value
        .split(',')
        .filter_map(|s| {
            s.trim()
                .parse()
                .map_err(|e| warn!("🪛️ Ignoring invalid IP address ({s}) in PPS_PAYSTACK_IP_WHITELIST: {e}"))
                .ok()
        })
        .collect::<Vec<IpAddr>>();
    if ip_addrs.is_empty() {
        warn!(
            "🚨️ The webhook IP whitelist was configured, but is empty. The server will run, but won't accept any \
             webhook pushes."
        );
    } else {
        let addrs = ip_addrs.iter().map(|a| a.to_string()).collect::<Vec<_>>().join(", ");
        info!("🪛️ Webhook IP whitelist: {addrs}");
    }
    Some(ip_addrs)
}

//-------------------------------------------------  MailConfig  ------------------------------------------------------
#[derive(Clone, Debug)]
pub struct MailConfig {
    pub from_email: String,
    pub from_name: String,
    pub transport: MailTransportConfig,
}

#[derive(Clone, Debug)]
pub enum MailTransportConfig {
    Smtp { host: String, port: u16, username: String, password: Secret<String>, use_tls: bool },
    /// Writes messages to a spool directory instead of sending them. For development and testing.
    File { path: String },
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            from_email: "no-reply@localhost".to_string(),
            from_name: "Course Enrollment".to_string(),
            transport: MailTransportConfig::File { path: DEFAULT_MAIL_FILE_DIR.to_string() },
        }
    }
}

impl MailConfig {
    pub fn from_env_or_default() -> Self {
        let from_email = env::var("PPS_MAIL_FROM_EMAIL").ok().unwrap_or_else(|| {
            warn!("🪛️ PPS_MAIL_FROM_EMAIL is not set. Using no-reply@localhost as the sender address.");
            "no-reply@localhost".to_string()
        });
        let from_name = env::var("PPS_MAIL_FROM_NAME").ok().unwrap_or_else(|| "Course Enrollment".to_string());
        let transport = match env::var("PPS_MAIL_TRANSPORT").map(|s| s.to_lowercase()) {
            Ok(s) if s == "smtp" => {
                let host = env::var("PPS_SMTP_HOST").ok().unwrap_or_else(|| {
                    error!("🪛️ PPS_SMTP_HOST is not set. Please set it to your SMTP relay host.");
                    String::default()
                });
                let port = env::var("PPS_SMTP_PORT")
                    .map(|s| {
                        s.parse::<u16>().unwrap_or_else(|e| {
                            error!("🪛️ {s} is not a valid port for PPS_SMTP_PORT. {e} Using 587 instead.");
                            587
                        })
                    })
                    .ok()
                    .unwrap_or(587);
                let username = env::var("PPS_SMTP_USERNAME").ok().unwrap_or_default();
                let password = Secret::new(env::var("PPS_SMTP_PASSWORD").ok().unwrap_or_default());
                let use_tls = env::var("PPS_SMTP_USE_TLS").map(|s| &s != "0" && &s != "false").unwrap_or(true);
                MailTransportConfig::Smtp { host, port, username, password, use_tls }
            },
            _ => {
                let path = env::var("PPS_MAIL_FILE_DIR").ok().unwrap_or_else(|| {
                    info!(
                        "🪛️ PPS_MAIL_TRANSPORT is not set to smtp. Enrollment emails will be written to \
                         {DEFAULT_MAIL_FILE_DIR}."
                    );
                    DEFAULT_MAIL_FILE_DIR.to_string()
                });
                MailTransportConfig::File { path }
            },
        };
        Self { from_email, from_name, transport }
    }
}
