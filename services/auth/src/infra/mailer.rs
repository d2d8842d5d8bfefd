use std::time::Duration;

use anyhow::Context as _;
use serde::Serialize;

use pubportal_domain::email::Email;

use crate::domain::repository::NotificationSender;
use crate::error::AuthServiceError;

/// Mail relay request body.
#[derive(Debug, Serialize)]
struct RelayMessage<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html: &'a str,
}

/// Delivers mail through an HTTP relay (`POST {relay_url}` with a JSON body).
#[derive(Clone)]
pub struct HttpMailer {
    client: reqwest::Client,
    relay_url: String,
    api_key: Option<String>,
    from: String,
}

impl HttpMailer {
    pub fn new(relay_url: String, api_key: Option<String>, from: String) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .context("build mail relay client")?;
        Ok(Self {
            client,
            relay_url,
            api_key,
            from,
        })
    }
}

impl NotificationSender for HttpMailer {
    async fn send(&self, to: &Email, subject: &str, html: &str) -> Result<(), AuthServiceError> {
        let message = RelayMessage {
            from: &self.from,
            to: to.as_str(),
            subject,
            html,
        };
        let mut request = self.client.post(&self.relay_url).json(&message);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| {
            tracing::warn!(error = %e, to = %to, "mail relay unreachable");
            AuthServiceError::Delivery
        })?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(%status, body, to = %to, "mail relay rejected message");
            return Err(AuthServiceError::Delivery);
        }
        Ok(())
    }
}

/// Writes mail to the log instead of sending it. Used when no relay is
/// configured; the message body (and so the code) only shows at debug level.
#[derive(Clone, Default)]
pub struct LogMailer;

impl NotificationSender for LogMailer {
    async fn send(&self, to: &Email, subject: &str, html: &str) -> Result<(), AuthServiceError> {
        tracing::info!(to = %to, subject, "mail relay not configured, logging message");
        tracing::debug!(to = %to, html, "mail body");
        Ok(())
    }
}

/// Mail channel chosen at startup.
#[derive(Clone)]
pub enum Mailer {
    Http(HttpMailer),
    Log(LogMailer),
}

impl NotificationSender for Mailer {
    async fn send(&self, to: &Email, subject: &str, html: &str) -> Result<(), AuthServiceError> {
        match self {
            Self::Http(mailer) => mailer.send(to, subject, html).await,
            Self::Log(mailer) => mailer.send(to, subject, html).await,
        }
    }
}
