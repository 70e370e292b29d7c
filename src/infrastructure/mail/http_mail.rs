use std::time::Duration;

use anyhow::{Result, bail};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{debug, info};

use crate::{
    config::config_model::Mail,
    domain::{repositories::mail_notifier::MailNotifier, value_objects::mail::MailPayload},
};

/// Client for the mail service. The service answers `202 Accepted` once a
/// message is queued; anything else counts as a failure.
pub struct HttpMailNotifier {
    client: Client,
    send_url: Option<String>,
    from: String,
}

impl HttpMailNotifier {
    pub fn new(settings: &Mail) -> Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(5)).build()?;

        Ok(Self {
            client,
            send_url: settings
                .service_url
                .as_deref()
                .map(|base| format!("{}/send", base.trim_end_matches('/'))),
            from: settings.from.clone(),
        })
    }
}

#[async_trait]
impl MailNotifier for HttpMailNotifier {
    fn sender(&self) -> String {
        self.from.clone()
    }

    async fn send(&self, mail: MailPayload) -> Result<()> {
        let Some(send_url) = self.send_url.as_deref() else {
            debug!(to = %mail.to, "mail: service not configured, skipping");
            return Ok(());
        };

        let response = self.client.post(send_url).json(&mail).send().await?;
        let status = response.status();
        if status != StatusCode::ACCEPTED {
            bail!("mail service answered {status}");
        }

        info!(to = %mail.to, subject = %mail.subject, "mail: queued");
        Ok(())
    }
}
