use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::domain::value_objects::mail::MailPayload;

#[async_trait]
#[automock]
pub trait MailNotifier {
    /// Sender address used for outgoing mail.
    fn sender(&self) -> String;

    async fn send(&self, mail: MailPayload) -> Result<()>;
}
