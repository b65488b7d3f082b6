use anyhow::{Context, Result, bail};
use serde_json::json;

/// Outbound SMS seam. Fire-and-forget from the caller's perspective; the
/// only signal is success or failure of the gateway call.
pub trait SmsSender {
    fn send(
        &self,
        phone_number: &str,
        message: &str,
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// HTTP SMS gateway client. No retries; a gateway error surfaces to the
/// caller synchronously.
pub struct HttpSmsGateway {
    client: reqwest::Client,
    url: String,
    api_key: String,
    sender_id: String,
}

impl HttpSmsGateway {
    pub fn new(url: String, api_key: String, sender_id: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            url,
            api_key,
            sender_id,
        }
    }
}

impl SmsSender for HttpSmsGateway {
    async fn send(&self, phone_number: &str, message: &str) -> Result<()> {
        let resp = self
            .client
            .post(&self.url)
            .json(&json!({
                "api_key": self.api_key,
                "senderid": self.sender_id,
                "number": phone_number,
                "message": message,
            }))
            .send()
            .await
            .context("sms gateway unreachable")?;

        if !resp.status().is_success() {
            bail!("sms gateway returned {}", resp.status());
        }

        Ok(())
    }
}

/// Test double that records every send and can be flipped to fail.
#[cfg(test)]
#[derive(Default)]
pub struct RecordingSms {
    pub fail: bool,
    pub sent: std::sync::Mutex<Vec<(String, String)>>,
}

#[cfg(test)]
impl SmsSender for RecordingSms {
    async fn send(&self, phone_number: &str, message: &str) -> Result<()> {
        if self.fail {
            bail!("gateway down");
        }
        self.sent
            .lock()
            .unwrap()
            .push((phone_number.to_string(), message.to_string()));
        Ok(())
    }
}
