//! Outbound message sending via the Twilio Messages API.

use {
    anyhow::Result,
    async_trait::async_trait,
    reqwest::Client,
    secrecy::{ExposeSecret, Secret},
    tracing::debug,
    url::Url,
};

use teamline_config::TwilioConfig;

const API_BASE: &str = "https://api.twilio.com";

/// Delivers one message to one recipient. At-most-once: no retries here;
/// callers decide what a failed delivery means.
#[async_trait]
pub trait MessageSender: Send + Sync {
    async fn send(&self, to: &str, body: &str) -> Result<()>;
}

/// Twilio REST sender.
pub struct TwilioSender {
    http: Client,
    account_sid: String,
    auth_token: Secret<String>,
    from_number: String,
    api_base: Url,
}

impl TwilioSender {
    pub fn new(config: &TwilioConfig) -> Result<Self> {
        Self::with_api_base(config, API_BASE)
    }

    fn with_api_base(config: &TwilioConfig, api_base: &str) -> Result<Self> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(config.send_timeout_secs))
            .build()?;
        Ok(Self {
            http,
            account_sid: config.account_sid.clone(),
            auth_token: config.auth_token.clone(),
            from_number: config.from_number.clone(),
            api_base: Url::parse(api_base)?,
        })
    }

    fn messages_url(&self) -> Result<Url> {
        let path = format!("/2010-04-01/Accounts/{}/Messages.json", self.account_sid);
        Ok(self.api_base.join(&path)?)
    }
}

#[async_trait]
impl MessageSender for TwilioSender {
    async fn send(&self, to: &str, body: &str) -> Result<()> {
        debug!(to, "sending message");
        let resp = self
            .http
            .post(self.messages_url()?)
            .basic_auth(&self.account_sid, Some(self.auth_token.expose_secret()))
            .form(&[
                ("From", self.from_number.as_str()),
                ("To", to),
                ("Body", body),
            ])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            anyhow::bail!("message send to {to} failed: {status}");
        }
        Ok(())
    }
}
