use async_trait::async_trait;
use tracing::debug;

use gather_core::Notifier;
use gather_types::notify::Notice;

/// Notifier speaking HTTP to the mailer service. Each notice type posts to
/// its own route and the mailer answers with a JSON boolean acknowledgement;
/// transport faults bubble up as errors, which callers treat as delivery
/// failure.
pub struct HttpNotifier {
    client: reqwest::Client,
    base_url: String,
}

impl HttpNotifier {
    pub fn new(base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl Notifier for HttpNotifier {
    async fn send(&self, notice: Notice) -> anyhow::Result<bool> {
        let url = format!("{}{}", self.base_url, notice.path());
        debug!("Dispatching notification to {}", url);

        let request = self.client.post(&url);
        let response = match &notice {
            Notice::JoinRequest(n) => request.json(n).send().await?,
            Notice::Accept(n) => request.json(n).send().await?,
            Notice::Reject(n) => request.json(n).send().await?,
        };

        if !response.status().is_success() {
            return Ok(false);
        }
        Ok(response.json::<bool>().await?)
    }
}
