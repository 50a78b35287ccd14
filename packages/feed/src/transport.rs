//! `reqwest`-backed [`FeedTransport`].

use async_trait::async_trait;

use crate::{FeedError, FeedTransport};

/// Fetches feeds over HTTP with a shared [`reqwest::Client`].
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    #[must_use]
    pub const fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl FeedTransport for HttpTransport {
    async fn get(&self, url: &str) -> Result<String, FeedError> {
        log::debug!("GET {url}");
        let resp = self.client.get(url).send().await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FeedError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        Ok(resp.text().await?)
    }
}
