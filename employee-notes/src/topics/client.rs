use serde::Deserialize;
use serde_json::Value;

use crate::backend::BackendError;

#[derive(Debug, Deserialize)]
struct TopicsPage {
    docs: Vec<Value>,
}

/// Client for the content service that lists the topics.
#[derive(Debug, Clone)]
pub struct TopicsClient {
    client: reqwest::Client,
    url: String,
}

impl TopicsClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), url)
    }

    pub fn with_client(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self { client, url: url.into() }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// All topics, as returned by the content service.
    pub async fn fetch(&self) -> Result<Vec<Value>, BackendError> {
        let response = self
            .client
            .get(&self.url)
            .header("Content-Type", "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::Api {
                status: status.as_u16(),
                message: format!("Failed to fetch topics: {}", status.canonical_reason().unwrap_or("unknown status")),
            });
        }

        let page = response
            .json::<TopicsPage>()
            .await
            .map_err(|err| BackendError::message(format!("Invalid data structure from topics API: {err}")))?;

        Ok(page.docs)
    }
}
