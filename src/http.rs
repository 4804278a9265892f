//! Thin reqwest wrapper: every call has its own timeout and maps failures to `FetchError`

use crate::error::FetchError;
use reqwest::redirect::Policy;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

const MAX_REDIRECTS: usize = 10;

/// Status and body of a GET
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub status: u16,
    pub body: String,
}

/// Shared HTTP client; cloning shares the connection pool
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    pub fn new(user_agent: &str) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .redirect(Policy::limited(MAX_REDIRECTS))
            .build()
            .map_err(|e| FetchError::Request(e.to_string()))?;

        Ok(Self { client })
    }

    /// Existence check without a body. Redirects are followed, so the
    /// returned status belongs to the final hop.
    pub async fn head(&self, url: &str, timeout: Duration) -> Result<u16, FetchError> {
        let response = self.client.head(url).timeout(timeout).send().await?;
        Ok(response.status().as_u16())
    }

    /// Full GET. Non-2xx statuses are returned, not turned into errors.
    pub async fn get(&self, url: &str, timeout: Duration) -> Result<FetchedPage, FetchError> {
        let response = self.client.get(url).timeout(timeout).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(FetchedPage { status, body })
    }

    /// POST a JSON body and decode a JSON reply. 401/403 map to
    /// `FetchError::Forbidden`, any other non-2xx to `FetchError::Status`.
    pub async fn post_json<B, R>(&self, url: &str, body: &B, timeout: Duration) -> Result<R, FetchError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let response = self
            .client
            .post(url)
            .json(body)
            .timeout(timeout)
            .send()
            .await?;

        match response.status() {
            StatusCode::FORBIDDEN | StatusCode::UNAUTHORIZED => Err(FetchError::Forbidden),
            status if !status.is_success() => Err(FetchError::Status(status.as_u16())),
            _ => response
                .json::<R>()
                .await
                .map_err(|e| FetchError::Decode(e.to_string())),
        }
    }
}
