use reqwest::{header::HeaderMap, StatusCode};
use serde_json::{json, Value};

/// Upstream reply kept as raw text. Parsing is left to the caller since the
/// Depix API may answer with an empty or non-JSON body.
#[derive(Debug)]
pub struct RawResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub text: String,
}

impl RawResponse {
    pub fn status_text(&self) -> &'static str {
        self.status.canonical_reason().unwrap_or("")
    }
}

pub struct EulenApi {
    url: String,
    client: reqwest::Client,
}

impl EulenApi {
    pub fn new(url: String) -> Self {
        Self {
            url: url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub async fn deposit(
        &self,
        auth_token: &str,
        amount_in_cents: &Value,
    ) -> Result<RawResponse, reqwest::Error> {
        let payload = json!({ "amountInCents": amount_in_cents });

        let response = self
            .client
            .post(format!("{}/api/deposit", self.url))
            .bearer_auth(auth_token)
            .json(&payload)
            .send()
            .await?;

        Self::read(response).await
    }

    pub async fn deposit_status(
        &self,
        auth_token: &str,
        id: &str,
    ) -> Result<RawResponse, reqwest::Error> {
        let response = self
            .client
            .get(format!("{}/api/deposit-status", self.url))
            .bearer_auth(auth_token)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .query(&[("id", id)])
            .send()
            .await?;

        Self::read(response).await
    }

    async fn read(response: reqwest::Response) -> Result<RawResponse, reqwest::Error> {
        let status = response.status();
        let headers = response.headers().clone();
        let text = response.text().await?;

        Ok(RawResponse {
            status,
            headers,
            text,
        })
    }
}
