use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;

use super::state::{DepositChecked, DepositCreated};
use crate::models::pix::{DepositRequest, EulenEnvelope};

/// What the UI needs from the proxy. Errors are already user-facing text.
#[async_trait]
pub trait DepositGateway: Send + Sync + 'static {
    async fn create_deposit(&self, request: DepositRequest) -> Result<DepositCreated, String>;

    async fn deposit_status(&self, id: &str) -> Result<DepositChecked, String>;
}

/// Talks to the `/api/depix` routes of a running proxy.
pub struct ProxyClient {
    base_url: String,
    client: reqwest::Client,
}

impl ProxyClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }
}

/// Reads a proxy reply. Bodies that are not JSON keep their raw text so the
/// caller still gets a usable object.
fn parse_body(text: &str) -> Value {
    if text.is_empty() {
        return Value::Object(Default::default());
    }

    serde_json::from_str(text).unwrap_or_else(|_| {
        serde_json::json!({
            "rawResponse": text,
            "parseError": "Failed to parse JSON",
        })
    })
}

fn error_message(data: &Value, fallback: impl FnOnce() -> String) -> String {
    data.get("error")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(fallback)
}

async fn read_reply(response: reqwest::Response) -> Result<(StatusCode, Value), String> {
    let status = response.status();
    let text = response.text().await.map_err(|e| e.to_string())?;

    Ok((status, parse_body(&text)))
}

#[async_trait]
impl DepositGateway for ProxyClient {
    async fn create_deposit(&self, request: DepositRequest) -> Result<DepositCreated, String> {
        let response = self
            .client
            .post(format!("{}/api/depix", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| e.to_string())?;
        let (status, data) = read_reply(response).await?;

        if !status.is_success() {
            return Err(error_message(&data, || {
                format!("Request failed with status {}", status.as_u16())
            }));
        }

        Ok(DepositCreated::from_envelope(EulenEnvelope::from_value(
            &data,
        )))
    }

    async fn deposit_status(&self, id: &str) -> Result<DepositChecked, String> {
        let response = self
            .client
            .get(format!("{}/api/depix-status", self.base_url))
            .query(&[("id", id)])
            .send()
            .await
            .map_err(|e| e.to_string())?;
        let (status, data) = read_reply(response).await?;

        if !status.is_success() {
            return Err(error_message(&data, || {
                format!("Status check failed with status {}", status.as_u16())
            }));
        }

        Ok(DepositChecked::from_envelope(EulenEnvelope::from_value(
            &data,
        )))
    }
}
