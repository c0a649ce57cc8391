use std::sync::Arc;

use serde_json::Value;

use crate::credentials::CredentialStore;
use crate::models::pix::DepositRequest;
use crate::services::{Endpoint, ServiceError};

pub mod eulen;

use eulen::{EulenApi, RawResponse};

pub struct PixRepository {
    eulen_api: EulenApi,
    credentials: Arc<dyn CredentialStore>,
}

impl PixRepository {
    pub fn new(eulen_url: String, credentials: Arc<dyn CredentialStore>) -> Self {
        let eulen_api = EulenApi::new(eulen_url);

        PixRepository {
            eulen_api,
            credentials,
        }
    }

    fn bearer_token(&self) -> Result<String, ServiceError> {
        self.credentials
            .bearer_token()
            .ok_or_else(|| ServiceError::MissingCredential(self.credentials.name().to_string()))
    }

    /// Creates a deposit upstream and hands back the provider JSON untouched.
    pub async fn new_deposit(&self, request: &DepositRequest) -> Result<Value, ServiceError> {
        let token = self.bearer_token()?;
        let amount_in_cents = request.effective_amount();

        log::info!("Requesting Depix deposit of {} cents.", amount_in_cents);
        let response = self
            .eulen_api
            .deposit(&token, &amount_in_cents)
            .await
            .map_err(|e| {
                log::error!("Depix API error: {}", e);
                ServiceError::Internal {
                    endpoint: Endpoint::Deposit,
                    details: e.to_string(),
                }
            })?;
        log_response("Depix API", &response);

        if response.text.is_empty() {
            return Err(ServiceError::EmptyResponse {
                status: response.status,
            });
        }

        let data: Value = serde_json::from_str(&response.text).map_err(|e| {
            log::error!("Failed to parse Depix API response as JSON: {}", e);
            ServiceError::InvalidJson {
                endpoint: Endpoint::Deposit,
                status: response.status,
                raw: response.text.clone(),
            }
        })?;

        if !response.status.is_success() {
            return Err(ServiceError::Upstream {
                endpoint: Endpoint::Deposit,
                status: response.status,
                details: data,
                raw: response.text,
            });
        }

        Ok(data)
    }

    /// Looks up a deposit by the id the provider assigned to it.
    pub async fn deposit_status(&self, id: Option<&str>) -> Result<Value, ServiceError> {
        let token = self.bearer_token()?;
        let id = match id {
            Some(id) if !id.is_empty() => id,
            _ => return Err(ServiceError::MissingParameter("ID")),
        };

        log::info!("Requesting Depix deposit status for id {}.", id);
        let response = self
            .eulen_api
            .deposit_status(&token, id)
            .await
            .map_err(|e| {
                log::error!("Depix status API error: {}", e);
                ServiceError::Internal {
                    endpoint: Endpoint::DepositStatus,
                    details: e.to_string(),
                }
            })?;
        log_response("Depix status API", &response);

        let data: Value = if response.text.is_empty() {
            Value::Object(Default::default())
        } else {
            serde_json::from_str(&response.text).map_err(|e| {
                log::error!("Failed to parse JSON response: {}", e);
                ServiceError::InvalidJson {
                    endpoint: Endpoint::DepositStatus,
                    status: response.status,
                    raw: response.text.clone(),
                }
            })?
        };

        if !response.status.is_success() {
            log::error!("Depix status API error: {} {}", response.status, data);
            return Err(ServiceError::Upstream {
                endpoint: Endpoint::DepositStatus,
                status: response.status,
                details: data,
                raw: response.text,
            });
        }

        Ok(data)
    }
}

fn log_response(api: &str, response: &RawResponse) {
    log::info!("{} response status: {}", api, response.status);
    log::debug!("{} response headers: {:?}", api, response.headers);
    log::debug!("{} raw response: {}", api, response.text);
}
