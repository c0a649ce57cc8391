use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use tokio::sync::mpsc;

use crate::credentials::CredentialStore;
use crate::settings::Settings;

pub mod http;
pub mod pix;

/// Proxy endpoint an error was raised by. The two endpoints report the same
/// failure classes with different messages and status codes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Endpoint {
    Deposit,
    DepositStatus,
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{0} environment variable is not set")]
    MissingCredential(String),
    #[error("{0} parameter is required")]
    MissingParameter(&'static str),
    #[error("Depix API returned empty response")]
    EmptyResponse { status: StatusCode },
    #[error("{}", invalid_json_message(.endpoint))]
    InvalidJson {
        endpoint: Endpoint,
        status: StatusCode,
        raw: String,
    },
    #[error("{}", upstream_message(.endpoint, .status))]
    Upstream {
        endpoint: Endpoint,
        status: StatusCode,
        details: Value,
        raw: String,
    },
    #[error("{}", internal_message(.endpoint, .details))]
    Internal { endpoint: Endpoint, details: String },
    #[error("Communication error: {0} - {1}")]
    Communication(String, String),
}

fn invalid_json_message(endpoint: &Endpoint) -> &'static str {
    match endpoint {
        Endpoint::Deposit => "Depix API returned invalid JSON",
        Endpoint::DepositStatus => "Invalid JSON response from Depix API",
    }
}

fn upstream_message(endpoint: &Endpoint, status: &StatusCode) -> String {
    match endpoint {
        Endpoint::Deposit => "Depix API request failed".to_string(),
        Endpoint::DepositStatus => format!(
            "Depix API error: {} {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or("")
        ),
    }
}

fn internal_message(endpoint: &Endpoint, details: &str) -> String {
    match endpoint {
        Endpoint::Deposit => "Internal server error".to_string(),
        Endpoint::DepositStatus => format!("Depix status API error: {details}"),
    }
}

fn reason(status: StatusCode) -> &'static str {
    status.canonical_reason().unwrap_or("")
}

impl ServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::MissingParameter(_) => StatusCode::BAD_REQUEST,
            ServiceError::EmptyResponse { status } | ServiceError::Upstream { status, .. } => {
                *status
            }
            ServiceError::InvalidJson {
                endpoint: Endpoint::DepositStatus,
                ..
            } => StatusCode::BAD_GATEWAY,
            ServiceError::InvalidJson { .. }
            | ServiceError::MissingCredential(_)
            | ServiceError::Internal { .. }
            | ServiceError::Communication(..) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn body(&self) -> Value {
        let error = self.to_string();

        match self {
            ServiceError::EmptyResponse { status } => json!({
                "error": error,
                "status": status.as_u16(),
                "statusText": reason(*status),
            }),
            ServiceError::InvalidJson {
                endpoint: Endpoint::Deposit,
                status,
                raw,
            } => json!({
                "error": error,
                "responseText": raw,
                "status": status.as_u16(),
            }),
            ServiceError::InvalidJson {
                endpoint: Endpoint::DepositStatus,
                status,
                raw,
            } => json!({
                "error": error,
                "rawResponse": raw,
                "status": status.as_u16(),
            }),
            ServiceError::Upstream {
                endpoint: Endpoint::Deposit,
                status,
                details,
                ..
            } => json!({
                "error": error,
                "details": details,
                "status": status.as_u16(),
                "statusText": reason(*status),
            }),
            ServiceError::Upstream {
                endpoint: Endpoint::DepositStatus,
                details,
                raw,
                ..
            } => json!({
                "error": error,
                "details": details,
                "rawResponse": raw,
            }),
            ServiceError::Internal {
                endpoint: Endpoint::Deposit,
                details,
            } => json!({
                "error": error,
                "details": details,
            }),
            ServiceError::Communication(_, details) => json!({
                "error": "Internal server error",
                "details": details,
            }),
            _ => json!({ "error": error }),
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self.body())).into_response()
    }
}

#[async_trait]
pub trait RequestHandler<T>: Send + Sync + 'static
where
    T: Send + 'static,
{
    async fn handle_request(&self, request: T);
}

#[async_trait]
pub trait Service<T, H>: Send + Sync + 'static
where
    T: Send + 'static,
    H: RequestHandler<T> + Clone + Send,
{
    async fn run(&mut self, handler: H, receiver: &mut mpsc::Receiver<T>) {
        while let Some(request) = receiver.recv().await {
            let handler = handler.clone();

            tokio::spawn(async move {
                handler.handle_request(request).await;
            });
        }
    }
}

/// Spawns the pix service and serves HTTP until the listener fails.
pub async fn start_services(
    settings: Settings,
    credentials: Arc<dyn CredentialStore>,
) -> Result<(), anyhow::Error> {
    let (pix_tx, mut pix_rx) = mpsc::channel(512);
    let mut pix_service = pix::PixService::new();

    log::info!("Starting Pix service.");
    let handler = pix::PixRequestHandler::new(settings.depix_base_url().to_string(), credentials);
    tokio::spawn(async move {
        pix_service.run(handler, &mut pix_rx).await;
    });

    log::info!("Starting HTTP server on {}.", settings.server.listen);
    http::start_http_server(&settings.server.listen, pix_tx).await
}
