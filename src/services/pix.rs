use super::RequestHandler;
use super::Service;
use super::ServiceError;

use crate::credentials::CredentialStore;
use crate::models::pix::DepositRequest;
use crate::repositories::pix::PixRepository;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::oneshot;

pub enum PixServiceRequest {
    Deposit {
        request: DepositRequest,
        response: oneshot::Sender<Result<Value, ServiceError>>,
    },
    DepositStatus {
        id: Option<String>,
        response: oneshot::Sender<Result<Value, ServiceError>>,
    },
}

#[derive(Clone)]
pub struct PixRequestHandler {
    repository: Arc<PixRepository>,
}

impl PixRequestHandler {
    pub fn new(eulen_url: String, credentials: Arc<dyn CredentialStore>) -> Self {
        let repository = Arc::new(PixRepository::new(eulen_url, credentials));

        PixRequestHandler { repository }
    }

    async fn new_deposit(&self, request: DepositRequest) -> Result<Value, ServiceError> {
        self.repository.new_deposit(&request).await
    }

    async fn deposit_status(&self, id: Option<String>) -> Result<Value, ServiceError> {
        self.repository.deposit_status(id.as_deref()).await
    }
}

#[async_trait]
impl RequestHandler<PixServiceRequest> for PixRequestHandler {
    async fn handle_request(&self, request: PixServiceRequest) {
        match request {
            PixServiceRequest::Deposit { request, response } => {
                let deposit = self.new_deposit(request).await;
                if let Err(e) = &deposit {
                    log::warn!("Deposit request failed: {}", e);
                }
                let _ = response.send(deposit);
            }
            PixServiceRequest::DepositStatus { id, response } => {
                let status = self.deposit_status(id).await;
                if let Err(e) = &status {
                    log::warn!("Deposit status request failed: {}", e);
                }
                let _ = response.send(status);
            }
        }
    }
}

pub struct PixService;

impl PixService {
    pub fn new() -> Self {
        PixService {}
    }
}

#[async_trait]
impl Service<PixServiceRequest, PixRequestHandler> for PixService {}
