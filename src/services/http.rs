use axum::{
    body::Bytes,
    extract::{Query, State},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::Value;
use tokio::sync::{mpsc, oneshot};
use tower_http::trace::TraceLayer;

use super::{pix::PixServiceRequest, Endpoint, ServiceError};
use crate::models::pix::DepositRequest;

#[derive(Clone)]
struct AppState {
    pix_channel: mpsc::Sender<PixServiceRequest>,
}

async fn call_pix_service(
    channel: &mpsc::Sender<PixServiceRequest>,
    request: impl FnOnce(oneshot::Sender<Result<Value, ServiceError>>) -> PixServiceRequest,
) -> Result<Value, ServiceError> {
    let (response_tx, response_rx) = oneshot::channel();

    channel
        .send(request(response_tx))
        .await
        .map_err(|e| ServiceError::Communication("Pix".to_string(), e.to_string()))?;

    response_rx
        .await
        .map_err(|e| ServiceError::Communication("Pix".to_string(), e.to_string()))?
}

fn into_response(result: Result<Value, ServiceError>) -> Response {
    match result {
        Ok(data) => Json(data).into_response(),
        Err(e) => e.into_response(),
    }
}

/// The body is read by hand so that malformed or empty JSON goes through the
/// same error payload as every other failure instead of axum's rejection.
async fn request_new_deposit(State(state): State<AppState>, body: Bytes) -> Response {
    let request = match serde_json::from_slice::<DepositRequest>(&body) {
        Ok(request) => request,
        Err(e) => {
            log::error!("Depix API error: invalid request body: {}", e);
            return ServiceError::Internal {
                endpoint: Endpoint::Deposit,
                details: e.to_string(),
            }
            .into_response();
        }
    };

    let result = call_pix_service(&state.pix_channel, |response| PixServiceRequest::Deposit {
        request,
        response,
    })
    .await;

    into_response(result)
}

/// Query pairs are taken as a list so repeated keys never reject the request.
/// The first `id` wins.
async fn get_deposit_status(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> Response {
    let id = params
        .into_iter()
        .find_map(|(key, value)| (key == "id").then_some(value));

    let result = call_pix_service(&state.pix_channel, |response| {
        PixServiceRequest::DepositStatus { id, response }
    })
    .await;

    into_response(result)
}

pub fn router(pix_channel: mpsc::Sender<PixServiceRequest>) -> Router {
    let app_state = AppState { pix_channel };

    Router::new()
        .route("/api/depix", post(request_new_deposit))
        .route("/api/depix-status", get(get_deposit_status))
        .route("/health", get(|| async { "OK" }))
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
}

pub async fn start_http_server(
    listen: &str,
    pix_channel: mpsc::Sender<PixServiceRequest>,
) -> Result<(), anyhow::Error> {
    let app = router(pix_channel);

    let listener = tokio::net::TcpListener::bind(listen).await?;
    log::info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
