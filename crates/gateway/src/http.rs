//! Superfície HTTP do gateway.

use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use serde_json::{Value, json};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, warn};

use crate::record::NOT_AN_OBJECT;
use crate::{GatewayError, NewPaste, PasteStore};

const UPLOADED: &str = "Code uploaded successfully";
const DELETED: &str = "File deleted successfully";
const NOT_FOUND: &str = "File not found";
const EXPIRED: &str = "File has expired";
const UNAVAILABLE: &str = "Failed to connect to the key-value store";

pub fn router(store: Arc<PasteStore>) -> Router {
    Router::new()
        .route("/temp-file-upload", post(upload_handler))
        .route("/file/{file_id}", get(read_handler))
        .route("/file/{file_id}/delete", delete(delete_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(store)
}

#[derive(Debug, Clone, Copy)]
enum Op {
    Create,
    Read,
    Delete,
    Health,
}

impl Op {
    fn failure_message(self) -> &'static str {
        match self {
            Op::Create => "Failed to store code",
            Op::Read => "Failed to retrieve code",
            Op::Delete => "Failed to delete file",
            Op::Health => UNAVAILABLE,
        }
    }
}

/// Erro de uma rota: sabe qual operação falhou para escolher a mensagem 500.
struct ApiError {
    op: Op,
    err: GatewayError,
}

impl ApiError {
    fn on(op: Op) -> impl FnOnce(GatewayError) -> Self {
        move |err| Self { op, err }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self.err {
            GatewayError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            GatewayError::NotFound => (StatusCode::NOT_FOUND, NOT_FOUND.to_string()),
            GatewayError::Expired => (StatusCode::GONE, EXPIRED.to_string()),
            GatewayError::BackendUnavailable(detail) => {
                error!("{:?}: backend indisponível: {detail}", self.op);
                (StatusCode::SERVICE_UNAVAILABLE, UNAVAILABLE.to_string())
            }
            GatewayError::BackendOperationFailed(detail) => {
                error!("{:?}: operação no backend falhou: {detail}", self.op);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    self.op.failure_message().to_string(),
                )
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

async fn upload_handler(
    State(store): State<Arc<PasteStore>>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let value: Value = serde_json::from_slice(&body).map_err(|e| {
        warn!("corpo inválido em upload: {e}");
        ApiError {
            op: Op::Create,
            err: GatewayError::InvalidRequest(NOT_AN_OBJECT.into()),
        }
    })?;
    let paste = NewPaste::from_json(&value).map_err(ApiError::on(Op::Create))?;
    let created = store.create(paste).await.map_err(ApiError::on(Op::Create))?;

    Ok((
        StatusCode::OK,
        Json(json!({
            "message": UPLOADED,
            "fileUrl": created.file_url,
            "expiry_time": created.expiry_time,
        })),
    ))
}

async fn read_handler(
    State(store): State<Arc<PasteStore>>,
    Path(file_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let record = store.read(&file_id).await.map_err(ApiError::on(Op::Read))?;
    Ok(Json(record))
}

async fn delete_handler(
    State(store): State<Arc<PasteStore>>,
    Path(file_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    store
        .delete(&file_id)
        .await
        .map_err(ApiError::on(Op::Delete))?;
    Ok(Json(json!({ "message": DELETED })))
}

async fn health_handler(
    State(store): State<Arc<PasteStore>>,
) -> Result<impl IntoResponse, ApiError> {
    store.health().await.map_err(ApiError::on(Op::Health))?;
    Ok(Json(json!({
        "status": "ok",
        "backend": store.backend_name(),
    })))
}
