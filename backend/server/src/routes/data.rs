use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Multipart, State},
    routing::{delete, get, post},
};
use ledger::transaction::Transaction;
use serde_json::{Value, json};
use tracing::info;

use crate::{
    error::AppError,
    import::{check_upload, import_csv},
    state::AppState,
};

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/upload-csv", post(upload_handler))
        .route("/clear", delete(clear_handler))
        .route("/status", get(status_handler))
}

/// Reads the `file` part of the form. Other parts are ignored.
async fn file_part(multipart: &mut Multipart) -> Result<(Option<String>, Vec<u8>), AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field.file_name().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;

        return Ok((file_name, bytes.to_vec()));
    }

    Err(AppError::BadRequest("Missing multipart field 'file'".to_string()))
}

async fn upload_handler(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<Value>, AppError> {
    let (file_name, bytes) = file_part(&mut multipart).await?;
    check_upload(file_name.as_deref(), &bytes)?;

    let file_name = file_name.unwrap_or_default();
    let imported = import_csv(
        &state.repo::<Transaction>(),
        state.enrichment.as_ref(),
        &file_name,
        bytes,
    )
    .await?;

    Ok(Json(json!({
        "success": true,
        "message": "Data imported successfully",
        "recordsImported": imported,
    })))
}

async fn clear_handler(State(state): State<Arc<AppState>>) -> Result<Json<Value>, AppError> {
    state.repo::<Transaction>().clear().await?;
    info!("Cleared all transactions");

    Ok(Json(json!({ "success": true, "message": "All data cleared" })))
}

async fn status_handler(State(state): State<Arc<AppState>>) -> Result<Json<Value>, AppError> {
    let count = state.repo::<Transaction>().count().await?;

    Ok(Json(json!({ "status": "ok", "transactions": count })))
}
