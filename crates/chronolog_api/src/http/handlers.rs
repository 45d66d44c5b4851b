use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use chronolog_domain::EventBuffer;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::domain::MessageService;
use crate::http::error::{ApiError, ApiJson};

pub const TENANT_HEADER: &str = "x-tenant-id";

#[derive(Clone)]
pub struct AppState {
    pub messages: Arc<MessageService>,
    pub buffer: Arc<EventBuffer>,
    pub default_tenant: Arc<String>,
}

fn tenant_id(headers: &HeaderMap, state: &AppState) -> String {
    headers
        .get(TENANT_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| state.default_tenant.as_ref().clone())
}

#[derive(Debug, Deserialize)]
pub struct StoreMessageBody {
    pub datetime: Option<String>,
    pub environment: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListMessagesParams {
    pub environment: Option<String>,
    pub limit: Option<i64>,
}

pub async fn store_message(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiJson(body): ApiJson<StoreMessageBody>,
) -> Result<impl IntoResponse, ApiError> {
    let tenant = tenant_id(&headers, &state);
    let record = state
        .messages
        .store_message(&tenant, body.datetime.as_deref(), body.environment.as_deref())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Message stored successfully",
            "data": record,
        })),
    ))
}

pub async fn list_messages(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<ListMessagesParams>,
) -> Result<impl IntoResponse, ApiError> {
    let tenant = tenant_id(&headers, &state);
    let records = state
        .messages
        .list_messages(&tenant, params.environment.as_deref(), params.limit)
        .await?;

    let count = records.len();
    Ok(Json(json!({
        "messages": records,
        "count": count,
    })))
}

pub async fn tenant_stats(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let tenant = tenant_id(&headers, &state);
    let statistics = state.messages.tenant_stats(&tenant).await?;

    Ok(Json(json!({
        "tenant_id": tenant,
        "statistics": statistics,
    })))
}

/// Snapshot of the in-memory display buffer, in delivery order.
pub async fn list_events(State(state): State<AppState>) -> impl IntoResponse {
    let events = state.buffer.snapshot();
    let count = events.len();
    Json(json!({
        "events": events,
        "count": count,
    }))
}

pub async fn clear_messages(State(state): State<AppState>) -> impl IntoResponse {
    state.buffer.clear();
    info!("Event buffer cleared");
    Json(json!({ "status": "cleared" }))
}

pub async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}
