use async_trait::async_trait;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chronolog_domain::DomainError;
use serde_json::json;
use tracing::error;

/// Maps failures onto the HTTP error taxonomy: malformed input is a 400
/// with the validation message, storage faults are a 500 with details kept
/// out of the response body.
pub enum ApiError {
    Domain(DomainError),
    BadRequest(String),
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self::Domain(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            Self::Domain(err) => match &err {
                DomainError::MissingDatetime
                | DomainError::InvalidDatetime(_)
                | DomainError::InvalidEnvironment(_)
                | DomainError::InvalidTenantId(_) => (StatusCode::BAD_REQUEST, err.to_string()),
                DomainError::ProvisioningError(_) | DomainError::RepositoryError(_) => {
                    error!(error = %err, "Storage error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Internal server error".to_string(),
                    )
                }
            },
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// `axum::Json` with its rejection mapped onto the structured error body,
/// so undecodable request bodies answer with the same `{"error": ...}`
/// shape as every other failure.
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
        Ok(Self(value))
    }
}
