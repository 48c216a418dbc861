//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("render error: {0}")]
  Render(#[from] stammbaum_chart::Error),
}

impl ApiError {
  /// Wrap a store error. Rejections the store reports as domain errors
  /// anywhere in the source chain become 400s.
  pub(crate) fn store(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    let mut cause: Option<&(dyn std::error::Error + 'static)> = Some(&e);
    while let Some(err) = cause {
      if let Some(domain) = err.downcast_ref::<stammbaum_core::Error>() {
        match domain {
          stammbaum_core::Error::UnknownParent(_) | stammbaum_core::Error::EmptyPatch(_) => {
            return ApiError::BadRequest(domain.to_string());
          }
          stammbaum_core::Error::UnknownSex(_) => break,
        }
      }
      cause = err.source();
    }
    ApiError::Store(Box::new(e))
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Store(e) => {
        tracing::error!(error = %e, "store failure");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
      }
      ApiError::Render(e) => {
        tracing::error!(error = %e, "chart rendering failed");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
      }
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
