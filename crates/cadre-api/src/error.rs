//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Handlers return the core taxonomy directly; this wrapper only decides
//! which HTTP status each variant maps to.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use cadre_core::Error;
use serde_json::json;

/// An error returned by an API handler.
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct ApiError(#[from] pub Error);

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = match &self.0 {
      Error::NotFound { .. } => StatusCode::NOT_FOUND,
      Error::InvariantViolation(_) => StatusCode::BAD_REQUEST,
      Error::Duplicate(_)
      | Error::HasDependents { .. }
      | Error::Constraint(_) => StatusCode::CONFLICT,
      Error::Store(_)
      | Error::UnknownDiscriminant(..)
      | Error::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(json!({ "error": self.0.to_string() }))).into_response()
  }
}
