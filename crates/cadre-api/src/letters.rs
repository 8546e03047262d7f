//! Handlers for decision letters.
//!
//! Letters are created and listed under their parent's path; one handler
//! set is parameterised by the [`LetterParent`] variant constructor and
//! mounted once per parent kind. Individual letters are addressed by their
//! own id under `/letters`.

use std::sync::Arc;

use axum::{
  Json, Router,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
  routing::get,
};
use cadre_core::{
  error::EntityKind,
  letter::{DecisionLetter, LetterParent, NewDecisionLetter},
  store::ProgramStore,
  Error,
};

use crate::error::ApiError;

/// List/create routes for one parent kind, nested under
/// `/<parents>/{id}/letters`.
pub fn parent_routes<S>(make: fn(i64) -> LetterParent) -> Router<Arc<S>>
where
  S: ProgramStore + 'static,
{
  Router::new().route(
    "/",
    get(move |state, path| list(make, state, path))
      .post(move |state, path, body| create(make, state, path, body)),
  )
}

async fn list<S: ProgramStore>(
  make: fn(i64) -> LetterParent,
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
) -> Result<Json<Vec<DecisionLetter>>, ApiError> {
  Ok(Json(store.list_letters(make(id)).await?))
}

async fn create<S: ProgramStore>(
  make: fn(i64) -> LetterParent,
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
  Json(body): Json<NewDecisionLetter>,
) -> Result<impl IntoResponse, ApiError> {
  let letter = store.add_letter(make(id), body.link).await?;
  Ok((StatusCode::CREATED, Json(letter)))
}

/// `GET /letters/{id}`
pub async fn get_one<S: ProgramStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
) -> Result<Json<DecisionLetter>, ApiError> {
  let letter = store
    .get_letter(id)
    .await?
    .ok_or_else(|| Error::not_found(EntityKind::DecisionLetter, id))?;
  Ok(Json(letter))
}

/// `PUT /letters/{id}`
pub async fn update<S: ProgramStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
  Json(body): Json<NewDecisionLetter>,
) -> Result<Json<DecisionLetter>, ApiError> {
  Ok(Json(store.update_letter(id, body.link).await?))
}

/// `DELETE /letters/{id}`
pub async fn delete_one<S: ProgramStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
  store.delete_letter(id).await?;
  Ok(StatusCode::NO_CONTENT)
}
