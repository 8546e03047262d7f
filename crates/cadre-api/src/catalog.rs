//! Handlers for the catalog: the five `{id, name}` lookups and fields.
//!
//! All five lookup kinds share one handler set, parameterised by
//! [`LookupKind`] and mounted once per collection path.

use std::sync::Arc;

use axum::{
  Json, Router,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
  routing::get,
};
use cadre_core::{
  catalog::{Field, FieldPatch, Lookup, LookupKind, NewField},
  error::EntityKind,
  query::{FieldFilter, LookupFilter},
  store::ProgramStore,
  Error,
};
use serde::Deserialize;

use crate::error::ApiError;

/// Name payload for lookup create and update.
#[derive(Debug, Deserialize)]
pub struct LookupBody {
  pub name: String,
}

/// CRUD routes for one lookup kind, nested under its collection path.
pub fn lookup_routes<S>(kind: LookupKind) -> Router<Arc<S>>
where
  S: ProgramStore + 'static,
{
  Router::new()
    .route(
      "/",
      get(move |state, query| list_lookups(kind, state, query))
        .post(move |state, body| create_lookup(kind, state, body)),
    )
    .route(
      "/{id}",
      get(move |state, path| get_lookup(kind, state, path))
        .put(move |state, path, body| update_lookup(kind, state, path, body))
        .delete(move |state, path| delete_lookup(kind, state, path)),
    )
}

async fn list_lookups<S: ProgramStore>(
  kind: LookupKind,
  State(store): State<Arc<S>>,
  Query(filter): Query<LookupFilter>,
) -> Result<Json<Vec<Lookup>>, ApiError> {
  Ok(Json(store.list_lookups(kind, filter).await?))
}

async fn create_lookup<S: ProgramStore>(
  kind: LookupKind,
  State(store): State<Arc<S>>,
  Json(body): Json<LookupBody>,
) -> Result<impl IntoResponse, ApiError> {
  let lookup = store.create_lookup(kind, body.name).await?;
  Ok((StatusCode::CREATED, Json(lookup)))
}

async fn get_lookup<S: ProgramStore>(
  kind: LookupKind,
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
) -> Result<Json<Lookup>, ApiError> {
  let lookup = store
    .get_lookup(kind, id)
    .await?
    .ok_or_else(|| Error::not_found(kind.entity_kind(), id))?;
  Ok(Json(lookup))
}

async fn update_lookup<S: ProgramStore>(
  kind: LookupKind,
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
  Json(body): Json<LookupBody>,
) -> Result<Json<Lookup>, ApiError> {
  Ok(Json(store.update_lookup(kind, id, body.name).await?))
}

async fn delete_lookup<S: ProgramStore>(
  kind: LookupKind,
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
  store.delete_lookup(kind, id).await?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Fields ──────────────────────────────────────────────────────────────────

/// `GET /fields`
pub async fn list_fields<S: ProgramStore>(
  State(store): State<Arc<S>>,
  Query(filter): Query<FieldFilter>,
) -> Result<Json<Vec<Field>>, ApiError> {
  Ok(Json(store.list_fields(filter).await?))
}

/// `POST /fields`
pub async fn create_field<S: ProgramStore>(
  State(store): State<Arc<S>>,
  Json(input): Json<NewField>,
) -> Result<impl IntoResponse, ApiError> {
  let field = store.create_field(input).await?;
  Ok((StatusCode::CREATED, Json(field)))
}

/// `GET /fields/{id}`
pub async fn get_field<S: ProgramStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
) -> Result<Json<Field>, ApiError> {
  let field = store
    .get_field(id)
    .await?
    .ok_or_else(|| Error::not_found(EntityKind::Field, id))?;
  Ok(Json(field))
}

/// `PATCH /fields/{id}`
pub async fn update_field<S: ProgramStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
  Json(patch): Json<FieldPatch>,
) -> Result<Json<Field>, ApiError> {
  Ok(Json(store.update_field(id, patch).await?))
}

/// `DELETE /fields/{id}`
pub async fn delete_field<S: ProgramStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
  store.delete_field(id).await?;
  Ok(StatusCode::NO_CONTENT)
}
