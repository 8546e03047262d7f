//! Handlers for student activities.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use cadre_core::{
  activity::{ActivityPatch, NewStudentActivity, StudentActivity},
  error::EntityKind,
  query::ActivityFilter,
  store::ProgramStore,
  Error,
};

use crate::error::ApiError;

/// `POST /phd-students/{id}/activities`
pub async fn create<S: ProgramStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
  Json(input): Json<NewStudentActivity>,
) -> Result<impl IntoResponse, ApiError> {
  let activity = store.create_student_activity(id, input).await?;
  Ok((StatusCode::CREATED, Json(activity)))
}

/// `GET /student-activities`
pub async fn list<S: ProgramStore>(
  State(store): State<Arc<S>>,
  Query(filter): Query<ActivityFilter>,
) -> Result<Json<Vec<StudentActivity>>, ApiError> {
  Ok(Json(store.list_student_activities(filter).await?))
}

/// `GET /student-activities/{id}`
pub async fn get_one<S: ProgramStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
) -> Result<Json<StudentActivity>, ApiError> {
  let activity = store
    .get_student_activity(id)
    .await?
    .ok_or_else(|| Error::not_found(EntityKind::StudentActivity, id))?;
  Ok(Json(activity))
}

/// `PATCH /student-activities/{id}`
pub async fn update<S: ProgramStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
  Json(patch): Json<ActivityPatch>,
) -> Result<Json<StudentActivity>, ApiError> {
  Ok(Json(store.update_student_activity(id, patch).await?))
}

/// `DELETE /student-activities/{id}`
pub async fn delete_one<S: ProgramStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
  store.delete_student_activity(id).await?;
  Ok(StatusCode::NO_CONTENT)
}
