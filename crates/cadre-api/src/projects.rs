//! Handlers for projects, membership, field links and output reports.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use cadre_core::{
  catalog::Field,
  error::EntityKind,
  link::PairLink,
  project::{
    NewProject, NewProjectMember, Project, ProjectMember, ProjectMemberPatch,
    ProjectPatch, ResearchOutputReport,
  },
  query::ProjectFilter,
  store::ProgramStore,
  Error,
};
use serde::Deserialize;

use crate::error::ApiError;

// ─── Projects ────────────────────────────────────────────────────────────────

/// `GET /projects`
pub async fn list<S: ProgramStore>(
  State(store): State<Arc<S>>,
  Query(filter): Query<ProjectFilter>,
) -> Result<Json<Vec<Project>>, ApiError> {
  Ok(Json(store.list_projects(filter).await?))
}

/// `POST /projects`
pub async fn create<S: ProgramStore>(
  State(store): State<Arc<S>>,
  Json(input): Json<NewProject>,
) -> Result<impl IntoResponse, ApiError> {
  let project = store.create_project(input).await?;
  Ok((StatusCode::CREATED, Json(project)))
}

/// `GET /projects/{id}`
pub async fn get_one<S: ProgramStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
) -> Result<Json<Project>, ApiError> {
  let project = store
    .get_project(id)
    .await?
    .ok_or_else(|| Error::not_found(EntityKind::Project, id))?;
  Ok(Json(project))
}

/// `PATCH /projects/{id}`
pub async fn update<S: ProgramStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
  Json(patch): Json<ProjectPatch>,
) -> Result<Json<Project>, ApiError> {
  Ok(Json(store.update_project(id, patch).await?))
}

/// `DELETE /projects/{id}`
pub async fn delete_one<S: ProgramStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
  store.delete_project(id).await?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Membership ──────────────────────────────────────────────────────────────

/// `GET /projects/{id}/members`
pub async fn list_members<S: ProgramStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
) -> Result<Json<Vec<ProjectMember>>, ApiError> {
  Ok(Json(store.list_project_members(id).await?))
}

/// `POST /projects/{id}/members`
pub async fn add_member<S: ProgramStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
  Json(input): Json<NewProjectMember>,
) -> Result<impl IntoResponse, ApiError> {
  let member = store.add_project_member(id, input).await?;
  Ok((StatusCode::CREATED, Json(member)))
}

/// `PATCH /projects/{id}/members/{person_role_id}`
pub async fn update_member<S: ProgramStore>(
  State(store): State<Arc<S>>,
  Path((id, person_role_id)): Path<(i64, i64)>,
  Json(patch): Json<ProjectMemberPatch>,
) -> Result<Json<ProjectMember>, ApiError> {
  Ok(Json(store.update_project_member(id, person_role_id, patch).await?))
}

/// `DELETE /projects/{id}/members/{person_role_id}`
pub async fn remove_member<S: ProgramStore>(
  State(store): State<Arc<S>>,
  Path((id, person_role_id)): Path<(i64, i64)>,
) -> Result<StatusCode, ApiError> {
  store.remove_project_member(id, person_role_id).await?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Field links ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AttachField {
  pub field_id: i64,
}

/// `GET /projects/{id}/fields`
pub async fn list_fields<S: ProgramStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
) -> Result<Json<Vec<Field>>, ApiError> {
  Ok(Json(store.project_fields(id).await?))
}

/// `POST /projects/{id}/fields`
pub async fn attach_field<S: ProgramStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
  Json(body): Json<AttachField>,
) -> Result<StatusCode, ApiError> {
  store.attach(PairLink::ProjectField, id, body.field_id).await?;
  Ok(StatusCode::CREATED)
}

/// `DELETE /projects/{id}/fields/{field_id}`
pub async fn detach_field<S: ProgramStore>(
  State(store): State<Arc<S>>,
  Path((id, field_id)): Path<(i64, i64)>,
) -> Result<StatusCode, ApiError> {
  store.detach(PairLink::ProjectField, id, field_id).await?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Output reports ──────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ReportBody {
  pub link: String,
}

/// `GET /projects/{id}/reports`
pub async fn list_reports<S: ProgramStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
) -> Result<Json<Vec<ResearchOutputReport>>, ApiError> {
  Ok(Json(store.list_output_reports(id).await?))
}

/// `POST /projects/{id}/reports`
pub async fn add_report<S: ProgramStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
  Json(body): Json<ReportBody>,
) -> Result<impl IntoResponse, ApiError> {
  let report = store.add_output_report(id, body.link).await?;
  Ok((StatusCode::CREATED, Json(report)))
}

/// `PUT /reports/{id}`
pub async fn update_report<S: ProgramStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
  Json(body): Json<ReportBody>,
) -> Result<Json<ResearchOutputReport>, ApiError> {
  Ok(Json(store.update_output_report(id, body.link).await?))
}

/// `DELETE /reports/{id}`
pub async fn delete_report<S: ProgramStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
  store.delete_output_report(id).await?;
  Ok(StatusCode::NO_CONTENT)
}
