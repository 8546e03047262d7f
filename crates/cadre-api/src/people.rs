//! Handlers for people, roles, detail records, affiliations and
//! supervisions.

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
  link::{Affiliation, NewAffiliation, NewSupervision, PairLink, Supervision},
  person::{
    NewPerson, NewPersonRole, NewPhdStudent, NewPostdoc, NewResearcher,
    Person, PersonPatch, PersonRole, PersonRolePatch, PhdStudent,
    PhdStudentPatch, Postdoc, PostdocPatch, Researcher, ResearcherPatch,
  },
  query::{
    PersonFilter, PersonRoleFilter, PhdStudentFilter, PostdocFilter,
    ResearcherFilter, SupervisionFilter,
  },
  store::ProgramStore,
  Error,
};
use serde::Deserialize;

use crate::error::ApiError;

// ─── People ──────────────────────────────────────────────────────────────────

/// `GET /people`
pub async fn list<S: ProgramStore>(
  State(store): State<Arc<S>>,
  Query(filter): Query<PersonFilter>,
) -> Result<Json<Vec<Person>>, ApiError> {
  Ok(Json(store.list_people(filter).await?))
}

/// `POST /people`
pub async fn create<S: ProgramStore>(
  State(store): State<Arc<S>>,
  Json(input): Json<NewPerson>,
) -> Result<impl IntoResponse, ApiError> {
  let person = store.create_person(input).await?;
  Ok((StatusCode::CREATED, Json(person)))
}

/// `GET /people/{id}`
pub async fn get_one<S: ProgramStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
) -> Result<Json<Person>, ApiError> {
  let person = store
    .get_person(id)
    .await?
    .ok_or_else(|| Error::not_found(EntityKind::Person, id))?;
  Ok(Json(person))
}

/// `PATCH /people/{id}`
pub async fn update<S: ProgramStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
  Json(patch): Json<PersonPatch>,
) -> Result<Json<Person>, ApiError> {
  Ok(Json(store.update_person(id, patch).await?))
}

/// `DELETE /people/{id}`
pub async fn delete_one<S: ProgramStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
  store.delete_person(id).await?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Roles ───────────────────────────────────────────────────────────────────

/// `GET /person-roles`
pub async fn list_roles<S: ProgramStore>(
  State(store): State<Arc<S>>,
  Query(filter): Query<PersonRoleFilter>,
) -> Result<Json<Vec<PersonRole>>, ApiError> {
  Ok(Json(store.list_person_roles(filter).await?))
}

/// `POST /person-roles`
pub async fn create_role<S: ProgramStore>(
  State(store): State<Arc<S>>,
  Json(input): Json<NewPersonRole>,
) -> Result<impl IntoResponse, ApiError> {
  let role = store.create_person_role(input).await?;
  Ok((StatusCode::CREATED, Json(role)))
}

/// `GET /person-roles/{id}`
pub async fn get_role<S: ProgramStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
) -> Result<Json<PersonRole>, ApiError> {
  let role = store
    .get_person_role(id)
    .await?
    .ok_or_else(|| Error::not_found(EntityKind::PersonRole, id))?;
  Ok(Json(role))
}

/// `PATCH /person-roles/{id}`
pub async fn update_role<S: ProgramStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
  Json(patch): Json<PersonRolePatch>,
) -> Result<Json<PersonRole>, ApiError> {
  Ok(Json(store.update_person_role(id, patch).await?))
}

/// `DELETE /person-roles/{id}`
pub async fn delete_role<S: ProgramStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
  store.delete_person_role(id).await?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Affiliations ────────────────────────────────────────────────────────────

/// `GET /person-roles/{id}/affiliations`
pub async fn list_affiliations<S: ProgramStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
) -> Result<Json<Vec<Affiliation>>, ApiError> {
  Ok(Json(store.list_affiliations(id).await?))
}

/// `POST /person-roles/{id}/affiliations`
pub async fn add_affiliation<S: ProgramStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
  Json(input): Json<NewAffiliation>,
) -> Result<impl IntoResponse, ApiError> {
  let affiliation = store.add_affiliation(id, input).await?;
  Ok((StatusCode::CREATED, Json(affiliation)))
}

/// `DELETE /affiliations/{id}`
pub async fn remove_affiliation<S: ProgramStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
  store.remove_affiliation(id).await?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Role fields ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AttachField {
  pub field_id: i64,
}

/// `GET /person-roles/{id}/fields`
pub async fn list_role_fields<S: ProgramStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
) -> Result<Json<Vec<Field>>, ApiError> {
  Ok(Json(store.role_fields(id).await?))
}

/// `POST /person-roles/{id}/fields`
pub async fn attach_role_field<S: ProgramStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
  Json(body): Json<AttachField>,
) -> Result<StatusCode, ApiError> {
  store.attach(PairLink::RoleField, id, body.field_id).await?;
  Ok(StatusCode::CREATED)
}

/// `DELETE /person-roles/{id}/fields/{field_id}`
pub async fn detach_role_field<S: ProgramStore>(
  State(store): State<Arc<S>>,
  Path((id, field_id)): Path<(i64, i64)>,
) -> Result<StatusCode, ApiError> {
  store.detach(PairLink::RoleField, id, field_id).await?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Researcher details ──────────────────────────────────────────────────────

/// `GET /researchers`
pub async fn list_researchers<S: ProgramStore>(
  State(store): State<Arc<S>>,
  Query(filter): Query<ResearcherFilter>,
) -> Result<Json<Vec<Researcher>>, ApiError> {
  Ok(Json(store.list_researchers(filter).await?))
}

/// `POST /researchers`
pub async fn create_researcher<S: ProgramStore>(
  State(store): State<Arc<S>>,
  Json(input): Json<NewResearcher>,
) -> Result<impl IntoResponse, ApiError> {
  let researcher = store.create_researcher(input).await?;
  Ok((StatusCode::CREATED, Json(researcher)))
}

/// `GET /researchers/{id}`
pub async fn get_researcher<S: ProgramStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
) -> Result<Json<Researcher>, ApiError> {
  let researcher = store
    .get_researcher(id)
    .await?
    .ok_or_else(|| Error::not_found(EntityKind::Researcher, id))?;
  Ok(Json(researcher))
}

/// `PATCH /researchers/{id}`
pub async fn update_researcher<S: ProgramStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
  Json(patch): Json<ResearcherPatch>,
) -> Result<Json<Researcher>, ApiError> {
  Ok(Json(store.update_researcher(id, patch).await?))
}

/// `DELETE /researchers/{id}`
pub async fn delete_researcher<S: ProgramStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
  store.delete_researcher(id).await?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── PhD student details ─────────────────────────────────────────────────────

/// `GET /phd-students`
pub async fn list_phd_students<S: ProgramStore>(
  State(store): State<Arc<S>>,
  Query(filter): Query<PhdStudentFilter>,
) -> Result<Json<Vec<PhdStudent>>, ApiError> {
  Ok(Json(store.list_phd_students(filter).await?))
}

/// `POST /phd-students`
pub async fn create_phd_student<S: ProgramStore>(
  State(store): State<Arc<S>>,
  Json(input): Json<NewPhdStudent>,
) -> Result<impl IntoResponse, ApiError> {
  let student = store.create_phd_student(input).await?;
  Ok((StatusCode::CREATED, Json(student)))
}

/// `GET /phd-students/{id}`
pub async fn get_phd_student<S: ProgramStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
) -> Result<Json<PhdStudent>, ApiError> {
  let student = store
    .get_phd_student(id)
    .await?
    .ok_or_else(|| Error::not_found(EntityKind::PhdStudent, id))?;
  Ok(Json(student))
}

/// `PATCH /phd-students/{id}`
pub async fn update_phd_student<S: ProgramStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
  Json(patch): Json<PhdStudentPatch>,
) -> Result<Json<PhdStudent>, ApiError> {
  Ok(Json(store.update_phd_student(id, patch).await?))
}

/// `DELETE /phd-students/{id}`
pub async fn delete_phd_student<S: ProgramStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
  store.delete_phd_student(id).await?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Postdoc details ─────────────────────────────────────────────────────────

/// `GET /postdocs`
pub async fn list_postdocs<S: ProgramStore>(
  State(store): State<Arc<S>>,
  Query(filter): Query<PostdocFilter>,
) -> Result<Json<Vec<Postdoc>>, ApiError> {
  Ok(Json(store.list_postdocs(filter).await?))
}

/// `POST /postdocs`
pub async fn create_postdoc<S: ProgramStore>(
  State(store): State<Arc<S>>,
  Json(input): Json<NewPostdoc>,
) -> Result<impl IntoResponse, ApiError> {
  let postdoc = store.create_postdoc(input).await?;
  Ok((StatusCode::CREATED, Json(postdoc)))
}

/// `GET /postdocs/{id}`
pub async fn get_postdoc<S: ProgramStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
) -> Result<Json<Postdoc>, ApiError> {
  let postdoc = store
    .get_postdoc(id)
    .await?
    .ok_or_else(|| Error::not_found(EntityKind::Postdoc, id))?;
  Ok(Json(postdoc))
}

/// `PATCH /postdocs/{id}`
pub async fn update_postdoc<S: ProgramStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
  Json(patch): Json<PostdocPatch>,
) -> Result<Json<Postdoc>, ApiError> {
  Ok(Json(store.update_postdoc(id, patch).await?))
}

/// `DELETE /postdocs/{id}`
pub async fn delete_postdoc<S: ProgramStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
  store.delete_postdoc(id).await?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Supervisions ────────────────────────────────────────────────────────────

/// `GET /supervisions`
pub async fn list_supervisions<S: ProgramStore>(
  State(store): State<Arc<S>>,
  Query(filter): Query<SupervisionFilter>,
) -> Result<Json<Vec<Supervision>>, ApiError> {
  Ok(Json(store.list_supervisions(filter).await?))
}

/// `POST /supervisions`
pub async fn add_supervision<S: ProgramStore>(
  State(store): State<Arc<S>>,
  Json(input): Json<NewSupervision>,
) -> Result<impl IntoResponse, ApiError> {
  let supervision = store.add_supervision(input).await?;
  Ok((StatusCode::CREATED, Json(supervision)))
}

/// `DELETE /supervisions/{supervisor_role_id}/{student_role_id}`
pub async fn remove_supervision<S: ProgramStore>(
  State(store): State<Arc<S>>,
  Path((supervisor_role_id, student_role_id)): Path<(i64, i64)>,
) -> Result<StatusCode, ApiError> {
  store
    .remove_supervision(supervisor_role_id, student_role_id)
    .await?;
  Ok(StatusCode::NO_CONTENT)
}
