//! Handlers for terms, grad school activities, courses and enrollment.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use cadre_core::{
  catalog::Lookup,
  course::{
    Course, CoursePatch, Enrollment, EnrollmentPatch, GradSchoolActivity,
    GradSchoolActivityPatch, NewCourse, NewEnrollment, NewGradSchoolActivity,
  },
  error::EntityKind,
  link::PairLink,
  person::PersonRole,
  query::{
    CourseFilter, EnrollmentFilter, GradSchoolActivityFilter, TermFilter,
  },
  store::ProgramStore,
  term::{CourseTerm, CourseTermPatch},
  Error,
};
use serde::Deserialize;

use crate::error::ApiError;

// ─── Terms ───────────────────────────────────────────────────────────────────

/// `GET /course-terms`
pub async fn list_terms<S: ProgramStore>(
  State(store): State<Arc<S>>,
  Query(filter): Query<TermFilter>,
) -> Result<Json<Vec<CourseTerm>>, ApiError> {
  Ok(Json(store.list_course_terms(filter).await?))
}

/// `POST /course-terms` — no body; the sequencer decides the season/year.
pub async fn next_term<S: ProgramStore>(
  State(store): State<Arc<S>>,
) -> Result<impl IntoResponse, ApiError> {
  let term = store.next_course_term().await?;
  Ok((StatusCode::CREATED, Json(term)))
}

/// `GET /course-terms/{id}`
pub async fn get_term<S: ProgramStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
) -> Result<Json<CourseTerm>, ApiError> {
  let term = store
    .get_course_term(id)
    .await?
    .ok_or_else(|| Error::not_found(EntityKind::CourseTerm, id))?;
  Ok(Json(term))
}

/// `PATCH /course-terms/{id}`
pub async fn update_term<S: ProgramStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
  Json(patch): Json<CourseTermPatch>,
) -> Result<Json<CourseTerm>, ApiError> {
  Ok(Json(store.update_course_term(id, patch).await?))
}

/// `DELETE /course-terms/{id}`
pub async fn delete_term<S: ProgramStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
  store.delete_course_term(id).await?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Grad school activities ──────────────────────────────────────────────────

/// `GET /grad-school-activities`
pub async fn list_activities<S: ProgramStore>(
  State(store): State<Arc<S>>,
  Query(filter): Query<GradSchoolActivityFilter>,
) -> Result<Json<Vec<GradSchoolActivity>>, ApiError> {
  Ok(Json(store.list_grad_school_activities(filter).await?))
}

/// `POST /grad-school-activities`
pub async fn create_activity<S: ProgramStore>(
  State(store): State<Arc<S>>,
  Json(input): Json<NewGradSchoolActivity>,
) -> Result<impl IntoResponse, ApiError> {
  let activity = store.create_grad_school_activity(input).await?;
  Ok((StatusCode::CREATED, Json(activity)))
}

/// `GET /grad-school-activities/{id}`
pub async fn get_activity<S: ProgramStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
) -> Result<Json<GradSchoolActivity>, ApiError> {
  let activity = store
    .get_grad_school_activity(id)
    .await?
    .ok_or_else(|| Error::not_found(EntityKind::GradSchoolActivity, id))?;
  Ok(Json(activity))
}

/// `PATCH /grad-school-activities/{id}`
pub async fn update_activity<S: ProgramStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
  Json(patch): Json<GradSchoolActivityPatch>,
) -> Result<Json<GradSchoolActivity>, ApiError> {
  Ok(Json(store.update_grad_school_activity(id, patch).await?))
}

/// `DELETE /grad-school-activities/{id}`
pub async fn delete_activity<S: ProgramStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
  store.delete_grad_school_activity(id).await?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Courses ─────────────────────────────────────────────────────────────────

/// `GET /courses`
pub async fn list<S: ProgramStore>(
  State(store): State<Arc<S>>,
  Query(filter): Query<CourseFilter>,
) -> Result<Json<Vec<Course>>, ApiError> {
  Ok(Json(store.list_courses(filter).await?))
}

/// `POST /courses`
pub async fn create<S: ProgramStore>(
  State(store): State<Arc<S>>,
  Json(input): Json<NewCourse>,
) -> Result<impl IntoResponse, ApiError> {
  let course = store.create_course(input).await?;
  Ok((StatusCode::CREATED, Json(course)))
}

/// `GET /courses/{id}`
pub async fn get_one<S: ProgramStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
) -> Result<Json<Course>, ApiError> {
  let course = store
    .get_course(id)
    .await?
    .ok_or_else(|| Error::not_found(EntityKind::Course, id))?;
  Ok(Json(course))
}

/// `PATCH /courses/{id}`
pub async fn update<S: ProgramStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
  Json(patch): Json<CoursePatch>,
) -> Result<Json<Course>, ApiError> {
  Ok(Json(store.update_course(id, patch).await?))
}

/// `DELETE /courses/{id}`
pub async fn delete_one<S: ProgramStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
  store.delete_course(id).await?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Enrollment ──────────────────────────────────────────────────────────────

/// `GET /courses/{id}/students`
pub async fn list_enrollments<S: ProgramStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
  Query(filter): Query<EnrollmentFilter>,
) -> Result<Json<Vec<Enrollment>>, ApiError> {
  Ok(Json(store.list_course_enrollments(id, filter).await?))
}

/// `POST /courses/{id}/students`
pub async fn enroll<S: ProgramStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
  Json(input): Json<NewEnrollment>,
) -> Result<impl IntoResponse, ApiError> {
  let enrollment = store.enroll_student(id, input).await?;
  Ok((StatusCode::CREATED, Json(enrollment)))
}

/// `GET /phd-students/{id}/enrollments`
pub async fn list_student_enrollments<S: ProgramStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
) -> Result<Json<Vec<Enrollment>>, ApiError> {
  Ok(Json(store.list_student_enrollments(id).await?))
}

/// `PATCH /courses/{id}/students/{phd_student_id}`
pub async fn update_enrollment<S: ProgramStore>(
  State(store): State<Arc<S>>,
  Path((id, phd_student_id)): Path<(i64, i64)>,
  Json(patch): Json<EnrollmentPatch>,
) -> Result<Json<Enrollment>, ApiError> {
  Ok(Json(store.update_enrollment(id, phd_student_id, patch).await?))
}

/// `DELETE /courses/{id}/students/{phd_student_id}`
pub async fn withdraw<S: ProgramStore>(
  State(store): State<Arc<S>>,
  Path((id, phd_student_id)): Path<(i64, i64)>,
) -> Result<StatusCode, ApiError> {
  store.withdraw_student(id, phd_student_id).await?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Teacher and institution links ───────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AttachTeacher {
  pub person_role_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct AttachInstitution {
  pub institution_id: i64,
}

/// `GET /courses/{id}/teachers`
pub async fn list_teachers<S: ProgramStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
) -> Result<Json<Vec<PersonRole>>, ApiError> {
  Ok(Json(store.course_teachers(id).await?))
}

/// `POST /courses/{id}/teachers`
pub async fn attach_teacher<S: ProgramStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
  Json(body): Json<AttachTeacher>,
) -> Result<StatusCode, ApiError> {
  store
    .attach(PairLink::CourseTeacher, id, body.person_role_id)
    .await?;
  Ok(StatusCode::CREATED)
}

/// `DELETE /courses/{id}/teachers/{person_role_id}`
pub async fn detach_teacher<S: ProgramStore>(
  State(store): State<Arc<S>>,
  Path((id, person_role_id)): Path<(i64, i64)>,
) -> Result<StatusCode, ApiError> {
  store.detach(PairLink::CourseTeacher, id, person_role_id).await?;
  Ok(StatusCode::NO_CONTENT)
}

/// `GET /courses/{id}/institutions`
pub async fn list_institutions<S: ProgramStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
) -> Result<Json<Vec<Lookup>>, ApiError> {
  Ok(Json(store.course_institutions(id).await?))
}

/// `POST /courses/{id}/institutions`
pub async fn attach_institution<S: ProgramStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
  Json(body): Json<AttachInstitution>,
) -> Result<StatusCode, ApiError> {
  store
    .attach(PairLink::CourseInstitution, id, body.institution_id)
    .await?;
  Ok(StatusCode::CREATED)
}

/// `DELETE /courses/{id}/institutions/{institution_id}`
pub async fn detach_institution<S: ProgramStore>(
  State(store): State<Arc<S>>,
  Path((id, institution_id)): Path<(i64, i64)>,
) -> Result<StatusCode, ApiError> {
  store
    .detach(PairLink::CourseInstitution, id, institution_id)
    .await?;
  Ok(StatusCode::NO_CONTENT)
}
