//! JSON REST API for the cadre registry.
//!
//! Exposes an axum [`Router`] backed by any
//! [`cadre_core::store::ProgramStore`]. Auth, TLS, and transport concerns are
//! the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", cadre_api::api_router(store.clone()))
//! ```

pub mod activities;
pub mod catalog;
pub mod courses;
pub mod error;
pub mod letters;
pub mod people;
pub mod projects;

use std::sync::Arc;

use axum::{
  Router,
  routing::{delete, get, post, put},
};
use cadre_core::{catalog::LookupKind, letter::LetterParent, store::ProgramStore};

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: ProgramStore + 'static,
{
  Router::new()
    // Catalog
    .nest("/institutions", catalog::lookup_routes(LookupKind::Institution))
    .nest(
      "/researcher-titles",
      catalog::lookup_routes(LookupKind::ResearcherTitle),
    )
    .nest("/branches", catalog::lookup_routes(LookupKind::Branch))
    .nest(
      "/project-call-types",
      catalog::lookup_routes(LookupKind::ProjectCallType),
    )
    .nest(
      "/grad-school-activity-types",
      catalog::lookup_routes(LookupKind::GradSchoolActivityType),
    )
    .route(
      "/fields",
      get(catalog::list_fields::<S>).post(catalog::create_field::<S>),
    )
    .route(
      "/fields/{id}",
      get(catalog::get_field::<S>)
        .patch(catalog::update_field::<S>)
        .delete(catalog::delete_field::<S>),
    )
    // People
    .route("/people", get(people::list::<S>).post(people::create::<S>))
    .route(
      "/people/{id}",
      get(people::get_one::<S>)
        .patch(people::update::<S>)
        .delete(people::delete_one::<S>),
    )
    // Roles
    .route(
      "/person-roles",
      get(people::list_roles::<S>).post(people::create_role::<S>),
    )
    .route(
      "/person-roles/{id}",
      get(people::get_role::<S>)
        .patch(people::update_role::<S>)
        .delete(people::delete_role::<S>),
    )
    .route(
      "/person-roles/{id}/affiliations",
      get(people::list_affiliations::<S>).post(people::add_affiliation::<S>),
    )
    .route("/affiliations/{id}", delete(people::remove_affiliation::<S>))
    .route(
      "/person-roles/{id}/fields",
      get(people::list_role_fields::<S>).post(people::attach_role_field::<S>),
    )
    .route(
      "/person-roles/{id}/fields/{field_id}",
      delete(people::detach_role_field::<S>),
    )
    .nest(
      "/person-roles/{id}/letters",
      letters::parent_routes(LetterParent::PersonRole),
    )
    // Detail records
    .route(
      "/researchers",
      get(people::list_researchers::<S>).post(people::create_researcher::<S>),
    )
    .route(
      "/researchers/{id}",
      get(people::get_researcher::<S>)
        .patch(people::update_researcher::<S>)
        .delete(people::delete_researcher::<S>),
    )
    .route(
      "/phd-students",
      get(people::list_phd_students::<S>).post(people::create_phd_student::<S>),
    )
    .route(
      "/phd-students/{id}",
      get(people::get_phd_student::<S>)
        .patch(people::update_phd_student::<S>)
        .delete(people::delete_phd_student::<S>),
    )
    .route(
      "/phd-students/{id}/enrollments",
      get(courses::list_student_enrollments::<S>),
    )
    .route("/phd-students/{id}/activities", post(activities::create::<S>))
    .route(
      "/postdocs",
      get(people::list_postdocs::<S>).post(people::create_postdoc::<S>),
    )
    .route(
      "/postdocs/{id}",
      get(people::get_postdoc::<S>)
        .patch(people::update_postdoc::<S>)
        .delete(people::delete_postdoc::<S>),
    )
    // Supervisions
    .route(
      "/supervisions",
      get(people::list_supervisions::<S>).post(people::add_supervision::<S>),
    )
    .route(
      "/supervisions/{supervisor_role_id}/{student_role_id}",
      delete(people::remove_supervision::<S>),
    )
    // Terms
    .route(
      "/course-terms",
      get(courses::list_terms::<S>).post(courses::next_term::<S>),
    )
    .route(
      "/course-terms/{id}",
      get(courses::get_term::<S>)
        .patch(courses::update_term::<S>)
        .delete(courses::delete_term::<S>),
    )
    // Grad school activities
    .route(
      "/grad-school-activities",
      get(courses::list_activities::<S>).post(courses::create_activity::<S>),
    )
    .route(
      "/grad-school-activities/{id}",
      get(courses::get_activity::<S>)
        .patch(courses::update_activity::<S>)
        .delete(courses::delete_activity::<S>),
    )
    // Courses
    .route("/courses", get(courses::list::<S>).post(courses::create::<S>))
    .route(
      "/courses/{id}",
      get(courses::get_one::<S>)
        .patch(courses::update::<S>)
        .delete(courses::delete_one::<S>),
    )
    .route(
      "/courses/{id}/students",
      get(courses::list_enrollments::<S>).post(courses::enroll::<S>),
    )
    .route(
      "/courses/{id}/students/{phd_student_id}",
      axum::routing::patch(courses::update_enrollment::<S>)
        .delete(courses::withdraw::<S>),
    )
    .route(
      "/courses/{id}/teachers",
      get(courses::list_teachers::<S>).post(courses::attach_teacher::<S>),
    )
    .route(
      "/courses/{id}/teachers/{person_role_id}",
      delete(courses::detach_teacher::<S>),
    )
    .route(
      "/courses/{id}/institutions",
      get(courses::list_institutions::<S>)
        .post(courses::attach_institution::<S>),
    )
    .route(
      "/courses/{id}/institutions/{institution_id}",
      delete(courses::detach_institution::<S>),
    )
    .nest(
      "/courses/{id}/letters",
      letters::parent_routes(LetterParent::Course),
    )
    // Student activities
    .route("/student-activities", get(activities::list::<S>))
    .route(
      "/student-activities/{id}",
      get(activities::get_one::<S>)
        .patch(activities::update::<S>)
        .delete(activities::delete_one::<S>),
    )
    // Projects
    .route("/projects", get(projects::list::<S>).post(projects::create::<S>))
    .route(
      "/projects/{id}",
      get(projects::get_one::<S>)
        .patch(projects::update::<S>)
        .delete(projects::delete_one::<S>),
    )
    .route(
      "/projects/{id}/members",
      get(projects::list_members::<S>).post(projects::add_member::<S>),
    )
    .route(
      "/projects/{id}/members/{person_role_id}",
      axum::routing::patch(projects::update_member::<S>)
        .delete(projects::remove_member::<S>),
    )
    .route(
      "/projects/{id}/fields",
      get(projects::list_fields::<S>).post(projects::attach_field::<S>),
    )
    .route(
      "/projects/{id}/fields/{field_id}",
      delete(projects::detach_field::<S>),
    )
    .route(
      "/projects/{id}/reports",
      get(projects::list_reports::<S>).post(projects::add_report::<S>),
    )
    .route(
      "/reports/{id}",
      put(projects::update_report::<S>).delete(projects::delete_report::<S>),
    )
    .nest(
      "/projects/{id}/letters",
      letters::parent_routes(LetterParent::Project),
    )
    // Letters
    .route(
      "/letters/{id}",
      get(letters::get_one::<S>)
        .put(letters::update::<S>)
        .delete(letters::delete_one::<S>),
    )
    .with_state(store)
}
