//! The store traits and supporting types.
//!
//! The registry's consumer contract, implemented by storage backends
//! (e.g. `cadre-store-sqlite`). Higher layers depend on these abstractions,
//! not on any concrete backend. The contract is split into focused traits
//! per domain; [`ProgramStore`] bundles them for consumers that need the
//! whole registry.
//!
//! Conventions shared by every method:
//! - `get_*` returns `Ok(None)` for a missing id; `update_*`/`delete_*`
//!   return [`Error::NotFound`](crate::Error::NotFound) instead.
//! - `create_*`/`add_*` verify every referenced parent and fail with
//!   `NotFound` on a dangling reference, `Duplicate` on a natural-key
//!   collision.
//! - `delete_*` fails with `HasDependents` while anything still references
//!   the row.
//! - All methods return `Send` futures so the traits can be used in
//!   multi-threaded async runtimes (e.g. tokio with `axum`).

use std::future::Future;

use crate::{
  activity::{ActivityPatch, NewStudentActivity, StudentActivity},
  catalog::{Field, FieldPatch, Lookup, LookupKind, NewField},
  course::{
    Course, CoursePatch, Enrollment, EnrollmentPatch, GradSchoolActivity,
    GradSchoolActivityPatch, NewCourse, NewEnrollment, NewGradSchoolActivity,
  },
  error::Result,
  letter::{DecisionLetter, LetterParent},
  link::{Affiliation, NewAffiliation, NewSupervision, PairLink, Supervision},
  person::{
    NewPerson, NewPersonRole, NewPhdStudent, NewPostdoc, NewResearcher,
    Person, PersonPatch, PersonRole, PersonRolePatch, PhdStudent,
    PhdStudentPatch, Postdoc, PostdocPatch, Researcher, ResearcherPatch,
  },
  project::{
    NewProject, NewProjectMember, Project, ProjectMember, ProjectMemberPatch,
    ProjectPatch, ResearchOutputReport,
  },
  query::{
    ActivityFilter, CourseFilter, EnrollmentFilter, FieldFilter,
    GradSchoolActivityFilter, LookupFilter, PersonFilter, PersonRoleFilter,
    PhdStudentFilter, PostdocFilter, ProjectFilter, ResearcherFilter,
    SupervisionFilter, TermFilter,
  },
  term::{CourseTerm, CourseTermPatch},
};

// ─── Catalog ─────────────────────────────────────────────────────────────────

/// The flat `{id, name}` lookups plus fields.
pub trait CatalogStore: Send + Sync {
  fn create_lookup(
    &self,
    kind: LookupKind,
    name: String,
  ) -> impl Future<Output = Result<Lookup>> + Send + '_;

  fn get_lookup(
    &self,
    kind: LookupKind,
    id: i64,
  ) -> impl Future<Output = Result<Option<Lookup>>> + Send + '_;

  /// Ordered by name. `filter.name` is an exact match returning at most
  /// one row.
  fn list_lookups(
    &self,
    kind: LookupKind,
    filter: LookupFilter,
  ) -> impl Future<Output = Result<Vec<Lookup>>> + Send + '_;

  fn update_lookup(
    &self,
    kind: LookupKind,
    id: i64,
    name: String,
  ) -> impl Future<Output = Result<Lookup>> + Send + '_;

  fn delete_lookup(
    &self,
    kind: LookupKind,
    id: i64,
  ) -> impl Future<Output = Result<()>> + Send + '_;

  fn create_field(
    &self,
    input: NewField,
  ) -> impl Future<Output = Result<Field>> + Send + '_;

  fn get_field(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Field>>> + Send + '_;

  fn list_fields(
    &self,
    filter: FieldFilter,
  ) -> impl Future<Output = Result<Vec<Field>>> + Send + '_;

  fn update_field(
    &self,
    id: i64,
    patch: FieldPatch,
  ) -> impl Future<Output = Result<Field>> + Send + '_;

  fn delete_field(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<()>> + Send + '_;
}

// ─── People ──────────────────────────────────────────────────────────────────

/// People, roles, detail records, affiliations and supervisions.
pub trait PeopleStore: Send + Sync {
  fn create_person(
    &self,
    input: NewPerson,
  ) -> impl Future<Output = Result<Person>> + Send + '_;

  fn get_person(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Person>>> + Send + '_;

  /// Ordered by last name, then first name.
  fn list_people(
    &self,
    filter: PersonFilter,
  ) -> impl Future<Output = Result<Vec<Person>>> + Send + '_;

  fn update_person(
    &self,
    id: i64,
    patch: PersonPatch,
  ) -> impl Future<Output = Result<Person>> + Send + '_;

  fn delete_person(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<()>> + Send + '_;

  /// `start_date` defaults to the moment of creation.
  fn create_person_role(
    &self,
    input: NewPersonRole,
  ) -> impl Future<Output = Result<PersonRole>> + Send + '_;

  fn get_person_role(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<PersonRole>>> + Send + '_;

  fn list_person_roles(
    &self,
    filter: PersonRoleFilter,
  ) -> impl Future<Output = Result<Vec<PersonRole>>> + Send + '_;

  fn update_person_role(
    &self,
    id: i64,
    patch: PersonRolePatch,
  ) -> impl Future<Output = Result<PersonRole>> + Send + '_;

  fn delete_person_role(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<()>> + Send + '_;

  /// The role must be of researcher kind and must not already have a
  /// detail record.
  fn create_researcher(
    &self,
    input: NewResearcher,
  ) -> impl Future<Output = Result<Researcher>> + Send + '_;

  fn get_researcher(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Researcher>>> + Send + '_;

  fn list_researchers(
    &self,
    filter: ResearcherFilter,
  ) -> impl Future<Output = Result<Vec<Researcher>>> + Send + '_;

  fn update_researcher(
    &self,
    id: i64,
    patch: ResearcherPatch,
  ) -> impl Future<Output = Result<Researcher>> + Send + '_;

  fn delete_researcher(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<()>> + Send + '_;

  fn create_phd_student(
    &self,
    input: NewPhdStudent,
  ) -> impl Future<Output = Result<PhdStudent>> + Send + '_;

  fn get_phd_student(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<PhdStudent>>> + Send + '_;

  fn list_phd_students(
    &self,
    filter: PhdStudentFilter,
  ) -> impl Future<Output = Result<Vec<PhdStudent>>> + Send + '_;

  fn update_phd_student(
    &self,
    id: i64,
    patch: PhdStudentPatch,
  ) -> impl Future<Output = Result<PhdStudent>> + Send + '_;

  fn delete_phd_student(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<()>> + Send + '_;

  fn create_postdoc(
    &self,
    input: NewPostdoc,
  ) -> impl Future<Output = Result<Postdoc>> + Send + '_;

  fn get_postdoc(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Postdoc>>> + Send + '_;

  fn list_postdocs(
    &self,
    filter: PostdocFilter,
  ) -> impl Future<Output = Result<Vec<Postdoc>>> + Send + '_;

  fn update_postdoc(
    &self,
    id: i64,
    patch: PostdocPatch,
  ) -> impl Future<Output = Result<Postdoc>> + Send + '_;

  fn delete_postdoc(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<()>> + Send + '_;

  fn add_affiliation(
    &self,
    person_role_id: i64,
    input: NewAffiliation,
  ) -> impl Future<Output = Result<Affiliation>> + Send + '_;

  fn list_affiliations(
    &self,
    person_role_id: i64,
  ) -> impl Future<Output = Result<Vec<Affiliation>>> + Send + '_;

  fn remove_affiliation(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<()>> + Send + '_;

  /// Both ends must be existing person-roles; the pair is unique.
  fn add_supervision(
    &self,
    input: NewSupervision,
  ) -> impl Future<Output = Result<Supervision>> + Send + '_;

  fn list_supervisions(
    &self,
    filter: SupervisionFilter,
  ) -> impl Future<Output = Result<Vec<Supervision>>> + Send + '_;

  fn remove_supervision(
    &self,
    supervisor_role_id: i64,
    student_role_id: i64,
  ) -> impl Future<Output = Result<()>> + Send + '_;
}

// ─── Courses ─────────────────────────────────────────────────────────────────

/// Terms, grad school activities, courses and enrollment.
pub trait CourseStore: Send + Sync {
  /// The term sequencer's only write entry point: compute the season/year
  /// following the newest existing term and persist it.
  fn next_course_term(
    &self,
  ) -> impl Future<Output = Result<CourseTerm>> + Send + '_;

  fn get_course_term(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<CourseTerm>>> + Send + '_;

  /// Newest first (year, then season rank).
  fn list_course_terms(
    &self,
    filter: TermFilter,
  ) -> impl Future<Output = Result<Vec<CourseTerm>>> + Send + '_;

  /// Only the stored `is_active` flag is mutable.
  fn update_course_term(
    &self,
    id: i64,
    patch: CourseTermPatch,
  ) -> impl Future<Output = Result<CourseTerm>> + Send + '_;

  /// Undo of the last `next_course_term`: only the newest term can be
  /// deleted, and only while no course references it.
  fn delete_course_term(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<()>> + Send + '_;

  /// Guards the (type, description, year) natural key.
  fn create_grad_school_activity(
    &self,
    input: NewGradSchoolActivity,
  ) -> impl Future<Output = Result<GradSchoolActivity>> + Send + '_;

  fn get_grad_school_activity(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<GradSchoolActivity>>> + Send + '_;

  /// Ordered year descending, then type name.
  fn list_grad_school_activities(
    &self,
    filter: GradSchoolActivityFilter,
  ) -> impl Future<Output = Result<Vec<GradSchoolActivity>>> + Send + '_;

  fn update_grad_school_activity(
    &self,
    id: i64,
    patch: GradSchoolActivityPatch,
  ) -> impl Future<Output = Result<GradSchoolActivity>> + Send + '_;

  fn delete_grad_school_activity(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<()>> + Send + '_;

  /// Enforces the anchor XOR and the (title, anchor) duplicate guard.
  fn create_course(
    &self,
    input: NewCourse,
  ) -> impl Future<Output = Result<Course>> + Send + '_;

  fn get_course(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Course>>> + Send + '_;

  /// Newest first by the composite (year, season rank) key, resolving the
  /// year from whichever anchor the course has.
  fn list_courses(
    &self,
    filter: CourseFilter,
  ) -> impl Future<Output = Result<Vec<Course>>> + Send + '_;

  fn update_course(
    &self,
    id: i64,
    patch: CoursePatch,
  ) -> impl Future<Output = Result<Course>> + Send + '_;

  fn delete_course(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<()>> + Send + '_;

  fn enroll_student(
    &self,
    course_id: i64,
    input: NewEnrollment,
  ) -> impl Future<Output = Result<Enrollment>> + Send + '_;

  fn list_course_enrollments(
    &self,
    course_id: i64,
    filter: EnrollmentFilter,
  ) -> impl Future<Output = Result<Vec<Enrollment>>> + Send + '_;

  /// A student's enrollments, not-yet-completed first, then newest first
  /// by the course's composite key.
  fn list_student_enrollments(
    &self,
    phd_student_id: i64,
  ) -> impl Future<Output = Result<Vec<Enrollment>>> + Send + '_;

  fn update_enrollment(
    &self,
    course_id: i64,
    phd_student_id: i64,
    patch: EnrollmentPatch,
  ) -> impl Future<Output = Result<Enrollment>> + Send + '_;

  fn withdraw_student(
    &self,
    course_id: i64,
    phd_student_id: i64,
  ) -> impl Future<Output = Result<()>> + Send + '_;
}

// ─── Projects ────────────────────────────────────────────────────────────────

pub trait ProjectStore: Send + Sync {
  /// Guards the unique project number.
  fn create_project(
    &self,
    input: NewProject,
  ) -> impl Future<Output = Result<Project>> + Send + '_;

  fn get_project(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Project>>> + Send + '_;

  /// Ordered by start date, newest first.
  fn list_projects(
    &self,
    filter: ProjectFilter,
  ) -> impl Future<Output = Result<Vec<Project>>> + Send + '_;

  fn update_project(
    &self,
    id: i64,
    patch: ProjectPatch,
  ) -> impl Future<Output = Result<Project>> + Send + '_;

  fn delete_project(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<()>> + Send + '_;

  fn add_project_member(
    &self,
    project_id: i64,
    input: NewProjectMember,
  ) -> impl Future<Output = Result<ProjectMember>> + Send + '_;

  fn list_project_members(
    &self,
    project_id: i64,
  ) -> impl Future<Output = Result<Vec<ProjectMember>>> + Send + '_;

  fn update_project_member(
    &self,
    project_id: i64,
    person_role_id: i64,
    patch: ProjectMemberPatch,
  ) -> impl Future<Output = Result<ProjectMember>> + Send + '_;

  fn remove_project_member(
    &self,
    project_id: i64,
    person_role_id: i64,
  ) -> impl Future<Output = Result<()>> + Send + '_;

  fn add_output_report(
    &self,
    project_id: i64,
    link: String,
  ) -> impl Future<Output = Result<ResearchOutputReport>> + Send + '_;

  fn list_output_reports(
    &self,
    project_id: i64,
  ) -> impl Future<Output = Result<Vec<ResearchOutputReport>>> + Send + '_;

  fn update_output_report(
    &self,
    id: i64,
    link: String,
  ) -> impl Future<Output = Result<ResearchOutputReport>> + Send + '_;

  fn delete_output_report(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<()>> + Send + '_;
}

// ─── Decision letters ────────────────────────────────────────────────────────

/// Letters resolve their parent through the (kind, id) discriminator; all
/// operations verify the parent or filter on both columns together.
pub trait LetterStore: Send + Sync {
  fn add_letter(
    &self,
    parent: LetterParent,
    link: String,
  ) -> impl Future<Output = Result<DecisionLetter>> + Send + '_;

  fn get_letter(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<DecisionLetter>>> + Send + '_;

  fn list_letters(
    &self,
    parent: LetterParent,
  ) -> impl Future<Output = Result<Vec<DecisionLetter>>> + Send + '_;

  fn update_letter(
    &self,
    id: i64,
    link: String,
  ) -> impl Future<Output = Result<DecisionLetter>> + Send + '_;

  fn delete_letter(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<()>> + Send + '_;
}

// ─── Student activities ──────────────────────────────────────────────────────

pub trait ActivityStore: Send + Sync {
  /// Grad-school variants validate the referenced activity before insert;
  /// abroad variants back-fill `activity_id` with the new row's id inside
  /// the same transaction.
  fn create_student_activity(
    &self,
    phd_student_id: i64,
    input: NewStudentActivity,
  ) -> impl Future<Output = Result<StudentActivity>> + Send + '_;

  fn get_student_activity(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<StudentActivity>>> + Send + '_;

  fn list_student_activities(
    &self,
    filter: ActivityFilter,
  ) -> impl Future<Output = Result<Vec<StudentActivity>>> + Send + '_;

  /// The patch kind must match the stored row's kind.
  fn update_student_activity(
    &self,
    id: i64,
    patch: ActivityPatch,
  ) -> impl Future<Output = Result<StudentActivity>> + Send + '_;

  fn delete_student_activity(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<()>> + Send + '_;
}

// ─── Bare pair links ─────────────────────────────────────────────────────────

/// Attach/detach for link tables carrying nothing beyond the pair, plus the
/// typed listings of each pair's children.
pub trait LinkStore: Send + Sync {
  /// Verifies both ends exist, then inserts; a second identical attach is
  /// a duplicate.
  fn attach(
    &self,
    link: PairLink,
    parent_id: i64,
    child_id: i64,
  ) -> impl Future<Output = Result<()>> + Send + '_;

  /// Removing a pair that is not linked reports NotFound.
  fn detach(
    &self,
    link: PairLink,
    parent_id: i64,
    child_id: i64,
  ) -> impl Future<Output = Result<()>> + Send + '_;

  fn course_institutions(
    &self,
    course_id: i64,
  ) -> impl Future<Output = Result<Vec<Lookup>>> + Send + '_;

  fn course_teachers(
    &self,
    course_id: i64,
  ) -> impl Future<Output = Result<Vec<PersonRole>>> + Send + '_;

  fn project_fields(
    &self,
    project_id: i64,
  ) -> impl Future<Output = Result<Vec<Field>>> + Send + '_;

  fn role_fields(
    &self,
    person_role_id: i64,
  ) -> impl Future<Output = Result<Vec<Field>>> + Send + '_;
}

// ─── The whole registry ──────────────────────────────────────────────────────

/// Bundle trait for consumers that need the full registry surface.
pub trait ProgramStore:
  CatalogStore
  + PeopleStore
  + CourseStore
  + ProjectStore
  + LetterStore
  + ActivityStore
  + LinkStore
{
}

impl<T> ProgramStore for T where
  T: CatalogStore
    + PeopleStore
    + CourseStore
    + ProjectStore
    + LetterStore
    + ActivityStore
    + LinkStore
{
}
