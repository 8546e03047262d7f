//! Error types for `cadre-core`.
//!
//! One closed taxonomy shared by every crate in the workspace. Storage
//! backends classify their internal failures into these variants at the
//! boundary, so callers never see backend-specific error types.

use std::fmt;

use thiserror::Error;

/// Names a top-level record type, for error context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
  Person,
  PersonRole,
  Researcher,
  PhdStudent,
  Postdoc,
  Institution,
  ResearcherTitle,
  Branch,
  Field,
  ProjectCallType,
  GradSchoolActivityType,
  GradSchoolActivity,
  CourseTerm,
  Course,
  Enrollment,
  StudentActivity,
  DecisionLetter,
  Project,
  ProjectMember,
  ResearchOutputReport,
  Affiliation,
  Supervision,
}

impl EntityKind {
  pub fn label(self) -> &'static str {
    match self {
      Self::Person => "person",
      Self::PersonRole => "person role",
      Self::Researcher => "researcher",
      Self::PhdStudent => "PhD student",
      Self::Postdoc => "postdoc",
      Self::Institution => "institution",
      Self::ResearcherTitle => "researcher title",
      Self::Branch => "branch",
      Self::Field => "field",
      Self::ProjectCallType => "project call type",
      Self::GradSchoolActivityType => "grad school activity type",
      Self::GradSchoolActivity => "grad school activity",
      Self::CourseTerm => "course term",
      Self::Course => "course",
      Self::Enrollment => "enrollment",
      Self::StudentActivity => "student activity",
      Self::DecisionLetter => "decision letter",
      Self::Project => "project",
      Self::ProjectMember => "project member",
      Self::ResearchOutputReport => "research output report",
      Self::Affiliation => "affiliation",
      Self::Supervision => "supervision",
    }
  }
}

impl fmt::Display for EntityKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.label())
  }
}

#[derive(Debug, Error)]
pub enum Error {
  #[error("{kind} #{id} not found")]
  NotFound { kind: EntityKind, id: i64 },

  #[error("{0}")]
  Duplicate(String),

  #[error("cannot delete {kind} #{id}: {dependents} still reference it")]
  HasDependents {
    kind:       EntityKind,
    id:         i64,
    dependents: &'static str,
  },

  #[error("{0}")]
  InvariantViolation(String),

  /// A store constraint fired that the app-level pre-checks did not catch
  /// (e.g. two requests racing a natural-key insert). The transaction has
  /// been rolled back.
  #[error("constraint violation: {0}")]
  Constraint(String),

  #[error("store error: {0}")]
  Store(String),

  #[error("unknown {0} discriminant: {1:?}")]
  UnknownDiscriminant(&'static str, String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

impl Error {
  pub fn not_found(kind: EntityKind, id: i64) -> Self {
    Self::NotFound { kind, id }
  }

  pub fn duplicate(message: impl Into<String>) -> Self {
    Self::Duplicate(message.into())
  }

  pub fn invariant(message: impl Into<String>) -> Self {
    Self::InvariantViolation(message.into())
  }

  pub fn has_dependents(
    kind: EntityKind,
    id: i64,
    dependents: &'static str,
  ) -> Self {
    Self::HasDependents {
      kind,
      id,
      dependents,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
