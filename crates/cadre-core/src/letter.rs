//! Decision letters and their polymorphic parent reference.
//!
//! A letter attaches to exactly one of several unrelated parent kinds. The
//! store keeps a (`parent_kind`, `parent_id`) pair with no foreign key;
//! `parent_id` alone is never unique across kinds, so every resolution
//! filters on both columns together.

use serde::{Deserialize, Serialize};

use crate::error::{EntityKind, Error, Result};

/// The record a decision letter is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
  tag = "parent_kind",
  content = "parent_id",
  rename_all = "snake_case"
)]
pub enum LetterParent {
  PersonRole(i64),
  Project(i64),
  Course(i64),
}

impl LetterParent {
  /// The discriminant string stored in the `parent_kind` column.
  /// Must match the `rename_all = "snake_case"` serde tags above.
  pub fn discriminant(self) -> &'static str {
    match self {
      Self::PersonRole(_) => "person_role",
      Self::Project(_) => "project",
      Self::Course(_) => "course",
    }
  }

  pub fn id(self) -> i64 {
    match self {
      Self::PersonRole(id) | Self::Project(id) | Self::Course(id) => id,
    }
  }

  pub fn entity_kind(self) -> EntityKind {
    match self {
      Self::PersonRole(_) => EntityKind::PersonRole,
      Self::Project(_) => EntityKind::Project,
      Self::Course(_) => EntityKind::Course,
    }
  }

  /// Rebuild from the discriminant and id columns.
  pub fn from_parts(kind: &str, id: i64) -> Result<Self> {
    match kind {
      "person_role" => Ok(Self::PersonRole(id)),
      "project" => Ok(Self::Project(id)),
      "course" => Ok(Self::Course(id)),
      other => {
        Err(Error::UnknownDiscriminant("letter parent", other.to_owned()))
      }
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionLetter {
  pub id:     i64,
  #[serde(flatten)]
  pub parent: LetterParent,
  pub link:   String,
}

/// Create/update payload; the parent comes from the request path, never the
/// body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewDecisionLetter {
  pub link: String,
}
