//! Flat catalog lookups shared across the registry.
//!
//! Five tables share the same `{id, name}` shape and the same CRUD
//! semantics, so the store addresses them through one kind-dispatched
//! surface instead of five near-identical method sets. Fields are the one
//! catalog entry with a parent (their branch) and keep their own methods.

use serde::{Deserialize, Serialize};

use crate::error::EntityKind;

/// Which lookup table a catalog operation addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupKind {
  Institution,
  ResearcherTitle,
  Branch,
  ProjectCallType,
  GradSchoolActivityType,
}

impl LookupKind {
  pub fn entity_kind(self) -> EntityKind {
    match self {
      Self::Institution => EntityKind::Institution,
      Self::ResearcherTitle => EntityKind::ResearcherTitle,
      Self::Branch => EntityKind::Branch,
      Self::ProjectCallType => EntityKind::ProjectCallType,
      Self::GradSchoolActivityType => EntityKind::GradSchoolActivityType,
    }
  }
}

/// A catalog row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lookup {
  pub id:   i64,
  pub name: String,
}

// ─── Fields ──────────────────────────────────────────────────────────────────

/// An academic field, always attached to a branch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Field {
  pub id:        i64,
  pub name:      String,
  pub branch_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewField {
  pub name:      String,
  pub branch_id: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FieldPatch {
  pub name:      Option<String>,
  pub branch_id: Option<i64>,
}
