//! Tri-state partial-update fields.
//!
//! Update payloads must distinguish "field omitted, leave it alone" from
//! "field explicitly null, reset it". A plain `Option<T>` collapses the two,
//! so nullable columns use [`Patch<T>`] instead: combined with
//! `#[serde(default)]`, a missing JSON field is `Keep`, an explicit `null`
//! is `Clear`, and any other value is `Set`.
//!
//! Non-nullable columns keep using `Option<T>` in patch structs, where
//! `None` simply means "leave unchanged".

use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Patch<T> {
  #[default]
  Keep,
  Clear,
  Set(T),
}

impl<T> Patch<T> {
  pub fn is_keep(&self) -> bool {
    matches!(self, Patch::Keep)
  }

  /// Apply this patch to a nullable slot.
  pub fn apply(self, slot: &mut Option<T>) {
    match self {
      Patch::Keep => {}
      Patch::Clear => *slot = None,
      Patch::Set(value) => *slot = Some(value),
    }
  }
}

impl<'de, T> Deserialize<'de> for Patch<T>
where
  T: Deserialize<'de>,
{
  fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
  where
    D: Deserializer<'de>,
  {
    Ok(match Option::<T>::deserialize(deserializer)? {
      Some(value) => Patch::Set(value),
      None => Patch::Clear,
    })
  }
}

// `Keep` has no JSON representation of its own; callers serialising a patch
// must skip `Keep` fields entirely (a round trip through `null` would turn
// them into `Clear`).
impl<T> Serialize for Patch<T>
where
  T: Serialize,
{
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: Serializer,
  {
    match self {
      Patch::Set(value) => serializer.serialize_some(value),
      Patch::Keep | Patch::Clear => serializer.serialize_none(),
    }
  }
}

#[cfg(test)]
mod tests {
  use serde::Deserialize;

  use super::Patch;

  #[derive(Debug, Default, Deserialize)]
  #[serde(default)]
  struct Payload {
    note: Patch<String>,
  }

  #[test]
  fn missing_field_is_keep() {
    let p: Payload = serde_json::from_str("{}").unwrap();
    assert_eq!(p.note, Patch::Keep);
  }

  #[test]
  fn explicit_null_is_clear() {
    let p: Payload = serde_json::from_str(r#"{"note": null}"#).unwrap();
    assert_eq!(p.note, Patch::Clear);
  }

  #[test]
  fn value_is_set() {
    let p: Payload = serde_json::from_str(r#"{"note": "hi"}"#).unwrap();
    assert_eq!(p.note, Patch::Set("hi".into()));
  }

  #[test]
  fn apply_semantics() {
    let mut slot = Some("old".to_string());
    Patch::Keep.apply(&mut slot);
    assert_eq!(slot.as_deref(), Some("old"));

    Patch::Set("new".to_string()).apply(&mut slot);
    assert_eq!(slot.as_deref(), Some("new"));

    Patch::<String>::Clear.apply(&mut slot);
    assert_eq!(slot, None);
  }
}
