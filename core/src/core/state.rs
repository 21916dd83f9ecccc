// ventas/src/core/state.rs

//! The purchase lifecycle as reported by the sales service.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

pub const WIRE_PENDING: &str = "PENDIENTE";
pub const WIRE_CONFIRMED: &str = "CONFIRMADA";
pub const WIRE_REJECTED: &str = "RECHAZADA";

/// Closed purchase state. Unrecognized wire values land in `Unknown` and are
/// never treated as a successful outcome.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PurchaseState {
  /// Initial: stock validation still in flight.
  Pending,
  /// Accepted by the sales service.
  Confirmed,
  /// Terminal failure (insufficient stock or another rejection reason).
  Rejected,
  /// Anything else the backend sent, kept raw for display and logging.
  Unknown(String),
}

impl PurchaseState {
  pub fn from_wire(raw: &str) -> Self {
    match raw.trim() {
      WIRE_PENDING => PurchaseState::Pending,
      WIRE_CONFIRMED => PurchaseState::Confirmed,
      WIRE_REJECTED => PurchaseState::Rejected,
      other => PurchaseState::Unknown(other.to_string()),
    }
  }

  pub fn as_wire(&self) -> &str {
    match self {
      PurchaseState::Pending => WIRE_PENDING,
      PurchaseState::Confirmed => WIRE_CONFIRMED,
      PurchaseState::Rejected => WIRE_REJECTED,
      PurchaseState::Unknown(raw) => raw.as_str(),
    }
  }

  pub fn is_rejected(&self) -> bool {
    matches!(self, PurchaseState::Rejected)
  }
}

impl Default for PurchaseState {
  fn default() -> Self {
    PurchaseState::Unknown(String::new())
  }
}

impl fmt::Display for PurchaseState {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_wire())
  }
}

impl Serialize for PurchaseState {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(self.as_wire())
  }
}

// Missing values are handled by `#[serde(default)]` at the field. Non-string
// values are kept as their JSON text.
impl<'de> Deserialize<'de> for PurchaseState {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    Ok(match serde_json::Value::deserialize(deserializer)? {
      serde_json::Value::Null => PurchaseState::default(),
      serde_json::Value::String(raw) => PurchaseState::from_wire(&raw),
      other => PurchaseState::Unknown(other.to_string()),
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn known_wire_values_map_to_variants() {
    assert_eq!(PurchaseState::from_wire("PENDIENTE"), PurchaseState::Pending);
    assert_eq!(PurchaseState::from_wire("CONFIRMADA"), PurchaseState::Confirmed);
    assert_eq!(PurchaseState::from_wire(" RECHAZADA "), PurchaseState::Rejected);
  }

  #[test]
  fn unrecognized_values_are_unknown_and_keep_raw_text() {
    let state = PurchaseState::from_wire("EN_REVISION");
    assert_eq!(state, PurchaseState::Unknown("EN_REVISION".to_string()));
    assert_eq!(state.as_wire(), "EN_REVISION");
    assert!(!state.is_rejected());
  }

  #[test]
  fn null_deserializes_to_empty_unknown() {
    let state: PurchaseState = serde_json::from_str("null").unwrap();
    assert_eq!(state, PurchaseState::Unknown(String::new()));
  }

  #[test]
  fn non_string_values_are_unknown_instead_of_failing() {
    let numeric: PurchaseState = serde_json::from_str("2").unwrap();
    assert_eq!(numeric, PurchaseState::Unknown("2".to_string()));

    let object: PurchaseState = serde_json::from_str(r#"{"codigo":"PENDIENTE"}"#).unwrap();
    assert_eq!(object, PurchaseState::Unknown(r#"{"codigo":"PENDIENTE"}"#.to_string()));
    assert!(!object.is_rejected());
  }
}
