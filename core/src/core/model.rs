// ventas/src/core/model.rs

//! Purchase records as the rest of the crate sees them. Wire shapes live in
//! `gateway::dto` and are mapped into these types at the gateway boundary.

use crate::core::state::PurchaseState;
use chrono::NaiveDateTime;
use serde::{Serialize, Serializer};
use std::fmt;

/// Opaque purchase identifier. Never blank.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct PurchaseId(String);

impl PurchaseId {
  /// Returns `None` for blank input, which the resolver treats as "no purchase".
  pub fn parse(raw: impl AsRef<str>) -> Option<Self> {
    let trimmed = raw.as_ref().trim();
    if trimmed.is_empty() {
      None
    } else {
      Some(PurchaseId(trimmed.to_string()))
    }
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl fmt::Display for PurchaseId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

/// Money in integer cents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money {
  cents: i64,
}

impl Money {
  pub const ZERO: Money = Money { cents: 0 };

  pub const fn from_cents(cents: i64) -> Self {
    Money { cents }
  }

  /// Rounds to the nearest cent. Non-finite input is zero.
  pub fn from_units(units: f64) -> Self {
    if !units.is_finite() {
      return Money::ZERO;
    }
    Money {
      cents: (units * 100.0).round() as i64,
    }
  }

  pub const fn cents(&self) -> i64 {
    self.cents
  }
}

impl fmt::Display for Money {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let sign = if self.cents < 0 { "-" } else { "" };
    let abs = self.cents.unsigned_abs();
    write!(f, "{}${}.{:02}", sign, abs / 100, abs % 100)
  }
}

// Serialized as decimal units, the shape the sales service uses.
impl Serialize for Money {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(self.cents as f64 / 100.0)
  }
}

/// Result of submitting the cart for purchase.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRef {
  pub purchase_id: PurchaseId,
  pub created_at: Option<NaiveDateTime>,
  pub total: Money,
  pub state: PurchaseState,
}

/// One line of a purchase. `unit_price_at_purchase` is frozen at purchase time
/// and is not the current catalog price.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseLineItem {
  pub product_id: String,
  pub title: String,
  pub unit_price_at_purchase: Money,
  pub quantity: u32,
  pub line_subtotal: Money,
}

/// Full purchase record, owned by the backend. Replaced wholesale on refetch.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseDetail {
  pub id: PurchaseId,
  pub created_at: Option<NaiveDateTime>,
  pub subtotal: Money,
  pub discount_applied: Money,
  pub total: Money,
  pub state: PurchaseState,
  pub rejection_reason: Option<String>,
  pub rejection_details: Option<String>,
  pub items: Vec<PurchaseLineItem>,
}

/// Row of the purchase history list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseSummary {
  pub id: PurchaseId,
  pub created_at: Option<NaiveDateTime>,
  pub total: Money,
  pub state: PurchaseState,
}

/// Body of the confirm call. An absent discount code is omitted on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConfirmPurchaseRequest {
  #[serde(rename = "codigoDescuento", skip_serializing_if = "Option::is_none")]
  pub discount_code: Option<String>,
}

impl ConfirmPurchaseRequest {
  pub fn with_discount(code: impl Into<String>) -> Self {
    let code = code.into();
    let trimmed = code.trim();
    Self {
      discount_code: (!trimmed.is_empty()).then(|| trimmed.to_string()),
    }
  }
}
