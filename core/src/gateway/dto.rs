// ventas/src/gateway/dto.rs

//! Wire shapes of the sales service and their mapping into `core::model`.
//!
//! Decoding is lenient: numbers may arrive as strings, fields may be missing
//! or `null`. Missing money is zero, blank rejection text is `None`.

use crate::core::model::{Money, PurchaseDetail, PurchaseId, PurchaseLineItem, PurchaseRef, PurchaseSummary};
use crate::core::state::PurchaseState;
use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PurchaseLineItemDto {
  #[serde(deserialize_with = "lenient_string")]
  pub pelicula_id: Option<String>,
  #[serde(deserialize_with = "lenient_string")]
  pub titulo: Option<String>,
  #[serde(deserialize_with = "lenient_money")]
  pub precio_al_comprar: Money,
  #[serde(deserialize_with = "lenient_count")]
  pub cantidad: u32,
  #[serde(deserialize_with = "lenient_money")]
  pub subtotal: Money,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PurchaseDetailDto {
  #[serde(deserialize_with = "lenient_string")]
  pub compra_id: Option<String>,
  #[serde(deserialize_with = "lenient_string")]
  pub fecha_hora: Option<String>,
  #[serde(deserialize_with = "lenient_money")]
  pub subtotal: Money,
  #[serde(deserialize_with = "lenient_money")]
  pub descuento_aplicado: Money,
  #[serde(deserialize_with = "lenient_money")]
  pub total_final: Money,
  pub estado: PurchaseState,
  #[serde(deserialize_with = "lenient_string")]
  pub motivo_rechazo: Option<String>,
  #[serde(deserialize_with = "lenient_string")]
  pub detalles_rechazo: Option<String>,
  #[serde(deserialize_with = "lenient_items")]
  pub items: Vec<PurchaseLineItemDto>,
}

/// Used for both list rows and the confirm response; they share a shape.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PurchaseSummaryDto {
  #[serde(deserialize_with = "lenient_string")]
  pub compra_id: Option<String>,
  #[serde(deserialize_with = "lenient_string")]
  pub fecha_hora: Option<String>,
  #[serde(deserialize_with = "lenient_money")]
  pub total_final: Money,
  pub estado: PurchaseState,
}

impl PurchaseLineItemDto {
  pub fn into_line_item(self) -> PurchaseLineItem {
    PurchaseLineItem {
      product_id: self.pelicula_id.unwrap_or_default(),
      title: self.titulo.unwrap_or_default(),
      unit_price_at_purchase: self.precio_al_comprar,
      quantity: self.cantidad,
      line_subtotal: self.subtotal,
    }
  }
}

impl PurchaseDetailDto {
  /// A detail without `compraId` keeps the id it was requested under.
  pub fn into_detail(self, requested: &PurchaseId) -> PurchaseDetail {
    PurchaseDetail {
      id: self
        .compra_id
        .and_then(PurchaseId::parse)
        .unwrap_or_else(|| requested.clone()),
      created_at: self.fecha_hora.as_deref().and_then(parse_timestamp),
      subtotal: self.subtotal,
      discount_applied: self.descuento_aplicado,
      total: self.total_final,
      state: self.estado,
      rejection_reason: self.motivo_rechazo,
      rejection_details: self.detalles_rechazo,
      items: self.items.into_iter().map(PurchaseLineItemDto::into_line_item).collect(),
    }
  }
}

impl PurchaseSummaryDto {
  /// `None` when the row carries no usable id.
  pub fn into_summary(self) -> Option<PurchaseSummary> {
    Some(PurchaseSummary {
      id: self.compra_id.and_then(PurchaseId::parse)?,
      created_at: self.fecha_hora.as_deref().and_then(parse_timestamp),
      total: self.total_final,
      state: self.estado,
    })
  }

  pub fn into_purchase_ref(self) -> Option<PurchaseRef> {
    let summary = self.into_summary()?;
    Some(PurchaseRef {
      purchase_id: summary.id,
      created_at: summary.created_at,
      total: summary.total,
      state: summary.state,
    })
  }
}

/// RFC 3339 with an offset (normalized to UTC) or a naive ISO local date-time.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
  let trimmed = raw.trim();
  if trimmed.is_empty() {
    return None;
  }
  if let Ok(with_offset) = DateTime::parse_from_rfc3339(trimmed) {
    return Some(with_offset.naive_utc());
  }
  ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
    .iter()
    .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
}

fn value_as_f64(value: &Value) -> Option<f64> {
  match value {
    Value::Number(n) => n.as_f64(),
    Value::String(s) => s.trim().parse::<f64>().ok(),
    _ => None,
  }
}

fn lenient_money<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Money, D::Error> {
  let value = Value::deserialize(deserializer)?;
  Ok(value_as_f64(&value).map(Money::from_units).unwrap_or(Money::ZERO))
}

fn lenient_count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
  let value = Value::deserialize(deserializer)?;
  Ok(match value_as_f64(&value) {
    Some(n) if n.is_finite() && n > 0.0 => n.min(u32::MAX as f64) as u32,
    _ => 0,
  })
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
  let value = Value::deserialize(deserializer)?;
  Ok(match value {
    Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
    Value::Number(n) => Some(n.to_string()),
    _ => None,
  })
}

/// Anything other than an array is an empty item list.
fn lenient_items<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<PurchaseLineItemDto>, D::Error> {
  let value = Value::deserialize(deserializer)?;
  match value {
    Value::Array(raw_items) => Ok(
      raw_items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect(),
    ),
    _ => Ok(Vec::new()),
  }
}
