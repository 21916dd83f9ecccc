// ventas/src/core/view.rs

//! The consumer-facing snapshot of one purchase resolution.

use crate::core::control::ResolutionPhase;
use crate::core::model::{PurchaseDetail, PurchaseId};
use crate::error::ClassifiedError;
use serde::Serialize;

/// What a display surface needs to render a purchase.
///
/// `detail` keeps the last successful fetch even when `error` is set, so a
/// consumer can show the last known state next to an error banner.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseViewState {
  pub purchase_id: Option<PurchaseId>,
  pub detail: Option<PurchaseDetail>,
  pub is_loading: bool,
  pub error: Option<ClassifiedError>,
  pub is_polling: bool,
  pub phase: ResolutionPhase,
  /// Poll fetches made by the latest polling session.
  pub poll_attempts: u32,
}

impl PurchaseViewState {
  pub fn idle() -> Self {
    Self::default()
  }

  pub fn is_resolved(&self) -> bool {
    self.phase.is_resolved()
  }

  /// Rejection is a valid terminal detail, not an error.
  pub fn is_rejected(&self) -> bool {
    self.detail.as_ref().map_or(false, |d| d.state.is_rejected())
  }
}
