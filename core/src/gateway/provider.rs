// ventas/src/gateway/provider.rs

//! Defines the `PurchaseGateway` port.

use crate::auth::AuthContext;
use crate::core::model::{ConfirmPurchaseRequest, PurchaseDetail, PurchaseId, PurchaseRef, PurchaseSummary};
use crate::error::ClassifiedError;
use async_trait::async_trait;

/// Purchase operations offered by the sales service.
///
/// Every failure comes back already classified. Implementations must return
/// `AUTH_TOKEN_MISSING` without touching the network when `auth` carries no
/// usable credential.
#[async_trait]
pub trait PurchaseGateway: Send + Sync + 'static {
  /// Submits the caller's cart for purchase.
  async fn confirm_purchase(
    &self,
    request: &ConfirmPurchaseRequest,
    auth: &AuthContext,
  ) -> Result<PurchaseRef, ClassifiedError>;

  async fn get_purchase(&self, id: &PurchaseId, auth: &AuthContext) -> Result<PurchaseDetail, ClassifiedError>;

  async fn list_purchases(&self, auth: &AuthContext) -> Result<Vec<PurchaseSummary>, ClassifiedError>;
}
