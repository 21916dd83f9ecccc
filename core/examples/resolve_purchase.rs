// ventas/examples/resolve_purchase.rs

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use ventas::{
  AuthContext, ClassifiedError, ConfirmPurchaseRequest, Money, PurchaseDetail, PurchaseGateway, PurchaseId,
  PurchaseRef, PurchaseState, PurchaseSummary, ResolverConfig, SharedCredentials, StatusResolver,
};

// 1. An in-memory sales service: the purchase stays PENDIENTE for a few reads,
//    then stock validation confirms it.
struct InMemorySales {
  reads_until_confirmed: Mutex<u32>,
}

#[async_trait]
impl PurchaseGateway for InMemorySales {
  async fn confirm_purchase(
    &self,
    request: &ConfirmPurchaseRequest,
    auth: &AuthContext,
  ) -> Result<PurchaseRef, ClassifiedError> {
    auth.require()?;
    info!(discount = ?request.discount_code, "Cart confirmed.");
    Ok(PurchaseRef {
      purchase_id: PurchaseId::parse("c-1001").expect("literal id"),
      created_at: None,
      total: Money::from_cents(4_500_00),
      state: PurchaseState::Pending,
    })
  }

  async fn get_purchase(&self, id: &PurchaseId, auth: &AuthContext) -> Result<PurchaseDetail, ClassifiedError> {
    auth.require()?;
    let mut left = self.reads_until_confirmed.lock();
    let state = if *left == 0 {
      PurchaseState::Confirmed
    } else {
      *left -= 1;
      PurchaseState::Pending
    };
    Ok(PurchaseDetail {
      id: id.clone(),
      created_at: None,
      subtotal: Money::from_cents(5_000_00),
      discount_applied: Money::from_cents(500_00),
      total: Money::from_cents(4_500_00),
      state,
      rejection_reason: None,
      rejection_details: None,
      items: Vec::new(),
    })
  }

  async fn list_purchases(&self, _auth: &AuthContext) -> Result<Vec<PurchaseSummary>, ClassifiedError> {
    Ok(Vec::new())
  }
}

#[tokio::main]
async fn main() -> Result<(), ClassifiedError> {
  tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();

  info!("--- Purchase Resolution Example ---");

  // 2. Wire the gateway, a credential source and the resolver.
  let sales = Arc::new(InMemorySales {
    reads_until_confirmed: Mutex::new(3),
  });
  let credentials = Arc::new(SharedCredentials::new(AuthContext::bearer("demo-token")));
  let config = ResolverConfig {
    poll_interval: Duration::from_millis(200),
    ..ResolverConfig::default()
  };
  let resolver = StatusResolver::new(sales.clone(), credentials, config);

  // 3. Confirm the cart, then bind the returned purchase id.
  let purchase = sales
    .confirm_purchase(&ConfirmPurchaseRequest::with_discount("VERANO10"), &AuthContext::bearer("demo-token"))
    .await?;
  resolver.watch_purchase(Some(purchase.purchase_id.clone()));

  // 4. Follow the view until it settles.
  let mut views = resolver.subscribe();
  loop {
    let view = views.borrow_and_update().clone();
    info!(
      phase = ?view.phase,
      attempts = view.poll_attempts,
      state = ?view.detail.as_ref().map(|d| d.state.to_string()),
      "View updated."
    );
    if view.is_resolved() {
      break;
    }
    if views.changed().await.is_err() {
      break;
    }
  }

  let final_view = resolver.view();
  info!(final_state = ?final_view.detail.map(|d| d.state), "Resolution finished.");
  Ok(())
}
