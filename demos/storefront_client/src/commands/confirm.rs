// demos/storefront_client/src/commands/confirm.rs

use crate::commands::watch;
use crate::errors::Result;
use crate::state::AppState;
use tracing::{info, instrument};
use ventas::{ConfirmPurchaseRequest, CredentialProvider, PurchaseGateway};

/// Confirms the cart and, unless `no_watch`, follows the new purchase.
#[instrument(name = "command::confirm", skip(state))]
pub async fn run(state: &AppState, discount: Option<String>, no_watch: bool, json: bool) -> Result<()> {
  let request = match discount {
    Some(code) => ConfirmPurchaseRequest::with_discount(code),
    None => ConfirmPurchaseRequest::default(),
  };
  let purchase = state
    .gateway
    .confirm_purchase(&request, &state.credentials.current())
    .await?;
  info!(purchase_id = %purchase.purchase_id, "Purchase created.");
  println!("Compra #{} registrada.", purchase.purchase_id);

  if no_watch {
    return Ok(());
  }
  let resolver = state.resolver();
  resolver.watch_purchase(Some(purchase.purchase_id));
  watch::follow(&resolver, json).await
}
