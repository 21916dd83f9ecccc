// demos/storefront_client/src/commands/list.rs

use crate::errors::Result;
use crate::render;
use crate::state::AppState;
use tracing::instrument;
use ventas::{CredentialProvider, PurchaseGateway};

#[instrument(name = "command::list", skip(state))]
pub async fn run(state: &AppState, json: bool) -> Result<()> {
  let rows = state.gateway.list_purchases(&state.credentials.current()).await?;
  if json {
    match serde_json::to_string_pretty(&rows) {
      Ok(body) => println!("{}", body),
      Err(e) => tracing::warn!(error = %e, "Could not serialize the purchase list."),
    }
    return Ok(());
  }
  if rows.is_empty() {
    println!("Todavía no tenés compras.");
    return Ok(());
  }
  println!("Mis compras");
  for row in &rows {
    println!("{}", render::render_summary(row));
  }
  Ok(())
}
