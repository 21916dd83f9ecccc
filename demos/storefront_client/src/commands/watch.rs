// demos/storefront_client/src/commands/watch.rs

use crate::errors::{AppError, Result};
use crate::render;
use crate::state::AppState;
use tracing::{info, instrument, warn};
use ventas::{PurchaseId, PurchaseViewState, ResolutionPhase, StatusResolver};

/// Follows one purchase until it settles or errors, printing progress. Ctrl-C
/// disposes the resolver and ends the command.
#[instrument(name = "command::watch", skip(state))]
pub async fn run(state: &AppState, raw_id: &str, json: bool) -> Result<()> {
  let Some(id) = PurchaseId::parse(raw_id) else {
    return Err(AppError::Config("purchase id must not be blank".to_string()));
  };
  let resolver = state.resolver();
  resolver.watch_purchase(Some(id));
  follow(&resolver, json).await
}

pub async fn follow(resolver: &StatusResolver, json: bool) -> Result<()> {
  let mut views = resolver.subscribe();
  let mut last_line: Option<String> = None;

  let final_view = loop {
    let view = views.borrow_and_update().clone();
    if !json {
      if let Some(line) = render::render_progress(&view) {
        if last_line.as_deref() != Some(line.as_str()) {
          println!("{}", line);
          last_line = Some(line);
        }
      }
    }
    if view.is_resolved() || view.phase == ResolutionPhase::Idle {
      break view;
    }

    tokio::select! {
      changed = views.changed() => {
        if changed.is_err() {
          break resolver.view();
        }
      }
      _ = tokio::signal::ctrl_c() => {
        warn!("Interrupted; stopping purchase resolution.");
        resolver.dispose();
        return Ok(());
      }
    }
  };

  report(&final_view, json)
}

fn report(view: &PurchaseViewState, json: bool) -> Result<()> {
  if json {
    match serde_json::to_string_pretty(view) {
      Ok(body) => println!("{}", body),
      Err(e) => warn!(error = %e, "Could not serialize the purchase view."),
    }
  } else if let Some(detail) = &view.detail {
    println!("{}", render::render_detail(detail));
  }

  match &view.error {
    Some(err) => Err(AppError::Purchase(err.clone())),
    None => {
      info!(phase = ?view.phase, attempts = view.poll_attempts, "Purchase resolution finished.");
      Ok(())
    }
  }
}
