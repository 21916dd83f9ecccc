// tests/common/mod.rs
#![allow(dead_code)] // Allow unused code in this common test module

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::Level;
use ventas::error::domain;
use ventas::{
  AuthContext, ClassifiedError, ConfirmPurchaseRequest, ErrorCode, Money, PurchaseDetail, PurchaseGateway, PurchaseId,
  PurchaseRef, PurchaseState, PurchaseSummary, PurchaseViewState, ResolutionPhase, SharedCredentials, StatusResolver,
};

pub type Reply = Result<PurchaseDetail, ClassifiedError>;

// --- Scripted gateway ---

/// In-memory `PurchaseGateway`. Each purchase id has a queue of replies; the
/// last reply repeats once the queue is down to one. Unscripted ids answer
/// `COMPRA_NO_ENCONTRADA` / 404. Replies are taken in request order, before
/// any latency elapses.
#[derive(Default)]
pub struct ScriptedGateway {
  scripts: Mutex<HashMap<String, VecDeque<Reply>>>,
  calls: Mutex<Vec<(String, Instant)>>,
  latency: Duration,
  call_delays: Mutex<HashMap<usize, Duration>>,
}

impl ScriptedGateway {
  pub fn new() -> Self {
    Self::default()
  }

  /// Every `get_purchase` sleeps this long before answering.
  pub fn with_latency(latency: Duration) -> Self {
    Self {
      latency,
      ..Self::default()
    }
  }

  /// Extra latency for the `index`-th `get_purchase` call (0-based, any id).
  pub fn delay_call(&self, index: usize, delay: Duration) {
    self.call_delays.lock().insert(index, delay);
  }

  pub fn script(&self, id: &str, replies: Vec<Reply>) {
    self.scripts.lock().insert(id.to_string(), replies.into_iter().collect());
  }

  pub fn call_count(&self) -> usize {
    self.calls.lock().len()
  }

  pub fn calls_for(&self, id: &str) -> usize {
    self.calls.lock().iter().filter(|(called, _)| called == id).count()
  }

  pub fn call_times_for(&self, id: &str) -> Vec<Instant> {
    self
      .calls
      .lock()
      .iter()
      .filter(|(called, _)| called == id)
      .map(|(_, at)| *at)
      .collect()
  }

  fn next_reply(&self, id: &PurchaseId) -> Reply {
    let mut scripts = self.scripts.lock();
    match scripts.get_mut(id.as_str()) {
      Some(queue) if queue.len() > 1 => queue.pop_front().unwrap_or_else(|| Err(not_found())),
      Some(queue) => queue.front().cloned().unwrap_or_else(|| Err(not_found())),
      None => Err(not_found()),
    }
  }
}

#[async_trait]
impl PurchaseGateway for ScriptedGateway {
  async fn confirm_purchase(
    &self,
    _request: &ConfirmPurchaseRequest,
    auth: &AuthContext,
  ) -> Result<PurchaseRef, ClassifiedError> {
    auth.require()?;
    Ok(PurchaseRef {
      purchase_id: pid("c-1"),
      created_at: None,
      total: Money::from_cents(1000),
      state: PurchaseState::Pending,
    })
  }

  async fn get_purchase(&self, id: &PurchaseId, _auth: &AuthContext) -> Result<PurchaseDetail, ClassifiedError> {
    let index = {
      let mut calls = self.calls.lock();
      calls.push((id.as_str().to_string(), Instant::now()));
      calls.len() - 1
    };
    let reply = self.next_reply(id);
    let delay = self.latency + self.call_delays.lock().get(&index).copied().unwrap_or_default();
    if !delay.is_zero() {
      tokio::time::sleep(delay).await;
    }
    reply
  }

  async fn list_purchases(&self, auth: &AuthContext) -> Result<Vec<PurchaseSummary>, ClassifiedError> {
    auth.require()?;
    Ok(Vec::new())
  }
}

// --- Builders ---

pub fn pid(raw: &str) -> PurchaseId {
  PurchaseId::parse(raw).expect("test purchase id must not be blank")
}

pub fn detail(id: &str, state: PurchaseState) -> PurchaseDetail {
  PurchaseDetail {
    id: pid(id),
    created_at: None,
    subtotal: Money::from_cents(3000),
    discount_applied: Money::ZERO,
    total: Money::from_cents(3000),
    state,
    rejection_reason: None,
    rejection_details: None,
    items: Vec::new(),
  }
}

pub fn pending(id: &str) -> Reply {
  Ok(detail(id, PurchaseState::Pending))
}

pub fn confirmed(id: &str) -> Reply {
  Ok(detail(id, PurchaseState::Confirmed))
}

pub fn rejected(id: &str, reason: &str) -> Reply {
  let mut rejected = detail(id, PurchaseState::Rejected);
  rejected.rejection_reason = Some(reason.to_string());
  Ok(rejected)
}

pub fn not_found() -> ClassifiedError {
  ClassifiedError::new(ErrorCode::Domain(domain::PURCHASE_NOT_FOUND.to_string())).with_status(404)
}

pub fn signed_in() -> Arc<SharedCredentials> {
  Arc::new(SharedCredentials::new(AuthContext::bearer("test-token")))
}

pub fn anonymous() -> Arc<SharedCredentials> {
  Arc::new(SharedCredentials::new(AuthContext::anonymous()))
}

/// Waits for the resolver to report `phase`.
pub async fn wait_for_phase(resolver: &StatusResolver, phase: ResolutionPhase) -> PurchaseViewState {
  let mut rx = resolver.subscribe();
  let view = rx
    .wait_for(|view| view.phase == phase)
    .await
    .expect("view channel closed")
    .clone();
  view
}

// --- Helper for Tracing Setup (call once per test run if needed) ---
use once_cell::sync::Lazy;
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}
