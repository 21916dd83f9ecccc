// ventas/src/resolver/session.rs

//! Bookkeeping for one bounded polling sequence.

use crate::core::model::PurchaseId;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cancellation flag of one resolver run. Checked, under the resolver lock,
/// before every state write that follows an await.
#[derive(Debug, Clone)]
pub(crate) struct RunToken {
  pub(crate) generation: u64,
  cancelled: Arc<AtomicBool>,
}

impl RunToken {
  pub(crate) fn new(generation: u64) -> Self {
    Self {
      generation,
      cancelled: Arc::new(AtomicBool::new(false)),
    }
  }

  pub(crate) fn cancel(&self) {
    self.cancelled.store(true, Ordering::SeqCst);
  }

  pub(crate) fn is_cancelled(&self) -> bool {
    self.cancelled.load(Ordering::SeqCst)
  }
}

/// One polling sequence for one purchase id. Shares its cancellation flag with
/// the run that created it. Never schedules once cancelled or exhausted.
#[derive(Debug)]
pub(crate) struct PollingSession {
  purchase_id: PurchaseId,
  attempts_made: u32,
  max_attempts: u32,
  cancelled: Arc<AtomicBool>,
}

impl PollingSession {
  pub(crate) fn new(purchase_id: PurchaseId, max_attempts: u32, run: &RunToken) -> Self {
    Self {
      purchase_id,
      attempts_made: 0,
      max_attempts,
      cancelled: Arc::clone(&run.cancelled),
    }
  }

  pub(crate) fn record_attempt(&mut self) -> u32 {
    self.attempts_made = self.attempts_made.saturating_add(1);
    self.attempts_made
  }

  pub(crate) fn attempts_made(&self) -> u32 {
    self.attempts_made
  }

  pub(crate) fn is_exhausted(&self) -> bool {
    self.attempts_made >= self.max_attempts
  }

  pub(crate) fn can_schedule(&self) -> bool {
    !self.cancelled.load(Ordering::SeqCst) && !self.is_exhausted()
  }

  pub(crate) fn cancel(&self) {
    self.cancelled.store(true, Ordering::SeqCst);
  }

  pub(crate) fn handle(&self) -> SessionHandle {
    SessionHandle {
      purchase_id: self.purchase_id.clone(),
      attempts_made: self.attempts_made,
      max_attempts: self.max_attempts,
      cancelled: Arc::clone(&self.cancelled),
    }
  }
}

/// Read-only view of a polling session. `attempts_made` is captured when the
/// handle is taken; `is_cancelled` is live.
#[derive(Debug, Clone)]
pub struct SessionHandle {
  pub purchase_id: PurchaseId,
  pub attempts_made: u32,
  pub max_attempts: u32,
  cancelled: Arc<AtomicBool>,
}

impl SessionHandle {
  pub fn is_cancelled(&self) -> bool {
    self.cancelled.load(Ordering::SeqCst)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn session_stops_scheduling_at_budget() {
    let run = RunToken::new(1);
    let mut session = PollingSession::new(PurchaseId::parse("p1").unwrap(), 2, &run);
    assert!(session.can_schedule());
    session.record_attempt();
    assert!(session.can_schedule());
    session.record_attempt();
    assert!(session.is_exhausted());
    assert!(!session.can_schedule());
  }

  #[test]
  fn cancelling_the_run_cancels_the_session() {
    let run = RunToken::new(7);
    let session = PollingSession::new(PurchaseId::parse("p1").unwrap(), 10, &run);
    let handle = session.handle();
    run.cancel();
    assert!(!session.can_schedule());
    assert!(handle.is_cancelled());
  }
}
