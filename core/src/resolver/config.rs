// ventas/src/resolver/config.rs

use crate::core::state::PurchaseState;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1000);
pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;

/// Which backend states mean "stock validation still pending".
///
/// The sales service has no distinct wire value for "settled after stock
/// validation passed", so this is configurable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PollPolicy {
  /// `PENDIENTE` starts a poll; `CONFIRMADA` and `RECHAZADA` both end it.
  /// `PENDIENTE` and unrecognized states keep it going.
  #[default]
  AwaitPending,
  /// `CONFIRMADA` starts a poll; only `RECHAZADA` ends it early, otherwise
  /// the attempt budget does.
  AwaitConfirmed,
}

impl PollPolicy {
  /// Evaluated on the initial fetch.
  pub fn starts_polling(&self, state: &PurchaseState) -> bool {
    match self {
      PollPolicy::AwaitPending => matches!(state, PurchaseState::Pending),
      PollPolicy::AwaitConfirmed => matches!(state, PurchaseState::Confirmed),
    }
  }

  /// Evaluated on every poll response.
  pub fn keeps_polling(&self, state: &PurchaseState) -> bool {
    match self {
      PollPolicy::AwaitPending => !matches!(state, PurchaseState::Confirmed | PurchaseState::Rejected),
      PollPolicy::AwaitConfirmed => !state.is_rejected(),
    }
  }
}

impl fmt::Display for PollPolicy {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      PollPolicy::AwaitPending => f.write_str("await-pending"),
      PollPolicy::AwaitConfirmed => f.write_str("await-confirmed"),
    }
  }
}

impl FromStr for PollPolicy {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "await-pending" | "pending" => Ok(PollPolicy::AwaitPending),
      "await-confirmed" | "confirmed" => Ok(PollPolicy::AwaitConfirmed),
      other => Err(format!("unknown poll policy '{}'", other)),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConfig {
  /// Delay between one poll response and the next poll request.
  pub poll_interval: Duration,
  /// Poll fetches allowed after the initial fetch.
  pub max_attempts: u32,
  pub policy: PollPolicy,
}

impl Default for ResolverConfig {
  fn default() -> Self {
    Self {
      poll_interval: DEFAULT_POLL_INTERVAL,
      max_attempts: DEFAULT_MAX_ATTEMPTS,
      policy: PollPolicy::default(),
    }
  }
}
