// ventas/src/core/control.rs

//! Signals for driving the resolver and the phase it reports.

/// Decision taken after each poll response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollControl {
  /// Still awaiting validation and attempts remain: schedule another fetch.
  Continue,
  /// A terminal state was observed or the attempt budget ran out.
  Stop,
}

/// Where the resolver is for the current purchase id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionPhase {
  /// No purchase id bound.
  #[default]
  Idle,
  /// Initial fetch in flight.
  Fetching,
  /// Awaiting the stock decision; re-fetching on a fixed delay.
  Polling,
  /// Latest detail is final for this id (including an exhausted poll).
  Settled,
  /// A classified error ended the run.
  Errored,
}

impl ResolutionPhase {
  /// Settled and Errored end a run; nothing further is scheduled.
  pub fn is_resolved(&self) -> bool {
    matches!(self, ResolutionPhase::Settled | ResolutionPhase::Errored)
  }

  /// A run is fetching or polling.
  pub fn is_active(&self) -> bool {
    matches!(self, ResolutionPhase::Fetching | ResolutionPhase::Polling)
  }
}
