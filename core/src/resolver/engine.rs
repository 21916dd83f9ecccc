// ventas/src/resolver/engine.rs

//! `StatusResolver`: owns the view state of one purchase and drives the
//! fetch-then-poll run for whichever id is currently bound.
//!
//! Every (re)bind, credential change or disposal cancels the previous run
//! before anything else happens. Runs are spawned tasks; each carries a
//! `RunToken` that is checked under the resolver lock right before any write,
//! so a cancelled run can never touch the view again, even if its network
//! call completes afterwards.

use crate::auth::{AuthContext, CredentialProvider};
use crate::core::control::{PollControl, ResolutionPhase};
use crate::core::model::{PurchaseDetail, PurchaseId};
use crate::core::view::PurchaseViewState;
use crate::error::ClassifiedError;
use crate::gateway::PurchaseGateway;
use crate::resolver::config::ResolverConfig;
use crate::resolver::session::{PollingSession, RunToken, SessionHandle};
use parking_lot::Mutex;
use std::sync::{Arc, Weak};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{event, instrument, Level};

/// Resolves the status of one purchase at a time.
///
/// Consumers bind an id with [`watch_purchase`](Self::watch_purchase) and
/// observe [`PurchaseViewState`] through [`subscribe`](Self::subscribe) or
/// [`view`](Self::view). Dropping the resolver disposes it.
///
/// Must be created inside a Tokio runtime.
pub struct StatusResolver {
  shared: Arc<Shared>,
}

struct Shared {
  gateway: Arc<dyn PurchaseGateway>,
  credentials: Arc<dyn CredentialProvider>,
  config: ResolverConfig,
  view: watch::Sender<PurchaseViewState>,
  inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
  purchase_id: Option<PurchaseId>,
  run: Option<ActiveRun>,
  session: Option<PollingSession>,
  follower: Option<JoinHandle<()>>,
  /// Bumped on every bind or credential change. Refresh results from an
  /// older generation are discarded.
  generation: u64,
  /// Bumped on every view write. A refresh applies only if nothing else
  /// was written while its request was in flight.
  writes: u64,
  disposed: bool,
}

struct ActiveRun {
  token: RunToken,
  /// `None` when the run resolved synchronously (missing credential).
  task: Option<JoinHandle<()>>,
}

impl ActiveRun {
  fn halt(mut self) {
    self.token.cancel();
    if let Some(task) = self.task.take() {
      task.abort();
    }
  }
}

impl Inner {
  /// Cancels the active run and its polling session, if any.
  fn stop_run(&mut self) {
    if let Some(run) = self.run.take() {
      event!(Level::TRACE, generation = run.token.generation, "Cancelling resolver run.");
      run.halt();
    }
    if let Some(session) = self.session.take() {
      session.cancel();
    }
  }
}

impl StatusResolver {
  pub fn new(
    gateway: Arc<dyn PurchaseGateway>,
    credentials: Arc<dyn CredentialProvider>,
    config: ResolverConfig,
  ) -> Self {
    let (view, _initial_rx) = watch::channel(PurchaseViewState::idle());
    let changes = credentials.subscribe();
    let shared = Arc::new(Shared {
      gateway,
      credentials,
      config,
      view,
      inner: Mutex::new(Inner::default()),
    });
    let follower = spawn_credential_follower(Arc::downgrade(&shared), changes);
    shared.inner.lock().follower = Some(follower);
    event!(Level::DEBUG, config = ?shared.config, "StatusResolver created.");
    Self { shared }
  }

  pub fn config(&self) -> &ResolverConfig {
    &self.shared.config
  }

  /// Binds the resolver to `id`, or to nothing with `None`.
  ///
  /// Cancels whatever was running. Binding a different id clears the previous
  /// detail; re-binding the same id keeps it until the new fetch lands.
  /// Re-binding the id that is still being fetched or polled is a no-op.
  #[instrument(name = "StatusResolver::watch_purchase", skip_all, fields(purchase_id = ?id.as_ref().map(PurchaseId::as_str)))]
  pub fn watch_purchase(&self, id: Option<PurchaseId>) {
    let mut inner = self.shared.inner.lock();
    if inner.disposed {
      event!(Level::WARN, "watch_purchase called on a disposed resolver; ignored.");
      return;
    }
    let keep_detail = inner.purchase_id == id;
    if keep_detail && id.is_some() && self.shared.view.borrow().phase.is_active() {
      event!(Level::DEBUG, "Purchase already being resolved; binding unchanged.");
      return;
    }
    inner.purchase_id = id;
    self.shared.start_run(&mut inner, keep_detail);
  }

  pub fn purchase_id(&self) -> Option<PurchaseId> {
    self.shared.inner.lock().purchase_id.clone()
  }

  /// Snapshot of the current view state.
  pub fn view(&self) -> PurchaseViewState {
    self.shared.view.borrow().clone()
  }

  pub fn subscribe(&self) -> watch::Receiver<PurchaseViewState> {
    self.shared.view.subscribe()
  }

  /// The active polling session, if one is running.
  pub fn session(&self) -> Option<SessionHandle> {
    self.shared.inner.lock().session.as_ref().map(PollingSession::handle)
  }

  /// Waits until the current run settles, errors, or the resolver is idle,
  /// and returns that view.
  ///
  /// Not meant to be awaited across `dispose`: a run cut short by disposal
  /// never resolves.
  pub async fn wait_until_resolved(&self) -> PurchaseViewState {
    let mut rx = self.shared.view.subscribe();
    let resolved = rx
      .wait_for(|view| view.phase == ResolutionPhase::Idle || view.phase.is_resolved())
      .await
      .map(|view| view.clone());
    resolved.unwrap_or_else(|_| self.view())
  }

  /// Re-fetches the bound purchase once, outside of any poll.
  ///
  /// On success the detail is replaced and the error cleared; a running poll
  /// keeps going. On failure the error is recorded and any poll is stopped.
  /// Results for an id that was re-bound meanwhile, or that arrive after a
  /// newer write to the view, are returned but not applied. `Ok(None)` when
  /// nothing is bound.
  ///
  /// # Errors
  ///
  /// The classified failure of the fetch, including `AUTH_TOKEN_MISSING`
  /// when no credential is available.
  #[instrument(name = "StatusResolver::refresh", skip_all, err(Display))]
  pub async fn refresh(&self) -> Result<Option<PurchaseDetail>, ClassifiedError> {
    let shared = &self.shared;
    let (generation, writes, id) = {
      let inner = shared.inner.lock();
      match (&inner.purchase_id, inner.disposed) {
        (Some(id), false) => (inner.generation, inner.writes, id.clone()),
        _ => return Ok(None),
      }
    };

    let auth = shared.credentials.current();
    let outcome = match auth.require() {
      Ok(()) => shared.gateway.get_purchase(&id, &auth).await,
      Err(err) => Err(err),
    };

    let mut inner = shared.inner.lock();
    if inner.disposed || inner.generation != generation {
      event!(Level::DEBUG, purchase_id = %id, "Refresh result belongs to a superseded binding; not applied.");
      return outcome.map(Some);
    }
    if inner.writes != writes {
      event!(Level::DEBUG, purchase_id = %id, "View changed while refreshing; refresh result not applied.");
      return outcome.map(Some);
    }
    inner.writes += 1;
    match &outcome {
      Ok(detail) => shared.view.send_modify(|view| {
        view.detail = Some(detail.clone());
        view.error = None;
        if view.phase == ResolutionPhase::Errored {
          view.phase = ResolutionPhase::Settled;
        }
      }),
      Err(err) => {
        inner.stop_run();
        shared.view.send_modify(|view| fail(view, err.clone()));
      }
    }
    outcome.map(Some)
  }

  /// Cancels the active run and stops following credential changes. The view
  /// keeps its last value and is never written again.
  pub fn dispose(&self) {
    let mut inner = self.shared.inner.lock();
    if inner.disposed {
      return;
    }
    inner.disposed = true;
    inner.stop_run();
    if let Some(follower) = inner.follower.take() {
      follower.abort();
    }
    event!(Level::DEBUG, "StatusResolver disposed.");
  }
}

impl Drop for StatusResolver {
  fn drop(&mut self) {
    self.dispose();
  }
}

impl Shared {
  /// Cancels the previous run and starts a new one for `inner.purchase_id`.
  fn start_run(self: &Arc<Self>, inner: &mut Inner, keep_detail: bool) {
    inner.stop_run();
    inner.generation += 1;
    let generation = inner.generation;

    let Some(id) = inner.purchase_id.clone() else {
      self.view.send_replace(PurchaseViewState::idle());
      event!(Level::DEBUG, generation, "No purchase bound; resolver idle.");
      return;
    };

    let auth = self.credentials.current();
    let token = RunToken::new(generation);

    if let Err(err) = auth.require() {
      event!(Level::WARN, purchase_id = %id, "No credential available; purchase not fetched.");
      self.view.send_modify(|view| {
        reset_for(view, &id, keep_detail);
        fail(view, err);
      });
      inner.run = Some(ActiveRun { token, task: None });
      return;
    }

    self.view.send_modify(|view| {
      reset_for(view, &id, keep_detail);
      view.is_loading = true;
      view.phase = ResolutionPhase::Fetching;
    });
    let task = tokio::spawn(Arc::clone(self).resolve(token.clone(), id, auth));
    inner.run = Some(ActiveRun {
      token,
      task: Some(task),
    });
  }

  /// Runs `f` against the lock and the view, unless `token` was cancelled.
  /// The check and the write happen under the same lock acquisition.
  fn apply<R>(&self, token: &RunToken, f: impl FnOnce(&mut Inner, &mut PurchaseViewState) -> R) -> Option<R> {
    let mut inner = self.inner.lock();
    if token.is_cancelled() || inner.disposed {
      event!(Level::TRACE, generation = token.generation, "Dropping write from a cancelled run.");
      return None;
    }
    inner.writes += 1;
    let mut out = None;
    self.view.send_modify(|view| out = Some(f(&mut *inner, view)));
    out
  }

  #[instrument(name = "StatusResolver::resolve", skip_all, fields(purchase_id = %id, generation = token.generation))]
  async fn resolve(self: Arc<Self>, token: RunToken, id: PurchaseId, auth: AuthContext) {
    event!(Level::DEBUG, "Fetching purchase detail.");
    let first = self.gateway.get_purchase(&id, &auth).await;
    if !self.apply_first_fetch(&token, &id, first) {
      return;
    }

    loop {
      tokio::time::sleep(self.config.poll_interval).await;
      let Some(attempt) = self.begin_attempt(&token) else {
        return;
      };
      event!(Level::DEBUG, attempt, max_attempts = self.config.max_attempts, "Polling purchase status.");
      let result = self.gateway.get_purchase(&id, &auth).await;
      match self.apply_poll_result(&token, result) {
        Some(PollControl::Continue) => continue,
        Some(PollControl::Stop) | None => return,
      }
    }
  }

  /// Applies the initial fetch. Returns whether a polling session started.
  fn apply_first_fetch(&self, token: &RunToken, id: &PurchaseId, result: Result<PurchaseDetail, ClassifiedError>) -> bool {
    let policy = self.config.policy;
    let max_attempts = self.config.max_attempts;
    self
      .apply(token, |inner, view| {
        view.is_loading = false;
        match result {
          Err(err) => {
            event!(Level::ERROR, error = %err, "Initial purchase fetch failed.");
            fail(view, err);
            false
          }
          Ok(detail) => {
            let polling = policy.starts_polling(&detail.state) && max_attempts > 0;
            event!(Level::INFO, state = %detail.state, polling, "Purchase detail loaded.");
            view.detail = Some(detail);
            view.error = None;
            if polling {
              inner.session = Some(PollingSession::new(id.clone(), max_attempts, token));
              view.is_polling = true;
              view.poll_attempts = 0;
              view.phase = ResolutionPhase::Polling;
            } else {
              view.phase = ResolutionPhase::Settled;
            }
            polling
          }
        }
      })
      .unwrap_or(false)
  }

  /// Counts one poll fetch. `None` when the session is gone, cancelled or out
  /// of attempts.
  fn begin_attempt(&self, token: &RunToken) -> Option<u32> {
    self
      .apply(token, |inner, view| {
        let session = inner.session.as_mut()?;
        if !session.can_schedule() {
          return None;
        }
        let attempt = session.record_attempt();
        view.poll_attempts = attempt;
        Some(attempt)
      })
      .flatten()
  }

  fn apply_poll_result(&self, token: &RunToken, result: Result<PurchaseDetail, ClassifiedError>) -> Option<PollControl> {
    let policy = self.config.policy;
    self.apply(token, |inner, view| match result {
      Err(err) => {
        event!(Level::ERROR, error = %err, "Poll fetch failed; polling stopped.");
        inner.session = None;
        fail(view, err);
        PollControl::Stop
      }
      Ok(detail) => {
        let keep_polling = policy.keeps_polling(&detail.state);
        let attempts = inner.session.as_ref().map_or(0, PollingSession::attempts_made);
        let exhausted = inner.session.as_ref().map_or(true, PollingSession::is_exhausted);
        view.detail = Some(detail);
        view.error = None;
        if keep_polling && !exhausted {
          return PollControl::Continue;
        }
        if keep_polling {
          event!(Level::WARN, attempts, "Poll attempts exhausted; settling on last known state.");
        } else {
          event!(Level::INFO, attempts, "Purchase reached a terminal state.");
        }
        inner.session = None;
        view.is_polling = false;
        view.phase = ResolutionPhase::Settled;
        PollControl::Stop
      }
    })
  }
}

fn reset_for(view: &mut PurchaseViewState, id: &PurchaseId, keep_detail: bool) {
  if !keep_detail {
    view.detail = None;
  }
  view.purchase_id = Some(id.clone());
  view.error = None;
  view.is_loading = false;
  view.is_polling = false;
  view.poll_attempts = 0;
}

fn fail(view: &mut PurchaseViewState, err: ClassifiedError) {
  view.error = Some(err);
  view.is_loading = false;
  view.is_polling = false;
  view.phase = ResolutionPhase::Errored;
}

/// Re-runs the bound purchase whenever the credential provider publishes a new
/// context. Holds the resolver weakly and exits once it is gone.
fn spawn_credential_follower(shared: Weak<Shared>, mut changes: watch::Receiver<AuthContext>) -> JoinHandle<()> {
  tokio::spawn(async move {
    while changes.changed().await.is_ok() {
      if !rerun_after_credential_change(&shared) {
        break;
      }
    }
  })
}

fn rerun_after_credential_change(shared: &Weak<Shared>) -> bool {
  let Some(shared) = shared.upgrade() else {
    return false;
  };
  let mut inner = shared.inner.lock();
  if inner.disposed {
    return false;
  }
  if inner.purchase_id.is_some() {
    event!(Level::INFO, "Credentials changed; re-resolving purchase.");
    shared.start_run(&mut inner, true);
  }
  true
}
