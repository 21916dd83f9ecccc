// ventas/src/auth/credentials.rs

use crate::error::ClassifiedError;
use std::fmt;
use tokio::sync::watch;
use tracing::{event, Level};

/// A bearer token. Never blank; redacted in `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
  pub fn new(raw: impl AsRef<str>) -> Option<Self> {
    let trimmed = raw.as_ref().trim();
    (!trimmed.is_empty()).then(|| BearerToken(trimmed.to_string()))
  }

  pub fn expose(&self) -> &str {
    &self.0
  }
}

impl fmt::Debug for BearerToken {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("BearerToken([REDACTED])")
  }
}

/// The authentication context a request runs under: a bearer token, and/or a
/// development client id sent as `X-Cliente-Id` when the dev fallback is on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthContext {
  pub token: Option<BearerToken>,
  pub dev_client_id: Option<String>,
  pub dev_fallback: bool,
}

impl AuthContext {
  pub fn anonymous() -> Self {
    Self::default()
  }

  pub fn bearer(token: impl AsRef<str>) -> Self {
    Self {
      token: BearerToken::new(token),
      ..Self::default()
    }
  }

  /// Attaches a development client id. Only counts as a credential when
  /// `fallback_enabled` is true.
  pub fn with_dev_client(mut self, client_id: impl AsRef<str>, fallback_enabled: bool) -> Self {
    let trimmed = client_id.as_ref().trim();
    self.dev_client_id = (!trimmed.is_empty()).then(|| trimmed.to_string());
    self.dev_fallback = fallback_enabled;
    self
  }

  pub fn is_present(&self) -> bool {
    self.token.is_some() || (self.dev_fallback && self.dev_client_id.is_some())
  }

  /// `AUTH_TOKEN_MISSING` when no usable credential exists. No network involved.
  pub fn require(&self) -> Result<(), ClassifiedError> {
    if self.is_present() {
      Ok(())
    } else {
      Err(ClassifiedError::auth_token_missing())
    }
  }

  /// The `X-Cliente-Id` value to send, if any: sent whenever the dev fallback
  /// is on, or when there is no bearer token.
  pub fn client_id_header(&self) -> Option<&str> {
    if self.dev_fallback || self.token.is_none() {
      self.dev_client_id.as_deref()
    } else {
      None
    }
  }
}

/// Source of the current authentication context.
///
/// `subscribe` is the change listener: every receiver observes each new
/// context the provider publishes.
pub trait CredentialProvider: Send + Sync + 'static {
  fn current(&self) -> AuthContext;

  fn subscribe(&self) -> watch::Receiver<AuthContext>;
}

/// A fixed context that never changes.
#[derive(Debug)]
pub struct StaticCredentials {
  sender: watch::Sender<AuthContext>,
}

impl StaticCredentials {
  pub fn new(ctx: AuthContext) -> Self {
    let (sender, _rx) = watch::channel(ctx);
    Self { sender }
  }
}

impl CredentialProvider for StaticCredentials {
  fn current(&self) -> AuthContext {
    self.sender.borrow().clone()
  }

  fn subscribe(&self) -> watch::Receiver<AuthContext> {
    self.sender.subscribe()
  }
}

/// A settable context. Initialized once, then updated as the identity provider
/// signs in, refreshes or signs out. Subscribers are only notified when the
/// context actually changes.
#[derive(Debug)]
pub struct SharedCredentials {
  sender: watch::Sender<AuthContext>,
}

impl SharedCredentials {
  pub fn new(initial: AuthContext) -> Self {
    let (sender, _rx) = watch::channel(initial);
    Self { sender }
  }

  pub fn set(&self, ctx: AuthContext) {
    let changed = self.sender.send_if_modified(|current| {
      if *current == ctx {
        false
      } else {
        *current = ctx;
        true
      }
    });
    if changed {
      event!(Level::DEBUG, "Authentication context changed.");
    }
  }

  /// Replaces only the bearer token, keeping the dev client settings.
  pub fn set_token(&self, token: Option<&str>) {
    let mut next = self.current();
    next.token = token.and_then(BearerToken::new);
    self.set(next);
  }

  pub fn sign_out(&self) {
    self.set_token(None);
  }
}

impl Default for SharedCredentials {
  fn default() -> Self {
    Self::new(AuthContext::anonymous())
  }
}

impl CredentialProvider for SharedCredentials {
  fn current(&self) -> AuthContext {
    self.sender.borrow().clone()
  }

  fn subscribe(&self) -> watch::Receiver<AuthContext> {
    self.sender.subscribe()
  }
}
