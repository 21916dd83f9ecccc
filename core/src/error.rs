// ventas/src/error.rs

//! The closed failure vocabulary shared by the gateway, the resolver and
//! presentation: `ErrorCode` and the `ClassifiedError` record built from it.

use serde::{Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

pub const AUTH_TOKEN_MISSING: &str = "AUTH_TOKEN_MISSING";
pub const NETWORK_ERROR: &str = "NETWORK_ERROR";

/// Domain codes the sales service is known to send. Any other string in a
/// payload is still accepted verbatim as a `Domain` code.
pub mod domain {
  pub const CART_EMPTY: &str = "CARRITO_VACIO";
  pub const DISCOUNT_INVALID: &str = "DESCUENTO_INVALIDO";
  pub const PURCHASE_NOT_FOUND: &str = "COMPRA_NO_ENCONTRADA";
  pub const CLIENT_NOT_AUTHENTICATED: &str = "CLIENTE_NO_AUTENTICADO";
  pub const STOCK_INSUFFICIENT: &str = "STOCK_INSUFICIENTE";
}

/// Error code of a classified failure.
///
/// Rendered as the wire strings `AUTH_TOKEN_MISSING`, `NETWORK_ERROR`,
/// `HTTP_<status>`, or the domain code itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ErrorCode {
  /// A credential was required and none was available. Detected locally.
  AuthTokenMissing,
  /// Transport failure with no HTTP status.
  NetworkError,
  /// HTTP failure with no more specific domain code.
  Http(u16),
  /// Code supplied by the backend payload, kept verbatim.
  Domain(String),
}

impl ErrorCode {
  /// Parses a wire code string. `HTTP_<nnn>` only maps to `Http` when the
  /// suffix is a valid status number; otherwise it stays a domain code.
  pub fn parse(raw: &str) -> Self {
    match raw {
      AUTH_TOKEN_MISSING => ErrorCode::AuthTokenMissing,
      NETWORK_ERROR => ErrorCode::NetworkError,
      other => match other.strip_prefix("HTTP_").and_then(|s| s.parse::<u16>().ok()) {
        Some(status) => ErrorCode::Http(status),
        None => ErrorCode::Domain(other.to_string()),
      },
    }
  }

  pub fn is_domain(&self, code: &str) -> bool {
    matches!(self, ErrorCode::Domain(c) if c == code)
  }
}

impl fmt::Display for ErrorCode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ErrorCode::AuthTokenMissing => f.write_str(AUTH_TOKEN_MISSING),
      ErrorCode::NetworkError => f.write_str(NETWORK_ERROR),
      ErrorCode::Http(status) => write!(f, "HTTP_{}", status),
      ErrorCode::Domain(code) => f.write_str(code),
    }
  }
}

impl Serialize for ErrorCode {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(self)
  }
}

impl PartialEq<&str> for ErrorCode {
  fn eq(&self, other: &&str) -> bool {
    self.to_string() == *other
  }
}

/// A normalized failure. Every failure boundary (gateway, resolver) builds one
/// of these, so downstream code never inspects transport-specific errors.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(rename_all = "camelCase")]
#[error("{code}{}", message_suffix(.raw_message))]
pub struct ClassifiedError {
  pub code: ErrorCode,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub http_status: Option<u16>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub details: Option<Value>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub raw_message: Option<String>,
}

impl ClassifiedError {
  pub fn new(code: ErrorCode) -> Self {
    Self {
      code,
      http_status: None,
      details: None,
      raw_message: None,
    }
  }

  /// The locally produced "no credential" failure: `AUTH_TOKEN_MISSING`, 401.
  pub fn auth_token_missing() -> Self {
    Self {
      code: ErrorCode::AuthTokenMissing,
      http_status: Some(401),
      details: None,
      raw_message: Some("authentication token is missing".to_string()),
    }
  }

  pub fn network(message: impl Into<String>) -> Self {
    Self {
      code: ErrorCode::NetworkError,
      http_status: None,
      details: None,
      raw_message: Some(message.into()),
    }
  }

  pub fn with_status(mut self, status: u16) -> Self {
    self.http_status = Some(status);
    self
  }

  pub fn with_details(mut self, details: Value) -> Self {
    self.details = Some(details);
    self
  }

  pub fn with_message(mut self, message: impl Into<String>) -> Self {
    self.raw_message = Some(message.into());
    self
  }
}

fn message_suffix(raw_message: &Option<String>) -> String {
  raw_message.as_deref().map(|m| format!(": {}", m)).unwrap_or_default()
}

pub type VentasResult<T, E = ClassifiedError> = std::result::Result<T, E>;
