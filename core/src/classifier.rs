// ventas/src/classifier.rs

//! Maps raw failures into `ClassifiedError`.
//!
//! Rules, highest priority first:
//! 1. an explicit code in the backend payload (`code`, `errorCode`, or the
//!    rejection reason `motivoRechazo`) is used verbatim;
//! 2. otherwise a known HTTP status becomes `HTTP_<status>`;
//! 3. otherwise the failure is `NETWORK_ERROR`.
//!
//! A missing credential never reaches the network and is always
//! `AUTH_TOKEN_MISSING` with status 401.

use crate::error::{ClassifiedError, ErrorCode};
use serde_json::{Map, Value};
use tracing::{event, Level};

const PAYLOAD_CODE_KEYS: [&str; 3] = ["code", "errorCode", "motivoRechazo"];
const PAYLOAD_MESSAGE_KEYS: [&str; 2] = ["message", "error"];

/// A failure as observed at a boundary, before classification.
#[derive(Debug)]
pub enum RawFailure {
  /// A credential was required and the auth context had none.
  MissingCredential,
  /// The request never produced a usable response (connect, timeout, decode).
  Transport { message: String, status: Option<u16> },
  /// A non-success response. `body` is the raw response text, possibly empty.
  Http { status: u16, body: String },
  /// Already classified; passes through unchanged.
  Classified(ClassifiedError),
}

impl From<ClassifiedError> for RawFailure {
  fn from(err: ClassifiedError) -> Self {
    RawFailure::Classified(err)
  }
}

pub fn classify(raw: RawFailure) -> ClassifiedError {
  let classified = match raw {
    RawFailure::Classified(already) => return already,
    RawFailure::MissingCredential => ClassifiedError::auth_token_missing(),
    RawFailure::Transport { message, status } => match status {
      Some(status) => ClassifiedError::new(ErrorCode::Http(status))
        .with_status(status)
        .with_message(message),
      None => ClassifiedError::network(message),
    },
    RawFailure::Http { status, body } => classify_http(status, &body),
  };
  event!(Level::DEBUG, code = %classified.code, http_status = ?classified.http_status, "Failure classified.");
  classified
}

fn classify_http(status: u16, body: &str) -> ClassifiedError {
  let trimmed = body.trim();
  let payload = parse_payload(trimmed);

  let code = payload
    .as_ref()
    .and_then(payload_code)
    .map(|c| ErrorCode::parse(&c))
    .unwrap_or(ErrorCode::Http(status));

  let message = match &payload {
    Some(map) => payload_message(map).unwrap_or_else(|| format!("HTTP {}", status)),
    None if !trimmed.is_empty() => trimmed.to_string(),
    None => format!("HTTP {}", status),
  };

  let mut classified = ClassifiedError::new(code).with_status(status).with_message(message);
  if let Some(map) = payload {
    classified = classified.with_details(Value::Object(map));
  }
  classified
}

/// Only JSON objects count as payloads; arrays or scalars are treated as text.
fn parse_payload(body: &str) -> Option<Map<String, Value>> {
  if body.is_empty() {
    return None;
  }
  match serde_json::from_str::<Value>(body) {
    Ok(Value::Object(map)) => Some(map),
    _ => None,
  }
}

/// First non-blank code in priority order. Numeric codes are stringified.
pub fn payload_code(payload: &Map<String, Value>) -> Option<String> {
  PAYLOAD_CODE_KEYS.iter().find_map(|key| scalar_string(payload.get(*key)?))
}

fn payload_message(payload: &Map<String, Value>) -> Option<String> {
  PAYLOAD_MESSAGE_KEYS.iter().find_map(|key| scalar_string(payload.get(*key)?))
}

fn scalar_string(value: &Value) -> Option<String> {
  match value {
    Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
    Value::Number(n) => Some(n.to_string()),
    _ => None,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn payload_code_prefers_code_then_error_code_then_rejection_reason() {
    let all = json!({ "code": "A", "errorCode": "B", "motivoRechazo": "C" });
    assert_eq!(payload_code(all.as_object().unwrap()).as_deref(), Some("A"));

    let no_code = json!({ "code": "  ", "errorCode": "B", "motivoRechazo": "C" });
    assert_eq!(payload_code(no_code.as_object().unwrap()).as_deref(), Some("B"));

    let only_reason = json!({ "motivoRechazo": "STOCK_INSUFICIENTE" });
    assert_eq!(
      payload_code(only_reason.as_object().unwrap()).as_deref(),
      Some("STOCK_INSUFICIENTE")
    );
  }

  #[test]
  fn numeric_codes_are_stringified() {
    let payload = json!({ "errorCode": 4021 });
    assert_eq!(payload_code(payload.as_object().unwrap()).as_deref(), Some("4021"));
  }

  #[test]
  fn plain_text_body_becomes_message() {
    let err = classify(RawFailure::Http {
      status: 502,
      body: "Bad Gateway".to_string(),
    });
    assert_eq!(err.code, ErrorCode::Http(502));
    assert_eq!(err.raw_message.as_deref(), Some("Bad Gateway"));
    assert!(err.details.is_none());
  }

  #[test]
  fn json_array_body_is_not_a_payload() {
    let err = classify(RawFailure::Http {
      status: 400,
      body: "[\"x\"]".to_string(),
    });
    assert_eq!(err.code, ErrorCode::Http(400));
    assert!(err.details.is_none());
  }
}
