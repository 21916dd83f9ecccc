// demos/storefront_client/src/errors.rs

use thiserror::Error;
use ventas::{ClassifiedError, ErrorCode};

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Purchase Error: {0}")]
  Purchase(#[from] ClassifiedError),

  #[error("HTTP Client Error: {0}")]
  Http(#[from] reqwest::Error),
}

impl AppError {
  /// Process exit status for this failure (sysexits-style).
  pub fn exit_status(&self) -> u8 {
    match self {
      AppError::Config(_) => 78,
      AppError::Http(_) => 70,
      AppError::Purchase(err) => match &err.code {
        ErrorCode::AuthTokenMissing | ErrorCode::Http(401) | ErrorCode::Http(403) => 77,
        ErrorCode::NetworkError => 69,
        ErrorCode::Http(status) if *status >= 500 => 69,
        _ => 1,
      },
    }
  }
}

// Define a Result type alias for the application
pub type Result<T, E = AppError> = std::result::Result<T, E>;
