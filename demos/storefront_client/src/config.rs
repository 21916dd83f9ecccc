// demos/storefront_client/src/config.rs

use crate::errors::{AppError, Result}; // Use AppError specific Result
use dotenvy::dotenv;
use std::env;
use std::time::Duration;
use url::Url;
use ventas::{AuthContext, HttpGatewayConfig, PollPolicy, ResolverConfig};

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:9500";

#[derive(Debug, Clone)]
pub struct AppConfig {
  /// Sales service root, without trailing slash.
  pub api_base_url: Url,
  pub access_token: Option<String>,
  pub cliente_id: Option<String>,
  pub dev_fallback: bool,
  pub request_timeout: Duration,
  pub poll_interval: Duration,
  pub poll_max_attempts: u32,
  pub poll_policy: PollPolicy,
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok(); // Load .env file if present
    let config = Self::from_lookup(|name| env::var(name).ok())?;
    tracing::info!(
      api_base_url = %config.api_base_url,
      has_token = config.access_token.is_some(),
      dev_fallback = config.dev_fallback,
      poll_policy = %config.poll_policy,
      "Application configuration loaded successfully."
    );
    Ok(config)
  }

  /// Builds the configuration from any variable source. Blank values count as unset.
  pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
    let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

    let api_base_url = parse_base_url(get("VENTAS_API_BASE_URL").as_deref());
    let access_token = get("VENTAS_ACCESS_TOKEN");
    let cliente_id = get("VENTAS_CLIENTE_ID");
    let dev_fallback = match get("VENTAS_DEV_FALLBACK") {
      Some(raw) => parse_bool(&raw)
        .ok_or_else(|| AppError::Config(format!("Invalid VENTAS_DEV_FALLBACK value: '{}'", raw)))?,
      None => false,
    };
    let request_timeout = Duration::from_millis(parse_number(get("VENTAS_REQUEST_TIMEOUT_MS"), "VENTAS_REQUEST_TIMEOUT_MS", 15_000)?);
    let poll_interval = Duration::from_millis(parse_number(get("VENTAS_POLL_INTERVAL_MS"), "VENTAS_POLL_INTERVAL_MS", 1_000)?);
    let poll_max_attempts = parse_number(get("VENTAS_POLL_MAX_ATTEMPTS"), "VENTAS_POLL_MAX_ATTEMPTS", 10)?;
    let poll_policy = match get("VENTAS_POLL_POLICY") {
      Some(raw) => raw
        .parse::<PollPolicy>()
        .map_err(|e| AppError::Config(format!("Invalid VENTAS_POLL_POLICY: {}", e)))?,
      None => PollPolicy::default(),
    };

    Ok(Self {
      api_base_url,
      access_token,
      cliente_id,
      dev_fallback,
      request_timeout,
      poll_interval,
      poll_max_attempts,
      poll_policy,
    })
  }

  /// A command-line token wins over the environment.
  pub fn with_token_override(mut self, token: Option<String>) -> Self {
    if let Some(token) = token.filter(|t| !t.trim().is_empty()) {
      self.access_token = Some(token);
    }
    self
  }

  pub fn auth_context(&self) -> AuthContext {
    let base = match &self.access_token {
      Some(token) => AuthContext::bearer(token),
      None => AuthContext::anonymous(),
    };
    match &self.cliente_id {
      Some(id) => base.with_dev_client(id, self.dev_fallback),
      None => base,
    }
  }

  pub fn gateway_config(&self) -> HttpGatewayConfig {
    HttpGatewayConfig {
      base_url: self.api_base_url.clone(),
      request_timeout: self.request_timeout,
    }
  }

  pub fn resolver_config(&self) -> ResolverConfig {
    ResolverConfig {
      poll_interval: self.poll_interval,
      max_attempts: self.poll_max_attempts,
      policy: self.poll_policy,
    }
  }
}

/// Invalid or non-http(s) URLs fall back to the default with a warning.
fn parse_base_url(raw: Option<&str>) -> Url {
  let fallback = || Url::parse(DEFAULT_API_BASE_URL).expect("DEFAULT_API_BASE_URL must be a valid URL");
  let Some(raw) = raw else {
    return fallback();
  };
  match Url::parse(raw) {
    Ok(mut url) if matches!(url.scheme(), "http" | "https") && url.has_host() => {
      let trimmed = url.path().trim_end_matches('/').to_string();
      url.set_path(&trimmed);
      url
    }
    _ => {
      tracing::warn!(value = raw, default = DEFAULT_API_BASE_URL, "Invalid VENTAS_API_BASE_URL; using default.");
      fallback()
    }
  }
}

fn parse_bool(raw: &str) -> Option<bool> {
  match raw.to_ascii_lowercase().as_str() {
    "true" | "1" | "yes" => Some(true),
    "false" | "0" | "no" => Some(false),
    _ => None,
  }
}

fn parse_number<T: std::str::FromStr>(raw: Option<String>, name: &str, default: T) -> Result<T>
where
  T::Err: std::fmt::Display,
{
  match raw {
    Some(raw) => raw
      .parse::<T>()
      .map_err(|e| AppError::Config(format!("Invalid {}: {}", name, e))),
    None => Ok(default),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serial_test::serial;
  use std::collections::HashMap;

  fn config_from(vars: &[(&str, &str)]) -> Result<AppConfig> {
    let map: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    AppConfig::from_lookup(|name| map.get(name).cloned())
  }

  #[test]
  fn defaults_apply_when_nothing_is_set() {
    let config = config_from(&[]).unwrap();
    assert_eq!(config.api_base_url.as_str(), "http://localhost:9500/");
    assert_eq!(config.request_timeout, Duration::from_secs(15));
    assert_eq!(config.poll_interval, Duration::from_millis(1000));
    assert_eq!(config.poll_max_attempts, 10);
    assert_eq!(config.poll_policy, PollPolicy::AwaitPending);
    assert!(!config.dev_fallback);
    assert!(!config.auth_context().is_present());
  }

  #[test]
  fn base_url_trailing_slashes_are_trimmed() {
    let config = config_from(&[("VENTAS_API_BASE_URL", "https://ventas.example.com/api-gw///")]).unwrap();
    assert_eq!(config.api_base_url.as_str(), "https://ventas.example.com/api-gw");
  }

  #[test]
  fn invalid_base_url_falls_back_to_default() {
    let config = config_from(&[("VENTAS_API_BASE_URL", "ftp://ventas.example.com")]).unwrap();
    assert_eq!(config.api_base_url.as_str(), "http://localhost:9500/");
    let config = config_from(&[("VENTAS_API_BASE_URL", "not a url")]).unwrap();
    assert_eq!(config.api_base_url.as_str(), "http://localhost:9500/");
  }

  #[test]
  fn unparsable_numbers_and_bools_are_config_errors() {
    assert!(matches!(
      config_from(&[("VENTAS_POLL_INTERVAL_MS", "soon")]),
      Err(AppError::Config(_))
    ));
    assert!(matches!(
      config_from(&[("VENTAS_DEV_FALLBACK", "maybe")]),
      Err(AppError::Config(_))
    ));
    assert!(matches!(
      config_from(&[("VENTAS_POLL_POLICY", "forever")]),
      Err(AppError::Config(_))
    ));
  }

  #[test]
  fn dev_client_only_counts_with_fallback() {
    let off = config_from(&[("VENTAS_CLIENTE_ID", "cliente-dev-123")]).unwrap();
    assert!(!off.auth_context().is_present());

    let on = config_from(&[("VENTAS_CLIENTE_ID", "cliente-dev-123"), ("VENTAS_DEV_FALLBACK", "true")]).unwrap();
    assert!(on.auth_context().is_present());
    assert_eq!(on.auth_context().client_id_header(), Some("cliente-dev-123"));
  }

  #[test]
  fn cli_token_overrides_environment() {
    let config = config_from(&[("VENTAS_ACCESS_TOKEN", "from-env")])
      .unwrap()
      .with_token_override(Some("from-cli".into()));
    assert_eq!(config.access_token.as_deref(), Some("from-cli"));

    let kept = config_from(&[("VENTAS_ACCESS_TOKEN", "from-env")])
      .unwrap()
      .with_token_override(Some("  ".into()));
    assert_eq!(kept.access_token.as_deref(), Some("from-env"));
  }

  #[test]
  #[serial]
  fn from_env_reads_process_environment() {
    env::set_var("VENTAS_POLL_MAX_ATTEMPTS", "3");
    env::set_var("VENTAS_POLL_POLICY", "await-confirmed");
    let config = AppConfig::from_env();
    env::remove_var("VENTAS_POLL_MAX_ATTEMPTS");
    env::remove_var("VENTAS_POLL_POLICY");

    let config = config.unwrap();
    assert_eq!(config.poll_max_attempts, 3);
    assert_eq!(config.resolver_config().policy, PollPolicy::AwaitConfirmed);
  }
}
