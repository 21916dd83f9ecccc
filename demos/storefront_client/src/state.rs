// demos/storefront_client/src/state.rs
use crate::config::AppConfig;
use crate::errors::Result;
use std::sync::Arc;
use ventas::{HttpPurchaseGateway, SharedCredentials, StatusResolver};

#[derive(Clone)]
pub struct AppState {
  pub gateway: Arc<HttpPurchaseGateway>,
  pub credentials: Arc<SharedCredentials>,
  pub config: Arc<AppConfig>, // Share loaded config
}

impl AppState {
  pub fn build(config: AppConfig) -> Result<Self> {
    let gateway = HttpPurchaseGateway::new(config.gateway_config())?;
    let credentials = SharedCredentials::new(config.auth_context());
    Ok(Self {
      gateway: Arc::new(gateway),
      credentials: Arc::new(credentials),
      config: Arc::new(config),
    })
  }

  /// A resolver bound to this state's gateway and credentials. Must be called
  /// inside the runtime.
  pub fn resolver(&self) -> StatusResolver {
    StatusResolver::new(
      self.gateway.clone(),
      self.credentials.clone(),
      self.config.resolver_config(),
    )
  }
}
