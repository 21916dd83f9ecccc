// ventas/src/gateway/http.rs

//! Reqwest-backed adapter for the sales service.
//!
//! This adapter owns transport details only: URL building, credential
//! headers, timeouts, and turning every failure into a `ClassifiedError`.

use crate::auth::AuthContext;
use crate::classifier::{classify, RawFailure};
use crate::core::model::{ConfirmPurchaseRequest, PurchaseDetail, PurchaseId, PurchaseRef, PurchaseSummary};
use crate::error::{ClassifiedError, ErrorCode};
use crate::gateway::dto::{PurchaseDetailDto, PurchaseSummaryDto};
use crate::gateway::provider::PurchaseGateway;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{event, instrument, Level};

pub const DEFAULT_BASE_URL: &str = "http://localhost:9500";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
pub const CLIENT_ID_HEADER: &str = "X-Cliente-Id";

/// Connection settings for `HttpPurchaseGateway`.
#[derive(Debug, Clone)]
pub struct HttpGatewayConfig {
  /// Sales service root, e.g. `http://localhost:9500`. Trailing slashes are ignored.
  pub base_url: Url,
  pub request_timeout: Duration,
}

impl Default for HttpGatewayConfig {
  fn default() -> Self {
    Self {
      base_url: Url::parse(DEFAULT_BASE_URL).expect("DEFAULT_BASE_URL must be a valid URL"),
      request_timeout: DEFAULT_REQUEST_TIMEOUT,
    }
  }
}

/// `PurchaseGateway` over HTTP with JSON bodies.
#[derive(Debug, Clone)]
pub struct HttpPurchaseGateway {
  client: Client,
  base_url: Url,
}

impl HttpPurchaseGateway {
  /// Builds the adapter with a reqwest client carrying the configured timeout.
  ///
  /// # Errors
  ///
  /// Returns an error when the reqwest client cannot be constructed.
  pub fn new(config: HttpGatewayConfig) -> Result<Self, reqwest::Error> {
    let client = Client::builder().timeout(config.request_timeout).build()?;
    Ok(Self::with_client(client, config.base_url))
  }

  pub fn with_client(client: Client, base_url: Url) -> Self {
    Self {
      client,
      base_url: normalize_base(base_url),
    }
  }

  pub fn base_url(&self) -> &Url {
    &self.base_url
  }

  /// `base_url` + `/api/<segments...>`; each segment is percent-encoded.
  fn endpoint(&self, segments: &[&str]) -> Url {
    let mut url = self.base_url.clone();
    if let Ok(mut path) = url.path_segments_mut() {
      path.pop_if_empty().push("api").extend(segments);
    }
    url
  }

  fn request(&self, method: Method, url: Url, auth: &AuthContext) -> RequestBuilder {
    let mut headers = HeaderMap::new();
    if let Some(token) = &auth.token {
      if let Ok(value) = HeaderValue::from_str(&format!("Bearer {}", token.expose())) {
        headers.insert(AUTHORIZATION, value);
      }
    }
    if let Some(client_id) = auth.client_id_header() {
      if let Ok(value) = HeaderValue::from_str(client_id) {
        headers.insert(CLIENT_ID_HEADER, value);
      }
    }
    if method == Method::POST {
      headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    }
    self.client.request(method, url).headers(headers)
  }

  /// Sends and decodes a JSON body. Non-success statuses, an empty 204 and
  /// undecodable bodies all come back classified.
  async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ClassifiedError> {
    let response = builder.send().await.map_err(map_transport_error)?;
    let status = response.status();

    if !status.is_success() {
      let body = response.text().await.unwrap_or_default();
      return Err(classify(RawFailure::Http {
        status: status.as_u16(),
        body,
      }));
    }
    if status == StatusCode::NO_CONTENT {
      return Err(
        ClassifiedError::new(ErrorCode::Http(status.as_u16()))
          .with_status(status.as_u16())
          .with_message("response carried no content"),
      );
    }

    let bytes = response.bytes().await.map_err(map_transport_error)?;
    serde_json::from_slice::<T>(&bytes).map_err(|err| {
      classify(RawFailure::Transport {
        message: format!("invalid sales service JSON payload: {}", err),
        status: None,
      })
    })
  }
}

#[async_trait]
impl PurchaseGateway for HttpPurchaseGateway {
  #[instrument(name = "HttpPurchaseGateway::confirm_purchase", skip_all, err(Display))]
  async fn confirm_purchase(
    &self,
    request: &ConfirmPurchaseRequest,
    auth: &AuthContext,
  ) -> Result<PurchaseRef, ClassifiedError> {
    auth.require()?;
    let url = self.endpoint(&["carrito", "confirmar"]);
    let dto: PurchaseSummaryDto = self
      .send_json(self.request(Method::POST, url, auth).json(request))
      .await?;
    let purchase = dto
      .into_purchase_ref()
      .ok_or_else(|| ClassifiedError::network("confirm response carried no compraId"))?;
    event!(Level::INFO, purchase_id = %purchase.purchase_id, state = %purchase.state, "Purchase submitted.");
    Ok(purchase)
  }

  #[instrument(name = "HttpPurchaseGateway::get_purchase", skip(self, auth), fields(purchase_id = %id), err(Display))]
  async fn get_purchase(&self, id: &PurchaseId, auth: &AuthContext) -> Result<PurchaseDetail, ClassifiedError> {
    auth.require()?;
    let url = self.endpoint(&["compras", id.as_str()]);
    let dto: PurchaseDetailDto = self.send_json(self.request(Method::GET, url, auth)).await?;
    let detail = dto.into_detail(id);
    event!(Level::DEBUG, state = %detail.state, "Purchase detail fetched.");
    Ok(detail)
  }

  #[instrument(name = "HttpPurchaseGateway::list_purchases", skip_all, err(Display))]
  async fn list_purchases(&self, auth: &AuthContext) -> Result<Vec<PurchaseSummary>, ClassifiedError> {
    auth.require()?;
    let url = self.endpoint(&["compras"]);
    // Anything other than an array is an empty history.
    let raw: serde_json::Value = self.send_json(self.request(Method::GET, url, auth)).await?;
    let rows = match raw {
      serde_json::Value::Array(rows) => rows,
      _ => Vec::new(),
    };
    let total_rows = rows.len();
    let summaries: Vec<PurchaseSummary> = rows
      .into_iter()
      .filter_map(|row| serde_json::from_value::<PurchaseSummaryDto>(row).ok())
      .filter_map(PurchaseSummaryDto::into_summary)
      .collect();
    if summaries.len() != total_rows {
      event!(Level::WARN, dropped = total_rows - summaries.len(), "Dropped purchase rows without a usable id.");
    }
    Ok(summaries)
  }
}

fn normalize_base(mut url: Url) -> Url {
  let trimmed = url.path().trim_end_matches('/').to_string();
  url.set_path(&trimmed);
  url
}

fn map_transport_error(error: reqwest::Error) -> ClassifiedError {
  event!(Level::WARN, error = %error, timeout = error.is_timeout(), "Transport failure talking to the sales service.");
  classify(RawFailure::Transport {
    message: error.to_string(),
    status: error.status().map(|s| s.as_u16()),
  })
}
