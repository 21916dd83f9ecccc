// src/lib.rs

//! Ventas: purchase status resolution for a storefront client.
//!
//! After checkout the sales service records a purchase, but the stock decision
//! arrives later. This crate provides:
//!  - A `PurchaseGateway` port with a reqwest-backed adapter for the sales service.
//!  - An error classifier that turns every failure into a `ClassifiedError`.
//!  - A `StatusResolver` that fetches a purchase and, while stock validation is
//!    pending, polls it on a fixed delay with a bounded attempt budget.
//!  - Credential providers the resolver follows, re-running on every change.

pub mod auth;
pub mod classifier;
pub mod core;
pub mod error;
pub mod gateway;
pub mod resolver;

// --- Re-exports for the Public API ---

pub use crate::auth::{AuthContext, BearerToken, CredentialProvider, SharedCredentials, StaticCredentials};
pub use crate::classifier::{classify, RawFailure};
pub use crate::core::control::{PollControl, ResolutionPhase};
pub use crate::core::model::{
  ConfirmPurchaseRequest, Money, PurchaseDetail, PurchaseId, PurchaseLineItem, PurchaseRef, PurchaseSummary,
};
pub use crate::core::state::PurchaseState;
pub use crate::core::view::PurchaseViewState;
pub use crate::error::{ClassifiedError, ErrorCode, VentasResult};
pub use crate::gateway::{HttpGatewayConfig, HttpPurchaseGateway, PurchaseGateway};
pub use crate::resolver::{PollPolicy, ResolverConfig, SessionHandle, StatusResolver};

/*
    Typical flow:
    1. Build an `HttpPurchaseGateway` from `HttpGatewayConfig`.
    2. Wrap the identity provider's token in a `SharedCredentials`.
    3. Create a `StatusResolver` with both and a `ResolverConfig`.
    4. After `confirm_purchase`, bind the returned id with `watch_purchase`.
    5. Render from `subscribe()` until the view is settled or errored.
*/
