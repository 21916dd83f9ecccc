// ventas/src/gateway/mod.rs

//! The network boundary to the sales service.
//!
//! `PurchaseGateway` is the port the resolver consumes; `HttpPurchaseGateway`
//! is the reqwest adapter. Wire shapes and their mapping live in `dto`.

pub mod dto;
pub mod http;
pub mod provider;

pub use http::{HttpGatewayConfig, HttpPurchaseGateway};
pub use provider::PurchaseGateway;
