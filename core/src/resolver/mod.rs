// ventas/src/resolver/mod.rs

//! The purchase status resolver: fetch a purchase, and when the sales service
//! is still validating stock, poll it on a fixed delay until a terminal state,
//! an error, or the attempt budget ends the run.

pub mod config;
pub mod engine;
pub mod session;

pub use config::{PollPolicy, ResolverConfig};
pub use engine::StatusResolver;
pub use session::SessionHandle;
