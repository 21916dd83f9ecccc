// demos/storefront_client/src/commands/mod.rs

pub mod confirm;
pub mod list;
pub mod watch;
