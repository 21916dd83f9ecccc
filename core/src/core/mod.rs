pub mod control;
pub mod model;
pub mod state;
pub mod view;

// Re-export key types for easier access from other modules (and lib.rs)
pub use control::{PollControl, ResolutionPhase};
pub use model::{
  ConfirmPurchaseRequest, Money, PurchaseDetail, PurchaseId, PurchaseLineItem, PurchaseRef, PurchaseSummary,
};
pub use state::PurchaseState;
pub use view::PurchaseViewState;
