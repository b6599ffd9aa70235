//! Headless view-lifecycle core (window, popups, toast, loading mask, focus).

pub mod error;
pub mod focus;
pub mod loading_mask;
pub mod manager;
pub mod pool;
pub mod popup;
pub mod record;
pub mod services;
pub mod toast;
pub mod window;

pub use error::UiError;
pub use focus::{FocusChain, FocusId, FocusTransition};
pub use loading_mask::LoadingMaskController;
pub use manager::{FocusOwner, UiManager, UiParts, UiStats};
pub use pool::{PoolStats, ProcessPool, Recyclable};
pub use popup::{PopupKey, PopupStack};
pub use record::{LifecycleState, UiCallback};
pub use toast::{ToastController, ToastKey};
pub use window::{WindowController, WindowKey};

#[cfg(test)]
#[path = "../../tests/unit/kernel/support.rs"]
pub(crate) mod test_support;
