//! Service ports: traits + data contracts the kernel consumes.

pub mod behavior;
pub mod config;
pub mod hierarchy;
pub mod loader;
pub mod timer;
pub mod toast;

pub use behavior::{
    Behaviors, FocusHandler, HandlerError, HandlerResult, KeyHandler, LoadingMask,
    ParameterHandler, PopupCloseAnim,
};
pub use config::{UiConfig, DEFAULT_WINDOW_LOAD_MASK_KEY};
pub use hierarchy::{Layer, ViewHierarchy};
pub use loader::{InstanceId, LoadKind, UiLoader, ViewInstance};
pub use timer::{Timer, TimerId};
pub use toast::{ToastFactory, ToastView};
