//! uistack - layered UI navigation kernel
//!
//! Module layout:
//! - core: frontend-neutral input types (KeyCode)
//! - kernel: headless view-lifecycle core (window, popup stack, toast, loading mask, focus chain)
//! - kernel::services: capability ports, completion bus and in-memory adapters
//! - tui: crossterm + ratatui demo host (feature `tui`)

pub mod core;
pub mod kernel;
#[cfg(feature = "tui")]
pub mod tui;

pub use kernel::{UiError, UiManager, UiParts};
