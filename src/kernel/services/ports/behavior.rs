//! Capabilities an instantiated view exposes to the kernel.
//!
//! The loader hands these over as an explicit [`Behaviors`] bundle next to the
//! instance handle; the kernel never inspects the view any other way.

use std::fmt;

use serde_json::Value;

use crate::core::KeyCode;
use crate::kernel::services::bus::CloseAnimDone;

pub type HandlerResult = Result<(), HandlerError>;

/// Fault reported by a view capability. Logged by the kernel, never propagated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerError {
    message: String,
}

impl HandlerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "handler fault: {}", self.message)
    }
}

impl std::error::Error for HandlerError {}

impl From<String> for HandlerError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for HandlerError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

pub trait ParameterHandler {
    /// Receives the show-time parameter once, right after the view is attached.
    fn set_parameter(&mut self, param: Option<&Value>) -> HandlerResult;
}

pub trait FocusHandler {
    fn on_focus(&mut self) -> HandlerResult;

    fn on_lose_focus(&mut self) -> HandlerResult;

    fn on_close(&mut self) -> HandlerResult;
}

pub trait KeyHandler {
    fn on_key(&mut self, key: KeyCode) -> HandlerResult;
}

pub trait PopupCloseAnim {
    /// Starts the close animation. `done` must be signalled exactly once when it ends.
    fn execute_close(&mut self, done: CloseAnimDone) -> HandlerResult;
}

/// A concrete loading-mask view.
pub trait LoadingMask {
    fn show(&mut self);

    /// Starts the hide transition and returns its length in seconds.
    fn close(&mut self) -> f32;

    /// Deactivates the mask once the hide transition has elapsed.
    fn hide(&mut self);
}

#[derive(Default)]
pub struct Behaviors {
    pub parameter: Option<Box<dyn ParameterHandler>>,
    pub focus: Vec<Box<dyn FocusHandler>>,
    pub keys: Vec<Box<dyn KeyHandler>>,
    pub overlay: bool,
    pub close_anims: Vec<Box<dyn PopupCloseAnim>>,
    pub loading_mask: Option<Box<dyn LoadingMask>>,
}

impl Behaviors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parameter(mut self, handler: impl ParameterHandler + 'static) -> Self {
        self.parameter = Some(Box::new(handler));
        self
    }

    pub fn with_focus(mut self, handler: impl FocusHandler + 'static) -> Self {
        self.focus.push(Box::new(handler));
        self
    }

    pub fn with_key(mut self, handler: impl KeyHandler + 'static) -> Self {
        self.keys.push(Box::new(handler));
        self
    }

    pub fn with_overlay(mut self, overlay: bool) -> Self {
        self.overlay = overlay;
        self
    }

    pub fn with_close_anim(mut self, anim: impl PopupCloseAnim + 'static) -> Self {
        self.close_anims.push(Box::new(anim));
        self
    }

    pub fn with_loading_mask(mut self, mask: impl LoadingMask + 'static) -> Self {
        self.loading_mask = Some(Box::new(mask));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.parameter.is_none()
            && self.focus.is_empty()
            && self.keys.is_empty()
            && !self.overlay
            && self.close_anims.is_empty()
            && self.loading_mask.is_none()
    }
}

impl fmt::Debug for Behaviors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Behaviors")
            .field("parameter", &self.parameter.is_some())
            .field("focus", &self.focus.len())
            .field("keys", &self.keys.len())
            .field("overlay", &self.overlay)
            .field("close_anims", &self.close_anims.len())
            .field("loading_mask", &self.loading_mask.is_some())
            .finish()
    }
}
