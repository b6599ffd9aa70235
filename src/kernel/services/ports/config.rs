use serde::{Deserialize, Serialize};

pub const DEFAULT_WINDOW_LOAD_MASK_KEY: &str = "load_window";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Loading-mask key held while a window loads. `None` disables the load hooks.
    #[serde(alias = "windowLoadMaskKey")]
    pub window_load_mask_key: Option<String>,
    /// Real-time seconds between raising the load mask and issuing the window load.
    #[serde(alias = "windowLoadDelay")]
    pub window_load_delay: f32,
    /// Upper bound for every close-transition wait (toast and loading mask).
    #[serde(alias = "maxCloseTransition")]
    pub max_close_transition: f32,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            window_load_mask_key: Some(DEFAULT_WINDOW_LOAD_MASK_KEY.to_string()),
            window_load_delay: 0.1,
            max_close_transition: 1.0,
        }
    }
}

impl UiConfig {
    /// Wait applied after a close transition starts.
    ///
    /// NaN and negative transition lengths collapse to the cap and zero respectively.
    pub fn close_wait(&self, transition: f32) -> f32 {
        transition.min(self.max_close_transition).max(0.0)
    }

    pub fn window_load_mask_key(&self) -> Option<&str> {
        self.window_load_mask_key
            .as_deref()
            .filter(|key| !key.is_empty())
    }
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/ports/config.rs"]
mod tests;
