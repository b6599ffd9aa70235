//! The single primary window.
//!
//! The controller only keeps records and the current key; the manager decides
//! when focus moves and which hooks run around a load.

use serde_json::Value;
use slotmap::new_key_type;

use super::pool::{PoolStats, ProcessPool, Recyclable};
use super::record::{LifecycleState, UiCallback, ViewSlot};
use super::services::ports::{Layer, Timer, TimerId, UiLoader, ViewHierarchy, ViewInstance};

new_key_type! {
    pub struct WindowKey;
}

#[derive(Default)]
pub struct WindowRecord {
    pub view: ViewSlot,
    pub on_loaded: Option<UiCallback>,
    /// Real-time timer delaying the load request while the load mask comes up.
    pub delay_timer: Option<TimerId>,
}

impl Recyclable for WindowRecord {
    fn recycle(&mut self) {
        self.view.reset();
        self.on_loaded = None;
        self.delay_timer = None;
    }
}

#[derive(Default)]
pub struct WindowController {
    pool: ProcessPool<WindowKey, WindowRecord>,
    current: Option<WindowKey>,
}

impl WindowController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<WindowKey> {
        self.current
    }

    pub fn is_current(&self, key: WindowKey) -> bool {
        self.current == Some(key)
    }

    pub fn current_name(&self) -> Option<&str> {
        let key = self.current?;
        self.pool.get(key).map(|r| r.view.name.as_str())
    }

    pub fn current_state(&self) -> Option<LifecycleState> {
        let key = self.current?;
        self.pool.get(key).map(|r| r.view.state)
    }

    pub fn name(&self, key: WindowKey) -> Option<&str> {
        self.pool.get(key).map(|r| r.view.name.as_str())
    }

    pub fn slot_mut(&mut self, key: WindowKey) -> Option<&mut ViewSlot> {
        self.pool.get_mut(key).map(|r| &mut r.view)
    }

    /// Starts a new window record and makes it current.
    ///
    /// The previous window must already have been taken with [`Self::take_current`].
    pub fn open(
        &mut self,
        name: &str,
        param: Option<Value>,
        on_loaded: Option<UiCallback>,
    ) -> WindowKey {
        debug_assert!(self.current.is_none(), "window opened over a live window");
        let key = self.pool.acquire();
        if let Some(record) = self.pool.get_mut(key) {
            record.view.begin(name, param);
            record.on_loaded = on_loaded;
        }
        self.current = Some(key);
        tracing::debug!(window = name, "window load started");
        key
    }

    pub fn take_current(&mut self) -> Option<WindowKey> {
        self.current.take()
    }

    pub fn set_delay_timer(&mut self, key: WindowKey, id: TimerId) {
        if let Some(record) = self.pool.get_mut(key) {
            record.delay_timer = Some(id);
        }
    }

    /// Clears the delay timer once it fired. False when the record is gone.
    pub fn finish_delay(&mut self, key: WindowKey) -> bool {
        match self.pool.get_mut(key) {
            Some(record) => {
                record.delay_timer = None;
                true
            }
            None => false,
        }
    }

    pub fn take_on_loaded(&mut self, key: WindowKey) -> Option<UiCallback> {
        self.pool.get_mut(key).and_then(|r| r.on_loaded.take())
    }

    /// Wires a delivered instance into the window layer.
    pub fn attach(
        &mut self,
        key: WindowKey,
        instance: ViewInstance,
        hierarchy: &mut dyn ViewHierarchy,
    ) -> Result<(), ViewInstance> {
        let Some(record) = self.pool.get_mut(key) else {
            return Err(instance);
        };
        record.view.attach(instance, Layer::Window, true, hierarchy);
        tracing::debug!(window = %record.view.name, "window attached");
        Ok(())
    }

    /// Settles a load that delivered nothing.
    pub fn settle_empty(&mut self, key: WindowKey) {
        if let Some(record) = self.pool.get_mut(key) {
            tracing::warn!(window = %record.view.name, "loader delivered no window instance");
            record.view.state = LifecycleState::Active;
        }
    }

    /// Runs the close sequence and pools the record.
    ///
    /// Returns whether the window was still loading. A load still in flight is
    /// not cancelled; its delivery finds the key stale and is unloaded.
    pub fn close(
        &mut self,
        key: WindowKey,
        loader: &mut dyn UiLoader,
        realtime: &mut dyn Timer,
    ) -> bool {
        if self.current == Some(key) {
            self.current = None;
        }
        let Some(record) = self.pool.get_mut(key) else {
            return false;
        };
        let was_loading = record.view.is_loading();
        if let Some(timer) = record.delay_timer.take() {
            realtime.unregister(timer);
        }
        record.view.state = LifecycleState::Closing;
        record.view.notify_close();
        record.view.release_instance(loader);
        tracing::debug!(window = %record.view.name, was_loading, "window closed");
        self.pool.release(key);
        was_loading
    }

    pub fn stats(&self) -> PoolStats {
        self.pool.stats()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/window.rs"]
mod tests;
