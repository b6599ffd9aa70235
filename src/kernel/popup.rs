//! LIFO popup stack.
//!
//! Stack order is bottom to top. At most one record per name lives in the
//! stack; lookups by name or instance scan from the top. A record that is
//! removed but still waiting for close animations stays in the pool until the
//! last [`CloseAnimDone`](super::services::bus::CloseAnimDone) arrives.

use serde_json::Value;
use slotmap::new_key_type;

use super::pool::{PoolStats, ProcessPool, Recyclable};
use super::record::{LifecycleState, UiCallback, ViewSlot};
use super::services::bus::{CloseAnimTicket, UiBusSender};
use super::services::ports::{InstanceId, Layer, UiLoader, ViewHierarchy, ViewInstance};

new_key_type! {
    pub struct PopupKey;
}

#[derive(Default)]
pub struct PopupRecord {
    pub view: ViewSlot,
    pub on_close: Option<UiCallback>,
    /// Cleared only by the stack's own hide step.
    pub visible: bool,
    pub overlay: bool,
    pub pending_anims: usize,
}

impl Recyclable for PopupRecord {
    fn recycle(&mut self) {
        self.view.reset();
        self.on_close = None;
        self.visible = false;
        self.overlay = false;
        self.pending_anims = 0;
    }
}

#[derive(Default)]
pub struct PopupStack {
    pool: ProcessPool<PopupKey, PopupRecord>,
    stack: Vec<PopupKey>,
}

impl PopupStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn top(&self) -> Option<PopupKey> {
        self.stack.last().copied()
    }

    pub fn is_top(&self, key: PopupKey) -> bool {
        self.top() == Some(key)
    }

    /// Entry directly beneath the top.
    pub fn below_top(&self) -> Option<PopupKey> {
        let n = self.stack.len();
        if n < 2 {
            return None;
        }
        self.stack.get(n - 2).copied()
    }

    pub fn find_by_name(&self, name: &str) -> Option<PopupKey> {
        self.stack
            .iter()
            .rev()
            .copied()
            .find(|key| self.pool.get(*key).is_some_and(|r| r.view.name == name))
    }

    pub fn find_by_instance(&self, instance: InstanceId) -> Option<PopupKey> {
        self.stack
            .iter()
            .rev()
            .copied()
            .find(|key| {
                self.pool
                    .get(*key)
                    .is_some_and(|r| r.view.instance() == Some(instance))
            })
    }

    pub fn record(&self, key: PopupKey) -> Option<&PopupRecord> {
        self.pool.get(key)
    }

    pub fn slot_mut(&mut self, key: PopupKey) -> Option<&mut ViewSlot> {
        self.pool.get_mut(key).map(|r| &mut r.view)
    }

    pub fn name(&self, key: PopupKey) -> Option<&str> {
        self.pool.get(key).map(|r| r.view.name.as_str())
    }

    /// Names bottom to top.
    pub fn names(&self) -> Vec<String> {
        self.stack
            .iter()
            .filter_map(|key| self.pool.get(*key))
            .map(|r| r.view.name.clone())
            .collect()
    }

    pub fn is_visible(&self, name: &str) -> Option<bool> {
        let key = self.find_by_name(name)?;
        self.pool.get(key).map(|r| r.visible)
    }

    pub fn push(
        &mut self,
        name: &str,
        param: Option<Value>,
        on_close: Option<UiCallback>,
    ) -> PopupKey {
        let key = self.pool.acquire();
        if let Some(record) = self.pool.get_mut(key) {
            record.view.begin(name, param);
            record.on_close = on_close;
            record.visible = true;
        }
        self.stack.push(key);
        tracing::debug!(popup = name, depth = self.stack.len(), "popup pushed");
        key
    }

    /// Splices `key` out of the stack. Returns whether it was the top, or
    /// `None` when it was not in the stack.
    pub fn remove(&mut self, key: PopupKey) -> Option<bool> {
        let idx = self.stack.iter().rposition(|k| *k == key)?;
        let was_top = idx + 1 == self.stack.len();
        self.stack.remove(idx);
        Some(was_top)
    }

    /// Wires a delivered instance into the popup layer and reports its
    /// overlay flag. A record that is gone or no longer loading gets the
    /// instance handed back.
    pub fn attach(
        &mut self,
        key: PopupKey,
        instance: ViewInstance,
        hierarchy: &mut dyn ViewHierarchy,
    ) -> Result<bool, ViewInstance> {
        let Some(record) = self.pool.get_mut(key) else {
            return Err(instance);
        };
        if record.view.state != LifecycleState::Loading {
            return Err(instance);
        }
        let overlay = instance.behaviors.overlay;
        record.overlay = overlay;
        // A neighbour may have hidden it before the overlay flag was known.
        if overlay {
            record.visible = true;
        }
        let visible = record.visible;
        record.view.attach(instance, Layer::Popup, visible, hierarchy);
        tracing::debug!(popup = %record.view.name, overlay, visible, "popup attached");
        Ok(overlay)
    }

    pub fn settle_empty(&mut self, key: PopupKey) -> bool {
        match self.pool.get_mut(key) {
            Some(record) if record.view.is_loading() => {
                tracing::warn!(popup = %record.view.name, "loader delivered no popup instance");
                record.view.state = LifecycleState::Active;
                true
            }
            _ => false,
        }
    }

    pub fn hide(&mut self, key: PopupKey, hierarchy: &mut dyn ViewHierarchy) {
        let Some(record) = self.pool.get_mut(key) else {
            return;
        };
        if !record.visible || record.overlay {
            return;
        }
        record.visible = false;
        if let Some(instance) = record.view.instance() {
            hierarchy.set_active(instance, false);
        }
    }

    pub fn show(&mut self, key: PopupKey, hierarchy: &mut dyn ViewHierarchy) {
        let Some(record) = self.pool.get_mut(key) else {
            return;
        };
        if record.visible {
            return;
        }
        record.visible = true;
        if let Some(instance) = record.view.instance() {
            hierarchy.set_active(instance, true);
        }
    }

    /// Close sequence of a record already removed from the stack.
    ///
    /// Returns true when the record was released right away, false when it
    /// waits for close animations.
    pub fn close(
        &mut self,
        key: PopupKey,
        animate: bool,
        loader: &mut dyn UiLoader,
        bus: &UiBusSender,
    ) -> bool {
        let Some(record) = self.pool.get_mut(key) else {
            return false;
        };
        record.view.state = LifecycleState::Closing;
        record.view.notify_close();
        if animate {
            if let Some(attached) = record.view.attached.as_mut() {
                for anim in attached.behaviors.close_anims.iter_mut() {
                    record.pending_anims += 1;
                    let done = bus.close_anim_done(CloseAnimTicket(key));
                    if let Err(error) = anim.execute_close(done) {
                        tracing::error!(popup = %record.view.name, error = %error, "close animation failed");
                    }
                }
            }
        }
        if let Some(callback) = record.on_close.take() {
            callback();
        }
        if record.pending_anims > 0 {
            tracing::debug!(popup = %record.view.name, pending = record.pending_anims, "popup closing");
            return false;
        }
        self.release(key, loader);
        true
    }

    /// One close animation finished. Returns true when it released the record.
    pub fn anim_done(&mut self, key: PopupKey, loader: &mut dyn UiLoader) -> bool {
        let Some(record) = self.pool.get_mut(key) else {
            tracing::debug!("close animation signal for a released popup");
            return false;
        };
        if record.view.state != LifecycleState::Closing || record.pending_anims == 0 {
            tracing::debug!(popup = %record.view.name, "unexpected close animation signal");
            return false;
        }
        record.pending_anims -= 1;
        if record.pending_anims > 0 {
            return false;
        }
        self.release(key, loader);
        true
    }

    pub fn stats(&self) -> PoolStats {
        self.pool.stats()
    }

    fn release(&mut self, key: PopupKey, loader: &mut dyn UiLoader) {
        if let Some(record) = self.pool.get_mut(key) {
            record.view.release_instance(loader);
            tracing::debug!(popup = %record.view.name, "popup released");
        }
        self.pool.release(key);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/popup.rs"]
mod tests;
