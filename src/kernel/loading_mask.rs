//! Keyed, ref-counted loading mask.
//!
//! Each distinct key counts once. The mask is shown when the first key is
//! taken and starts its close transition when the last one is released; the
//! deactivating `hide` only runs if nothing re-acquired the mask meanwhile.

use rustc_hash::FxHashSet;

use super::services::bus::{LoadTicket, TimerTicket, UiBusSender};
use super::services::ports::{
    InstanceId, Layer, LoadingMask, Timer, TimerId, UiConfig, UiLoader, ViewHierarchy,
    ViewInstance,
};

struct CustomMask {
    instance: InstanceId,
    mask: Box<dyn LoadingMask>,
}

#[derive(Debug, Clone, Copy)]
struct PendingFade {
    timer: TimerId,
    seq: u64,
}

pub struct LoadingMaskController {
    keys: FxHashSet<String>,
    default_mask: Box<dyn LoadingMask>,
    custom: Option<CustomMask>,
    fade: Option<PendingFade>,
    fade_seq: u64,
    visible: bool,
}

impl LoadingMaskController {
    pub fn new(default_mask: Box<dyn LoadingMask>) -> Self {
        Self {
            keys: FxHashSet::default(),
            default_mask,
            custom: None,
            fade: None,
            fade_seq: 0,
            visible: false,
        }
    }

    pub fn held_count(&self) -> usize {
        self.keys.len()
    }

    pub fn holds(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    /// Shown, or still running its close transition.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn custom_instance(&self) -> Option<InstanceId> {
        self.custom.as_ref().map(|c| c.instance)
    }

    /// Takes `key`. Returns true when this made the mask visible.
    pub fn show(
        &mut self,
        key: &str,
        scaled: &mut dyn Timer,
        hierarchy: &mut dyn ViewHierarchy,
    ) -> bool {
        if key.is_empty() || self.keys.contains(key) {
            return false;
        }
        self.keys.insert(key.to_string());
        if self.keys.len() > 1 {
            return false;
        }
        if let Some(fade) = self.fade.take() {
            scaled.unregister(fade.timer);
        }
        if let Some(instance) = self.custom_instance() {
            hierarchy.set_active(instance, true);
        }
        self.active_mask().show();
        self.visible = true;
        tracing::debug!(key, "loading mask shown");
        true
    }

    /// Releases `key`. Returns true when this started the close transition.
    pub fn hide(
        &mut self,
        key: &str,
        scaled: &mut dyn Timer,
        bus: &UiBusSender,
        config: &UiConfig,
    ) -> bool {
        if key.is_empty() || !self.keys.remove(key) {
            return false;
        }
        if !self.keys.is_empty() {
            return false;
        }
        let transition = self.active_mask().close();
        let wait = config.close_wait(transition);
        self.fade_seq += 1;
        let seq = self.fade_seq;
        let timer = scaled.register(wait, bus.timer_fire(TimerTicket::MaskFaded(seq)));
        self.fade = Some(PendingFade { timer, seq });
        tracing::debug!(key, wait, "loading mask closing");
        true
    }

    pub fn on_faded(&mut self, seq: u64, hierarchy: &mut dyn ViewHierarchy) {
        match self.fade {
            Some(fade) if fade.seq == seq && self.keys.is_empty() => {
                self.fade = None;
                self.deactivate(hierarchy);
            }
            _ => tracing::debug!(seq, "stale loading mask fade"),
        }
    }

    /// Requests a replacement mask. Empty names are ignored.
    pub fn request_swap(&mut self, name: &str, loader: &mut dyn UiLoader, bus: &UiBusSender) {
        if name.is_empty() {
            return;
        }
        loader.load_loading_mask(name, bus.load_reply(LoadTicket::LoadingMask));
    }

    pub fn on_loaded(
        &mut self,
        instance: Option<ViewInstance>,
        loader: &mut dyn UiLoader,
        hierarchy: &mut dyn ViewHierarchy,
        scaled: &mut dyn Timer,
    ) {
        let Some(mut instance) = instance else {
            tracing::warn!("loader delivered no loading mask instance");
            return;
        };
        if !self.keys.is_empty() {
            tracing::warn!(held = self.keys.len(), "loading mask in use, new mask discarded");
            loader.unload_instance(instance.id);
            return;
        }
        let Some(mask) = instance.behaviors.loading_mask.take() else {
            tracing::warn!(instance = ?instance.id, "loaded view has no loading mask capability");
            loader.unload_instance(instance.id);
            return;
        };
        hierarchy.attach(instance.id, Layer::LoadingMask);
        hierarchy.set_active(instance.id, false);
        self.finish_fade(scaled, hierarchy);
        let replaced = self.custom.replace(CustomMask {
            instance: instance.id,
            mask,
        });
        if let Some(old) = replaced {
            loader.unload_instance(old.instance);
        }
        tracing::debug!(instance = ?instance.id, "loading mask swapped");
    }

    /// Returns to the default mask. Refused while any key is held.
    pub fn reset(
        &mut self,
        loader: &mut dyn UiLoader,
        scaled: &mut dyn Timer,
        hierarchy: &mut dyn ViewHierarchy,
    ) -> bool {
        if !self.keys.is_empty() || self.custom.is_none() {
            return false;
        }
        self.finish_fade(scaled, hierarchy);
        if let Some(old) = self.custom.take() {
            loader.unload_instance(old.instance);
        }
        true
    }

    /// Cuts a running close transition short.
    fn finish_fade(&mut self, scaled: &mut dyn Timer, hierarchy: &mut dyn ViewHierarchy) {
        if let Some(fade) = self.fade.take() {
            scaled.unregister(fade.timer);
            self.deactivate(hierarchy);
        }
    }

    fn deactivate(&mut self, hierarchy: &mut dyn ViewHierarchy) {
        self.active_mask().hide();
        if let Some(instance) = self.custom_instance() {
            hierarchy.set_active(instance, false);
        }
        self.visible = false;
    }

    fn active_mask(&mut self) -> &mut dyn LoadingMask {
        match self.custom.as_mut() {
            Some(custom) => custom.mask.as_mut(),
            None => self.default_mask.as_mut(),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/loading_mask.rs"]
mod tests;
