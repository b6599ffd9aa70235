//! The facade hosts talk to.
//!
//! `UiManager` owns every controller plus the consumed capabilities, turns
//! show/close requests into controller calls, delivers focus transitions and
//! routes completions coming back over the bus. Everything runs on the
//! caller's thread; nothing here blocks.

use serde_json::Value;

use super::error::UiError;
use super::focus::{FocusChain, FocusId, FocusTransition};
use super::loading_mask::LoadingMaskController;
use super::pool::PoolStats;
use super::popup::{PopupKey, PopupStack};
use super::record::{LifecycleState, UiCallback};
use super::services::bus::{
    ui_bus, CloseAnimTicket, LoadTicket, TimerTicket, UiBusReceiver, UiBusSender, UiMessage,
};
use super::services::ports::{
    InstanceId, LoadingMask, Timer, ToastFactory, UiConfig, UiLoader, ViewHierarchy, ViewInstance,
};
use super::toast::ToastController;
use super::window::{WindowController, WindowKey};
use crate::core::KeyCode;

/// Capabilities the manager is built from. The loader arrives later through
/// [`UiManager::init`].
pub struct UiParts {
    pub hierarchy: Box<dyn ViewHierarchy>,
    /// Scaled game-time timer.
    pub timer: Box<dyn Timer>,
    /// Timer that keeps running while game time is paused.
    pub realtime_timer: Box<dyn Timer>,
    pub default_mask: Box<dyn LoadingMask>,
    pub toast_factory: Box<dyn ToastFactory>,
    pub config: UiConfig,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FocusOwner {
    Window(String),
    Popup(String),
    LoadingMask,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UiStats {
    pub windows: PoolStats,
    pub popups: PoolStats,
    pub toasts: PoolStats,
}

pub struct UiManager {
    loader: Option<Box<dyn UiLoader>>,
    hierarchy: Box<dyn ViewHierarchy>,
    timer: Box<dyn Timer>,
    realtime: Box<dyn Timer>,
    config: UiConfig,
    bus_tx: UiBusSender,
    bus_rx: UiBusReceiver,
    focus: FocusChain,
    windows: WindowController,
    popups: PopupStack,
    toasts: ToastController,
    mask: LoadingMaskController,
}

impl UiManager {
    pub fn new(parts: UiParts) -> Self {
        let UiParts {
            hierarchy,
            timer,
            realtime_timer,
            default_mask,
            toast_factory,
            config,
        } = parts;
        let (bus_tx, bus_rx) = ui_bus();
        Self {
            loader: None,
            hierarchy,
            timer,
            realtime: realtime_timer,
            config,
            bus_tx,
            bus_rx,
            focus: FocusChain::new(),
            windows: WindowController::new(),
            popups: PopupStack::new(),
            toasts: ToastController::new(toast_factory),
            mask: LoadingMaskController::new(default_mask),
        }
    }

    pub fn init(&mut self, loader: Box<dyn UiLoader>) -> Result<(), UiError> {
        if self.loader.is_some() {
            return Err(UiError::AlreadyInitialized);
        }
        self.loader = Some(loader);
        tracing::info!("ui manager initialized");
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.loader.is_some()
    }

    pub fn config(&self) -> &UiConfig {
        &self.config
    }

    /// Sender for hosts that post completions themselves.
    pub fn bus_sender(&self) -> UiBusSender {
        self.bus_tx.clone()
    }

    pub fn show_window(&mut self, name: &str, param: Option<Value>, on_loaded: Option<UiCallback>) {
        if !self.ready("show_window") {
            return;
        }
        self.retire_window(true);
        let key = self.windows.open(name, param, on_loaded);
        let t = self.focus.add(FocusId::Window(key), true, true);
        self.apply_focus(t);
        self.begin_window_load(key);
    }

    pub fn close_window(&mut self) {
        if !self.ready("close_window") {
            return;
        }
        self.retire_window(false);
    }

    fn retire_window(&mut self, replacing: bool) {
        let Some(key) = self.windows.take_current() else {
            return;
        };
        let t = self.focus.remove(FocusId::Window(key), true);
        self.apply_focus(t);
        let Some(loader) = self.loader.as_deref_mut() else {
            return;
        };
        let was_loading = self.windows.close(key, loader, self.realtime.as_mut());
        // A replacement keeps the load mask for its own load.
        if was_loading && !replacing {
            self.end_window_load();
        }
    }

    fn begin_window_load(&mut self, key: WindowKey) {
        if let Some(mask_key) = self.config.window_load_mask_key().map(str::to_owned) {
            self.show_loading_mask(&mask_key);
            let delay = self.config.window_load_delay;
            if delay > 0.0 {
                let fire = self.bus_tx.timer_fire(TimerTicket::WindowLoad(key));
                let id = self.realtime.register(delay, fire);
                self.windows.set_delay_timer(key, id);
                return;
            }
        }
        self.issue_window_load(key);
    }

    fn issue_window_load(&mut self, key: WindowKey) {
        let (Some(loader), Some(name)) = (self.loader.as_deref_mut(), self.windows.name(key)) else {
            return;
        };
        loader.load_window(name, self.bus_tx.load_reply(LoadTicket::Window(key)));
    }

    fn end_window_load(&mut self) {
        if let Some(mask_key) = self.config.window_load_mask_key().map(str::to_owned) {
            self.hide_loading_mask(&mask_key);
        }
    }

    fn on_window_loaded(&mut self, key: WindowKey, instance: Option<ViewInstance>) {
        let Some(loader) = self.loader.as_deref_mut() else {
            return;
        };
        if !self.windows.is_current(key) {
            tracing::debug!("stale window load delivered");
            if let Some(instance) = instance {
                loader.unload_instance(instance.id);
            }
            return;
        }
        if let Some(callback) = self.windows.take_on_loaded(key) {
            callback();
        }
        match instance {
            Some(instance) => {
                if let Err(instance) = self.windows.attach(key, instance, self.hierarchy.as_mut()) {
                    loader.unload_instance(instance.id);
                }
            }
            None => self.windows.settle_empty(key),
        }
        self.end_window_load();
    }

    pub fn show_popup(&mut self, name: &str, param: Option<Value>, on_close: Option<UiCallback>) {
        if !self.ready("show_popup") {
            return;
        }
        if let Some(existing) = self.popups.find_by_name(name) {
            self.close_popup_key(existing, true);
        }
        let key = self.popups.push(name, param, on_close);
        let t = self.focus.add(FocusId::Popup(key), false, true);
        self.apply_focus(t);
        if let Some(loader) = self.loader.as_deref_mut() {
            loader.load_popup(name, self.bus_tx.load_reply(LoadTicket::Popup(key)));
        }
    }

    /// Closes the topmost popup called `name`. False when there is none.
    pub fn close_popup(&mut self, name: &str) -> bool {
        if !self.ready("close_popup") {
            return false;
        }
        match self.popups.find_by_name(name) {
            Some(key) => self.close_popup_key(key, false),
            None => false,
        }
    }

    pub fn close_popup_instance(&mut self, instance: InstanceId) -> bool {
        if !self.ready("close_popup_instance") {
            return false;
        }
        match self.popups.find_by_instance(instance) {
            Some(key) => self.close_popup_key(key, false),
            None => false,
        }
    }

    /// `superseded` marks the close done on behalf of a same-name show: no
    /// focus dispatch and no close animation.
    fn close_popup_key(&mut self, key: PopupKey, superseded: bool) -> bool {
        let Some(was_top) = self.popups.remove(key) else {
            return false;
        };
        let t = self.focus.remove(FocusId::Popup(key), !superseded);
        self.apply_focus(t);
        let animate = was_top && !superseded;
        if let Some(loader) = self.loader.as_deref_mut() {
            self.popups.close(key, animate, loader, &self.bus_tx);
        }
        if was_top {
            if let Some(top) = self.popups.top() {
                self.popups.show(top, self.hierarchy.as_mut());
            }
        }
        true
    }

    fn on_popup_loaded(&mut self, key: PopupKey, instance: Option<ViewInstance>) {
        let Some(instance) = instance else {
            if !self.popups.settle_empty(key) {
                tracing::debug!("stale empty popup load delivered");
            }
            return;
        };
        match self.popups.attach(key, instance, self.hierarchy.as_mut()) {
            Ok(overlay) => {
                if !overlay && self.popups.is_top(key) {
                    if let Some(below) = self.popups.below_top() {
                        self.popups.hide(below, self.hierarchy.as_mut());
                    }
                }
            }
            Err(instance) => {
                tracing::debug!(instance = ?instance.id, "popup closed before its load resolved");
                if let Some(loader) = self.loader.as_deref_mut() {
                    loader.unload_instance(instance.id);
                }
            }
        }
    }

    pub fn show_toast(&mut self, content: &str, duration: f32) {
        self.toasts
            .show(content, duration, self.realtime.as_mut(), &self.bus_tx);
    }

    pub fn dismiss_toast(&mut self) -> bool {
        self.toasts.dismiss(
            self.realtime.as_mut(),
            self.timer.as_mut(),
            &self.bus_tx,
            &self.config,
        )
    }

    pub fn show_loading_mask(&mut self, key: &str) {
        if self
            .mask
            .show(key, self.timer.as_mut(), self.hierarchy.as_mut())
        {
            let t = self.focus.add(FocusId::LoadingMask, false, true);
            self.apply_focus(t);
        }
    }

    pub fn hide_loading_mask(&mut self, key: &str) {
        if self
            .mask
            .hide(key, self.timer.as_mut(), &self.bus_tx, &self.config)
        {
            let t = self.focus.remove(FocusId::LoadingMask, true);
            self.apply_focus(t);
        }
    }

    pub fn set_loading_mask(&mut self, name: &str) {
        if !self.ready("set_loading_mask") {
            return;
        }
        if let Some(loader) = self.loader.as_deref_mut() {
            self.mask.request_swap(name, loader, &self.bus_tx);
        }
    }

    /// Reverts to the default mask. False while keys are held or when the
    /// default is already in use.
    pub fn reset_loading_mask(&mut self) -> bool {
        let Some(loader) = self.loader.as_deref_mut() else {
            return false;
        };
        self.mask
            .reset(loader, self.timer.as_mut(), self.hierarchy.as_mut())
    }

    /// Routes a key to the top of the focus chain. Returns true when a
    /// participant consumed it; the loading mask swallows every key.
    pub fn handle_key(&mut self, key: KeyCode) -> bool {
        match self.focus.top() {
            Some(FocusId::Window(k)) => self
                .windows
                .slot_mut(k)
                .is_some_and(|slot| slot.handle_key(key)),
            Some(FocusId::Popup(k)) => self
                .popups
                .slot_mut(k)
                .is_some_and(|slot| slot.handle_key(key)),
            Some(FocusId::LoadingMask) => true,
            None => false,
        }
    }

    /// Delivers every queued completion. Returns how many were handled.
    pub fn pump(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(msg) = self.bus_rx.try_recv() {
            self.deliver(msg);
            handled += 1;
        }
        handled
    }

    pub fn deliver(&mut self, msg: UiMessage) {
        match msg {
            UiMessage::Loaded { ticket, instance } => match ticket {
                LoadTicket::Window(key) => self.on_window_loaded(key, instance),
                LoadTicket::Popup(key) => self.on_popup_loaded(key, instance),
                LoadTicket::LoadingMask => match self.loader.as_deref_mut() {
                    Some(loader) => self.mask.on_loaded(
                        instance,
                        loader,
                        self.hierarchy.as_mut(),
                        self.timer.as_mut(),
                    ),
                    None => tracing::debug!("loading mask delivered before init"),
                },
            },
            UiMessage::TimerFired(ticket) => self.on_timer(ticket),
            UiMessage::CloseAnimDone(CloseAnimTicket(key)) => {
                if let Some(loader) = self.loader.as_deref_mut() {
                    self.popups.anim_done(key, loader);
                }
            }
        }
    }

    fn on_timer(&mut self, ticket: TimerTicket) {
        match ticket {
            TimerTicket::WindowLoad(key) => {
                if self.windows.is_current(key) && self.windows.finish_delay(key) {
                    self.issue_window_load(key);
                } else {
                    tracing::debug!("load delay fired for a closed window");
                }
            }
            TimerTicket::ToastExpired(key) => self.toasts.on_expired(
                key,
                self.realtime.as_mut(),
                self.timer.as_mut(),
                &self.bus_tx,
                &self.config,
            ),
            TimerTicket::ToastFaded(key) => self.toasts.on_faded(key),
            TimerTicket::MaskFaded(seq) => self.mask.on_faded(seq, self.hierarchy.as_mut()),
        }
    }

    fn apply_focus(&mut self, transition: Option<FocusTransition>) {
        let Some(transition) = transition else {
            return;
        };
        if let Some(lost) = transition.lost {
            self.signal_focus(lost, false);
        }
        if let Some(gained) = transition.gained {
            self.signal_focus(gained, true);
        }
    }

    fn signal_focus(&mut self, id: FocusId, gained: bool) {
        let slot = match id {
            FocusId::Window(key) => self.windows.slot_mut(key),
            FocusId::Popup(key) => self.popups.slot_mut(key),
            FocusId::LoadingMask => None,
        };
        match slot {
            Some(slot) if gained => slot.gain_focus(),
            Some(slot) => slot.lose_focus(),
            None => {}
        }
    }

    fn ready(&self, op: &'static str) -> bool {
        if self.loader.is_none() {
            tracing::debug!(op, "ui manager not initialized, request ignored");
            return false;
        }
        true
    }

    pub fn current_window(&self) -> Option<&str> {
        self.windows.current_name()
    }

    pub fn window_state(&self) -> Option<LifecycleState> {
        self.windows.current_state()
    }

    /// Popup names, bottom to top.
    pub fn popup_names(&self) -> Vec<String> {
        self.popups.names()
    }

    pub fn popup_visible(&self, name: &str) -> Option<bool> {
        self.popups.is_visible(name)
    }

    pub fn focus_owner(&self) -> Option<FocusOwner> {
        match self.focus.top()? {
            FocusId::Window(key) => self
                .windows
                .name(key)
                .map(|n| FocusOwner::Window(n.to_string())),
            FocusId::Popup(key) => self
                .popups
                .name(key)
                .map(|n| FocusOwner::Popup(n.to_string())),
            FocusId::LoadingMask => Some(FocusOwner::LoadingMask),
        }
    }

    pub fn loading_mask_visible(&self) -> bool {
        self.mask.is_visible()
    }

    pub fn loading_mask_held(&self) -> usize {
        self.mask.held_count()
    }

    pub fn toast_content(&self) -> Option<&str> {
        self.toasts.current_content()
    }

    pub fn toasts_on_screen(&self) -> usize {
        self.toasts.on_screen()
    }

    pub fn stats(&self) -> UiStats {
        UiStats {
            windows: self.windows.stats(),
            popups: self.popups.stats(),
            toasts: self.toasts.stats(),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/manager.rs"]
mod tests;
