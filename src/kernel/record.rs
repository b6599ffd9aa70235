//! State shared by window and popup lifecycle records.

use serde_json::Value;

use super::services::ports::{
    Behaviors, InstanceId, Layer, UiLoader, ViewHierarchy, ViewInstance,
};
use crate::core::KeyCode;

pub type UiCallback = Box<dyn FnOnce()>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LifecycleState {
    #[default]
    Idle,
    Loading,
    Active,
    Closing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FocusState {
    #[default]
    Unfocused,
    /// Focus was granted before the instance arrived.
    Requested,
    Dispatched,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FocusSignal {
    Gain,
    Lose,
    Close,
}

#[derive(Debug)]
pub struct Attached {
    pub instance: InstanceId,
    pub behaviors: Behaviors,
}

/// One view's name, parameter, instance and focus bookkeeping.
#[derive(Debug, Default)]
pub struct ViewSlot {
    pub name: String,
    pub param: Option<Value>,
    pub state: LifecycleState,
    pub focus: FocusState,
    pub attached: Option<Attached>,
}

impl ViewSlot {
    pub fn begin(&mut self, name: &str, param: Option<Value>) {
        debug_assert!(self.attached.is_none(), "recycled slot still holds an instance");
        self.name.clear();
        self.name.push_str(name);
        self.param = param;
        self.state = LifecycleState::Loading;
        self.focus = FocusState::Unfocused;
    }

    pub fn instance(&self) -> Option<InstanceId> {
        self.attached.as_ref().map(|a| a.instance)
    }

    pub fn is_loading(&self) -> bool {
        self.state == LifecycleState::Loading
    }

    /// Parents the instance, hands over the parameter and settles a focus
    /// request that arrived before the instance did.
    pub fn attach(
        &mut self,
        instance: ViewInstance,
        layer: Layer,
        active: bool,
        hierarchy: &mut dyn ViewHierarchy,
    ) {
        hierarchy.attach(instance.id, layer);
        hierarchy.set_active(instance.id, active);
        let mut attached = Attached {
            instance: instance.id,
            behaviors: instance.behaviors,
        };
        self.dispatch_parameter(&mut attached.behaviors);
        if self.focus == FocusState::Requested {
            notify_focus(&self.name, &mut attached.behaviors, FocusSignal::Gain);
            self.focus = FocusState::Dispatched;
        }
        self.attached = Some(attached);
        self.state = LifecycleState::Active;
    }

    pub fn gain_focus(&mut self) {
        match self.attached.as_mut() {
            Some(attached) => {
                notify_focus(&self.name, &mut attached.behaviors, FocusSignal::Gain);
                self.focus = FocusState::Dispatched;
            }
            None => self.focus = FocusState::Requested,
        }
    }

    pub fn lose_focus(&mut self) {
        if let Some(attached) = self.attached.as_mut() {
            notify_focus(&self.name, &mut attached.behaviors, FocusSignal::Lose);
        }
        self.focus = FocusState::Unfocused;
    }

    pub fn notify_close(&mut self) {
        if let Some(attached) = self.attached.as_mut() {
            notify_focus(&self.name, &mut attached.behaviors, FocusSignal::Close);
        }
    }

    /// Routes a key to every key handler. Returns false when there was none.
    pub fn handle_key(&mut self, key: KeyCode) -> bool {
        let Some(attached) = self.attached.as_mut() else {
            return false;
        };
        if attached.behaviors.keys.is_empty() {
            return false;
        }
        for handler in attached.behaviors.keys.iter_mut() {
            if let Err(error) = handler.on_key(key) {
                tracing::error!(view = %self.name, ?key, error = %error, "key handler failed");
            }
        }
        true
    }

    /// Gives the instance back to the loader.
    pub fn release_instance(&mut self, loader: &mut dyn UiLoader) {
        if let Some(attached) = self.attached.take() {
            loader.unload_instance(attached.instance);
        }
    }

    pub fn reset(&mut self) {
        if let Some(attached) = self.attached.take() {
            tracing::warn!(view = %self.name, instance = ?attached.instance, "slot recycled with an attached instance");
        }
        self.name.clear();
        self.param = None;
        self.state = LifecycleState::Idle;
        self.focus = FocusState::Unfocused;
        self.attached = None;
    }

    fn dispatch_parameter(&self, behaviors: &mut Behaviors) {
        match behaviors.parameter.as_mut() {
            Some(handler) => {
                if let Err(error) = handler.set_parameter(self.param.as_ref()) {
                    tracing::error!(view = %self.name, error = %error, "parameter handler failed");
                }
            }
            None if self.param.is_some() => {
                tracing::error!(view = %self.name, "no parameter handler found");
            }
            None => {}
        }
    }
}

fn notify_focus(name: &str, behaviors: &mut Behaviors, signal: FocusSignal) {
    for handler in behaviors.focus.iter_mut() {
        let result = match signal {
            FocusSignal::Gain => handler.on_focus(),
            FocusSignal::Lose => handler.on_lose_focus(),
            FocusSignal::Close => handler.on_close(),
        };
        if let Err(error) = result {
            tracing::error!(view = %name, ?signal, error = %error, "focus handler failed");
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/record.rs"]
mod tests;
