//! In-memory loader: queues requests until the host answers them.
//!
//! Hosts that instantiate views asynchronously (or tests that want to control
//! exactly when a load resolves) keep a clone of the loader, hand the other
//! clone to the manager, and resolve pending requests whenever they like.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use crate::kernel::services::bus::LoadReply;
use crate::kernel::services::ports::{Behaviors, InstanceId, LoadKind, UiLoader, ViewInstance};

#[derive(Debug)]
pub struct PendingLoad {
    pub kind: LoadKind,
    pub name: String,
    pub reply: LoadReply,
}

#[derive(Debug, Default)]
struct LoaderState {
    pending: VecDeque<PendingLoad>,
    unloaded: Vec<InstanceId>,
    next_id: u64,
}

#[derive(Debug, Clone, Default)]
pub struct QueuedLoader {
    state: Rc<RefCell<LoaderState>>,
}

impl QueuedLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_instance_id(&self) -> InstanceId {
        let mut state = self.state.borrow_mut();
        state.next_id += 1;
        InstanceId(state.next_id)
    }

    pub fn pending(&self) -> Vec<(LoadKind, String)> {
        self.state
            .borrow()
            .pending
            .iter()
            .map(|p| (p.kind, p.name.clone()))
            .collect()
    }

    pub fn pending_len(&self) -> usize {
        self.state.borrow().pending.len()
    }

    /// Oldest pending request for `name` of the given kind.
    pub fn take(&self, kind: LoadKind, name: &str) -> Option<LoadReply> {
        let mut state = self.state.borrow_mut();
        let idx = state
            .pending
            .iter()
            .position(|p| p.kind == kind && p.name == name)?;
        state.pending.remove(idx).map(|p| p.reply)
    }

    pub fn take_all(&self) -> Vec<PendingLoad> {
        self.state.borrow_mut().pending.drain(..).collect()
    }

    /// Answers the oldest matching request with a fresh instance.
    pub fn resolve(&self, kind: LoadKind, name: &str, behaviors: Behaviors) -> Option<InstanceId> {
        let reply = self.take(kind, name)?;
        let id = self.next_instance_id();
        reply.deliver(Some(ViewInstance::new(id, behaviors)));
        Some(id)
    }

    /// Answers the oldest matching request with "no instance".
    pub fn fail(&self, kind: LoadKind, name: &str) -> bool {
        match self.take(kind, name) {
            Some(reply) => {
                reply.deliver(None);
                true
            }
            None => false,
        }
    }

    pub fn unloaded(&self) -> Vec<InstanceId> {
        self.state.borrow().unloaded.clone()
    }

    pub fn take_unloaded(&self) -> Vec<InstanceId> {
        std::mem::take(&mut self.state.borrow_mut().unloaded)
    }

    pub fn was_unloaded(&self, id: InstanceId) -> bool {
        self.state.borrow().unloaded.contains(&id)
    }

    fn push(&mut self, kind: LoadKind, name: &str, reply: LoadReply) {
        tracing::debug!(?kind, name, "load queued");
        self.state.borrow_mut().pending.push_back(PendingLoad {
            kind,
            name: name.to_string(),
            reply,
        });
    }
}

impl UiLoader for QueuedLoader {
    fn load_window(&mut self, name: &str, reply: LoadReply) {
        self.push(LoadKind::Window, name, reply);
    }

    fn load_popup(&mut self, name: &str, reply: LoadReply) {
        self.push(LoadKind::Popup, name, reply);
    }

    fn load_loading_mask(&mut self, name: &str, reply: LoadReply) {
        self.push(LoadKind::LoadingMask, name, reply);
    }

    fn unload_instance(&mut self, instance: InstanceId) {
        self.state.borrow_mut().unloaded.push(instance);
    }
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/adapters/loader.rs"]
mod tests;
