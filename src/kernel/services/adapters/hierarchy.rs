//! Headless view hierarchy that records layer membership and activity.

use std::cell::RefCell;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::kernel::services::ports::{InstanceId, Layer, ViewHierarchy};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeState {
    pub layer: Layer,
    pub active: bool,
}

#[derive(Debug, Default)]
struct SceneState {
    nodes: FxHashMap<InstanceId, NodeState>,
    order: Vec<InstanceId>,
}

#[derive(Debug, Clone, Default)]
pub struct RecordingHierarchy {
    state: Rc<RefCell<SceneState>>,
}

impl RecordingHierarchy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node(&self, id: InstanceId) -> Option<NodeState> {
        self.state.borrow().nodes.get(&id).copied()
    }

    pub fn is_attached(&self, id: InstanceId) -> bool {
        self.state.borrow().nodes.contains_key(&id)
    }

    pub fn is_active(&self, id: InstanceId) -> bool {
        self.node(id).is_some_and(|n| n.active)
    }

    /// Active instances of `layer`, in attach order (bottom to top).
    pub fn active_in(&self, layer: Layer) -> Vec<InstanceId> {
        let state = self.state.borrow();
        state
            .order
            .iter()
            .copied()
            .filter(|id| {
                state
                    .nodes
                    .get(id)
                    .is_some_and(|n| n.layer == layer && n.active)
            })
            .collect()
    }

    /// Forgets an instance the loader has destroyed.
    pub fn detach(&self, id: InstanceId) {
        let mut state = self.state.borrow_mut();
        if state.nodes.remove(&id).is_some() {
            state.order.retain(|n| *n != id);
        }
    }
}

impl ViewHierarchy for RecordingHierarchy {
    fn attach(&mut self, instance: InstanceId, layer: Layer) {
        let mut state = self.state.borrow_mut();
        let prev = state.nodes.insert(
            instance,
            NodeState {
                layer,
                active: true,
            },
        );
        if prev.is_some() {
            state.order.retain(|n| *n != instance);
        }
        state.order.push(instance);
    }

    fn set_active(&mut self, instance: InstanceId, active: bool) {
        match self.state.borrow_mut().nodes.get_mut(&instance) {
            Some(node) => node.active = active,
            None => tracing::debug!(?instance, "set_active on unattached instance"),
        }
    }
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/adapters/hierarchy.rs"]
mod tests;
