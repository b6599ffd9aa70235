//! Focus chain: the ordered set of participants that may hold input focus.
//!
//! Only the last entry holds focus. The window is inserted at the base, popups
//! and the loading-mask placeholder are appended. Mutations return the focus
//! transition they caused; the caller delivers it before doing anything else,
//! so a participant is never signalled in the middle of a stack mutation.

use super::popup::PopupKey;
use super::window::WindowKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FocusId {
    Window(WindowKey),
    Popup(PopupKey),
    LoadingMask,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusTransition {
    pub lost: Option<FocusId>,
    pub gained: Option<FocusId>,
}

#[derive(Debug, Default)]
pub struct FocusChain {
    entries: Vec<FocusId>,
    current: Option<FocusId>,
}

impl FocusChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, id: FocusId, is_base: bool, dispatch: bool) -> Option<FocusTransition> {
        if is_base {
            self.entries.insert(0, id);
        } else {
            self.entries.push(id);
        }
        if dispatch {
            self.recompute()
        } else {
            None
        }
    }

    pub fn remove(&mut self, id: FocusId, dispatch: bool) -> Option<FocusTransition> {
        let idx = self.entries.iter().position(|e| *e == id)?;
        self.entries.remove(idx);
        if dispatch {
            self.recompute()
        } else {
            None
        }
    }

    /// Participant that last received a gain-focus signal.
    pub fn current(&self) -> Option<FocusId> {
        self.current
    }

    /// Participant that key events are routed to.
    pub fn top(&self) -> Option<FocusId> {
        self.entries.last().copied()
    }

    pub fn contains(&self, id: FocusId) -> bool {
        self.entries.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = FocusId> + '_ {
        self.entries.iter().copied()
    }

    fn recompute(&mut self) -> Option<FocusTransition> {
        let top = self.top();
        if top == self.current {
            return None;
        }
        let lost = std::mem::replace(&mut self.current, top);
        tracing::trace!(?lost, gained = ?top, "focus moved");
        Some(FocusTransition { lost, gained: top })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/focus.rs"]
mod tests;
