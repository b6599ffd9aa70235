//! Host-driven timer: time only moves when the host calls [`ManualTimer::advance`].
//!
//! The host keeps one clone per clock (scaled and real-time) and advances each
//! by the frame delta it wants that clock to see.

use std::cell::RefCell;
use std::rc::Rc;

use crate::kernel::services::bus::TimerFire;
use crate::kernel::services::ports::{Timer, TimerId};

const DUE_EPSILON: f64 = 1e-6;

#[derive(Debug)]
struct Entry {
    id: TimerId,
    due: f64,
    fire: TimerFire,
}

#[derive(Debug, Default)]
struct ClockState {
    now: f64,
    next_id: u64,
    entries: Vec<Entry>,
}

#[derive(Debug, Clone, Default)]
pub struct ManualTimer {
    state: Rc<RefCell<ClockState>>,
}

impl ManualTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> f64 {
        self.state.borrow().now
    }

    pub fn pending_len(&self) -> usize {
        self.state.borrow().entries.len()
    }

    /// Moves the clock forward and fires everything that came due, earliest
    /// first. Returns the number of fired timers.
    pub fn advance(&self, dt: f32) -> usize {
        let due = {
            let mut state = self.state.borrow_mut();
            state.now += f64::from(dt.max(0.0));
            let now = state.now;
            let (mut due, rest): (Vec<Entry>, Vec<Entry>) = state
                .entries
                .drain(..)
                .partition(|e| e.due <= now + DUE_EPSILON);
            state.entries = rest;
            due.sort_by(|a, b| a.due.total_cmp(&b.due).then(a.id.cmp(&b.id)));
            due
        };
        let fired = due.len();
        for entry in due {
            entry.fire.fire();
        }
        fired
    }
}

impl Timer for ManualTimer {
    fn register(&mut self, delay: f32, fire: TimerFire) -> TimerId {
        let mut state = self.state.borrow_mut();
        state.next_id += 1;
        let id = TimerId(state.next_id);
        let delay = if delay.is_finite() { delay.max(0.0) } else { 0.0 };
        let due = state.now + f64::from(delay);
        state.entries.push(Entry { id, due, fire });
        id
    }

    fn unregister(&mut self, id: TimerId) {
        self.state.borrow_mut().entries.retain(|e| e.id != id);
    }
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/adapters/timer.rs"]
mod tests;
