//! Lifecycle-record pool.
//!
//! Live records sit in a generational arena so a completion addressed to a
//! released record can never land on the record that reuses its slot.
//! Released records are recycled onto a free list and handed out again by
//! `acquire`, which keeps per-record allocations (name buffers, handler lists)
//! alive across show/close cycles.

use slotmap::{Key, SlotMap};

/// A record that can be wiped and reused.
pub trait Recyclable: Default {
    /// Clears every external reference (callbacks, params, handles).
    fn recycle(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PoolStats {
    pub live: usize,
    pub free: usize,
    pub constructed: usize,
}

pub struct ProcessPool<K: Key, R: Recyclable> {
    live: SlotMap<K, R>,
    free: Vec<R>,
    constructed: usize,
}

impl<K: Key, R: Recyclable> ProcessPool<K, R> {
    pub fn new() -> Self {
        Self {
            live: SlotMap::with_key(),
            free: Vec::new(),
            constructed: 0,
        }
    }

    pub fn acquire(&mut self) -> K {
        let record = match self.free.pop() {
            Some(record) => record,
            None => {
                self.constructed += 1;
                R::default()
            }
        };
        self.live.insert(record)
    }

    /// Recycles the record behind `key`. Returns false for stale keys.
    pub fn release(&mut self, key: K) -> bool {
        let Some(mut record) = self.live.remove(key) else {
            return false;
        };
        record.recycle();
        self.free.push(record);
        true
    }

    pub fn get(&self, key: K) -> Option<&R> {
        self.live.get(key)
    }

    pub fn get_mut(&mut self, key: K) -> Option<&mut R> {
        self.live.get_mut(key)
    }

    pub fn contains(&self, key: K) -> bool {
        self.live.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (K, &R)> {
        self.live.iter()
    }

    pub fn live_len(&self) -> usize {
        self.live.len()
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats {
            live: self.live.len(),
            free: self.free.len(),
            constructed: self.constructed,
        }
    }
}

impl<K: Key, R: Recyclable> Default for ProcessPool<K, R> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/pool.rs"]
mod tests;
