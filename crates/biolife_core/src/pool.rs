//! Fixed-capacity slot allocator with stable indices.
//!
//! Slots are never compacted or moved: removing an entity only clears its
//! `active` flag, so a slot index keeps naming the same storage for the
//! lifetime of the pool. A recycled slot still holds the previous occupant's
//! data; whoever claims it through [`EntityPool::add`] must reset it.

use biolife_data::{Cell, Plant};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    #[error("pool is full (capacity {capacity})")]
    Full { capacity: usize },
}

/// Items that remember which slot they live in.
pub trait PoolItem: Default {
    fn slot_index(&self) -> usize;
    fn bind_slot(&mut self, slot: usize);
}

impl PoolItem for Cell {
    fn slot_index(&self) -> usize {
        self.slot
    }

    fn bind_slot(&mut self, slot: usize) {
        self.slot = slot;
    }
}

impl PoolItem for Plant {
    fn slot_index(&self) -> usize {
        self.slot
    }

    fn bind_slot(&mut self, slot: usize) {
        self.slot = slot;
    }
}

#[derive(Debug, Clone)]
struct Slot<T> {
    item: T,
    active: bool,
}

#[derive(Debug, Clone)]
pub struct EntityPool<T> {
    slots: Vec<Slot<T>>,
    capacity: usize,
    active_count: usize,
    failed_adds: u64,
}

impl<T: PoolItem> EntityPool<T> {
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            capacity,
            active_count: 0,
            failed_adds: 0,
        }
    }

    /// Appends a fully built item as a new active slot.
    ///
    /// Only meant for populating a fresh pool.
    pub fn emplace(&mut self, mut item: T) -> Result<usize, PoolError> {
        if self.slots.len() >= self.capacity {
            return Err(PoolError::Full {
                capacity: self.capacity,
            });
        }
        let slot = self.slots.len();
        item.bind_slot(slot);
        self.slots.push(Slot { item, active: true });
        self.active_count += 1;
        Ok(slot)
    }

    /// Claims the first inactive slot, growing the backing store while it is
    /// below capacity. Returns `None` when every slot is in use.
    ///
    /// The claimed slot may hold stale data from a retired entity.
    pub fn add(&mut self) -> Option<usize> {
        if let Some(slot) = self.slots.iter().position(|s| !s.active) {
            self.slots[slot].active = true;
            self.active_count += 1;
            return Some(slot);
        }
        if self.slots.len() < self.capacity {
            let slot = self.slots.len();
            let mut item = T::default();
            item.bind_slot(slot);
            self.slots.push(Slot { item, active: true });
            self.active_count += 1;
            return Some(slot);
        }
        self.failed_adds += 1;
        None
    }

    /// Retires a slot. Returns `false` if it was not active.
    pub fn remove(&mut self, slot: usize) -> bool {
        match self.slots.get_mut(slot) {
            Some(s) if s.active => {
                s.active = false;
                self.active_count -= 1;
                true
            }
            _ => false,
        }
    }

    /// Deactivates every slot without touching the stored items.
    pub fn clear(&mut self) {
        for s in &mut self.slots {
            s.active = false;
        }
        self.active_count = 0;
    }

    /// Direct slot access, active or not.
    ///
    /// # Panics
    /// Panics when `slot` is past the backing store; indices always come from
    /// the pool itself, so that is a caller bug.
    #[must_use]
    pub fn at(&self, slot: usize) -> &T {
        &self.slots[slot].item
    }

    /// Mutable counterpart of [`EntityPool::at`].
    ///
    /// # Panics
    /// Panics when `slot` is past the backing store.
    pub fn at_mut(&mut self, slot: usize) -> &mut T {
        &mut self.slots[slot].item
    }

    /// The item in `slot` if that slot is active.
    #[must_use]
    pub fn get(&self, slot: usize) -> Option<&T> {
        self.slots
            .get(slot)
            .filter(|s| s.active)
            .map(|s| &s.item)
    }

    pub fn get_mut(&mut self, slot: usize) -> Option<&mut T> {
        self.slots
            .get_mut(slot)
            .filter(|s| s.active)
            .map(|s| &mut s.item)
    }

    /// Two distinct active slots borrowed mutably at once.
    pub fn get_pair_mut(&mut self, a: usize, b: usize) -> Option<(&mut T, &mut T)> {
        if a == b || !self.is_active(a) || !self.is_active(b) {
            return None;
        }
        if a < b {
            let (lo, hi) = self.slots.split_at_mut(b);
            Some((&mut lo[a].item, &mut hi[0].item))
        } else {
            let (lo, hi) = self.slots.split_at_mut(a);
            Some((&mut hi[0].item, &mut lo[b].item))
        }
    }

    #[must_use]
    pub fn is_active(&self, slot: usize) -> bool {
        self.slots.get(slot).is_some_and(|s| s.active)
    }

    /// Active items in slot order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.slots.iter().filter(|s| s.active).map(|s| &s.item)
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.slots
            .iter_mut()
            .filter(|s| s.active)
            .map(|s| &mut s.item)
    }

    /// Active slot indices in ascending order.
    pub fn active_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, s)| s.active)
            .map(|(i, _)| i)
    }

    /// Fills `out` with the active slot indices, reusing its allocation.
    pub fn collect_indices(&self, out: &mut Vec<usize>) {
        out.clear();
        out.extend(self.active_indices());
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.active_count
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.active_count == 0
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.active_count == self.capacity
    }

    /// Slots ever allocated, active or not.
    #[must_use]
    pub fn backing_len(&self) -> usize {
        self.slots.len()
    }

    /// Number of `add` calls refused because the pool was full.
    #[must_use]
    pub fn failed_adds(&self) -> u64 {
        self.failed_adds
    }
}
