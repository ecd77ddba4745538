//! Arena - slot storage with stable integer ids
//!
//! Bodies and constraints live in arenas instead of being referenced by
//! direct handles. Removing an entry leaves a tombstone in its slot, so a
//! removal in the middle of a pass never shifts other entries, and ids are
//! handed out monotonically and never reused within a session.

/// Slot storage addressed by `u32` ids.
#[derive(Clone, Debug)]
pub struct Arena<T> {
    slots: Vec<Option<T>>,
    live: usize,
}

impl<T> Arena<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            live: 0,
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            live: 0,
        }
    }

    /// Store a value and return its id. Ids only ever grow.
    pub fn insert(&mut self, value: T) -> u32 {
        let id = self.slots.len() as u32;
        self.slots.push(Some(value));
        self.live += 1;
        id
    }

    /// Tombstone a slot and hand the value back.
    pub fn remove(&mut self, id: u32) -> Option<T> {
        let taken = self.slots.get_mut(id as usize)?.take();
        if taken.is_some() {
            self.live -= 1;
        }
        taken
    }

    #[inline]
    pub fn get(&self, id: u32) -> Option<&T> {
        self.slots.get(id as usize)?.as_ref()
    }

    #[inline]
    pub fn get_mut(&mut self, id: u32) -> Option<&mut T> {
        self.slots.get_mut(id as usize)?.as_mut()
    }

    #[inline]
    pub fn contains(&self, id: u32) -> bool {
        self.get(id).is_some()
    }

    /// Two distinct live entries borrowed mutably at once.
    ///
    /// Returns `None` when `a == b` or either slot is empty.
    pub fn pair_mut(&mut self, a: u32, b: u32) -> Option<(&mut T, &mut T)> {
        if a == b {
            return None;
        }
        let (lo, hi, swapped) = if a < b { (a, b, false) } else { (b, a, true) };
        if hi as usize >= self.slots.len() {
            return None;
        }

        let (head, tail) = self.slots.split_at_mut(hi as usize);
        let lo_ref = head[lo as usize].as_mut()?;
        let hi_ref = tail[0].as_mut()?;

        if swapped {
            Some((hi_ref, lo_ref))
        } else {
            Some((lo_ref, hi_ref))
        }
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Live entries in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &T)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|v| (i as u32, v)))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (u32, &mut T)> {
        self.slots
            .iter_mut()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_mut().map(|v| (i as u32, v)))
    }

    /// Ids of live entries, ascending.
    pub fn ids(&self) -> Vec<u32> {
        self.iter().map(|(id, _)| id).collect()
    }

    /// Drop every entry. Ids keep counting from where they were.
    pub fn clear(&mut self) {
        for slot in self.slots.iter_mut() {
            *slot = None;
        }
        self.live = 0;
    }
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}
