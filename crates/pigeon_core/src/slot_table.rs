//! Dense per-agent side tables keyed by generational entity handles.
//!
//! Slots are indexed by `Entity::id()`. Each slot remembers the full handle it
//! was written for, so a slot reused by a newer entity reads as empty until it
//! is written again.

use hecs::Entity;

#[derive(Debug, Clone)]
pub struct SlotTable<T> {
    slots: Vec<Option<(Entity, T)>>,
    len: usize,
}

impl<T> Default for SlotTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SlotTable<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            len: 0,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    fn slot(entity: Entity) -> usize {
        entity.id() as usize
    }

    #[must_use]
    pub fn get(&self, entity: Entity) -> Option<&T> {
        match self.slots.get(Self::slot(entity)) {
            Some(Some((owner, value))) if *owner == entity => Some(value),
            _ => None,
        }
    }

    pub fn get_mut(&mut self, entity: Entity) -> Option<&mut T> {
        match self.slots.get_mut(Self::slot(entity)) {
            Some(Some((owner, value))) if *owner == entity => Some(value),
            _ => None,
        }
    }

    #[must_use]
    pub fn contains(&self, entity: Entity) -> bool {
        self.get(entity).is_some()
    }

    /// Writes `value` for `entity`, returning the previous value for the same
    /// handle. A stale value left by an older generation is discarded.
    pub fn insert(&mut self, entity: Entity, value: T) -> Option<T> {
        let idx = Self::slot(entity);
        if idx >= self.slots.len() {
            self.slots.resize_with(idx + 1, || None);
        }
        match self.slots[idx].replace((entity, value)) {
            Some((owner, old)) if owner == entity => Some(old),
            Some(_) => None,
            None => {
                self.len += 1;
                None
            }
        }
    }

    pub fn get_or_insert_with<F>(&mut self, entity: Entity, f: F) -> &mut T
    where
        F: FnOnce() -> T,
    {
        if !self.contains(entity) {
            self.insert(entity, f());
        }
        let idx = Self::slot(entity);
        match &mut self.slots[idx] {
            Some((_, value)) => value,
            None => unreachable!("slot written above"),
        }
    }

    pub fn remove(&mut self, entity: Entity) -> Option<T> {
        let idx = Self::slot(entity);
        match self.slots.get(idx) {
            Some(Some((owner, _))) if *owner == entity => {}
            _ => return None,
        }
        self.len -= 1;
        self.slots[idx].take().map(|(_, v)| v)
    }

    /// Keeps only entries for which `keep` returns true.
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(Entity, &mut T) -> bool,
    {
        for slot in &mut self.slots {
            let drop_it = match slot {
                Some((owner, value)) => !keep(*owner, value),
                None => false,
            };
            if drop_it {
                *slot = None;
                self.len -= 1;
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Entity, &T)> {
        self.slots
            .iter()
            .filter_map(|s| s.as_ref().map(|(e, v)| (*e, v)))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Entity, &mut T)> {
        self.slots
            .iter_mut()
            .filter_map(|s| s.as_mut().map(|(e, v)| (*e, v)))
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.len = 0;
    }
}
