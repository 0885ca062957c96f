// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Component identifiers and the id-indexed registry.
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use rustc_hash::FxHashMap;

/// Opaque handle callers use to refer to graph components.
///
/// Ids come from a process-wide counter: they are unique for the life of the
/// process and increase in creation order, so an id is never handed out
/// twice even across graphs.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct ComponentId(u64);

impl ComponentId {
    /// Wraps a raw id received from a caller.
    pub const fn from_raw(value: u64) -> Self {
        Self(value)
    }

    /// Raw integer value.
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

fn allocate() -> ComponentId {
    ComponentId(NEXT_ID.fetch_add(1, Ordering::Relaxed))
}

/// Arena of values indexed by [`ComponentId`].
///
/// Registration is append-only. Lookups go through a hash index so callers
/// holding stale or foreign ids get `None` instead of someone else's
/// component. Iteration follows registration order.
#[derive(Debug)]
pub struct IdRegistry<T> {
    slots: Vec<(ComponentId, T)>,
    index: FxHashMap<ComponentId, usize>,
}

impl<T> Default for IdRegistry<T> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            index: FxHashMap::default(),
        }
    }
}

impl<T> IdRegistry<T> {
    /// Allocates a fresh id, builds the value with it and stores it.
    pub fn register(&mut self, make: impl FnOnce(ComponentId) -> T) -> ComponentId {
        let id = allocate();
        self.index.insert(id, self.slots.len());
        self.slots.push((id, make(id)));
        id
    }

    /// Looks up a value by id.
    pub fn resolve(&self, id: ComponentId) -> Option<&T> {
        self.index.get(&id).map(|&slot| &self.slots[slot].1)
    }

    /// Mutable lookup by id.
    pub fn resolve_mut(&mut self, id: ComponentId) -> Option<&mut T> {
        let slot = *self.index.get(&id)?;
        Some(&mut self.slots[slot].1)
    }

    /// Whether `id` was registered here.
    pub fn contains(&self, id: ComponentId) -> bool {
        self.index.contains_key(&id)
    }

    /// Number of registered values.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether nothing has been registered.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Values in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (ComponentId, &T)> {
        self.slots.iter().map(|(id, value)| (*id, value))
    }
}
