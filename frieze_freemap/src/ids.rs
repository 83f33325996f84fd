// Copyright 2025 the Frieze Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Generational handles for the entities owned by a [`FriezeFreeMap`](crate::FriezeFreeMap).
//!
//! Plots, links, date handles and stay nodes live in slot arenas. A handle is
//! a slot index plus a generation counter:
//!
//! - On insert, a fresh slot is allocated with generation `1`.
//! - On remove, the slot is freed; any handle that pointed to it is now stale.
//! - On reuse of a freed slot, its generation is incremented, producing a new,
//!   distinct handle.
//!
//! Stale handles never alias a different live entity because the generation
//! must match.

use alloc::vec::Vec;
use core::fmt;
use core::marker::PhantomData;

pub(crate) trait ArenaKey: Copy {
    fn from_parts(idx: u32, generation: u32) -> Self;
    fn idx(self) -> usize;
    fn generation(self) -> u32;
}

macro_rules! arena_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(u32, u32);

        impl $name {
            /// A handle that never refers to a live entry: generations start at `1`.
            #[allow(dead_code, reason = "only some handle kinds need a placeholder")]
            pub(crate) const DANGLING: Self = Self(u32::MAX, 0);

            /// Returns the generation of the slot this handle points to.
            #[must_use]
            pub const fn generation(self) -> u32 {
                self.1
            }
        }

        impl ArenaKey for $name {
            #[inline]
            fn from_parts(idx: u32, generation: u32) -> Self {
                Self(idx, generation)
            }

            #[inline]
            fn idx(self) -> usize {
                self.0 as usize
            }

            #[inline]
            fn generation(self) -> u32 {
                self.1
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({}v{})", stringify!($name), self.0, self.1)
            }
        }
    };
}

arena_id!(
    /// Handle of a [`Plot`](crate::Plot).
    PlotId
);
arena_id!(
    /// Handle of a [`Link`](crate::Link).
    LinkId
);
arena_id!(
    /// Handle of a [`DateHandle`](crate::DateHandle).
    DateHandleId
);
arena_id!(
    /// Handle of a displayed [`FreeMapStay`](crate::FreeMapStay).
    StayNodeId
);

struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

/// Slot arena addressed by generational handles.
pub(crate) struct Arena<K, T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    len: usize,
    _marker: PhantomData<fn() -> K>,
}

impl<K, T: fmt::Debug> fmt::Debug for Arena<K, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.slots.iter().filter_map(|s| s.value.as_ref()))
            .finish()
    }
}

impl<K: ArenaKey, T> Default for Arena<K, T> {
    fn default() -> Self {
        Self::new()
    }
}

#[allow(
    clippy::cast_possible_truncation,
    reason = "slot indices are bounded by u32 handles"
)]
impl<K: ArenaKey, T> Arena<K, T> {
    pub(crate) fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            len: 0,
            _marker: PhantomData,
        }
    }

    /// Returns the handle the next [`insert`](Self::insert) will produce.
    ///
    /// Lets an entity be created with references back to its own handle.
    pub(crate) fn next_key(&self) -> K {
        match self.free.last() {
            Some(&idx) => K::from_parts(idx, self.slots[idx as usize].generation + 1),
            None => K::from_parts(self.slots.len() as u32, 1),
        }
    }

    pub(crate) fn insert(&mut self, value: T) -> K {
        let key = self.next_key();
        if let Some(idx) = self.free.pop() {
            let slot = &mut self.slots[idx as usize];
            slot.generation = key.generation();
            slot.value = Some(value);
        } else {
            self.slots.push(Slot {
                generation: 1,
                value: Some(value),
            });
        }
        self.len += 1;
        key
    }

    pub(crate) fn remove(&mut self, key: K) -> Option<T> {
        let slot = self.slots.get_mut(key.idx())?;
        if slot.generation != key.generation() {
            return None;
        }
        let value = slot.value.take()?;
        self.free.push(key.idx() as u32);
        self.len -= 1;
        Some(value)
    }

    pub(crate) fn get(&self, key: K) -> Option<&T> {
        self.slots
            .get(key.idx())
            .filter(|slot| slot.generation == key.generation())
            .and_then(|slot| slot.value.as_ref())
    }

    pub(crate) fn get_mut(&mut self, key: K) -> Option<&mut T> {
        self.slots
            .get_mut(key.idx())
            .filter(|slot| slot.generation == key.generation())
            .and_then(|slot| slot.value.as_mut())
    }

    pub(crate) fn contains(&self, key: K) -> bool {
        self.get(key).is_some()
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// Iterates live entries in slot order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = (K, &T)> + '_ {
        self.slots.iter().enumerate().filter_map(|(idx, slot)| {
            slot.value
                .as_ref()
                .map(|value| (K::from_parts(idx as u32, slot.generation), value))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reused_slots_bump_the_generation() {
        let mut arena = Arena::<PlotId, &str>::new();
        let a = arena.insert("a");
        assert_eq!(a.generation(), 1);
        assert_eq!(arena.remove(a), Some("a"));
        assert_eq!(arena.get(a), None);

        let predicted = arena.next_key();
        let b = arena.insert("b");
        assert_eq!(b, predicted);
        assert_eq!(b.generation(), 2);
        // The stale handle does not alias the new entry.
        assert_eq!(arena.remove(a), None);
        assert_eq!(arena.get(b), Some(&"b"));
        assert_eq!(arena.len(), 1);
    }

    #[test]
    fn iter_yields_live_entries_in_slot_order() {
        let mut arena = Arena::<LinkId, u8>::new();
        let first = arena.insert(1);
        let second = arena.insert(2);
        let third = arena.insert(3);
        arena.remove(second);

        let live: Vec<_> = arena.iter().collect();
        assert_eq!(live, [(first, &1), (third, &3)]);
    }
}
