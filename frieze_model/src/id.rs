// Copyright 2025 the Frieze Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Entity identifiers and the per-session [`IdAllocator`].
//!
//! Every domain entity (person, place, stay period, frieze, portrait) carries a
//! compact `u64` identifier that is unique within one [`Project`](crate::Project).
//! Identifiers are handed out by an [`IdAllocator`] owned by that project, so
//! several independent projects can live in one process without sharing state.

use core::fmt;
use core::marker::PhantomData;

use hashbrown::HashSet;

use crate::error::ModelError;

/// The kind of entity an identifier refers to.
///
/// Used in error reporting and in the `Display` form of identifiers.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EntityKind {
    /// A [`Person`](crate::Person).
    Person,
    /// A [`Place`](crate::Place).
    Place,
    /// A [`StayPeriod`](crate::StayPeriod).
    Stay,
    /// A [`Frieze`](crate::Frieze).
    Frieze,
    /// A [`Portrait`](crate::Portrait).
    Portrait,
}

impl EntityKind {
    const fn label(self) -> &'static str {
        match self {
            Self::Person => "person",
            Self::Place => "place",
            Self::Stay => "stay",
            Self::Frieze => "frieze",
            Self::Portrait => "portrait",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Common behavior of the typed entity identifiers.
pub trait EntityId: Copy + Eq + core::hash::Hash {
    /// The entity kind this identifier refers to.
    const KIND: EntityKind;

    /// Wraps a raw identifier value.
    fn from_raw(raw: u64) -> Self;

    /// Returns the raw identifier value.
    fn raw(self) -> u64;
}

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident, $kind:expr) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[cfg_attr(feature = "serde", serde(transparent))]
        pub struct $name(u64);

        impl $name {
            /// Creates an identifier from its raw value.
            ///
            /// Prefer the [`Project`](crate::Project) factories; this exists for
            /// import paths where identity already exists externally.
            #[must_use]
            #[inline]
            pub const fn new(raw: u64) -> Self {
                Self(raw)
            }

            /// Returns the raw identifier value.
            #[must_use]
            #[inline]
            pub const fn get(self) -> u64 {
                self.0
            }
        }

        impl EntityId for $name {
            const KIND: EntityKind = $kind;

            #[inline]
            fn from_raw(raw: u64) -> Self {
                Self(raw)
            }

            #[inline]
            fn raw(self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}#{}", $kind, self.0)
            }
        }
    };
}

entity_id!(
    /// Identifier of a [`Person`](crate::Person).
    PersonId,
    EntityKind::Person
);
entity_id!(
    /// Identifier of a [`Place`](crate::Place).
    ///
    /// [`PlaceId::UNIVERSE`] is reserved for the sentinel root of every
    /// [`Atlas`](crate::Atlas).
    PlaceId,
    EntityKind::Place
);
entity_id!(
    /// Identifier of a [`StayPeriod`](crate::StayPeriod).
    StayId,
    EntityKind::Stay
);
entity_id!(
    /// Identifier of a [`Frieze`](crate::Frieze).
    FriezeId,
    EntityKind::Frieze
);
entity_id!(
    /// Identifier of a [`Portrait`](crate::Portrait).
    PortraitId,
    EntityKind::Portrait
);

impl PlaceId {
    /// The sentinel root place that every other place descends from.
    pub const UNIVERSE: Self = Self(0);
}

/// Hands out unique identifiers of one entity kind.
///
/// Allocation starts at `1` and skips values that were reserved explicitly.
/// Explicit reservation is how import paths restore persisted identifiers; a
/// second reservation of the same value is a [`ModelError::DuplicateId`].
pub struct IdAllocator<K> {
    next: u64,
    taken: HashSet<u64>,
    _marker: PhantomData<fn() -> K>,
}

impl<K> fmt::Debug for IdAllocator<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdAllocator")
            .field("next", &self.next)
            .field("taken", &self.taken.len())
            .finish_non_exhaustive()
    }
}

impl<K: EntityId> Default for IdAllocator<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: EntityId> IdAllocator<K> {
    /// Creates an allocator whose first identifier is `1`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next: 1,
            taken: HashSet::new(),
            _marker: PhantomData,
        }
    }

    /// Returns a fresh identifier that has never been handed out or reserved.
    pub fn allocate(&mut self) -> K {
        while self.taken.contains(&self.next) {
            self.next += 1;
        }
        let raw = self.next;
        self.taken.insert(raw);
        self.next += 1;
        K::from_raw(raw)
    }

    /// Reserves a caller-provided identifier.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::DuplicateId`] when the identifier is already in use.
    pub fn reserve(&mut self, id: K) -> Result<(), ModelError> {
        if !self.taken.insert(id.raw()) {
            return Err(ModelError::DuplicateId {
                kind: K::KIND,
                id: id.raw(),
            });
        }
        Ok(())
    }

    /// Returns `true` if the identifier has been allocated or reserved.
    #[must_use]
    pub fn is_taken(&self, id: K) -> bool {
        self.taken.contains(&id.raw())
    }

    /// Returns the number of identifiers in use.
    #[must_use]
    pub fn len(&self) -> usize {
        self.taken.len()
    }

    /// Returns `true` if no identifier has been handed out yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.taken.is_empty()
    }
}
