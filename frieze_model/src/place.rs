// Copyright 2025 the Frieze Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The place hierarchy.
//!
//! Places form a tree ordered by [`Level`]: every child is strictly more
//! specific than its parent (its level value is strictly smaller). The
//! [`Atlas`] owns every place of a project and always contains the
//! [`PlaceId::UNIVERSE`] sentinel, which is the parent of every place created
//! without an explicit parent.

use alloc::string::String;
use alloc::vec::Vec;

use hashbrown::HashMap;

use crate::error::ModelError;
use crate::id::{EntityKind, PlaceId};

/// Specificity of a place, from the most specific to the least.
///
/// The ordinal value is what the hierarchy invariant compares: a child's level
/// must be strictly less than its parent's.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Level {
    /// A street address or a single building.
    Address = 0,
    /// A street or a neighbourhood.
    Street = 1,
    /// A village, town or city.
    Town = 2,
    /// A county or district.
    County = 3,
    /// A region, state or province.
    Region = 4,
    /// A country.
    Country = 5,
    /// A continent.
    Continent = 6,
    /// A planet.
    Planet = 7,
    /// The universe; only the sentinel root uses it in practice.
    Universe = 8,
}

impl Level {
    /// Returns the ordinal value compared by the hierarchy invariant.
    #[must_use]
    pub const fn value(self) -> u8 {
        self as u8
    }
}

/// A node of the place hierarchy.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Place {
    id: PlaceId,
    name: String,
    level: Level,
    parent: Option<PlaceId>,
    children: Vec<PlaceId>,
}

impl Place {
    /// Returns the place identifier.
    #[must_use]
    pub fn id(&self) -> PlaceId {
        self.id
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the specificity level.
    #[must_use]
    pub fn level(&self) -> Level {
        self.level
    }

    /// Returns the parent place, `None` only for the sentinel root.
    #[must_use]
    pub fn parent(&self) -> Option<PlaceId> {
        self.parent
    }

    /// Returns the direct children in insertion order.
    #[must_use]
    pub fn children(&self) -> &[PlaceId] {
        &self.children
    }
}

/// Owner of a project's place hierarchy.
#[derive(Clone, Debug)]
pub struct Atlas {
    places: HashMap<PlaceId, Place>,
}

impl Default for Atlas {
    fn default() -> Self {
        Self::new()
    }
}

impl Atlas {
    /// Creates an atlas containing only the [`PlaceId::UNIVERSE`] sentinel.
    #[must_use]
    pub fn new() -> Self {
        let mut places = HashMap::new();
        places.insert(
            PlaceId::UNIVERSE,
            Place {
                id: PlaceId::UNIVERSE,
                name: String::from("Universe"),
                level: Level::Universe,
                parent: None,
                children: Vec::new(),
            },
        );
        Self { places }
    }

    /// Inserts a place under `parent` (or under the sentinel when `None`).
    ///
    /// Identifier uniqueness is the caller's responsibility (see
    /// [`Project`](crate::Project)); this only checks the hierarchy.
    ///
    /// # Errors
    ///
    /// - [`ModelError::DuplicateId`] if `id` is already in the atlas.
    /// - [`ModelError::UnknownPlace`] if `parent` is not in the atlas.
    /// - [`ModelError::LevelNesting`] if `level` is not strictly below the
    ///   parent's level.
    pub fn insert(
        &mut self,
        id: PlaceId,
        name: impl Into<String>,
        level: Level,
        parent: Option<PlaceId>,
    ) -> Result<(), ModelError> {
        if self.places.contains_key(&id) {
            return Err(ModelError::DuplicateId {
                kind: EntityKind::Place,
                id: id.get(),
            });
        }
        let parent = self.check_nesting(parent, level)?;

        self.places.insert(
            id,
            Place {
                id,
                name: name.into(),
                level,
                parent: Some(parent),
                children: Vec::new(),
            },
        );
        if let Some(parent) = self.places.get_mut(&parent) {
            parent.children.push(id);
        }
        Ok(())
    }

    /// Checks that a place of `level` may hang under `parent` (the sentinel
    /// when `None`), and returns the resolved parent.
    pub(crate) fn check_nesting(
        &self,
        parent: Option<PlaceId>,
        level: Level,
    ) -> Result<PlaceId, ModelError> {
        let parent = parent.unwrap_or(PlaceId::UNIVERSE);
        let parent_level = self.get(parent)?.level;
        if level >= parent_level {
            return Err(ModelError::LevelNesting {
                child: level,
                parent: parent_level,
            });
        }
        Ok(parent)
    }

    /// Returns the place, if it exists.
    #[must_use]
    pub fn place(&self, id: PlaceId) -> Option<&Place> {
        self.places.get(&id)
    }

    /// Returns the number of places, the sentinel included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.places.len()
    }

    /// Always `false`: the sentinel is always present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.places.is_empty()
    }

    /// Iterates all places in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = &Place> + '_ {
        self.places.values()
    }

    /// Returns `true` for places directly under the sentinel (or the sentinel itself).
    #[must_use]
    pub fn is_root(&self, id: PlaceId) -> bool {
        self.places
            .get(&id)
            .is_some_and(|p| matches!(p.parent, None | Some(PlaceId::UNIVERSE)))
    }

    /// Renames a place.
    ///
    /// # Errors
    ///
    /// [`ModelError::UnknownPlace`] if the place does not exist.
    pub fn rename(&mut self, id: PlaceId, name: impl Into<String>) -> Result<(), ModelError> {
        let place = self
            .places
            .get_mut(&id)
            .ok_or(ModelError::UnknownPlace(id))?;
        place.name = name.into();
        Ok(())
    }

    /// Changes the level of a place.
    ///
    /// # Errors
    ///
    /// - [`ModelError::UnknownPlace`] if the place does not exist.
    /// - [`ModelError::LevelConflict`] if a child's level is not strictly below
    ///   `level`, or the parent's level is not strictly above it.
    pub fn set_level(&mut self, id: PlaceId, level: Level) -> Result<(), ModelError> {
        let place = self.get(id)?;
        for &child in &place.children {
            if self.get(child)?.level >= level {
                return Err(ModelError::LevelConflict {
                    place: id,
                    requested: level,
                    conflicting: child,
                });
            }
        }
        if let Some(parent) = place.parent {
            if self.get(parent)?.level <= level {
                return Err(ModelError::LevelConflict {
                    place: id,
                    requested: level,
                    conflicting: parent,
                });
            }
        }
        if let Some(place) = self.places.get_mut(&id) {
            place.level = level;
        }
        Ok(())
    }

    /// Iterates `id` and its ancestors up to and including the sentinel.
    pub fn ancestors(&self, id: PlaceId) -> impl Iterator<Item = PlaceId> + '_ {
        let mut next = self.places.contains_key(&id).then_some(id);
        core::iter::from_fn(move || {
            let current = next?;
            next = self.places.get(&current).and_then(|p| p.parent);
            Some(current)
        })
    }

    /// Returns `true` if `inner == outer` or `inner` descends from `outer`.
    #[must_use]
    pub fn encompasses(&self, outer: PlaceId, inner: PlaceId) -> bool {
        self.ancestors(inner).any(|ancestor| ancestor == outer)
    }

    /// Returns the most specific place that encompasses both `a` and `b`.
    ///
    /// `None` only if either place is unknown.
    #[must_use]
    pub fn common_ancestor(&self, a: PlaceId, b: PlaceId) -> Option<PlaceId> {
        let chain: Vec<PlaceId> = self.ancestors(a).collect();
        self.ancestors(b).find(|candidate| chain.contains(candidate))
    }

    fn get(&self, id: PlaceId) -> Result<&Place, ModelError> {
        self.places.get(&id).ok_or(ModelError::UnknownPlace(id))
    }
}
