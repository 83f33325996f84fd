// Copyright 2025 the Frieze Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors raised by the domain model.

use core::fmt;

use crate::id::{EntityKind, FriezeId, PersonId, PlaceId, StayId};
use crate::place::Level;

/// Invariant violations detected by the domain model.
///
/// None of these are transient: they describe a caller passing inconsistent
/// data, and the operation that returned them has left the model unchanged.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ModelError {
    /// An identifier was created or reserved twice.
    DuplicateId {
        /// Kind of the entity.
        kind: EntityKind,
        /// The raw identifier value.
        id: u64,
    },
    /// A place would be nested under a parent that is not strictly less specific.
    LevelNesting {
        /// Level requested for the child.
        child: Level,
        /// Level of the would-be parent.
        parent: Level,
    },
    /// Changing a place's level would invert the hierarchy around it.
    LevelConflict {
        /// The place whose level was being changed.
        place: PlaceId,
        /// The rejected level.
        requested: Level,
        /// The neighbouring place (child or parent) that conflicts.
        conflicting: PlaceId,
    },
    /// The place is not part of the atlas.
    UnknownPlace(PlaceId),
    /// The person is not part of the project.
    UnknownPerson(PersonId),
    /// The stay period is not part of the project.
    UnknownStay(StayId),
    /// The frieze is not part of the project.
    UnknownFrieze(FriezeId),
    /// A period ends before it starts.
    InvertedPeriod {
        /// Start as a comparable scalar.
        start: i64,
        /// End as a comparable scalar.
        end: i64,
    },
    /// Calendar components do not describe a real date.
    InvalidCalendarDate {
        /// Year component.
        year: i32,
        /// Month component (1-based).
        month: u8,
        /// Day component (1-based).
        day: u8,
    },
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateId { kind, id } => write!(f, "{kind} id {id} is already in use"),
            Self::LevelNesting { child, parent } => write!(
                f,
                "a {child:?} place cannot be nested under a {parent:?} place"
            ),
            Self::LevelConflict {
                place,
                requested,
                conflicting,
            } => write!(
                f,
                "level {requested:?} for {place} conflicts with the level of {conflicting}"
            ),
            Self::UnknownPlace(id) => write!(f, "unknown {id}"),
            Self::UnknownPerson(id) => write!(f, "unknown {id}"),
            Self::UnknownStay(id) => write!(f, "unknown {id}"),
            Self::UnknownFrieze(id) => write!(f, "unknown {id}"),
            Self::InvertedPeriod { start, end } => {
                write!(f, "period ends at {end} before it starts at {start}")
            }
            Self::InvalidCalendarDate { year, month, day } => {
                write!(f, "{year:04}-{month:02}-{day:02} is not a calendar date")
            }
        }
    }
}

impl core::error::Error for ModelError {}
