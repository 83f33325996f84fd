// Copyright 2025 the Frieze Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors raised by the layout model.

use core::fmt;

use frieze_model::{ModelError, PersonId, PlaceId, StayId};

use crate::ids::{DateHandleId, LinkId, PlotId, StayNodeId};

/// Violations of the merged-stay membership rules.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MergeError {
    /// The candidate belongs to another person.
    PersonMismatch {
        /// Owner of the merged stay.
        expected: PersonId,
        /// Owner of the candidate.
        found: PersonId,
    },
    /// The candidate's place is not inside the merged stay's forced place.
    OutsideForcedPlace {
        /// The forced place.
        forced: PlaceId,
        /// The candidate's place.
        place: PlaceId,
    },
    /// A merged stay must keep at least one member.
    LastMember(StayId),
    /// The stay is not a member of the merged stay.
    NotAMember(StayId),
}

impl fmt::Display for MergeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PersonMismatch { expected, found } => {
                write!(f, "cannot merge a stay of {found} into a stay of {expected}")
            }
            Self::OutsideForcedPlace { forced, place } => {
                write!(f, "{place} is not inside the forced {forced}")
            }
            Self::LastMember(stay) => {
                write!(f, "{stay} is the last member of its merged stay")
            }
            Self::NotAMember(stay) => write!(f, "{stay} is not a member of the merged stay"),
        }
    }
}

impl core::error::Error for MergeError {}

/// Errors returned by [`FriezeFreeMap`](crate::FriezeFreeMap) operations.
///
/// An operation that returns an error has left the map unchanged.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FreeMapError {
    /// The domain model rejected the request.
    Model(ModelError),
    /// A merge rule was violated.
    Merge(MergeError),
    /// The stay period is not displayed on this map.
    StayNotDisplayed(StayId),
    /// The stay node handle is stale or foreign.
    UnknownStayNode(StayNodeId),
    /// The stay node is a simple stay where a merged one was required.
    NotMerged(StayNodeId),
    /// The plot handle is stale or foreign.
    UnknownPlot(PlotId),
    /// The date handle is stale or foreign.
    UnknownHandle(DateHandleId),
    /// The link handle is stale or foreign.
    UnknownLink(LinkId),
    /// The person has no lane on this map.
    UnknownPersonLane(PersonId),
    /// A connector index past the end of a merged stay's connector list.
    ConnectorOutOfRange {
        /// The merged stay.
        node: StayNodeId,
        /// The rejected index.
        index: usize,
    },
    /// The operation is not supported for this entity.
    Unsupported(&'static str),
}

impl fmt::Display for FreeMapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Model(err) => err.fmt(f),
            Self::Merge(err) => err.fmt(f),
            Self::StayNotDisplayed(stay) => write!(f, "{stay} is not displayed"),
            Self::UnknownStayNode(node) => write!(f, "unknown stay node {node}"),
            Self::NotMerged(node) => write!(f, "stay node {node} is not merged"),
            Self::UnknownPlot(plot) => write!(f, "unknown plot {plot}"),
            Self::UnknownHandle(handle) => write!(f, "unknown date handle {handle}"),
            Self::UnknownLink(link) => write!(f, "unknown link {link}"),
            Self::UnknownPersonLane(person) => write!(f, "{person} has no lane"),
            Self::ConnectorOutOfRange { node, index } => {
                write!(f, "connector {index} is out of range for {node}")
            }
            Self::Unsupported(what) => write!(f, "unsupported: {what}"),
        }
    }
}

impl core::error::Error for FreeMapError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::Model(err) => Some(err),
            Self::Merge(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ModelError> for FreeMapError {
    fn from(err: ModelError) -> Self {
        Self::Model(err)
    }
}

impl From<MergeError> for FreeMapError {
    fn from(err: MergeError) -> Self {
        Self::Merge(err)
    }
}
