// Copyright 2025 the Frieze Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Plots and the links drawn between them.

use frieze_model::{PersonId, PlaceId};
use kurbo::Point;

use crate::ids::{DateHandleId, PlotId, StayNodeId};

/// Which boundary of a stay a plot marks.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PlotKind {
    /// Arrival.
    Start,
    /// Departure.
    End,
}

/// A positioned marker for the start or the end of a displayed stay.
///
/// A plot is identified by its stay node and its [`PlotKind`]. Its x
/// coordinate belongs to the [`DateHandle`](crate::DateHandle) it is bound
/// to; its y coordinate is derived from the place lane it sits in.
#[derive(Clone, Debug, PartialEq)]
pub struct Plot {
    pub(crate) node: StayNodeId,
    pub(crate) kind: PlotKind,
    pub(crate) date: i64,
    pub(crate) person: PersonId,
    pub(crate) place: PlaceId,
    pub(crate) handle: DateHandleId,
    pub(crate) position: Point,
    pub(crate) visible: bool,
    pub(crate) size: f64,
}

impl Plot {
    /// Returns the stay node this plot belongs to.
    #[must_use]
    pub fn node(&self) -> StayNodeId {
        self.node
    }

    /// Returns which boundary this plot marks.
    #[must_use]
    pub fn kind(&self) -> PlotKind {
        self.kind
    }

    /// Returns the date as a comparable scalar.
    #[must_use]
    pub fn date(&self) -> i64 {
        self.date
    }

    /// Returns the owning person.
    #[must_use]
    pub fn person(&self) -> PersonId {
        self.person
    }

    /// Returns the place lane the plot sits in.
    #[must_use]
    pub fn place(&self) -> PlaceId {
        self.place
    }

    /// Returns the date handle that owns the plot's x coordinate.
    #[must_use]
    pub fn handle(&self) -> DateHandleId {
        self.handle
    }

    /// Returns the position.
    #[must_use]
    pub fn position(&self) -> Point {
        self.position
    }

    /// Returns `true` if the plot is shown.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Returns the render size.
    #[must_use]
    pub fn size(&self) -> f64 {
        self.size
    }
}

/// What a link connects.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum LinkKind {
    /// From the start plot to the end plot of one stay.
    Stay,
    /// From the end plot of a stay to the start plot of the next one.
    Travel,
    /// From a portrait to the person's first plot.
    Init,
}

/// One end of a [`Link`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum LinkEnd {
    /// A plot.
    Plot(PlotId),
    /// The portrait of a person.
    Portrait(PersonId),
}

/// Drawing hint for a link.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LinkShape {
    /// A straight segment.
    #[default]
    Straight,
    /// A smooth curve.
    Curved,
    /// Horizontal then vertical segments.
    Elbow,
}

/// A connector between two link ends.
#[derive(Clone, Debug, PartialEq)]
pub struct Link {
    pub(crate) kind: LinkKind,
    pub(crate) person: PersonId,
    pub(crate) node: Option<StayNodeId>,
    pub(crate) from: LinkEnd,
    pub(crate) to: LinkEnd,
    pub(crate) shape: LinkShape,
}

impl Link {
    pub(crate) fn new(kind: LinkKind, person: PersonId, from: LinkEnd, to: LinkEnd) -> Self {
        Self {
            kind,
            person,
            node: None,
            from,
            to,
            shape: LinkShape::default(),
        }
    }

    /// Returns what the link connects.
    #[must_use]
    pub fn kind(&self) -> LinkKind {
        self.kind
    }

    /// Returns the owning person.
    #[must_use]
    pub fn person(&self) -> PersonId {
        self.person
    }

    /// Returns the stay node of a [`LinkKind::Stay`] link.
    #[must_use]
    pub fn node(&self) -> Option<StayNodeId> {
        self.node
    }

    /// Returns the origin.
    #[must_use]
    pub fn from(&self) -> LinkEnd {
        self.from
    }

    /// Returns the destination.
    #[must_use]
    pub fn to(&self) -> LinkEnd {
        self.to
    }

    /// Returns the drawing hint.
    #[must_use]
    pub fn shape(&self) -> LinkShape {
        self.shape
    }

    /// Returns the plots at both ends, if both ends are plots.
    #[must_use]
    pub fn plot_pair(&self) -> Option<(PlotId, PlotId)> {
        match (self.from, self.to) {
            (LinkEnd::Plot(from), LinkEnd::Plot(to)) => Some((from, to)),
            _ => None,
        }
    }
}
