// Copyright 2025 the Frieze Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Change notifications.
//!
//! Every mutation of a [`FriezeFreeMap`](crate::FriezeFreeMap) reports what
//! it changed as a [`FreeMapEvent`]. The event set is closed: each entity has
//! its own enum of kinds and consumers match them exhaustively, so a new kind
//! is a compile error in every consumer rather than a silently ignored value.
//!
//! Subscribers are called synchronously, in registration order, before the
//! mutating call returns.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

use frieze_model::{PersonId, PlaceId, StayId};
use kurbo::Point;

use crate::config::TimeDisplayMode;
use crate::ids::{DateHandleId, LinkId, PlotId, StayNodeId};

/// A change to one entity of the map.
#[derive(Clone, Debug, PartialEq)]
pub enum FreeMapEvent {
    /// A person lane changed.
    Person(PersonId, PersonEvent),
    /// A place lane changed.
    Place(PlaceId, PlaceEvent),
    /// A plot changed.
    Plot(PlotId, PlotEvent),
    /// A date handle changed.
    DateHandle(DateHandleId, DateHandleEvent),
    /// A merged stay changed.
    MergedStay(StayNodeId, MergedStayEvent),
    /// A portrait moved.
    Portrait(PersonId, PortraitEvent),
    /// A map-wide layout pass ran.
    Layout(LayoutEvent),
}

/// Changes to a person lane.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum PersonEvent {
    /// The person lane was created.
    LaneAdded,
    /// The person lane was removed.
    LaneRemoved,
    /// A stay node joined the lane.
    StayAdded(StayNodeId),
    /// A stay node left the lane.
    StayRemoved(StayNodeId),
    /// A travel link was created between two consecutive stays.
    TravelLinkAdded(LinkId),
    /// A stale travel link was removed.
    TravelLinkRemoved(LinkId),
    /// The earliest plot of the person changed.
    FirstPlotChanged(Option<PlotId>),
    /// The person was shown or hidden.
    VisibilityChanged(bool),
    /// One of the person's links changed shape.
    LinkShapeChanged(LinkId),
}

/// Changes to a place lane.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum PlaceEvent {
    /// The lane was created.
    LaneAdded,
    /// The lane was removed.
    LaneRemoved,
    /// A plot was assigned to the lane.
    PlotAdded(PlotId),
    /// A plot left the lane.
    PlotRemoved(PlotId),
    /// The place was renamed.
    NameChanged,
    /// The lane moved vertically.
    Moved(f64),
    /// The lane height changed.
    Resized(f64),
    /// The horizontal extent of the lane's plots changed.
    ExtentChanged(Option<(f64, f64)>),
}

/// Changes to a plot.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum PlotEvent {
    /// The plot was created.
    Created,
    /// The plot was removed.
    Removed,
    /// The plot moved.
    PositionChanged(Point),
    /// The plot was shown or hidden.
    VisibilityChanged(bool),
    /// The plot render size changed.
    SizeChanged(f64),
    /// The plot date changed (merged stays only).
    DateChanged(i64),
}

/// Changes to a date handle.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum DateHandleEvent {
    /// The handle was created for a new (date, boundary) key.
    Created,
    /// The last plot left the handle and it was removed.
    Removed,
    /// The handle, and every plot bound to it, moved to a new x.
    Moved(f64),
}

/// Changes to a merged stay.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum MergedStayEvent {
    /// A member joined.
    MemberAdded(StayId),
    /// A member left.
    MemberRemoved(StayId),
    /// The earliest start or latest end changed.
    RangeChanged {
        /// Earliest member start.
        start: i64,
        /// Latest member end.
        end: i64,
    },
    /// The representative place changed.
    PlaceChanged(PlaceId),
    /// A connector was appended at the given index.
    ConnectorAdded(usize),
    /// The connector at the given index was removed.
    ConnectorRemoved(usize),
    /// The connector at the given index moved.
    ConnectorMoved(usize),
}

/// Changes to a portrait.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum PortraitEvent {
    /// The portrait moved.
    Moved(Point),
}

/// Map-wide layout passes.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum LayoutEvent {
    /// Place lanes were redistributed vertically.
    PlacesDistributed,
    /// Portraits were redistributed.
    PortraitsDistributed,
    /// Every date handle was re-mapped onto the time axis.
    TimeRemapped,
    /// The map geometry changed.
    Resized,
    /// The time display mode changed.
    TimeModeChanged(TimeDisplayMode),
}

/// Token returned by [`FriezeFreeMap::subscribe`](crate::FriezeFreeMap::subscribe).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&FreeMapEvent)>;

/// Registered listeners, called in registration order.
#[derive(Default)]
pub(crate) struct Subscribers {
    next: u64,
    listeners: Vec<(SubscriptionId, Listener)>,
}

impl fmt::Debug for Subscribers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscribers")
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

impl Subscribers {
    pub(crate) fn subscribe(&mut self, listener: Listener) -> SubscriptionId {
        let id = SubscriptionId(self.next);
        self.next += 1;
        self.listeners.push((id, listener));
        id
    }

    pub(crate) fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sub, _)| *sub != id);
        self.listeners.len() != before
    }

    pub(crate) fn emit(&mut self, event: FreeMapEvent) {
        for (_, listener) in &mut self.listeners {
            listener(&event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::rc::Rc;
    use core::cell::RefCell;

    #[test]
    fn listeners_run_in_registration_order_until_unsubscribed() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut subs = Subscribers::default();

        let first = {
            let seen = Rc::clone(&seen);
            subs.subscribe(Box::new(move |_| seen.borrow_mut().push(1)))
        };
        {
            let seen = Rc::clone(&seen);
            subs.subscribe(Box::new(move |_| seen.borrow_mut().push(2)));
        }

        subs.emit(FreeMapEvent::Layout(LayoutEvent::Resized));
        assert!(subs.unsubscribe(first));
        assert!(!subs.unsubscribe(first));
        subs.emit(FreeMapEvent::Layout(LayoutEvent::Resized));

        assert_eq!(*seen.borrow(), [1, 2, 2]);
    }
}
