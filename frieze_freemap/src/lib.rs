// Copyright 2025 the Frieze Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frieze FreeMap: incremental layout of a frieze as a timeline diagram.
//!
//! Time runs horizontally and places are stacked vertically as lanes. Each
//! stay of a person is drawn as two plots (start and end) joined by a stay
//! link; consecutive stays of a person are joined by travel links.
//!
//! [`FriezeFreeMap`] is the aggregate. It is built from a
//! [`Project`](frieze_model::Project) and one of its friezes, then kept up to
//! date by its mutators, each of which leaves the diagram consistent:
//!
//! - A person's stays stay sorted by start date, with exactly one travel link
//!   per adjacent pair.
//! - Plots sharing a date and boundary share one [`DateHandle`]; dragging the
//!   handle moves all of them and nothing else.
//! - Place lanes grow with the number of persons they hold and are restacked
//!   when the lane set or a lane height changes.
//! - Several stays of one person can be shown as one [`MergedStay`] spanning
//!   their earliest start to their latest end.
//!
//! Changes are announced as [`FreeMapEvent`]s to listeners registered with
//! [`FriezeFreeMap::subscribe`].
//!
//! ## Minimal example
//!
//! ```rust
//! use frieze_freemap::{FreeMapConfig, FriezeFreeMap};
//! use frieze_model::{Level, Period, Project};
//!
//! let mut project = Project::new();
//! let cairo = project.create_place("Cairo", Level::Town, None).unwrap();
//! let paris = project.create_place("Paris", Level::Town, None).unwrap();
//! let ada = project.create_person("Ada");
//! let frieze = project.create_frieze("Travels");
//! for (place, start, end) in [(cairo, 10, 20), (paris, 25, 40)] {
//!     let stay = project
//!         .create_stay(ada, place, Period::numeric(start, end).unwrap())
//!         .unwrap();
//!     project.add_to_frieze(frieze, stay).unwrap();
//! }
//!
//! let map = FriezeFreeMap::new(&project, frieze, FreeMapConfig::default()).unwrap();
//! let lane = map.person(ada).unwrap();
//! assert_eq!(lane.stays().len(), 2);
//! assert_eq!(lane.travel_links().len(), 1);
//! assert_eq!(map.places().len(), 2);
//! ```
//!
//! ## Logging
//!
//! Structural edits are logged at `debug`, layout passes and travel-link
//! diffs at `trace`, and clamped layouts at `warn`, through the [`log`]
//! facade. The crate installs no logger.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod axis;
mod config;
mod error;
mod events;
mod freemap;
mod handle;
mod ids;
mod person;
mod place;
mod plot;
mod scene;
mod snapshot;
mod stay;
mod util;

pub use axis::TimeAxis;
pub use config::{FreeMapConfig, TimeDisplayMode};
pub use error::{FreeMapError, MergeError};
pub use events::{
    DateHandleEvent, FreeMapEvent, LayoutEvent, MergedStayEvent, PersonEvent, PlaceEvent,
    PlotEvent, PortraitEvent, SubscriptionId,
};
pub use freemap::FriezeFreeMap;
pub use handle::{DateHandle, DateKey};
pub use ids::{DateHandleId, LinkId, PlotId, StayNodeId};
pub use person::{FreeMapPerson, TravelLinkDiff};
pub use place::FreeMapPlace;
pub use plot::{Link, LinkEnd, LinkKind, LinkShape, Plot, PlotKind};
pub use snapshot::{FreeMapSnapshot, HandleSnapshot, MergeSnapshot, PortraitSnapshot};
pub use stay::{FreeMapStay, MergedStay, SimpleStay, StayPlots};
