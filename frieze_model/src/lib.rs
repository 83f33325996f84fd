// Copyright 2025 the Frieze Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frieze Model: the domain entities of a genealogical timeline.
//!
//! A project tracks people staying at places over time:
//!
//! - [`Atlas`] / [`Place`] / [`Level`]: a place hierarchy ordered by
//!   specificity, with [`Atlas::encompasses`] containment queries.
//! - [`Person`] / [`Portrait`]: who is being tracked.
//! - [`StayPeriod`] / [`Period`]: one person at one place over an interval,
//!   expressed as calendar dates or numeric timestamps but always comparable
//!   as an `i64` scalar.
//! - [`Frieze`]: a named selection of stays plus the derived persons, places
//!   and date range.
//! - [`Project`]: the session object owning all of the above and the
//!   per-kind [`IdAllocator`]s.
//!
//! Layout of friezes as diagrams lives in `frieze_freemap`; this crate has no
//! notion of positions.
//!
//! ## Minimal example
//!
//! ```rust
//! use frieze_model::{Level, Period, Project};
//!
//! let mut project = Project::new();
//! let earth = project.create_place("Earth", Level::Planet, None).unwrap();
//! let paris = project.create_place("Paris", Level::Town, Some(earth)).unwrap();
//! let ada = project.create_person("Ada");
//! let stay = project
//!     .create_stay(ada, paris, Period::numeric(1850, 1862).unwrap())
//!     .unwrap();
//!
//! let frieze = project.create_frieze("Ada's travels");
//! project.add_to_frieze(frieze, stay).unwrap();
//!
//! assert!(project.atlas().encompasses(earth, paris));
//! assert_eq!(project.frieze(frieze).unwrap().date_range(), Some((1850, 1862)));
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod error;
mod frieze;
mod id;
mod period;
mod person;
mod place;
mod project;

pub use error::ModelError;
pub use frieze::Frieze;
pub use id::{EntityId, EntityKind, FriezeId, IdAllocator, PersonId, PlaceId, PortraitId, StayId};
pub use period::{Period, StayPeriod, TimeFormat};
pub use person::{Person, Portrait};
pub use place::{Atlas, Level, Place};
pub use project::Project;

/// Re-exported so callers can build calendar periods without a direct dependency.
pub use time::{Date, Month};
