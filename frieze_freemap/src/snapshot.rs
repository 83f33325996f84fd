// Copyright 2025 the Frieze Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Saved layout state.
//!
//! A map is derived from its frieze, so only what a user changed by hand is
//! worth saving: the geometry, the time mode, merges, dragged handles and
//! portraits, and hidden persons. Everything is keyed by domain ids or date
//! keys, never by arena handles, which do not survive a rebuild.

use alloc::vec::Vec;

use frieze_model::{FriezeId, PersonId, PlaceId, Project, StayId, StayPeriod};
use kurbo::Point;
use log::warn;

use crate::config::{FreeMapConfig, TimeDisplayMode};
use crate::error::FreeMapError;
use crate::freemap::FriezeFreeMap;
use crate::handle::DateKey;

/// Position of one date handle.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HandleSnapshot {
    /// The handle's key.
    pub key: DateKey,
    /// The handle's x.
    pub x: f64,
}

/// One merged stay.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MergeSnapshot {
    /// Member stays.
    pub members: Vec<StayId>,
    /// The forced place, if pinned.
    pub forced_place: Option<PlaceId>,
    /// Intermediate connectors, in order.
    pub connectors: Vec<Point>,
}

/// Position of one portrait.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PortraitSnapshot {
    /// The person.
    pub person: PersonId,
    /// The portrait position.
    pub position: Point,
}

/// The user-controlled state of a [`FriezeFreeMap`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FreeMapSnapshot {
    /// Geometry.
    pub config: FreeMapConfig,
    /// Time display mode.
    pub time_mode: TimeDisplayMode,
    /// Date handle positions, left to right.
    pub handles: Vec<HandleSnapshot>,
    /// Merged stays.
    pub merges: Vec<MergeSnapshot>,
    /// Portrait positions.
    pub portraits: Vec<PortraitSnapshot>,
    /// Persons whose plots are hidden.
    pub hidden_persons: Vec<PersonId>,
}

impl FriezeFreeMap {
    /// Captures the state needed to [`restore`](Self::restore) this map.
    #[must_use]
    pub fn snapshot(&self) -> FreeMapSnapshot {
        let handles = self
            .handles()
            .map(|(_, handle)| HandleSnapshot {
                key: handle.key(),
                x: handle.x(),
            })
            .collect();
        let merges = self
            .stay_nodes()
            .filter_map(|(_, node)| node.as_merged())
            .map(|merged| MergeSnapshot {
                members: merged.members().iter().map(StayPeriod::id).collect(),
                forced_place: merged.forced_place(),
                connectors: merged.connectors().to_vec(),
            })
            .collect();
        let portraits = self
            .persons()
            .iter()
            .map(|lane| PortraitSnapshot {
                person: lane.person(),
                position: lane.portrait(),
            })
            .collect();
        let hidden_persons = self
            .persons()
            .iter()
            .filter(|lane| !lane.is_visible())
            .map(|lane| lane.person())
            .collect();
        FreeMapSnapshot {
            config: *self.config(),
            time_mode: self.time_mode(),
            handles,
            merges,
            portraits,
            hidden_persons,
        }
    }

    /// Rebuilds a map of `frieze` and reapplies a snapshot.
    ///
    /// Parts of the snapshot that no longer fit the frieze, such as a merge
    /// whose members left it or a handle whose date is gone, are skipped with
    /// a warning.
    ///
    /// # Errors
    ///
    /// Fails only if the map itself cannot be built; see [`FriezeFreeMap::new`].
    pub fn restore(
        project: &Project,
        frieze: FriezeId,
        snapshot: &FreeMapSnapshot,
    ) -> Result<Self, FreeMapError> {
        let mut map = Self::new(project, frieze, snapshot.config)?;
        map.set_time_mode(snapshot.time_mode);

        for merge in &snapshot.merges {
            let members: Vec<StayId> = merge
                .members
                .iter()
                .copied()
                .filter(|stay| map.node_of(*stay).is_some())
                .collect();
            let node = match map.merge_stays(project, &members, merge.forced_place) {
                Ok(node) => node,
                Err(err) => {
                    warn!("event=restore_skipped module=freemap part=merge error=\"{err}\"");
                    continue;
                }
            };
            for point in &merge.connectors {
                if let Err(err) = map.add_connector(node, *point) {
                    warn!("event=restore_skipped module=freemap part=connector error=\"{err}\"");
                    break;
                }
            }
        }

        for person in &snapshot.hidden_persons {
            if map.set_person_visible(*person, false).is_err() {
                warn!("event=restore_skipped module=freemap part=visibility person={person}");
            }
        }
        for portrait in &snapshot.portraits {
            if map
                .set_portrait_position(portrait.person, portrait.position)
                .is_err()
            {
                warn!(
                    "event=restore_skipped module=freemap part=portrait person={}",
                    portrait.person
                );
            }
        }
        for saved in &snapshot.handles {
            let Some(handle) = map.handle_for(saved.key) else {
                warn!(
                    "event=restore_skipped module=freemap part=handle date={}",
                    saved.key.date
                );
                continue;
            };
            if let Err(err) = map.move_handle(handle, saved.x) {
                warn!("event=restore_skipped module=freemap part=handle error=\"{err}\"");
            }
        }
        Ok(map)
    }
}
