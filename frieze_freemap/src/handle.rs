// Copyright 2025 the Frieze Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Date handles: shared x anchors for plots with the same date and boundary.

use alloc::collections::BTreeMap;
use alloc::vec::Vec;

use smallvec::SmallVec;

use crate::ids::{Arena, DateHandleId, PlotId};
use crate::plot::PlotKind;
use crate::util::differs;

/// The (date, boundary) pair that a [`DateHandle`] groups plots by.
///
/// Keys order by date first, so iterating handles in key order walks the
/// time axis from left to right.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DateKey {
    /// Date as a comparable scalar.
    pub date: i64,
    /// Boundary kind.
    pub kind: PlotKind,
}

/// The single owner of the x coordinate of every plot with its [`DateKey`].
#[derive(Clone, Debug, PartialEq)]
pub struct DateHandle {
    pub(crate) key: DateKey,
    pub(crate) x: f64,
    pub(crate) plots: SmallVec<[PlotId; 4]>,
}

impl DateHandle {
    /// Returns the key.
    #[must_use]
    pub fn key(&self) -> DateKey {
        self.key
    }

    /// Returns the x coordinate shared by the bound plots.
    #[must_use]
    pub fn x(&self) -> f64 {
        self.x
    }

    /// Returns the bound plots in binding order.
    #[must_use]
    pub fn plots(&self) -> &[PlotId] {
        &self.plots
    }
}

/// Outcome of [`DateHandles::bind`].
#[derive(Copy, Clone, Debug)]
pub(crate) struct Binding {
    pub(crate) handle: DateHandleId,
    pub(crate) created: bool,
}

/// All date handles of a map, indexed by key.
#[derive(Debug, Default)]
pub(crate) struct DateHandles {
    arena: Arena<DateHandleId, DateHandle>,
    by_key: BTreeMap<DateKey, DateHandleId>,
}

impl DateHandles {
    pub(crate) fn get(&self, id: DateHandleId) -> Option<&DateHandle> {
        self.arena.get(id)
    }

    pub(crate) fn get_mut(&mut self, id: DateHandleId) -> Option<&mut DateHandle> {
        self.arena.get_mut(id)
    }

    pub(crate) fn find(&self, key: DateKey) -> Option<DateHandleId> {
        self.by_key.get(&key).copied()
    }

    pub(crate) fn len(&self) -> usize {
        self.arena.len()
    }

    /// Iterates handles in key order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = (DateHandleId, &DateHandle)> + '_ {
        self.by_key
            .values()
            .filter_map(|&id| self.arena.get(id).map(|handle| (id, handle)))
    }

    /// Moves every handle to `x_of(key)`.
    ///
    /// Returns the handles that moved by more than epsilon, in key order, with
    /// their new x and bound plots.
    pub(crate) fn reposition(
        &mut self,
        mut x_of: impl FnMut(DateKey) -> f64,
    ) -> Vec<(DateHandleId, f64, Vec<PlotId>)> {
        let mut moved = Vec::new();
        for &id in self.by_key.values() {
            let Some(entry) = self.arena.get_mut(id) else {
                continue;
            };
            let x = x_of(entry.key);
            if differs(entry.x, x) {
                entry.x = x;
                moved.push((id, x, entry.plots.to_vec()));
            }
        }
        moved
    }

    /// Binds a plot to the handle for `key`, creating the handle at `x` if
    /// there is none yet.
    pub(crate) fn bind(&mut self, key: DateKey, plot: PlotId, x: f64) -> Binding {
        if let Some(&handle) = self.by_key.get(&key) {
            if let Some(entry) = self.arena.get_mut(handle) {
                if !entry.plots.contains(&plot) {
                    entry.plots.push(plot);
                }
                return Binding {
                    handle,
                    created: false,
                };
            }
        }
        let mut plots = SmallVec::new();
        plots.push(plot);
        let handle = self.arena.insert(DateHandle { key, x, plots });
        self.by_key.insert(key, handle);
        Binding {
            handle,
            created: true,
        }
    }

    /// Unbinds a plot; returns `true` if that emptied and removed the handle.
    pub(crate) fn unbind(&mut self, handle: DateHandleId, plot: PlotId) -> bool {
        let Some(entry) = self.arena.get_mut(handle) else {
            return false;
        };
        entry.plots.retain(|p| *p != plot);
        if !entry.plots.is_empty() {
            return false;
        }
        let key = entry.key;
        self.arena.remove(handle);
        self.by_key.remove(&key);
        true
    }

    /// Returns the distinct dates over all handles, ascending.
    pub(crate) fn distinct_dates(&self) -> Vec<i64> {
        let mut dates: Vec<i64> = self.by_key.keys().map(|key| key.date).collect();
        dates.dedup();
        dates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::ArenaKey;

    fn plot(idx: u32) -> PlotId {
        PlotId::from_parts(idx, 1)
    }

    #[test]
    fn plots_with_the_same_key_share_a_handle() {
        let mut handles = DateHandles::default();
        let start = DateKey {
            date: 100,
            kind: PlotKind::Start,
        };
        let a = handles.bind(start, plot(0), 5.0);
        let b = handles.bind(start, plot(1), 99.0);
        assert!(a.created);
        assert!(!b.created);
        assert_eq!(a.handle, b.handle);
        // The existing handle keeps its x.
        assert_eq!(handles.get(a.handle).unwrap().x(), 5.0);

        let end = handles.bind(
            DateKey {
                date: 100,
                kind: PlotKind::End,
            },
            plot(2),
            5.0,
        );
        assert_ne!(end.handle, a.handle);
        assert_eq!(handles.len(), 2);
        assert_eq!(handles.distinct_dates(), [100]);
    }

    #[test]
    fn unbinding_the_last_plot_removes_the_handle() {
        let mut handles = DateHandles::default();
        let key = DateKey {
            date: 7,
            kind: PlotKind::End,
        };
        let binding = handles.bind(key, plot(0), 0.0);
        handles.bind(key, plot(1), 0.0);

        assert!(!handles.unbind(binding.handle, plot(0)));
        assert!(handles.unbind(binding.handle, plot(1)));
        assert_eq!(handles.find(key), None);
        assert!(handles.distinct_dates().is_empty());
    }

    #[test]
    fn reposition_reports_only_handles_that_moved() {
        let mut handles = DateHandles::default();
        let early = handles.bind(
            DateKey {
                date: 1,
                kind: PlotKind::Start,
            },
            plot(0),
            10.0,
        );
        let late = handles.bind(
            DateKey {
                date: 2,
                kind: PlotKind::Start,
            },
            plot(1),
            20.0,
        );

        let moved = handles.reposition(|key| if key.date == 1 { 10.0 } else { 30.0 });
        assert_eq!(moved.len(), 1);
        assert_eq!(moved[0].0, late.handle);
        assert_eq!(moved[0].2, [plot(1)]);
        assert_eq!(handles.get(early.handle).unwrap().x(), 10.0);
        assert_eq!(handles.get(late.handle).unwrap().x(), 30.0);
    }
}
