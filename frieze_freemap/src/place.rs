// Copyright 2025 the Frieze Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Place lanes.

use alloc::string::String;
use alloc::vec::Vec;

use frieze_model::{PersonId, PlaceId};

use crate::ids::{Arena, PlotId};
use crate::plot::Plot;
use crate::util::differs;

/// The horizontal band of one place.
///
/// Persons are stacked inside the band in arrival order: the `i`-th distinct
/// person to get a plot in the lane sits at `y + (i + 1) * separation`. The
/// lane is tall enough for its name and for one separation above and below
/// the stack.
#[derive(Clone, Debug, PartialEq)]
pub struct FreeMapPlace {
    place: PlaceId,
    name: String,
    plots: Vec<(PlotId, PersonId)>,
    persons: Vec<PersonId>,
    y: f64,
    height: f64,
    extent: Option<(f64, f64)>,
}

impl FreeMapPlace {
    pub(crate) fn new(place: PlaceId, name: String, name_height: f64) -> Self {
        Self {
            place,
            name,
            plots: Vec::new(),
            persons: Vec::new(),
            y: 0.0,
            height: name_height,
            extent: None,
        }
    }

    /// Returns the place.
    #[must_use]
    pub fn place(&self) -> PlaceId {
        self.place
    }

    /// Returns the displayed name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the plots in the lane, in assignment order.
    pub fn plots(&self) -> impl Iterator<Item = PlotId> + '_ {
        self.plots.iter().map(|(plot, _)| *plot)
    }

    /// Returns the distinct persons in arrival order.
    #[must_use]
    pub fn persons(&self) -> &[PersonId] {
        &self.persons
    }

    /// Returns the stacking index of a person in this lane.
    #[must_use]
    pub fn stack_index(&self, person: PersonId) -> Option<usize> {
        self.persons.iter().position(|p| *p == person)
    }

    /// Returns the top of the lane.
    #[must_use]
    pub fn y(&self) -> f64 {
        self.y
    }

    /// Returns the lane height.
    #[must_use]
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Returns the smallest and largest x over the lane's plots.
    #[must_use]
    pub fn extent(&self) -> Option<(f64, f64)> {
        self.extent
    }

    /// Returns `true` if no plot sits in the lane.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.plots.is_empty()
    }

    /// Returns the y of a plot owned by `person`.
    #[must_use]
    pub fn plot_y(&self, person: PersonId, separation: f64) -> f64 {
        let index = self.stack_index(person).unwrap_or(self.persons.len());
        self.y + (index + 1) as f64 * separation
    }

    pub(crate) fn set_name(&mut self, name: &str) -> bool {
        if self.name == name {
            return false;
        }
        self.name.clear();
        self.name.push_str(name);
        true
    }

    pub(crate) fn set_y(&mut self, y: f64) -> bool {
        if !differs(self.y, y) {
            return false;
        }
        self.y = y;
        true
    }

    /// Appends a plot; returns `true` if its person is new to the lane.
    pub(crate) fn add_plot(&mut self, plot: PlotId, person: PersonId) -> bool {
        if !self.plots.iter().any(|(p, _)| *p == plot) {
            self.plots.push((plot, person));
        }
        if self.persons.contains(&person) {
            return false;
        }
        self.persons.push(person);
        true
    }

    /// Removes a plot; returns `true` if its person has no plot left here.
    pub(crate) fn remove_plot(&mut self, plot: PlotId) -> bool {
        let Some(index) = self.plots.iter().position(|(p, _)| *p == plot) else {
            return false;
        };
        let (_, person) = self.plots.remove(index);
        if self.plots.iter().any(|(_, p)| *p == person) {
            return false;
        }
        self.persons.retain(|p| *p != person);
        true
    }

    /// Recomputes the height; returns `true` if it changed.
    pub(crate) fn recompute_height(&mut self, name_height: f64, separation: f64) -> bool {
        let height = name_height.max(separation * (self.persons.len() + 1) as f64);
        if !differs(self.height, height) {
            return false;
        }
        self.height = height;
        true
    }

    /// Recomputes the horizontal extent; returns `true` if it changed.
    pub(crate) fn recompute_extent(&mut self, plots: &Arena<PlotId, Plot>) -> bool {
        let extent = self
            .plots
            .iter()
            .filter_map(|(id, _)| plots.get(*id))
            .map(|plot| plot.position.x)
            .fold(None, |acc: Option<(f64, f64)>, x| match acc {
                Some((min, max)) => Some((min.min(x), max.max(x))),
                None => Some((x, x)),
            });
        let changed = match (self.extent, extent) {
            (Some((a0, a1)), Some((b0, b1))) => differs(a0, b0) || differs(a1, b1),
            (None, None) => false,
            _ => true,
        };
        self.extent = extent;
        changed
    }
}
