// Copyright 2025 the Frieze Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared storage of a map and the primitive edits on it.
//!
//! The scene owns every arena, the place lanes, the time axis and the
//! subscriber list. Person lanes live next to it in
//! [`FriezeFreeMap`](crate::FriezeFreeMap) and drive it through the methods
//! here, which keep plots, handles and lanes consistent and emit one event per
//! observable change.

use alloc::string::String;
use alloc::vec::Vec;

use frieze_model::{Atlas, PersonId, PlaceId, StayId, StayPeriod};
use kurbo::Point;
use log::{trace, warn};

use crate::axis::TimeAxis;
use crate::config::{FreeMapConfig, TimeDisplayMode};
use crate::error::FreeMapError;
use crate::events::{
    DateHandleEvent, FreeMapEvent, LayoutEvent, MergedStayEvent, PlaceEvent, PlotEvent,
    Subscribers,
};
use crate::handle::{DateHandles, DateKey};
use crate::ids::{Arena, DateHandleId, LinkId, PlotId, StayNodeId};
use crate::place::FreeMapPlace;
use crate::plot::{Link, LinkEnd, LinkKind, Plot, PlotKind};
use crate::stay::{FreeMapStay, MergedStay, SimpleStay, StayPlots};
use crate::util::differs;

#[derive(Debug)]
pub(crate) struct Scene {
    pub(crate) config: FreeMapConfig,
    pub(crate) axis: TimeAxis,
    pub(crate) plots: Arena<PlotId, Plot>,
    pub(crate) links: Arena<LinkId, Link>,
    pub(crate) nodes: Arena<StayNodeId, FreeMapStay>,
    pub(crate) handles: DateHandles,
    pub(crate) lanes: Vec<FreeMapPlace>,
    pub(crate) events: Subscribers,
    /// Set when the lane set or a lane height changed since the last
    /// [`distribute_places`](Self::distribute_places).
    pub(crate) layout_dirty: bool,
}

impl Scene {
    pub(crate) fn new(config: FreeMapConfig) -> Self {
        Self {
            axis: TimeAxis::new(
                config.time_axis_span(),
                config.padding,
                TimeDisplayMode::Proportional,
            ),
            config,
            plots: Arena::new(),
            links: Arena::new(),
            nodes: Arena::new(),
            handles: DateHandles::default(),
            lanes: Vec::new(),
            events: Subscribers::default(),
            layout_dirty: false,
        }
    }

    #[inline]
    pub(crate) fn emit(&mut self, event: FreeMapEvent) {
        self.events.emit(event);
    }

    // --- lanes -------------------------------------------------------------

    pub(crate) fn lane_index(&self, place: PlaceId) -> Option<usize> {
        self.lanes.iter().position(|lane| lane.place() == place)
    }

    /// Returns the lane of `place`, creating it at the bottom if needed.
    pub(crate) fn ensure_lane(&mut self, atlas: &Atlas, place: PlaceId) -> usize {
        if let Some(index) = self.lane_index(place) {
            return index;
        }
        let name = atlas
            .place(place)
            .map(|p| String::from(p.name()))
            .unwrap_or_default();
        self.lanes
            .push(FreeMapPlace::new(place, name, self.config.name_height()));
        self.layout_dirty = true;
        self.emit(FreeMapEvent::Place(place, PlaceEvent::LaneAdded));
        self.lanes.len() - 1
    }

    /// Removes the lane of `place` if no plot is left in it.
    pub(crate) fn prune_lane(&mut self, place: PlaceId) -> bool {
        let Some(index) = self.lane_index(place) else {
            return false;
        };
        if !self.lanes[index].is_empty() {
            return false;
        }
        self.lanes.remove(index);
        self.layout_dirty = true;
        self.emit(FreeMapEvent::Place(place, PlaceEvent::LaneRemoved));
        true
    }

    fn attach_to_lane(&mut self, plot: PlotId) {
        let Some((person, place)) = self.plots.get(plot).map(|p| (p.person, p.place)) else {
            return;
        };
        let Some(index) = self.lane_index(place) else {
            return;
        };
        let new_person = self.lanes[index].add_plot(plot, person);
        self.emit(FreeMapEvent::Place(place, PlaceEvent::PlotAdded(plot)));
        if new_person {
            self.resize_lane(index);
        }
        let y = self.lanes[index].plot_y(person, self.config.person_separation);
        self.set_plot_y(plot, y);
        self.refresh_extent(index);
    }

    fn detach_from_lane(&mut self, plot: PlotId) {
        let Some(place) = self.plots.get(plot).map(|p| p.place) else {
            return;
        };
        let Some(index) = self.lane_index(place) else {
            return;
        };
        let person_left = self.lanes[index].remove_plot(plot);
        self.emit(FreeMapEvent::Place(place, PlaceEvent::PlotRemoved(plot)));
        if person_left {
            self.resize_lane(index);
            self.restack(index);
        }
        self.refresh_extent(index);
    }

    fn resize_lane(&mut self, index: usize) {
        let name_height = self.config.name_height();
        let separation = self.config.person_separation;
        let lane = &mut self.lanes[index];
        if lane.recompute_height(name_height, separation) {
            let (place, height) = (lane.place(), lane.height());
            self.layout_dirty = true;
            self.emit(FreeMapEvent::Place(place, PlaceEvent::Resized(height)));
        }
    }

    /// Recomputes every lane height, for a font size or separation change.
    pub(crate) fn resize_lanes(&mut self) {
        for index in 0..self.lanes.len() {
            self.resize_lane(index);
            self.restack(index);
        }
    }

    /// Moves every plot of a lane to its stacking position.
    fn restack(&mut self, index: usize) {
        let separation = self.config.person_separation;
        let targets: Vec<(PlotId, f64)> = {
            let lane = &self.lanes[index];
            lane.plots()
                .filter_map(|plot| {
                    let person = self.plots.get(plot)?.person;
                    Some((plot, lane.plot_y(person, separation)))
                })
                .collect()
        };
        for (plot, y) in targets {
            self.set_plot_y(plot, y);
        }
    }

    fn refresh_extent(&mut self, index: usize) {
        let lane = &mut self.lanes[index];
        if lane.recompute_extent(&self.plots) {
            let (place, extent) = (lane.place(), lane.extent());
            self.emit(FreeMapEvent::Place(place, PlaceEvent::ExtentChanged(extent)));
        }
    }

    fn refresh_extent_of(&mut self, place: PlaceId) {
        if let Some(index) = self.lane_index(place) {
            self.refresh_extent(index);
        }
    }

    /// Stacks lanes top to bottom with equal separations between them.
    pub(crate) fn distribute_places(&mut self) {
        let count = self.lanes.len();
        let total: f64 = self.lanes.iter().map(FreeMapPlace::height).sum();
        let mut separation = (self.config.height - total) / (1 + 2 * count) as f64;
        if separation < 0.0 {
            warn!(
                "event=layout_clamped module=freemap height={} required={} lanes={}",
                self.config.height, total, count
            );
            separation = 0.0;
        }
        let mut cumulative = 0.0;
        for index in 0..count {
            let y = separation * (index + 1) as f64 + cumulative;
            if self.lanes[index].set_y(y) {
                let place = self.lanes[index].place();
                self.emit(FreeMapEvent::Place(place, PlaceEvent::Moved(y)));
                self.restack(index);
            }
            cumulative += self.lanes[index].height();
        }
        self.layout_dirty = false;
        trace!("event=places_distributed module=freemap lanes={count} separation={separation}");
        self.emit(FreeMapEvent::Layout(LayoutEvent::PlacesDistributed));
    }

    // --- plots -------------------------------------------------------------

    fn set_plot_y(&mut self, plot: PlotId, y: f64) {
        let Some(entry) = self.plots.get_mut(plot) else {
            return;
        };
        if !differs(entry.position.y, y) {
            return;
        }
        entry.position.y = y;
        let position = entry.position;
        self.emit(FreeMapEvent::Plot(plot, PlotEvent::PositionChanged(position)));
    }

    fn set_plot_x(&mut self, plot: PlotId, x: f64) -> bool {
        let Some(entry) = self.plots.get_mut(plot) else {
            return false;
        };
        if !differs(entry.position.x, x) {
            return false;
        }
        entry.position.x = x;
        let position = entry.position;
        self.emit(FreeMapEvent::Plot(plot, PlotEvent::PositionChanged(position)));
        true
    }

    pub(crate) fn set_plot_visible(&mut self, plot: PlotId, visible: bool) -> bool {
        let Some(entry) = self.plots.get_mut(plot) else {
            return false;
        };
        if entry.visible == visible {
            return false;
        }
        entry.visible = visible;
        self.emit(FreeMapEvent::Plot(plot, PlotEvent::VisibilityChanged(visible)));
        true
    }

    pub(crate) fn set_plot_sizes(&mut self, size: f64) {
        let ids: Vec<PlotId> = self.plots.iter().map(|(id, _)| id).collect();
        for plot in ids {
            let Some(entry) = self.plots.get_mut(plot) else {
                continue;
            };
            if differs(entry.size, size) {
                entry.size = size;
                self.emit(FreeMapEvent::Plot(plot, PlotEvent::SizeChanged(size)));
            }
        }
    }

    fn bind_handle(&mut self, plot: PlotId, key: DateKey) -> (DateHandleId, f64) {
        let binding = self.handles.bind(key, plot, self.axis.date_to_x(key.date));
        if binding.created {
            self.emit(FreeMapEvent::DateHandle(
                binding.handle,
                DateHandleEvent::Created,
            ));
        }
        let x = self
            .handles
            .get(binding.handle)
            .map_or_else(|| self.axis.date_to_x(key.date), |h| h.x);
        (binding.handle, x)
    }

    fn unbind_handle(&mut self, plot: PlotId, handle: DateHandleId) {
        if self.handles.unbind(handle, plot) {
            self.emit(FreeMapEvent::DateHandle(handle, DateHandleEvent::Removed));
        }
    }

    fn create_plot(
        &mut self,
        atlas: &Atlas,
        node: StayNodeId,
        person: PersonId,
        place: PlaceId,
        kind: PlotKind,
        date: i64,
    ) -> PlotId {
        let id = self.plots.next_key();
        let (handle, x) = self.bind_handle(id, DateKey { date, kind });
        self.ensure_lane(atlas, place);
        let inserted = self.plots.insert(Plot {
            node,
            kind,
            date,
            person,
            place,
            handle,
            position: Point::new(x, 0.0),
            visible: true,
            size: self.config.plot_size,
        });
        debug_assert_eq!(inserted, id, "plot arena handed out an unexpected key");
        self.emit(FreeMapEvent::Plot(id, PlotEvent::Created));
        self.attach_to_lane(id);
        id
    }

    fn destroy_plot(&mut self, plot: PlotId) {
        let Some(handle) = self.plots.get(plot).map(|p| p.handle) else {
            return;
        };
        self.detach_from_lane(plot);
        self.unbind_handle(plot, handle);
        self.plots.remove(plot);
        self.emit(FreeMapEvent::Plot(plot, PlotEvent::Removed));
    }

    /// Moves a plot to another date, rebinding it to the matching handle.
    fn retime_plot(&mut self, plot: PlotId, date: i64) {
        let Some((old_handle, kind, place)) = self
            .plots
            .get(plot)
            .filter(|p| p.date != date)
            .map(|p| (p.handle, p.kind, p.place))
        else {
            return;
        };
        self.unbind_handle(plot, old_handle);
        let (handle, x) = self.bind_handle(plot, DateKey { date, kind });
        if let Some(entry) = self.plots.get_mut(plot) {
            entry.date = date;
            entry.handle = handle;
        }
        self.emit(FreeMapEvent::Plot(plot, PlotEvent::DateChanged(date)));
        self.set_plot_x(plot, x);
        self.refresh_extent_of(place);
    }

    /// Moves a plot to another place lane.
    fn relocate_plot(&mut self, atlas: &Atlas, plot: PlotId, place: PlaceId) {
        let Some(old_place) = self.plots.get(plot).map(|p| p.place) else {
            return;
        };
        if old_place == place {
            return;
        }
        self.detach_from_lane(plot);
        self.ensure_lane(atlas, place);
        if let Some(entry) = self.plots.get_mut(plot) {
            entry.place = place;
        }
        self.attach_to_lane(plot);
    }

    // --- links -------------------------------------------------------------

    pub(crate) fn create_link(&mut self, link: Link) -> LinkId {
        self.links.insert(link)
    }

    pub(crate) fn destroy_link(&mut self, link: LinkId) -> Option<Link> {
        self.links.remove(link)
    }

    // --- handles -----------------------------------------------------------

    /// Moves a handle and every plot bound to it; returns `false` if `x` is
    /// within epsilon of where the handle already is.
    pub(crate) fn move_handle(
        &mut self,
        handle: DateHandleId,
        x: f64,
    ) -> Result<bool, FreeMapError> {
        let entry = self
            .handles
            .get_mut(handle)
            .ok_or(FreeMapError::UnknownHandle(handle))?;
        if !differs(entry.x, x) {
            return Ok(false);
        }
        entry.x = x;
        let bound: Vec<PlotId> = entry.plots.to_vec();
        self.follow_handle(handle, x, bound);
        Ok(true)
    }

    /// Brings the plots of a handle that moved to `x`, and their lanes, along.
    fn follow_handle(&mut self, handle: DateHandleId, x: f64, bound: Vec<PlotId>) {
        self.emit(FreeMapEvent::DateHandle(handle, DateHandleEvent::Moved(x)));

        let mut touched: Vec<PlaceId> = Vec::new();
        for plot in bound {
            self.set_plot_x(plot, x);
            if let Some(place) = self.plots.get(plot).map(|p| p.place) {
                if !touched.contains(&place) {
                    touched.push(place);
                }
            }
        }
        for place in touched {
            self.refresh_extent_of(place);
        }
    }

    /// Re-maps every handle onto the time axis.
    pub(crate) fn remap_time(&mut self) {
        let axis = &self.axis;
        let moved = self.handles.reposition(|key| axis.date_to_x(key.date));
        for (handle, x, bound) in moved {
            self.follow_handle(handle, x, bound);
        }
        trace!(
            "event=time_remapped module=freemap mode={:?} dates={}",
            self.axis.mode(),
            self.axis.dates().len()
        );
        self.emit(FreeMapEvent::Layout(LayoutEvent::TimeRemapped));
    }

    /// Pushes the current distinct dates into the axis; re-maps time if the
    /// set changed.
    pub(crate) fn refresh_dates(&mut self) -> bool {
        let dates = self.handles.distinct_dates();
        if !self.axis.set_dates(dates) {
            return false;
        }
        self.remap_time();
        true
    }

    // --- stay nodes --------------------------------------------------------

    pub(crate) fn node_of_stay(&self, stay: StayId) -> Option<StayNodeId> {
        self.nodes
            .iter()
            .find(|(_, node)| node.contains(stay))
            .map(|(id, _)| id)
    }

    fn create_node_plots(
        &mut self,
        atlas: &Atlas,
        node: StayNodeId,
        person: PersonId,
        place: PlaceId,
        (start, end): (i64, i64),
    ) -> StayPlots {
        let start = self.create_plot(atlas, node, person, place, PlotKind::Start, start);
        let end = self.create_plot(atlas, node, person, place, PlotKind::End, end);
        let mut link = Link::new(
            LinkKind::Stay,
            person,
            LinkEnd::Plot(start),
            LinkEnd::Plot(end),
        );
        link.node = Some(node);
        let link = self.create_link(link);
        StayPlots { start, end, link }
    }

    pub(crate) fn create_simple_node(&mut self, atlas: &Atlas, period: StayPeriod) -> StayNodeId {
        let node = self.nodes.next_key();
        let plots = self.create_node_plots(
            atlas,
            node,
            period.person(),
            period.place(),
            (period.start_date(), period.end_date()),
        );
        self.nodes
            .insert(FreeMapStay::Simple(SimpleStay { period, plots }))
    }

    /// Inserts a validated merged stay and gives it plots.
    pub(crate) fn install_merged(&mut self, atlas: &Atlas, mut merged: MergedStay) -> StayNodeId {
        let node = self.nodes.next_key();
        merged.plots = self.create_node_plots(
            atlas,
            node,
            merged.person(),
            merged.place(),
            (merged.start_date(), merged.end_date()),
        );
        self.nodes.insert(FreeMapStay::Merged(merged))
    }

    /// Removes a node with its plots and stay link.
    pub(crate) fn destroy_node(&mut self, node: StayNodeId) -> Option<FreeMapStay> {
        let body = self.nodes.remove(node)?;
        let plots = body.plots();
        self.destroy_link(plots.link);
        self.destroy_plot(plots.start);
        self.destroy_plot(plots.end);
        Some(body)
    }

    pub(crate) fn merged_mut(&mut self, node: StayNodeId) -> Result<&mut MergedStay, FreeMapError> {
        match self.nodes.get_mut(node) {
            Some(FreeMapStay::Merged(merged)) => Ok(merged),
            Some(FreeMapStay::Simple(_)) => Err(FreeMapError::NotMerged(node)),
            None => Err(FreeMapError::UnknownStayNode(node)),
        }
    }

    pub(crate) fn merged(&self, node: StayNodeId) -> Result<&MergedStay, FreeMapError> {
        match self.nodes.get(node) {
            Some(FreeMapStay::Merged(merged)) => Ok(merged),
            Some(FreeMapStay::Simple(_)) => Err(FreeMapError::NotMerged(node)),
            None => Err(FreeMapError::UnknownStayNode(node)),
        }
    }

    /// Brings a merged node's plots in line with its span and place after a
    /// membership change, reporting what moved.
    pub(crate) fn sync_merged(&mut self, atlas: &Atlas, node: StayNodeId, before: (PlaceId, i64, i64)) {
        let Ok(merged) = self.merged(node) else {
            return;
        };
        let (place, start, end, plots) = (
            merged.place(),
            merged.start_date(),
            merged.end_date(),
            merged.plots,
        );
        if (start, end) != (before.1, before.2) {
            self.retime_plot(plots.start, start);
            self.retime_plot(plots.end, end);
            self.emit(FreeMapEvent::MergedStay(
                node,
                MergedStayEvent::RangeChanged { start, end },
            ));
        }
        if place != before.0 {
            self.relocate_plot(atlas, plots.start, place);
            self.relocate_plot(atlas, plots.end, place);
            self.emit(FreeMapEvent::MergedStay(
                node,
                MergedStayEvent::PlaceChanged(place),
            ));
        }
    }
}
