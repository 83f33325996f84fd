// Copyright 2025 the Frieze Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The map aggregate.

use alloc::boxed::Box;
use alloc::vec::Vec;

use frieze_model::{FriezeId, ModelError, PersonId, PlaceId, Project, StayId, StayPeriod};
use hashbrown::HashSet;
use kurbo::Point;
use log::debug;

use crate::axis::TimeAxis;
use crate::config::{FreeMapConfig, TimeDisplayMode};
use crate::error::{FreeMapError, MergeError};
use crate::events::{
    FreeMapEvent, LayoutEvent, MergedStayEvent, PersonEvent, PlaceEvent, SubscriptionId,
};
use crate::handle::{DateHandle, DateKey};
use crate::ids::{DateHandleId, LinkId, PlotId, StayNodeId};
use crate::person::{FreeMapPerson, TravelLinkDiff};
use crate::place::FreeMapPlace;
use crate::plot::{Link, LinkKind, LinkShape, Plot};
use crate::scene::Scene;
use crate::stay::FreeMapStay;
use crate::util::differs;

/// The laid-out diagram of one frieze.
///
/// A map owns one place lane per displayed place, one person lane per person
/// with a displayed stay, and the plots, links and date handles they share.
/// Every mutation keeps the derived state consistent before it returns:
///
/// - Stays of a person are sorted by start date and joined by travel links.
/// - Plots with the same date and boundary share one [`DateHandle`], the only
///   writer of their x.
/// - Place lanes are tall enough for their persons and stacked top to bottom.
///
/// Changes are reported to subscribers as [`FreeMapEvent`]s, synchronously
/// and in registration order.
#[derive(Debug)]
pub struct FriezeFreeMap {
    frieze: FriezeId,
    scene: Scene,
    persons: Vec<FreeMapPerson>,
}

impl FriezeFreeMap {
    /// Lays out a frieze of `project`.
    ///
    /// # Errors
    ///
    /// [`ModelError::UnknownFrieze`] if the frieze is not part of the project.
    pub fn new(
        project: &Project,
        frieze: FriezeId,
        config: FreeMapConfig,
    ) -> Result<Self, FreeMapError> {
        let source = project
            .frieze(frieze)
            .ok_or(ModelError::UnknownFrieze(frieze))?;
        let mut map = Self {
            frieze,
            scene: Scene::new(config),
            persons: Vec::new(),
        };
        let atlas = project.atlas();
        for place in source.places() {
            map.scene.ensure_lane(atlas, *place);
        }
        for person in source.persons() {
            map.persons.push(FreeMapPerson::new(*person));
        }
        for stay in source.stays() {
            let index = map.lane_of_person(stay.person());
            map.persons[index].add_stay(&mut map.scene, atlas, stay);
        }
        map.settle(project);
        map.distribute_portraits();
        debug!(
            "event=map_created module=freemap frieze={frieze} persons={} places={} stays={} handles={}",
            map.persons.len(),
            map.scene.lanes.len(),
            source.stays().len(),
            map.scene.handles.len()
        );
        Ok(map)
    }

    // --- read access ---------------------------------------------------------

    /// Returns the frieze this map lays out.
    #[must_use]
    pub fn frieze(&self) -> FriezeId {
        self.frieze
    }

    /// Returns the geometry.
    #[must_use]
    pub fn config(&self) -> &FreeMapConfig {
        &self.scene.config
    }

    /// Returns the time display mode.
    #[must_use]
    pub fn time_mode(&self) -> TimeDisplayMode {
        self.scene.axis.mode()
    }

    /// Returns the time axis.
    #[must_use]
    pub fn axis(&self) -> &TimeAxis {
        &self.scene.axis
    }

    /// Returns the distinct displayed dates, ascending.
    #[must_use]
    pub fn dates(&self) -> &[i64] {
        self.scene.axis.dates()
    }

    /// Returns the person lanes.
    #[must_use]
    pub fn persons(&self) -> &[FreeMapPerson] {
        &self.persons
    }

    /// Returns the lane of `person`.
    #[must_use]
    pub fn person(&self, person: PersonId) -> Option<&FreeMapPerson> {
        self.persons.iter().find(|p| p.person() == person)
    }

    /// Returns the place lanes, top to bottom.
    #[must_use]
    pub fn places(&self) -> &[FreeMapPlace] {
        &self.scene.lanes
    }

    /// Returns the lane of `place`.
    #[must_use]
    pub fn place(&self, place: PlaceId) -> Option<&FreeMapPlace> {
        self.scene.lanes.iter().find(|lane| lane.place() == place)
    }

    /// Returns a plot.
    #[must_use]
    pub fn plot(&self, plot: PlotId) -> Option<&Plot> {
        self.scene.plots.get(plot)
    }

    /// Iterates every plot.
    pub fn plots(&self) -> impl Iterator<Item = (PlotId, &Plot)> + '_ {
        self.scene.plots.iter()
    }

    /// Returns a link.
    #[must_use]
    pub fn link(&self, link: LinkId) -> Option<&Link> {
        self.scene.links.get(link)
    }

    /// Iterates every link: stay, travel and init links.
    pub fn links(&self) -> impl Iterator<Item = (LinkId, &Link)> + '_ {
        self.scene.links.iter()
    }

    /// Returns a displayed stay.
    #[must_use]
    pub fn stay_node(&self, node: StayNodeId) -> Option<&FreeMapStay> {
        self.scene.nodes.get(node)
    }

    /// Iterates every displayed stay.
    pub fn stay_nodes(&self) -> impl Iterator<Item = (StayNodeId, &FreeMapStay)> + '_ {
        self.scene.nodes.iter()
    }

    /// Returns the node displaying `stay`, alone or merged.
    #[must_use]
    pub fn node_of(&self, stay: StayId) -> Option<StayNodeId> {
        self.scene.node_of_stay(stay)
    }

    /// Returns a date handle.
    #[must_use]
    pub fn handle(&self, handle: DateHandleId) -> Option<&DateHandle> {
        self.scene.handles.get(handle)
    }

    /// Iterates the date handles from left to right.
    pub fn handles(&self) -> impl Iterator<Item = (DateHandleId, &DateHandle)> + '_ {
        self.scene.handles.iter()
    }

    /// Returns the handle grouping plots with `key`.
    #[must_use]
    pub fn handle_for(&self, key: DateKey) -> Option<DateHandleId> {
        self.scene.handles.find(key)
    }

    /// Converts an x coordinate into the date under it.
    #[must_use]
    pub fn date_at(&self, x: f64) -> Option<i64> {
        self.scene.axis.x_to_date(x)
    }

    // --- subscriptions ---------------------------------------------------------

    /// Registers a listener for every subsequent change.
    pub fn subscribe(&mut self, listener: impl FnMut(&FreeMapEvent) + 'static) -> SubscriptionId {
        self.scene.events.subscribe(Box::new(listener))
    }

    /// Removes a listener; returns `false` if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.scene.events.unsubscribe(id)
    }

    // --- stays -----------------------------------------------------------------

    /// Displays a stay of the project.
    ///
    /// Returns the new node, or `None` if the stay was already displayed.
    ///
    /// # Errors
    ///
    /// [`ModelError::UnknownStay`] if the project has no such stay.
    pub fn add_stay(
        &mut self,
        project: &Project,
        stay: StayId,
    ) -> Result<Option<StayNodeId>, FreeMapError> {
        let period = project.stay(stay).ok_or(ModelError::UnknownStay(stay))?;
        let node = self.display(project, period);
        self.settle(project);
        Ok(node)
    }

    /// Stops displaying a stay; returns the node it was displayed by.
    ///
    /// A member of a merged stay leaves it; the merged stay disappears with
    /// its last member, and the person lane with the person's last stay.
    ///
    /// # Errors
    ///
    /// [`FreeMapError::StayNotDisplayed`] if the stay is not on the map.
    pub fn remove_stay(
        &mut self,
        project: &Project,
        stay: StayId,
    ) -> Result<StayNodeId, FreeMapError> {
        let index = self
            .lane_of_stay(stay)
            .ok_or(FreeMapError::StayNotDisplayed(stay))?;
        let node = self.persons[index].remove_stay(&mut self.scene, project.atlas(), stay)?;
        self.drop_person_if_empty(index);
        self.settle(project);
        Ok(node)
    }

    /// Brings the displayed stays in line with the frieze's current content.
    ///
    /// # Errors
    ///
    /// [`ModelError::UnknownFrieze`] if the frieze left the project.
    pub fn sync_with_frieze(&mut self, project: &Project) -> Result<(), FreeMapError> {
        let frieze = project
            .frieze(self.frieze)
            .ok_or(ModelError::UnknownFrieze(self.frieze))?;
        let wanted: HashSet<StayId> = frieze.stays().iter().map(StayPeriod::id).collect();
        let stale: Vec<StayId> = self
            .scene
            .nodes
            .iter()
            .flat_map(|(_, node)| node.stays().map(StayPeriod::id))
            .filter(|stay| !wanted.contains(stay))
            .collect();
        for stay in stale {
            if let Some(index) = self.lane_of_stay(stay) {
                self.persons[index].remove_stay(&mut self.scene, project.atlas(), stay)?;
                self.drop_person_if_empty(index);
            }
        }
        for period in frieze.stays() {
            self.display(project, period);
        }
        self.settle(project);
        Ok(())
    }

    // --- merges ----------------------------------------------------------------

    /// Merges displayed stays of one person into a single span.
    ///
    /// Stays that already belong to a merged stay bring its other members
    /// along. With `forced_place`, every member must lie inside it.
    ///
    /// # Errors
    ///
    /// - [`FreeMapError::Unsupported`] for an empty `stays`.
    /// - [`FreeMapError::StayNotDisplayed`] if a stay is not on the map.
    /// - [`MergeError::PersonMismatch`] if the stays belong to several persons.
    /// - [`MergeError::OutsideForcedPlace`] if a member is outside `forced_place`.
    pub fn merge_stays(
        &mut self,
        project: &Project,
        stays: &[StayId],
        forced_place: Option<PlaceId>,
    ) -> Result<StayNodeId, FreeMapError> {
        let first = *stays
            .first()
            .ok_or(FreeMapError::Unsupported("merging an empty set of stays"))?;
        let index = self
            .lane_of_stay(first)
            .ok_or(FreeMapError::StayNotDisplayed(first))?;
        for &stay in &stays[1..] {
            self.check_same_person(index, stay)?;
        }
        self.check_place(project, forced_place)?;
        let node = self.persons[index].merge(
            &mut self.scene,
            project.atlas(),
            stays,
            forced_place,
        )?;
        self.settle(project);
        Ok(node)
    }

    /// Adds a displayed stay to a merged stay; returns `false` if it already
    /// was a member.
    ///
    /// # Errors
    ///
    /// - [`FreeMapError::UnknownStayNode`] or [`FreeMapError::NotMerged`] for
    ///   a bad `node`.
    /// - [`FreeMapError::StayNotDisplayed`] if the stay is not on the map.
    /// - A [`MergeError`] if the stay breaks the membership rules.
    pub fn add_to_merged(
        &mut self,
        project: &Project,
        node: StayNodeId,
        stay: StayId,
    ) -> Result<bool, FreeMapError> {
        let index = self.lane_of_node(node)?;
        self.check_same_person(index, stay)?;
        let added = self.persons[index].absorb(&mut self.scene, project.atlas(), node, stay)?;
        self.settle(project);
        Ok(added)
    }

    /// Moves a member out of a merged stay; returns the simple node now
    /// displaying it.
    ///
    /// # Errors
    ///
    /// [`MergeError::LastMember`] for the only member and
    /// [`MergeError::NotAMember`] for a stay outside the merged stay.
    pub fn remove_from_merged(
        &mut self,
        project: &Project,
        node: StayNodeId,
        stay: StayId,
    ) -> Result<StayNodeId, FreeMapError> {
        let index = self.lane_of_node(node)?;
        let simple = self.persons[index].release(&mut self.scene, project.atlas(), node, stay)?;
        self.settle(project);
        Ok(simple)
    }

    /// Dissolves a merged stay into one simple stay per member.
    ///
    /// # Errors
    ///
    /// [`FreeMapError::UnknownStayNode`] or [`FreeMapError::NotMerged`] for a
    /// bad `node`.
    pub fn unmerge(
        &mut self,
        project: &Project,
        node: StayNodeId,
    ) -> Result<Vec<StayNodeId>, FreeMapError> {
        let index = self.lane_of_node(node)?;
        let created = self.persons[index].unmerge(&mut self.scene, project.atlas(), node)?;
        self.settle(project);
        Ok(created)
    }

    /// Pins a merged stay to `forced_place`, or unpins it with `None`.
    ///
    /// # Errors
    ///
    /// [`MergeError::OutsideForcedPlace`] if a member is outside the new place.
    pub fn set_forced_place(
        &mut self,
        project: &Project,
        node: StayNodeId,
        forced_place: Option<PlaceId>,
    ) -> Result<(), FreeMapError> {
        let index = self.lane_of_node(node)?;
        self.check_place(project, forced_place)?;
        self.persons[index].rebase(&mut self.scene, project.atlas(), node, forced_place)?;
        self.settle(project);
        Ok(())
    }

    /// Appends a connector to a merged stay; returns its index.
    ///
    /// # Errors
    ///
    /// [`FreeMapError::UnknownStayNode`] or [`FreeMapError::NotMerged`] for a
    /// bad `node`.
    pub fn add_connector(&mut self, node: StayNodeId, point: Point) -> Result<usize, FreeMapError> {
        let index = self.scene.merged_mut(node)?.push_connector(point);
        self.scene.emit(FreeMapEvent::MergedStay(
            node,
            MergedStayEvent::ConnectorAdded(index),
        ));
        Ok(index)
    }

    /// Removes a connector from a merged stay.
    ///
    /// # Errors
    ///
    /// [`FreeMapError::ConnectorOutOfRange`] for a bad `index`.
    pub fn remove_connector(
        &mut self,
        node: StayNodeId,
        index: usize,
    ) -> Result<Point, FreeMapError> {
        let point = self
            .scene
            .merged_mut(node)?
            .remove_connector(index)
            .ok_or(FreeMapError::ConnectorOutOfRange { node, index })?;
        self.scene.emit(FreeMapEvent::MergedStay(
            node,
            MergedStayEvent::ConnectorRemoved(index),
        ));
        Ok(point)
    }

    /// Moves a connector of a merged stay; returns `true` if it moved.
    ///
    /// # Errors
    ///
    /// [`FreeMapError::ConnectorOutOfRange`] for a bad `index`.
    pub fn move_connector(
        &mut self,
        node: StayNodeId,
        index: usize,
        point: Point,
    ) -> Result<bool, FreeMapError> {
        let connector = self
            .scene
            .merged_mut(node)?
            .connector_mut(index)
            .ok_or(FreeMapError::ConnectorOutOfRange { node, index })?;
        if !differs(connector.x, point.x) && !differs(connector.y, point.y) {
            return Ok(false);
        }
        *connector = point;
        self.scene.emit(FreeMapEvent::MergedStay(
            node,
            MergedStayEvent::ConnectorMoved(index),
        ));
        Ok(true)
    }

    // --- direct manipulation -----------------------------------------------------

    /// Drags a date handle, moving every plot bound to it; returns `false`
    /// and notifies nobody if `x` is within epsilon of the current position.
    ///
    /// # Errors
    ///
    /// [`FreeMapError::UnknownHandle`] for a stale handle.
    pub fn move_handle(&mut self, handle: DateHandleId, x: f64) -> Result<bool, FreeMapError> {
        self.scene.move_handle(handle, x)
    }

    /// Shows or hides a single plot; returns `true` if it changed.
    ///
    /// # Errors
    ///
    /// [`FreeMapError::UnknownPlot`] for a stale plot.
    pub fn set_plot_visible(&mut self, plot: PlotId, visible: bool) -> Result<bool, FreeMapError> {
        if !self.scene.plots.contains(plot) {
            return Err(FreeMapError::UnknownPlot(plot));
        }
        Ok(self.scene.set_plot_visible(plot, visible))
    }

    /// Shows or hides every plot of a person; returns `true` if it changed.
    ///
    /// # Errors
    ///
    /// [`FreeMapError::UnknownPersonLane`] if the person has no lane.
    pub fn set_person_visible(
        &mut self,
        person: PersonId,
        visible: bool,
    ) -> Result<bool, FreeMapError> {
        let index = self
            .person_index(person)
            .ok_or(FreeMapError::UnknownPersonLane(person))?;
        Ok(self.persons[index].set_visible(&mut self.scene, visible))
    }

    /// Moves a person's portrait; returns `true` if it moved.
    ///
    /// # Errors
    ///
    /// [`FreeMapError::UnknownPersonLane`] if the person has no lane.
    pub fn set_portrait_position(
        &mut self,
        person: PersonId,
        position: Point,
    ) -> Result<bool, FreeMapError> {
        let index = self
            .person_index(person)
            .ok_or(FreeMapError::UnknownPersonLane(person))?;
        Ok(self.persons[index].set_portrait(&mut self.scene, position))
    }

    /// Changes how a link is drawn; returns `true` if it changed.
    ///
    /// # Errors
    ///
    /// - [`FreeMapError::UnknownLink`] for a stale link.
    /// - [`FreeMapError::Unsupported`] for the stay link of a merged stay,
    ///   whose path goes through its connectors.
    pub fn set_link_shape(&mut self, link: LinkId, shape: LinkShape) -> Result<bool, FreeMapError> {
        let entry = self
            .scene
            .links
            .get(link)
            .ok_or(FreeMapError::UnknownLink(link))?;
        let merged_stay_link = entry.kind == LinkKind::Stay
            && entry
                .node
                .is_some_and(|node| self.scene.merged(node).is_ok());
        if merged_stay_link {
            return Err(FreeMapError::Unsupported(
                "the stay link of a merged stay follows its connectors",
            ));
        }
        let person = entry.person;
        let Some(entry) = self.scene.links.get_mut(link) else {
            return Err(FreeMapError::UnknownLink(link));
        };
        if entry.shape == shape {
            return Ok(false);
        }
        entry.shape = shape;
        self.scene.emit(FreeMapEvent::Person(
            person,
            PersonEvent::LinkShapeChanged(link),
        ));
        Ok(true)
    }

    /// Recomputes a person's travel links and reports the difference.
    ///
    /// Travel links are kept current by every mutation, so the diff is empty
    /// unless the lane was edited outside of this map.
    ///
    /// # Errors
    ///
    /// [`FreeMapError::UnknownPersonLane`] if the person has no lane.
    pub fn recompute_travel_links(
        &mut self,
        person: PersonId,
    ) -> Result<TravelLinkDiff, FreeMapError> {
        let index = self
            .person_index(person)
            .ok_or(FreeMapError::UnknownPersonLane(person))?;
        Ok(self.persons[index].recompute_travel_links(&mut self.scene))
    }

    /// Renames a place lane after its place was renamed in the project;
    /// returns `true` if the name changed.
    pub fn sync_place_name(&mut self, project: &Project, place: PlaceId) -> bool {
        let Some(name) = project.place(place).map(|p| p.name()) else {
            return false;
        };
        let Some(index) = self.scene.lane_index(place) else {
            return false;
        };
        if !self.scene.lanes[index].set_name(name) {
            return false;
        }
        self.scene
            .emit(FreeMapEvent::Place(place, PlaceEvent::NameChanged));
        true
    }

    // --- layout ------------------------------------------------------------------

    /// Stacks the place lanes top to bottom with equal gaps.
    pub fn distribute_places(&mut self) {
        self.scene.distribute_places();
    }

    /// Centres portraits in the person column, evenly spaced vertically.
    pub fn distribute_portraits(&mut self) {
        let count = self.persons.len();
        let x = self.scene.config.person_width / 2.0;
        let step = self.scene.config.height / (count + 1) as f64;
        for (index, person) in self.persons.iter_mut().enumerate() {
            let y = step * (index + 1) as f64;
            person.set_portrait(&mut self.scene, Point::new(x, y));
        }
        self.scene
            .emit(FreeMapEvent::Layout(LayoutEvent::PortraitsDistributed));
    }

    /// Re-maps every date handle onto the time axis, discarding manual drags.
    pub fn remap_time(&mut self) {
        self.scene.remap_time();
    }

    /// Switches the time display mode and re-maps time.
    pub fn set_time_mode(&mut self, mode: TimeDisplayMode) {
        if !self.scene.axis.set_mode(mode) {
            return;
        }
        self.scene
            .emit(FreeMapEvent::Layout(LayoutEvent::TimeModeChanged(mode)));
        self.scene.remap_time();
    }

    /// Sets the total width.
    pub fn set_width(&mut self, width: f64) {
        self.set_config(FreeMapConfig {
            width,
            ..self.scene.config
        });
    }

    /// Sets the total height.
    pub fn set_height(&mut self, height: f64) {
        self.set_config(FreeMapConfig {
            height,
            ..self.scene.config
        });
    }

    /// Sets the time axis padding.
    pub fn set_padding(&mut self, padding: f64) {
        self.set_config(FreeMapConfig {
            padding,
            ..self.scene.config
        });
    }

    /// Sets the width of the person column.
    pub fn set_person_width(&mut self, person_width: f64) {
        self.set_config(FreeMapConfig {
            person_width,
            ..self.scene.config
        });
    }

    /// Sets the width of the place column.
    pub fn set_place_width(&mut self, place_width: f64) {
        self.set_config(FreeMapConfig {
            place_width,
            ..self.scene.config
        });
    }

    /// Sets the plot render size.
    pub fn set_plot_size(&mut self, plot_size: f64) {
        self.set_config(FreeMapConfig {
            plot_size,
            ..self.scene.config
        });
    }

    /// Sets the font size of lane names.
    pub fn set_font_size(&mut self, font_size: f64) {
        self.set_config(FreeMapConfig {
            font_size,
            ..self.scene.config
        });
    }

    /// Sets the vertical distance between persons stacked in a lane.
    pub fn set_person_separation(&mut self, person_separation: f64) {
        self.set_config(FreeMapConfig {
            person_separation,
            ..self.scene.config
        });
    }

    /// Replaces the geometry and runs the layout passes the change requires.
    pub fn set_config(&mut self, config: FreeMapConfig) {
        let old = self.scene.config;
        if old == config {
            return;
        }
        self.scene.config = config;
        self.scene
            .emit(FreeMapEvent::Layout(LayoutEvent::Resized));

        if differs(old.plot_size, config.plot_size) {
            self.scene.set_plot_sizes(config.plot_size);
        }
        if differs(old.font_size, config.font_size)
            || differs(old.person_separation, config.person_separation)
        {
            self.scene.resize_lanes();
            self.scene.layout_dirty = true;
        }
        if differs(old.height, config.height) {
            self.scene.layout_dirty = true;
        }
        if self.scene.layout_dirty {
            self.scene.distribute_places();
        }

        let span_changed = self.scene.axis.set_view_span(config.time_axis_span());
        let padding_changed = self.scene.axis.set_padding(config.padding);
        if span_changed || padding_changed {
            self.scene.remap_time();
        }
        if differs(old.height, config.height) || differs(old.person_width, config.person_width) {
            self.distribute_portraits();
        }
        debug!(
            "event=map_resized module=freemap width={} height={}",
            config.width, config.height
        );
    }

    // --- internals -----------------------------------------------------------------

    fn person_index(&self, person: PersonId) -> Option<usize> {
        self.persons.iter().position(|p| p.person() == person)
    }

    /// Returns the lane of `person`, creating it at the bottom if needed.
    fn lane_of_person(&mut self, person: PersonId) -> usize {
        if let Some(index) = self.person_index(person) {
            return index;
        }
        self.persons.push(FreeMapPerson::new(person));
        self.scene
            .emit(FreeMapEvent::Person(person, PersonEvent::LaneAdded));
        debug!("event=person_lane_added module=freemap person={person}");
        self.persons.len() - 1
    }

    fn lane_of_stay(&self, stay: StayId) -> Option<usize> {
        self.persons
            .iter()
            .position(|p| p.node_of(&self.scene, stay).is_some())
    }

    fn lane_of_node(&self, node: StayNodeId) -> Result<usize, FreeMapError> {
        self.persons
            .iter()
            .position(|p| p.stays().contains(&node))
            .ok_or(FreeMapError::UnknownStayNode(node))
    }

    fn check_same_person(&self, index: usize, stay: StayId) -> Result<(), FreeMapError> {
        let owner = self
            .lane_of_stay(stay)
            .ok_or(FreeMapError::StayNotDisplayed(stay))?;
        if owner == index {
            return Ok(());
        }
        Err(MergeError::PersonMismatch {
            expected: self.persons[index].person(),
            found: self.persons[owner].person(),
        }
        .into())
    }

    fn check_place(
        &self,
        project: &Project,
        place: Option<PlaceId>,
    ) -> Result<(), FreeMapError> {
        match place {
            Some(place) if project.place(place).is_none() => {
                Err(ModelError::UnknownPlace(place).into())
            }
            _ => Ok(()),
        }
    }

    fn display(&mut self, project: &Project, period: &StayPeriod) -> Option<StayNodeId> {
        let arrived = self.person_index(period.person()).is_none();
        let index = self.lane_of_person(period.person());
        let node = self.persons[index].add_stay(&mut self.scene, project.atlas(), period);
        if arrived {
            self.distribute_portraits();
        }
        node
    }

    fn drop_person_if_empty(&mut self, index: usize) {
        if !self.persons[index].stays().is_empty() {
            return;
        }
        let mut lane = self.persons.remove(index);
        lane.clear_links(&mut self.scene);
        let person = lane.person();
        self.scene
            .emit(FreeMapEvent::Person(person, PersonEvent::LaneRemoved));
        debug!("event=person_lane_removed module=freemap person={person}");
        self.distribute_portraits();
    }

    /// Finishes an edit: prunes place lanes left empty, refreshes the date
    /// set and restacks the lanes if their set or heights changed.
    fn settle(&mut self, project: &Project) {
        let keep: &[PlaceId] = project
            .frieze(self.frieze)
            .map(|frieze| frieze.places())
            .unwrap_or_default();
        let empty: Vec<PlaceId> = self
            .scene
            .lanes
            .iter()
            .filter(|lane| lane.is_empty() && !keep.contains(&lane.place()))
            .map(FreeMapPlace::place)
            .collect();
        for place in empty {
            self.scene.prune_lane(place);
        }
        self.scene.refresh_dates();
        if self.scene.layout_dirty {
            self.scene.distribute_places();
        }
    }
}
