// Copyright 2025 the Frieze Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Person lanes and travel-link maintenance.

use alloc::vec::Vec;

use frieze_model::{Atlas, PersonId, PlaceId, StayId, StayPeriod};
use kurbo::Point;
use log::{debug, trace};

use crate::error::FreeMapError;
use crate::events::{FreeMapEvent, MergedStayEvent, PersonEvent, PortraitEvent};
use crate::ids::{LinkId, PlotId, StayNodeId};
use crate::plot::{Link, LinkEnd, LinkKind};
use crate::scene::Scene;
use crate::stay::{FreeMapStay, MergedStay, StayPlots};

/// Travel links created and removed by one recomputation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TravelLinkDiff {
    /// Links created for newly adjacent stays.
    pub added: Vec<LinkId>,
    /// Links removed because their stays are no longer adjacent.
    pub removed: Vec<LinkId>,
}

impl TravelLinkDiff {
    /// Returns `true` if nothing changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// One person's lane on a map.
///
/// The lane keeps the person's displayed stays sorted by start date (ties
/// broken by the smallest member stay id) and maintains one travel link from
/// the end plot of each stay to the start plot of the next.
#[derive(Clone, Debug, PartialEq)]
pub struct FreeMapPerson {
    person: PersonId,
    stays: Vec<StayNodeId>,
    travel_links: Vec<LinkId>,
    first_plot: Option<PlotId>,
    portrait: Point,
    init_link: Option<LinkId>,
    visible: bool,
}

impl FreeMapPerson {
    pub(crate) fn new(person: PersonId) -> Self {
        Self {
            person,
            stays: Vec::new(),
            travel_links: Vec::new(),
            first_plot: None,
            portrait: Point::ZERO,
            init_link: None,
            visible: true,
        }
    }

    /// Returns the person.
    #[must_use]
    pub fn person(&self) -> PersonId {
        self.person
    }

    /// Returns the displayed stays, sorted.
    #[must_use]
    pub fn stays(&self) -> &[StayNodeId] {
        &self.stays
    }

    /// Returns the travel links in lane order.
    #[must_use]
    pub fn travel_links(&self) -> &[LinkId] {
        &self.travel_links
    }

    /// Returns the earliest plot of the person.
    #[must_use]
    pub fn first_plot(&self) -> Option<PlotId> {
        self.first_plot
    }

    /// Returns the portrait position.
    #[must_use]
    pub fn portrait(&self) -> Point {
        self.portrait
    }

    /// Returns the link from the portrait to the first plot.
    #[must_use]
    pub fn init_link(&self) -> Option<LinkId> {
        self.init_link
    }

    /// Returns `true` if the person is shown.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Returns the node displaying `stay`, if it is on this lane.
    pub(crate) fn node_of(&self, scene: &Scene, stay: StayId) -> Option<StayNodeId> {
        self.stays
            .iter()
            .copied()
            .find(|node| scene.nodes.get(*node).is_some_and(|n| n.contains(stay)))
    }

    /// Displays a stay; returns `None` if it already is, alone or merged.
    pub(crate) fn add_stay(
        &mut self,
        scene: &mut Scene,
        atlas: &Atlas,
        period: &StayPeriod,
    ) -> Option<StayNodeId> {
        if self.node_of(scene, period.id()).is_some() {
            return None;
        }
        let node = scene.create_simple_node(atlas, period.clone());
        self.push_node(scene, node);
        debug!(
            "event=stay_added module=freemap person={} stay={} node={node}",
            self.person,
            period.id()
        );
        self.refresh(scene);
        Some(node)
    }

    /// Stops displaying a stay.
    ///
    /// A member of a merged stay leaves it; the merged stay disappears with
    /// its last member.
    pub(crate) fn remove_stay(
        &mut self,
        scene: &mut Scene,
        atlas: &Atlas,
        stay: StayId,
    ) -> Result<StayNodeId, FreeMapError> {
        let node = self
            .node_of(scene, stay)
            .ok_or(FreeMapError::StayNotDisplayed(stay))?;
        let shared = scene
            .merged(node)
            .is_ok_and(|merged| merged.members().len() > 1);
        if shared {
            self.take_member(scene, atlas, node, stay)?;
        } else {
            self.drop_node(scene, node);
        }
        debug!(
            "event=stay_removed module=freemap person={} stay={stay} node={node}",
            self.person
        );
        self.refresh(scene);
        Ok(node)
    }

    /// Merges the nodes displaying `stays` into one merged stay.
    ///
    /// Members of already merged nodes come along. Nothing changes unless
    /// every member passes the merge rules.
    pub(crate) fn merge(
        &mut self,
        scene: &mut Scene,
        atlas: &Atlas,
        stays: &[StayId],
        forced_place: Option<PlaceId>,
    ) -> Result<StayNodeId, FreeMapError> {
        let mut nodes: Vec<StayNodeId> = Vec::new();
        for &stay in stays {
            let node = self
                .node_of(scene, stay)
                .ok_or(FreeMapError::StayNotDisplayed(stay))?;
            if !nodes.contains(&node) {
                nodes.push(node);
            }
        }
        let mut members = nodes
            .iter()
            .filter_map(|node| scene.nodes.get(*node))
            .flat_map(FreeMapStay::stays)
            .cloned()
            .collect::<Vec<_>>()
            .into_iter();
        let first = members
            .next()
            .ok_or(FreeMapError::Unsupported("merging an empty set of stays"))?;
        let mut merged = MergedStay::new(atlas, first, forced_place, dangling_plots())?;
        for member in members {
            merged.add(atlas, member)?;
        }

        let connectors: Vec<Point> = nodes
            .iter()
            .filter_map(|node| scene.merged(*node).ok())
            .flat_map(|m| m.connectors().iter().copied())
            .collect();
        for node in &nodes {
            self.drop_node(scene, *node);
        }
        for point in connectors {
            merged.push_connector(point);
        }
        let member_ids: Vec<StayId> = merged.members().iter().map(StayPeriod::id).collect();
        let node = scene.install_merged(atlas, merged);
        self.push_node(scene, node);
        for stay in member_ids {
            scene.emit(FreeMapEvent::MergedStay(
                node,
                MergedStayEvent::MemberAdded(stay),
            ));
        }
        debug!(
            "event=stays_merged module=freemap person={} node={node} sources={}",
            self.person,
            nodes.len()
        );
        self.refresh(scene);
        Ok(node)
    }

    /// Moves `stay` from wherever it is displayed into the merged `node`.
    ///
    /// Returns `false` if it already was a member.
    pub(crate) fn absorb(
        &mut self,
        scene: &mut Scene,
        atlas: &Atlas,
        node: StayNodeId,
        stay: StayId,
    ) -> Result<bool, FreeMapError> {
        if !self.stays.contains(&node) {
            return Err(FreeMapError::UnknownStayNode(node));
        }
        let source = self
            .node_of(scene, stay)
            .ok_or(FreeMapError::StayNotDisplayed(stay))?;
        if source == node {
            scene.merged(node)?;
            return Ok(false);
        }
        let period = scene
            .nodes
            .get(source)
            .and_then(|n| n.stays().find(|s| s.id() == stay))
            .cloned()
            .ok_or(FreeMapError::StayNotDisplayed(stay))?;
        scene.merged(node)?.admits(atlas, &period)?;

        let shared = scene
            .merged(source)
            .is_ok_and(|merged| merged.members().len() > 1);
        if shared {
            self.take_member(scene, atlas, source, stay)?;
        } else {
            self.drop_node(scene, source);
        }
        let before = merged_state(scene, node)?;
        scene.merged_mut(node)?.add(atlas, period)?;
        scene.emit(FreeMapEvent::MergedStay(
            node,
            MergedStayEvent::MemberAdded(stay),
        ));
        scene.sync_merged(atlas, node, before);
        debug!(
            "event=stay_absorbed module=freemap person={} stay={stay} node={node}",
            self.person
        );
        self.refresh(scene);
        Ok(true)
    }

    /// Moves a member out of a merged node into its own simple node.
    pub(crate) fn release(
        &mut self,
        scene: &mut Scene,
        atlas: &Atlas,
        node: StayNodeId,
        stay: StayId,
    ) -> Result<StayNodeId, FreeMapError> {
        if !self.stays.contains(&node) {
            return Err(FreeMapError::UnknownStayNode(node));
        }
        let period = self.take_member(scene, atlas, node, stay)?;
        let simple = scene.create_simple_node(atlas, period);
        self.push_node(scene, simple);
        self.refresh(scene);
        Ok(simple)
    }

    /// Dissolves a merged node into one simple node per member.
    pub(crate) fn unmerge(
        &mut self,
        scene: &mut Scene,
        atlas: &Atlas,
        node: StayNodeId,
    ) -> Result<Vec<StayNodeId>, FreeMapError> {
        if !self.stays.contains(&node) {
            return Err(FreeMapError::UnknownStayNode(node));
        }
        scene.merged(node)?;
        let members = match self.drop_node(scene, node) {
            Some(FreeMapStay::Merged(merged)) => merged.take_members(),
            _ => Vec::new(),
        };
        let mut created = Vec::with_capacity(members.len());
        for period in members {
            let simple = scene.create_simple_node(atlas, period);
            self.push_node(scene, simple);
            created.push(simple);
        }
        debug!(
            "event=stay_unmerged module=freemap person={} node={node} members={}",
            self.person,
            created.len()
        );
        self.refresh(scene);
        Ok(created)
    }

    /// Pins a merged node to a forced place, or unpins it.
    pub(crate) fn rebase(
        &mut self,
        scene: &mut Scene,
        atlas: &Atlas,
        node: StayNodeId,
        forced_place: Option<PlaceId>,
    ) -> Result<(), FreeMapError> {
        if !self.stays.contains(&node) {
            return Err(FreeMapError::UnknownStayNode(node));
        }
        let before = merged_state(scene, node)?;
        scene
            .merged_mut(node)?
            .set_forced_place(atlas, forced_place)?;
        scene.sync_merged(atlas, node, before);
        Ok(())
    }

    /// Re-sorts the lane and brings travel links and the first plot up to date.
    pub(crate) fn refresh(&mut self, scene: &mut Scene) -> TravelLinkDiff {
        self.stays
            .sort_by_key(|node| scene.nodes.get(*node).map(FreeMapStay::sort_key));
        let diff = self.recompute_travel_links(scene);
        self.update_first_plot(scene);
        diff
    }

    /// Makes the travel links match the adjacent pairs of the sorted lane.
    ///
    /// Every pair of consecutive stays needs a link from the end plot of the
    /// first to the start plot of the second. Links for pairs that are no
    /// longer adjacent are removed, missing ones are created, and the rest are
    /// kept. Running it twice in a row yields an empty diff.
    pub(crate) fn recompute_travel_links(&mut self, scene: &mut Scene) -> TravelLinkDiff {
        let required: Vec<(PlotId, PlotId)> = self
            .stays
            .windows(2)
            .filter_map(|pair| {
                let prev = scene.nodes.get(pair[0])?.plots();
                let next = scene.nodes.get(pair[1])?.plots();
                Some((prev.end, next.start))
            })
            .collect();

        let mut diff = TravelLinkDiff::default();
        let mut kept: Vec<((PlotId, PlotId), LinkId)> = Vec::with_capacity(required.len());
        for &link in &self.travel_links {
            let pair = scene.links.get(link).and_then(Link::plot_pair);
            match pair {
                Some(pair) if required.contains(&pair) && !kept.iter().any(|(p, _)| *p == pair) => {
                    kept.push((pair, link));
                }
                _ => diff.removed.push(link),
            }
        }
        for &link in &diff.removed {
            scene.destroy_link(link);
            scene.emit(FreeMapEvent::Person(
                self.person,
                PersonEvent::TravelLinkRemoved(link),
            ));
        }

        let mut ordered = Vec::with_capacity(required.len());
        for pair in required {
            let link = match kept.iter().find(|(p, _)| *p == pair) {
                Some((_, link)) => *link,
                None => {
                    let link = scene.create_link(Link::new(
                        LinkKind::Travel,
                        self.person,
                        LinkEnd::Plot(pair.0),
                        LinkEnd::Plot(pair.1),
                    ));
                    diff.added.push(link);
                    scene.emit(FreeMapEvent::Person(
                        self.person,
                        PersonEvent::TravelLinkAdded(link),
                    ));
                    link
                }
            };
            ordered.push(link);
        }
        self.travel_links = ordered;

        if !diff.is_empty() {
            trace!(
                "event=travel_links module=freemap person={} added={} removed={} total={}",
                self.person,
                diff.added.len(),
                diff.removed.len(),
                self.travel_links.len()
            );
        }
        diff
    }

    /// Removes the travel and init links, for a lane that is going away.
    pub(crate) fn clear_links(&mut self, scene: &mut Scene) {
        for link in self.travel_links.drain(..) {
            scene.destroy_link(link);
            scene.emit(FreeMapEvent::Person(
                self.person,
                PersonEvent::TravelLinkRemoved(link),
            ));
        }
        if let Some(link) = self.init_link.take() {
            scene.destroy_link(link);
        }
    }

    pub(crate) fn set_visible(&mut self, scene: &mut Scene, visible: bool) -> bool {
        if self.visible == visible {
            return false;
        }
        self.visible = visible;
        for node in &self.stays {
            if let Some(plots) = scene.nodes.get(*node).map(FreeMapStay::plots) {
                scene.set_plot_visible(plots.start, visible);
                scene.set_plot_visible(plots.end, visible);
            }
        }
        scene.emit(FreeMapEvent::Person(
            self.person,
            PersonEvent::VisibilityChanged(visible),
        ));
        true
    }

    pub(crate) fn set_portrait(&mut self, scene: &mut Scene, position: Point) -> bool {
        if !crate::util::differs(self.portrait.x, position.x)
            && !crate::util::differs(self.portrait.y, position.y)
        {
            return false;
        }
        self.portrait = position;
        scene.emit(FreeMapEvent::Portrait(
            self.person,
            PortraitEvent::Moved(position),
        ));
        true
    }

    fn push_node(&mut self, scene: &mut Scene, node: StayNodeId) {
        self.stays.push(node);
        if !self.visible {
            if let Some(plots) = scene.nodes.get(node).map(FreeMapStay::plots) {
                scene.set_plot_visible(plots.start, false);
                scene.set_plot_visible(plots.end, false);
            }
        }
        scene.emit(FreeMapEvent::Person(
            self.person,
            PersonEvent::StayAdded(node),
        ));
    }

    fn drop_node(&mut self, scene: &mut Scene, node: StayNodeId) -> Option<FreeMapStay> {
        self.stays.retain(|n| *n != node);
        // Travel links pointing at the node's plots go before the plots do.
        self.detach_links_to(scene, node);
        let body = scene.destroy_node(node);
        scene.emit(FreeMapEvent::Person(
            self.person,
            PersonEvent::StayRemoved(node),
        ));
        body
    }

    /// Takes a member out of a merged node that keeps at least one member.
    fn take_member(
        &mut self,
        scene: &mut Scene,
        atlas: &Atlas,
        node: StayNodeId,
        stay: StayId,
    ) -> Result<StayPeriod, FreeMapError> {
        let before = merged_state(scene, node)?;
        let period = scene.merged_mut(node)?.remove(atlas, stay)?;
        scene.emit(FreeMapEvent::MergedStay(
            node,
            MergedStayEvent::MemberRemoved(stay),
        ));
        scene.sync_merged(atlas, node, before);
        Ok(period)
    }

    fn detach_links_to(&mut self, scene: &mut Scene, node: StayNodeId) {
        let Some(plots) = scene.nodes.get(node).map(FreeMapStay::plots) else {
            return;
        };
        let touches = |link: &Link| {
            [link.from, link.to]
                .iter()
                .any(|end| matches!(end, LinkEnd::Plot(p) if *p == plots.start || *p == plots.end))
        };
        let mut removed = Vec::new();
        self.travel_links.retain(|link| {
            let stale = scene.links.get(*link).is_some_and(touches);
            if stale {
                removed.push(*link);
            }
            !stale
        });
        for link in removed {
            scene.destroy_link(link);
            scene.emit(FreeMapEvent::Person(
                self.person,
                PersonEvent::TravelLinkRemoved(link),
            ));
        }
        if let Some(init) = self.init_link {
            if scene.links.get(init).is_some_and(touches) {
                scene.destroy_link(init);
                self.init_link = None;
            }
        }
    }

    fn update_first_plot(&mut self, scene: &mut Scene) {
        let first = self
            .stays
            .first()
            .and_then(|node| scene.nodes.get(*node))
            .map(|node| node.plots().start);
        match (first, self.init_link) {
            (Some(plot), Some(link)) => {
                if let Some(entry) = scene.links.get_mut(link) {
                    entry.to = LinkEnd::Plot(plot);
                }
            }
            (Some(plot), None) => {
                self.init_link = Some(scene.create_link(Link::new(
                    LinkKind::Init,
                    self.person,
                    LinkEnd::Portrait(self.person),
                    LinkEnd::Plot(plot),
                )));
            }
            (None, Some(link)) => {
                scene.destroy_link(link);
                self.init_link = None;
            }
            (None, None) => {}
        }
        if first != self.first_plot {
            self.first_plot = first;
            scene.emit(FreeMapEvent::Person(
                self.person,
                PersonEvent::FirstPlotChanged(first),
            ));
        }
    }
}

fn dangling_plots() -> StayPlots {
    StayPlots {
        start: PlotId::DANGLING,
        end: PlotId::DANGLING,
        link: LinkId::DANGLING,
    }
}

fn merged_state(scene: &Scene, node: StayNodeId) -> Result<(PlaceId, i64, i64), FreeMapError> {
    let merged = scene.merged(node)?;
    Ok((merged.place(), merged.start_date(), merged.end_date()))
}

