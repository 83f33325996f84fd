// Copyright 2025 the Frieze Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tests for the `frieze_freemap` crate.
//!
//! These build small projects and check that the map keeps stays sorted,
//! travel links and date handles in sync, and lanes laid out, across edits.

use std::cell::RefCell;
use std::rc::Rc;

use frieze_freemap::{
    DateHandleEvent, DateKey, FreeMapConfig, FreeMapError, FreeMapEvent, FriezeFreeMap, LinkKind, LinkShape,
    MergeError, MergedStayEvent, PersonEvent, PlotEvent, PlotKind, StayNodeId, TimeDisplayMode,
};
use frieze_model::{FriezeId, Level, Period, PersonId, PlaceId, Project, StayId};
use kurbo::Point;

struct Fixture {
    project: Project,
    frieze: FriezeId,
    africa: PlaceId,
    egypt: PlaceId,
    cairo: PlaceId,
    giza: PlaceId,
    paris: PlaceId,
    ada: PersonId,
    bob: PersonId,
}

fn fixture() -> Fixture {
    let mut project = Project::new();
    let earth = project.create_place("Earth", Level::Planet, None).unwrap();
    let africa = project
        .create_place("Africa", Level::Continent, Some(earth))
        .unwrap();
    let egypt = project
        .create_place("Egypt", Level::Country, Some(africa))
        .unwrap();
    let cairo = project
        .create_place("Cairo", Level::Town, Some(egypt))
        .unwrap();
    let giza = project
        .create_place("Giza", Level::Town, Some(egypt))
        .unwrap();
    let europe = project
        .create_place("Europe", Level::Continent, Some(earth))
        .unwrap();
    let france = project
        .create_place("France", Level::Country, Some(europe))
        .unwrap();
    let paris = project
        .create_place("Paris", Level::Town, Some(france))
        .unwrap();
    let ada = project.create_person("Ada");
    let bob = project.create_person("Bob");
    let frieze = project.create_frieze("Travels");
    Fixture {
        project,
        frieze,
        africa,
        egypt,
        cairo,
        giza,
        paris,
        ada,
        bob,
    }
}

impl Fixture {
    /// Creates a stay and adds it to the frieze.
    fn stay(&mut self, person: PersonId, place: PlaceId, start: i64, end: i64) -> StayId {
        let stay = self
            .project
            .create_stay(person, place, Period::numeric(start, end).unwrap())
            .unwrap();
        self.project.add_to_frieze(self.frieze, stay).unwrap();
        stay
    }

    fn map(&self) -> FriezeFreeMap {
        FriezeFreeMap::new(&self.project, self.frieze, FreeMapConfig::default()).unwrap()
    }
}

fn record(map: &mut FriezeFreeMap) -> Rc<RefCell<Vec<FreeMapEvent>>> {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    map.subscribe(move |event| sink.borrow_mut().push(event.clone()));
    seen
}

fn starts(map: &FriezeFreeMap, person: PersonId) -> Vec<i64> {
    map.person(person)
        .unwrap()
        .stays()
        .iter()
        .map(|node| map.stay_node(*node).unwrap().start_date())
        .collect()
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

#[test]
fn stays_are_sorted_and_joined_by_travel_links() {
    let mut f = fixture();
    f.stay(f.ada, f.paris, 30, 40);
    f.stay(f.ada, f.cairo, 10, 20);
    let rome_like = f.stay(f.ada, f.giza, 50, 60);
    let map = f.map();

    assert_eq!(starts(&map, f.ada), [10, 30, 50]);
    let lane = map.person(f.ada).unwrap();
    assert_eq!(lane.travel_links().len(), 2);

    for (pair, link) in lane.stays().windows(2).zip(lane.travel_links()) {
        let prev = map.stay_node(pair[0]).unwrap().plots();
        let next = map.stay_node(pair[1]).unwrap().plots();
        let link = map.link(*link).unwrap();
        assert_eq!(link.kind(), LinkKind::Travel);
        assert_eq!(link.plot_pair(), Some((prev.end, next.start)));
    }

    // The init link points from the portrait at the earliest start plot.
    let first = map.stay_node(lane.stays()[0]).unwrap().plots().start;
    assert_eq!(lane.first_plot(), Some(first));
    let init = map.link(lane.init_link().unwrap()).unwrap();
    assert_eq!(init.kind(), LinkKind::Init);
    assert_eq!(init.plot_pair(), None);

    assert!(map.node_of(rome_like).is_some());
}

#[test]
fn removing_a_middle_stay_relinks_its_neighbours() {
    let mut f = fixture();
    let cairo = f.stay(f.ada, f.cairo, 10, 20);
    let paris = f.stay(f.ada, f.paris, 30, 40);
    let giza = f.stay(f.ada, f.giza, 50, 60);
    let mut map = f.map();

    f.project.remove_from_frieze(f.frieze, paris).unwrap();
    map.remove_stay(&f.project, paris).unwrap();

    assert_eq!(starts(&map, f.ada), [10, 50]);
    let lane = map.person(f.ada).unwrap();
    assert_eq!(lane.travel_links().len(), 1);
    let before = map.stay_node(map.node_of(cairo).unwrap()).unwrap().plots();
    let after = map.stay_node(map.node_of(giza).unwrap()).unwrap().plots();
    let link = map.link(lane.travel_links()[0]).unwrap();
    assert_eq!(link.plot_pair(), Some((before.end, after.start)));

    // Paris left the frieze and its lane went with it.
    assert!(map.place(f.paris).is_none());
    assert_eq!(
        map.remove_stay(&f.project, paris),
        Err(FreeMapError::StayNotDisplayed(paris))
    );
}

#[test]
fn travel_link_recomputation_is_idempotent() {
    let mut f = fixture();
    f.stay(f.ada, f.cairo, 10, 20);
    f.stay(f.ada, f.paris, 30, 40);
    let mut map = f.map();

    let diff = map.recompute_travel_links(f.ada).unwrap();
    assert!(diff.is_empty());
    let diff = map.recompute_travel_links(f.ada).unwrap();
    assert!(diff.is_empty());
    assert_eq!(
        map.recompute_travel_links(f.bob),
        Err(FreeMapError::UnknownPersonLane(f.bob))
    );
}

#[test]
fn adding_a_stay_twice_is_a_no_op() {
    let mut f = fixture();
    let stay = f.stay(f.ada, f.cairo, 10, 20);
    let mut map = f.map();
    let nodes = map.stay_nodes().count();

    assert_eq!(map.add_stay(&f.project, stay), Ok(None));
    assert_eq!(map.stay_nodes().count(), nodes);
}

#[test]
fn moving_a_handle_moves_only_its_plots() {
    let mut f = fixture();
    f.stay(f.ada, f.cairo, 10, 20);
    f.stay(f.bob, f.paris, 10, 30);
    let mut map = f.map();

    let handle = map
        .handle_for(DateKey {
            date: 10,
            kind: PlotKind::Start,
        })
        .unwrap();
    assert_eq!(map.handle(handle).unwrap().plots().len(), 2);
    let before: Vec<_> = map.plots().map(|(id, p)| (id, p.position())).collect();
    let old_x = map.handle(handle).unwrap().x();

    map.move_handle(handle, old_x + 15.0).unwrap();

    for (id, position) in before {
        let plot = map.plot(id).unwrap();
        if plot.handle() == handle {
            assert_close(plot.position().x - position.x, 15.0);
        } else {
            assert_eq!(plot.position().x, position.x);
        }
        assert_eq!(plot.position().y, position.y);
    }
}

#[test]
fn proportional_mapping_pins_the_extreme_dates() {
    let mut f = fixture();
    f.stay(f.ada, f.cairo, 100, 100);
    f.stay(f.bob, f.paris, 100, 250);
    let map = f.map();

    // Time axis 250..1000 with 20 of padding.
    assert_eq!(map.dates(), &[100, 250]);
    for (_, plot) in map.plots() {
        let expected = if plot.date() == 100 { 270.0 } else { 980.0 };
        assert_eq!(plot.position().x, expected);
    }
}

#[test]
fn a_single_date_sits_at_the_padded_origin() {
    let mut f = fixture();
    f.stay(f.ada, f.cairo, 100, 100);
    let map = f.map();

    assert_eq!(map.handles().count(), 2);
    for (_, handle) in map.handles() {
        assert_eq!(handle.x(), 270.0);
    }
}

#[test]
fn equal_split_spaces_dates_by_rank() {
    let mut f = fixture();
    f.stay(f.ada, f.cairo, 10, 20);
    f.stay(f.ada, f.paris, 20, 1000);
    let mut map = f.map();
    let events = record(&mut map);

    map.set_time_mode(TimeDisplayMode::EqualSplit);

    assert_eq!(map.time_mode(), TimeDisplayMode::EqualSplit);
    for (_, plot) in map.plots() {
        let expected = match plot.date() {
            10 => 270.0,
            20 => 625.0,
            _ => 980.0,
        };
        assert_close(plot.position().x, expected);
    }
    assert!(events.borrow().iter().any(|e| matches!(
        e,
        FreeMapEvent::Layout(frieze_freemap::LayoutEvent::TimeModeChanged(
            TimeDisplayMode::EqualSplit
        ))
    )));
}

#[test]
fn place_height_fits_its_persons() {
    let mut f = fixture();
    let carl = f.project.create_person("Carl");
    f.stay(f.ada, f.cairo, 10, 20);
    f.stay(f.bob, f.cairo, 12, 22);
    f.stay(carl, f.cairo, 14, 24);
    f.stay(f.ada, f.paris, 30, 40);
    let mut map = f.map();

    // Name height 24 against a separation of 10 with three persons.
    let cairo = map.place(f.cairo).unwrap();
    assert_eq!(cairo.persons(), &[f.ada, f.bob, carl]);
    assert_eq!(cairo.height(), 40.0);
    assert_eq!(map.place(f.paris).unwrap().height(), 24.0);

    map.set_font_size(30.0);
    assert_eq!(map.place(f.cairo).unwrap().height(), 60.0);
    map.set_person_separation(20.0);
    assert_eq!(map.place(f.cairo).unwrap().height(), 80.0);
}

#[test]
fn places_are_stacked_with_equal_gaps() {
    let mut f = fixture();
    f.stay(f.ada, f.cairo, 10, 20);
    f.stay(f.bob, f.cairo, 12, 22);
    f.stay(f.ada, f.paris, 30, 40);
    let map = f.map();

    let lanes = map.places();
    assert_eq!(lanes.len(), 2);
    let total: f64 = lanes.iter().map(|lane| lane.height()).sum();
    let gap = (600.0 - total) / 5.0;
    assert_close(lanes[0].y(), gap);
    assert_close(lanes[1].y(), 2.0 * gap + lanes[0].height());

    // Plots sit on their person's row within the lane.
    let bob_node = map.person(f.bob).unwrap().stays()[0];
    let bob_start = map.stay_node(bob_node).unwrap().plots().start;
    assert_close(map.plot(bob_start).unwrap().position().y, lanes[0].y() + 20.0);
}

#[test]
fn portraits_are_spread_down_the_person_column() {
    let mut f = fixture();
    f.stay(f.ada, f.cairo, 10, 20);
    f.stay(f.bob, f.paris, 10, 30);
    let mut map = f.map();

    assert_eq!(map.person(f.ada).unwrap().portrait(), Point::new(50.0, 200.0));
    assert_eq!(map.person(f.bob).unwrap().portrait(), Point::new(50.0, 400.0));

    assert_eq!(
        map.set_portrait_position(f.ada, Point::new(10.0, 10.0)),
        Ok(true)
    );
    map.distribute_portraits();
    assert_eq!(map.person(f.ada).unwrap().portrait(), Point::new(50.0, 200.0));
}

#[test]
fn merging_rejects_stays_of_another_person() {
    let mut f = fixture();
    let a = f.stay(f.ada, f.cairo, 10, 20);
    let b = f.stay(f.bob, f.cairo, 25, 40);
    let mut map = f.map();
    let nodes = map.stay_nodes().count();

    let err = map.merge_stays(&f.project, &[a, b], None).unwrap_err();
    assert_eq!(
        err,
        FreeMapError::Merge(MergeError::PersonMismatch {
            expected: f.ada,
            found: f.bob,
        })
    );
    assert_eq!(map.stay_nodes().count(), nodes);
    assert!(map.stay_nodes().all(|(_, node)| node.as_merged().is_none()));
}

#[test]
fn merged_range_grows_and_shrinks_with_members() {
    let mut f = fixture();
    let a = f.stay(f.ada, f.cairo, 10, 20);
    let b = f.stay(f.ada, f.cairo, 25, 40);
    f.stay(f.ada, f.paris, 50, 60);
    let mut map = f.map();
    let events = record(&mut map);

    let node = map.merge_stays(&f.project, &[a, b], None).unwrap();
    let merged = map.stay_node(node).unwrap();
    assert_eq!((merged.start_date(), merged.end_date()), (10, 40));
    assert_eq!(merged.place(), f.cairo);
    assert_eq!(map.person(f.ada).unwrap().travel_links().len(), 1);

    let simple = map.remove_from_merged(&f.project, node, b).unwrap();
    let merged = map.stay_node(node).unwrap();
    assert_eq!((merged.start_date(), merged.end_date()), (10, 20));
    assert_eq!(map.plot(merged.plots().end).unwrap().date(), 20);
    assert_eq!(map.node_of(b), Some(simple));
    assert_eq!(starts(&map, f.ada), [10, 25, 50]);
    assert_eq!(map.person(f.ada).unwrap().travel_links().len(), 2);
    assert!(events.borrow().contains(&FreeMapEvent::MergedStay(
        node,
        MergedStayEvent::RangeChanged { start: 10, end: 20 },
    )));

    assert_eq!(
        map.remove_from_merged(&f.project, node, a),
        Err(FreeMapError::Merge(MergeError::LastMember(a)))
    );
}

#[test]
fn merged_place_widens_to_the_common_ancestor() {
    let mut f = fixture();
    let a = f.stay(f.ada, f.cairo, 10, 20);
    let b = f.stay(f.ada, f.giza, 25, 40);
    let mut map = f.map();

    let node = map.merge_stays(&f.project, &[a, b], None).unwrap();
    assert_eq!(map.stay_node(node).unwrap().place(), f.egypt);
    let egypt = map.place(f.egypt).unwrap();
    assert_eq!(egypt.persons(), &[f.ada]);
    // Lanes of frieze places survive even when empty.
    assert!(map.place(f.cairo).unwrap().is_empty());

    map.set_forced_place(&f.project, node, Some(f.africa)).unwrap();
    assert_eq!(map.stay_node(node).unwrap().place(), f.africa);
    assert!(map.place(f.egypt).is_none());

    let created = map.unmerge(&f.project, node).unwrap();
    assert_eq!(created.len(), 2);
    assert!(map.stay_node(node).is_none());
    assert!(map.place(f.africa).is_none());
    assert!(!map.place(f.cairo).unwrap().is_empty());
}

#[test]
fn forced_place_must_encompass_every_member() {
    let mut f = fixture();
    let a = f.stay(f.ada, f.cairo, 10, 20);
    let b = f.stay(f.ada, f.paris, 25, 40);
    let mut map = f.map();

    assert_eq!(
        map.merge_stays(&f.project, &[a, b], Some(f.egypt)),
        Err(FreeMapError::Merge(MergeError::OutsideForcedPlace {
            forced: f.egypt,
            place: f.paris,
        }))
    );
    assert!(map.node_of(a).is_some_and(|n| map.stay_node(n).unwrap().as_merged().is_none()));

    let node = map.merge_stays(&f.project, &[a], Some(f.egypt)).unwrap();
    assert_eq!(
        map.add_to_merged(&f.project, node, b),
        Err(FreeMapError::Merge(MergeError::OutsideForcedPlace {
            forced: f.egypt,
            place: f.paris,
        }))
    );
    map.set_forced_place(&f.project, node, None).unwrap();
    assert_eq!(map.add_to_merged(&f.project, node, b), Ok(true));
    assert_eq!(map.add_to_merged(&f.project, node, b), Ok(false));
    assert_eq!(map.person(f.ada).unwrap().stays(), &[node]);
}

#[test]
fn connectors_are_indexed_waypoints() {
    let mut f = fixture();
    let a = f.stay(f.ada, f.cairo, 10, 20);
    let b = f.stay(f.ada, f.cairo, 25, 40);
    let mut map = f.map();
    let node = map.merge_stays(&f.project, &[a, b], None).unwrap();

    assert_eq!(map.add_connector(node, Point::new(1.0, 2.0)), Ok(0));
    assert_eq!(map.add_connector(node, Point::new(3.0, 4.0)), Ok(1));
    assert_eq!(map.move_connector(node, 1, Point::new(5.0, 6.0)), Ok(true));
    assert_eq!(map.remove_connector(node, 0), Ok(Point::new(1.0, 2.0)));
    assert_eq!(
        map.stay_node(node).unwrap().as_merged().unwrap().connectors(),
        &[Point::new(5.0, 6.0)]
    );
    assert_eq!(
        map.remove_connector(node, 4),
        Err(FreeMapError::ConnectorOutOfRange { node, index: 4 })
    );
}

#[test]
fn stay_links_of_merged_stays_keep_their_shape() {
    let mut f = fixture();
    let a = f.stay(f.ada, f.cairo, 10, 20);
    let b = f.stay(f.ada, f.cairo, 25, 40);
    f.stay(f.ada, f.paris, 50, 60);
    let mut map = f.map();
    let node = map.merge_stays(&f.project, &[a, b], None).unwrap();

    let stay_link = map.stay_node(node).unwrap().plots().link;
    assert!(matches!(
        map.set_link_shape(stay_link, LinkShape::Curved),
        Err(FreeMapError::Unsupported(_))
    ));

    let travel = map.person(f.ada).unwrap().travel_links()[0];
    assert_eq!(map.set_link_shape(travel, LinkShape::Curved), Ok(true));
    assert_eq!(map.set_link_shape(travel, LinkShape::Curved), Ok(false));
    assert_eq!(map.link(travel).unwrap().shape(), LinkShape::Curved);
}

#[test]
fn hiding_a_person_hides_their_plots() {
    let mut f = fixture();
    f.stay(f.ada, f.cairo, 10, 20);
    f.stay(f.bob, f.paris, 10, 30);
    let mut map = f.map();

    assert_eq!(map.set_person_visible(f.bob, false), Ok(true));
    for (_, plot) in map.plots() {
        assert_eq!(plot.is_visible(), plot.person() != f.bob);
    }
    // New stays of a hidden person arrive hidden.
    let late = f.stay(f.bob, f.giza, 40, 50);
    let node = map.add_stay(&f.project, late).unwrap().unwrap();
    let plots = map.stay_node(node).unwrap().plots();
    assert!(!map.plot(plots.start).unwrap().is_visible());
}

#[test]
fn mutations_are_announced_to_subscribers() {
    let mut f = fixture();
    f.stay(f.ada, f.cairo, 10, 20);
    let mut map = f.map();
    let events = record(&mut map);

    let late = f.stay(f.ada, f.paris, 30, 40);
    let node = map.add_stay(&f.project, late).unwrap().unwrap();

    let events = events.borrow();
    assert!(events.contains(&FreeMapEvent::Person(f.ada, PersonEvent::StayAdded(node))));
    assert!(events.iter().any(|e| matches!(
        e,
        FreeMapEvent::Person(p, PersonEvent::TravelLinkAdded(_)) if *p == f.ada
    )));
    let created = events
        .iter()
        .filter(|e| matches!(e, FreeMapEvent::Plot(_, PlotEvent::Created)))
        .count();
    assert_eq!(created, 2);
}

#[test]
fn moves_within_epsilon_are_silent_no_ops() {
    let mut f = fixture();
    let a = f.stay(f.ada, f.cairo, 10, 20);
    let b = f.stay(f.ada, f.cairo, 25, 40);
    let mut map = f.map();
    let node = map.merge_stays(&f.project, &[a, b], None).unwrap();
    map.add_connector(node, Point::new(100.0, 50.0)).unwrap();
    let handle = map
        .handle_for(DateKey {
            date: 10,
            kind: PlotKind::Start,
        })
        .unwrap();
    let x = map.handle(handle).unwrap().x();
    let events = record(&mut map);

    assert_eq!(map.move_handle(handle, x + 1e-9), Ok(false));
    assert_eq!(
        map.move_connector(node, 0, Point::new(100.0 + 1e-9, 50.0 - 1e-9)),
        Ok(false)
    );
    assert!(events.borrow().is_empty());
    assert_eq!(map.handle(handle).unwrap().x(), x);

    assert_eq!(map.move_handle(handle, x + 1.0), Ok(true));
    assert_eq!(
        events.borrow().first(),
        Some(&FreeMapEvent::DateHandle(
            handle,
            DateHandleEvent::Moved(x + 1.0)
        ))
    );
}

#[test]
fn dates_spanning_the_whole_scalar_range_are_laid_out() {
    let mut f = fixture();
    let stay = f
        .project
        .create_stay(f.ada, f.cairo, Period::numeric(i64::MIN, i64::MAX).unwrap())
        .unwrap();
    f.project.add_to_frieze(f.frieze, stay).unwrap();
    f.stay(f.bob, f.paris, 0, 0);
    let map = f.map();

    let plots = map.stay_node(map.node_of(stay).unwrap()).unwrap().plots();
    assert_eq!(map.plot(plots.start).unwrap().position().x, 270.0);
    assert_eq!(map.plot(plots.end).unwrap().position().x, 980.0);
    for (_, plot) in map.plots().filter(|(_, p)| p.date() == 0) {
        assert_close(plot.position().x, 625.0);
    }
}

#[test]
fn syncing_follows_frieze_edits() {
    let mut f = fixture();
    let a = f.stay(f.ada, f.cairo, 10, 20);
    let b = f.stay(f.bob, f.paris, 10, 30);
    let mut map = f.map();

    f.project.remove_from_frieze(f.frieze, b).unwrap();
    let c = f.stay(f.ada, f.giza, 30, 40);
    map.sync_with_frieze(&f.project).unwrap();

    assert!(map.node_of(b).is_none());
    assert!(map.person(f.bob).is_none());
    assert!(map.place(f.paris).is_none());
    assert!(map.node_of(a).is_some());
    assert!(map.node_of(c).is_some());
    assert_eq!(map.dates(), &[10, 20, 30, 40]);
}

#[test]
fn renamed_places_are_picked_up() {
    let mut f = fixture();
    f.stay(f.ada, f.cairo, 10, 20);
    let mut map = f.map();

    f.project.rename_place(f.cairo, "Al-Qahira").unwrap();
    assert!(map.sync_place_name(&f.project, f.cairo));
    assert!(!map.sync_place_name(&f.project, f.cairo));
    assert_eq!(map.place(f.cairo).unwrap().name(), "Al-Qahira");
}

#[test]
fn resizing_remaps_time() {
    let mut f = fixture();
    f.stay(f.ada, f.cairo, 10, 20);
    let mut map = f.map();

    map.set_width(2000.0);
    // Time axis 250..2000 with 20 of padding.
    let end = map
        .handle_for(DateKey {
            date: 20,
            kind: PlotKind::End,
        })
        .unwrap();
    assert_eq!(map.handle(end).unwrap().x(), 1980.0);
    assert_eq!(map.date_at(1980.0), Some(20));
}

#[test]
fn snapshots_restore_manual_edits() {
    let mut f = fixture();
    let a = f.stay(f.ada, f.cairo, 10, 20);
    let b = f.stay(f.ada, f.giza, 25, 40);
    f.stay(f.bob, f.paris, 10, 30);
    let mut map = f.map();

    let node = map.merge_stays(&f.project, &[a, b], None).unwrap();
    map.add_connector(node, Point::new(400.0, 90.0)).unwrap();
    map.set_time_mode(TimeDisplayMode::EqualSplit);
    let handle = map
        .handle_for(DateKey {
            date: 30,
            kind: PlotKind::End,
        })
        .unwrap();
    map.move_handle(handle, 700.0).unwrap();
    map.set_portrait_position(f.bob, Point::new(12.0, 34.0)).unwrap();
    map.set_person_visible(f.bob, false).unwrap();
    let snapshot = map.snapshot();
    assert_eq!(snapshot.merges.len(), 1);
    assert_eq!(snapshot.hidden_persons, [f.bob]);

    let restored = FriezeFreeMap::restore(&f.project, f.frieze, &snapshot).unwrap();
    assert_eq!(restored.snapshot(), snapshot);
    let restored_node: StayNodeId = restored.node_of(a).unwrap();
    assert_eq!(restored.node_of(b), Some(restored_node));
}
