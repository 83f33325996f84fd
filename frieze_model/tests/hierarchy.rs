// Copyright 2025 the Frieze Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tests for the place hierarchy and project bookkeeping of `frieze_model`.

use frieze_model::{Level, ModelError, Period, PlaceId, Project};

struct World {
    project: Project,
    earth: PlaceId,
    africa: PlaceId,
    europe: PlaceId,
    egypt: PlaceId,
    cairo: PlaceId,
}

fn world() -> World {
    let mut project = Project::new();
    let earth = project.create_place("Earth", Level::Planet, None).unwrap();
    let africa = project
        .create_place("Africa", Level::Continent, Some(earth))
        .unwrap();
    let europe = project
        .create_place("Europe", Level::Continent, Some(earth))
        .unwrap();
    let egypt = project
        .create_place("Egypt", Level::Country, Some(africa))
        .unwrap();
    let cairo = project
        .create_place("Cairo", Level::Town, Some(egypt))
        .unwrap();
    World {
        project,
        earth,
        africa,
        europe,
        egypt,
        cairo,
    }
}

#[test]
fn encompasses_follows_the_parent_chain() {
    let w = world();
    let atlas = w.project.atlas();

    assert!(atlas.encompasses(w.earth, w.cairo));
    assert!(atlas.encompasses(w.africa, w.egypt));
    assert!(atlas.encompasses(w.cairo, w.cairo));
    assert!(!atlas.encompasses(w.cairo, w.earth));
    assert!(!atlas.encompasses(w.africa, w.europe));
    assert!(atlas.encompasses(PlaceId::UNIVERSE, w.cairo));
}

#[test]
fn nesting_requires_a_strictly_less_specific_parent() {
    let mut w = world();

    assert_eq!(
        w.project
            .create_place("Alexandria", Level::Country, Some(w.egypt)),
        Err(ModelError::LevelNesting {
            child: Level::Country,
            parent: Level::Country,
        })
    );
    assert!(
        w.project
            .create_place("Giza", Level::County, Some(w.egypt))
            .is_ok()
    );
}

#[test]
fn set_level_cannot_invert_the_tree() {
    let mut w = world();

    // Egypt has Cairo (Town) below and Africa (Continent) above.
    assert!(matches!(
        w.project.set_place_level(w.egypt, Level::Town),
        Err(ModelError::LevelConflict { conflicting, .. }) if conflicting == w.cairo
    ));
    assert!(matches!(
        w.project.set_place_level(w.egypt, Level::Continent),
        Err(ModelError::LevelConflict { conflicting, .. }) if conflicting == w.africa
    ));
    w.project.set_place_level(w.egypt, Level::Region).unwrap();
    assert_eq!(w.project.place(w.egypt).unwrap().level(), Level::Region);
}

#[test]
fn common_ancestor_of_cousins_is_the_planet() {
    let mut w = world();
    let paris = w
        .project
        .create_place("Paris", Level::Town, Some(w.europe))
        .unwrap();

    let atlas = w.project.atlas();
    assert_eq!(atlas.common_ancestor(w.cairo, paris), Some(w.earth));
    assert_eq!(atlas.common_ancestor(w.cairo, w.egypt), Some(w.egypt));
}

#[test]
fn frieze_membership_goes_through_the_project() {
    let mut w = world();
    let ada = w.project.create_person("Ada");
    let first = w
        .project
        .create_stay(ada, w.cairo, Period::numeric(10, 20).unwrap())
        .unwrap();
    let second = w
        .project
        .create_stay(ada, w.egypt, Period::numeric(25, 40).unwrap())
        .unwrap();

    let frieze = w.project.create_frieze("Ada");
    assert!(w.project.add_to_frieze(frieze, first).unwrap());
    assert!(w.project.add_to_frieze(frieze, second).unwrap());
    assert!(!w.project.add_to_frieze(frieze, second).unwrap());
    assert_eq!(
        w.project.frieze(frieze).unwrap().places(),
        &[w.cairo, w.egypt]
    );

    assert!(w.project.remove_from_frieze(frieze, first).unwrap());
    assert_eq!(w.project.frieze(frieze).unwrap().date_range(), Some((25, 40)));
    // Detached, not deleted.
    assert!(w.project.stay(first).is_some());
}

#[test]
fn independent_projects_allocate_independently() {
    let mut a = Project::new();
    let mut b = Project::new();
    assert_eq!(a.create_person("A"), b.create_person("B"));
}
