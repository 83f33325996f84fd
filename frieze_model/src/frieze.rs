// Copyright 2025 the Frieze Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A frieze: a named selection of stay periods forming one timeline.

use alloc::string::String;
use alloc::vec::Vec;

use crate::id::{FriezeId, PersonId, PlaceId, StayId};
use crate::period::StayPeriod;

/// A named, ordered collection of stay periods.
///
/// Besides the stays themselves (kept in insertion order) a frieze maintains
/// the derived set of involved persons and places, in first-seen order, and
/// the global date range. Everything derived is recomputed on each add and
/// remove.
///
/// The frieze keeps its own copy of each stay: periods are immutable once
/// created, so the copy cannot drift from the project's record.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Frieze {
    id: FriezeId,
    name: String,
    stays: Vec<StayPeriod>,
    persons: Vec<PersonId>,
    places: Vec<PlaceId>,
    range: Option<(i64, i64)>,
}

impl Frieze {
    /// Creates an empty frieze.
    #[must_use]
    pub fn new(id: FriezeId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            stays: Vec::new(),
            persons: Vec::new(),
            places: Vec::new(),
            range: None,
        }
    }

    /// Returns the frieze identifier.
    #[must_use]
    pub fn id(&self) -> FriezeId {
        self.id
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Renames the frieze.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Returns the stays in insertion order.
    #[must_use]
    pub fn stays(&self) -> &[StayPeriod] {
        &self.stays
    }

    /// Returns the stays of one person, in insertion order.
    pub fn stays_of(&self, person: PersonId) -> impl Iterator<Item = &StayPeriod> + '_ {
        self.stays.iter().filter(move |s| s.person() == person)
    }

    /// Returns the persons involved, in first-seen order.
    #[must_use]
    pub fn persons(&self) -> &[PersonId] {
        &self.persons
    }

    /// Returns the places involved, in first-seen order.
    #[must_use]
    pub fn places(&self) -> &[PlaceId] {
        &self.places
    }

    /// Returns `true` if the stay belongs to this frieze.
    #[must_use]
    pub fn contains(&self, stay: StayId) -> bool {
        self.stays.iter().any(|s| s.id() == stay)
    }

    /// Returns the earliest start and the latest end over all stays.
    #[must_use]
    pub fn date_range(&self) -> Option<(i64, i64)> {
        self.range
    }

    /// Returns the earliest start date.
    #[must_use]
    pub fn min_date(&self) -> Option<i64> {
        self.range.map(|(min, _)| min)
    }

    /// Returns the latest end date.
    #[must_use]
    pub fn max_date(&self) -> Option<i64> {
        self.range.map(|(_, max)| max)
    }

    /// Adds a stay; returns `false` if it was already present.
    pub fn add_stay(&mut self, stay: &StayPeriod) -> bool {
        if self.contains(stay.id()) {
            return false;
        }
        self.stays.push(stay.clone());
        absorb(&mut self.persons, &mut self.places, &mut self.range, stay);
        true
    }

    /// Removes a stay and returns it, or `None` if it was not present.
    pub fn remove_stay(&mut self, stay: StayId) -> Option<StayPeriod> {
        let index = self.stays.iter().position(|s| s.id() == stay)?;
        let removed = self.stays.remove(index);
        self.recompute();
        Some(removed)
    }

    fn recompute(&mut self) {
        self.persons.clear();
        self.places.clear();
        self.range = None;
        for stay in &self.stays {
            absorb(&mut self.persons, &mut self.places, &mut self.range, stay);
        }
    }
}

fn absorb(
    persons: &mut Vec<PersonId>,
    places: &mut Vec<PlaceId>,
    range: &mut Option<(i64, i64)>,
    stay: &StayPeriod,
) {
    if !persons.contains(&stay.person()) {
        persons.push(stay.person());
    }
    if !places.contains(&stay.place()) {
        places.push(stay.place());
    }
    *range = Some(match *range {
        Some((min, max)) => (min.min(stay.start_date()), max.max(stay.end_date())),
        None => (stay.start_date(), stay.end_date()),
    });
}
