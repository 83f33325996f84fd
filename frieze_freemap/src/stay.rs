// Copyright 2025 the Frieze Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Displayed stays: one stay period, or several merged into one span.

use alloc::vec::Vec;

use frieze_model::{Atlas, PersonId, PlaceId, StayId, StayPeriod};
use kurbo::Point;

use crate::error::MergeError;
use crate::ids::{LinkId, PlotId};

/// The plots and the stay link of a displayed stay.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct StayPlots {
    /// Plot at the start date.
    pub start: PlotId,
    /// Plot at the end date.
    pub end: PlotId,
    /// Link from `start` to `end`.
    pub link: LinkId,
}

/// A single stay period on display.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SimpleStay {
    pub(crate) period: StayPeriod,
    pub(crate) plots: StayPlots,
}

impl SimpleStay {
    /// Returns the stay period.
    #[must_use]
    pub fn period(&self) -> &StayPeriod {
        &self.period
    }
}

/// Several stays of one person displayed as a single span.
///
/// The span runs from the earliest member start to the latest member end.
/// The representative place is the forced place when one is set, otherwise
/// the most specific place that encompasses every member's place.
#[derive(Clone, Debug, PartialEq)]
pub struct MergedStay {
    person: PersonId,
    members: Vec<StayPeriod>,
    place: PlaceId,
    forced_place: Option<PlaceId>,
    start: i64,
    end: i64,
    connectors: Vec<Point>,
    pub(crate) plots: StayPlots,
}

impl MergedStay {
    /// Creates a merged stay from its first member.
    ///
    /// The forced place, when given, must encompass the member's place.
    pub(crate) fn new(
        atlas: &Atlas,
        first: StayPeriod,
        forced_place: Option<PlaceId>,
        plots: StayPlots,
    ) -> Result<Self, MergeError> {
        if let Some(forced) = forced_place {
            check_forced(atlas, forced, &first)?;
        }
        Ok(Self {
            person: first.person(),
            place: forced_place.unwrap_or(first.place()),
            forced_place,
            start: first.start_date(),
            end: first.end_date(),
            members: alloc::vec![first],
            connectors: Vec::new(),
            plots,
        })
    }

    /// Returns the owning person.
    #[must_use]
    pub fn person(&self) -> PersonId {
        self.person
    }

    /// Returns the members in insertion order.
    #[must_use]
    pub fn members(&self) -> &[StayPeriod] {
        &self.members
    }

    /// Returns `true` if the stay is a member.
    #[must_use]
    pub fn contains(&self, stay: StayId) -> bool {
        self.members.iter().any(|m| m.id() == stay)
    }

    /// Returns the representative place.
    #[must_use]
    pub fn place(&self) -> PlaceId {
        self.place
    }

    /// Returns the forced place, if the merged stay is pinned to one.
    #[must_use]
    pub fn forced_place(&self) -> Option<PlaceId> {
        self.forced_place
    }

    /// Returns the earliest member start.
    #[must_use]
    pub fn start_date(&self) -> i64 {
        self.start
    }

    /// Returns the latest member end.
    #[must_use]
    pub fn end_date(&self) -> i64 {
        self.end
    }

    /// Returns the intermediate connectors in order.
    #[must_use]
    pub fn connectors(&self) -> &[Point] {
        &self.connectors
    }

    /// Checks whether `candidate` could join, without changing anything.
    ///
    /// # Errors
    ///
    /// [`MergeError::PersonMismatch`] or [`MergeError::OutsideForcedPlace`].
    pub fn admits(&self, atlas: &Atlas, candidate: &StayPeriod) -> Result<(), MergeError> {
        if candidate.person() != self.person {
            return Err(MergeError::PersonMismatch {
                expected: self.person,
                found: candidate.person(),
            });
        }
        if let Some(forced) = self.forced_place {
            check_forced(atlas, forced, candidate)?;
        }
        Ok(())
    }

    /// Adds a member; returns `false` if it already was one.
    ///
    /// Without a forced place, a candidate outside the representative place
    /// widens it to the common ancestor of both.
    pub(crate) fn add(&mut self, atlas: &Atlas, candidate: StayPeriod) -> Result<bool, MergeError> {
        self.admits(atlas, &candidate)?;
        if self.contains(candidate.id()) {
            return Ok(false);
        }
        if self.forced_place.is_none() && !atlas.encompasses(self.place, candidate.place()) {
            self.place = atlas
                .common_ancestor(self.place, candidate.place())
                .unwrap_or(PlaceId::UNIVERSE);
        }
        self.start = self.start.min(candidate.start_date());
        self.end = self.end.max(candidate.end_date());
        self.members.push(candidate);
        Ok(true)
    }

    /// Removes a member and returns it.
    ///
    /// The span is rescanned from the remaining members and, without a forced
    /// place, the representative place narrows to what they still need.
    pub(crate) fn remove(&mut self, atlas: &Atlas, stay: StayId) -> Result<StayPeriod, MergeError> {
        let index = self
            .members
            .iter()
            .position(|m| m.id() == stay)
            .ok_or(MergeError::NotAMember(stay))?;
        if self.members.len() == 1 {
            return Err(MergeError::LastMember(stay));
        }
        let removed = self.members.remove(index);
        self.rescan(atlas);
        Ok(removed)
    }

    /// Pins the merged stay to `forced`, or unpins it with `None`.
    ///
    /// # Errors
    ///
    /// [`MergeError::OutsideForcedPlace`] if a member is not inside `forced`.
    pub(crate) fn set_forced_place(
        &mut self,
        atlas: &Atlas,
        forced: Option<PlaceId>,
    ) -> Result<(), MergeError> {
        if let Some(forced) = forced {
            for member in &self.members {
                check_forced(atlas, forced, member)?;
            }
        }
        self.forced_place = forced;
        self.rescan(atlas);
        Ok(())
    }

    pub(crate) fn take_members(self) -> Vec<StayPeriod> {
        self.members
    }

    pub(crate) fn push_connector(&mut self, point: Point) -> usize {
        self.connectors.push(point);
        self.connectors.len() - 1
    }

    pub(crate) fn remove_connector(&mut self, index: usize) -> Option<Point> {
        (index < self.connectors.len()).then(|| self.connectors.remove(index))
    }

    pub(crate) fn connector_mut(&mut self, index: usize) -> Option<&mut Point> {
        self.connectors.get_mut(index)
    }

    fn rescan(&mut self, atlas: &Atlas) {
        let mut members = self.members.iter();
        let Some(first) = members.next() else {
            return;
        };
        let (mut start, mut end, mut place) = (first.start_date(), first.end_date(), first.place());
        for member in members {
            start = start.min(member.start_date());
            end = end.max(member.end_date());
            if !atlas.encompasses(place, member.place()) {
                place = atlas
                    .common_ancestor(place, member.place())
                    .unwrap_or(PlaceId::UNIVERSE);
            }
        }
        self.start = start;
        self.end = end;
        self.place = self.forced_place.unwrap_or(place);
    }
}

fn check_forced(atlas: &Atlas, forced: PlaceId, candidate: &StayPeriod) -> Result<(), MergeError> {
    if atlas.encompasses(forced, candidate.place()) {
        Ok(())
    } else {
        Err(MergeError::OutsideForcedPlace {
            forced,
            place: candidate.place(),
        })
    }
}

/// A stay as displayed on a map.
#[derive(Clone, Debug, PartialEq)]
pub enum FreeMapStay {
    /// One stay period.
    Simple(SimpleStay),
    /// Several stay periods of one person shown as one span.
    Merged(MergedStay),
}

impl FreeMapStay {
    /// Returns the owning person.
    #[must_use]
    pub fn person(&self) -> PersonId {
        match self {
            Self::Simple(s) => s.period.person(),
            Self::Merged(m) => m.person,
        }
    }

    /// Returns the place the stay is displayed in.
    #[must_use]
    pub fn place(&self) -> PlaceId {
        match self {
            Self::Simple(s) => s.period.place(),
            Self::Merged(m) => m.place,
        }
    }

    /// Returns the start as a comparable scalar.
    #[must_use]
    pub fn start_date(&self) -> i64 {
        match self {
            Self::Simple(s) => s.period.start_date(),
            Self::Merged(m) => m.start,
        }
    }

    /// Returns the end as a comparable scalar.
    #[must_use]
    pub fn end_date(&self) -> i64 {
        match self {
            Self::Simple(s) => s.period.end_date(),
            Self::Merged(m) => m.end,
        }
    }

    /// Returns the plots and stay link.
    #[must_use]
    pub fn plots(&self) -> StayPlots {
        match self {
            Self::Simple(s) => s.plots,
            Self::Merged(m) => m.plots,
        }
    }

    /// Iterates the stay periods shown by this node.
    pub fn stays(&self) -> impl Iterator<Item = &StayPeriod> + '_ {
        let slice = match self {
            Self::Simple(s) => core::slice::from_ref(&s.period),
            Self::Merged(m) => m.members.as_slice(),
        };
        slice.iter()
    }

    /// Returns `true` if the stay period is shown by this node.
    #[must_use]
    pub fn contains(&self, stay: StayId) -> bool {
        self.stays().any(|s| s.id() == stay)
    }

    /// Returns the merged stay, if this is one.
    #[must_use]
    pub fn as_merged(&self) -> Option<&MergedStay> {
        match self {
            Self::Merged(m) => Some(m),
            Self::Simple(_) => None,
        }
    }

    /// Ordering key on a person lane: start date, then smallest member id.
    #[must_use]
    pub fn sort_key(&self) -> (i64, StayId) {
        let smallest = self
            .stays()
            .map(StayPeriod::id)
            .min()
            .unwrap_or(StayId::new(u64::MAX));
        (self.start_date(), smallest)
    }
}

#[cfg(test)]
mod tests {
    use frieze_model::{Level, Period, Project};

    use super::*;
    use crate::ids::ArenaKey;

    fn plots() -> StayPlots {
        StayPlots {
            start: PlotId::from_parts(0, 1),
            end: PlotId::from_parts(1, 1),
            link: LinkId::from_parts(0, 1),
        }
    }

    struct Fixture {
        project: Project,
        ada: PersonId,
        egypt: PlaceId,
        cairo: PlaceId,
        giza: PlaceId,
        paris: PlaceId,
    }

    fn fixture() -> Fixture {
        let mut project = Project::new();
        let earth = project.create_place("Earth", Level::Planet, None).unwrap();
        let egypt = project
            .create_place("Egypt", Level::Country, Some(earth))
            .unwrap();
        let cairo = project.create_place("Cairo", Level::Town, Some(egypt)).unwrap();
        let giza = project.create_place("Giza", Level::Town, Some(egypt)).unwrap();
        let paris = project.create_place("Paris", Level::Town, Some(earth)).unwrap();
        let ada = project.create_person("Ada");
        Fixture {
            project,
            ada,
            egypt,
            cairo,
            giza,
            paris,
        }
    }

    impl Fixture {
        fn stay(&mut self, person: PersonId, place: PlaceId, start: i64, end: i64) -> StayPeriod {
            let id = self
                .project
                .create_stay(person, place, Period::numeric(start, end).unwrap())
                .unwrap();
            self.project.stay(id).unwrap().clone()
        }
    }

    #[test]
    fn merge_range_grows_and_shrinks() {
        let mut f = fixture();
        let first = f.stay(f.ada, f.cairo, 10, 20);
        let second = f.stay(f.ada, f.cairo, 25, 40);
        let atlas = f.project.atlas();

        let mut merged = MergedStay::new(atlas, first, None, plots()).unwrap();
        assert!(merged.add(atlas, second.clone()).unwrap());
        assert!(!merged.add(atlas, second.clone()).unwrap());
        assert_eq!((merged.start_date(), merged.end_date()), (10, 40));

        merged.remove(atlas, second.id()).unwrap();
        assert_eq!((merged.start_date(), merged.end_date()), (10, 20));
    }

    #[test]
    fn last_member_cannot_leave() {
        let mut f = fixture();
        let only = f.stay(f.ada, f.cairo, 1, 2);
        let id = only.id();
        let atlas = f.project.atlas();
        let mut merged = MergedStay::new(atlas, only, None, plots()).unwrap();
        assert_eq!(merged.remove(atlas, id), Err(MergeError::LastMember(id)));
        assert_eq!(
            merged.remove(atlas, StayId::new(99)),
            Err(MergeError::NotAMember(StayId::new(99)))
        );
    }

    #[test]
    fn other_persons_are_rejected() {
        let mut f = fixture();
        let bob = f.project.create_person("Bob");
        let mine = f.stay(f.ada, f.cairo, 1, 2);
        let theirs = f.stay(bob, f.cairo, 3, 4);
        let atlas = f.project.atlas();

        let mut merged = MergedStay::new(atlas, mine, None, plots()).unwrap();
        assert_eq!(
            merged.add(atlas, theirs),
            Err(MergeError::PersonMismatch {
                expected: f.ada,
                found: bob,
            })
        );
        assert_eq!(merged.members().len(), 1);
    }

    #[test]
    fn unforced_place_widens_to_the_common_ancestor() {
        let mut f = fixture();
        let cairo = f.stay(f.ada, f.cairo, 1, 2);
        let giza = f.stay(f.ada, f.giza, 3, 4);
        let giza_id = giza.id();
        let atlas = f.project.atlas();

        let mut merged = MergedStay::new(atlas, cairo, None, plots()).unwrap();
        merged.add(atlas, giza).unwrap();
        assert_eq!(merged.place(), f.egypt);

        // Narrows back once Giza leaves.
        merged.remove(atlas, giza_id).unwrap();
        assert_eq!(merged.place(), f.cairo);
    }

    #[test]
    fn forced_place_constrains_members() {
        let mut f = fixture();
        let cairo = f.stay(f.ada, f.cairo, 1, 2);
        let paris = f.stay(f.ada, f.paris, 3, 4);
        let atlas = f.project.atlas();

        let mut merged = MergedStay::new(atlas, cairo, Some(f.egypt), plots()).unwrap();
        assert_eq!(merged.place(), f.egypt);
        assert_eq!(
            merged.add(atlas, paris),
            Err(MergeError::OutsideForcedPlace {
                forced: f.egypt,
                place: f.paris,
            })
        );

        // Rebasing onto a place that excludes a member fails and changes nothing.
        assert!(merged.set_forced_place(atlas, Some(f.giza)).is_err());
        assert_eq!(merged.forced_place(), Some(f.egypt));

        merged.set_forced_place(atlas, None).unwrap();
        assert_eq!(merged.place(), f.cairo);
    }

    #[test]
    fn sort_key_breaks_start_ties_by_smallest_member() {
        let mut f = fixture();
        let a = f.stay(f.ada, f.cairo, 5, 6);
        let b = f.stay(f.ada, f.cairo, 5, 9);
        let simple = FreeMapStay::Simple(SimpleStay {
            period: b.clone(),
            plots: plots(),
        });
        let atlas = f.project.atlas();
        let mut merged = MergedStay::new(atlas, b, None, plots()).unwrap();
        merged.add(atlas, a.clone()).unwrap();
        let merged = FreeMapStay::Merged(merged);

        assert_eq!(merged.sort_key(), (5, a.id()));
        assert!(merged.sort_key() < simple.sort_key());
        assert!(merged.contains(a.id()));
    }
}
