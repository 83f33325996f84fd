// Copyright 2025 the Frieze Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The session object owning every entity of one project.

use alloc::string::String;

use hashbrown::HashMap;
use log::debug;

use crate::error::ModelError;
use crate::frieze::Frieze;
use crate::id::{EntityKind, FriezeId, IdAllocator, PersonId, PlaceId, PortraitId, StayId};
use crate::period::{Period, StayPeriod};
use crate::person::{Person, Portrait};
use crate::place::{Atlas, Level, Place};

/// Owner of the persons, places, stay periods and friezes of one project.
///
/// Each entity kind gets its own [`IdAllocator`]. The `create_*` factories
/// allocate fresh identifiers; the `insert_*` variants accept identifiers
/// restored by an import path and reject duplicates.
#[derive(Debug, Default)]
pub struct Project {
    person_ids: IdAllocator<PersonId>,
    place_ids: IdAllocator<PlaceId>,
    stay_ids: IdAllocator<StayId>,
    frieze_ids: IdAllocator<FriezeId>,
    portrait_ids: IdAllocator<PortraitId>,
    atlas: Atlas,
    persons: HashMap<PersonId, Person>,
    stays: HashMap<StayId, StayPeriod>,
    friezes: HashMap<FriezeId, Frieze>,
}

impl Project {
    /// Creates an empty project.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the place hierarchy.
    #[must_use]
    pub fn atlas(&self) -> &Atlas {
        &self.atlas
    }

    /// Returns a person.
    #[must_use]
    pub fn person(&self, id: PersonId) -> Option<&Person> {
        self.persons.get(&id)
    }

    /// Returns a place.
    #[must_use]
    pub fn place(&self, id: PlaceId) -> Option<&Place> {
        self.atlas.place(id)
    }

    /// Returns a stay period.
    #[must_use]
    pub fn stay(&self, id: StayId) -> Option<&StayPeriod> {
        self.stays.get(&id)
    }

    /// Returns a frieze.
    #[must_use]
    pub fn frieze(&self, id: FriezeId) -> Option<&Frieze> {
        self.friezes.get(&id)
    }

    /// Iterates all persons in unspecified order.
    pub fn persons(&self) -> impl Iterator<Item = &Person> + '_ {
        self.persons.values()
    }

    /// Iterates all stay periods in unspecified order.
    pub fn stays(&self) -> impl Iterator<Item = &StayPeriod> + '_ {
        self.stays.values()
    }

    /// Iterates all friezes in unspecified order.
    pub fn friezes(&self) -> impl Iterator<Item = &Frieze> + '_ {
        self.friezes.values()
    }

    /// Creates a person.
    pub fn create_person(&mut self, name: impl Into<String>) -> PersonId {
        let id = self.person_ids.allocate();
        self.persons.insert(id, Person::new(id, name.into()));
        debug!("event=person_created module=model person={id}");
        id
    }

    /// Inserts a person with a restored identifier.
    ///
    /// # Errors
    ///
    /// [`ModelError::DuplicateId`] if the identifier is in use.
    pub fn insert_person(
        &mut self,
        id: PersonId,
        name: impl Into<String>,
    ) -> Result<(), ModelError> {
        self.person_ids.reserve(id)?;
        self.persons.insert(id, Person::new(id, name.into()));
        Ok(())
    }

    /// Renames a person.
    ///
    /// # Errors
    ///
    /// [`ModelError::UnknownPerson`] if the person does not exist.
    pub fn rename_person(
        &mut self,
        id: PersonId,
        name: impl Into<String>,
    ) -> Result<(), ModelError> {
        self.persons
            .get_mut(&id)
            .ok_or(ModelError::UnknownPerson(id))?
            .set_name(name.into());
        Ok(())
    }

    /// Attaches a portrait to a person.
    ///
    /// # Errors
    ///
    /// [`ModelError::UnknownPerson`] if the person does not exist.
    pub fn add_portrait(
        &mut self,
        person: PersonId,
        source: impl Into<String>,
    ) -> Result<PortraitId, ModelError> {
        let owner = self
            .persons
            .get_mut(&person)
            .ok_or(ModelError::UnknownPerson(person))?;
        let id = self.portrait_ids.allocate();
        owner.push_portrait(Portrait {
            id,
            source: source.into(),
        });
        Ok(id)
    }

    /// Creates a place under `parent` (the sentinel root when `None`).
    ///
    /// # Errors
    ///
    /// See [`Atlas::insert`].
    pub fn create_place(
        &mut self,
        name: impl Into<String>,
        level: Level,
        parent: Option<PlaceId>,
    ) -> Result<PlaceId, ModelError> {
        let name = name.into();
        // Validate before burning an identifier.
        self.atlas.check_nesting(parent, level)?;
        let id = self.place_ids.allocate();
        self.atlas.insert(id, name, level, parent)?;
        debug!("event=place_created module=model place={id} level={level:?}");
        Ok(id)
    }

    /// Inserts a place with a restored identifier.
    ///
    /// # Errors
    ///
    /// [`ModelError::DuplicateId`] if the identifier is in use, otherwise see
    /// [`Atlas::insert`].
    pub fn insert_place(
        &mut self,
        id: PlaceId,
        name: impl Into<String>,
        level: Level,
        parent: Option<PlaceId>,
    ) -> Result<(), ModelError> {
        if id == PlaceId::UNIVERSE || self.place_ids.is_taken(id) {
            return Err(ModelError::DuplicateId {
                kind: EntityKind::Place,
                id: id.get(),
            });
        }
        self.atlas.insert(id, name, level, parent)?;
        self.place_ids.reserve(id)
    }

    /// Renames a place.
    ///
    /// # Errors
    ///
    /// [`ModelError::UnknownPlace`] if the place does not exist.
    pub fn rename_place(&mut self, id: PlaceId, name: impl Into<String>) -> Result<(), ModelError> {
        self.atlas.rename(id, name)
    }

    /// Changes the level of a place. See [`Atlas::set_level`].
    ///
    /// # Errors
    ///
    /// See [`Atlas::set_level`].
    pub fn set_place_level(&mut self, id: PlaceId, level: Level) -> Result<(), ModelError> {
        self.atlas.set_level(id, level)
    }

    /// Creates a stay period.
    ///
    /// # Errors
    ///
    /// [`ModelError::UnknownPerson`] or [`ModelError::UnknownPlace`] when a
    /// reference does not resolve.
    pub fn create_stay(
        &mut self,
        person: PersonId,
        place: PlaceId,
        period: Period,
    ) -> Result<StayId, ModelError> {
        self.check_refs(person, place)?;
        let id = self.stay_ids.allocate();
        self.stays
            .insert(id, StayPeriod::new(id, person, place, period));
        debug!(
            "event=stay_created module=model stay={id} person={person} place={place} start={} end={}",
            period.start_date(),
            period.end_date()
        );
        Ok(id)
    }

    /// Inserts a stay period with a restored identifier.
    ///
    /// # Errors
    ///
    /// [`ModelError::DuplicateId`], [`ModelError::UnknownPerson`] or
    /// [`ModelError::UnknownPlace`].
    pub fn insert_stay(&mut self, stay: StayPeriod) -> Result<(), ModelError> {
        self.check_refs(stay.person(), stay.place())?;
        self.stay_ids.reserve(stay.id())?;
        self.stays.insert(stay.id(), stay);
        Ok(())
    }

    /// Creates an empty frieze.
    pub fn create_frieze(&mut self, name: impl Into<String>) -> FriezeId {
        let id = self.frieze_ids.allocate();
        self.friezes.insert(id, Frieze::new(id, name));
        id
    }

    /// Inserts an empty frieze with a restored identifier.
    ///
    /// # Errors
    ///
    /// [`ModelError::DuplicateId`] if the identifier is in use.
    pub fn insert_frieze(
        &mut self,
        id: FriezeId,
        name: impl Into<String>,
    ) -> Result<(), ModelError> {
        self.frieze_ids.reserve(id)?;
        self.friezes.insert(id, Frieze::new(id, name));
        Ok(())
    }

    /// Adds a stay to a frieze; returns `false` if it was already there.
    ///
    /// # Errors
    ///
    /// [`ModelError::UnknownFrieze`] or [`ModelError::UnknownStay`].
    pub fn add_to_frieze(&mut self, frieze: FriezeId, stay: StayId) -> Result<bool, ModelError> {
        let period = self.stays.get(&stay).ok_or(ModelError::UnknownStay(stay))?;
        let target = self
            .friezes
            .get_mut(&frieze)
            .ok_or(ModelError::UnknownFrieze(frieze))?;
        Ok(target.add_stay(period))
    }

    /// Detaches a stay from a frieze; returns `false` if it was not there.
    ///
    /// # Errors
    ///
    /// [`ModelError::UnknownFrieze`].
    pub fn remove_from_frieze(
        &mut self,
        frieze: FriezeId,
        stay: StayId,
    ) -> Result<bool, ModelError> {
        let target = self
            .friezes
            .get_mut(&frieze)
            .ok_or(ModelError::UnknownFrieze(frieze))?;
        Ok(target.remove_stay(stay).is_some())
    }

    fn check_refs(&self, person: PersonId, place: PlaceId) -> Result<(), ModelError> {
        if !self.persons.contains_key(&person) {
            return Err(ModelError::UnknownPerson(person));
        }
        if self.atlas.place(place).is_none() {
            return Err(ModelError::UnknownPlace(place));
        }
        Ok(())
    }
}
