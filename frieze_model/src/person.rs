// Copyright 2025 the Frieze Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Persons and their portraits.

use alloc::string::String;
use alloc::vec::Vec;

use crate::id::{PersonId, PortraitId};

/// A picture attached to a person.
///
/// The source is an opaque reference (a path or URL) resolved by whatever
/// layer loads pictures; the model never touches the file itself.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Portrait {
    /// Portrait identifier.
    pub id: PortraitId,
    /// Opaque picture reference.
    pub source: String,
}

/// Someone whose stays are tracked on a frieze.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Person {
    id: PersonId,
    name: String,
    portraits: Vec<Portrait>,
}

impl Person {
    pub(crate) fn new(id: PersonId, name: String) -> Self {
        Self {
            id,
            name,
            portraits: Vec::new(),
        }
    }

    /// Returns the person identifier.
    #[must_use]
    pub fn id(&self) -> PersonId {
        self.id
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the portraits in insertion order; the first one is the default.
    #[must_use]
    pub fn portraits(&self) -> &[Portrait] {
        &self.portraits
    }

    /// Returns the default portrait, if any.
    #[must_use]
    pub fn default_portrait(&self) -> Option<&Portrait> {
        self.portraits.first()
    }

    pub(crate) fn push_portrait(&mut self, portrait: Portrait) {
        self.portraits.push(portrait);
    }

    pub(crate) fn set_name(&mut self, name: String) {
        self.name = name;
    }
}
