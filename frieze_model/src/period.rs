// Copyright 2025 the Frieze Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Stay periods: one person at one place over a time interval.
//!
//! A period is expressed either as a pair of calendar dates or as a pair of
//! numeric timestamps. Both forms expose their bounds as an `i64` scalar so
//! that layout code can compare and interpolate them without caring which
//! form it is looking at. Calendar dates map to their Julian day number.

use time::{Date, Month};

use crate::error::ModelError;
use crate::id::{PersonId, PlaceId, StayId};

/// How a period's bounds are expressed.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TimeFormat {
    /// Calendar dates.
    Calendar,
    /// Numeric timestamps in an application-defined unit.
    Numeric,
}

/// The time interval of a stay.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Period {
    /// Interval between two calendar dates.
    Calendar {
        /// First day of the stay.
        start: Date,
        /// Last day of the stay.
        end: Date,
    },
    /// Interval between two numeric timestamps.
    Numeric {
        /// Start timestamp.
        start: i64,
        /// End timestamp.
        end: i64,
    },
}

impl Period {
    /// Creates a numeric period.
    ///
    /// # Errors
    ///
    /// [`ModelError::InvertedPeriod`] if `end < start`.
    pub fn numeric(start: i64, end: i64) -> Result<Self, ModelError> {
        if end < start {
            return Err(ModelError::InvertedPeriod { start, end });
        }
        Ok(Self::Numeric { start, end })
    }

    /// Creates a calendar period.
    ///
    /// # Errors
    ///
    /// [`ModelError::InvertedPeriod`] if `end` is before `start`.
    pub fn calendar(start: Date, end: Date) -> Result<Self, ModelError> {
        let period = Self::Calendar { start, end };
        if end < start {
            return Err(ModelError::InvertedPeriod {
                start: period.start_date(),
                end: period.end_date(),
            });
        }
        Ok(period)
    }

    /// Creates a calendar period from `(year, month, day)` triples.
    ///
    /// # Errors
    ///
    /// - [`ModelError::InvalidCalendarDate`] if a triple is not a real date.
    /// - [`ModelError::InvertedPeriod`] if the end is before the start.
    pub fn from_ymd(start: (i32, u8, u8), end: (i32, u8, u8)) -> Result<Self, ModelError> {
        Self::calendar(ymd(start)?, ymd(end)?)
    }

    /// Returns the start as a comparable scalar.
    #[must_use]
    pub fn start_date(&self) -> i64 {
        match *self {
            Self::Calendar { start, .. } => i64::from(start.to_julian_day()),
            Self::Numeric { start, .. } => start,
        }
    }

    /// Returns the end as a comparable scalar.
    #[must_use]
    pub fn end_date(&self) -> i64 {
        match *self {
            Self::Calendar { end, .. } => i64::from(end.to_julian_day()),
            Self::Numeric { end, .. } => end,
        }
    }

    /// Returns which representation this period uses.
    #[must_use]
    pub fn time_format(&self) -> TimeFormat {
        match self {
            Self::Calendar { .. } => TimeFormat::Calendar,
            Self::Numeric { .. } => TimeFormat::Numeric,
        }
    }
}

fn ymd((year, month, day): (i32, u8, u8)) -> Result<Date, ModelError> {
    let invalid = ModelError::InvalidCalendarDate { year, month, day };
    let month = Month::try_from(month).map_err(|_| invalid.clone())?;
    Date::from_calendar_date(year, month, day).map_err(|_| invalid)
}

/// One person at one place over a [`Period`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StayPeriod {
    id: StayId,
    person: PersonId,
    place: PlaceId,
    period: Period,
}

impl StayPeriod {
    /// Creates a stay period.
    ///
    /// Identifier uniqueness is the responsibility of the
    /// [`Project`](crate::Project) factories.
    #[must_use]
    pub fn new(id: StayId, person: PersonId, place: PlaceId, period: Period) -> Self {
        Self {
            id,
            person,
            place,
            period,
        }
    }

    /// Returns the stay identifier.
    #[must_use]
    pub fn id(&self) -> StayId {
        self.id
    }

    /// Returns the person staying.
    #[must_use]
    pub fn person(&self) -> PersonId {
        self.person
    }

    /// Returns the place stayed at.
    #[must_use]
    pub fn place(&self) -> PlaceId {
        self.place
    }

    /// Returns the interval.
    #[must_use]
    pub fn period(&self) -> Period {
        self.period
    }

    /// Returns the start as a comparable scalar.
    #[must_use]
    pub fn start_date(&self) -> i64 {
        self.period.start_date()
    }

    /// Returns the end as a comparable scalar.
    #[must_use]
    pub fn end_date(&self) -> i64 {
        self.period.end_date()
    }

    /// Returns which representation the interval uses.
    #[must_use]
    pub fn time_format(&self) -> TimeFormat {
        self.period.time_format()
    }
}
