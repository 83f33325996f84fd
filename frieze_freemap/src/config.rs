// Copyright 2025 the Frieze Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layout configuration.

use core::ops::Range;

/// How dates map onto the horizontal time axis.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TimeDisplayMode {
    /// Distance on the axis is proportional to elapsed time.
    #[default]
    Proportional,
    /// Distinct dates are spread evenly by rank, whatever their values.
    EqualSplit,
}

/// Geometry of a [`FriezeFreeMap`](crate::FriezeFreeMap).
///
/// The drawing area is split into three columns from left to right: the
/// person column (portraits), the place column (lane names) and the time
/// axis, which takes the remaining width.
///
/// ```rust
/// use frieze_freemap::FreeMapConfig;
///
/// let config = FreeMapConfig::default()
///     .with_width(1200.0)
///     .with_person_width(80.0)
///     .with_place_width(120.0);
/// assert_eq!(config.time_axis_span(), 200.0..1200.0);
/// ```
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FreeMapConfig {
    /// Total width.
    pub width: f64,
    /// Total height.
    pub height: f64,
    /// Padding at both ends of the time axis.
    pub padding: f64,
    /// Width of the person column.
    pub person_width: f64,
    /// Width of the place column.
    pub place_width: f64,
    /// Render size of plots.
    pub plot_size: f64,
    /// Font size of lane names.
    pub font_size: f64,
    /// Vertical distance between the persons stacked in one place lane.
    pub person_separation: f64,
}

impl Default for FreeMapConfig {
    fn default() -> Self {
        Self {
            width: 1000.0,
            height: 600.0,
            padding: 20.0,
            person_width: 100.0,
            place_width: 150.0,
            plot_size: 8.0,
            font_size: 12.0,
            person_separation: 10.0,
        }
    }
}

impl FreeMapConfig {
    /// Sets the total width.
    #[must_use]
    pub fn with_width(mut self, width: f64) -> Self {
        self.width = width;
        self
    }

    /// Sets the total height.
    #[must_use]
    pub fn with_height(mut self, height: f64) -> Self {
        self.height = height;
        self
    }

    /// Sets the time axis padding.
    #[must_use]
    pub fn with_padding(mut self, padding: f64) -> Self {
        self.padding = padding;
        self
    }

    /// Sets the person column width.
    #[must_use]
    pub fn with_person_width(mut self, person_width: f64) -> Self {
        self.person_width = person_width;
        self
    }

    /// Sets the place column width.
    #[must_use]
    pub fn with_place_width(mut self, place_width: f64) -> Self {
        self.place_width = place_width;
        self
    }

    /// Sets the plot size.
    #[must_use]
    pub fn with_plot_size(mut self, plot_size: f64) -> Self {
        self.plot_size = plot_size;
        self
    }

    /// Sets the font size.
    #[must_use]
    pub fn with_font_size(mut self, font_size: f64) -> Self {
        self.font_size = font_size;
        self
    }

    /// Sets the vertical separation between persons in a lane.
    #[must_use]
    pub fn with_person_separation(mut self, person_separation: f64) -> Self {
        self.person_separation = person_separation;
        self
    }

    /// Minimum height of a place lane: room for its name.
    #[must_use]
    pub fn name_height(&self) -> f64 {
        self.font_size * 2.0
    }

    /// Horizontal span of the time axis, before padding.
    #[must_use]
    pub fn time_axis_span(&self) -> Range<f64> {
        (self.person_width + self.place_width)..self.width
    }
}
