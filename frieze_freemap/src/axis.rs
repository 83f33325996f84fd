// Copyright 2025 the Frieze Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::vec::Vec;
use core::ops::Range;

use crate::config::TimeDisplayMode;

/// Mapping from dates to x coordinates over the horizontal time axis.
///
/// `TimeAxis` tracks a span in view coordinates, a padding kept free at both
/// ends of the span, and the ascending set of distinct dates on display. The
/// earliest date maps to `span.start + padding` and the latest to
/// `span.end - padding`.
///
/// - [`TimeDisplayMode::Proportional`] places each date by value.
/// - [`TimeDisplayMode::EqualSplit`] places each date by rank, so consecutive
///   dates are evenly spaced whatever the time elapsed between them.
///
/// With a single distinct date (or none) every date maps to the padded start.
#[derive(Clone, Debug)]
pub struct TimeAxis {
    view_span: Range<f64>,
    padding: f64,
    mode: TimeDisplayMode,
    dates: Vec<i64>,
}

impl TimeAxis {
    /// Creates an axis over `view_span` with no dates.
    #[must_use]
    pub fn new(view_span: Range<f64>, padding: f64, mode: TimeDisplayMode) -> Self {
        Self {
            view_span,
            padding,
            mode,
            dates: Vec::new(),
        }
    }

    /// Returns the span in view coordinates.
    #[must_use]
    pub fn view_span(&self) -> Range<f64> {
        self.view_span.clone()
    }

    /// Sets the span; returns `true` if it changed.
    pub fn set_view_span(&mut self, span: Range<f64>) -> bool {
        if self.view_span.start == span.start && self.view_span.end == span.end {
            return false;
        }
        self.view_span = span;
        true
    }

    /// Returns the padding.
    #[must_use]
    pub fn padding(&self) -> f64 {
        self.padding
    }

    /// Sets the padding; returns `true` if it changed.
    pub fn set_padding(&mut self, padding: f64) -> bool {
        if self.padding == padding {
            return false;
        }
        self.padding = padding;
        true
    }

    /// Returns the display mode.
    #[must_use]
    pub fn mode(&self) -> TimeDisplayMode {
        self.mode
    }

    /// Sets the display mode; returns `true` if it changed.
    pub fn set_mode(&mut self, mode: TimeDisplayMode) -> bool {
        if self.mode == mode {
            return false;
        }
        self.mode = mode;
        true
    }

    /// Returns the distinct dates, ascending.
    #[must_use]
    pub fn dates(&self) -> &[i64] {
        &self.dates
    }

    /// Replaces the distinct dates; returns `true` if the set changed.
    ///
    /// `dates` must be ascending and free of duplicates.
    pub fn set_dates(&mut self, dates: Vec<i64>) -> bool {
        debug_assert!(dates.windows(2).all(|w| w[0] < w[1]), "dates must be ascending");
        if self.dates == dates {
            return false;
        }
        self.dates = dates;
        true
    }

    /// Returns the earliest and latest dates.
    #[must_use]
    pub fn date_range(&self) -> Option<(i64, i64)> {
        Some((*self.dates.first()?, *self.dates.last()?))
    }

    /// Converts a date into an x coordinate.
    #[must_use]
    pub fn date_to_x(&self, date: i64) -> f64 {
        let origin = self.view_span.start + self.padding;
        let ratio = match self.mode {
            TimeDisplayMode::Proportional => match self.date_range() {
                Some((min, max)) if max > min => span_ratio(date, min, max),
                _ => 0.0,
            },
            TimeDisplayMode::EqualSplit => {
                let steps = self.dates.len().saturating_sub(1);
                if steps == 0 {
                    0.0
                } else {
                    let rank = self.dates.partition_point(|d| *d < date);
                    rank as f64 / steps as f64
                }
            }
        };
        origin + ratio * self.usable_width()
    }

    /// Converts an x coordinate back into a date, rounding to the nearest
    /// whole unit.
    ///
    /// Returns `None` when there are no dates, or a single one.
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        reason = "rank positions are small non-negative values"
    )]
    pub fn x_to_date(&self, x: f64) -> Option<i64> {
        let (min, max) = self.date_range().filter(|(min, max)| max > min)?;
        let width = self.usable_width();
        if width <= 0.0 {
            return Some(min);
        }
        let ratio = ((x - self.view_span.start - self.padding) / width).clamp(0.0, 1.0);
        let date = match self.mode {
            TimeDisplayMode::Proportional => min as f64 + ratio * (max as f64 - min as f64),
            TimeDisplayMode::EqualSplit => {
                let steps = self.dates.len() - 1;
                let pos = ratio * steps as f64;
                let lower = (pos as usize).min(steps - 1);
                let (a, b) = (self.dates[lower], self.dates[lower + 1]);
                a as f64 + (pos - lower as f64) * (b as f64 - a as f64)
            }
        };
        Some(round_half_up(date))
    }

    fn usable_width(&self) -> f64 {
        (self.view_span.end - self.view_span.start) - 2.0 * self.padding
    }
}

/// Position of `date` within `min..=max` as a fraction.
///
/// Differences are taken in `f64` so that dates spanning most of the `i64`
/// range cannot overflow.
fn span_ratio(date: i64, min: i64, max: i64) -> f64 {
    (date as f64 - min as f64) / (max as f64 - min as f64)
}

#[allow(
    clippy::cast_possible_truncation,
    reason = "out of range values saturate at the i64 bounds"
)]
fn round_half_up(value: f64) -> i64 {
    let floor = value as i64;
    let floor = if (floor as f64) > value { floor - 1 } else { floor };
    if value - floor as f64 >= 0.5 {
        floor + 1
    } else {
        floor
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;

    #[test]
    fn proportional_maps_extremes_to_the_padded_span() {
        let mut axis = TimeAxis::new(0.0..1000.0, 50.0, TimeDisplayMode::Proportional);
        assert!(axis.set_dates(vec![100, 250]));
        assert!(!axis.set_dates(vec![100, 250]));

        assert_eq!(axis.date_to_x(100), 50.0);
        assert_eq!(axis.date_to_x(250), 950.0);
        assert!((axis.date_to_x(175) - 500.0).abs() < 1e-9);
    }

    #[test]
    fn single_date_sits_at_the_padded_origin() {
        let mut axis = TimeAxis::new(200.0..800.0, 10.0, TimeDisplayMode::Proportional);
        axis.set_dates(vec![42]);
        assert_eq!(axis.date_to_x(42), 210.0);
        assert_eq!(axis.x_to_date(400.0), None);
    }

    #[test]
    fn equal_split_spaces_by_rank() {
        let mut axis = TimeAxis::new(0.0..320.0, 10.0, TimeDisplayMode::EqualSplit);
        axis.set_dates(vec![1, 2, 1000]);
        assert_eq!(axis.date_to_x(1), 10.0);
        assert_eq!(axis.date_to_x(2), 160.0);
        assert_eq!(axis.date_to_x(1000), 310.0);
        assert_eq!(axis.x_to_date(160.0), Some(2));
    }

    #[test]
    fn x_to_date_inverts_proportional_mapping() {
        let mut axis = TimeAxis::new(0.0..1000.0, 0.0, TimeDisplayMode::Proportional);
        axis.set_dates(vec![0, 100]);
        assert_eq!(axis.x_to_date(250.0), Some(25));
        assert_eq!(axis.x_to_date(-10.0), Some(0));
        assert_eq!(axis.x_to_date(5000.0), Some(100));
    }

    #[test]
    fn extreme_dates_map_without_overflow() {
        let mut axis = TimeAxis::new(0.0..1000.0, 0.0, TimeDisplayMode::Proportional);
        axis.set_dates(vec![i64::MIN, 0, i64::MAX]);
        assert_eq!(axis.date_to_x(i64::MIN), 0.0);
        assert_eq!(axis.date_to_x(0), 500.0);
        assert_eq!(axis.date_to_x(i64::MAX), 1000.0);
        assert_eq!(axis.x_to_date(0.0), Some(i64::MIN));
        assert_eq!(axis.x_to_date(1000.0), Some(i64::MAX));

        axis.set_mode(TimeDisplayMode::EqualSplit);
        assert_eq!(axis.date_to_x(i64::MAX), 1000.0);
        assert_eq!(axis.x_to_date(1000.0), Some(i64::MAX));
        assert_eq!(axis.x_to_date(500.0), Some(0));
    }
}
