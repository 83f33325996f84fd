// Copyright 2025 the Frieze Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

/// Smallest coordinate or size change that is reported to subscribers.
pub(crate) const EPSILON: f64 = 1e-6;

/// Returns `true` if `a` and `b` differ by more than [`EPSILON`].
#[inline]
pub(crate) fn differs(a: f64, b: f64) -> bool {
    (a - b).abs() > EPSILON
}
