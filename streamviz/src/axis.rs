// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Scale bookkeeping shared by the resizable histogram and heatmap.
//!
//! An [`Axis`] tracks the scale range currently represented by a fixed number of bins and
//! the observed range of real data inside it. Widening doubles the scale around its
//! center; the bin storage is collapsed with [`collapse_lane`] in lockstep.

use crate::extrema::Extrema;

/// Absolute upper bound used when a zero-width range sits exactly at zero.
pub(crate) const ZERO_WIDTH_EPSILON: f64 = 1e-6;

/// Relative half-width used when a zero-width range sits at a nonzero value.
const ZERO_WIDTH_RELATIVE: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Axis {
    scale: Extrema<f64>,
    observed: Extrema<f64>,
}

impl Axis {
    pub fn empty() -> Self {
        Self {
            scale: Extrema::new(),
            observed: Extrema::new(),
        }
    }

    /// Seeds observed values from `v1, v2` and the scale from `s1, s2`. The scale always
    /// covers the observed values and never has zero width.
    pub fn seeded(v1: f64, v2: f64, s1: f64, s2: f64) -> Self {
        let observed = Extrema::from_bounds(v1, v2);
        let mut scale = Extrema::from_bounds(s1, s2);
        scale.update_with(&observed);
        Self {
            scale: non_degenerate(scale),
            observed,
        }
    }

    /// An axis with a scale range but no observed data.
    pub fn with_scale(scale: Extrema<f64>) -> Self {
        Self {
            scale: non_degenerate(scale),
            observed: Extrema::new(),
        }
    }

    pub fn has_scale(&self) -> bool {
        !self.scale.is_empty()
    }

    pub fn scale(&self) -> &Extrema<f64> {
        &self.scale
    }

    pub fn observed(&self) -> &Extrema<f64> {
        &self.observed
    }

    pub fn observe(&mut self, value: f64) {
        self.observed.update(value);
    }

    pub fn observe_all(&mut self, other: &Extrema<f64>) {
        self.observed.update_with(other);
    }

    pub fn bin_width(&self, num_bins: usize) -> f64 {
        self.scale.width() / num_bins as f64
    }

    /// Index of the bin holding `value`; the upper bound of the scale is closed.
    pub fn bin_index(&self, value: f64, num_bins: usize) -> usize {
        let position = (value - self.scale.min()) / self.scale.width() * num_bins as f64;
        if position <= 0.0 || position.is_nan() {
            0
        } else {
            (position.floor() as usize).min(num_bins - 1)
        }
    }

    /// Returns true if `[min, max]` lies within the scale.
    pub fn covers(&self, min: f64, max: f64) -> bool {
        self.scale.contains(min) && self.scale.contains(max)
    }

    /// Doubles the scale around its center.
    pub fn widen_once(&mut self) {
        let half = self.scale.width() / 2.0;
        let (min, max) = (self.scale.min() - half, self.scale.max() + half);
        self.scale = Extrema::from_bounds(min, max);
    }
}

fn non_degenerate(scale: Extrema<f64>) -> Extrema<f64> {
    if scale.is_empty() || scale.width() > 0.0 {
        return scale;
    }
    let value = scale.min();
    if value == 0.0 {
        Extrema::from_bounds(0.0, ZERO_WIDTH_EPSILON)
    } else {
        let delta = value.abs() * ZERO_WIDTH_RELATIVE;
        Extrema::from_bounds(value - delta, value + delta)
    }
}

/// Collapses one lane of bins after its axis doubled.
///
/// The lane holds `len` counters at `offset, offset + stride, ...`. Adjacent pairs are
/// summed into the first half, the collapsed half is moved to the center and the freed
/// outer quarters are zeroed. With `len` divisible by four the collapsed pairs line up
/// exactly with the doubled bin grid.
pub(crate) fn collapse_lane(bins: &mut [u64], len: usize, stride: usize, offset: usize) {
    debug_assert_eq!(len % 4, 0, "lane length must be divisible by four");
    let at = |i: usize| offset + i * stride;
    let half = len / 2;
    let quarter = len / 4;

    for i in 0..half {
        bins[at(i)] = bins[at(2 * i)] + bins[at(2 * i + 1)];
    }
    for i in (0..half).rev() {
        bins[at(i + quarter)] = bins[at(i)];
    }
    for i in (0..quarter).chain(quarter + half..len) {
        bins[at(i)] = 0;
    }
}
