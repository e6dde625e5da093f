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

use log::trace;

use super::HEATMAP_MAX_BINS;
use super::serialization::FLAG_HAS_OBSERVED;
use super::serialization::FLAG_HAS_SCALE;
use super::serialization::PREAMBLE_BYTES;
use super::serialization::SERIAL_VERSION;
use crate::axis::Axis;
use crate::axis::collapse_lane;
use crate::codec::SketchBytes;
use crate::codec::SketchSlice;
use crate::codec::family::Family;
use crate::error::Error;
use crate::extrema::Extrema;
use crate::value::Value;

const N: usize = HEATMAP_MAX_BINS;

/// One grid cell as a rectangle in data coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeatmapRect {
    x_left: f64,
    x_right: f64,
    y_left: f64,
    y_right: f64,
    count: u64,
}

impl HeatmapRect {
    pub fn x_left(&self) -> f64 {
        self.x_left
    }

    pub fn x_right(&self) -> f64 {
        self.x_right
    }

    pub fn y_left(&self) -> f64 {
        self.y_left
    }

    pub fn y_right(&self) -> f64 {
        self.y_right
    }

    pub fn count(&self) -> u64 {
        self.count
    }
}

/// Resizable streaming heatmap.
///
/// Both axes receive a scale range together, either at construction or from the first
/// accepted pair.
#[derive(Debug, Clone, PartialEq)]
pub struct Heatmap {
    x: Axis,
    y: Axis,
    bins: Vec<u64>,
}

impl Default for Heatmap {
    fn default() -> Self {
        Self::new()
    }
}

impl Heatmap {
    /// Creates an empty heatmap; the first accepted pair establishes both ranges.
    pub fn new() -> Self {
        Self::with_axes(Axis::empty(), Axis::empty())
    }

    /// Creates a heatmap whose scale and observed ranges span `x1, x2` and `y1, y2`.
    ///
    /// # Panics
    ///
    /// Panics if a bound is not finite.
    pub fn with_range(x1: f64, x2: f64, y1: f64, y2: f64) -> Self {
        assert!(
            [x1, x2, y1, y2].iter().all(|v| v.is_finite()),
            "heatmap bounds must be finite"
        );
        Self::with_axes(Axis::seeded(x1, x2, x1, x2), Axis::seeded(y1, y2, y1, y2))
    }

    fn with_axes(x: Axis, y: Axis) -> Self {
        Self {
            x,
            y,
            bins: vec![0; N * N],
        }
    }

    /// Returns an empty heatmap sharing this heatmap's scale ranges.
    pub fn new_instance(&self) -> Self {
        if !self.has_range() {
            return Self::new();
        }
        Self::with_axes(
            Axis::with_scale(*self.x.scale()),
            Axis::with_scale(*self.y.scale()),
        )
    }

    pub fn has_range(&self) -> bool {
        self.x.has_scale()
    }

    pub fn is_empty(&self) -> bool {
        self.x.observed().is_empty()
    }

    /// Returns the row-major counters: the cell for x bin `i` and y bin `j` is at
    /// `i * HEATMAP_MAX_BINS + j`.
    pub fn bins(&self) -> &[u64] {
        &self.bins
    }

    pub fn total_count(&self) -> u64 {
        self.bins.iter().sum()
    }

    pub fn x_scale_min(&self) -> Option<f64> {
        self.has_range().then(|| self.x.scale().min())
    }

    pub fn x_scale_max(&self) -> Option<f64> {
        self.has_range().then(|| self.x.scale().max())
    }

    pub fn y_scale_min(&self) -> Option<f64> {
        self.has_range().then(|| self.y.scale().min())
    }

    pub fn y_scale_max(&self) -> Option<f64> {
        self.has_range().then(|| self.y.scale().max())
    }

    /// Returns the observed x range, or `None` when empty.
    pub fn x_observed(&self) -> Option<(f64, f64)> {
        let observed = self.x.observed();
        (!observed.is_empty()).then(|| (observed.min(), observed.max()))
    }

    /// Returns the observed y range, or `None` when empty.
    pub fn y_observed(&self) -> Option<(f64, f64)> {
        let observed = self.y.observed();
        (!observed.is_empty()).then(|| (observed.min(), observed.max()))
    }

    /// Counts one `(x, y)` pair.
    ///
    /// Pairs with a missing or non-finite coordinate are ignored.
    ///
    /// # Panics
    ///
    /// Panics if a coordinate is neither missing nor numeric.
    pub fn add_element(&mut self, x: &Value, y: &Value) {
        let (Some(x), Some(y)) = (coordinate(x), coordinate(y)) else {
            return;
        };
        if self.has_range() {
            self.rescale(x, x, y, y);
            self.x.observe(x);
            self.y.observe(y);
        } else {
            self.x = Axis::seeded(x, x, x, x);
            self.y = Axis::seeded(y, y, y, y);
        }
        let cell = self.x.bin_index(x, N) * N + self.y.bin_index(y, N);
        self.bins[cell] += 1;
    }

    /// Doubles either axis until the scale covers the requested bounds. On a heatmap
    /// without a range the requested bounds become the scale. Non-finite bounds are
    /// ignored.
    pub fn rescale(&mut self, x_min: f64, x_max: f64, y_min: f64, y_max: f64) {
        if ![x_min, x_max, y_min, y_max].iter().all(|b| b.is_finite()) {
            return;
        }
        if !self.has_range() {
            self.x = Axis::with_scale(Extrema::from_bounds(x_min, x_max));
            self.y = Axis::with_scale(Extrema::from_bounds(y_min, y_max));
            return;
        }
        while !self.x.covers(x_min, x_max) {
            for column in 0..N {
                collapse_lane(&mut self.bins, N, N, column);
            }
            self.x.widen_once();
            trace!(
                "heatmap x axis widened to [{}, {}]",
                self.x.scale().min(),
                self.x.scale().max()
            );
        }
        while !self.y.covers(y_min, y_max) {
            for row in 0..N {
                collapse_lane(&mut self.bins, N, 1, row * N);
            }
            self.y.widen_once();
            trace!(
                "heatmap y axis widened to [{}, {}]",
                self.y.scale().min(),
                self.y.scale().max()
            );
        }
    }

    /// Merges another heatmap into this one over the union of both scale ranges.
    pub fn combine_with(&mut self, other: &Heatmap) {
        if !other.has_range() {
            return;
        }
        if !self.has_range() {
            self.clone_from(other);
            return;
        }

        let (ox, oy) = (other.x.scale(), other.y.scale());
        self.rescale(ox.min(), ox.max(), oy.min(), oy.max());
        let mut aligned = other.clone();
        let (sx, sy) = (*self.x.scale(), *self.y.scale());
        aligned.rescale(sx.min(), sx.max(), sy.min(), sy.max());

        if aligned.x.scale() == self.x.scale() && aligned.y.scale() == self.y.scale() {
            for (mine, theirs) in self.bins.iter_mut().zip(&aligned.bins) {
                *mine += theirs;
            }
        } else {
            let (x_width, y_width) = (other.x.bin_width(N), other.y.bin_width(N));
            for (cell, &count) in other.bins.iter().enumerate().filter(|(_, c)| **c > 0) {
                let x_center = ox.min() + ((cell / N) as f64 + 0.5) * x_width;
                let y_center = oy.min() + ((cell % N) as f64 + 0.5) * y_width;
                let target = self.x.bin_index(x_center, N) * N + self.y.bin_index(y_center, N);
                self.bins[target] += count;
            }
        }
        self.x.observe_all(other.x.observed());
        self.y.observe_all(other.y.observed());
    }

    /// Returns the grid as rectangles in data coordinates, x-major.
    pub fn rects(&self, include_empty: bool) -> Vec<HeatmapRect> {
        if !self.has_range() {
            return Vec::new();
        }
        let (x_width, y_width) = (self.x.bin_width(N), self.y.bin_width(N));
        let (x_min, y_min) = (self.x.scale().min(), self.y.scale().min());
        self.bins
            .iter()
            .enumerate()
            .filter(|(_, count)| include_empty || **count > 0)
            .map(|(cell, &count)| {
                let (i, j) = ((cell / N) as f64, (cell % N) as f64);
                HeatmapRect {
                    x_left: x_min + i * x_width,
                    x_right: x_min + (i + 1.0) * x_width,
                    y_left: y_min + j * y_width,
                    y_right: y_min + (j + 1.0) * y_width,
                    count,
                }
            })
            .collect()
    }

    /// Serializes this heatmap into a byte vector.
    pub fn serialize(&self) -> Vec<u8> {
        let mut flags = 0;
        if self.has_range() {
            flags |= FLAG_HAS_SCALE;
        }
        if !self.is_empty() {
            flags |= FLAG_HAS_OBSERVED;
        }
        let nonzero: Vec<(usize, u64)> = self
            .bins
            .iter()
            .copied()
            .enumerate()
            .filter(|(_, count)| *count > 0)
            .collect();

        let mut bytes = SketchBytes::with_capacity(PREAMBLE_BYTES + 68 + nonzero.len() * 12);
        bytes.write_u8(Family::HEATMAP.id);
        bytes.write_u8(SERIAL_VERSION);
        bytes.write_u8(flags);
        bytes.write_u8(0);
        bytes.write_u16_le(N as u16);
        if flags & FLAG_HAS_SCALE != 0 {
            for scale in [self.x.scale(), self.y.scale()] {
                bytes.write_f64_le(scale.min());
                bytes.write_f64_le(scale.max());
            }
        }
        if flags & FLAG_HAS_OBSERVED != 0 {
            for observed in [self.x.observed(), self.y.observed()] {
                bytes.write_f64_le(observed.min());
                bytes.write_f64_le(observed.max());
            }
        }
        if flags & FLAG_HAS_SCALE != 0 {
            bytes.write_u32_le(nonzero.len() as u32);
            for (cell, count) in nonzero {
                bytes.write_u32_le(cell as u32);
                bytes.write_u64_le(count);
            }
        }
        bytes.into_bytes()
    }

    /// Deserializes a heatmap from bytes.
    pub fn deserialize(bytes: &[u8]) -> Result<Self, Error> {
        let mut input = SketchSlice::new(bytes);
        let family = input
            .read_u8()
            .map_err(|e| Error::insufficient_data("family").set_source(e))?;
        Family::HEATMAP.validate_id(family)?;
        let version = input
            .read_u8()
            .map_err(|e| Error::insufficient_data("serial_version").set_source(e))?;
        if version != SERIAL_VERSION {
            return Err(Error::unsupported_serial_version(SERIAL_VERSION, version));
        }
        let flags = input
            .read_u8()
            .map_err(|e| Error::insufficient_data("flags").set_source(e))?;
        input
            .read_u8()
            .map_err(|e| Error::insufficient_data("reserved").set_source(e))?;
        let num_bins = input
            .read_u16_le()
            .map_err(|e| Error::insufficient_data("num_bins").set_source(e))?;
        if num_bins as usize != N {
            return Err(Error::deserial("unexpected number of bins")
                .with_context("expected", N)
                .with_context("actual", num_bins));
        }

        let mut heatmap = Heatmap::new();
        if flags & FLAG_HAS_SCALE == 0 {
            return Ok(heatmap);
        }
        let mut read_range = |what: &'static str| -> Result<Extrema<f64>, Error> {
            let a = input
                .read_f64_le()
                .map_err(|e| Error::insufficient_data(what).set_source(e))?;
            let b = input
                .read_f64_le()
                .map_err(|e| Error::insufficient_data(what).set_source(e))?;
            if !(a.is_finite() && b.is_finite() && a <= b) {
                return Err(Error::deserial(format!("malformed {what} range")));
            }
            Ok(Extrema::from_bounds(a, b))
        };
        let x_scale = read_range("x_scale")?;
        let y_scale = read_range("y_scale")?;
        let (x_observed, y_observed) = if flags & FLAG_HAS_OBSERVED != 0 {
            (read_range("x_observed")?, read_range("y_observed")?)
        } else {
            (Extrema::new(), Extrema::new())
        };
        for (scale, observed) in [(&x_scale, &x_observed), (&y_scale, &y_observed)] {
            if scale.width() <= 0.0 || !scale.covers(observed) {
                return Err(Error::deserial(
                    "observed range must lie inside a non-empty scale",
                ));
            }
        }

        let nonzero = input
            .read_u32_le()
            .map_err(|e| Error::insufficient_data("num_cells").set_source(e))?;
        for _ in 0..nonzero {
            let cell = input
                .read_u32_le()
                .map_err(|e| Error::insufficient_data("cell_index").set_source(e))?
                as usize;
            let count = input
                .read_u64_le()
                .map_err(|e| Error::insufficient_data("cell_count").set_source(e))?;
            let slot = heatmap.bins.get_mut(cell).ok_or_else(|| {
                Error::deserial("cell index out of range").with_context("index", cell)
            })?;
            *slot = count;
        }
        heatmap.x = Axis::with_scale(x_scale);
        heatmap.x.observe_all(&x_observed);
        heatmap.y = Axis::with_scale(y_scale);
        heatmap.y.observe_all(&y_observed);
        Ok(heatmap)
    }
}

/// Extracts a usable coordinate: `None` for missing or non-finite values.
fn coordinate(value: &Value) -> Option<f64> {
    if value.is_undefined() {
        return None;
    }
    match value.as_f64() {
        Some(v) => v.is_finite().then_some(v),
        None => panic!("heatmap requires numeric values, got {}", value.value_type()),
    }
}
