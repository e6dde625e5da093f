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

use super::MAX_BINS;
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
use crate::value::ValueType;

/// One presentation bucket returned by [`Histogram::get_bins`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistogramBin {
    left: f64,
    right: f64,
    count: u64,
}

impl HistogramBin {
    /// Returns the inclusive lower edge.
    pub fn left(&self) -> f64 {
        self.left
    }

    /// Returns the upper edge.
    pub fn right(&self) -> f64 {
        self.right
    }

    pub fn count(&self) -> u64 {
        self.count
    }
}

/// Resizable streaming histogram.
///
/// See the [module documentation](super) for more details.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    value_type: ValueType,
    axis: Axis,
    bins: Vec<u64>,
}

impl Histogram {
    /// Creates an empty histogram; the first accepted value establishes the range.
    ///
    /// # Panics
    ///
    /// Panics if `value_type` is not numeric.
    pub fn new(value_type: ValueType) -> Self {
        Self::with_axis(value_type, Axis::empty())
    }

    /// Creates a histogram whose observed and scale ranges both span `v1, v2`.
    ///
    /// # Panics
    ///
    /// Panics if `value_type` is not numeric or a bound is not finite.
    pub fn with_range(value_type: ValueType, v1: f64, v2: f64) -> Self {
        Self::with_scale(value_type, v1, v2, v1, v2)
    }

    /// Creates a histogram observing `v1, v2` with bins spread over `s1, s2`.
    ///
    /// A zero-width scale is widened so that bins have a positive width.
    ///
    /// # Panics
    ///
    /// Panics if `value_type` is not numeric or a bound is not finite.
    pub fn with_scale(value_type: ValueType, v1: f64, v2: f64, s1: f64, s2: f64) -> Self {
        assert!(
            [v1, v2, s1, s2].iter().all(|v| v.is_finite()),
            "histogram bounds must be finite"
        );
        Self::with_axis(value_type, Axis::seeded(v1, v2, s1, s2))
    }

    fn with_axis(value_type: ValueType, axis: Axis) -> Self {
        assert!(
            value_type.is_numeric(),
            "histogram requires a numeric value type, got {value_type}"
        );
        Self {
            value_type,
            axis,
            bins: vec![0; MAX_BINS],
        }
    }

    /// Returns an empty histogram sharing this histogram's scale range.
    pub fn new_instance(&self) -> Self {
        let axis = if self.axis.has_scale() {
            Axis::with_scale(*self.axis.scale())
        } else {
            Axis::empty()
        };
        Self::with_axis(self.value_type, axis)
    }

    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    /// Returns true if no value has been counted.
    pub fn is_empty(&self) -> bool {
        self.axis.observed().is_empty()
    }

    /// Returns true once a scale range exists.
    pub fn has_range(&self) -> bool {
        self.axis.has_scale()
    }

    pub fn bins(&self) -> &[u64] {
        &self.bins
    }

    pub fn total_count(&self) -> u64 {
        self.bins.iter().sum()
    }

    pub fn scale_min(&self) -> Option<f64> {
        self.axis.has_scale().then(|| self.axis.scale().min())
    }

    pub fn scale_max(&self) -> Option<f64> {
        self.axis.has_scale().then(|| self.axis.scale().max())
    }

    pub fn observed_min(&self) -> Option<f64> {
        (!self.is_empty()).then(|| self.axis.observed().min())
    }

    pub fn observed_max(&self) -> Option<f64> {
        (!self.is_empty()).then(|| self.axis.observed().max())
    }

    /// Counts one value.
    ///
    /// Missing values and non-finite floats are ignored.
    ///
    /// # Panics
    ///
    /// Panics if the value is neither missing nor numeric.
    pub fn add_element(&mut self, value: &Value) {
        if value.is_undefined() {
            return;
        }
        let Some(v) = value.as_f64() else {
            panic!(
                "histogram requires numeric values, got {}",
                value.value_type()
            );
        };
        if !v.is_finite() {
            return;
        }

        if self.axis.has_scale() {
            self.rescale(v, v);
            self.axis.observe(v);
        } else {
            self.axis = Axis::seeded(v, v, v, v);
        }
        let index = self.axis.bin_index(v, MAX_BINS);
        self.bins[index] += 1;
    }

    /// Doubles the scale range until it covers `[new_min, new_max]`.
    ///
    /// Each doubling costs O(MAX_BINS) and halves the resolution; the number of doublings
    /// grows with the logarithm of the range growth. On a histogram without a range the
    /// requested bounds become the scale. Non-finite bounds are ignored.
    pub fn rescale(&mut self, new_min: f64, new_max: f64) {
        if !new_min.is_finite() || !new_max.is_finite() {
            return;
        }
        if !self.axis.has_scale() {
            self.axis = Axis::with_scale(Extrema::from_bounds(new_min, new_max));
            return;
        }
        let mut doublings = 0;
        while !self.axis.covers(new_min, new_max) {
            collapse_lane(&mut self.bins, MAX_BINS, 1, 0);
            self.axis.widen_once();
            doublings += 1;
        }
        if doublings > 0 {
            trace!(
                "histogram rescaled {doublings} time(s) to [{}, {}]",
                self.axis.scale().min(),
                self.axis.scale().max()
            );
        }
    }

    /// Rebins the observed range into exactly `num_bins` buckets.
    ///
    /// Each bucket groups `ceil(effective / num_bins)` underlying bins, where `effective`
    /// is the number of bins between the observed minimum and maximum. The surplus of the
    /// rounded span is padded evenly with the empty bins on both sides of the observed
    /// range. An empty histogram yields no buckets.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidArgument`](crate::error::ErrorKind::InvalidArgument) if
    /// `num_bins` is zero or exceeds a quarter of the effective bins.
    pub fn get_bins(&self, num_bins: usize) -> Result<Vec<HistogramBin>, Error> {
        if num_bins < 1 {
            return Err(Error::invalid_argument("num_bins must be at least 1"));
        }
        if self.is_empty() {
            return Ok(Vec::new());
        }
        let observed = self.axis.observed();
        let first = self.axis.bin_index(observed.min(), MAX_BINS);
        let last = self.axis.bin_index(observed.max(), MAX_BINS);
        let effective = last - first + 1;
        if num_bins > effective / 4 {
            return Err(Error::invalid_argument(
                "num_bins must not exceed a quarter of the effective bins",
            )
            .with_context("num_bins", num_bins)
            .with_context("effective_bins", effective));
        }

        let per_bucket = effective.div_ceil(num_bins);
        let span = per_bucket * num_bins;
        let mut start = first as isize - ((span - effective) / 2) as isize;
        if span <= MAX_BINS {
            start = start.clamp(0, (MAX_BINS - span) as isize);
        }

        let width = self.axis.bin_width(MAX_BINS);
        let scale_min = self.axis.scale().min();
        let buckets = (0..num_bins)
            .map(|bucket| {
                let lo = start + (bucket * per_bucket) as isize;
                let hi = lo + per_bucket as isize;
                let count = (lo.max(0)..hi.min(MAX_BINS as isize))
                    .map(|i| self.bins[i as usize])
                    .sum();
                HistogramBin {
                    left: scale_min + lo as f64 * width,
                    right: scale_min + hi as f64 * width,
                    count,
                }
            })
            .collect();
        Ok(buckets)
    }

    /// Merges another histogram into this one.
    ///
    /// Both sides are widened to a common range before their bins are summed. When the two
    /// bin grids do not line up (the histograms were seeded independently), the other
    /// histogram's counts are redistributed by bin center.
    pub fn combine_with(&mut self, other: &Histogram) {
        if !other.axis.has_scale() {
            return;
        }
        if !self.axis.has_scale() {
            self.axis = other.axis;
            self.bins.copy_from_slice(&other.bins);
            return;
        }

        self.rescale(other.axis.scale().min(), other.axis.scale().max());
        let mut aligned = other.clone();
        aligned.rescale(self.axis.scale().min(), self.axis.scale().max());
        if aligned.axis.scale() == self.axis.scale() {
            for (mine, theirs) in self.bins.iter_mut().zip(&aligned.bins) {
                *mine += theirs;
            }
        } else {
            let width = other.axis.bin_width(MAX_BINS);
            let other_min = other.axis.scale().min();
            for (i, &count) in other.bins.iter().enumerate().filter(|(_, c)| **c > 0) {
                let center = other_min + (i as f64 + 0.5) * width;
                let index = self.axis.bin_index(center, MAX_BINS);
                self.bins[index] += count;
            }
        }
        self.axis.observe_all(other.axis.observed());
    }

    /// Serializes this histogram into a byte vector.
    pub fn serialize(&self) -> Vec<u8> {
        let mut flags = 0;
        if self.axis.has_scale() {
            flags |= FLAG_HAS_SCALE;
        }
        if !self.is_empty() {
            flags |= FLAG_HAS_OBSERVED;
        }
        let mut bytes = SketchBytes::with_capacity(PREAMBLE_BYTES + 32 + MAX_BINS * 8);
        bytes.write_u8(Family::HISTOGRAM.id);
        bytes.write_u8(SERIAL_VERSION);
        bytes.write_u8(flags);
        bytes.write_u8(self.value_type as u8);
        bytes.write_u16_le(MAX_BINS as u16);
        if flags & FLAG_HAS_SCALE != 0 {
            bytes.write_f64_le(self.axis.scale().min());
            bytes.write_f64_le(self.axis.scale().max());
        }
        if flags & FLAG_HAS_OBSERVED != 0 {
            bytes.write_f64_le(self.axis.observed().min());
            bytes.write_f64_le(self.axis.observed().max());
        }
        if flags & FLAG_HAS_SCALE != 0 {
            for &count in &self.bins {
                bytes.write_u64_le(count);
            }
        }
        bytes.into_bytes()
    }

    /// Deserializes a histogram from bytes.
    pub fn deserialize(bytes: &[u8]) -> Result<Self, Error> {
        let mut input = SketchSlice::new(bytes);
        let family = input
            .read_u8()
            .map_err(|e| Error::insufficient_data("family").set_source(e))?;
        Family::HISTOGRAM.validate_id(family)?;
        let version = input
            .read_u8()
            .map_err(|e| Error::insufficient_data("serial_version").set_source(e))?;
        if version != SERIAL_VERSION {
            return Err(Error::unsupported_serial_version(SERIAL_VERSION, version));
        }
        let flags = input
            .read_u8()
            .map_err(|e| Error::insufficient_data("flags").set_source(e))?;
        let type_id = input
            .read_u8()
            .map_err(|e| Error::insufficient_data("value_type").set_source(e))?;
        let value_type = ValueType::from_id(type_id)
            .filter(|t| t.is_numeric())
            .ok_or_else(|| {
                Error::deserial("histogram value type must be numeric")
                    .with_context("value_type", type_id)
            })?;
        let num_bins = input
            .read_u16_le()
            .map_err(|e| Error::insufficient_data("num_bins").set_source(e))?;
        if num_bins as usize != MAX_BINS {
            return Err(Error::deserial("unexpected number of bins")
                .with_context("expected", MAX_BINS)
                .with_context("actual", num_bins));
        }

        let mut histogram = Histogram::new(value_type);
        if flags & FLAG_HAS_SCALE == 0 {
            return Ok(histogram);
        }
        let mut read_pair = |what: &'static str| -> Result<Extrema<f64>, Error> {
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
        let scale = read_pair("scale")?;
        let observed = if flags & FLAG_HAS_OBSERVED != 0 {
            read_pair("observed")?
        } else {
            Extrema::new()
        };
        if scale.width() <= 0.0 || !scale.covers(&observed) {
            return Err(Error::deserial("observed range must lie inside a non-empty scale"));
        }
        if input.remaining() < MAX_BINS * 8 {
            return Err(Error::insufficient_data("bins"));
        }
        for count in histogram.bins.iter_mut() {
            *count = input
                .read_u64_le()
                .map_err(|e| Error::insufficient_data("bins").set_source(e))?;
        }
        histogram.axis = Axis::with_scale(scale);
        histogram.axis.observe_all(&observed);
        Ok(histogram)
    }
}
