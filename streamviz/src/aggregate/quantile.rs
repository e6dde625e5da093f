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

//! T-Digest quantile sketch split into an accumulating and a finalized phase.
//!
//! [`QuantileSketch`] buffers raw values and periodically compresses them into centroids.
//! Merging two digests is only well defined once both buffers have been compressed, so
//! merging lives on [`FinalizedQuantileSketch`], obtained through
//! [`Aggregator::partial_finalize`].

use crate::aggregate::Aggregator;
use crate::aggregate::PartialAggregate;
use crate::value::Value;

const BUFFER_MULTIPLIER: usize = 4;

/// Accumulating T-Digest.
///
/// # Examples
///
/// ```
/// # use streamviz::aggregate::{Aggregator, QuantileSketch};
/// let mut sketch = QuantileSketch::new(100);
/// for i in 0..=100 {
///     sketch.update(i as f64);
/// }
/// let sketch = sketch.partial_finalize();
/// let median = sketch.quantile(0.5).unwrap();
/// assert!((median - 50.0).abs() <= 2.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct QuantileSketch {
    digest: FinalizedQuantileSketch,
    buffer: Vec<f64>,
}

impl Default for QuantileSketch {
    fn default() -> Self {
        QuantileSketch::new(Self::DEFAULT_K)
    }
}

impl QuantileSketch {
    /// The default value of K if one is not specified.
    pub const DEFAULT_K: usize = 200;

    /// Creates a sketch whose compression is controlled by `k`.
    ///
    /// # Panics
    ///
    /// Panics if `k` is less than 10.
    pub fn new(k: usize) -> Self {
        assert!(k >= 10, "k must be at least 10");
        let digest = FinalizedQuantileSketch::new(k);
        let buffer = Vec::with_capacity(digest.centroids_capacity * BUFFER_MULTIPLIER);
        QuantileSketch { digest, buffer }
    }

    pub fn k(&self) -> usize {
        self.digest.k
    }

    /// Adds a value; non-finite values are ignored.
    pub fn update(&mut self, value: f64) {
        if !value.is_finite() {
            return;
        }
        if self.buffer.len() == self.digest.centroids_capacity * BUFFER_MULTIPLIER {
            self.compress();
        }
        self.buffer.push(value);
        self.digest.min = self.digest.min.min(value);
        self.digest.max = self.digest.max.max(value);
    }

    pub fn is_empty(&self) -> bool {
        self.digest.is_empty() && self.buffer.is_empty()
    }

    pub fn total_weight(&self) -> u64 {
        self.digest.centroids_weight + self.buffer.len() as u64
    }

    fn compress(&mut self) {
        if self.buffer.is_empty() {
            return;
        }
        let weight = self.buffer.len() as u64;
        let centroids = self
            .buffer
            .drain(..)
            .map(|mean| Centroid { mean, weight: 1 })
            .collect();
        self.digest.merge(centroids, weight);
    }
}

impl Aggregator for QuantileSketch {
    type Partial = FinalizedQuantileSketch;

    fn add_element(&mut self, value: &Value) {
        if let Some(v) = value.as_f64() {
            self.update(v);
        }
    }

    fn partial_finalize(mut self) -> FinalizedQuantileSketch {
        self.compress();
        self.digest
    }
}

/// Compressed T-Digest that can be merged and queried.
#[derive(Debug, Clone, PartialEq)]
pub struct FinalizedQuantileSketch {
    k: usize,
    min: f64,
    max: f64,

    centroids: Vec<Centroid>,
    centroids_weight: u64,
    centroids_capacity: usize,
}

impl FinalizedQuantileSketch {
    fn new(k: usize) -> Self {
        let fudge = if k < 30 { 30 } else { 10 };
        let centroids_capacity = (k * 2) + fudge;
        FinalizedQuantileSketch {
            k,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
            centroids: Vec::with_capacity(centroids_capacity),
            centroids_weight: 0,
            centroids_capacity,
        }
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn is_empty(&self) -> bool {
        self.centroids.is_empty()
    }

    pub fn total_weight(&self) -> u64 {
        self.centroids_weight
    }

    pub fn min_value(&self) -> Option<f64> {
        (!self.is_empty()).then_some(self.min)
    }

    pub fn max_value(&self) -> Option<f64> {
        (!self.is_empty()).then_some(self.max)
    }

    /// Returns the approximate value at normalized `rank`, or `None` if the digest is empty.
    ///
    /// # Panics
    ///
    /// Panics if `rank` is not in `[0.0, 1.0]`.
    pub fn quantile(&self, rank: f64) -> Option<f64> {
        assert!((0.0..=1.0).contains(&rank), "rank must be in [0.0, 1.0]");
        let (first, last) = (*self.centroids.first()?, *self.centroids.last()?);
        if self.centroids.len() == 1 {
            return Some(first.mean);
        }

        let total = self.centroids_weight as f64;
        let target = rank * total;
        if target < 1.0 {
            return Some(self.min);
        }
        if target > total - 1.0 {
            return Some(self.max);
        }

        // the outer halves of heavy edge centroids stretch towards min and max
        let first_half = first.weight as f64 / 2.0;
        if first.weight > 1 && target < first_half {
            let fraction = (target - 1.0) / (first_half - 1.0);
            return Some(self.min + fraction * (first.mean - self.min));
        }
        let last_half = last.weight as f64 / 2.0;
        if last.weight > 1 && total - target <= last_half {
            let fraction = (total - target - 1.0) / (last_half - 1.0);
            return Some(self.max - fraction * (self.max - last.mean));
        }

        let mut cumulative = first_half;
        for pair in self.centroids.windows(2) {
            let (left, right) = (pair[0], pair[1]);
            let gap = (left.weight + right.weight) as f64 / 2.0;
            if cumulative + gap <= target {
                cumulative += gap;
                continue;
            }
            // singletons own half a unit of weight around their mean
            let left_share = match left.weight {
                1 if target - cumulative < 0.5 => return Some(left.mean),
                1 => 0.5,
                _ => 0.0,
            };
            let right_share = match right.weight {
                1 if cumulative + gap - target < 0.5 => return Some(right.mean),
                1 => 0.5,
                _ => 0.0,
            };
            let w1 = target - cumulative - left_share;
            let w2 = cumulative + gap - target - right_share;
            return Some(weighted_average(left.mean, w1, right.mean, w2));
        }

        let w1 = target - (total - last_half);
        Some(weighted_average(last.mean, w1, self.max, last_half - w1))
    }

    /// Folds `incoming` centroids, which carry `weight` samples, into the digest.
    ///
    /// Means must not be NaN.
    fn merge(&mut self, mut incoming: Vec<Centroid>, weight: u64) {
        incoming.append(&mut self.centroids);
        incoming.sort_by(|a, b| a.mean.total_cmp(&b.mean));
        self.centroids_weight += weight;

        let total = self.centroids_weight as f64;
        let normalizer = scale_function::normalizer((2 * self.k) as f64, total);
        let last = incoming.len().saturating_sub(1);
        let mut merged: Vec<Centroid> = Vec::with_capacity(self.centroids_capacity);
        let mut cumulative = 0.0;
        for (i, centroid) in incoming.into_iter().enumerate() {
            // the first and last centroids are never absorbed
            let absorbed = i != 1 && i != last;
            match merged.last_mut() {
                Some(current) if absorbed => {
                    let proposed = (current.weight + centroid.weight) as f64;
                    let limit = scale_function::max(cumulative / total, normalizer)
                        .min(scale_function::max((cumulative + proposed) / total, normalizer));
                    if proposed <= total * limit {
                        current.add(centroid);
                    } else {
                        cumulative += current.weight as f64;
                        merged.push(centroid);
                    }
                }
                Some(current) => {
                    cumulative += current.weight as f64;
                    merged.push(centroid);
                }
                None => merged.push(centroid),
            }
        }

        if let (Some(first), Some(last)) = (merged.first(), merged.last()) {
            self.min = self.min.min(first.mean);
            self.max = self.max.max(last.mean);
        }
        self.centroids = merged;
    }
}

impl PartialAggregate for FinalizedQuantileSketch {
    fn combine(&mut self, other: &Self) {
        if other.is_empty() {
            return;
        }
        self.merge(other.centroids.clone(), other.centroids_weight);
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }

    /// Emits the five-number summary used by box-and-whiskers plots.
    fn emit(&self) -> Value {
        let Some((min, max)) = self.min_value().zip(self.max_value()) else {
            return Value::Undefined;
        };
        let quantile = |rank: f64| Value::from(self.quantile(rank).unwrap_or(f64::NAN));
        Value::dict([
            ("count", Value::from(self.centroids_weight)),
            ("min", Value::from(min)),
            ("lower_quartile", quantile(0.25)),
            ("median", quantile(0.5)),
            ("upper_quartile", quantile(0.75)),
            ("max", Value::from(max)),
        ])
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Centroid {
    mean: f64,
    weight: u64,
}

impl Centroid {
    fn add(&mut self, other: Centroid) {
        let weight = self.weight + other.weight;
        if weight > 0 {
            self.mean += other.weight as f64 * (other.mean - self.mean) / weight as f64;
        }
        self.weight = weight;
    }
}

/// Cluster size limits proportional to `q * (1 - q)`, normalized so the number of
/// clusters stays bounded.
mod scale_function {
    pub(super) fn max(q: f64, normalizer: f64) -> f64 {
        q * (1. - q) / normalizer
    }

    pub(super) fn normalizer(compression: f64, n: f64) -> f64 {
        compression / (4. * (n / compression).ln() + 24.)
    }
}

const fn weighted_average(x1: f64, w1: f64, x2: f64, w2: f64) -> f64 {
    (x1 * w1 + x2 * w2) / (w1 + w2)
}
