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

//! Running `[min, max]` over a scalar domain.

/// Scalar types with sentinels for an empty [`Extrema`].
pub trait ExtremaValue: Copy + PartialOrd {
    /// Initial `min`; every real value compares below it.
    const MIN_SENTINEL: Self;
    /// Initial `max`; every real value compares above it.
    const MAX_SENTINEL: Self;
}

impl ExtremaValue for f64 {
    const MIN_SENTINEL: Self = f64::INFINITY;
    const MAX_SENTINEL: Self = f64::NEG_INFINITY;
}

impl ExtremaValue for i64 {
    const MIN_SENTINEL: Self = i64::MAX;
    const MAX_SENTINEL: Self = i64::MIN;
}

/// Running minimum and maximum.
///
/// Starts empty (`min` at the upper sentinel, `max` at the lower one); after the first
/// update `min <= max` holds.
///
/// # Examples
///
/// ```
/// # use streamviz::extrema::Extrema;
/// let mut extrema = Extrema::<f64>::new();
/// assert!(extrema.is_empty());
/// extrema.update(3.0);
/// extrema.update(-1.0);
/// assert_eq!((extrema.min(), extrema.max()), (-1.0, 3.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extrema<T: ExtremaValue> {
    min: T,
    max: T,
}

impl<T: ExtremaValue> Default for Extrema<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ExtremaValue> Extrema<T> {
    pub fn new() -> Self {
        Self {
            min: T::MIN_SENTINEL,
            max: T::MAX_SENTINEL,
        }
    }

    /// Creates extrema spanning both values, in either order.
    pub fn from_bounds(a: T, b: T) -> Self {
        let mut extrema = Self::new();
        extrema.update(a);
        extrema.update(b);
        extrema
    }

    pub fn update(&mut self, value: T) {
        if value < self.min {
            self.min = value;
        }
        if value > self.max {
            self.max = value;
        }
    }

    /// Widens to also cover `other`; an empty `other` changes nothing.
    pub fn update_with(&mut self, other: &Extrema<T>) {
        if other.is_empty() {
            return;
        }
        self.update(other.min);
        self.update(other.max);
    }

    pub fn is_empty(&self) -> bool {
        self.min > self.max
    }

    pub fn min(&self) -> T {
        self.min
    }

    pub fn max(&self) -> T {
        self.max
    }

    pub fn contains(&self, value: T) -> bool {
        self.min <= value && value <= self.max
    }

    /// Returns true if `other` lies within these extrema.
    pub fn covers(&self, other: &Extrema<T>) -> bool {
        other.is_empty() || (self.contains(other.min) && self.contains(other.max))
    }
}

impl Extrema<f64> {
    pub fn width(&self) -> f64 {
        self.max - self.min
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_with_empty_other() {
        let mut extrema = Extrema::from_bounds(5i64, 1);
        extrema.update_with(&Extrema::new());
        assert_eq!((extrema.min(), extrema.max()), (1, 5));
        let mut empty = Extrema::<i64>::new();
        empty.update_with(&extrema);
        assert_eq!(empty, extrema);
    }
}
