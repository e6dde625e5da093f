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

//! Exact aggregators: count, sum, average, variance, min and max.
//!
//! Each of these is its own partial form.

use crate::aggregate::Aggregator;
use crate::aggregate::PartialAggregate;
use crate::value::Value;

/// Counts non-missing values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Count {
    count: u64,
}

impl Count {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> u64 {
        self.count
    }
}

impl Aggregator for Count {
    type Partial = Self;

    fn add_element(&mut self, value: &Value) {
        if !value.is_undefined() {
            self.count += 1;
        }
    }

    fn partial_finalize(self) -> Self {
        self
    }
}

impl PartialAggregate for Count {
    fn combine(&mut self, other: &Self) {
        self.count += other.count;
    }

    fn emit(&self) -> Value {
        Value::from(self.count)
    }
}

/// Sums numeric values.
///
/// Integer input sums exactly (wrapping on overflow) and emits an integer; any float
/// input turns the result into a float.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sum {
    int_sum: i64,
    float_sum: f64,
    is_float: bool,
    has_value: bool,
}

impl Sum {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Aggregator for Sum {
    type Partial = Self;

    fn add_element(&mut self, value: &Value) {
        match value {
            Value::Integer(v) => {
                self.int_sum = self.int_sum.wrapping_add(*v);
                self.has_value = true;
            }
            Value::Float(v) if v.is_finite() => {
                self.float_sum += v;
                self.is_float = true;
                self.has_value = true;
            }
            _ => {}
        }
    }

    fn partial_finalize(self) -> Self {
        self
    }
}

impl PartialAggregate for Sum {
    fn combine(&mut self, other: &Self) {
        self.int_sum = self.int_sum.wrapping_add(other.int_sum);
        self.float_sum += other.float_sum;
        self.is_float |= other.is_float;
        self.has_value |= other.has_value;
    }

    fn emit(&self) -> Value {
        if !self.has_value {
            Value::Undefined
        } else if self.is_float {
            Value::Float(self.float_sum + self.int_sum as f64)
        } else {
            Value::Integer(self.int_sum)
        }
    }
}

/// Arithmetic mean of numeric values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Average {
    sum: f64,
    count: u64,
}

impl Average {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Aggregator for Average {
    type Partial = Self;

    fn add_element(&mut self, value: &Value) {
        if let Some(v) = value.as_f64().filter(|v| v.is_finite()) {
            self.sum += v;
            self.count += 1;
        }
    }

    fn partial_finalize(self) -> Self {
        self
    }
}

impl PartialAggregate for Average {
    fn combine(&mut self, other: &Self) {
        self.sum += other.sum;
        self.count += other.count;
    }

    fn emit(&self) -> Value {
        if self.count == 0 {
            Value::Undefined
        } else {
            Value::Float(self.sum / self.count as f64)
        }
    }
}

/// Population variance, or standard deviation, of numeric values.
///
/// Uses Welford's update and the pairwise combination of Chan et al. so that merging
/// partial results matches a single pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Variance {
    n: u64,
    mean: f64,
    m2: f64,
    stdv: bool,
}

impl Variance {
    /// Creates an aggregator emitting the variance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an aggregator emitting the standard deviation.
    pub fn stdv() -> Self {
        Self {
            stdv: true,
            ..Self::default()
        }
    }

    pub fn n(&self) -> u64 {
        self.n
    }

    pub fn mean(&self) -> Option<f64> {
        (self.n > 0).then_some(self.mean)
    }

    pub fn variance(&self) -> Option<f64> {
        (self.n > 0).then(|| self.m2 / self.n as f64)
    }
}

impl Aggregator for Variance {
    type Partial = Self;

    fn add_element(&mut self, value: &Value) {
        if let Some(v) = value.as_f64().filter(|v| v.is_finite()) {
            self.n += 1;
            let delta = v - self.mean;
            self.mean += delta / self.n as f64;
            self.m2 += delta * (v - self.mean);
        }
    }

    fn partial_finalize(self) -> Self {
        self
    }
}

impl PartialAggregate for Variance {
    fn combine(&mut self, other: &Self) {
        if other.n == 0 {
            return;
        }
        if self.n == 0 {
            self.n = other.n;
            self.mean = other.mean;
            self.m2 = other.m2;
            return;
        }
        let n = self.n + other.n;
        let delta = other.mean - self.mean;
        let (na, nb) = (self.n as f64, other.n as f64);
        self.mean += delta * nb / n as f64;
        self.m2 += other.m2 + delta * delta * na * nb / n as f64;
        self.n = n;
    }

    fn emit(&self) -> Value {
        match self.variance() {
            Some(var) if self.stdv => Value::Float(var.sqrt()),
            Some(var) => Value::Float(var),
            None => Value::Undefined,
        }
    }
}

/// Smallest non-missing value under [`Value`] ordering; NaN is skipped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Min {
    min: Option<Value>,
}

impl Min {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Aggregator for Min {
    type Partial = Self;

    fn add_element(&mut self, value: &Value) {
        if is_comparable(value) && self.min.as_ref().is_none_or(|min| value < min) {
            self.min = Some(value.clone());
        }
    }

    fn partial_finalize(self) -> Self {
        self
    }
}

impl PartialAggregate for Min {
    fn combine(&mut self, other: &Self) {
        if let Some(value) = &other.min {
            self.add_element(value);
        }
    }

    fn emit(&self) -> Value {
        self.min.clone().unwrap_or_default()
    }
}

/// Largest non-missing value under [`Value`] ordering; NaN is skipped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Max {
    max: Option<Value>,
}

impl Max {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Aggregator for Max {
    type Partial = Self;

    fn add_element(&mut self, value: &Value) {
        if is_comparable(value) && self.max.as_ref().is_none_or(|max| value > max) {
            self.max = Some(value.clone());
        }
    }

    fn partial_finalize(self) -> Self {
        self
    }
}

impl PartialAggregate for Max {
    fn combine(&mut self, other: &Self) {
        if let Some(value) = &other.max {
            self.add_element(value);
        }
    }

    fn emit(&self) -> Value {
        self.max.clone().unwrap_or_default()
    }
}

fn is_comparable(value: &Value) -> bool {
    match value {
        Value::Undefined => false,
        Value::Float(v) => !v.is_nan(),
        _ => true,
    }
}
