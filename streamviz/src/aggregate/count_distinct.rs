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

//! HyperLogLog count-distinct estimator with 8-bit registers.

use std::hash::Hash;

use crate::aggregate::Aggregator;
use crate::aggregate::PartialAggregate;
use crate::value::Value;

const DEFAULT_SEED: u32 = 9001;

/// Approximate number of distinct non-missing values.
///
/// # Examples
///
/// ```
/// # use streamviz::aggregate::{Aggregator, CountDistinct};
/// # use streamviz::value::Value;
/// let mut sketch = CountDistinct::default();
/// for i in 0..100 {
///     sketch.add_element(&Value::from(i % 10));
/// }
/// let estimate = sketch.estimate();
/// assert!((9.0..=11.0).contains(&estimate));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountDistinct {
    lg_k: u8,
    registers: Vec<u8>,
}

impl Default for CountDistinct {
    fn default() -> Self {
        CountDistinct::new(Self::DEFAULT_LG_K)
    }
}

impl CountDistinct {
    /// Default log2 of the number of registers.
    pub const DEFAULT_LG_K: u8 = 12;
    /// Minimum log2 of the number of registers.
    pub const MIN_LG_K: u8 = 4;
    /// Maximum log2 of the number of registers.
    pub const MAX_LG_K: u8 = 21;

    /// Creates an estimator with `2^lg_k` registers.
    ///
    /// # Panics
    ///
    /// Panics if `lg_k` is not in [MIN_LG_K, MAX_LG_K].
    pub fn new(lg_k: u8) -> Self {
        assert!(
            (Self::MIN_LG_K..=Self::MAX_LG_K).contains(&lg_k),
            "lg_k must be in [{}, {}], got {lg_k}",
            Self::MIN_LG_K,
            Self::MAX_LG_K
        );
        CountDistinct {
            lg_k,
            registers: vec![0; 1 << lg_k],
        }
    }

    pub fn lg_k(&self) -> u8 {
        self.lg_k
    }

    pub fn update<H: Hash>(&mut self, item: H) {
        let mut hasher = mur3::Hasher128::with_seed(DEFAULT_SEED);
        item.hash(&mut hasher);
        let (lo, hi) = hasher.finish128();

        let slot = (lo as usize) & (self.registers.len() - 1);
        let rho = (hi.leading_zeros().min(62) + 1) as u8;
        if rho > self.registers[slot] {
            self.registers[slot] = rho;
        }
    }

    /// Returns the cardinality estimate.
    pub fn estimate(&self) -> f64 {
        let m = self.registers.len() as f64;
        let mut harmonic = 0.0;
        let mut zeros = 0usize;
        for &register in &self.registers {
            harmonic += (-(register as f64)).exp2();
            if register == 0 {
                zeros += 1;
            }
        }
        let raw = alpha(self.registers.len()) * m * m / harmonic;
        if raw <= 2.5 * m && zeros > 0 {
            // linear counting for the small range
            m * (m / zeros as f64).ln()
        } else {
            raw
        }
    }
}

fn alpha(m: usize) -> f64 {
    match m {
        16 => 0.673,
        32 => 0.697,
        64 => 0.709,
        _ => 0.7213 / (1.0 + 1.079 / m as f64),
    }
}

impl Aggregator for CountDistinct {
    type Partial = Self;

    fn add_element(&mut self, value: &Value) {
        if !value.is_undefined() {
            self.update(value);
        }
    }

    fn partial_finalize(self) -> Self {
        self
    }
}

impl PartialAggregate for CountDistinct {
    /// # Panics
    ///
    /// Panics if the register counts differ.
    fn combine(&mut self, other: &Self) {
        assert_eq!(
            self.lg_k, other.lg_k,
            "incompatible lg_k values: {} and {}",
            self.lg_k, other.lg_k
        );
        for (mine, theirs) in self.registers.iter_mut().zip(&other.registers) {
            *mine = (*mine).max(*theirs);
        }
    }

    fn emit(&self) -> Value {
        Value::Integer(self.estimate().round() as i64)
    }
}
