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

//! Per-column statistics for the columnwise summary view.

use crate::aggregate::Aggregator;
use crate::aggregate::CountDistinct;
use crate::aggregate::FinalizedQuantileSketch;
use crate::aggregate::Max;
use crate::aggregate::Min;
use crate::aggregate::PartialAggregate;
use crate::aggregate::QuantileSketch;
use crate::aggregate::Variance;
use crate::value::Value;

/// Accumulating summary of one column.
///
/// Tracks the number of present and missing cells, an approximate distinct count, the
/// smallest and largest value and, for numeric cells, the moments and a quantile sketch.
#[derive(Debug, Clone)]
pub struct ColumnSummary {
    count: u64,
    missing: u64,
    distinct: CountDistinct,
    min: Min,
    max: Max,
    moments: Variance,
    quantiles: QuantileSketch,
}

impl Default for ColumnSummary {
    fn default() -> Self {
        Self::new()
    }
}

impl ColumnSummary {
    pub fn new() -> Self {
        Self {
            count: 0,
            missing: 0,
            distinct: CountDistinct::default(),
            min: Min::new(),
            max: Max::new(),
            moments: Variance::stdv(),
            quantiles: QuantileSketch::default(),
        }
    }
}

impl Aggregator for ColumnSummary {
    type Partial = FinalizedColumnSummary;

    /// Counts missing values instead of ignoring them.
    fn add_element(&mut self, value: &Value) {
        if value.is_undefined() {
            self.missing += 1;
            return;
        }
        self.count += 1;
        self.distinct.add_element(value);
        self.min.add_element(value);
        self.max.add_element(value);
        if value.value_type().is_numeric() {
            self.moments.add_element(value);
            self.quantiles.add_element(value);
        }
    }

    fn partial_finalize(self) -> FinalizedColumnSummary {
        FinalizedColumnSummary {
            count: self.count,
            missing: self.missing,
            distinct: self.distinct,
            min: self.min,
            max: self.max,
            moments: self.moments,
            quantiles: self.quantiles.partial_finalize(),
        }
    }
}

/// Mergeable summary of one column.
#[derive(Debug, Clone, PartialEq)]
pub struct FinalizedColumnSummary {
    count: u64,
    missing: u64,
    distinct: CountDistinct,
    min: Min,
    max: Max,
    moments: Variance,
    quantiles: FinalizedQuantileSketch,
}

impl FinalizedColumnSummary {
    /// Returns the number of present cells.
    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn missing(&self) -> u64 {
        self.missing
    }

    pub fn distinct_estimate(&self) -> f64 {
        self.distinct.estimate()
    }

    pub fn mean(&self) -> Option<f64> {
        self.moments.mean()
    }

    pub fn stdev(&self) -> Option<f64> {
        self.moments.variance().map(f64::sqrt)
    }

    pub fn median(&self) -> Option<f64> {
        self.quantiles.quantile(0.5)
    }
}

impl PartialAggregate for FinalizedColumnSummary {
    fn combine(&mut self, other: &Self) {
        self.count += other.count;
        self.missing += other.missing;
        self.distinct.combine(&other.distinct);
        self.min.combine(&other.min);
        self.max.combine(&other.max);
        self.moments.combine(&other.moments);
        self.quantiles.combine(&other.quantiles);
    }

    /// Emits a dict with `count`, `missing`, `distinct`, `min` and `max`, plus `mean`,
    /// `stdev` and `median` when the column held numbers.
    fn emit(&self) -> Value {
        let mut entries = vec![
            ("count", Value::from(self.count)),
            ("missing", Value::from(self.missing)),
            ("distinct", self.distinct.emit()),
            ("min", self.min.emit()),
            ("max", self.max.emit()),
        ];
        if self.moments.n() > 0 {
            entries.push(("mean", Value::from(self.mean())));
            entries.push(("stdev", Value::from(self.stdev())));
            entries.push(("median", Value::from(self.median())));
        }
        Value::dict(entries)
    }
}
