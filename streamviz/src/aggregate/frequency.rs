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

use std::collections::HashMap;

use crate::aggregate::Aggregator;
use crate::aggregate::PartialAggregate;
use crate::value::Value;

/// Exact count per distinct non-missing value.
///
/// Emits a dict ordered by descending count, ties broken by value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrequencyCount {
    counts: HashMap<Value, u64>,
}

impl FrequencyCount {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, value: &Value) -> u64 {
        self.counts.get(value).copied().unwrap_or(0)
    }

    /// Returns `(value, count)` pairs, most frequent first.
    pub fn sorted_counts(&self) -> Vec<(Value, u64)> {
        let mut rows: Vec<(Value, u64)> =
            self.counts.iter().map(|(k, v)| (k.clone(), *v)).collect();
        rows.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        rows
    }
}

impl Aggregator for FrequencyCount {
    type Partial = Self;

    fn add_element(&mut self, value: &Value) {
        if !value.is_undefined() {
            *self.counts.entry(value.clone()).or_insert(0) += 1;
        }
    }

    fn partial_finalize(self) -> Self {
        self
    }
}

impl PartialAggregate for FrequencyCount {
    fn combine(&mut self, other: &Self) {
        for (value, count) in &other.counts {
            *self.counts.entry(value.clone()).or_insert(0) += count;
        }
    }

    fn emit(&self) -> Value {
        Value::dict(
            self.sorted_counts()
                .into_iter()
                .map(|(value, count)| (value, Value::from(count))),
        )
    }
}
