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

use crate::heatmap::Heatmap;
use crate::histogram::Histogram;
use crate::summary::FinalizedColumnSummary;
use crate::value::Value;

/// Snapshot of a running transformation, handed to the renderer after every batch.
#[derive(Debug, Clone, PartialEq)]
pub enum TransformationOutput {
    Histogram(Histogram),
    Heatmap(Heatmap),
    Groupby(GroupedRows),
    Summary(Vec<FinalizedColumnSummary>),
}

impl TransformationOutput {
    pub fn into_histogram(self) -> Option<Histogram> {
        match self {
            TransformationOutput::Histogram(histogram) => Some(histogram),
            _ => None,
        }
    }

    pub fn into_heatmap(self) -> Option<Heatmap> {
        match self {
            TransformationOutput::Heatmap(heatmap) => Some(heatmap),
            _ => None,
        }
    }

    pub fn into_grouped(self) -> Option<GroupedRows> {
        match self {
            TransformationOutput::Groupby(rows) => Some(rows),
            _ => None,
        }
    }

    pub fn into_summary(self) -> Option<Vec<FinalizedColumnSummary>> {
        match self {
            TransformationOutput::Summary(columns) => Some(columns),
            _ => None,
        }
    }
}

/// One category of a grouped snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupedRow {
    key: Vec<Value>,
    value: Value,
}

impl GroupedRow {
    pub(crate) fn new(key: Vec<Value>, value: Value) -> Self {
        Self { key, value }
    }

    /// Returns the key columns: one for a plain category, two for a pair.
    pub fn key(&self) -> &[Value] {
        &self.key
    }

    pub fn value(&self) -> &Value {
        &self.value
    }
}

/// Categories of a groupby snapshot in key order, plus the number of dropped points.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupedRows {
    rows: Vec<GroupedRow>,
    omitted_count: u64,
}

impl GroupedRows {
    pub(crate) fn new(rows: Vec<GroupedRow>, omitted_count: u64) -> Self {
        Self {
            rows,
            omitted_count,
        }
    }

    pub fn rows(&self) -> &[GroupedRow] {
        &self.rows
    }

    pub fn omitted_count(&self) -> u64 {
        self.omitted_count
    }
}
