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

//! The aggregates behind every visualization.

use super::engine::Aggregate;
use super::output::GroupedRow;
use super::output::GroupedRows;
use super::output::TransformationOutput;
use crate::aggregate::Aggregator;
use crate::aggregate::Count;
use crate::aggregate::PartialAggregate;
use crate::aggregate::QuantileSketch;
use crate::groupby::CATEGORY_LIMIT;
use crate::groupby::GroupKey;
use crate::groupby::Groupby;
use crate::groupby::GroupbyResult;
use crate::heatmap::Heatmap;
use crate::histogram::Histogram;
use crate::summary::ColumnSummary;
use crate::summary::FinalizedColumnSummary;
use crate::value::Value;
use crate::value::ValueType;

/// Streams a numeric column into a [`Histogram`].
///
/// Worker locals inherit the running scale range so that, after the first batch, partial
/// histograms merge exactly.
#[derive(Debug, Clone)]
pub struct HistogramTransform {
    histogram: Histogram,
}

impl HistogramTransform {
    /// # Panics
    ///
    /// Panics if `value_type` is not numeric.
    pub fn new(value_type: ValueType) -> Self {
        Self {
            histogram: Histogram::new(value_type),
        }
    }

    /// Starts from a known range, e.g. the column's extrema.
    ///
    /// # Panics
    ///
    /// Panics if `value_type` is not numeric.
    pub fn with_range(value_type: ValueType, min: f64, max: f64) -> Self {
        Self {
            histogram: Histogram::with_range(value_type, min, max),
        }
    }

    pub fn histogram(&self) -> &Histogram {
        &self.histogram
    }
}

impl Aggregate for HistogramTransform {
    type Item = Value;
    type Local = Histogram;

    fn split_input(&self, n: usize) -> Vec<Histogram> {
        (0..n).map(|_| self.histogram.new_instance()).collect()
    }

    fn accumulate(local: &mut Histogram, item: Value) {
        local.add_element(&item);
    }

    fn merge_results(&mut self, locals: Vec<Histogram>) {
        for local in &locals {
            self.histogram.combine_with(local);
        }
    }

    fn output(&self) -> TransformationOutput {
        TransformationOutput::Histogram(self.histogram.clone())
    }
}

/// Streams a pair of numeric columns into a [`Heatmap`].
#[derive(Debug, Clone, Default)]
pub struct HeatmapTransform {
    heatmap: Heatmap,
}

impl HeatmapTransform {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from known ranges on both axes.
    pub fn with_range(x_min: f64, x_max: f64, y_min: f64, y_max: f64) -> Self {
        Self {
            heatmap: Heatmap::with_range(x_min, x_max, y_min, y_max),
        }
    }

    pub fn heatmap(&self) -> &Heatmap {
        &self.heatmap
    }
}

impl Aggregate for HeatmapTransform {
    type Item = (Value, Value);
    type Local = Heatmap;

    fn split_input(&self, n: usize) -> Vec<Heatmap> {
        (0..n).map(|_| self.heatmap.new_instance()).collect()
    }

    fn accumulate(local: &mut Heatmap, (x, y): (Value, Value)) {
        local.add_element(&x, &y);
    }

    fn merge_results(&mut self, locals: Vec<Heatmap>) {
        for local in &locals {
            self.heatmap.combine_with(local);
        }
    }

    fn output(&self) -> TransformationOutput {
        TransformationOutput::Heatmap(self.heatmap.clone())
    }
}

/// Running groupby shared by the grouped transforms.
#[derive(Debug, Clone)]
struct GroupedState<K, A: Aggregator> {
    prototype: Groupby<K, A>,
    result: GroupbyResult<K, A::Partial>,
}

impl<K: GroupKey, A: Aggregator> GroupedState<K, A> {
    fn new(prototype: Groupby<K, A>) -> Self {
        let result = GroupbyResult::with_limit(prototype.limit());
        Self { prototype, result }
    }

    fn split_input(&self, n: usize) -> Vec<Groupby<K, A>> {
        (0..n).map(|_| self.prototype.new_instance()).collect()
    }

    fn merge_results(&mut self, locals: Vec<Groupby<K, A>>) {
        for local in locals {
            self.result.combine(&local.partial_finalize());
        }
    }

    fn output(&self) -> TransformationOutput {
        let rows = self
            .result
            .get_grouped()
            .into_iter()
            .map(|(key, value)| GroupedRow::new(key.key_values(), value))
            .collect();
        TransformationOutput::Groupby(GroupedRows::new(rows, self.result.omitted_count()))
    }
}

/// Summarizes a value column per category of a key column.
///
/// Items are `(category, value)` rows; every category gets a clone of the prototype
/// aggregator.
#[derive(Debug, Clone)]
pub struct GroupbySummaryTransform<A: Aggregator> {
    state: GroupedState<Value, A>,
}

/// Quartiles per category, for box-and-whiskers plots.
pub type BoxPlotTransform = GroupbySummaryTransform<QuantileSketch>;

impl<A: Aggregator> GroupbySummaryTransform<A> {
    pub fn new(prototype: A) -> Self {
        Self::with_limit(prototype, CATEGORY_LIMIT)
    }

    /// # Panics
    ///
    /// Panics if `limit` is zero or larger than [`CATEGORY_LIMIT`].
    pub fn with_limit(prototype: A, limit: usize) -> Self {
        Self {
            state: GroupedState::new(Groupby::with_limit(prototype, limit)),
        }
    }

    pub fn result(&self) -> &GroupbyResult<Value, A::Partial> {
        &self.state.result
    }
}

impl GroupbySummaryTransform<QuantileSketch> {
    pub fn box_plot() -> Self {
        Self::new(QuantileSketch::default())
    }
}

impl<A: Aggregator> Aggregate for GroupbySummaryTransform<A> {
    type Item = (Value, Value);
    type Local = Groupby<Value, A>;

    fn split_input(&self, n: usize) -> Vec<Self::Local> {
        self.state.split_input(n)
    }

    fn accumulate(local: &mut Self::Local, (category, value): (Value, Value)) {
        local.update(category, &value);
    }

    fn merge_results(&mut self, locals: Vec<Self::Local>) {
        self.state.merge_results(locals);
    }

    fn output(&self) -> TransformationOutput {
        self.state.output()
    }
}

/// Counts rows per `(x, y)` category pair.
///
/// Rows with a missing coordinate are skipped.
#[derive(Debug, Clone)]
pub struct CategoricalHeatmapTransform {
    state: GroupedState<(Value, Value), Count>,
}

impl Default for CategoricalHeatmapTransform {
    fn default() -> Self {
        Self::new()
    }
}

impl CategoricalHeatmapTransform {
    pub fn new() -> Self {
        Self::with_limit(CATEGORY_LIMIT)
    }

    /// # Panics
    ///
    /// Panics if `limit` is zero or larger than [`CATEGORY_LIMIT`].
    pub fn with_limit(limit: usize) -> Self {
        Self {
            state: GroupedState::new(Groupby::with_limit(Count::new(), limit)),
        }
    }

    pub fn result(&self) -> &GroupbyResult<(Value, Value), Count> {
        &self.state.result
    }
}

impl Aggregate for CategoricalHeatmapTransform {
    type Item = (Value, Value);
    type Local = Groupby<(Value, Value), Count>;

    fn split_input(&self, n: usize) -> Vec<Self::Local> {
        self.state.split_input(n)
    }

    fn accumulate(local: &mut Self::Local, (x, y): (Value, Value)) {
        if !x.is_undefined() && !y.is_undefined() {
            local.update((x, y), &Value::Integer(1));
        }
    }

    fn merge_results(&mut self, locals: Vec<Self::Local>) {
        self.state.merge_results(locals);
    }

    fn output(&self) -> TransformationOutput {
        self.state.output()
    }
}

/// Counts rows per distinct value of a column.
///
/// Missing values are skipped.
#[derive(Debug, Clone)]
pub struct ItemFrequencyTransform {
    state: GroupedState<Value, Count>,
}

impl Default for ItemFrequencyTransform {
    fn default() -> Self {
        Self::new()
    }
}

impl ItemFrequencyTransform {
    pub fn new() -> Self {
        Self::with_limit(CATEGORY_LIMIT)
    }

    /// # Panics
    ///
    /// Panics if `limit` is zero or larger than [`CATEGORY_LIMIT`].
    pub fn with_limit(limit: usize) -> Self {
        Self {
            state: GroupedState::new(Groupby::with_limit(Count::new(), limit)),
        }
    }

    pub fn result(&self) -> &GroupbyResult<Value, Count> {
        &self.state.result
    }
}

impl Aggregate for ItemFrequencyTransform {
    type Item = Value;
    type Local = Groupby<Value, Count>;

    fn split_input(&self, n: usize) -> Vec<Self::Local> {
        self.state.split_input(n)
    }

    fn accumulate(local: &mut Self::Local, item: Value) {
        if !item.is_undefined() {
            local.update(item, &Value::Integer(1));
        }
    }

    fn merge_results(&mut self, locals: Vec<Self::Local>) {
        self.state.merge_results(locals);
    }

    fn output(&self) -> TransformationOutput {
        self.state.output()
    }
}

/// Summarizes every column of a table.
#[derive(Debug, Clone)]
pub struct ColumnSummaryTransform {
    summaries: Vec<FinalizedColumnSummary>,
}

impl ColumnSummaryTransform {
    pub fn new(num_columns: usize) -> Self {
        Self {
            summaries: (0..num_columns)
                .map(|_| ColumnSummary::new().partial_finalize())
                .collect(),
        }
    }

    pub fn summaries(&self) -> &[FinalizedColumnSummary] {
        &self.summaries
    }
}

impl Aggregate for ColumnSummaryTransform {
    type Item = Vec<Value>;
    type Local = Vec<ColumnSummary>;

    fn split_input(&self, n: usize) -> Vec<Self::Local> {
        (0..n)
            .map(|_| vec![ColumnSummary::new(); self.summaries.len()])
            .collect()
    }

    /// # Panics
    ///
    /// Panics if the row has a different number of cells than there are summaries.
    fn accumulate(local: &mut Self::Local, row: Vec<Value>) {
        assert_eq!(row.len(), local.len(), "row width does not match the summary");
        for (summary, value) in local.iter_mut().zip(&row) {
            summary.add_element(value);
        }
    }

    fn merge_results(&mut self, locals: Vec<Self::Local>) {
        for local in locals {
            for (summary, partial) in self.summaries.iter_mut().zip(local) {
                summary.combine(&partial.partial_finalize());
            }
        }
    }

    fn output(&self) -> TransformationOutput {
        TransformationOutput::Summary(self.summaries.clone())
    }
}
