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

use googletest::assert_that;
use googletest::prelude::ge;
use googletest::prelude::le;
use googletest::prelude::near;
use streamviz::aggregate::Sum;
use streamviz::groupby::CATEGORY_LIMIT;
use streamviz::heatmap::HEATMAP_MAX_BINS;
use streamviz::heatmap::HeatmapRect;
use streamviz::histogram::MAX_BINS;
use streamviz::transformation::Aggregate;
use streamviz::transformation::BoxPlotTransform;
use streamviz::transformation::CategoricalHeatmapTransform;
use streamviz::transformation::Column;
use streamviz::transformation::ColumnPair;
use streamviz::transformation::ColumnSummaryTransform;
use streamviz::transformation::GroupbySummaryTransform;
use streamviz::transformation::HeatmapTransform;
use streamviz::transformation::HistogramTransform;
use streamviz::transformation::ItemFrequencyTransform;
use streamviz::transformation::Source;
use streamviz::transformation::Table;
use streamviz::transformation::ThreadPool;
use streamviz::transformation::Transformation;
use streamviz::transformation::TransformationOutput;
use streamviz::value::Value;
use streamviz::value::ValueType;

const NUM_ROWS: usize = 10_000;

/// (batch size, worker count) combinations that split the rows differently.
const PARTITIONINGS: [(usize, usize); 3] = [(NUM_ROWS, 1), (1000, 3), (777, 8)];

fn value_at(i: usize) -> Option<f64> {
    (i % 97 != 0).then(|| ((i * 7919) % 1000) as f64 / 10.0)
}

fn values() -> Column {
    (0..NUM_ROWS)
        .map(|i| value_at(i).map_or(Value::Undefined, Value::from))
        .collect()
}

fn heatmap_points() -> Vec<(f64, f64)> {
    (0..NUM_ROWS)
        .map(|i| {
            let x = ((i * 7919) % 1000) as f64 / 10.0;
            let y = ((i * 104_729) % 500) as f64 - 100.0;
            (x, y)
        })
        .collect()
}

fn heatmap_columns() -> ColumnPair {
    let (x, y): (Vec<f64>, Vec<f64>) = heatmap_points().into_iter().unzip();
    ColumnPair::new(x.into_iter().collect(), y.into_iter().collect())
}

fn categories() -> Column {
    (0..NUM_ROWS)
        .map(|i| Value::from(format!("c{}", i % 13)))
        .collect()
}

fn buckets() -> Column {
    (0..NUM_ROWS).map(|i| (i % 5) as i64).collect()
}

fn run_to_end<S, A>(mut transformation: Transformation<S, A>, source: S) -> TransformationOutput
where
    S: Source,
    A: Aggregate<Item = S::Item>,
{
    transformation.init(source);
    while !transformation.eof() {
        transformation.get();
    }
    transformation.get()
}

fn partitioned<S, A>(make: impl Fn() -> A, source: impl Fn() -> S) -> Vec<TransformationOutput>
where
    S: Source,
    A: Aggregate<Item = S::Item>,
{
    PARTITIONINGS
        .iter()
        .map(|&(batch_size, threads)| {
            let transformation = Transformation::new(make())
                .with_batch_size(batch_size)
                .with_thread_pool(ThreadPool::with_threads(threads).unwrap());
            run_to_end(transformation, source())
        })
        .collect()
}

#[test]
fn test_histogram_totals_do_not_depend_on_partitioning() {
    let expected = NUM_ROWS as u64 - (NUM_ROWS as u64).div_ceil(97);
    for output in partitioned(|| HistogramTransform::new(ValueType::Float), values) {
        let histogram = output.into_histogram().unwrap();
        assert_eq!(histogram.total_count(), expected);
        assert_eq!(histogram.observed_min(), Some(0.0));
        assert_eq!(histogram.observed_max(), Some(99.9));
    }
}

#[test]
fn test_histogram_bins_do_not_depend_on_partitioning() {
    let data: Vec<f64> = (0..NUM_ROWS).filter_map(value_at).collect();
    for output in partitioned(|| HistogramTransform::new(ValueType::Float), values) {
        let histogram = output.into_histogram().unwrap();
        let width = (histogram.scale_max().unwrap() - histogram.scale_min().unwrap())
            / MAX_BINS as f64;
        // a point is at most one fine bin away from its true bin; 100 points per unit
        let tolerance = 2.0 * (2.0 * width * 100.0 + 10.0);

        let bins = histogram.get_bins(10).unwrap();
        assert_eq!(bins.len(), 10);
        let total: u64 = bins.iter().map(|bin| bin.count()).sum();
        assert_eq!(total, data.len() as u64);
        for bin in &bins {
            let truth = data
                .iter()
                .filter(|v| **v >= bin.left() && **v < bin.right())
                .count();
            assert_that!(bin.count() as f64, near(truth as f64, tolerance));
        }
    }
}

#[test]
fn test_heatmap_does_not_depend_on_partitioning() {
    let points = heatmap_points();
    let n = points.len() as f64;
    let mean_x = points.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = points.iter().map(|(_, y)| y).sum::<f64>() / n;

    for output in partitioned(HeatmapTransform::new, heatmap_columns) {
        let heatmap = output.into_heatmap().unwrap();
        assert_eq!(heatmap.total_count(), NUM_ROWS as u64);
        assert_eq!(heatmap.x_observed(), Some((0.0, 99.9)));
        assert_eq!(heatmap.y_observed(), Some((-100.0, 399.0)));

        let rects = heatmap.rects(false);
        let stored: u64 = rects.iter().map(|rect| rect.count()).sum();
        assert_eq!(stored, NUM_ROWS as u64);

        // cell centers stay within two cells of every point on average
        let cells = HEATMAP_MAX_BINS as f64;
        let x_width = (heatmap.x_scale_max().unwrap() - heatmap.x_scale_min().unwrap()) / cells;
        let y_width = (heatmap.y_scale_max().unwrap() - heatmap.y_scale_min().unwrap()) / cells;
        let weighted = |center: fn(&HeatmapRect) -> f64| {
            rects
                .iter()
                .map(|rect| center(rect) * rect.count() as f64)
                .sum::<f64>()
                / n
        };
        let x = weighted(|rect| (rect.x_left() + rect.x_right()) / 2.0);
        let y = weighted(|rect| (rect.y_left() + rect.y_right()) / 2.0);
        assert_that!(x, near(mean_x, 2.0 * x_width));
        assert_that!(y, near(mean_y, 2.0 * y_width));
    }
}

#[test]
fn test_histogram_with_known_range_is_exact() {
    let outputs = partitioned(
        || HistogramTransform::with_range(ValueType::Float, 0.0, 100.0),
        values,
    );
    assert_eq!(outputs[0], outputs[1]);
    assert_eq!(outputs[1], outputs[2]);
}

#[test]
fn test_grouped_results_do_not_depend_on_partitioning() {
    let outputs = partitioned(ItemFrequencyTransform::new, values);
    assert_eq!(outputs[0], outputs[1]);
    assert_eq!(outputs[1], outputs[2]);

    let outputs = partitioned(
        || GroupbySummaryTransform::new(Sum::new()),
        || ColumnPair::new(categories(), values()),
    );
    let grouped = outputs[0].clone().into_grouped().unwrap();
    assert_eq!(grouped.rows().len(), 13);
    for other in &outputs[1..] {
        let other = other.clone().into_grouped().unwrap();
        for (a, b) in grouped.rows().iter().zip(other.rows()) {
            assert_eq!(a.key(), b.key());
            let (a, b) = (a.value().as_f64().unwrap(), b.value().as_f64().unwrap());
            assert_that!(a, near(b, 1e-6));
        }
    }

    let outputs = partitioned(ItemFrequencyTransform::new, || {
        (0..NUM_ROWS)
            .map(|i| ((i * 7919) % 1500) as i64)
            .collect::<Column>()
    });
    for output in outputs {
        let grouped = output.into_grouped().unwrap();
        assert_eq!(grouped.rows().len(), CATEGORY_LIMIT);
        let stored: i64 = grouped
            .rows()
            .iter()
            .map(|row| row.value().as_i64().unwrap())
            .sum();
        assert_eq!(stored as u64 + grouped.omitted_count(), NUM_ROWS as u64);
    }

    let outputs = partitioned(CategoricalHeatmapTransform::new, || {
        ColumnPair::new(categories(), buckets())
    });
    assert_eq!(outputs[0].clone().into_grouped().unwrap().rows().len(), 65);
    assert_eq!(outputs[0], outputs[1]);
    assert_eq!(outputs[1], outputs[2]);
}

#[test]
fn test_progress_is_monotonic() {
    let mut transformation =
        Transformation::new(HistogramTransform::new(ValueType::Float)).with_batch_size(3000);
    transformation.init(values());
    assert_eq!(transformation.get_total_rows(), NUM_ROWS);
    let mut last = transformation.get_percent_complete();
    assert_eq!(last, 0.0);
    let mut steps = 0;
    while !transformation.eof() {
        transformation.get();
        steps += 1;
        let progress = transformation.get_percent_complete();
        assert_that!(progress, ge(last));
        assert_that!(progress, le(1.0));
        last = progress;
    }
    assert_eq!(steps, 4);
    assert_eq!(transformation.get_rows_processed(), NUM_ROWS);
    assert_eq!(last, 1.0);

    let done = transformation.get();
    assert_eq!(transformation.get(), done);
    assert_eq!(transformation.get_rows_processed(), NUM_ROWS);
}

#[test]
fn test_empty_source_is_complete() {
    let mut transformation = Transformation::new(HistogramTransform::new(ValueType::Integer));
    transformation.init(Column::default());
    assert!(transformation.eof());
    assert_eq!(transformation.get_percent_complete(), 1.0);
    let histogram = transformation.get().into_histogram().unwrap();
    assert!(histogram.is_empty());
}

#[test]
#[should_panic(expected = "transformation is not initialized")]
fn test_get_before_init_panics() {
    let mut transformation: Transformation<Column, _> =
        Transformation::new(HistogramTransform::new(ValueType::Float));
    transformation.get();
}

#[test]
#[should_panic(expected = "transformation is not initialized")]
fn test_eof_before_init_panics() {
    let transformation: Transformation<Column, _> =
        Transformation::new(HistogramTransform::new(ValueType::Float));
    transformation.eof();
}

#[test]
#[should_panic(expected = "transformation is not initialized")]
fn test_rows_processed_before_init_panics() {
    let transformation: Transformation<Column, _> =
        Transformation::new(ItemFrequencyTransform::new());
    transformation.get_rows_processed();
}

#[test]
#[should_panic(expected = "transformation is not initialized")]
fn test_total_rows_before_init_panics() {
    let transformation: Transformation<Column, _> =
        Transformation::new(ItemFrequencyTransform::new());
    transformation.get_total_rows();
}

#[test]
#[should_panic(expected = "transformation is not initialized")]
fn test_percent_complete_before_init_panics() {
    let transformation: Transformation<Column, _> =
        Transformation::new(HistogramTransform::new(ValueType::Float));
    transformation.get_percent_complete();
}

#[test]
fn test_unbounded_batch_size_processes_everything_at_once() {
    let mut transformation =
        Transformation::new(ItemFrequencyTransform::new()).with_batch_size(usize::MAX);
    transformation.init(values());
    transformation.get();
    assert!(transformation.eof());
    assert_eq!(transformation.get_rows_processed(), NUM_ROWS);
}

#[test]
#[should_panic(expected = "transformation is already initialized")]
fn test_init_twice_panics() {
    let mut transformation = Transformation::new(ItemFrequencyTransform::new());
    transformation.init(values());
    transformation.init(values());
}

#[test]
#[should_panic(expected = "batch size must be positive")]
fn test_zero_batch_size_panics() {
    let _ = Transformation::<Column, _>::new(ItemFrequencyTransform::new()).with_batch_size(0);
}

#[test]
fn test_heatmap_transform() {
    let x: Column = (0..NUM_ROWS).map(|i| (i % 100) as f64).collect();
    let y: Column = (0..NUM_ROWS).map(|i| (i / 100) as f64 - 50.0).collect();
    let transformation = Transformation::new(HeatmapTransform::new())
        .with_batch_size(2500)
        .with_thread_pool(ThreadPool::with_threads(4).unwrap());
    let heatmap = run_to_end(transformation, ColumnPair::new(x, y))
        .into_heatmap()
        .unwrap();
    assert_eq!(heatmap.total_count(), NUM_ROWS as u64);
    assert_eq!(heatmap.x_observed(), Some((0.0, 99.0)));
    assert_eq!(heatmap.y_observed(), Some((-50.0, 49.0)));
}

#[test]
fn test_box_plot_transform() {
    let transformation = Transformation::new(BoxPlotTransform::box_plot()).with_batch_size(1234);
    let grouped = run_to_end(transformation, ColumnPair::new(categories(), values()))
        .into_grouped()
        .unwrap();
    assert_eq!(grouped.omitted_count(), 0);
    assert_eq!(grouped.rows().len(), 13);
    for row in grouped.rows() {
        let median = row.value().get("median").and_then(Value::as_f64).unwrap();
        assert_that!(median, near(50.0, 5.0));
    }
}

#[test]
fn test_item_frequency_respects_limit() {
    let transformation = Transformation::new(ItemFrequencyTransform::with_limit(10))
        .with_batch_size(500)
        .with_thread_pool(ThreadPool::with_threads(2).unwrap());
    let column: Column = (0..1000).map(|i| i % 20).collect();
    let grouped = run_to_end(transformation, column).into_grouped().unwrap();
    assert_eq!(grouped.rows().len(), 10);
    let stored: u64 = grouped
        .rows()
        .iter()
        .map(|row| row.value().as_i64().unwrap() as u64)
        .sum();
    assert_eq!(stored + grouped.omitted_count(), 1000);
}

#[test]
fn test_column_summary_transform() {
    let numbers: Column = (0..100).collect();
    let labels: Column = (0..100)
        .map(|i| if i % 10 == 0 { Value::Undefined } else { Value::from("x") })
        .collect();
    let transformation = Transformation::new(ColumnSummaryTransform::new(2))
        .with_batch_size(30)
        .with_thread_pool(ThreadPool::with_threads(3).unwrap());
    let summaries = run_to_end(transformation, Table::new(vec![numbers, labels]))
        .into_summary()
        .unwrap();

    assert_eq!(summaries.len(), 2);
    assert_eq!(summaries[0].count(), 100);
    assert_eq!(summaries[0].missing(), 0);
    assert_that!(summaries[0].mean().unwrap(), near(49.5, 1e-9));
    assert_that!(summaries[0].stdev().unwrap(), near(28.866, 1e-3));
    assert_that!(summaries[0].median().unwrap(), near(49.5, 1.5));

    assert_eq!(summaries[1].count(), 90);
    assert_eq!(summaries[1].missing(), 10);
    assert_eq!(summaries[1].mean(), None);
    assert_that!(summaries[1].distinct_estimate(), near(1.0, 0.1));
}
