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
use googletest::prelude::near;
use streamviz::aggregate::Aggregator;
use streamviz::aggregate::Count;
use streamviz::aggregate::CountDistinct;
use streamviz::aggregate::FrequencyCount;
use streamviz::aggregate::Max;
use streamviz::aggregate::Min;
use streamviz::aggregate::PartialAggregate;
use streamviz::aggregate::QuantileSketch;
use streamviz::aggregate::Sum;
use streamviz::aggregate::Variance;
use streamviz::value::Value;

#[test]
fn test_quantile_sketch_empty() {
    let sketch = QuantileSketch::new(10);
    assert!(sketch.is_empty());
    assert_eq!(sketch.k(), 10);
    assert_eq!(sketch.total_weight(), 0);
    let sketch = sketch.partial_finalize();
    assert_eq!(sketch.min_value(), None);
    assert_eq!(sketch.max_value(), None);
    assert_eq!(sketch.quantile(0.5), None);
    assert_eq!(sketch.emit(), Value::Undefined);
}

#[test]
fn test_quantile_sketch_one_value() {
    let mut sketch = QuantileSketch::new(100);
    sketch.update(1.0);
    sketch.update(f64::NAN);
    assert_eq!(sketch.total_weight(), 1);
    let sketch = sketch.partial_finalize();
    assert_eq!(sketch.min_value(), Some(1.0));
    assert_eq!(sketch.max_value(), Some(1.0));
    assert_eq!(sketch.quantile(0.0), Some(1.0));
    assert_eq!(sketch.quantile(0.5), Some(1.0));
    assert_eq!(sketch.quantile(1.0), Some(1.0));
}

#[test]
fn test_quantile_sketch_many_values() {
    let n = 10_000;
    let mut sketch = QuantileSketch::default();
    for i in 0..n {
        sketch.add_element(&Value::from(i));
    }
    let sketch = sketch.partial_finalize();
    assert_eq!(sketch.total_weight(), n as u64);
    assert_eq!(sketch.quantile(0.0), Some(0.0));
    assert_eq!(sketch.quantile(1.0), Some((n - 1) as f64));
    assert_that!(sketch.quantile(0.5).unwrap(), near(n as f64 / 2.0, n as f64 * 0.03));
    assert_that!(sketch.quantile(0.9).unwrap(), near(n as f64 * 0.9, n as f64 * 0.01));
}

#[test]
fn test_quantile_sketch_combine() {
    let mut left = QuantileSketch::default();
    let mut right = QuantileSketch::default();
    for i in 0..1000 {
        left.update(i as f64);
        right.update(1000.0 + i as f64);
    }
    let mut merged = left.partial_finalize();
    merged.combine(&right.partial_finalize());
    assert_eq!(merged.total_weight(), 2000);
    assert_eq!(merged.min_value(), Some(0.0));
    assert_eq!(merged.max_value(), Some(1999.0));
    assert_that!(merged.quantile(0.5).unwrap(), near(1000.0, 30.0));

    let summary = merged.emit();
    assert_eq!(summary.get("count"), Some(&Value::from(2000u64)));
    assert!(summary.get("lower_quartile").is_some());
}

#[test]
#[should_panic(expected = "k must be at least 10")]
fn test_quantile_sketch_small_k_panics() {
    QuantileSketch::new(9);
}

#[test]
fn test_count_distinct_estimates() {
    for n in [100, 1000, 20_000] {
        let mut sketch = CountDistinct::default();
        for i in 0..n {
            sketch.update(i);
        }
        let estimate = sketch.estimate();
        assert_that!(estimate, near(n as f64, n as f64 * 0.05));
    }
}

#[test]
fn test_count_distinct_ignores_duplicates_and_missing() {
    let mut sketch = CountDistinct::default();
    for _ in 0..10 {
        for i in 0..100 {
            sketch.add_element(&Value::from(i));
        }
        sketch.add_element(&Value::Undefined);
    }
    assert_that!(sketch.estimate(), near(100.0, 5.0));
}

#[test]
fn test_count_distinct_combine_is_a_union() {
    let mut left = CountDistinct::new(10);
    let mut right = CountDistinct::new(10);
    for i in 0..600 {
        left.update(i);
        right.update(i + 300);
    }
    left.combine(&right);
    assert_that!(left.estimate(), near(900.0, 90.0));
}

#[test]
#[should_panic(expected = "incompatible lg_k values")]
fn test_count_distinct_combine_incompatible() {
    let mut left = CountDistinct::new(10);
    left.combine(&CountDistinct::new(11));
}

#[test]
fn test_exact_aggregators_skip_missing() {
    let values = [
        Value::from(4),
        Value::Undefined,
        Value::from(-2),
        Value::from(7),
    ];
    let mut count = Count::new();
    let mut sum = Sum::new();
    let mut min = Min::new();
    let mut max = Max::new();
    let mut stdv = Variance::stdv();
    for value in &values {
        count.add_element(value);
        sum.add_element(value);
        min.add_element(value);
        max.add_element(value);
        stdv.add_element(value);
    }
    assert_eq!(count.emit(), Value::from(3u64));
    assert_eq!(sum.emit(), Value::from(9));
    assert_eq!(min.emit(), Value::from(-2));
    assert_eq!(max.emit(), Value::from(7));
    assert_that!(stdv.emit().as_f64().unwrap(), near(14f64.sqrt(), 1e-12));
}

#[test]
fn test_frequency_count() {
    let mut left = FrequencyCount::new();
    let mut right = FrequencyCount::new();
    for v in ["a", "b", "a"] {
        left.add_element(&Value::from(v));
    }
    for v in ["b", "b", "c"] {
        right.add_element(&Value::from(v));
    }
    left.combine(&right);
    assert_eq!(left.count(&Value::from("b")), 3);
    assert_eq!(
        left.emit(),
        Value::dict([
            ("b", Value::from(3u64)),
            ("a", Value::from(2u64)),
            ("c", Value::from(1u64)),
        ])
    );
}
