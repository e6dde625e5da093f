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
use streamviz::error::ErrorKind;
use streamviz::histogram::Histogram;
use streamviz::histogram::MAX_BINS;
use streamviz::value::Value;
use streamviz::value::ValueType;

fn fill(histogram: &mut Histogram, values: impl IntoIterator<Item = f64>) {
    for v in values {
        histogram.add_element(&Value::from(v));
    }
}

#[test]
fn test_missing_and_non_finite_values_are_skipped() {
    let mut histogram = Histogram::new(ValueType::Float);
    for value in [
        Value::from(1.0),
        Value::from(f64::NAN),
        Value::from(2.0),
        Value::Undefined,
        Value::from(3.0),
        Value::from(f64::INFINITY),
    ] {
        histogram.add_element(&value);
    }
    assert_eq!(histogram.total_count(), 3);
    assert_eq!(histogram.observed_min(), Some(1.0));
    assert_eq!(histogram.observed_max(), Some(3.0));
}

#[test]
fn test_empty_histogram() {
    let histogram = Histogram::new(ValueType::Integer);
    assert!(histogram.is_empty());
    assert!(!histogram.has_range());
    assert_eq!(histogram.observed_min(), None);
    assert_eq!(histogram.scale_min(), None);
    assert_eq!(histogram.bins().len(), MAX_BINS);
    assert!(histogram.get_bins(5).unwrap().is_empty());
}

#[test]
fn test_first_value_seeds_range() {
    let mut histogram = Histogram::new(ValueType::Integer);
    histogram.add_element(&Value::from(7));
    assert_eq!(histogram.total_count(), 1);
    let (min, max) = (histogram.scale_min().unwrap(), histogram.scale_max().unwrap());
    assert!(min < 7.0 && 7.0 < max);
    assert_eq!(histogram.observed_min(), Some(7.0));
}

#[test]
fn test_single_doubling_collapses_adjacent_bins() {
    let mut histogram = Histogram::with_range(ValueType::Float, 0.0, 100.0);
    fill(&mut histogram, [0.05, 99.95, 150.0]);

    assert_eq!(histogram.scale_min(), Some(-50.0));
    assert_eq!(histogram.scale_max(), Some(150.0));
    let bins = histogram.bins();
    assert_eq!(bins[250], 1);
    assert_eq!(bins[749], 1);
    assert_eq!(bins[MAX_BINS - 1], 1);
    assert_eq!(histogram.total_count(), 3);
}

#[test]
fn test_rescale_conserves_counts() {
    let mut histogram = Histogram::with_range(ValueType::Float, 0.0, 1.0);
    fill(&mut histogram, (0..1000).map(|i| i as f64 / 1000.0));
    assert_eq!(histogram.total_count(), 1000);

    fill(&mut histogram, [1.0e6, -2.5e5]);
    assert_eq!(histogram.total_count(), 1002);
    assert!(histogram.scale_min().unwrap() <= -2.5e5);
    assert!(histogram.scale_max().unwrap() >= 1.0e6);

    histogram.rescale(-1.0e9, 1.0e9);
    assert_eq!(histogram.total_count(), 1002);
}

#[test]
fn test_rescale_ignores_non_finite_bounds() {
    let mut histogram = Histogram::with_range(ValueType::Float, 0.0, 1.0);
    fill(&mut histogram, [0.25, 0.75]);
    histogram.rescale(f64::NAN, 1.0);
    histogram.rescale(0.0, f64::INFINITY);
    assert_eq!(histogram.scale_min(), Some(0.0));
    assert_eq!(histogram.scale_max(), Some(1.0));
    assert_eq!(histogram.total_count(), 2);

    let mut empty = Histogram::new(ValueType::Float);
    empty.rescale(f64::NAN, f64::NAN);
    assert!(!empty.has_range());
}

#[test]
fn test_scale_range_only_grows() {
    let mut histogram = Histogram::with_range(ValueType::Float, 0.0, 1.0);
    let mut last = (0.0, 1.0);
    for v in [0.5, 3.0, -7.0, 2.0, 100.0, -0.5, 1.0e4] {
        histogram.add_element(&Value::from(v));
        let scale = (
            histogram.scale_min().unwrap(),
            histogram.scale_max().unwrap(),
        );
        assert!(scale.0 <= last.0 && scale.1 >= last.1);
        assert!(scale.0 <= histogram.observed_min().unwrap());
        assert!(scale.1 >= histogram.observed_max().unwrap());
        last = scale;
    }
}

#[test]
fn test_fixed_range_bins() {
    let mut histogram = Histogram::with_range(ValueType::Float, 0.0, 100.0);
    fill(&mut histogram, [0.0, 10.0, 50.0, 99.0, 100.0]);

    let bins = histogram.get_bins(5).unwrap();
    assert_eq!(bins.len(), 5);
    let counts: Vec<u64> = bins.iter().map(|bin| bin.count()).collect();
    assert_eq!(counts, vec![2, 0, 1, 0, 2]);
    for (i, bin) in bins.iter().enumerate() {
        assert_that!(bin.left(), near(i as f64 * 20.0, 1e-9));
        assert_that!(bin.right(), near((i + 1) as f64 * 20.0, 1e-9));
    }
}

#[test]
fn test_get_bins_pads_uneven_spans() {
    let mut histogram = Histogram::with_range(ValueType::Float, 0.0, 100.0);
    fill(&mut histogram, (0..=100).map(f64::from));

    // 1000 effective bins do not split evenly into 3 buckets
    let bins = histogram.get_bins(3).unwrap();
    assert_eq!(bins.len(), 3);
    let total: u64 = bins.iter().map(|bin| bin.count()).sum();
    assert_eq!(total, 101);
    assert!(bins[0].left() < 0.0);
    assert!(bins[2].right() > 100.0);
}

#[test]
fn test_get_bins_on_narrow_data() {
    let mut histogram = Histogram::with_range(ValueType::Float, 0.0, 100.0);
    fill(&mut histogram, [40.0, 42.0, 44.5]);

    // 46 effective bins allow at most 11 buckets
    let bins = histogram.get_bins(11).unwrap();
    let total: u64 = bins.iter().map(|bin| bin.count()).sum();
    assert_eq!(total, 3);
    assert!(bins[0].left() <= 40.0);
    assert!(bins[10].right() > 44.5);

    let err = histogram.get_bins(12).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
}

#[test]
fn test_get_bins_rejects_invalid_counts() {
    let mut histogram = Histogram::with_range(ValueType::Float, 0.0, 100.0);
    fill(&mut histogram, [0.0, 100.0]);

    let err = histogram.get_bins(0).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    assert!(histogram.get_bins(250).is_ok());
    let err = histogram.get_bins(251).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
}

#[test]
#[should_panic(expected = "histogram requires numeric values")]
fn test_non_numeric_value_panics() {
    let mut histogram = Histogram::new(ValueType::Float);
    histogram.add_element(&Value::from("one"));
}

#[test]
#[should_panic(expected = "histogram requires a numeric value type")]
fn test_non_numeric_value_type_panics() {
    Histogram::new(ValueType::String);
}

#[test]
fn test_combine_with_shared_grid_is_exact() {
    let seed = Histogram::with_range(ValueType::Float, 0.0, 10.0);
    let mut single = seed.new_instance();
    let mut left = seed.new_instance();
    let mut right = seed.new_instance();

    let values: Vec<f64> = (0..500).map(|i| (i as f64 * 0.37) % 40.0 - 14.999).collect();
    for (i, &v) in values.iter().enumerate() {
        single.add_element(&Value::from(v));
        if i % 3 == 0 {
            left.add_element(&Value::from(v));
        } else {
            right.add_element(&Value::from(v));
        }
    }

    left.combine_with(&right);
    assert_eq!(left.bins(), single.bins());
    assert_eq!(left.scale_min(), single.scale_min());
    assert_eq!(left.observed_min(), single.observed_min());
    assert_eq!(left.observed_max(), single.observed_max());
}

#[test]
fn test_combine_with_independent_grids_conserves_counts() {
    let mut left = Histogram::new(ValueType::Float);
    fill(&mut left, (0..100).map(|i| i as f64));
    let mut right = Histogram::new(ValueType::Float);
    fill(&mut right, (0..50).map(|i| 1000.0 + i as f64 * 3.3));

    left.combine_with(&right);
    assert_eq!(left.total_count(), 150);
    assert_eq!(left.observed_min(), Some(0.0));
    assert_eq!(left.observed_max(), Some(1000.0 + 49.0 * 3.3));

    let mut empty = Histogram::new(ValueType::Float);
    empty.combine_with(&left);
    assert_eq!(empty, left);
}

#[test]
fn test_serialization_round_trip() {
    let mut histogram = Histogram::with_range(ValueType::Integer, -10.0, 10.0);
    fill(&mut histogram, [-3.0, 4.0, 4.0, 250.0]);
    let restored = Histogram::deserialize(&histogram.serialize()).unwrap();
    assert_eq!(restored, histogram);

    let empty = Histogram::new(ValueType::Float);
    let restored = Histogram::deserialize(&empty.serialize()).unwrap();
    assert_eq!(restored, empty);
}

#[test]
fn test_deserialize_rejects_malformed_bytes() {
    let mut histogram = Histogram::with_range(ValueType::Float, 0.0, 1.0);
    fill(&mut histogram, [0.5]);
    let bytes = histogram.serialize();

    let err = Histogram::deserialize(&bytes[..bytes.len() - 1]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedDeserializeData);

    let mut wrong_family = bytes.clone();
    wrong_family[0] = 2;
    let err = Histogram::deserialize(&wrong_family).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedDeserializeData);

    let mut wrong_version = bytes.clone();
    wrong_version[1] = 9;
    let err = Histogram::deserialize(&wrong_version).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedDeserializeData);

    let mut wrong_type = bytes;
    wrong_type[3] = ValueType::String as u8;
    let err = Histogram::deserialize(&wrong_type).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedDeserializeData);

    assert!(Histogram::deserialize(&[]).is_err());
}
