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

//! Resizable two-dimensional heatmap for streaming pairs of numeric columns.
//!
//! The heatmap applies the histogram's doubling strategy to two independent axes. The
//! counters form a [`HEATMAP_MAX_BINS`] × [`HEATMAP_MAX_BINS`] grid where rows follow the
//! x axis and columns follow the y axis. Widening x collapses whole rows pairwise and
//! widening y collapses the columns inside every row.
//!
//! # Usage
//!
//! ```rust
//! # use streamviz::heatmap::Heatmap;
//! # use streamviz::value::Value;
//! let mut heatmap = Heatmap::with_range(0.0, 10.0, 0.0, 10.0);
//! heatmap.add_element(&Value::from(50.0), &Value::from(5.0));
//! assert_eq!(heatmap.total_count(), 1);
//! assert!(heatmap.x_scale_max().unwrap() - heatmap.x_scale_min().unwrap() >= 40.0);
//!
//! let rects = heatmap.rects(false);
//! assert_eq!(rects.len(), 1);
//! assert!(rects[0].x_left() <= 50.0 && 50.0 < rects[0].x_right());
//! ```

mod serialization;
mod sketch;

pub use self::sketch::Heatmap;
pub use self::sketch::HeatmapRect;

/// Number of counters along each heatmap axis.
pub const HEATMAP_MAX_BINS: usize = 100;
