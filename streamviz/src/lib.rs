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

//! Streaming summaries for progressive visualization of large columns.
//!
//! The crate provides the data structures behind histograms, heatmaps, box plots,
//! categorical heatmaps, item frequency and columnwise summary views, plus a batch-parallel
//! driver that streams a column through them:
//!
//! * [`histogram::Histogram`] and [`heatmap::Heatmap`] keep a fixed number of bins over a
//!   range that doubles on demand, so they never rescan history.
//! * [`groupby::Groupby`] routes values to per-category [`aggregate::Aggregator`]s and caps
//!   the number of categories.
//! * [`transformation::Transformation`] runs one batch per call on a worker pool and hands
//!   back a complete snapshot after each batch.
//!
//! # Usage
//!
//! ```rust
//! use streamviz::transformation::{ColumnPair, BoxPlotTransform, Transformation};
//! use streamviz::value::Value;
//!
//! let categories = (0..100).map(|i| if i % 2 == 0 { "even" } else { "odd" }).collect();
//! let values = (0..100).collect();
//! let mut boxplot = Transformation::new(BoxPlotTransform::box_plot());
//! boxplot.init(ColumnPair::new(categories, values));
//! while !boxplot.eof() {
//!     boxplot.get();
//! }
//!
//! let grouped = boxplot.get().into_grouped().unwrap();
//! assert_eq!(grouped.rows().len(), 2);
//! assert_eq!(grouped.rows()[0].key(), &[Value::from("even")]);
//! let even = grouped.rows()[0].value();
//! assert_eq!(even.get("count"), Some(&Value::from(50u64)));
//! ```

pub mod aggregate;
pub mod error;
pub mod extrema;
pub mod groupby;
pub mod heatmap;
pub mod histogram;
pub mod summary;
pub mod transformation;
pub mod value;

mod axis;
mod codec;
