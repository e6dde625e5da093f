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

//! Resizable one-dimensional histogram for streaming numeric columns.
//!
//! The histogram keeps a fixed array of [`MAX_BINS`] counters over a scale range that
//! grows on demand. When a value falls outside the scale, the range doubles around its
//! center and adjacent bins are summed pairwise, so history never has to be rescanned.
//! Histograms built from the same seed range merge exactly; independently seeded ones
//! merge approximately by redistributing bin centers.
//!
//! # Usage
//!
//! ```rust
//! # use streamviz::histogram::Histogram;
//! # use streamviz::value::{Value, ValueType};
//! let mut histogram = Histogram::with_range(ValueType::Float, 0.0, 100.0);
//! for v in [0.0, 10.0, 50.0, 99.0, 100.0, f64::NAN] {
//!     histogram.add_element(&Value::from(v));
//! }
//! assert_eq!(histogram.total_count(), 5);
//!
//! let bins = histogram.get_bins(5).unwrap();
//! let counts: Vec<u64> = bins.iter().map(|bin| bin.count()).collect();
//! assert_eq!(counts, vec![2, 0, 1, 0, 2]);
//! ```

mod serialization;
mod sketch;

pub use self::sketch::Histogram;
pub use self::sketch::HistogramBin;

/// Number of counters backing every histogram.
pub const MAX_BINS: usize = 1000;
