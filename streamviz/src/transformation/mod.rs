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

//! Batch-parallel streaming driver.
//!
//! A [`Transformation`] binds a [`Source`] to an [`Aggregate`]. Each call to
//! [`Transformation::get`] processes one batch of rows: the batch is cut into contiguous
//! ranges, one per worker of the [`ThreadPool`], every worker streams its range into a
//! private local aggregate, and the locals are merged into the running aggregate in
//! worker order before the cursor advances. The returned [`TransformationOutput`] is a
//! complete snapshot of everything processed so far.
//!
//! ```text
//! UNINITIALIZED --init--> READY --get--> STREAMING --get--> ... --> DONE
//! ```

mod engine;
mod output;
mod pool;
mod source;
mod transforms;

pub use self::engine::Aggregate;
pub use self::engine::DEFAULT_BATCH_SIZE;
pub use self::engine::Transformation;
pub use self::output::GroupedRow;
pub use self::output::GroupedRows;
pub use self::output::TransformationOutput;
pub use self::pool::ThreadPool;
pub use self::source::Column;
pub use self::source::ColumnPair;
pub use self::source::RangeIter;
pub use self::source::Source;
pub use self::source::Table;
pub use self::transforms::BoxPlotTransform;
pub use self::transforms::CategoricalHeatmapTransform;
pub use self::transforms::ColumnSummaryTransform;
pub use self::transforms::GroupbySummaryTransform;
pub use self::transforms::HeatmapTransform;
pub use self::transforms::HistogramTransform;
pub use self::transforms::ItemFrequencyTransform;
