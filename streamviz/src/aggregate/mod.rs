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

//! Streaming aggregators.
//!
//! An aggregator consumes one [`Value`] at a time and is combined with other aggregators of
//! the same kind after the parallel phase of a batch. Combination is a two-phase protocol:
//! [`Aggregator::partial_finalize`] turns an accumulating aggregator into its mergeable
//! [`PartialAggregate`] form, and only that form can be combined or emitted. Exact
//! aggregators are their own partial form; the quantile sketch is not, so combining a
//! sketch that still holds unmerged input does not compile.
//!
//! # Usage
//!
//! ```rust
//! # use streamviz::aggregate::{Aggregator, Average, PartialAggregate};
//! # use streamviz::value::Value;
//! let mut left = Average::new();
//! left.add_element(&Value::from(1.0));
//! let mut right = Average::new();
//! right.add_element(&Value::from(3.0));
//! right.add_element(&Value::Undefined);
//!
//! let mut merged = left.partial_finalize();
//! merged.combine(&right.partial_finalize());
//! assert_eq!(merged.emit(), Value::from(2.0));
//! ```

mod basic;
mod count_distinct;
mod frequency;
mod quantile;

pub use self::basic::Average;
pub use self::basic::Count;
pub use self::basic::Max;
pub use self::basic::Min;
pub use self::basic::Sum;
pub use self::basic::Variance;
pub use self::count_distinct::CountDistinct;
pub use self::frequency::FrequencyCount;
pub use self::quantile::FinalizedQuantileSketch;
pub use self::quantile::QuantileSketch;

use std::fmt::Debug;

use crate::value::Value;

/// Accumulating phase of an aggregator.
pub trait Aggregator: Clone + Debug + Send {
    /// The mergeable form produced by [`Aggregator::partial_finalize`].
    type Partial: PartialAggregate;

    /// Adds one value. Missing values are ignored.
    fn add_element(&mut self, value: &Value);

    /// Finishes the accumulating phase.
    fn partial_finalize(self) -> Self::Partial;
}

/// Mergeable phase of an aggregator.
pub trait PartialAggregate: Clone + Debug + Send {
    /// Merges `other` into this aggregate.
    fn combine(&mut self, other: &Self);

    /// Returns the current estimate.
    fn emit(&self) -> Value;
}

