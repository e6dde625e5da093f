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

//! Bounded-cardinality groupby.
//!
//! A [`Groupby`] routes every value to a per-category aggregator cloned from a prototype.
//! At most a fixed number of categories is stored; points of further categories are
//! dropped and tallied in [`Groupby::omitted_count`]. Excess categories are never folded
//! into an "other" bucket.
//!
//! Like the aggregators it holds, a groupby has an accumulating form ([`Groupby`]) and a
//! mergeable form ([`GroupbyResult`]) produced by [`Groupby::partial_finalize`].
//!
//! # Usage
//!
//! ```rust
//! # use streamviz::aggregate::Sum;
//! # use streamviz::groupby::Groupby;
//! # use streamviz::value::Value;
//! let mut groupby = Groupby::with_limit(Sum::new(), 2);
//! for (category, value) in [("a", 1), ("b", 2), ("a", 3), ("c", 4)] {
//!     groupby.update(Value::from(category), &Value::from(value));
//! }
//! let result = groupby.partial_finalize();
//! assert_eq!(result.omitted_count(), 1);
//! assert_eq!(
//!     result.get_grouped(),
//!     vec![
//!         (Value::from("a"), Value::from(4)),
//!         (Value::from("b"), Value::from(2)),
//!     ]
//! );
//! ```

use std::collections::BTreeMap;

use log::debug;

use crate::aggregate::Aggregator;
use crate::aggregate::PartialAggregate;
use crate::value::Value;
use crate::value::ValueType;

/// Maximum number of categories a groupby stores.
pub const CATEGORY_LIMIT: usize = 1000;

/// Category key that can be rendered as one or more key columns.
pub trait GroupKey: Ord + Clone + Send {
    fn key_values(&self) -> Vec<Value>;
}

impl GroupKey for Value {
    fn key_values(&self) -> Vec<Value> {
        vec![self.clone()]
    }
}

impl GroupKey for (Value, Value) {
    fn key_values(&self) -> Vec<Value> {
        vec![self.0.clone(), self.1.clone()]
    }
}

/// Points seen for one category and the aggregator summarizing them.
#[derive(Debug, Clone, PartialEq)]
pub struct Group<A> {
    count: u64,
    aggregator: A,
}

impl<A> Group<A> {
    /// Returns the number of non-missing values routed to this category.
    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn aggregator(&self) -> &A {
        &self.aggregator
    }
}

/// Accumulating groupby.
#[derive(Debug, Clone)]
pub struct Groupby<K, A> {
    prototype: A,
    groups: BTreeMap<K, Group<A>>,
    limit: usize,
    omitted_count: u64,
    value_type: Option<ValueType>,
}

impl<K: Ord + Clone + Send, A: Aggregator> Groupby<K, A> {
    /// Creates a groupby storing up to [`CATEGORY_LIMIT`] categories.
    pub fn new(prototype: A) -> Self {
        Self::with_limit(prototype, CATEGORY_LIMIT)
    }

    /// Creates a groupby storing up to `limit` categories.
    ///
    /// # Panics
    ///
    /// Panics if `limit` is zero or larger than [`CATEGORY_LIMIT`].
    pub fn with_limit(prototype: A, limit: usize) -> Self {
        assert!(
            (1..=CATEGORY_LIMIT).contains(&limit),
            "category limit must be in [1, {CATEGORY_LIMIT}], got {limit}"
        );
        Self {
            prototype,
            groups: BTreeMap::new(),
            limit,
            omitted_count: 0,
            value_type: None,
        }
    }

    /// Returns an empty groupby with the same prototype and limit.
    pub fn new_instance(&self) -> Self {
        Self::with_limit(self.prototype.clone(), self.limit)
    }

    /// Routes `value` to the aggregator of `category`.
    ///
    /// Missing values are ignored. A point of a new category is dropped and counted in
    /// the omitted count once the category limit is reached.
    ///
    /// # Panics
    ///
    /// Panics if `value` has a different type than the values seen before.
    pub fn update(&mut self, category: K, value: &Value) {
        if value.is_undefined() {
            return;
        }
        check_value_type(&mut self.value_type, value.value_type());

        if let Some(group) = self.groups.get_mut(&category) {
            group.count += 1;
            group.aggregator.add_element(value);
        } else if self.groups.len() < self.limit {
            let mut aggregator = self.prototype.clone();
            aggregator.add_element(value);
            self.groups.insert(category, Group {
                count: 1,
                aggregator,
            });
        } else {
            if self.omitted_count == 0 {
                debug!("groupby reached its limit of {} categories", self.limit);
            }
            self.omitted_count += 1;
        }
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn omitted_count(&self) -> u64 {
        self.omitted_count
    }

    pub fn value_type(&self) -> Option<ValueType> {
        self.value_type
    }

    pub fn group(&self, category: &K) -> Option<&Group<A>> {
        self.groups.get(category)
    }

    /// Finalizes every category aggregator.
    pub fn partial_finalize(self) -> GroupbyResult<K, A::Partial> {
        let groups = self
            .groups
            .into_iter()
            .map(|(key, group)| {
                let aggregator = group.aggregator.partial_finalize();
                (key, Group {
                    count: group.count,
                    aggregator,
                })
            })
            .collect();
        GroupbyResult {
            groups,
            limit: self.limit,
            omitted_count: self.omitted_count,
            value_type: self.value_type,
        }
    }
}

/// Mergeable groupby holding finalized aggregates.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupbyResult<K, P> {
    groups: BTreeMap<K, Group<P>>,
    limit: usize,
    omitted_count: u64,
    value_type: Option<ValueType>,
}

impl<K: Ord + Clone + Send, P: PartialAggregate> GroupbyResult<K, P> {
    /// Creates an empty result storing up to `limit` categories.
    ///
    /// # Panics
    ///
    /// Panics if `limit` is zero or larger than [`CATEGORY_LIMIT`].
    pub fn with_limit(limit: usize) -> Self {
        assert!(
            (1..=CATEGORY_LIMIT).contains(&limit),
            "category limit must be in [1, {CATEGORY_LIMIT}], got {limit}"
        );
        Self {
            groups: BTreeMap::new(),
            limit,
            omitted_count: 0,
            value_type: None,
        }
    }

    /// Merges `other` into this result.
    ///
    /// Shared categories are combined. A category only present in `other` is adopted
    /// while there is room; otherwise all of its points are added to the omitted count.
    ///
    /// # Panics
    ///
    /// Panics if the two results hold values of different types.
    pub fn combine(&mut self, other: &Self) {
        if let Some(value_type) = other.value_type {
            check_value_type(&mut self.value_type, value_type);
        }
        for (key, group) in &other.groups {
            if let Some(mine) = self.groups.get_mut(key) {
                mine.count += group.count;
                mine.aggregator.combine(&group.aggregator);
            } else if self.groups.len() < self.limit {
                self.groups.insert(key.clone(), group.clone());
            } else {
                self.omitted_count += group.count;
            }
        }
        self.omitted_count += other.omitted_count;
    }

    /// Returns `(category, estimate)` pairs in category order.
    pub fn get_grouped(&self) -> Vec<(K, Value)> {
        self.groups
            .iter()
            .map(|(key, group)| (key.clone(), group.aggregator.emit()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn omitted_count(&self) -> u64 {
        self.omitted_count
    }

    pub fn value_type(&self) -> Option<ValueType> {
        self.value_type
    }

    /// Returns the number of points stored for `category`, 0 if absent.
    pub fn count(&self, category: &K) -> u64 {
        self.groups.get(category).map_or(0, |group| group.count)
    }

    pub fn group(&self, category: &K) -> Option<&Group<P>> {
        self.groups.get(category)
    }
}

fn check_value_type(current: &mut Option<ValueType>, incoming: ValueType) {
    match *current {
        None => *current = Some(incoming),
        Some(expected) => assert_eq!(
            expected, incoming,
            "groupby value type changed from {expected} to {incoming}"
        ),
    }
}
