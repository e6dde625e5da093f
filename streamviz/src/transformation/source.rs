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

use std::sync::Arc;

use crate::value::Value;

/// Random-access input of a [`Transformation`](super::Transformation).
///
/// Sources are read concurrently by every worker of a batch and must not change while a
/// transformation is streaming them.
pub trait Source: Sync {
    /// One element handed to an aggregate.
    type Item: Send;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the element at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    fn get(&self, index: usize) -> Self::Item;

    /// Iterates the elements in `[start, end)`.
    ///
    /// # Panics
    ///
    /// Panics if `start > end` or `end > len()`.
    fn range_iter(&self, start: usize, end: usize) -> RangeIter<'_, Self>
    where
        Self: Sized,
    {
        assert!(
            start <= end && end <= self.len(),
            "range [{start}, {end}) is out of bounds for a source of length {}",
            self.len()
        );
        RangeIter {
            source: self,
            next: start,
            end,
        }
    }
}

/// Iterator over a contiguous range of a [`Source`].
#[derive(Debug)]
pub struct RangeIter<'a, S> {
    source: &'a S,
    next: usize,
    end: usize,
}

impl<S: Source> Iterator for RangeIter<'_, S> {
    type Item = S::Item;

    fn next(&mut self) -> Option<S::Item> {
        if self.next == self.end {
            return None;
        }
        let item = self.source.get(self.next);
        self.next += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.end - self.next;
        (remaining, Some(remaining))
    }
}

impl<S: Source> ExactSizeIterator for RangeIter<'_, S> {}

/// A single column of values.
///
/// Cloning a column shares its storage.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Column {
    values: Arc<[Value]>,
}

impl Column {
    pub fn new(values: Vec<Value>) -> Self {
        Self {
            values: values.into(),
        }
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }
}

impl From<Vec<Value>> for Column {
    fn from(values: Vec<Value>) -> Self {
        Column::new(values)
    }
}

impl<V: Into<Value>> FromIterator<V> for Column {
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        Column::new(iter.into_iter().map(Into::into).collect())
    }
}

impl Source for Column {
    type Item = Value;

    fn len(&self) -> usize {
        self.values.len()
    }

    fn get(&self, index: usize) -> Value {
        self.values[index].clone()
    }
}

/// Two columns of equal length read row by row, e.g. the axes of a heatmap.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnPair {
    x: Column,
    y: Column,
}

impl ColumnPair {
    /// # Panics
    ///
    /// Panics if the columns differ in length.
    pub fn new(x: Column, y: Column) -> Self {
        assert_eq!(
            x.len(),
            y.len(),
            "paired columns must have the same length"
        );
        Self { x, y }
    }
}

impl Source for ColumnPair {
    type Item = (Value, Value);

    fn len(&self) -> usize {
        self.x.len()
    }

    fn get(&self, index: usize) -> (Value, Value) {
        (self.x.get(index), self.y.get(index))
    }
}

/// Columns of equal length read as rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
}

impl Table {
    /// # Panics
    ///
    /// Panics if the columns differ in length.
    pub fn new(columns: Vec<Column>) -> Self {
        if let Some(first) = columns.first() {
            assert!(
                columns.iter().all(|c| c.len() == first.len()),
                "table columns must have the same length"
            );
        }
        Self { columns }
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn column(&self, index: usize) -> &Column {
        &self.columns[index]
    }
}

impl Source for Table {
    type Item = Vec<Value>;

    fn len(&self) -> usize {
        self.columns.first().map_or(0, Column::len)
    }

    fn get(&self, index: usize) -> Vec<Value> {
        self.columns.iter().map(|c| c.get(index)).collect()
    }
}
