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

use std::ops::Range;

use log::debug;

use super::output::TransformationOutput;
use super::pool::ThreadPool;
use super::source::Source;

/// Number of rows processed by one call to [`Transformation::get`] unless configured.
pub const DEFAULT_BATCH_SIZE: usize = 100_000;

/// Running state of a transformation and the recipe for its worker-local state.
///
/// Every batch, the engine asks for one local aggregate per worker, feeds each worker's
/// slice of the batch into its local, then merges all locals back in worker order.
pub trait Aggregate: Send {
    /// Element consumed from the source.
    type Item: Send;
    /// Worker-local state.
    type Local: Send;

    /// Creates `n` empty locals seeded from the running state (e.g. its current range).
    fn split_input(&self, n: usize) -> Vec<Self::Local>;

    /// Feeds one element into a local.
    fn accumulate(local: &mut Self::Local, item: Self::Item);

    /// Merges the locals, in worker order, into the running state.
    fn merge_results(&mut self, locals: Vec<Self::Local>);

    /// Returns a snapshot of the running state.
    fn output(&self) -> TransformationOutput;
}

/// Drives an [`Aggregate`] over a [`Source`] one batch at a time.
///
/// # Usage
///
/// ```rust
/// # use streamviz::transformation::{Column, HistogramTransform, Transformation};
/// # use streamviz::value::ValueType;
/// let column: Column = (0..1000).map(f64::from).collect();
/// let mut transformation = Transformation::new(HistogramTransform::new(ValueType::Float))
///     .with_batch_size(300);
/// transformation.init(column);
///
/// let mut steps = 0;
/// while !transformation.eof() {
///     transformation.get();
///     steps += 1;
/// }
/// assert_eq!(steps, 4);
/// assert_eq!(transformation.get_percent_complete(), 1.0);
/// let histogram = transformation.get().into_histogram().unwrap();
/// assert_eq!(histogram.total_count(), 1000);
/// ```
#[derive(Debug)]
pub struct Transformation<S, A> {
    source: Option<S>,
    aggregate: A,
    cursor: usize,
    batch_size: usize,
    pool: ThreadPool,
}

impl<S, A> Transformation<S, A>
where
    S: Source,
    A: Aggregate<Item = S::Item>,
{
    pub fn new(aggregate: A) -> Self {
        Self {
            source: None,
            aggregate,
            cursor: 0,
            batch_size: DEFAULT_BATCH_SIZE,
            pool: ThreadPool::global(),
        }
    }

    /// Sets the number of rows processed per [`get`](Self::get).
    ///
    /// # Panics
    ///
    /// Panics if `batch_size` is zero.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        assert!(batch_size > 0, "batch size must be positive");
        self.batch_size = batch_size;
        self
    }

    pub fn with_thread_pool(mut self, pool: ThreadPool) -> Self {
        self.pool = pool;
        self
    }

    /// Binds the source to stream.
    ///
    /// # Panics
    ///
    /// Panics if the transformation was already initialized.
    pub fn init(&mut self, source: S) {
        assert!(
            self.source.is_none(),
            "transformation is already initialized"
        );
        debug!(
            "streaming {} rows in batches of {} on {} workers",
            source.len(),
            self.batch_size,
            self.pool.size()
        );
        self.source = Some(source);
        self.cursor = 0;
    }

    /// Processes the next batch and returns a snapshot of the result so far.
    ///
    /// Once every row has been processed, returns the final snapshot without doing work.
    ///
    /// # Panics
    ///
    /// Panics if the transformation was not initialized.
    pub fn get(&mut self) -> TransformationOutput {
        let source = self.source();
        let total = source.len();
        if self.cursor < total {
            let batch_end = total.min(self.cursor.saturating_add(self.batch_size));
            let ranges = partition(self.cursor..batch_end, self.pool.size());
            let locals = self.aggregate.split_input(ranges.len());
            let states: Vec<_> = locals.into_iter().zip(ranges).collect();
            let locals = self.pool.in_parallel(states, |_, _, (mut local, range)| {
                for item in source.range_iter(range.start, range.end) {
                    A::accumulate(&mut local, item);
                }
                local
            });
            self.aggregate.merge_results(locals);
            debug!(
                "processed rows [{}, {}) of {total}",
                self.cursor, batch_end
            );
            self.cursor = batch_end;
        }
        self.aggregate.output()
    }

    /// Returns true once every row has been processed.
    ///
    /// # Panics
    ///
    /// Panics if the transformation was not initialized.
    pub fn eof(&self) -> bool {
        self.cursor == self.source().len()
    }

    /// # Panics
    ///
    /// Panics if the transformation was not initialized.
    pub fn get_rows_processed(&self) -> usize {
        self.source();
        self.cursor
    }

    /// # Panics
    ///
    /// Panics if the transformation was not initialized.
    pub fn get_total_rows(&self) -> usize {
        self.source().len()
    }

    /// Returns the processed fraction in `[0, 1]`; an empty source is complete.
    ///
    /// # Panics
    ///
    /// Panics if the transformation was not initialized.
    pub fn get_percent_complete(&self) -> f64 {
        let source = self.source();
        if source.is_empty() {
            1.0
        } else {
            self.cursor as f64 / source.len() as f64
        }
    }

    pub fn aggregate(&self) -> &A {
        &self.aggregate
    }

    fn source(&self) -> &S {
        match &self.source {
            Some(source) => source,
            None => panic!("transformation is not initialized"),
        }
    }
}

/// Splits `rows` into at most `n` contiguous ranges; the last one absorbs the remainder.
fn partition(rows: Range<usize>, n: usize) -> Vec<Range<usize>> {
    let len = rows.len();
    let n = n.clamp(1, len.max(1));
    let chunk = len / n;
    (0..n)
        .map(|i| {
            let start = rows.start + i * chunk;
            let end = if i + 1 == n { rows.end } else { start + chunk };
            start..end
        })
        .collect()
}
