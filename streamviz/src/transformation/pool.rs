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

use rayon::prelude::*;

use crate::error::Error;
use crate::error::ErrorKind;

/// Fork/join worker pool that runs the parallel phase of every batch.
///
/// Cloning a pool shares its workers.
#[derive(Debug, Clone, Default)]
pub struct ThreadPool {
    dedicated: Option<Arc<rayon::ThreadPool>>,
}

impl ThreadPool {
    /// The process-wide rayon pool, sized to the available hardware concurrency.
    pub fn global() -> Self {
        Self { dedicated: None }
    }

    /// A dedicated pool of `num_threads` workers.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidArgument`] if `num_threads` is zero, or
    /// [`ErrorKind::ThreadPoolUnavailable`] if the workers cannot be spawned.
    pub fn with_threads(num_threads: usize) -> Result<Self, Error> {
        if num_threads == 0 {
            return Err(Error::invalid_argument("a thread pool needs at least one thread"));
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .thread_name(|index| format!("streamviz-worker-{index}"))
            .build()
            .map_err(|e| {
                Error::new(ErrorKind::ThreadPoolUnavailable, "failed to build thread pool")
                    .with_context("num_threads", num_threads)
                    .set_source(e)
            })?;
        Ok(Self {
            dedicated: Some(Arc::new(pool)),
        })
    }

    /// Returns the number of workers.
    pub fn size(&self) -> usize {
        match &self.dedicated {
            Some(pool) => pool.current_num_threads(),
            None => rayon::current_num_threads(),
        }
    }

    /// Calls `f(thread_index, thread_count, state)` once per state and waits for all calls.
    ///
    /// Results are returned in state order.
    pub fn in_parallel<T, R, F>(&self, states: Vec<T>, f: F) -> Vec<R>
    where
        T: Send,
        R: Send,
        F: Fn(usize, usize, T) -> R + Sync,
    {
        let thread_count = states.len();
        let run = || -> Vec<R> {
            states
                .into_par_iter()
                .enumerate()
                .map(|(index, state)| f(index, thread_count, state))
                .collect()
        };
        match &self.dedicated {
            Some(pool) => pool.install(run),
            None => run(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_parallel_keeps_state_order() {
        let pool = ThreadPool::with_threads(3).unwrap();
        assert_eq!(pool.size(), 3);
        let results = pool.in_parallel((0..8).collect(), |index, count, state: u64| {
            assert_eq!(count, 8);
            (index, state * state)
        });
        let expected: Vec<(usize, u64)> = (0..8).map(|i| (i as usize, i * i)).collect();
        assert_eq!(results, expected);
    }

    #[test]
    fn test_zero_threads_is_rejected() {
        let err = ThreadPool::with_threads(0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }
}
