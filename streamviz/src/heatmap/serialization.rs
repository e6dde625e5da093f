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

//! Binary layout of heatmap snapshots.
//!
//! Heatmaps are mostly empty, so only nonzero cells are written.
//!
//! ```text
//! byte 0      family id
//! byte 1      serial version
//! byte 2      flags
//! byte 3      reserved
//! bytes 4-5   bins per axis (u16)
//! then        x scale, y scale min/max (f64)      if FLAG_HAS_SCALE
//! then        x observed, y observed (f64)        if FLAG_HAS_OBSERVED
//! then        nonzero cell count (u32)            if FLAG_HAS_SCALE
//! then        (cell index u32, count u64) pairs
//! ```

pub(super) const SERIAL_VERSION: u8 = 1;
pub(super) const PREAMBLE_BYTES: usize = 6;

pub(super) const FLAG_HAS_SCALE: u8 = 1 << 0;
pub(super) const FLAG_HAS_OBSERVED: u8 = 1 << 1;
