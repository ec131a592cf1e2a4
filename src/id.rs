//! Copyright © 2025-2026 Wenze Wei. All Rights Reserved.
//!
//! This file is part of Zi.
//! The Zi project belongs to the Dunimd Team.
//!
//! Licensed under the Apache License, Version 2.0 (the "License");
//! You may not use this file except in compliance with the License.
//! You may obtain a copy of the License at
//!
//!     http://www.apache.org/licenses/LICENSE-2.0
//!
//! Unless required by applicable law or agreed to in writing, software
//! distributed under the License is distributed on an "AS IS" BASIS,
//! WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//! See the License for the specific language governing permissions and
//! limitations under the License.

//! Identifier generators used for process IDs.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use rand::RngCore;

use crate::errors::{Result, ZiError};

/// Produces unique identifiers. Implementations fail on invalid
/// configuration instead of handing out an empty ID.
pub trait ZiCIdGenerator: Send + Sync + fmt::Debug {
    fn generate_id(&self) -> Result<String>;
}

/// `prefix` followed by `byte_len` random bytes in hex.
#[derive(Clone, Debug)]
pub struct ZiCRandomIdGenerator {
    prefix: String,
    byte_len: usize,
}

impl ZiCRandomIdGenerator {
    #[allow(non_snake_case)]
    pub fn ZiFNew(prefix: impl Into<String>, byte_len: usize) -> Self {
        Self {
            prefix: prefix.into(),
            byte_len,
        }
    }
}

impl Default for ZiCRandomIdGenerator {
    fn default() -> Self {
        Self::ZiFNew("etl-", 8)
    }
}

impl ZiCIdGenerator for ZiCRandomIdGenerator {
    fn generate_id(&self) -> Result<String> {
        if self.byte_len == 0 {
            return Err(ZiError::id_generation("random id length must be greater than zero"));
        }
        let mut bytes = vec![0u8; self.byte_len];
        rand::thread_rng().fill_bytes(&mut bytes);
        Ok(format!("{}{}", self.prefix, hex::encode(bytes)))
    }
}

/// `prefix` followed by a monotonically increasing counter starting at 1.
#[derive(Debug)]
pub struct ZiCSequentialIdGenerator {
    prefix: String,
    counter: AtomicU64,
}

impl ZiCSequentialIdGenerator {
    #[allow(non_snake_case)]
    pub fn ZiFNew(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            counter: AtomicU64::new(0),
        }
    }
}

impl ZiCIdGenerator for ZiCSequentialIdGenerator {
    fn generate_id(&self) -> Result<String> {
        if self.prefix.is_empty() {
            return Err(ZiError::id_generation("sequential id prefix must not be empty"));
        }
        let next = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        Ok(format!("{}{}", self.prefix, next))
    }
}
