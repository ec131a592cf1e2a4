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

//! Schedules attached to processes. Nothing in the runtime advances them;
//! a driver can consult [`ZiCScheduledETLProcess::ZiFNextRun`].

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use crate::errors::{Result, ZiError};
use crate::process::record::ZiCETLProcess;

pub trait ZiCSchedule: Send + Sync + fmt::Debug {
    /// First run strictly after `after`, or `None` when exhausted.
    fn next(&self, after: DateTime<Utc>) -> Option<DateTime<Utc>>;
}

/// Fires every `interval` starting at `anchor`.
#[derive(Clone, Debug)]
pub struct ZiCIntervalSchedule {
    anchor: DateTime<Utc>,
    interval: Duration,
}

impl ZiCIntervalSchedule {
    #[allow(non_snake_case)]
    pub fn ZiFNew(anchor: DateTime<Utc>, interval: Duration) -> Result<Self> {
        if interval.num_milliseconds() <= 0 {
            return Err(ZiError::validation("schedule interval must be at least one millisecond"));
        }
        Ok(Self { anchor, interval })
    }
}

impl ZiCSchedule for ZiCIntervalSchedule {
    fn next(&self, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
        if after < self.anchor {
            return Some(self.anchor);
        }
        let step = self.interval.num_milliseconds();
        let elapsed = (after - self.anchor).num_milliseconds();
        let periods = elapsed / step + 1;
        self.anchor
            .checked_add_signed(Duration::milliseconds(periods.checked_mul(step)?))
    }
}

#[derive(Clone, Debug)]
pub struct ZiCScheduledETLProcess {
    pub process: Arc<ZiCETLProcess>,
    pub schedule: Arc<dyn ZiCSchedule>,
}

impl ZiCScheduledETLProcess {
    #[allow(non_snake_case)]
    pub fn ZiFNextRun(&self, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.schedule.next(after)
    }
}
