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

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::component::ZiCComponent;
use crate::config::ZiCETLProcessConfig;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZiCProcessStatus {
    Uninitialized,
    Initialized,
    Running,
    Stopped,
    Failed(String),
}

impl ZiCProcessStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ZiCProcessStatus::Uninitialized => "uninitialized",
            ZiCProcessStatus::Initialized => "initialized",
            ZiCProcessStatus::Running => "running",
            ZiCProcessStatus::Stopped => "stopped",
            ZiCProcessStatus::Failed(_) => "failed",
        }
    }
}

/// A fully initialized ETL process owned by the process manager.
///
/// Callers receive `Arc<ZiCETLProcess>` references; the status is only moved
/// by the manager.
pub struct ZiCETLProcess {
    id: String,
    config: ZiCETLProcessConfig,
    components: HashMap<String, Arc<dyn ZiCComponent>>,
    status: RwLock<ZiCProcessStatus>,
    created_at: DateTime<Utc>,
    /// Insertion order within the owning manager.
    seq: u64,
    /// Serializes lifecycle calls on this process.
    pub(crate) lifecycle: tokio::sync::Mutex<()>,
}

impl fmt::Debug for ZiCETLProcess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ZiCETLProcess")
            .field("id", &self.id)
            .field("status", &self.ZiFStatus())
            .field("components", &self.ZiFComponentNames())
            .finish()
    }
}

impl ZiCETLProcess {
    pub(crate) fn new(
        id: String,
        config: ZiCETLProcessConfig,
        components: HashMap<String, Arc<dyn ZiCComponent>>,
        seq: u64,
    ) -> Self {
        Self {
            id,
            config,
            components,
            status: RwLock::new(ZiCProcessStatus::Initialized),
            created_at: Utc::now(),
            seq,
            lifecycle: tokio::sync::Mutex::new(()),
        }
    }

    #[allow(non_snake_case)]
    pub fn ZiFId(&self) -> &str {
        &self.id
    }

    #[allow(non_snake_case)]
    pub fn ZiFConfig(&self) -> &ZiCETLProcessConfig {
        &self.config
    }

    #[allow(non_snake_case)]
    pub fn ZiFStatus(&self) -> ZiCProcessStatus {
        // A poisoned lock still holds the last status written.
        match self.status.read() {
            Ok(status) => status.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub(crate) fn set_status(&self, status: ZiCProcessStatus) {
        let mut current = self
            .status
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *current = status;
    }

    pub(crate) fn seq(&self) -> u64 {
        self.seq
    }

    #[allow(non_snake_case)]
    pub fn ZiFCreatedAt(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Component by its declared name.
    #[allow(non_snake_case)]
    pub fn ZiFComponent(&self, name: &str) -> Option<Arc<dyn ZiCComponent>> {
        self.components.get(name).cloned()
    }

    /// Component names in declaration order.
    #[allow(non_snake_case)]
    pub fn ZiFComponentNames(&self) -> Vec<String> {
        self.config
            .components
            .iter()
            .map(|c| c.name.clone())
            .collect()
    }

    /// Components paired with their names, in declaration order.
    pub(crate) fn ordered_components(&self) -> Vec<(String, Arc<dyn ZiCComponent>)> {
        self.config
            .components
            .iter()
            .filter_map(|c| {
                self.components
                    .get(&c.name)
                    .map(|component| (c.name.clone(), component.clone()))
            })
            .collect()
    }

    #[allow(non_snake_case)]
    pub fn ZiFSnapshot(&self) -> ZiCProcessSnapshot {
        let status = self.ZiFStatus();
        let failure = match &status {
            ZiCProcessStatus::Failed(reason) => Some(reason.clone()),
            _ => None,
        };
        ZiCProcessSnapshot {
            id: self.id.clone(),
            status: status.as_str().to_string(),
            failure,
            components: self.ZiFComponentNames(),
            created_at: self.created_at,
        }
    }
}

/// Serializable view of a process, returned by the process operations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZiCProcessSnapshot {
    pub id: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
    pub components: Vec<String>,
    pub created_at: DateTime<Utc>,
}
