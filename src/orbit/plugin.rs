//! Copyright © 2025-2026 Wenze Wei. All Rights Reserved.
//!
//! This file is part of Zi.
//! The Zi project belongs to the Dunimd project team.
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

//! Zi Plugin System - onboarding protocol for feature bundles.
//!
//! A plugin attaches itself to a running system in three phases driven by
//! [`ZiCPluginManager::ZiFAddPlugin`]:
//!
//! 1. `initialize` - the plugin receives the system handle
//! 2. `register_resources` - the plugin populates the component registry
//! 3. `start` - the plugin starts its long-running pieces
//!
//! Onboarded plugins are stopped in reverse registration order by
//! [`ZiCPluginManager::ZiFStopAll`].
//!
//! # Example
//!
//! ```ignore
//! use zi_runtime::orbit::plugin::ZiCPlugin;
//!
//! #[async_trait]
//! impl ZiCPlugin for MyPlugin {
//!     fn name(&self) -> &str { "my.plugin" }
//!     async fn initialize(&mut self, _ctx: &ZiCContext, system: Arc<ZiCSystem>) -> Result<()> {
//!         self.system = Some(system);
//!         Ok(())
//!     }
//!     // ...
//! }
//! ```

use std::fmt;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::context::ZiCContext;
use crate::errors::{Result, ZiError};
use crate::system::ZiCSystem;
use crate::zi_fields;

#[async_trait]
pub trait ZiCPlugin: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    /// The plugin may keep `system`; it is released when the plugin is
    /// dropped after `stop`.
    async fn initialize(&mut self, ctx: &ZiCContext, system: Arc<ZiCSystem>) -> Result<()>;

    /// Registers factories and components. Anything registered before a
    /// failure stays registered; undoing it is the plugin's own business.
    async fn register_resources(&mut self, ctx: &ZiCContext) -> Result<()>;

    async fn start(&mut self, ctx: &ZiCContext) -> Result<()>;

    async fn stop(&mut self, ctx: &ZiCContext) -> Result<()>;
}

/// Plugin lifecycle state
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZiCPluginState {
    Added,
    Initialized,
    ResourcesRegistered,
    Started,
    Stopped,
    StopFailed(String),
}

struct ZiCPluginEntry {
    name: String,
    state: ZiCPluginState,
    added_at: DateTime<Utc>,
    plugin: Option<Box<dyn ZiCPlugin>>,
}

/// Snapshot of one tracked plugin.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZiCPluginInfo {
    pub name: String,
    pub state: ZiCPluginState,
    pub added_at: DateTime<Utc>,
}

/// Tracks onboarded plugins in registration order. The list only grows.
#[derive(Default)]
pub struct ZiCPluginManager {
    entries: Mutex<Vec<ZiCPluginEntry>>,
}

impl fmt::Debug for ZiCPluginManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ZiCPluginManager")
            .field("plugins", &self.ZiFListPlugins())
            .finish()
    }
}

impl ZiCPluginManager {
    #[allow(non_snake_case)]
    pub fn ZiFNew() -> Self {
        Self::default()
    }

    /// Runs initialize, register_resources and start in that order. A failing
    /// phase aborts onboarding and the plugin is not tracked.
    #[allow(non_snake_case)]
    pub async fn ZiFAddPlugin(
        &self,
        ctx: &ZiCContext,
        system: Arc<ZiCSystem>,
        mut plugin: Box<dyn ZiCPlugin>,
    ) -> Result<()> {
        let name = plugin.name().to_string();
        let logger = system.ZiFLogger();
        let mut state = ZiCPluginState::Added;

        let onboarding = async {
            plugin
                .initialize(ctx, system.clone())
                .await
                .map_err(|err| ZiError::plugin(&name, "initialize", err))?;
            state = ZiCPluginState::Initialized;

            plugin
                .register_resources(ctx)
                .await
                .map_err(|err| ZiError::plugin(&name, "register_resources", err))?;
            state = ZiCPluginState::ResourcesRegistered;

            plugin
                .start(ctx)
                .await
                .map_err(|err| ZiError::plugin(&name, "start", err))?;
            state = ZiCPluginState::Started;
            Ok::<(), ZiError>(())
        };

        if let Err(err) = onboarding.await {
            logger.error(
                "plugin onboarding failed",
                zi_fields!("plugin" => name, "reached" => format!("{:?}", state), "error" => err.to_string()),
            );
            return Err(err);
        }

        let mut entries = self
            .entries
            .lock()
            .map_err(|_| ZiError::internal("plugin manager lock poisoned"))?;
        entries.push(ZiCPluginEntry {
            name: name.clone(),
            state: ZiCPluginState::Started,
            added_at: Utc::now(),
            plugin: Some(plugin),
        });
        logger.info("plugin started", zi_fields!("plugin" => name, "position" => entries.len()));
        Ok(())
    }

    /// Best-effort stop: every started plugin is stopped in reverse
    /// registration order even when an earlier stop fails; the first failure
    /// is returned. Stopped plugins are released, so calling this twice only
    /// stops each plugin once.
    #[allow(non_snake_case)]
    pub async fn ZiFStopAll(&self, ctx: &ZiCContext) -> Result<()> {
        let pending: Vec<(usize, String, Box<dyn ZiCPlugin>)> = {
            let mut entries = self
                .entries
                .lock()
                .map_err(|_| ZiError::internal("plugin manager lock poisoned"))?;
            entries
                .iter_mut()
                .enumerate()
                .rev()
                .filter_map(|(idx, entry)| entry.plugin.take().map(|p| (idx, entry.name.clone(), p)))
                .collect()
        };

        let mut first_error = None;
        let mut outcomes = Vec::with_capacity(pending.len());
        for (idx, name, mut plugin) in pending {
            let state = match plugin.stop(ctx).await {
                Ok(()) => {
                    log::info!("plugin '{}' stopped", name);
                    ZiCPluginState::Stopped
                }
                Err(err) => {
                    log::error!("plugin '{}' failed to stop: {}", name, err);
                    let state = ZiCPluginState::StopFailed(err.to_string());
                    if first_error.is_none() {
                        first_error = Some(ZiError::plugin(&name, "stop", err));
                    }
                    state
                }
            };
            outcomes.push((idx, state));
        }

        if let Ok(mut entries) = self.entries.lock() {
            for (idx, state) in outcomes {
                if let Some(entry) = entries.get_mut(idx) {
                    entry.state = state;
                }
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Tracked plugins in registration order.
    #[allow(non_snake_case)]
    pub fn ZiFListPlugins(&self) -> Vec<ZiCPluginInfo> {
        self.entries
            .lock()
            .map(|entries| {
                entries
                    .iter()
                    .map(|entry| ZiCPluginInfo {
                        name: entry.name.clone(),
                        state: entry.state.clone(),
                        added_at: entry.added_at,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    #[allow(non_snake_case)]
    pub fn ZiFPluginState(&self, name: &str) -> Option<ZiCPluginState> {
        self.ZiFListPlugins()
            .into_iter()
            .rev()
            .find(|info| info.name == name)
            .map(|info| info.state)
    }
}
