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

//! Composition root handed to plugins and components.
//!
//! One `ZiCSystem` is created per application run and shared as
//! `Arc<ZiCSystem>`; there is no process-wide singleton.

use std::sync::Arc;

use serde_json::Value;

use crate::config::ZiCConfiguration;
use crate::context::ZiCContext;
use crate::dispatch::ZiCOperationDispatcher;
use crate::errors::Result;
use crate::events::{ZiCEventBus, ZiCInMemoryEventBus};
use crate::log::{ZiCFacadeLogger, ZiCLogger};
use crate::orbit::plugin::{ZiCPlugin, ZiCPluginManager};
use crate::registry::ZiCComponentRegistry;

pub struct ZiCSystem {
    logger: Arc<dyn ZiCLogger>,
    event_bus: Arc<dyn ZiCEventBus>,
    configuration: ZiCConfiguration,
    registry: Arc<ZiCComponentRegistry>,
    plugins: ZiCPluginManager,
    dispatcher: ZiCOperationDispatcher,
}

impl std::fmt::Debug for ZiCSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZiCSystem")
            .field("configuration", &self.configuration)
            .field("registry", &self.registry)
            .field("plugins", &self.plugins)
            .finish()
    }
}

impl ZiCSystem {
    #[allow(non_snake_case)]
    pub fn ZiFNew(
        logger: Arc<dyn ZiCLogger>,
        event_bus: Arc<dyn ZiCEventBus>,
        configuration: ZiCConfiguration,
    ) -> Arc<Self> {
        let registry = Arc::new(ZiCComponentRegistry::ZiFNew());
        Arc::new(Self {
            logger,
            event_bus,
            configuration,
            dispatcher: ZiCOperationDispatcher::ZiFNew(registry.clone()),
            registry,
            plugins: ZiCPluginManager::ZiFNew(),
        })
    }

    #[allow(non_snake_case)]
    pub fn ZiFBuilder() -> ZiCSystemBuilder {
        ZiCSystemBuilder::default()
    }

    #[allow(non_snake_case)]
    pub fn ZiFLogger(&self) -> Arc<dyn ZiCLogger> {
        self.logger.clone()
    }

    #[allow(non_snake_case)]
    pub fn ZiFEventBus(&self) -> Arc<dyn ZiCEventBus> {
        self.event_bus.clone()
    }

    #[allow(non_snake_case)]
    pub fn ZiFConfiguration(&self) -> &ZiCConfiguration {
        &self.configuration
    }

    #[allow(non_snake_case)]
    pub fn ZiFComponentRegistry(&self) -> &Arc<ZiCComponentRegistry> {
        &self.registry
    }

    #[allow(non_snake_case)]
    pub fn ZiFPluginManager(&self) -> &ZiCPluginManager {
        &self.plugins
    }

    /// Resolves `operation_id` through the registry and executes it.
    #[allow(non_snake_case)]
    pub async fn ZiFExecuteOperation(&self, ctx: &ZiCContext, operation_id: &str, data: Value) -> Result<Value> {
        self.dispatcher.ZiFExecute(ctx, operation_id, data).await
    }

    /// Onboards `plugin` against this system.
    #[allow(non_snake_case)]
    pub async fn ZiFAddPlugin(self: &Arc<Self>, ctx: &ZiCContext, plugin: Box<dyn ZiCPlugin>) -> Result<()> {
        self.plugins.ZiFAddPlugin(ctx, self.clone(), plugin).await
    }

    /// Stops every onboarded plugin in reverse order.
    #[allow(non_snake_case)]
    pub async fn ZiFShutdown(&self, ctx: &ZiCContext) -> Result<()> {
        self.plugins.ZiFStopAll(ctx).await
    }
}

/// Builder filling in the default collaborators.
#[derive(Default)]
pub struct ZiCSystemBuilder {
    logger: Option<Arc<dyn ZiCLogger>>,
    event_bus: Option<Arc<dyn ZiCEventBus>>,
    configuration: Option<ZiCConfiguration>,
}

impl ZiCSystemBuilder {
    #[allow(non_snake_case)]
    pub fn ZiFLogger(mut self, logger: Arc<dyn ZiCLogger>) -> Self {
        self.logger = Some(logger);
        self
    }

    #[allow(non_snake_case)]
    pub fn ZiFEventBus(mut self, event_bus: Arc<dyn ZiCEventBus>) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    #[allow(non_snake_case)]
    pub fn ZiFConfiguration(mut self, configuration: ZiCConfiguration) -> Self {
        self.configuration = Some(configuration);
        self
    }

    #[allow(non_snake_case)]
    pub fn ZiFBuild(self) -> Arc<ZiCSystem> {
        ZiCSystem::ZiFNew(
            self.logger
                .unwrap_or_else(|| Arc::new(ZiCFacadeLogger::default())),
            self.event_bus
                .unwrap_or_else(|| Arc::new(ZiCInMemoryEventBus::ZiFNew())),
            self.configuration.unwrap_or_default(),
        )
    }
}
