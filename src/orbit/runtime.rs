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

//! # ZiOrbit Runtime Plugin
//!
//! The plugin that installs the runtime's own operations. It owns the
//! [`ZiCProcessManager`] and registers the process and service operations
//! listed in [`crate::operations`].
//!
//! ## Lifecycle
//!
//! - **initialize**: keeps the system handle and builds the process manager
//! - **register_resources**: registers both operation factories, then one
//!   operation component per action
//! - **start**: starts the services named in the system configuration's
//!   `custom_config.autostart_services`; if one fails, the services already
//!   started are stopped again in reverse order
//! - **stop**: stops every running process, then the autostarted services in
//!   reverse order, then releases the manager
//!
//! Operations only hold weak references, so once the plugin has been stopped
//! and dropped nothing keeps the manager or the system alive.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::config::ZiCComponentConfig;
use crate::context::ZiCContext;
use crate::errors::{Result, ZiError};
use crate::id::{ZiCIdGenerator, ZiCRandomIdGenerator};
use crate::operations::{
    ZiCProcessAction, ZiCServiceAction, ZiFProcessOperationFactory, ZiFServiceOperationFactory,
    ZI_FACTORY_PROCESS_OPERATION, ZI_FACTORY_SERVICE_OPERATION,
};
use crate::orbit::plugin::ZiCPlugin;
use crate::process::{ZiCProcessManager, ZiCProcessStatus};
use crate::system::ZiCSystem;
use crate::zi_fields;

pub const ZI_RUNTIME_PLUGIN_NAME: &str = "zi.runtime";

#[derive(Debug)]
pub struct ZiCRuntimePlugin {
    id_generator: Arc<dyn ZiCIdGenerator>,
    system: Option<Arc<ZiCSystem>>,
    manager: Option<Arc<ZiCProcessManager>>,
    started_services: Vec<String>,
}

impl Default for ZiCRuntimePlugin {
    fn default() -> Self {
        Self::ZiFNew(Arc::new(ZiCRandomIdGenerator::default()))
    }
}

impl ZiCRuntimePlugin {
    #[allow(non_snake_case)]
    pub fn ZiFNew(id_generator: Arc<dyn ZiCIdGenerator>) -> Self {
        Self {
            id_generator,
            system: None,
            manager: None,
            started_services: Vec::new(),
        }
    }

    /// The process manager, available between `initialize` and `stop`.
    #[allow(non_snake_case)]
    pub fn ZiFProcessManager(&self) -> Option<Arc<ZiCProcessManager>> {
        self.manager.clone()
    }

    fn system(&self) -> Result<&Arc<ZiCSystem>> {
        self.system
            .as_ref()
            .ok_or_else(|| ZiError::internal("runtime plugin used before initialize"))
    }

    fn autostart_services(system: &ZiCSystem) -> Vec<String> {
        system
            .ZiFConfiguration()
            .custom_config
            .get("autostart_services")
            .and_then(Value::as_array)
            .map(|ids| {
                ids.iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Stops the autostarted services in reverse start order, continuing past
    /// failures. Returns the first error.
    async fn stop_started_services(&mut self, ctx: &ZiCContext, system: &ZiCSystem) -> Option<ZiError> {
        let mut first_error = None;
        while let Some(service_id) = self.started_services.pop() {
            let stopped = match system.ZiFComponentRegistry().ZiFGetService(&service_id) {
                Ok(service) => service.stop(ctx).await,
                Err(err) => Err(err),
            };
            if let Err(err) = stopped {
                first_error.get_or_insert(err);
            }
        }
        first_error
    }
}

#[async_trait]
impl ZiCPlugin for ZiCRuntimePlugin {
    fn name(&self) -> &str {
        ZI_RUNTIME_PLUGIN_NAME
    }

    async fn initialize(&mut self, _ctx: &ZiCContext, system: Arc<ZiCSystem>) -> Result<()> {
        self.manager = Some(Arc::new(ZiCProcessManager::ZiFNew(
            system.clone(),
            self.id_generator.clone(),
        )));
        self.system = Some(system);
        Ok(())
    }

    async fn register_resources(&mut self, _ctx: &ZiCContext) -> Result<()> {
        let system = self.system()?.clone();
        let manager = self
            .manager
            .as_ref()
            .ok_or_else(|| ZiError::internal("runtime plugin used before initialize"))?;
        let registry = system.ZiFComponentRegistry();

        registry.ZiFRegisterFactory(
            ZI_FACTORY_PROCESS_OPERATION,
            ZiFProcessOperationFactory(Arc::downgrade(manager)),
        )?;
        registry.ZiFRegisterFactory(
            ZI_FACTORY_SERVICE_OPERATION,
            ZiFServiceOperationFactory(Arc::downgrade(registry)),
        )?;

        for action in ZiCProcessAction::ALL {
            let config = ZiCComponentConfig::ZiFNew(
                action.operation_id(),
                action.operation_id(),
                ZI_FACTORY_PROCESS_OPERATION,
            )
            .ZiFWithDescription(format!("{} an ETL process", action.as_str()))
            .ZiFWithCustom("action", Value::from(action.as_str()));
            registry.ZiFCreateComponent(&config)?;
        }
        for action in ZiCServiceAction::ALL {
            let config = ZiCComponentConfig::ZiFNew(
                action.operation_id(),
                action.operation_id(),
                ZI_FACTORY_SERVICE_OPERATION,
            )
            .ZiFWithDescription(format!("{} a registered service", action.as_str()))
            .ZiFWithCustom("action", Value::from(action.as_str()));
            registry.ZiFCreateComponent(&config)?;
        }
        Ok(())
    }

    async fn start(&mut self, ctx: &ZiCContext) -> Result<()> {
        let system = self.system()?.clone();
        for service_id in Self::autostart_services(&system) {
            let started = match system.ZiFComponentRegistry().ZiFGetService(&service_id) {
                Ok(service) => service.start(ctx).await,
                Err(err) => Err(err),
            };
            if let Err(err) = started {
                system.ZiFLogger().warn(
                    "service autostart failed, stopping started services",
                    zi_fields!(
                        "service_id" => service_id,
                        "rolled_back" => self.started_services.len(),
                        "error" => err.to_string()
                    ),
                );
                if let Some(rollback_err) = self.stop_started_services(ctx, &system).await {
                    log::warn!("rollback stop of autostarted services failed: {}", rollback_err);
                }
                return Err(err);
            }
            system
                .ZiFLogger()
                .info("service started", zi_fields!("service_id" => service_id));
            self.started_services.push(service_id);
        }
        Ok(())
    }

    async fn stop(&mut self, ctx: &ZiCContext) -> Result<()> {
        let system = self.system()?.clone();
        let mut first_error = None;

        if let Some(manager) = self.manager.take() {
            match manager.ZiFGetAllProcesses() {
                Ok(processes) => {
                    for process in processes {
                        if process.ZiFStatus() != ZiCProcessStatus::Running {
                            continue;
                        }
                        if let Err(err) = manager.ZiFStopProcess(ctx, process.ZiFId()).await {
                            first_error.get_or_insert(err);
                        }
                    }
                }
                Err(err) => {
                    first_error.get_or_insert(err);
                }
            }
        }

        if let Some(err) = self.stop_started_services(ctx, &system).await {
            first_error.get_or_insert(err);
        }

        self.system = None;
        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}
