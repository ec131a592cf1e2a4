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

//! # ETL Process Manager
//!
//! Builds processes out of registry factories and drives their lifecycle:
//!
//! ```text
//! Initialized --start--> Running --stop--> Stopped --start--> Running
//!      |                    |
//!      +------ mark_failed -+--> Failed
//! ```
//!
//! `Failed` is terminal: start and restart reject it, and the only way out
//! is to remove the process and initialize a new one.
//!
//! ## Rollback
//!
//! - Initialization failure: components created so far are stopped in
//!   creation order and the process is never recorded.
//! - Start failure: components started by this call are stopped in reverse
//!   order and the status stays where it was.
//! - Stop failure: the loop aborts and the status is left untouched; there is
//!   no intermediate "stop failed" status.
//!
//! Rollback stops are best effort and their errors are only logged. The
//! process map lock is never held while a component runs. Lifecycle calls on
//! one process, including `mark_failed`, are serialized by its own lock.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use serde_json::json;

use crate::component::ZiCComponent;
use crate::config::{ZiCComponentConfig, ZiCETLProcessConfig};
use crate::context::ZiCContext;
use crate::errors::{Result, ZiError};
use crate::events::{
    ZiCEvent, ZI_TOPIC_PROCESS_FAILED, ZI_TOPIC_PROCESS_INITIALIZED, ZI_TOPIC_PROCESS_REMOVED,
    ZI_TOPIC_PROCESS_STARTED, ZI_TOPIC_PROCESS_STOPPED,
};
use crate::id::{ZiCIdGenerator, ZiCRandomIdGenerator};
use crate::process::record::{ZiCETLProcess, ZiCProcessStatus};
use crate::process::schedule::{ZiCSchedule, ZiCScheduledETLProcess};
use crate::system::ZiCSystem;
use crate::zi_fields;

pub struct ZiCProcessManager {
    system: Arc<ZiCSystem>,
    id_generator: Arc<dyn ZiCIdGenerator>,
    processes: Mutex<HashMap<String, Arc<ZiCETLProcess>>>,
    next_seq: AtomicU64,
}

impl std::fmt::Debug for ZiCProcessManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let ids: Vec<String> = self
            .lock()
            .map(|processes| processes.keys().cloned().collect())
            .unwrap_or_default();
        f.debug_struct("ZiCProcessManager")
            .field("processes", &ids)
            .finish()
    }
}

impl ZiCProcessManager {
    #[allow(non_snake_case)]
    pub fn ZiFNew(system: Arc<ZiCSystem>, id_generator: Arc<dyn ZiCIdGenerator>) -> Self {
        Self {
            system,
            id_generator,
            processes: Mutex::new(HashMap::new()),
            next_seq: AtomicU64::new(1),
        }
    }

    /// Manager with the default random process IDs (`etl-<16 hex>`).
    #[allow(non_snake_case)]
    pub fn ZiFWithDefaults(system: Arc<ZiCSystem>) -> Self {
        Self::ZiFNew(system, Arc::new(ZiCRandomIdGenerator::default()))
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, Arc<ZiCETLProcess>>>> {
        self.processes
            .lock()
            .map_err(|_| ZiError::internal("process map lock poisoned"))
    }

    fn publish(&self, topic: &str, process: &ZiCETLProcess) {
        let payload = json!({
            "process_id": process.ZiFId(),
            "status": process.ZiFStatus().as_str(),
        });
        self.system.ZiFEventBus().publish(ZiCEvent::ZiFNew(topic, payload));
    }

    /// Builds and initializes every declared component, then records the
    /// process as `Initialized`.
    #[allow(non_snake_case)]
    pub async fn ZiFInitializeProcess(
        &self,
        ctx: &ZiCContext,
        config: ZiCETLProcessConfig,
    ) -> Result<Arc<ZiCETLProcess>> {
        config.ZiFValidate()?;
        ctx.ZiFCheck()?;
        let process_id = self.id_generator.generate_id()?;
        let logger = self.system.ZiFLogger();

        let mut created: Vec<(String, Arc<dyn ZiCComponent>)> = Vec::with_capacity(config.components.len());
        for component_config in &config.components {
            match self.build_component(ctx, &process_id, component_config).await {
                Ok(component) => created.push((component_config.name.clone(), component)),
                Err(err) => {
                    logger.warn(
                        "process initialization failed, rolling back",
                        zi_fields!(
                            "process_id" => process_id,
                            "component" => component_config.name,
                            "rolled_back" => created.len(),
                            "error" => err.to_string()
                        ),
                    );
                    rollback(ctx, &process_id, created.iter()).await;
                    return Err(err);
                }
            }
        }

        let components: HashMap<String, Arc<dyn ZiCComponent>> = created.iter().cloned().collect();
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        let process = Arc::new(ZiCETLProcess::new(process_id.clone(), config, components, seq));

        let collision = {
            let mut processes = self.lock()?;
            if processes.contains_key(&process_id) {
                true
            } else {
                processes.insert(process_id.clone(), process.clone());
                false
            }
        };
        if collision {
            rollback(ctx, &process_id, created.iter()).await;
            return Err(ZiError::internal(format!(
                "generated process id '{}' is already in use",
                process_id
            )));
        }

        logger.info(
            "process initialized",
            zi_fields!("process_id" => process_id, "components" => process.ZiFComponentNames()),
        );
        self.publish(ZI_TOPIC_PROCESS_INITIALIZED, &process);
        Ok(process)
    }

    async fn build_component(
        &self,
        ctx: &ZiCContext,
        process_id: &str,
        config: &ZiCComponentConfig,
    ) -> Result<Arc<dyn ZiCComponent>> {
        let factory = self
            .system
            .ZiFComponentRegistry()
            .ZiFGetComponentFactory(&config.factory_id)?;
        let init_failed = |source: ZiError| ZiError::ComponentInitFailed {
            process_id: process_id.to_string(),
            component: config.name.clone(),
            source: Box::new(source),
        };
        let component = factory.create_component(config).map_err(init_failed)?;
        component
            .initialize(ctx, &self.system)
            .await
            .map_err(init_failed)?;
        Ok(component)
    }

    /// Starts components in declared order. On the first failure the
    /// components started by this call are stopped again and the error is
    /// returned with the status unchanged. A `Failed` process is rejected.
    #[allow(non_snake_case)]
    pub async fn ZiFStartProcess(&self, ctx: &ZiCContext, process_id: &str) -> Result<()> {
        let process = self.ZiFGetProcess(process_id)?;
        ctx.ZiFCheck()?;
        let _guard = process.lifecycle.lock().await;
        reject_failed(&process)?;

        let mut started: Vec<(String, Arc<dyn ZiCComponent>)> = Vec::new();
        for (name, component) in process.ordered_components() {
            if let Err(err) = component.start(ctx).await {
                self.system.ZiFLogger().warn(
                    "component start failed, stopping started components",
                    zi_fields!(
                        "process_id" => process_id,
                        "component" => name,
                        "rolled_back" => started.len(),
                        "error" => err.to_string()
                    ),
                );
                rollback(ctx, process_id, started.iter().rev()).await;
                return Err(ZiError::ComponentStartFailed {
                    process_id: process_id.to_string(),
                    component: name,
                    source: Box::new(err),
                });
            }
            started.push((name, component));
        }

        process.set_status(ZiCProcessStatus::Running);
        self.system
            .ZiFLogger()
            .info("process started", zi_fields!("process_id" => process_id));
        self.publish(ZI_TOPIC_PROCESS_STARTED, &process);
        Ok(())
    }

    /// Stops components in reverse declared order; the first failure aborts
    /// and leaves the status as it was.
    #[allow(non_snake_case)]
    pub async fn ZiFStopProcess(&self, ctx: &ZiCContext, process_id: &str) -> Result<()> {
        let process = self.ZiFGetProcess(process_id)?;
        ctx.ZiFCheck()?;
        let _guard = process.lifecycle.lock().await;

        for (name, component) in process.ordered_components().into_iter().rev() {
            if let Err(err) = component.stop(ctx).await {
                self.system.ZiFLogger().error(
                    "component stop failed",
                    zi_fields!("process_id" => process_id, "component" => name, "error" => err.to_string()),
                );
                return Err(ZiError::ComponentStopFailed {
                    process_id: process_id.to_string(),
                    component: name,
                    source: Box::new(err),
                });
            }
        }

        process.set_status(ZiCProcessStatus::Stopped);
        self.system
            .ZiFLogger()
            .info("process stopped", zi_fields!("process_id" => process_id));
        self.publish(ZI_TOPIC_PROCESS_STOPPED, &process);
        Ok(())
    }

    /// Stop followed by start; start is skipped when stop fails. A `Failed`
    /// process is rejected before anything is stopped.
    #[allow(non_snake_case)]
    pub async fn ZiFRestartProcess(&self, ctx: &ZiCContext, process_id: &str) -> Result<()> {
        reject_failed(&*self.ZiFGetProcess(process_id)?)?;
        self.ZiFStopProcess(ctx, process_id).await?;
        self.ZiFStartProcess(ctx, process_id).await
    }

    #[allow(non_snake_case)]
    pub fn ZiFGetProcess(&self, process_id: &str) -> Result<Arc<ZiCETLProcess>> {
        self.lock()?
            .get(process_id)
            .cloned()
            .ok_or_else(|| ZiError::process_not_found(process_id))
    }

    /// All processes, in the order they were initialized.
    #[allow(non_snake_case)]
    pub fn ZiFGetAllProcesses(&self) -> Result<Vec<Arc<ZiCETLProcess>>> {
        let mut processes: Vec<Arc<ZiCETLProcess>> = self.lock()?.values().cloned().collect();
        processes.sort_by_key(|process| process.seq());
        Ok(processes)
    }

    /// Forgets a process. Components are not stopped.
    #[allow(non_snake_case)]
    pub fn ZiFRemoveProcess(&self, process_id: &str) -> Result<Arc<ZiCETLProcess>> {
        let process = self
            .lock()?
            .remove(process_id)
            .ok_or_else(|| ZiError::process_not_found(process_id))?;
        if process.ZiFStatus() == ZiCProcessStatus::Running {
            log::warn!("removed process '{}' while it was still running", process_id);
        }
        self.publish(ZI_TOPIC_PROCESS_REMOVED, &process);
        Ok(process)
    }

    /// Moves a process to `Failed`, for callers reporting an unrecoverable
    /// error outside the start/stop paths. Waits for any lifecycle call in
    /// flight on the same process.
    #[allow(non_snake_case)]
    pub async fn ZiFMarkProcessFailed(&self, process_id: &str, reason: impl Into<String>) -> Result<()> {
        let process = self.ZiFGetProcess(process_id)?;
        let reason = reason.into();
        let _guard = process.lifecycle.lock().await;
        process.set_status(ZiCProcessStatus::Failed(reason.clone()));
        self.system.ZiFLogger().error(
            "process marked failed",
            zi_fields!("process_id" => process_id, "reason" => reason),
        );
        self.publish(ZI_TOPIC_PROCESS_FAILED, &process);
        Ok(())
    }

    /// Pairs an existing process with a schedule. Nothing drives the result.
    #[allow(non_snake_case)]
    pub fn ZiFScheduleProcess(
        &self,
        process_id: &str,
        schedule: Arc<dyn ZiCSchedule>,
    ) -> Result<ZiCScheduledETLProcess> {
        Ok(ZiCScheduledETLProcess {
            process: self.ZiFGetProcess(process_id)?,
            schedule,
        })
    }

    #[allow(non_snake_case)]
    pub fn ZiFSystem(&self) -> &Arc<ZiCSystem> {
        &self.system
    }
}

fn reject_failed(process: &ZiCETLProcess) -> Result<()> {
    match process.ZiFStatus() {
        ZiCProcessStatus::Failed(reason) => Err(ZiError::validation(format!(
            "process '{}' has failed ({}) and must be removed",
            process.ZiFId(),
            reason
        ))),
        _ => Ok(()),
    }
}

/// Best-effort stop of `components` in the given order.
async fn rollback<'a, I>(ctx: &ZiCContext, process_id: &str, components: I)
where
    I: Iterator<Item = &'a (String, Arc<dyn ZiCComponent>)>,
{
    for (name, component) in components {
        if let Err(err) = component.stop(ctx).await {
            log::warn!(
                "rollback stop of component '{}' in process '{}' failed: {}",
                name,
                process_id,
                err
            );
        }
    }
}
