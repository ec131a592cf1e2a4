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

use std::sync::{Arc, Weak};

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::component::{
    ZiCComponent, ZiCComponentFactory, ZiCComponentKind, ZiCComponentMetadata, ZiCOperation,
    ZiCOperationInput, ZiCOperationOutput,
};
use crate::config::{ZiCComponentConfig, ZiCETLProcessConfig};
use crate::context::ZiCContext;
use crate::errors::{Result, ZiError};
use crate::operations::{
    action_of, required_str, ZI_OP_PROCESS_CREATE, ZI_OP_PROCESS_GET, ZI_OP_PROCESS_REMOVE,
    ZI_OP_PROCESS_RESTART, ZI_OP_PROCESS_START, ZI_OP_PROCESS_STOP,
};
use crate::process::ZiCProcessManager;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ZiCProcessAction {
    Create,
    Start,
    Stop,
    Restart,
    Remove,
    Get,
}

impl ZiCProcessAction {
    pub const ALL: [ZiCProcessAction; 6] = [
        ZiCProcessAction::Create,
        ZiCProcessAction::Start,
        ZiCProcessAction::Stop,
        ZiCProcessAction::Restart,
        ZiCProcessAction::Remove,
        ZiCProcessAction::Get,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ZiCProcessAction::Create => "create",
            ZiCProcessAction::Start => "start",
            ZiCProcessAction::Stop => "stop",
            ZiCProcessAction::Restart => "restart",
            ZiCProcessAction::Remove => "remove",
            ZiCProcessAction::Get => "get",
        }
    }

    /// Operation ID the runtime plugin registers this action under.
    pub fn operation_id(&self) -> &'static str {
        match self {
            ZiCProcessAction::Create => ZI_OP_PROCESS_CREATE,
            ZiCProcessAction::Start => ZI_OP_PROCESS_START,
            ZiCProcessAction::Stop => ZI_OP_PROCESS_STOP,
            ZiCProcessAction::Restart => ZI_OP_PROCESS_RESTART,
            ZiCProcessAction::Remove => ZI_OP_PROCESS_REMOVE,
            ZiCProcessAction::Get => ZI_OP_PROCESS_GET,
        }
    }

    #[allow(non_snake_case)]
    pub fn ZiFParse(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|action| action.as_str() == s)
            .ok_or_else(|| ZiError::validation(format!("unknown process action '{}'", s)))
    }
}

/// Drives one process lifecycle action through the process manager.
///
/// Holds the manager weakly; the runtime plugin owns it.
#[derive(Debug)]
pub struct ZiCProcessOperation {
    metadata: ZiCComponentMetadata,
    action: ZiCProcessAction,
    manager: Weak<ZiCProcessManager>,
}

impl ZiCProcessOperation {
    #[allow(non_snake_case)]
    pub fn ZiFNew(
        metadata: ZiCComponentMetadata,
        action: ZiCProcessAction,
        manager: Weak<ZiCProcessManager>,
    ) -> Self {
        Self {
            metadata,
            action,
            manager,
        }
    }

    #[allow(non_snake_case)]
    pub fn ZiFAction(&self) -> ZiCProcessAction {
        self.action
    }
}

impl ZiCComponent for ZiCProcessOperation {
    fn metadata(&self) -> &ZiCComponentMetadata {
        &self.metadata
    }

    fn kind(&self) -> ZiCComponentKind {
        ZiCComponentKind::Operation
    }

    fn as_operation(&self) -> Option<&dyn ZiCOperation> {
        Some(self)
    }
}

#[async_trait]
impl ZiCOperation for ZiCProcessOperation {
    async fn execute(&self, ctx: &ZiCContext, input: ZiCOperationInput) -> Result<ZiCOperationOutput> {
        let manager = self
            .manager
            .upgrade()
            .ok_or_else(|| ZiError::internal("process manager is no longer available"))?;
        let data = input.data;

        let output = match self.action {
            ZiCProcessAction::Create => {
                let config = ZiCETLProcessConfig::ZiFFromJson(&data)?;
                let process = manager.ZiFInitializeProcess(ctx, config).await?;
                serde_json::to_value(process.ZiFSnapshot())?
            }
            ZiCProcessAction::Start => {
                let process_id = required_str(&data, "process_id")?;
                manager.ZiFStartProcess(ctx, process_id).await?;
                serde_json::to_value(manager.ZiFGetProcess(process_id)?.ZiFSnapshot())?
            }
            ZiCProcessAction::Stop => {
                let process_id = required_str(&data, "process_id")?;
                manager.ZiFStopProcess(ctx, process_id).await?;
                serde_json::to_value(manager.ZiFGetProcess(process_id)?.ZiFSnapshot())?
            }
            ZiCProcessAction::Restart => {
                let process_id = required_str(&data, "process_id")?;
                manager.ZiFRestartProcess(ctx, process_id).await?;
                serde_json::to_value(manager.ZiFGetProcess(process_id)?.ZiFSnapshot())?
            }
            ZiCProcessAction::Remove => {
                let process_id = required_str(&data, "process_id")?;
                manager.ZiFRemoveProcess(process_id)?;
                json!({"process_id": process_id, "removed": true})
            }
            ZiCProcessAction::Get => match data.get("process_id").and_then(Value::as_str) {
                Some(process_id) => serde_json::to_value(manager.ZiFGetProcess(process_id)?.ZiFSnapshot())?,
                None => {
                    let snapshots: Vec<_> = manager
                        .ZiFGetAllProcesses()?
                        .iter()
                        .map(|process| process.ZiFSnapshot())
                        .collect();
                    json!({"processes": snapshots})
                }
            },
        };
        Ok(ZiCOperationOutput::ZiFNew(output))
    }
}

/// Factory building process operations; `customConfig.action` picks the
/// action.
#[allow(non_snake_case)]
pub fn ZiFProcessOperationFactory(manager: Weak<ZiCProcessManager>) -> Arc<dyn ZiCComponentFactory> {
    Arc::new(move |config: &ZiCComponentConfig| -> Result<Arc<dyn ZiCComponent>> {
        let action = ZiCProcessAction::ZiFParse(action_of(&config.custom_config)?)?;
        Ok(Arc::new(ZiCProcessOperation::ZiFNew(
            ZiCComponentMetadata::ZiFFromConfig(config),
            action,
            manager.clone(),
        )))
    })
}
