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
use serde_json::json;

use crate::component::{
    ZiCComponent, ZiCComponentFactory, ZiCComponentKind, ZiCComponentMetadata, ZiCOperation,
    ZiCOperationInput, ZiCOperationOutput, ZiFDescribeComponent,
};
use crate::config::ZiCComponentConfig;
use crate::context::ZiCContext;
use crate::errors::{Result, ZiError};
use crate::operations::{
    action_of, required_str, ZI_OP_SERVICE_CREATE, ZI_OP_SERVICE_START, ZI_OP_SERVICE_STOP,
};
use crate::registry::ZiCComponentRegistry;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ZiCServiceAction {
    Create,
    Start,
    Stop,
}

impl ZiCServiceAction {
    pub const ALL: [ZiCServiceAction; 3] = [
        ZiCServiceAction::Create,
        ZiCServiceAction::Start,
        ZiCServiceAction::Stop,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ZiCServiceAction::Create => "create",
            ZiCServiceAction::Start => "start",
            ZiCServiceAction::Stop => "stop",
        }
    }

    pub fn operation_id(&self) -> &'static str {
        match self {
            ZiCServiceAction::Create => ZI_OP_SERVICE_CREATE,
            ZiCServiceAction::Start => ZI_OP_SERVICE_START,
            ZiCServiceAction::Stop => ZI_OP_SERVICE_STOP,
        }
    }

    #[allow(non_snake_case)]
    pub fn ZiFParse(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|action| action.as_str() == s)
            .ok_or_else(|| ZiError::validation(format!("unknown service action '{}'", s)))
    }
}

/// Creates, starts or stops registry services.
#[derive(Debug)]
pub struct ZiCServiceOperation {
    metadata: ZiCComponentMetadata,
    action: ZiCServiceAction,
    registry: Weak<ZiCComponentRegistry>,
}

impl ZiCServiceOperation {
    #[allow(non_snake_case)]
    pub fn ZiFNew(
        metadata: ZiCComponentMetadata,
        action: ZiCServiceAction,
        registry: Weak<ZiCComponentRegistry>,
    ) -> Self {
        Self {
            metadata,
            action,
            registry,
        }
    }
}

impl ZiCComponent for ZiCServiceOperation {
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
impl ZiCOperation for ZiCServiceOperation {
    async fn execute(&self, ctx: &ZiCContext, input: ZiCOperationInput) -> Result<ZiCOperationOutput> {
        let registry = self
            .registry
            .upgrade()
            .ok_or_else(|| ZiError::internal("component registry is no longer available"))?;
        let data = input.data;

        let output = match self.action {
            ZiCServiceAction::Create => {
                let config: ZiCComponentConfig = serde_json::from_value(data)?;
                let component = registry.ZiFCreateComponent(&config)?;
                ZiFDescribeComponent(component.as_ref())
            }
            ZiCServiceAction::Start => {
                let service_id = required_str(&data, "service_id")?;
                registry.ZiFGetService(service_id)?.start(ctx).await?;
                json!({"service_id": service_id, "state": "started"})
            }
            ZiCServiceAction::Stop => {
                let service_id = required_str(&data, "service_id")?;
                registry.ZiFGetService(service_id)?.stop(ctx).await?;
                json!({"service_id": service_id, "state": "stopped"})
            }
        };
        Ok(ZiCOperationOutput::ZiFNew(output))
    }
}

#[allow(non_snake_case)]
pub fn ZiFServiceOperationFactory(registry: Weak<ZiCComponentRegistry>) -> Arc<dyn ZiCComponentFactory> {
    Arc::new(move |config: &ZiCComponentConfig| -> Result<Arc<dyn ZiCComponent>> {
        let action = ZiCServiceAction::ZiFParse(action_of(&config.custom_config)?)?;
        Ok(Arc::new(ZiCServiceOperation::ZiFNew(
            ZiCComponentMetadata::ZiFFromConfig(config),
            action,
            registry.clone(),
        )))
    })
}
