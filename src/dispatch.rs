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

//! # Operation Dispatch
//!
//! Resolve-and-invoke indirection behind `ZiCSystem::ZiFExecuteOperation`.
//! The dispatcher knows nothing about what an operation does: it looks the ID
//! up in the registry, checks the Operation capability and calls `execute`.
//! There is no retry and no timeout at this layer.

use std::sync::Arc;

use serde_json::Value;

use crate::component::ZiCOperationInput;
use crate::context::ZiCContext;
use crate::errors::{Result, ZiError};
use crate::registry::ZiCComponentRegistry;

#[derive(Clone, Debug)]
pub struct ZiCOperationDispatcher {
    registry: Arc<ZiCComponentRegistry>,
}

impl ZiCOperationDispatcher {
    #[allow(non_snake_case)]
    pub fn ZiFNew(registry: Arc<ZiCComponentRegistry>) -> Self {
        Self { registry }
    }

    /// Executes `operation_id` with `data` as input.
    ///
    /// Execution failures come back as `OperationFailed` wrapping the
    /// operation's own error.
    #[allow(non_snake_case)]
    pub async fn ZiFExecute(&self, ctx: &ZiCContext, operation_id: &str, data: Value) -> Result<Value> {
        let component = self.registry.ZiFGetOperation(operation_id)?;
        let operation = component.as_operation().ok_or_else(|| ZiError::NotAnOperation {
            operation_id: operation_id.to_string(),
        })?;

        log::debug!("dispatching operation '{}'", operation_id);
        match operation.execute(ctx, ZiCOperationInput::ZiFNew(data)).await {
            Ok(output) => Ok(output.data),
            Err(err) => {
                log::warn!("operation '{}' failed: {}", operation_id, err);
                Err(ZiError::OperationFailed {
                    operation_id: operation_id.to_string(),
                    source: Box::new(err),
                })
            }
        }
    }
}
