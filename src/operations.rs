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

//! # Built-in Operations
//!
//! Process and service lifecycle actions exposed as operations, so callers
//! drive them through `ZiCSystem::ZiFExecuteOperation` like any other
//! operation. They are registered by the runtime plugin
//! (`crate::orbit::ZiCRuntimePlugin`).
//!
//! Each operation is built by one of two factories; the factory reads the
//! action from `customConfig.action`.

pub mod process;
pub mod service;

use serde_json::Value;

use crate::errors::{Result, ZiError};

pub use process::{ZiCProcessAction, ZiCProcessOperation, ZiFProcessOperationFactory};
pub use service::{ZiCServiceAction, ZiCServiceOperation, ZiFServiceOperationFactory};

pub const ZI_FACTORY_PROCESS_OPERATION: &str = "zi.operation.process";
pub const ZI_FACTORY_SERVICE_OPERATION: &str = "zi.operation.service";

pub const ZI_OP_PROCESS_CREATE: &str = "process.create";
pub const ZI_OP_PROCESS_START: &str = "process.start";
pub const ZI_OP_PROCESS_STOP: &str = "process.stop";
pub const ZI_OP_PROCESS_RESTART: &str = "process.restart";
pub const ZI_OP_PROCESS_REMOVE: &str = "process.remove";
pub const ZI_OP_PROCESS_GET: &str = "process.get";

pub const ZI_OP_SERVICE_CREATE: &str = "service.create";
pub const ZI_OP_SERVICE_START: &str = "service.start";
pub const ZI_OP_SERVICE_STOP: &str = "service.stop";

/// Reads a required string field from an operation input object.
pub(crate) fn required_str<'a>(data: &'a Value, field: &str) -> Result<&'a str> {
    data.get(field)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ZiError::validation(format!("missing string field '{}'", field)))
}

pub(crate) fn action_of(config: &serde_json::Map<String, Value>) -> Result<&str> {
    config
        .get("action")
        .and_then(Value::as_str)
        .ok_or_else(|| ZiError::validation("operation config requires an 'action' string"))
}
