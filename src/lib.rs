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

//! # Zi Runtime Library
//!
//! The component runtime underneath Zi: a registry that creates and tracks
//! named components, a dispatcher that invokes operations by ID, a plugin
//! onboarding protocol, and a process manager running multi-component ETL
//! processes with rollback on partial failure.
//!
//! ## Module Overview
//!
//! - **component**: component, operation and factory contracts
//! - **registry**: factory and component bookkeeping
//! - **dispatch**: resolve-and-invoke for operations
//! - **orbit**: plugin protocol, plugin manager and the runtime plugin
//! - **process**: ETL process records, lifecycle manager and schedules
//! - **operations**: process and service actions exposed as operations
//! - **system**: composition root tying everything together
//! - **config**, **context**, **events**, **id**, **log**: collaborators
//!
//! ## Quick Start
//!
//! ```rust
//! use serde_json::json;
//! use zi_runtime::{ZiCContext, ZiCRuntimePlugin, ZiCSystem};
//!
//! # async fn run() -> zi_runtime::Result<()> {
//! let ctx = ZiCContext::ZiFBackground();
//! let system = ZiCSystem::ZiFBuilder().ZiFBuild();
//! system.ZiFAddPlugin(&ctx, Box::new(ZiCRuntimePlugin::default())).await?;
//!
//! let process = system
//!     .ZiFExecuteOperation(&ctx, "process.create", json!({"components": [
//!         {"id": "c1", "name": "extract", "factoryId": "my.extractor"}
//!     ]}))
//!     .await?;
//! system
//!     .ZiFExecuteOperation(&ctx, "process.start", json!({"process_id": process["id"]}))
//!     .await?;
//! system.ZiFShutdown(&ctx).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! All operations return `Result<T, ZiError>`. Nothing in the runtime exits
//! the process; callers decide how to surface failures.

#![allow(non_snake_case)]

pub mod errors;
pub mod component;
pub mod config;
pub mod context;
pub mod dispatch;
pub mod events;
pub mod id;
pub mod log;
pub mod operations;
pub mod orbit;
pub mod process;
pub mod registry;
pub mod system;

pub use errors::{Result, ZiError};
pub use component::{
    ZiCComponent, ZiCComponentFactory, ZiCComponentKind, ZiCComponentMetadata, ZiCOperation,
    ZiCOperationInput, ZiCOperationOutput,
};
pub use config::{ZiCComponentConfig, ZiCConfiguration, ZiCConfigurationBuilder, ZiCETLProcessConfig};
pub use context::ZiCContext;
pub use dispatch::ZiCOperationDispatcher;
pub use events::{ZiCEvent, ZiCEventBus, ZiCInMemoryEventBus, ZiCNoopEventBus};
pub use id::{ZiCIdGenerator, ZiCRandomIdGenerator, ZiCSequentialIdGenerator};
pub use orbit::{ZiCPlugin, ZiCPluginManager, ZiCPluginState, ZiCRuntimePlugin};
pub use process::{
    ZiCETLProcess, ZiCIntervalSchedule, ZiCProcessManager, ZiCProcessStatus, ZiCSchedule,
    ZiCScheduledETLProcess,
};
pub use registry::ZiCComponentRegistry;
pub use system::{ZiCSystem, ZiCSystemBuilder};
