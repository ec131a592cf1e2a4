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

//! # Zi Component Module
//!
//! Components are the smallest named units of behavior managed by the
//! registry. Every component carries a [`ZiCComponentMetadata`] value and a
//! capability tag ([`ZiCComponentKind`]); capabilities are implemented
//! directly on the concrete type rather than inherited.
//!
//! ## Capabilities
//!
//! - **Plain**: identity plus the default no-op lifecycle
//! - **Service**: long-running piece started and stopped through its lifecycle
//! - **Operation**: additionally exposes [`ZiCOperation::execute`], the unit
//!   of dispatch
//!
//! ```rust
//! use async_trait::async_trait;
//! use serde_json::json;
//! use zi_runtime::component::*;
//! use zi_runtime::context::ZiCContext;
//! use zi_runtime::errors::Result;
//!
//! #[derive(Debug)]
//! struct Echo(ZiCComponentMetadata);
//!
//! impl ZiCComponent for Echo {
//!     fn metadata(&self) -> &ZiCComponentMetadata { &self.0 }
//!     fn kind(&self) -> ZiCComponentKind { ZiCComponentKind::Operation }
//!     fn as_operation(&self) -> Option<&dyn ZiCOperation> { Some(self) }
//! }
//!
//! #[async_trait]
//! impl ZiCOperation for Echo {
//!     async fn execute(&self, _ctx: &ZiCContext, input: ZiCOperationInput) -> Result<ZiCOperationOutput> {
//!         Ok(ZiCOperationOutput::ZiFNew(json!({"echo": input.data})))
//!     }
//! }
//! ```

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::ZiCComponentConfig;
use crate::context::ZiCContext;
use crate::errors::Result;
use crate::system::ZiCSystem;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ZiCComponentKind {
    Service,
    Operation,
    Plain,
}

impl ZiCComponentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ZiCComponentKind::Service => "service",
            ZiCComponentKind::Operation => "operation",
            ZiCComponentKind::Plain => "plain",
        }
    }
}

/// Identity shared by every component.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZiCComponentMetadata {
    pub id: String,
    pub name: String,
    pub description: String,
}

impl ZiCComponentMetadata {
    #[allow(non_snake_case)]
    pub fn ZiFNew(id: impl Into<String>, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
        }
    }

    #[allow(non_snake_case)]
    pub fn ZiFFromConfig(config: &ZiCComponentConfig) -> Self {
        Self::ZiFNew(config.id.clone(), config.name.clone(), config.description.clone())
    }
}

/// Contract every registry-managed component fulfills.
///
/// Lifecycle methods take `&self`: components are shared as
/// `Arc<dyn ZiCComponent>` between the registry, processes and callers, so any
/// mutable state lives behind interior mutability. The defaults do nothing,
/// which is what plain components and most operations want.
#[async_trait]
pub trait ZiCComponent: Send + Sync + fmt::Debug {
    fn metadata(&self) -> &ZiCComponentMetadata;

    fn kind(&self) -> ZiCComponentKind {
        ZiCComponentKind::Plain
    }

    fn id(&self) -> &str {
        &self.metadata().id
    }

    fn name(&self) -> &str {
        &self.metadata().name
    }

    fn description(&self) -> &str {
        &self.metadata().description
    }

    /// Called once after construction. The component may keep the system
    /// handle for later registry or event bus access.
    async fn initialize(&self, _ctx: &ZiCContext, _system: &Arc<ZiCSystem>) -> Result<()> {
        Ok(())
    }

    async fn start(&self, _ctx: &ZiCContext) -> Result<()> {
        Ok(())
    }

    async fn stop(&self, _ctx: &ZiCContext) -> Result<()> {
        Ok(())
    }

    /// Operation capability, if any. Implementors of [`ZiCOperation`] return
    /// `Some(self)`.
    fn as_operation(&self) -> Option<&dyn ZiCOperation> {
        None
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ZiCOperationInput {
    pub data: Value,
}

impl ZiCOperationInput {
    #[allow(non_snake_case)]
    pub fn ZiFNew(data: Value) -> Self {
        Self { data }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ZiCOperationOutput {
    pub data: Value,
}

impl ZiCOperationOutput {
    #[allow(non_snake_case)]
    pub fn ZiFNew(data: Value) -> Self {
        Self { data }
    }
}

/// A component that can be invoked through the dispatcher.
#[async_trait]
pub trait ZiCOperation: ZiCComponent {
    async fn execute(&self, ctx: &ZiCContext, input: ZiCOperationInput) -> Result<ZiCOperationOutput>;
}

/// Builds one component instance from its configuration.
///
/// Factories should be free of side effects beyond constructing the instance:
/// the registry discards the result when the component ID is already taken.
pub trait ZiCComponentFactory: Send + Sync {
    fn create_component(&self, config: &ZiCComponentConfig) -> Result<Arc<dyn ZiCComponent>>;
}

impl<F> ZiCComponentFactory for F
where
    F: Fn(&ZiCComponentConfig) -> Result<Arc<dyn ZiCComponent>> + Send + Sync,
{
    fn create_component(&self, config: &ZiCComponentConfig) -> Result<Arc<dyn ZiCComponent>> {
        self(config)
    }
}

/// Serializable summary of a component.
#[allow(non_snake_case)]
pub fn ZiFDescribeComponent(component: &dyn ZiCComponent) -> Value {
    serde_json::json!({
        "id": component.id(),
        "name": component.name(),
        "description": component.description(),
        "kind": component.kind().as_str(),
    })
}
