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

//! # Zi Runtime Error Module
//!
//! This module defines the error type shared by the registry, the operation
//! dispatcher, the plugin manager and the process manager.
//!
//! ## Error Categories
//!
//! - **Registry**: factory/component lookups and uniqueness violations
//! - **Dispatch**: missing operations, non-operation components, failed executions
//! - **Process**: empty configs, unknown processes, component lifecycle failures
//! - **Plugin**: failures during one of the onboarding or shutdown phases
//! - **Component**: failures raised by component implementations themselves
//!
//! Wrapping variants keep the underlying error as their `source`, so the full
//! chain stays available to callers that walk `std::error::Error::source`.
//!
//! ## Usage
//!
//! ```rust
//! use zi_runtime::errors::{Result, ZiError};
//!
//! fn load(name: &str) -> Result<()> {
//!     if name.is_empty() {
//!         return Err(ZiError::validation("name cannot be empty"));
//!     }
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Convenience result type used throughout the Zi runtime.
pub type Result<T> = std::result::Result<T, ZiError>;

/// Canonical error enumeration for the Zi runtime.
#[derive(Debug, Error, Serialize, Deserialize)]
pub enum ZiError {
    /// A factory is already bound to this ID; the first binding stays active.
    #[error("factory '{factory_id}' is already registered")]
    FactoryAlreadyRegistered { factory_id: String },

    #[error("factory '{factory_id}' not found")]
    FactoryNotFound { factory_id: String },

    /// A component is already recorded under this ID.
    #[error("component '{component_id}' already exists")]
    ComponentAlreadyExists { component_id: String },

    #[error("component '{component_id}' not found")]
    ComponentNotFound { component_id: String },

    #[error("operation '{operation_id}' not found")]
    OperationNotFound { operation_id: String },

    /// The resolved component does not carry the Operation capability.
    #[error("component '{operation_id}' is not an operation")]
    NotAnOperation { operation_id: String },

    /// The resolved component does not carry the Service capability.
    #[error("component '{service_id}' is not a service")]
    NotAService { service_id: String },

    /// An operation resolved fine but its execution failed.
    #[error("operation '{operation_id}' failed: {source}")]
    OperationFailed {
        operation_id: String,
        #[source]
        source: Box<ZiError>,
    },

    #[error("process configuration declares no components")]
    EmptyProcessConfig,

    #[error("process '{process_id}' not found")]
    ProcessNotFound { process_id: String },

    #[error("component '{component}' of process '{process_id}' failed to initialize: {source}")]
    ComponentInitFailed {
        process_id: String,
        component: String,
        #[source]
        source: Box<ZiError>,
    },

    #[error("component '{component}' of process '{process_id}' failed to start: {source}")]
    ComponentStartFailed {
        process_id: String,
        component: String,
        #[source]
        source: Box<ZiError>,
    },

    #[error("component '{component}' of process '{process_id}' failed to stop: {source}")]
    ComponentStopFailed {
        process_id: String,
        component: String,
        #[source]
        source: Box<ZiError>,
    },

    /// A plugin failed during one of its lifecycle phases.
    #[error("plugin '{plugin}' failed during {phase}: {source}")]
    Plugin {
        plugin: String,
        phase: String,
        #[source]
        source: Box<ZiError>,
    },

    /// Any failure raised by a component implementation.
    #[error("component '{component}' error: {message}")]
    Component { component: String, message: String },

    #[error("id generation failed: {message}")]
    IdGeneration { message: String },

    #[error("operation cancelled")]
    Cancelled,

    /// Validation errors triggered by invalid parameters or inputs.
    #[error("validation error: {message}")]
    Validation { message: String },

    /// Wrapper for serde-style serialization issues.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Catch-all variant for unexpected situations.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for ZiError {
    fn from(err: serde_json::Error) -> Self {
        ZiError::Serde(err.to_string())
    }
}

#[cfg(feature = "yaml")]
impl From<serde_yaml::Error> for ZiError {
    fn from(err: serde_yaml::Error) -> Self {
        ZiError::Serde(err.to_string())
    }
}

impl ZiError {
    pub fn factory_not_found(factory_id: impl Into<String>) -> Self {
        ZiError::FactoryNotFound {
            factory_id: factory_id.into(),
        }
    }

    pub fn component_not_found(component_id: impl Into<String>) -> Self {
        ZiError::ComponentNotFound {
            component_id: component_id.into(),
        }
    }

    pub fn process_not_found(process_id: impl Into<String>) -> Self {
        ZiError::ProcessNotFound {
            process_id: process_id.into(),
        }
    }

    /// Helper for component implementations reporting their own failures.
    pub fn component(name: impl Into<String>, message: impl Into<String>) -> Self {
        ZiError::Component {
            component: name.into(),
            message: message.into(),
        }
    }

    /// Helper to construct simple validation errors.
    pub fn validation<T: Into<String>>(message: T) -> Self {
        ZiError::Validation {
            message: message.into(),
        }
    }

    pub fn id_generation<T: Into<String>>(message: T) -> Self {
        ZiError::IdGeneration {
            message: message.into(),
        }
    }

    pub fn plugin(plugin: impl Into<String>, phase: impl Into<String>, source: ZiError) -> Self {
        ZiError::Plugin {
            plugin: plugin.into(),
            phase: phase.into(),
            source: Box::new(source),
        }
    }

    /// Helper to construct internal errors.
    pub fn internal<T: Into<String>>(message: T) -> Self {
        ZiError::Internal(message.into())
    }

    /// Returns the innermost error of a wrapping chain.
    pub fn root_cause(&self) -> &ZiError {
        match self {
            ZiError::OperationFailed { source, .. }
            | ZiError::ComponentInitFailed { source, .. }
            | ZiError::ComponentStartFailed { source, .. }
            | ZiError::ComponentStopFailed { source, .. }
            | ZiError::Plugin { source, .. } => source.root_cause(),
            other => other,
        }
    }
}
