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

//! # Configuration Shapes
//!
//! Serializable configuration carried through the runtime:
//!
//! - [`ZiCConfiguration`]: opaque system configuration handed to components at
//!   initialization time. The runtime never interprets `custom_config`.
//! - [`ZiCComponentConfig`]: input to a component factory.
//! - [`ZiCETLProcessConfig`]: ordered list of component configs making up one
//!   ETL process.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::{Result, ZiError};

/// System-wide configuration carrier.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ZiCConfiguration {
    pub debug: bool,
    pub verbose: bool,
    /// Opaque payload for components and plugins.
    pub custom_config: Value,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ZiCConfigurationBuilder {
    pub debug: Option<bool>,
    pub verbose: Option<bool>,
    pub custom_config: Option<Value>,
}

impl ZiCConfigurationBuilder {
    #[allow(non_snake_case)]
    pub fn ZiFNew() -> Self {
        Self::default()
    }

    #[allow(non_snake_case)]
    pub fn ZiFDebug(mut self, debug: bool) -> Self {
        self.debug = Some(debug);
        self
    }

    #[allow(non_snake_case)]
    pub fn ZiFVerbose(mut self, verbose: bool) -> Self {
        self.verbose = Some(verbose);
        self
    }

    #[allow(non_snake_case)]
    pub fn ZiFCustomConfig(mut self, custom: Value) -> Self {
        self.custom_config = Some(custom);
        self
    }

    #[allow(non_snake_case)]
    pub fn ZiFBuild(self) -> ZiCConfiguration {
        let base = ZiCConfiguration::default();
        ZiCConfiguration {
            debug: self.debug.unwrap_or(base.debug),
            verbose: self.verbose.unwrap_or(base.verbose),
            custom_config: self.custom_config.unwrap_or(base.custom_config),
        }
    }

    /// Builds a configuration from a JSON object; missing keys fall back to
    /// defaults. Unlike the log config helper this reports malformed input.
    #[allow(non_snake_case)]
    pub fn ZiFFromJson(value: &Value) -> Result<ZiCConfiguration> {
        let builder: ZiCConfigurationBuilder = serde_json::from_value(value.clone())?;
        Ok(builder.ZiFBuild())
    }
}

/// Everything a factory needs to build one component.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZiCComponentConfig {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(alias = "factoryID", alias = "factory_id")]
    pub factory_id: String,
    #[serde(default, alias = "custom_config")]
    pub custom_config: Map<String, Value>,
}

impl ZiCComponentConfig {
    #[allow(non_snake_case)]
    pub fn ZiFNew(id: impl Into<String>, name: impl Into<String>, factory_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            factory_id: factory_id.into(),
            custom_config: Map::new(),
        }
    }

    #[allow(non_snake_case)]
    pub fn ZiFWithDescription(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[allow(non_snake_case)]
    pub fn ZiFWithCustom(mut self, key: impl Into<String>, value: Value) -> Self {
        self.custom_config.insert(key.into(), value);
        self
    }
}

/// Declared components of one ETL process, in start order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ZiCETLProcessConfig {
    #[serde(default)]
    pub components: Vec<ZiCComponentConfig>,
}

impl ZiCETLProcessConfig {
    #[allow(non_snake_case)]
    pub fn ZiFNew(components: Vec<ZiCComponentConfig>) -> Self {
        Self { components }
    }

    #[allow(non_snake_case)]
    pub fn ZiFFromJson(value: &Value) -> Result<Self> {
        Ok(serde_json::from_value(value.clone())?)
    }

    #[cfg(feature = "yaml")]
    #[allow(non_snake_case)]
    pub fn ZiFFromYaml(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Component names in declaration order.
    #[allow(non_snake_case)]
    pub fn ZiFComponentNames(&self) -> Vec<&str> {
        self.components.iter().map(|c| c.name.as_str()).collect()
    }

    /// Rejects empty configs and duplicate component names.
    #[allow(non_snake_case)]
    pub fn ZiFValidate(&self) -> Result<()> {
        if self.components.is_empty() {
            return Err(ZiError::EmptyProcessConfig);
        }
        let mut seen = HashSet::new();
        for component in &self.components {
            if component.name.is_empty() {
                return Err(ZiError::validation(format!(
                    "component '{}' has an empty name",
                    component.id
                )));
            }
            if !seen.insert(component.name.as_str()) {
                return Err(ZiError::validation(format!(
                    "duplicate component name '{}'",
                    component.name
                )));
            }
        }
        Ok(())
    }
}
