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

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::core::{ZiCLogLevel, ZiCLogRecord};

/// Configuration for [`ZiCFacadeLogger`](super::core::ZiCFacadeLogger).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ZiCLogConfig {
    pub default_level: String,
    /// Emit each record as a single JSON object instead of plain text.
    pub json_format: bool,
    /// Target passed to the `log` facade.
    pub target: String,
}

impl Default for ZiCLogConfig {
    fn default() -> Self {
        ZiCLogConfig {
            default_level: "INFO".to_string(),
            json_format: false,
            target: "zi_runtime".to_string(),
        }
    }
}

impl ZiCLogConfig {
    #[allow(non_snake_case)]
    pub fn ZiFShouldLog(&self, record: &ZiCLogRecord) -> bool {
        record.level >= ZiCLogLevel::ZiFParse(&self.default_level)
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ZiCLogConfigBuilder {
    pub default_level: Option<String>,
    pub json_format: Option<bool>,
    pub target: Option<String>,
}

impl ZiCLogConfigBuilder {
    #[allow(non_snake_case)]
    pub fn ZiFBuild(self) -> ZiCLogConfig {
        let base = ZiCLogConfig::default();
        ZiCLogConfig {
            default_level: self.default_level.unwrap_or(base.default_level),
            json_format: self.json_format.unwrap_or(base.json_format),
            target: self.target.unwrap_or(base.target),
        }
    }

    #[allow(non_snake_case)]
    pub fn ZiFFromJson(value: &Value) -> ZiCLogConfig {
        let builder: ZiCLogConfigBuilder = serde_json::from_value(value.clone())
            .unwrap_or_else(|_| ZiCLogConfigBuilder::default());
        builder.ZiFBuild()
    }
}
