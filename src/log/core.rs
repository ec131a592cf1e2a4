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

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde_json::{json, Map, Value};

use crate::log::config::ZiCLogConfig;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum ZiCLogLevel {
    Debug,
    Info,
    Warning,
    Error,
    Fatal,
}

impl ZiCLogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ZiCLogLevel::Debug => "DEBUG",
            ZiCLogLevel::Info => "INFO",
            ZiCLogLevel::Warning => "WARNING",
            ZiCLogLevel::Error => "ERROR",
            ZiCLogLevel::Fatal => "FATAL",
        }
    }

    #[allow(non_snake_case)]
    pub fn ZiFParse(s: &str) -> ZiCLogLevel {
        match s.to_ascii_uppercase().as_str() {
            "DEBUG" => ZiCLogLevel::Debug,
            "WARN" | "WARNING" => ZiCLogLevel::Warning,
            "ERROR" => ZiCLogLevel::Error,
            "FATAL" => ZiCLogLevel::Fatal,
            _ => ZiCLogLevel::Info,
        }
    }

    fn facade_level(&self) -> log::Level {
        match self {
            ZiCLogLevel::Debug => log::Level::Debug,
            ZiCLogLevel::Info => log::Level::Info,
            ZiCLogLevel::Warning => log::Level::Warn,
            ZiCLogLevel::Error | ZiCLogLevel::Fatal => log::Level::Error,
        }
    }
}

#[derive(Clone, Debug)]
pub struct ZiCLogRecord {
    pub level: ZiCLogLevel,
    pub message: String,
    pub fields: Map<String, Value>,
    pub timestamp: DateTime<Utc>,
}

impl ZiCLogRecord {
    #[allow(non_snake_case)]
    pub fn ZiFNew(level: ZiCLogLevel, message: impl Into<String>, fields: Map<String, Value>) -> Self {
        Self {
            level,
            message: message.into(),
            fields,
            timestamp: Utc::now(),
        }
    }

    #[allow(non_snake_case)]
    pub fn ZiFToJson(&self) -> Value {
        let mut data = Map::new();
        data.insert("level".into(), json!(self.level.as_str()));
        data.insert("message".into(), json!(self.message));
        data.insert("timestamp_ms".into(), json!(self.timestamp.timestamp_millis()));
        data.insert("fields".into(), Value::Object(self.fields.clone()));
        Value::Object(data)
    }
}

/// Leveled logging sink handed to the runtime through the system.
///
/// The runtime only logs diagnostics through it. `Fatal` is a level, not an
/// exit: nothing in the runtime terminates the process.
pub trait ZiCLogger: Send + Sync {
    fn log(&self, record: ZiCLogRecord);

    fn debug(&self, message: &str, fields: Map<String, Value>) {
        self.log(ZiCLogRecord::ZiFNew(ZiCLogLevel::Debug, message, fields));
    }

    fn info(&self, message: &str, fields: Map<String, Value>) {
        self.log(ZiCLogRecord::ZiFNew(ZiCLogLevel::Info, message, fields));
    }

    fn warn(&self, message: &str, fields: Map<String, Value>) {
        self.log(ZiCLogRecord::ZiFNew(ZiCLogLevel::Warning, message, fields));
    }

    fn error(&self, message: &str, fields: Map<String, Value>) {
        self.log(ZiCLogRecord::ZiFNew(ZiCLogLevel::Error, message, fields));
    }

    fn fatal(&self, message: &str, fields: Map<String, Value>) {
        self.log(ZiCLogRecord::ZiFNew(ZiCLogLevel::Fatal, message, fields));
    }
}

/// Builds a field map from `key => value` pairs.
#[macro_export]
macro_rules! zi_fields {
    () => {
        ::serde_json::Map::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut map = ::serde_json::Map::new();
        $(map.insert(($key).to_string(), ::serde_json::json!($value));)+
        map
    }};
}

/// Forwards records to the `log` facade after level filtering.
#[derive(Clone, Debug, Default)]
pub struct ZiCFacadeLogger {
    config: ZiCLogConfig,
}

impl ZiCFacadeLogger {
    #[allow(non_snake_case)]
    pub fn ZiFNew(config: ZiCLogConfig) -> Self {
        Self { config }
    }
}

impl ZiCLogger for ZiCFacadeLogger {
    fn log(&self, record: ZiCLogRecord) {
        if !self.config.ZiFShouldLog(&record) {
            return;
        }
        let level = record.level.facade_level();
        if self.config.json_format {
            log::log!(target: self.config.target.as_str(), level, "{}", record.ZiFToJson());
        } else if record.fields.is_empty() {
            log::log!(target: self.config.target.as_str(), level, "{}", record.message);
        } else {
            log::log!(
                target: self.config.target.as_str(),
                level,
                "{} {}",
                record.message,
                Value::Object(record.fields)
            );
        }
    }
}

/// Keeps every record in memory; used by tests and embedders that inspect
/// runtime diagnostics.
#[derive(Debug, Default)]
pub struct ZiCMemoryLogger {
    records: Mutex<Vec<ZiCLogRecord>>,
}

impl ZiCMemoryLogger {
    #[allow(non_snake_case)]
    pub fn ZiFNew() -> Self {
        Self::default()
    }

    #[allow(non_snake_case)]
    pub fn ZiFRecords(&self) -> Vec<ZiCLogRecord> {
        self.records
            .lock()
            .map(|records| records.clone())
            .unwrap_or_default()
    }

    #[allow(non_snake_case)]
    pub fn ZiFContains(&self, level: ZiCLogLevel, needle: &str) -> bool {
        self.ZiFRecords()
            .iter()
            .any(|r| r.level == level && r.message.contains(needle))
    }
}

impl ZiCLogger for ZiCMemoryLogger {
    fn log(&self, record: ZiCLogRecord) {
        if let Ok(mut records) = self.records.lock() {
            records.push(record);
        }
    }
}
