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

//! # Event Bus
//!
//! Topic-based notifications published by the runtime and by components.
//! The runtime works unchanged with [`ZiCNoopEventBus`]; nothing depends on an
//! event being delivered.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Subscribing to this topic receives every event.
pub const ZI_TOPIC_ALL: &str = "*";

pub const ZI_TOPIC_PROCESS_INITIALIZED: &str = "process.initialized";
pub const ZI_TOPIC_PROCESS_STARTED: &str = "process.started";
pub const ZI_TOPIC_PROCESS_STOPPED: &str = "process.stopped";
pub const ZI_TOPIC_PROCESS_FAILED: &str = "process.failed";
pub const ZI_TOPIC_PROCESS_REMOVED: &str = "process.removed";

// Published by ETL components, not by the runtime.
pub const ZI_TOPIC_COMPONENT_EXTRACTED: &str = "component.extracted";
pub const ZI_TOPIC_COMPONENT_TRANSFORMED: &str = "component.transformed";
pub const ZI_TOPIC_COMPONENT_LOADED: &str = "component.loaded";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ZiCEvent {
    pub topic: String,
    pub payload: Value,
    pub timestamp: DateTime<Utc>,
}

impl ZiCEvent {
    #[allow(non_snake_case)]
    pub fn ZiFNew(topic: impl Into<String>, payload: Value) -> Self {
        Self {
            topic: topic.into(),
            payload,
            timestamp: Utc::now(),
        }
    }
}

pub type ZiCEventHandler = Arc<dyn Fn(&ZiCEvent) + Send + Sync>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ZiCSubscriptionId(pub u64);

pub trait ZiCEventBus: Send + Sync {
    fn publish(&self, event: ZiCEvent);

    fn subscribe(&self, topic: &str, handler: ZiCEventHandler) -> ZiCSubscriptionId;

    /// Returns `false` when the subscription was unknown.
    fn unsubscribe(&self, id: ZiCSubscriptionId) -> bool;
}

/// Discards every event.
#[derive(Debug, Default)]
pub struct ZiCNoopEventBus {
    next_id: AtomicU64,
}

impl ZiCEventBus for ZiCNoopEventBus {
    fn publish(&self, _event: ZiCEvent) {}

    fn subscribe(&self, _topic: &str, _handler: ZiCEventHandler) -> ZiCSubscriptionId {
        ZiCSubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    fn unsubscribe(&self, _id: ZiCSubscriptionId) -> bool {
        false
    }
}

/// Delivers events synchronously on the publishing thread.
///
/// Handlers are cloned out of the lock before being called, so a handler may
/// publish or subscribe without deadlocking.
#[derive(Default)]
pub struct ZiCInMemoryEventBus {
    subscribers: RwLock<HashMap<String, Vec<(ZiCSubscriptionId, ZiCEventHandler)>>>,
    next_id: AtomicU64,
}

impl ZiCInMemoryEventBus {
    #[allow(non_snake_case)]
    pub fn ZiFNew() -> Self {
        Self::default()
    }

    #[allow(non_snake_case)]
    pub fn ZiFSubscriberCount(&self, topic: &str) -> usize {
        self.subscribers
            .read()
            .map(|subs| subs.get(topic).map(Vec::len).unwrap_or(0))
            .unwrap_or(0)
    }
}

impl std::fmt::Debug for ZiCInMemoryEventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let topics: Vec<String> = self
            .subscribers
            .read()
            .map(|subs| subs.keys().cloned().collect())
            .unwrap_or_default();
        f.debug_struct("ZiCInMemoryEventBus")
            .field("topics", &topics)
            .finish()
    }
}

impl ZiCEventBus for ZiCInMemoryEventBus {
    fn publish(&self, event: ZiCEvent) {
        let topics: Vec<&str> = if event.topic == ZI_TOPIC_ALL {
            vec![ZI_TOPIC_ALL]
        } else {
            vec![event.topic.as_str(), ZI_TOPIC_ALL]
        };
        let handlers: Vec<ZiCEventHandler> = match self.subscribers.read() {
            Ok(subs) => topics
                .iter()
                .filter_map(|topic| subs.get(*topic))
                .flatten()
                .map(|(_, handler)| handler.clone())
                .collect(),
            Err(_) => return,
        };
        for handler in handlers {
            handler(&event);
        }
    }

    fn subscribe(&self, topic: &str, handler: ZiCEventHandler) -> ZiCSubscriptionId {
        let id = ZiCSubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        if let Ok(mut subs) = self.subscribers.write() {
            subs.entry(topic.to_string()).or_default().push((id, handler));
        }
        id
    }

    fn unsubscribe(&self, id: ZiCSubscriptionId) -> bool {
        let Ok(mut subs) = self.subscribers.write() else {
            return false;
        };
        let mut removed = false;
        for handlers in subs.values_mut() {
            let before = handlers.len();
            handlers.retain(|(sub_id, _)| *sub_id != id);
            removed |= handlers.len() != before;
        }
        subs.retain(|_, handlers| !handlers.is_empty());
        removed
    }
}
