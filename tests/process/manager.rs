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

//! # Zi Process Tests - ETL Process Manager
//!
//! Lifecycle ordering, rollback on partial failure and bookkeeping of the
//! process manager, driven through journaling mock components.
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test --test process
//! ```

#[path = "../common/mod.rs"]
mod common;

use std::sync::{Arc, Mutex};
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use tokio::sync::Notify;
use zi_runtime::component::{ZiCComponent, ZiCComponentFactory, ZiCComponentMetadata};
use zi_runtime::config::ZiCComponentConfig;
use zi_runtime::context::ZiCContext;
use zi_runtime::errors::{Result, ZiError};
use zi_runtime::events::{ZiCEvent, ZI_TOPIC_ALL};
use zi_runtime::id::ZiCSequentialIdGenerator;
use zi_runtime::log::{ZiCLogLevel, ZiCMemoryLogger};
use zi_runtime::process::{ZiCIntervalSchedule, ZiCProcessManager, ZiCProcessStatus};
use zi_runtime::system::ZiCSystem;

use common::*;

struct Harness {
    system: Arc<ZiCSystem>,
    logger: Arc<ZiCMemoryLogger>,
    manager: ZiCProcessManager,
    journal: Journal,
}

fn harness() -> Harness {
    let (system, logger) = test_system();
    let journal = Journal::default();
    system
        .ZiFComponentRegistry()
        .ZiFRegisterFactory(MOCK_FACTORY, recording_factory(journal.clone()))
        .unwrap();
    let manager = ZiCProcessManager::ZiFNew(system.clone(), Arc::new(ZiCSequentialIdGenerator::ZiFNew("proc-")));
    Harness {
        system,
        logger,
        manager,
        journal,
    }
}

const GATED_FACTORY: &str = "gatedFactory";

/// Component whose start blocks until the gate is notified.
#[derive(Debug)]
struct GatedComponent {
    metadata: ZiCComponentMetadata,
    journal: Journal,
    gate: Arc<Notify>,
}

#[async_trait]
impl ZiCComponent for GatedComponent {
    fn metadata(&self) -> &ZiCComponentMetadata {
        &self.metadata
    }

    async fn start(&self, _ctx: &ZiCContext) -> Result<()> {
        self.journal.push(format!("start-begin:{}", self.metadata.name));
        self.gate.notified().await;
        self.journal.push(format!("start:{}", self.metadata.name));
        Ok(())
    }

    async fn stop(&self, _ctx: &ZiCContext) -> Result<()> {
        self.journal.push(format!("stop:{}", self.metadata.name));
        Ok(())
    }
}

fn gated_factory(journal: Journal, gate: Arc<Notify>) -> Arc<dyn ZiCComponentFactory> {
    Arc::new(move |config: &ZiCComponentConfig| -> Result<Arc<dyn ZiCComponent>> {
        Ok(Arc::new(GatedComponent {
            metadata: ZiCComponentMetadata::ZiFFromConfig(config),
            journal: journal.clone(),
            gate: gate.clone(),
        }))
    })
}

async fn settle() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}

#[tokio::test]
async fn single_component_process_full_lifecycle() {
    let h = harness();
    let ctx = ZiCContext::ZiFBackground();

    let process = h
        .manager
        .ZiFInitializeProcess(&ctx, process_config(&["extract"]))
        .await
        .unwrap();
    assert_eq!(process.ZiFId(), "proc-1");
    assert_eq!(process.ZiFStatus(), ZiCProcessStatus::Initialized);
    assert!(process.ZiFComponent("extract").is_some());

    h.manager.ZiFStartProcess(&ctx, "proc-1").await.unwrap();
    assert_eq!(process.ZiFStatus(), ZiCProcessStatus::Running);

    h.manager.ZiFStopProcess(&ctx, "proc-1").await.unwrap();
    assert_eq!(
        h.manager.ZiFGetProcess("proc-1").unwrap().ZiFStatus(),
        ZiCProcessStatus::Stopped
    );

    h.manager.ZiFRemoveProcess("proc-1").unwrap();
    assert!(matches!(
        h.manager.ZiFGetProcess("proc-1"),
        Err(ZiError::ProcessNotFound { .. })
    ));

    assert_eq!(
        h.journal.entries(),
        vec!["create:extract", "initialize:extract", "start:extract", "stop:extract"]
    );
    assert!(h.logger.ZiFContains(ZiCLogLevel::Info, "process initialized"));
}

#[tokio::test]
async fn manager_shares_the_system_and_keeps_declared_order() {
    let h = harness();
    let process = h
        .manager
        .ZiFInitializeProcess(&ZiCContext::ZiFBackground(), process_config(&["extract"]))
        .await
        .unwrap();
    assert!(Arc::ptr_eq(h.manager.ZiFSystem(), &h.system));
    assert_eq!(process.ZiFComponentNames(), vec!["extract"]);
    assert_eq!(h.journal.with_prefix("initialize:"), vec!["initialize:extract"]);
}

#[tokio::test]
async fn init_failure_stops_exactly_the_components_before_it() {
    for n in 1..=5usize {
        for k in 1..=n {
            let h = harness();
            let names: Vec<String> = (1..=n).map(|i| format!("c{}", i)).collect();
            let refs: Vec<&str> = names.iter().map(String::as_str).collect();
            let failing = format!("c{}", k);
            let config = fail_at(process_config(&refs), &failing, "initialize");

            let err = h
                .manager
                .ZiFInitializeProcess(&ZiCContext::ZiFBackground(), config)
                .await
                .unwrap_err();

            assert!(
                matches!(err, ZiError::ComponentInitFailed { ref component, .. } if *component == failing),
                "n={} k={} err={}",
                n,
                k,
                err
            );
            let expected: Vec<String> = (1..k).map(|i| format!("stop:c{}", i)).collect();
            assert_eq!(h.journal.with_prefix("stop:"), expected, "n={} k={}", n, k);
            assert!(matches!(
                h.manager.ZiFGetProcess("proc-1"),
                Err(ZiError::ProcessNotFound { .. })
            ));
            assert!(h.manager.ZiFGetAllProcesses().unwrap().is_empty());
        }
    }
}

#[tokio::test]
async fn factory_failure_rolls_back_like_an_init_failure() {
    let h = harness();
    let mut config = process_config(&["extract", "transform", "load"]);
    config.components[1]
        .custom_config
        .insert("fail_factory".into(), serde_json::Value::Bool(true));

    let err = h
        .manager
        .ZiFInitializeProcess(&ZiCContext::ZiFBackground(), config)
        .await
        .unwrap_err();

    assert!(matches!(err, ZiError::ComponentInitFailed { ref component, .. } if component == "transform"));
    assert_eq!(h.journal.with_prefix("stop:"), vec!["stop:extract"]);
    assert!(h.journal.with_prefix("create:load").is_empty());
}

#[tokio::test]
async fn unknown_factory_is_reported_as_factory_not_found() {
    let h = harness();
    let mut config = process_config(&["extract", "load"]);
    config.components[1].factory_id = "missing".into();

    let err = h
        .manager
        .ZiFInitializeProcess(&ZiCContext::ZiFBackground(), config)
        .await
        .unwrap_err();

    assert!(matches!(err, ZiError::FactoryNotFound { ref factory_id } if factory_id == "missing"));
    assert_eq!(h.journal.with_prefix("stop:"), vec!["stop:extract"]);
}

#[tokio::test]
async fn empty_config_is_rejected_before_any_work() {
    let h = harness();
    let err = h
        .manager
        .ZiFInitializeProcess(&ZiCContext::ZiFBackground(), process_config(&[]))
        .await
        .unwrap_err();
    assert!(matches!(err, ZiError::EmptyProcessConfig));
    assert!(h.journal.entries().is_empty());
}

#[tokio::test]
async fn duplicate_component_names_are_rejected() {
    let h = harness();
    let err = h
        .manager
        .ZiFInitializeProcess(&ZiCContext::ZiFBackground(), process_config(&["extract", "extract"]))
        .await
        .unwrap_err();
    assert!(matches!(err, ZiError::Validation { .. }));
    assert!(h.journal.entries().is_empty());
}

#[tokio::test]
async fn start_and_stop_are_symmetric() {
    let h = harness();
    let ctx = ZiCContext::ZiFBackground();
    h.manager
        .ZiFInitializeProcess(&ctx, process_config(&["A", "B", "C"]))
        .await
        .unwrap();

    h.manager.ZiFStartProcess(&ctx, "proc-1").await.unwrap();
    h.manager.ZiFStopProcess(&ctx, "proc-1").await.unwrap();

    assert_eq!(h.journal.with_prefix("start:"), vec!["start:A", "start:B", "start:C"]);
    assert_eq!(h.journal.with_prefix("stop:"), vec!["stop:C", "stop:B", "stop:A"]);
}

#[tokio::test]
async fn start_failure_stops_what_was_started() {
    let h = harness();
    let ctx = ZiCContext::ZiFBackground();
    let config = fail_at(process_config(&["A", "B", "C"]), "B", "start");
    h.manager.ZiFInitializeProcess(&ctx, config).await.unwrap();

    let err = h.manager.ZiFStartProcess(&ctx, "proc-1").await.unwrap_err();

    assert!(matches!(err, ZiError::ComponentStartFailed { ref component, .. } if component == "B"));
    assert_eq!(h.journal.with_prefix("start:"), vec!["start:A", "start:B"]);
    assert_eq!(h.journal.with_prefix("stop:"), vec!["stop:A"]);
    assert_eq!(
        h.manager.ZiFGetProcess("proc-1").unwrap().ZiFStatus(),
        ZiCProcessStatus::Initialized
    );
}

#[tokio::test]
async fn stop_failure_aborts_and_keeps_the_status() {
    let h = harness();
    let ctx = ZiCContext::ZiFBackground();
    let config = fail_at(process_config(&["A", "B", "C"]), "B", "stop");
    h.manager.ZiFInitializeProcess(&ctx, config).await.unwrap();
    h.manager.ZiFStartProcess(&ctx, "proc-1").await.unwrap();

    let err = h.manager.ZiFStopProcess(&ctx, "proc-1").await.unwrap_err();

    assert!(matches!(err, ZiError::ComponentStopFailed { ref component, .. } if component == "B"));
    assert_eq!(h.journal.with_prefix("stop:"), vec!["stop:C", "stop:B"]);
    assert_eq!(
        h.manager.ZiFGetProcess("proc-1").unwrap().ZiFStatus(),
        ZiCProcessStatus::Running
    );
}

#[tokio::test]
async fn restart_stops_then_starts() {
    let h = harness();
    let ctx = ZiCContext::ZiFBackground();
    h.manager
        .ZiFInitializeProcess(&ctx, process_config(&["A", "B"]))
        .await
        .unwrap();
    h.manager.ZiFStartProcess(&ctx, "proc-1").await.unwrap();

    h.manager.ZiFRestartProcess(&ctx, "proc-1").await.unwrap();

    let lifecycle: Vec<String> = h
        .journal
        .entries()
        .into_iter()
        .filter(|e| e.starts_with("start:") || e.starts_with("stop:"))
        .collect();
    assert_eq!(
        lifecycle,
        vec!["start:A", "start:B", "stop:B", "stop:A", "start:A", "start:B"]
    );
    assert_eq!(
        h.manager.ZiFGetProcess("proc-1").unwrap().ZiFStatus(),
        ZiCProcessStatus::Running
    );
}

#[tokio::test]
async fn remove_is_not_idempotent() {
    let h = harness();
    h.manager
        .ZiFInitializeProcess(&ZiCContext::ZiFBackground(), process_config(&["extract"]))
        .await
        .unwrap();

    h.manager.ZiFRemoveProcess("proc-1").unwrap();
    assert!(matches!(
        h.manager.ZiFRemoveProcess("proc-1"),
        Err(ZiError::ProcessNotFound { ref process_id }) if process_id == "proc-1"
    ));
}

#[tokio::test]
async fn removing_a_running_process_does_not_stop_it() {
    let h = harness();
    let ctx = ZiCContext::ZiFBackground();
    h.manager
        .ZiFInitializeProcess(&ctx, process_config(&["extract"]))
        .await
        .unwrap();
    h.manager.ZiFStartProcess(&ctx, "proc-1").await.unwrap();

    let removed = h.manager.ZiFRemoveProcess("proc-1").unwrap();
    assert_eq!(removed.ZiFStatus(), ZiCProcessStatus::Running);
    assert!(h.journal.with_prefix("stop:").is_empty());
}

#[tokio::test]
async fn lifecycle_calls_on_unknown_ids_fail() {
    let h = harness();
    let ctx = ZiCContext::ZiFBackground();
    assert!(matches!(
        h.manager.ZiFStartProcess(&ctx, "missing-id").await,
        Err(ZiError::ProcessNotFound { .. })
    ));
    assert!(matches!(
        h.manager.ZiFStopProcess(&ctx, "missing-id").await,
        Err(ZiError::ProcessNotFound { .. })
    ));
    assert!(matches!(
        h.manager.ZiFMarkProcessFailed("missing-id", "x").await,
        Err(ZiError::ProcessNotFound { .. })
    ));
}

#[tokio::test]
async fn processes_are_listed_in_creation_order() {
    let h = harness();
    let ctx = ZiCContext::ZiFBackground();
    for _ in 0..12 {
        h.manager
            .ZiFInitializeProcess(&ctx, process_config(&["extract"]))
            .await
            .unwrap();
    }

    let ids: Vec<String> = h
        .manager
        .ZiFGetAllProcesses()
        .unwrap()
        .iter()
        .map(|p| p.ZiFId().to_string())
        .collect();
    let expected: Vec<String> = (1..=12).map(|i| format!("proc-{}", i)).collect();
    assert_eq!(ids, expected);
}

#[tokio::test]
async fn mark_failed_records_the_reason() {
    let h = harness();
    let process = h
        .manager
        .ZiFInitializeProcess(&ZiCContext::ZiFBackground(), process_config(&["extract"]))
        .await
        .unwrap();

    h.manager.ZiFMarkProcessFailed("proc-1", "source vanished").await.unwrap();

    assert_eq!(
        process.ZiFStatus(),
        ZiCProcessStatus::Failed("source vanished".into())
    );
    let snapshot = process.ZiFSnapshot();
    assert_eq!(snapshot.status, "failed");
    assert_eq!(snapshot.failure.as_deref(), Some("source vanished"));
    assert!(h.logger.ZiFContains(ZiCLogLevel::Error, "process marked failed"));
}

#[tokio::test]
async fn failed_process_cannot_be_started_or_restarted() {
    let h = harness();
    let ctx = ZiCContext::ZiFBackground();
    h.manager
        .ZiFInitializeProcess(&ctx, process_config(&["A", "B"]))
        .await
        .unwrap();
    h.manager.ZiFStartProcess(&ctx, "proc-1").await.unwrap();
    h.manager.ZiFMarkProcessFailed("proc-1", "disk full").await.unwrap();

    assert!(matches!(
        h.manager.ZiFStartProcess(&ctx, "proc-1").await,
        Err(ZiError::Validation { .. })
    ));
    assert!(matches!(
        h.manager.ZiFRestartProcess(&ctx, "proc-1").await,
        Err(ZiError::Validation { .. })
    ));
    assert_eq!(
        h.manager.ZiFGetProcess("proc-1").unwrap().ZiFStatus(),
        ZiCProcessStatus::Failed("disk full".into())
    );
    assert_eq!(h.journal.with_prefix("start:"), vec!["start:A", "start:B"]);
    assert!(h.journal.with_prefix("stop:").is_empty());

    // Removing and re-initializing is the way back.
    h.manager.ZiFRemoveProcess("proc-1").unwrap();
    h.manager
        .ZiFInitializeProcess(&ctx, process_config(&["A", "B"]))
        .await
        .unwrap();
    h.manager.ZiFStartProcess(&ctx, "proc-2").await.unwrap();
}

#[tokio::test]
async fn lifecycle_calls_on_one_process_are_serialized() {
    let Harness {
        system,
        manager,
        journal,
        ..
    } = harness();
    let gate = Arc::new(Notify::new());
    system
        .ZiFComponentRegistry()
        .ZiFRegisterFactory(GATED_FACTORY, gated_factory(journal.clone(), gate.clone()))
        .unwrap();
    let manager = Arc::new(manager);
    let ctx = ZiCContext::ZiFBackground();

    let mut config = process_config(&["gated"]);
    config.components[0].factory_id = GATED_FACTORY.into();
    manager.ZiFInitializeProcess(&ctx, config).await.unwrap();

    let start = tokio::spawn({
        let manager = manager.clone();
        async move { manager.ZiFStartProcess(&ZiCContext::ZiFBackground(), "proc-1").await }
    });
    tokio::time::timeout(StdDuration::from_secs(5), async {
        while journal.with_prefix("start-begin:").is_empty() {
            tokio::task::yield_now().await;
        }
    })
    .await
    .unwrap();

    // Other calls are not blocked by a component that is still starting.
    assert_eq!(
        manager.ZiFGetProcess("proc-1").unwrap().ZiFStatus(),
        ZiCProcessStatus::Initialized
    );
    let other = tokio::time::timeout(
        StdDuration::from_secs(5),
        manager.ZiFInitializeProcess(&ctx, process_config(&["other"])),
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(other.ZiFId(), "proc-2");
    assert_eq!(manager.ZiFGetAllProcesses().unwrap().len(), 2);

    let stop = tokio::spawn({
        let manager = manager.clone();
        async move { manager.ZiFStopProcess(&ZiCContext::ZiFBackground(), "proc-1").await }
    });
    let mark_failed = tokio::spawn({
        let manager = manager.clone();
        async move { manager.ZiFMarkProcessFailed("proc-1", "operator abort").await }
    });
    settle().await;
    assert!(!stop.is_finished());
    assert!(!mark_failed.is_finished());
    assert!(journal.with_prefix("stop:gated").is_empty());
    assert_eq!(
        manager.ZiFGetProcess("proc-1").unwrap().ZiFStatus(),
        ZiCProcessStatus::Initialized
    );

    gate.notify_one();
    start.await.unwrap().unwrap();
    stop.await.unwrap().unwrap();
    mark_failed.await.unwrap().unwrap();

    let gated: Vec<String> = journal
        .entries()
        .into_iter()
        .filter(|e| e.ends_with(":gated") && !e.starts_with("create:") && !e.starts_with("initialize:"))
        .collect();
    assert_eq!(gated, vec!["start-begin:gated", "start:gated", "stop:gated"]);
    assert_eq!(
        manager.ZiFGetProcess("proc-1").unwrap().ZiFStatus(),
        ZiCProcessStatus::Failed("operator abort".into())
    );
}

#[tokio::test]
async fn cancelled_context_fails_fast() {
    let h = harness();
    let ctx = ZiCContext::ZiFBackground();
    h.manager
        .ZiFInitializeProcess(&ctx, process_config(&["extract"]))
        .await
        .unwrap();

    let cancelled = ctx.ZiFChild();
    cancelled.ZiFCancel();

    assert!(matches!(
        h.manager
            .ZiFInitializeProcess(&cancelled, process_config(&["other"]))
            .await,
        Err(ZiError::Cancelled)
    ));
    assert!(matches!(
        h.manager.ZiFStartProcess(&cancelled, "proc-1").await,
        Err(ZiError::Cancelled)
    ));
    assert!(h.journal.with_prefix("create:other").is_empty());
    assert!(h.journal.with_prefix("start:").is_empty());
    assert!(!ctx.ZiFIsCancelled());
}

#[tokio::test]
async fn lifecycle_events_are_published() {
    let h = harness();
    let ctx = ZiCContext::ZiFBackground();
    let seen: Arc<Mutex<Vec<String>>> = Arc::default();
    let sink = seen.clone();
    h.system.ZiFEventBus().subscribe(
        ZI_TOPIC_ALL,
        Arc::new(move |event: &ZiCEvent| {
            sink.lock().unwrap().push(event.topic.clone());
        }),
    );

    h.manager
        .ZiFInitializeProcess(&ctx, process_config(&["extract"]))
        .await
        .unwrap();
    h.manager.ZiFStartProcess(&ctx, "proc-1").await.unwrap();
    h.manager.ZiFStopProcess(&ctx, "proc-1").await.unwrap();
    h.manager.ZiFMarkProcessFailed("proc-1", "late failure").await.unwrap();
    h.manager.ZiFRemoveProcess("proc-1").unwrap();

    assert_eq!(
        *seen.lock().unwrap(),
        vec![
            "process.initialized",
            "process.started",
            "process.stopped",
            "process.failed",
            "process.removed"
        ]
    );
}

#[tokio::test]
async fn scheduled_process_reports_its_next_run() {
    let h = harness();
    h.manager
        .ZiFInitializeProcess(&ZiCContext::ZiFBackground(), process_config(&["extract"]))
        .await
        .unwrap();

    let anchor = Utc::now();
    let schedule = ZiCIntervalSchedule::ZiFNew(anchor, Duration::minutes(5)).unwrap();
    let scheduled = h
        .manager
        .ZiFScheduleProcess("proc-1", Arc::new(schedule))
        .unwrap();

    assert_eq!(scheduled.process.ZiFId(), "proc-1");
    assert_eq!(scheduled.ZiFNextRun(anchor), Some(anchor + Duration::minutes(5)));
    assert!(h
        .manager
        .ZiFScheduleProcess("missing-id", Arc::new(ZiCIntervalSchedule::ZiFNew(anchor, Duration::minutes(1)).unwrap()))
        .is_err());
}
