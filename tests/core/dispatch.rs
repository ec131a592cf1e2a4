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

//! # Zi Core Tests - Operation Dispatch
//!
//! ```bash
//! cargo test --test dispatch
//! ```

#[path = "../common/mod.rs"]
mod common;

use std::sync::Arc;

use serde_json::json;
use zi_runtime::config::ZiCComponentConfig;
use zi_runtime::context::ZiCContext;
use zi_runtime::dispatch::ZiCOperationDispatcher;
use zi_runtime::errors::ZiError;
use zi_runtime::registry::ZiCComponentRegistry;

use common::*;

fn registry_with_echo() -> Arc<ZiCComponentRegistry> {
    let registry = Arc::new(ZiCComponentRegistry::ZiFNew());
    registry
        .ZiFRegisterComponent(Arc::new(EchoOperation::new("echo")))
        .unwrap();
    registry.ZiFRegisterFactory("plain", plain_factory()).unwrap();
    registry
        .ZiFCreateComponent(&ZiCComponentConfig::ZiFNew("not-an-op", "plain", "plain"))
        .unwrap();
    registry
}

#[tokio::test]
async fn execute_returns_the_operation_output() {
    let dispatcher = ZiCOperationDispatcher::ZiFNew(registry_with_echo());
    let out = dispatcher
        .ZiFExecute(&ZiCContext::ZiFBackground(), "echo", json!({"rows": 3}))
        .await
        .unwrap();
    assert_eq!(out, json!({"echo": {"rows": 3}}));
}

#[tokio::test]
async fn unknown_id_is_operation_not_found() {
    let dispatcher = ZiCOperationDispatcher::ZiFNew(registry_with_echo());
    let err = dispatcher
        .ZiFExecute(&ZiCContext::ZiFBackground(), "missing", json!({}))
        .await
        .unwrap_err();
    assert!(matches!(err, ZiError::OperationNotFound { ref operation_id } if operation_id == "missing"));
}

#[tokio::test]
async fn plain_component_is_not_an_operation() {
    let dispatcher = ZiCOperationDispatcher::ZiFNew(registry_with_echo());
    let err = dispatcher
        .ZiFExecute(&ZiCContext::ZiFBackground(), "not-an-op", json!({}))
        .await
        .unwrap_err();
    assert!(matches!(err, ZiError::NotAnOperation { ref operation_id } if operation_id == "not-an-op"));
}

#[tokio::test]
async fn execution_failure_is_wrapped_with_the_operation_id() {
    let dispatcher = ZiCOperationDispatcher::ZiFNew(registry_with_echo());
    let err = dispatcher
        .ZiFExecute(&ZiCContext::ZiFBackground(), "echo", json!({"fail": true}))
        .await
        .unwrap_err();

    match &err {
        ZiError::OperationFailed { operation_id, source } => {
            assert_eq!(operation_id, "echo");
            assert!(matches!(**source, ZiError::Component { .. }));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(std::error::Error::source(&err).is_some());
}

#[tokio::test]
async fn system_routes_execute_operation_through_its_registry() {
    let (system, _logger) = test_system();
    system
        .ZiFComponentRegistry()
        .ZiFRegisterComponent(Arc::new(EchoOperation::new("echo")))
        .unwrap();

    let out = system
        .ZiFExecuteOperation(&ZiCContext::ZiFBackground(), "echo", json!("hi"))
        .await
        .unwrap();
    assert_eq!(out["echo"], json!("hi"));
}
