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

//! # Component Registry Module
//!
//! The registry is the single source of truth for what exists in a system and
//! how to build more of it.
//!
//! ## Registry Operations
//!
//! - Register component factories under unique factory IDs
//! - Create components through a factory and record them by component ID
//! - Look up components, operations, services and factories
//!
//! A component becomes visible only after its factory returned it and the
//! registry recorded it; a failed creation never leaves an entry behind.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::component::{ZiCComponent, ZiCComponentFactory, ZiCComponentKind};
use crate::config::ZiCComponentConfig;
use crate::errors::{Result, ZiError};

#[derive(Default)]
pub struct ZiCComponentRegistry {
    factories: RwLock<HashMap<String, Arc<dyn ZiCComponentFactory>>>,
    components: RwLock<HashMap<String, Arc<dyn ZiCComponent>>>,
}

impl std::fmt::Debug for ZiCComponentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZiCComponentRegistry")
            .field("factories", &self.ZiFListFactories())
            .field("components", &self.ZiFListComponents())
            .finish()
    }
}

fn read<T>(lock: &RwLock<T>) -> Result<RwLockReadGuard<'_, T>> {
    lock.read()
        .map_err(|_| ZiError::internal("component registry lock poisoned"))
}

fn write<T>(lock: &RwLock<T>) -> Result<RwLockWriteGuard<'_, T>> {
    lock.write()
        .map_err(|_| ZiError::internal("component registry lock poisoned"))
}

impl ZiCComponentRegistry {
    #[allow(non_snake_case)]
    pub fn ZiFNew() -> Self {
        Self::default()
    }

    /// Binds `factory_id`; a second binding fails and leaves the first active.
    #[allow(non_snake_case)]
    pub fn ZiFRegisterFactory(
        &self,
        factory_id: &str,
        factory: Arc<dyn ZiCComponentFactory>,
    ) -> Result<()> {
        let mut factories = write(&self.factories)?;
        if factories.contains_key(factory_id) {
            return Err(ZiError::FactoryAlreadyRegistered {
                factory_id: factory_id.to_string(),
            });
        }
        factories.insert(factory_id.to_string(), factory);
        log::debug!("registered component factory '{}'", factory_id);
        Ok(())
    }

    #[allow(non_snake_case)]
    pub fn ZiFGetComponentFactory(&self, factory_id: &str) -> Result<Arc<dyn ZiCComponentFactory>> {
        read(&self.factories)?
            .get(factory_id)
            .cloned()
            .ok_or_else(|| ZiError::factory_not_found(factory_id))
    }

    /// Builds a component with the factory named by `config.factory_id` and
    /// records it under `config.id`.
    ///
    /// The factory runs without holding any registry lock. If the ID got taken
    /// meanwhile the new instance is dropped and `ComponentAlreadyExists` is
    /// returned.
    #[allow(non_snake_case)]
    pub fn ZiFCreateComponent(&self, config: &ZiCComponentConfig) -> Result<Arc<dyn ZiCComponent>> {
        let factory = self.ZiFGetComponentFactory(&config.factory_id)?;
        let component = factory.create_component(config)?;
        self.record(&config.id, component)
    }

    /// Records an already built component, e.g. a service a plugin
    /// constructed itself.
    #[allow(non_snake_case)]
    pub fn ZiFRegisterComponent(&self, component: Arc<dyn ZiCComponent>) -> Result<Arc<dyn ZiCComponent>> {
        let id = component.id().to_string();
        self.record(&id, component)
    }

    fn record(&self, id: &str, component: Arc<dyn ZiCComponent>) -> Result<Arc<dyn ZiCComponent>> {
        let mut components = write(&self.components)?;
        if components.contains_key(id) {
            return Err(ZiError::ComponentAlreadyExists {
                component_id: id.to_string(),
            });
        }
        components.insert(id.to_string(), component.clone());
        log::debug!(
            "recorded {} component '{}' ({})",
            component.kind().as_str(),
            id,
            component.name()
        );
        Ok(component)
    }

    #[allow(non_snake_case)]
    pub fn ZiFGetComponent(&self, id: &str) -> Result<Arc<dyn ZiCComponent>> {
        read(&self.components)?
            .get(id)
            .cloned()
            .ok_or_else(|| ZiError::component_not_found(id))
    }

    /// Resolves a component that carries the Operation capability.
    #[allow(non_snake_case)]
    pub fn ZiFGetOperation(&self, id: &str) -> Result<Arc<dyn ZiCComponent>> {
        let component = self.ZiFGetComponent(id).map_err(|err| match err {
            ZiError::ComponentNotFound { component_id } => ZiError::OperationNotFound {
                operation_id: component_id,
            },
            other => other,
        })?;
        if component.kind() != ZiCComponentKind::Operation || component.as_operation().is_none() {
            return Err(ZiError::NotAnOperation {
                operation_id: id.to_string(),
            });
        }
        Ok(component)
    }

    #[allow(non_snake_case)]
    pub fn ZiFGetService(&self, id: &str) -> Result<Arc<dyn ZiCComponent>> {
        let component = self.ZiFGetComponent(id)?;
        if component.kind() != ZiCComponentKind::Service {
            return Err(ZiError::NotAService {
                service_id: id.to_string(),
            });
        }
        Ok(component)
    }

    #[allow(non_snake_case)]
    pub fn ZiFRemoveComponent(&self, id: &str) -> Result<Arc<dyn ZiCComponent>> {
        write(&self.components)?
            .remove(id)
            .ok_or_else(|| ZiError::component_not_found(id))
    }

    /// Sorted component IDs.
    #[allow(non_snake_case)]
    pub fn ZiFListComponents(&self) -> Vec<String> {
        let mut ids: Vec<String> = read(&self.components)
            .map(|components| components.keys().cloned().collect())
            .unwrap_or_default();
        ids.sort();
        ids
    }

    /// Sorted factory IDs.
    #[allow(non_snake_case)]
    pub fn ZiFListFactories(&self) -> Vec<String> {
        let mut ids: Vec<String> = read(&self.factories)
            .map(|factories| factories.keys().cloned().collect())
            .unwrap_or_default();
        ids.sort();
        ids
    }
}
