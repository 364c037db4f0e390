//! Per-manager `(type, key) -> instance` table
//!
//! Command factories passed to
//! [`CommandManager::register_with`](super::CommandManager::register_with)
//! pull their collaborators from here instead of reaching for globals.

use std::any::{Any, TypeId};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::error::RegistrationError;

type Instance = Arc<dyn Any + Send + Sync>;

/// Registered dependency instances
#[derive(Default)]
pub struct Dependencies {
    entries: RwLock<HashMap<(TypeId, String), Instance>>,
}

impl Dependencies {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `instance` under its type name
    pub fn register<T: Any + Send + Sync>(&self, instance: Arc<T>) -> Result<(), RegistrationError> {
        self.register_keyed(std::any::type_name::<T>(), instance)
    }

    /// Register `instance` under an explicit key. Each `(type, key)` may only be registered once.
    pub fn register_keyed<T: Any + Send + Sync>(
        &self,
        key: &str,
        instance: Arc<T>,
    ) -> Result<(), RegistrationError> {
        let type_name = std::any::type_name::<T>();
        let mut entries = self.entries.write();
        match entries.entry((TypeId::of::<T>(), key.to_string())) {
            Entry::Occupied(_) => Err(RegistrationError::DuplicateDependency {
                type_name,
                key: key.to_string(),
            }),
            Entry::Vacant(slot) => {
                slot.insert(instance);
                debug!("Registered dependency {} ({})", type_name, key);
                Ok(())
            }
        }
    }

    /// Instance registered under `T`'s type name
    pub fn get<T: Any + Send + Sync>(&self) -> Result<Arc<T>, RegistrationError> {
        self.get_keyed(std::any::type_name::<T>())
    }

    pub fn get_keyed<T: Any + Send + Sync>(&self, key: &str) -> Result<Arc<T>, RegistrationError> {
        let unresolved = || RegistrationError::UnresolvedDependency {
            type_name: std::any::type_name::<T>(),
            key: key.to_string(),
        };
        let instance = self
            .entries
            .read()
            .get(&(TypeId::of::<T>(), key.to_string()))
            .cloned()
            .ok_or_else(unresolved)?;
        instance.downcast::<T>().map_err(|_| unresolved())
    }

    pub fn contains<T: Any + Send + Sync>(&self, key: &str) -> bool {
        self.entries
            .read()
            .contains_key(&(TypeId::of::<T>(), key.to_string()))
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
