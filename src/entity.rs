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

//! # Zi Entity Module
//!
//! Live instances handed to the exporter. Every instance implements
//! [`ZiMapped`]: it reports its concrete type name, which keys all metadata
//! lookups, and answers property reads by name.
//!
//! Two implementations are provided:
//!
//! - [`ZiObject`]: a dynamic bag of named values, convenient for fixtures and
//!   for instances assembled from configuration
//! - [`ZiTypedEntity`]: wraps a plain Rust struct together with a shared
//!   [`ZiAccessorTable`] of getter closures, built once per type
//!
//! ```rust
//! use std::sync::Arc;
//! use zi_seed::entity::{ZiAccessorTable, ZiObject};
//!
//! struct Customer { id: i64, name: String }
//!
//! let accessors = Arc::new(
//!     ZiAccessorTable::new("Customer")
//!         .with("id", |c: &Customer| c.id.into())
//!         .with("name", |c: &Customer| c.name.clone().into()),
//! );
//! let customer = accessors.bind(Customer { id: 1, name: "Ada".into() });
//!
//! let order = ZiObject::new("Order").with("id", 10i64).with("status", "NEW");
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::value::ZiValue;

/// Contract every live instance fulfills.
pub trait ZiMapped {
    /// Concrete runtime type of the instance, as registered.
    fn type_name(&self) -> &str;

    /// Raw value of a property, or `None` when the instance has no such
    /// property.
    fn property(&self, name: &str) -> Option<ZiValue>;
}

impl fmt::Debug for dyn ZiMapped {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self.type_name())
    }
}

/// Dynamic instance storing its property values by name.
#[derive(Clone, Debug)]
pub struct ZiObject {
    type_name: String,
    values: HashMap<String, ZiValue>,
}

impl ZiObject {
    pub fn new(type_name: impl Into<String>) -> Self {
        ZiObject {
            type_name: type_name.into(),
            values: HashMap::new(),
        }
    }

    /// Sets a property value, consuming and returning the object.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<ZiValue>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<ZiValue>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&ZiValue> {
        self.values.get(name)
    }

    pub fn into_shared(self) -> Arc<dyn ZiMapped> {
        Arc::new(self)
    }
}

impl ZiMapped for ZiObject {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn property(&self, name: &str) -> Option<ZiValue> {
        self.values.get(name).cloned()
    }
}

/// Getter closure reading one property from a typed instance.
pub type ZiAccessor<T> = Arc<dyn Fn(&T) -> ZiValue + Send + Sync>;

/// Per-type table of property getters.
pub struct ZiAccessorTable<T> {
    type_name: String,
    accessors: HashMap<String, ZiAccessor<T>>,
}

impl<T> ZiAccessorTable<T> {
    pub fn new(type_name: impl Into<String>) -> Self {
        ZiAccessorTable {
            type_name: type_name.into(),
            accessors: HashMap::new(),
        }
    }

    /// Registers the getter for a property.
    pub fn with<F>(mut self, property: impl Into<String>, getter: F) -> Self
    where
        F: Fn(&T) -> ZiValue + Send + Sync + 'static,
    {
        self.accessors.insert(property.into(), Arc::new(getter));
        self
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn read(&self, value: &T, property: &str) -> Option<ZiValue> {
        self.accessors.get(property).map(|getter| getter(value))
    }

    /// Pairs a value with this table.
    pub fn bind(self: &Arc<Self>, value: T) -> ZiTypedEntity<T> {
        ZiTypedEntity::new(value, Arc::clone(self))
    }
}

impl<T> fmt::Debug for ZiAccessorTable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut properties: Vec<&String> = self.accessors.keys().collect();
        properties.sort();
        f.debug_struct("ZiAccessorTable")
            .field("type_name", &self.type_name)
            .field("properties", &properties)
            .finish()
    }
}

/// A typed value read through its type's accessor table.
pub struct ZiTypedEntity<T> {
    value: T,
    accessors: Arc<ZiAccessorTable<T>>,
}

impl<T> ZiTypedEntity<T> {
    pub fn new(value: T, accessors: Arc<ZiAccessorTable<T>>) -> Self {
        ZiTypedEntity { value, accessors }
    }

    pub fn value(&self) -> &T {
        &self.value
    }
}

impl<T> ZiMapped for ZiTypedEntity<T> {
    fn type_name(&self) -> &str {
        self.accessors.type_name()
    }

    fn property(&self, name: &str) -> Option<ZiValue> {
        self.accessors.read(&self.value, name)
    }
}
