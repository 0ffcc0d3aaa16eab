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

//! # Entity Registry
//!
//! Declarative mapping metadata for entity and embeddable types. The registry
//! is populated once, either through the builder methods on the descriptors or
//! from JSON configuration, and is queried by the metadata resolver.
//!
//! ## JSON Layout
//!
//! ```json
//! {
//!   "entities": [
//!     {
//!       "name": "Order",
//!       "table": "orders",
//!       "identifier": {"name": "id"},
//!       "properties": [
//!         {"name": "status", "kind": "scalar"},
//!         {"name": "customer", "kind": "association", "column": "customer_id", "target": "Customer"},
//!         {"name": "shipping", "kind": "embedded", "embeddable": "Address"}
//!       ]
//!     }
//!   ],
//!   "embeddables": [
//!     {"name": "Address", "fields": [{"name": "street", "column": "ship_street"}]}
//!   ]
//! }
//! ```

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::errors::{Result, ZiError};

/// How a property occupies columns in its owner's table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ZiPropertyKind {
    /// A single column holding the value itself. The column defaults to the
    /// property name.
    Scalar {
        #[serde(default)]
        column: Option<String>,
    },
    /// A to-one reference stored as the target's identifier.
    Association {
        #[serde(default)]
        column: Option<String>,
        target: String,
    },
    /// A value object whose mapped fields are inlined as columns.
    Embedded { embeddable: String },
}

/// A declared property of an entity type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZiPropertyDescriptor {
    pub name: String,
    #[serde(flatten)]
    pub kind: ZiPropertyKind,
}

impl ZiPropertyDescriptor {
    pub fn scalar(name: impl Into<String>) -> Self {
        ZiPropertyDescriptor {
            name: name.into(),
            kind: ZiPropertyKind::Scalar { column: None },
        }
    }

    pub fn scalar_column(name: impl Into<String>, column: impl Into<String>) -> Self {
        ZiPropertyDescriptor {
            name: name.into(),
            kind: ZiPropertyKind::Scalar {
                column: Some(column.into()),
            },
        }
    }

    pub fn association(
        name: impl Into<String>,
        column: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        ZiPropertyDescriptor {
            name: name.into(),
            kind: ZiPropertyKind::Association {
                column: Some(column.into()),
                target: target.into(),
            },
        }
    }

    pub fn embedded(name: impl Into<String>, embeddable: impl Into<String>) -> Self {
        ZiPropertyDescriptor {
            name: name.into(),
            kind: ZiPropertyKind::Embedded {
                embeddable: embeddable.into(),
            },
        }
    }

    /// Column of a scalar or association property. `None` for embedded
    /// properties, whose columns come from the embeddable.
    pub fn column(&self) -> Option<&str> {
        match &self.kind {
            ZiPropertyKind::Scalar { column } | ZiPropertyKind::Association { column, .. } => {
                Some(column.as_deref().unwrap_or(&self.name))
            }
            ZiPropertyKind::Embedded { .. } => None,
        }
    }
}

/// Identifier property of an entity hierarchy. Always scalar.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZiIdentifierDescriptor {
    pub name: String,
    #[serde(default)]
    pub column: Option<String>,
}

impl ZiIdentifierDescriptor {
    pub fn column(&self) -> &str {
        self.column.as_deref().unwrap_or(&self.name)
    }

    /// The identifier viewed as a scalar property.
    pub fn as_property(&self) -> ZiPropertyDescriptor {
        ZiPropertyDescriptor {
            name: self.name.clone(),
            kind: ZiPropertyKind::Scalar {
                column: Some(self.column().to_string()),
            },
        }
    }
}

/// Mapping metadata for one entity type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZiEntityDescriptor {
    pub name: String,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub table: Option<String>,
    #[serde(default)]
    pub identifier: Option<ZiIdentifierDescriptor>,
    #[serde(default)]
    pub properties: Vec<ZiPropertyDescriptor>,
}

impl ZiEntityDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        ZiEntityDescriptor {
            name: name.into(),
            parent: None,
            table: None,
            identifier: None,
            properties: Vec::new(),
        }
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    /// Declares the identifier, stored in a column of the same name.
    pub fn with_identifier(mut self, name: impl Into<String>) -> Self {
        self.identifier = Some(ZiIdentifierDescriptor {
            name: name.into(),
            column: None,
        });
        self
    }

    pub fn with_identifier_column(mut self, name: impl Into<String>, column: impl Into<String>) -> Self {
        self.identifier = Some(ZiIdentifierDescriptor {
            name: name.into(),
            column: Some(column.into()),
        });
        self
    }

    pub fn with_property(mut self, property: ZiPropertyDescriptor) -> Self {
        self.properties.push(property);
        self
    }

    pub fn with_scalar(self, name: impl Into<String>) -> Self {
        self.with_property(ZiPropertyDescriptor::scalar(name))
    }

    pub fn with_column(self, name: impl Into<String>, column: impl Into<String>) -> Self {
        self.with_property(ZiPropertyDescriptor::scalar_column(name, column))
    }

    pub fn with_association(
        self,
        name: impl Into<String>,
        column: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        self.with_property(ZiPropertyDescriptor::association(name, column, target))
    }

    pub fn with_embedded(self, name: impl Into<String>, embeddable: impl Into<String>) -> Self {
        self.with_property(ZiPropertyDescriptor::embedded(name, embeddable))
    }
}

/// A field of an embeddable type. Fields without a column are not mapped.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZiEmbeddedField {
    pub name: String,
    #[serde(default)]
    pub column: Option<String>,
}

/// Mapping metadata for an embeddable value type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZiEmbeddableDescriptor {
    pub name: String,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub fields: Vec<ZiEmbeddedField>,
}

impl ZiEmbeddableDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        ZiEmbeddableDescriptor {
            name: name.into(),
            parent: None,
            fields: Vec::new(),
        }
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn with_field(mut self, name: impl Into<String>, column: impl Into<String>) -> Self {
        self.fields.push(ZiEmbeddedField {
            name: name.into(),
            column: Some(column.into()),
        });
        self
    }

    pub fn with_unmapped_field(mut self, name: impl Into<String>) -> Self {
        self.fields.push(ZiEmbeddedField {
            name: name.into(),
            column: None,
        });
        self
    }
}

/// Serialized form of a registry.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ZiRegistryConfig {
    #[serde(default)]
    pub entities: Vec<ZiEntityDescriptor>,
    #[serde(default)]
    pub embeddables: Vec<ZiEmbeddableDescriptor>,
}

/// Registry of entity and embeddable descriptors keyed by type name.
#[derive(Clone, Debug, Default)]
pub struct ZiEntityRegistry {
    entities: HashMap<String, ZiEntityDescriptor>,
    embeddables: HashMap<String, ZiEmbeddableDescriptor>,
}

impl ZiEntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds and validates a registry from its serialized form.
    pub fn from_config(config: ZiRegistryConfig) -> Result<Self> {
        let mut registry = ZiEntityRegistry::new();
        for embeddable in config.embeddables {
            registry.register_embeddable(embeddable)?;
        }
        for entity in config.entities {
            registry.register_entity(entity)?;
        }
        registry.validate()?;
        Ok(registry)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: ZiRegistryConfig = serde_json::from_str(json)
            .map_err(|e| ZiError::config(format!("invalid registry JSON: {}", e)))?;
        Self::from_config(config)
    }

    pub fn from_json_value(value: serde_json::Value) -> Result<Self> {
        let config: ZiRegistryConfig = serde_json::from_value(value)
            .map_err(|e| ZiError::config(format!("invalid registry JSON: {}", e)))?;
        Self::from_config(config)
    }

    /// Exports the registered descriptors, sorted by name.
    pub fn to_config(&self) -> ZiRegistryConfig {
        let mut entities: Vec<ZiEntityDescriptor> = self.entities.values().cloned().collect();
        entities.sort_by(|a, b| a.name.cmp(&b.name));
        let mut embeddables: Vec<ZiEmbeddableDescriptor> =
            self.embeddables.values().cloned().collect();
        embeddables.sort_by(|a, b| a.name.cmp(&b.name));
        ZiRegistryConfig {
            entities,
            embeddables,
        }
    }

    pub fn register_entity(&mut self, descriptor: ZiEntityDescriptor) -> Result<()> {
        if descriptor.name.is_empty() {
            return Err(ZiError::config("entity type name cannot be empty"));
        }
        if self.embeddables.contains_key(&descriptor.name) {
            return Err(ZiError::config(format!(
                "type '{}' is already registered as an embeddable",
                descriptor.name
            )));
        }
        if self.entities.contains_key(&descriptor.name) {
            return Err(ZiError::config(format!(
                "entity type '{}' registered twice",
                descriptor.name
            )));
        }
        self.entities.insert(descriptor.name.clone(), descriptor);
        Ok(())
    }

    pub fn register_embeddable(&mut self, descriptor: ZiEmbeddableDescriptor) -> Result<()> {
        if descriptor.name.is_empty() {
            return Err(ZiError::config("embeddable type name cannot be empty"));
        }
        if self.entities.contains_key(&descriptor.name) {
            return Err(ZiError::config(format!(
                "type '{}' is already registered as an entity",
                descriptor.name
            )));
        }
        if self.embeddables.contains_key(&descriptor.name) {
            return Err(ZiError::config(format!(
                "embeddable type '{}' registered twice",
                descriptor.name
            )));
        }
        self.embeddables.insert(descriptor.name.clone(), descriptor);
        Ok(())
    }

    /// Builder-style registration, returning the registry.
    pub fn with_entity(mut self, descriptor: ZiEntityDescriptor) -> Result<Self> {
        self.register_entity(descriptor)?;
        Ok(self)
    }

    pub fn with_embeddable(mut self, descriptor: ZiEmbeddableDescriptor) -> Result<Self> {
        self.register_embeddable(descriptor)?;
        Ok(self)
    }

    /// Descriptor of an entity type, `NoMetadataForType` when unknown.
    pub fn entity(&self, name: &str) -> Result<&ZiEntityDescriptor> {
        self.entities
            .get(name)
            .ok_or_else(|| ZiError::no_metadata(name))
    }

    /// Descriptor of an embeddable type, `NoMetadataForType` when unknown.
    pub fn embeddable(&self, name: &str) -> Result<&ZiEmbeddableDescriptor> {
        self.embeddables
            .get(name)
            .ok_or_else(|| ZiError::no_metadata(name))
    }

    pub fn contains_entity(&self, name: &str) -> bool {
        self.entities.contains_key(name)
    }

    pub fn contains_embeddable(&self, name: &str) -> bool {
        self.embeddables.contains_key(name)
    }

    /// Entity and embeddable descriptors together.
    pub fn len(&self) -> usize {
        self.entities.len() + self.embeddables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty() && self.embeddables.is_empty()
    }

    /// The entity type followed by its ancestors, nearest first.
    pub fn entity_ancestry(&self, name: &str) -> Result<Vec<&ZiEntityDescriptor>> {
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        let mut current = Some(name);
        while let Some(type_name) = current {
            if !seen.insert(type_name) {
                return Err(ZiError::config(format!(
                    "inheritance cycle through entity type '{}'",
                    type_name
                )));
            }
            let descriptor = self.entity(type_name)?;
            chain.push(descriptor);
            current = descriptor.parent.as_deref();
        }
        Ok(chain)
    }

    /// The embeddable type followed by its ancestors, nearest first.
    pub fn embeddable_ancestry(&self, name: &str) -> Result<Vec<&ZiEmbeddableDescriptor>> {
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        let mut current = Some(name);
        while let Some(type_name) = current {
            if !seen.insert(type_name) {
                return Err(ZiError::config(format!(
                    "inheritance cycle through embeddable type '{}'",
                    type_name
                )));
            }
            let descriptor = self.embeddable(type_name)?;
            chain.push(descriptor);
            current = descriptor.parent.as_deref();
        }
        Ok(chain)
    }

    /// Checks cross references: parents resolve without cycles, every entity
    /// has an identifier somewhere in its chain, associations target
    /// registered entities and embedded properties name registered
    /// embeddables.
    ///
    /// Table mappings are not checked here: abstract parents legitimately
    /// have none, and a missing table only matters for exported types.
    pub fn validate(&self) -> Result<()> {
        let mut names: Vec<&String> = self.entities.keys().collect();
        names.sort();
        for name in names {
            let chain = self.entity_ancestry(name)?;
            if chain.iter().all(|d| d.identifier.is_none()) {
                return Err(ZiError::config(format!(
                    "entity type '{}' has no identifier in its hierarchy",
                    name
                )));
            }
            for property in chain.iter().flat_map(|d| d.properties.iter()) {
                match &property.kind {
                    ZiPropertyKind::Association { target, .. } if !self.contains_entity(target) => {
                        return Err(ZiError::config(format!(
                            "association '{}.{}' targets unknown entity type '{}'",
                            name, property.name, target
                        )));
                    }
                    ZiPropertyKind::Embedded { embeddable } if !self.contains_embeddable(embeddable) => {
                        return Err(ZiError::config(format!(
                            "embedded property '{}.{}' names unknown embeddable '{}'",
                            name, property.name, embeddable
                        )));
                    }
                    _ => {}
                }
            }
        }

        let mut names: Vec<&String> = self.embeddables.keys().collect();
        names.sort();
        for name in names {
            self.embeddable_ancestry(name)?;
        }
        Ok(())
    }
}
