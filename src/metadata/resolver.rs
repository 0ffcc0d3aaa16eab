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

//! # Metadata Resolver
//!
//! Answers layout questions about entity types (table, ordered properties,
//! columns) and reads cell values from live instances, reducing associations
//! to the referenced identifier and embedded components to the field backing
//! the requested column.
//!
//! Nothing is cached: every call walks the registry again. Callers that
//! resolve many rows of one type should build a [`ZiEntityLayout`] once.

use std::collections::HashMap;
use std::fmt;

use crate::diagnostics::{ZiDiagnosticEvent, ZiDiagnosticLevel, ZiDiagnostics, ZiLogDiagnostics};
use crate::entity::ZiMapped;
use crate::errors::{Result, ZiError};
use crate::metadata::mapping::ZiColumnMapping;
use crate::metadata::registry::{
    ZiEntityRegistry, ZiIdentifierDescriptor, ZiPropertyDescriptor, ZiPropertyKind,
};
use crate::value::ZiValue;

/// Column layout of one entity type, resolved once per export.
#[derive(Clone, Debug)]
pub struct ZiEntityLayout {
    pub entity_type: String,
    /// Table inherited through the ancestor chain.
    pub table: String,
    pub identifier: ZiIdentifierDescriptor,
    /// Identifier first, then every other property.
    pub properties: Vec<ZiPropertyDescriptor>,
    /// Column to property, embedded fields expanded.
    pub columns: ZiColumnMapping,
}

impl ZiEntityLayout {
    pub fn property(&self, name: &str) -> Option<&ZiPropertyDescriptor> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Property backing `column` for this type, if the type maps it.
    pub fn property_for_column(&self, column: &str) -> Option<&ZiPropertyDescriptor> {
        self.columns.get(column).and_then(|name| self.property(name))
    }
}

/// Resolves mapping metadata against an entity registry.
#[derive(Clone, Copy)]
pub struct ZiMetadataResolver<'a> {
    registry: &'a ZiEntityRegistry,
    diagnostics: Option<&'a dyn ZiDiagnostics>,
}

impl<'a> ZiMetadataResolver<'a> {
    pub fn new(registry: &'a ZiEntityRegistry) -> Self {
        ZiMetadataResolver {
            registry,
            diagnostics: None,
        }
    }

    /// Same resolver reporting degraded cells to `diagnostics` instead of
    /// the `log` facade.
    pub fn with_diagnostics<'b>(&self, diagnostics: &'b dyn ZiDiagnostics) -> ZiMetadataResolver<'b>
    where
        'a: 'b,
    {
        ZiMetadataResolver {
            registry: self.registry,
            diagnostics: Some(diagnostics),
        }
    }

    pub fn registry(&self) -> &'a ZiEntityRegistry {
        self.registry
    }

    /// Nearest table declared in the type's ancestor chain.
    pub fn resolve_table(&self, entity_type: &str) -> Result<String> {
        let chain = self.registry.entity_ancestry(entity_type)?;
        let table = chain
            .iter()
            .find_map(|descriptor| descriptor.table.clone())
            .ok_or_else(|| ZiError::no_table_mapping(entity_type))?;
        log::debug!("entity type '{}' maps to table '{}'", entity_type, table);
        Ok(table)
    }

    /// Nearest identifier declared in the type's ancestor chain.
    pub fn resolve_identifier_property(&self, entity_type: &str) -> Result<ZiIdentifierDescriptor> {
        self.registry
            .entity_ancestry(entity_type)?
            .iter()
            .find_map(|descriptor| descriptor.identifier.clone())
            .ok_or_else(|| {
                ZiError::config(format!(
                    "entity type '{}' has no identifier in its hierarchy",
                    entity_type
                ))
            })
    }

    /// Identifier first, then inherited properties (root first), then the
    /// type's own. A re-declared property keeps the ancestor's position.
    pub fn resolve_properties(&self, entity_type: &str) -> Result<Vec<ZiPropertyDescriptor>> {
        let chain = self.registry.entity_ancestry(entity_type)?;
        let identifier = self.resolve_identifier_property(entity_type)?;

        let mut properties = vec![identifier.as_property()];
        let mut positions: HashMap<&str, usize> = HashMap::new();
        for descriptor in chain.iter().rev() {
            for property in &descriptor.properties {
                if property.name == identifier.name {
                    continue;
                }
                match positions.get(property.name.as_str()) {
                    Some(&pos) => properties[pos] = property.clone(),
                    None => {
                        positions.insert(property.name.as_str(), properties.len());
                        properties.push(property.clone());
                    }
                }
            }
        }
        Ok(properties)
    }

    /// Columns occupied by one property of the type.
    pub fn resolve_columns_for_property(&self, entity_type: &str, property: &str) -> Result<Vec<String>> {
        let properties = self.resolve_properties(entity_type)?;
        let descriptor = properties
            .iter()
            .find(|p| p.name == property)
            .ok_or_else(|| ZiError::property(entity_type, property, "property is not mapped"))?;
        self.columns_of(descriptor)
    }

    fn columns_of(&self, property: &ZiPropertyDescriptor) -> Result<Vec<String>> {
        match &property.kind {
            ZiPropertyKind::Scalar { column } | ZiPropertyKind::Association { column, .. } => {
                Ok(vec![column.clone().unwrap_or_else(|| property.name.clone())])
            }
            ZiPropertyKind::Embedded { embeddable } => Ok(self
                .resolve_embedded_column_mapping(embeddable)?
                .columns()
                .map(str::to_string)
                .collect()),
        }
    }

    /// Column → property mapping of the type, in property order.
    pub fn resolve_column_mapping(&self, entity_type: &str) -> Result<ZiColumnMapping> {
        let mut mapping = ZiColumnMapping::new();
        for property in self.resolve_properties(entity_type)? {
            for column in self.columns_of(&property)? {
                mapping.insert(column, property.name.clone());
            }
        }
        Ok(mapping)
    }

    /// Column → field mapping of an embeddable: mapped fields of the type
    /// itself, then those of its ancestors.
    pub fn resolve_embedded_column_mapping(&self, embeddable: &str) -> Result<ZiColumnMapping> {
        let mut mapping = ZiColumnMapping::new();
        for descriptor in self.registry.embeddable_ancestry(embeddable)? {
            for field in &descriptor.fields {
                if let Some(column) = &field.column {
                    mapping.insert(column.clone(), field.name.clone());
                }
            }
        }
        Ok(mapping)
    }

    pub fn resolve_layout(&self, entity_type: &str) -> Result<ZiEntityLayout> {
        Ok(ZiEntityLayout {
            entity_type: entity_type.to_string(),
            table: self.resolve_table(entity_type)?,
            identifier: self.resolve_identifier_property(entity_type)?,
            properties: self.resolve_properties(entity_type)?,
            columns: self.resolve_column_mapping(entity_type)?,
        })
    }

    /// Identifier of a live instance, read through its type's identifier
    /// property and returned verbatim.
    pub fn resolve_identifier(&self, instance: &dyn ZiMapped) -> Result<ZiValue> {
        self.identifier_as(instance.type_name(), instance)
    }

    fn identifier_as(&self, entity_type: &str, instance: &dyn ZiMapped) -> Result<ZiValue> {
        let identifier = self.resolve_identifier_property(entity_type)?;
        match instance.property(&identifier.name) {
            None => Err(ZiError::identifier(
                entity_type,
                format!("instance does not expose identifier '{}'", identifier.name),
            )),
            Some(value @ (ZiValue::Entity(_) | ZiValue::Component(_))) => Err(ZiError::identifier(
                entity_type,
                format!("identifier '{}' holds a {} value", identifier.name, value.kind_name()),
            )),
            Some(value) => Ok(value),
        }
    }

    /// Value of `property` for `column`, with association and embedding
    /// reduction applied.
    pub fn resolve_value(&self, instance: &dyn ZiMapped, property: &str, column: &str) -> Result<ZiValue> {
        let entity_type = instance.type_name();
        let properties = self.resolve_properties(entity_type)?;
        let descriptor = properties
            .iter()
            .find(|p| p.name == property)
            .ok_or_else(|| ZiError::property(entity_type, property, "property is not mapped"))?;
        self.reduce_value(instance, descriptor, column)
    }

    /// Same as [`resolve_value`](Self::resolve_value) with the descriptor
    /// already looked up.
    pub fn reduce_value(
        &self,
        instance: &dyn ZiMapped,
        property: &ZiPropertyDescriptor,
        column: &str,
    ) -> Result<ZiValue> {
        let entity_type = instance.type_name();
        let raw = instance.property(&property.name).ok_or_else(|| {
            ZiError::property(entity_type, &property.name, "instance does not expose this property")
        })?;

        match (&property.kind, raw) {
            (_, ZiValue::Null) => Ok(ZiValue::Null),
            (ZiPropertyKind::Scalar { .. }, value @ (ZiValue::Entity(_) | ZiValue::Component(_))) => {
                Err(ZiError::property(
                    entity_type,
                    &property.name,
                    format!("scalar property holds a {} value", value.kind_name()),
                ))
            }
            (ZiPropertyKind::Scalar { .. }, value) => Ok(value),
            (ZiPropertyKind::Association { target, .. }, ZiValue::Entity(referenced)) => self
                .identifier_as(target, referenced.as_ref())
                .map_err(|e| ZiError::property(entity_type, &property.name, e.to_string())),
            (ZiPropertyKind::Association { .. }, ZiValue::Component(_)) => Err(ZiError::property(
                entity_type,
                &property.name,
                "association holds a component value",
            )),
            // Already a foreign key.
            (ZiPropertyKind::Association { .. }, value) => Ok(value),
            (ZiPropertyKind::Embedded { embeddable }, ZiValue::Component(component)) => {
                Ok(self.component_value(embeddable, component.as_ref(), column))
            }
            (ZiPropertyKind::Embedded { .. }, value) => Err(ZiError::property(
                entity_type,
                &property.name,
                format!("embedded property holds a {} value", value.kind_name()),
            )),
        }
    }

    /// Field of `component` backing `column`. Any lookup failure yields null.
    fn component_value(&self, declared: &str, component: &dyn ZiMapped, column: &str) -> ZiValue {
        let embeddable = if self.registry.contains_embeddable(component.type_name()) {
            component.type_name()
        } else {
            declared
        };

        let mapping = match self.resolve_embedded_column_mapping(embeddable) {
            Ok(mapping) => mapping,
            Err(err) => {
                self.degraded(column, embeddable, None, &err.to_string());
                return ZiValue::Null;
            }
        };
        let Some(field) = mapping.get(column) else {
            return ZiValue::Null;
        };

        match component.property(field) {
            Some(ZiValue::Entity(_) | ZiValue::Component(_)) => {
                self.degraded(column, embeddable, Some(field), "field is not a scalar");
                ZiValue::Null
            }
            Some(value) => value,
            None => {
                self.degraded(column, embeddable, Some(field), "field not readable");
                ZiValue::Null
            }
        }
    }

    fn degraded(&self, column: &str, embeddable: &str, field: Option<&str>, reason: &str) {
        let mut event = ZiDiagnosticEvent::new(
            ZiDiagnosticLevel::Debug,
            "cell.degraded",
            format!("embedded column '{}' written as null", column),
        )
        .with_field("column", column)
        .with_field("embeddable", embeddable)
        .with_field("reason", reason);
        if let Some(field) = field {
            event = event.with_field("field", field);
        }
        match self.diagnostics {
            Some(sink) => sink.handle(&event),
            None => ZiLogDiagnostics.handle(&event),
        }
    }
}

impl fmt::Debug for ZiMetadataResolver<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ZiMetadataResolver")
            .field("registry", self.registry)
            .field("diagnostics", &self.diagnostics.is_some())
            .finish()
    }
}
