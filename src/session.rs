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

//! # Zi Session Module
//!
//! The persistence-session boundary and per-type entity sets.
//!
//! A [`ZiSession`] hands out a snapshot of the instances it currently tracks.
//! The exporter groups them by concrete type into [`ZiEntitySet`]s. A set is
//! ordered by identifier when the first instance it receives has a comparable
//! identifier, and keeps insertion order otherwise.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use crate::entity::ZiMapped;
use crate::errors::{Result, ZiError};
use crate::value::{ZiIdentifierKey, ZiValue};

/// Source of the live instances to export.
pub trait ZiSession {
    /// Snapshot of every instance currently tracked by the session.
    fn tracked_entities(&self) -> Vec<Arc<dyn ZiMapped>>;
}

/// Minimal session that tracks instances in memory.
#[derive(Debug, Default)]
pub struct ZiMemorySession {
    entities: Vec<Arc<dyn ZiMapped>>,
}

impl ZiMemorySession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn track<T: ZiMapped + 'static>(&mut self, entity: T) -> Arc<dyn ZiMapped> {
        let shared: Arc<dyn ZiMapped> = Arc::new(entity);
        self.entities.push(Arc::clone(&shared));
        shared
    }

    pub fn track_shared(&mut self, entity: Arc<dyn ZiMapped>) {
        self.entities.push(entity);
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn clear(&mut self) {
        self.entities.clear();
    }
}

impl ZiSession for ZiMemorySession {
    fn tracked_entities(&self) -> Vec<Arc<dyn ZiMapped>> {
        self.entities.clone()
    }
}

/// Address of the shared instance, metadata stripped.
fn instance_addr(entity: &Arc<dyn ZiMapped>) -> usize {
    Arc::as_ptr(entity) as *const () as usize
}

#[derive(Debug)]
enum ZiEntries {
    Empty,
    Ordered(BTreeMap<ZiIdentifierKey, Arc<dyn ZiMapped>>),
    Unordered {
        list: Vec<Arc<dyn ZiMapped>>,
        seen: HashSet<usize>,
    },
}

/// Live instances of one entity type.
#[derive(Debug)]
pub struct ZiEntitySet {
    entity_type: String,
    entries: ZiEntries,
}

impl ZiEntitySet {
    pub fn new(entity_type: impl Into<String>) -> Self {
        ZiEntitySet {
            entity_type: entity_type.into(),
            entries: ZiEntries::Empty,
        }
    }

    pub fn entity_type(&self) -> &str {
        &self.entity_type
    }

    /// Adds an instance under its resolved identifier. Returns false when
    /// the instance was already present (same identifier in an ordered set,
    /// same instance in an unordered one).
    pub fn insert(&mut self, entity: Arc<dyn ZiMapped>, identifier: &ZiValue) -> Result<bool> {
        let key = identifier.identifier_key();
        match &mut self.entries {
            ZiEntries::Ordered(map) => {
                let Some(key) = key else {
                    return Err(ZiError::identifier(
                        &self.entity_type,
                        format!(
                            "{} identifier cannot be ordered with the comparable identifiers already tracked",
                            identifier.kind_name()
                        ),
                    ));
                };
                if map.contains_key(&key) {
                    return Ok(false);
                }
                map.insert(key, entity);
                return Ok(true);
            }
            ZiEntries::Unordered { list, seen } => {
                if !seen.insert(instance_addr(&entity)) {
                    return Ok(false);
                }
                list.push(entity);
                return Ok(true);
            }
            ZiEntries::Empty => {}
        }

        // First instance decides the ordering.
        self.entries = match key {
            Some(key) => ZiEntries::Ordered(BTreeMap::from([(key, entity)])),
            None => ZiEntries::Unordered {
                seen: HashSet::from([instance_addr(&entity)]),
                list: vec![entity],
            },
        };
        Ok(true)
    }

    /// True when iteration follows ascending identifier order.
    pub fn is_ordered(&self) -> bool {
        matches!(self.entries, ZiEntries::Ordered(_))
    }

    pub fn len(&self) -> usize {
        match &self.entries {
            ZiEntries::Empty => 0,
            ZiEntries::Ordered(map) => map.len(),
            ZiEntries::Unordered { list, .. } => list.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> Box<dyn Iterator<Item = &Arc<dyn ZiMapped>> + '_> {
        match &self.entries {
            ZiEntries::Empty => Box::new(std::iter::empty()),
            ZiEntries::Ordered(map) => Box::new(map.values()),
            ZiEntries::Unordered { list, .. } => Box::new(list.iter()),
        }
    }
}

/// Entity sets keyed by type, in the order the types were first seen.
#[derive(Debug, Default)]
pub struct ZiEntitiesPerType {
    sets: Vec<ZiEntitySet>,
}

impl ZiEntitiesPerType {
    pub fn new() -> Self {
        Self::default()
    }

    /// The set for `entity_type`, created empty if absent.
    pub fn set_mut(&mut self, entity_type: &str) -> &mut ZiEntitySet {
        let pos = match self.sets.iter().position(|s| s.entity_type() == entity_type) {
            Some(pos) => pos,
            None => {
                self.sets.push(ZiEntitySet::new(entity_type));
                self.sets.len() - 1
            }
        };
        &mut self.sets[pos]
    }

    /// Adds an instance to the set of its concrete type.
    pub fn insert(&mut self, entity: Arc<dyn ZiMapped>, identifier: &ZiValue) -> Result<bool> {
        let entity_type = entity.type_name().to_string();
        self.set_mut(&entity_type).insert(entity, identifier)
    }

    pub fn get(&self, entity_type: &str) -> Option<&ZiEntitySet> {
        self.sets.iter().find(|s| s.entity_type() == entity_type)
    }

    /// Type names in discovery order.
    pub fn types(&self) -> Vec<String> {
        self.sets.iter().map(|s| s.entity_type().to_string()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ZiEntitySet> {
        self.sets.iter()
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Number of instances across all types.
    pub fn entity_count(&self) -> usize {
        self.sets.iter().map(ZiEntitySet::len).sum()
    }
}
