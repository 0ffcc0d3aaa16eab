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

//! # Table Grouping Module
//!
//! Re-keys per-type entity sets by table. Several entity types may share one
//! table; their columns are merged into a single header, first occurrence
//! first.

use std::collections::HashSet;

use crate::errors::Result;
use crate::metadata::ZiMetadataResolver;
use crate::session::{ZiEntitiesPerType, ZiEntitySet};

/// Entity sets of every type mapped to one table, in discovery order.
#[derive(Debug)]
pub struct ZiTableGroup<'a> {
    pub table: String,
    pub sets: Vec<&'a ZiEntitySet>,
}

impl ZiTableGroup<'_> {
    pub fn entity_types(&self) -> Vec<&str> {
        self.sets.iter().map(|s| s.entity_type()).collect()
    }

    pub fn entity_count(&self) -> usize {
        self.sets.iter().map(|s| s.len()).sum()
    }
}

/// Groups entity sets by resolved table, dropping empty sets. Tables are
/// ordered by the first type that maps to them.
///
/// Every type is resolved, empty or not, so a missing table mapping fails
/// the export even when the type has nothing to write.
pub fn group_by_table<'a>(
    resolver: &ZiMetadataResolver<'_>,
    entities: &'a ZiEntitiesPerType,
) -> Result<Vec<ZiTableGroup<'a>>> {
    let mut groups: Vec<ZiTableGroup<'a>> = Vec::new();
    for set in entities.iter() {
        let table = resolver.resolve_table(set.entity_type())?;
        if set.is_empty() {
            continue;
        }
        match groups.iter_mut().find(|g| g.table == table) {
            Some(group) => group.sets.push(set),
            None => groups.push(ZiTableGroup {
                table,
                sets: vec![set],
            }),
        }
    }
    Ok(groups)
}

/// Union of the column mappings of every type in the group.
pub fn compute_header(resolver: &ZiMetadataResolver<'_>, group: &ZiTableGroup<'_>) -> Result<Vec<String>> {
    let mut seen = HashSet::new();
    let mut header = Vec::new();
    for set in &group.sets {
        let mapping = resolver.resolve_column_mapping(set.entity_type())?;
        for column in mapping.columns() {
            if seen.insert(column.to_string()) {
                header.push(column.to_string());
            }
        }
    }
    Ok(header)
}

/// Tables in load order: the explicit type order when given, discovery
/// order otherwise, each table once.
pub fn compute_table_order(
    resolver: &ZiMetadataResolver<'_>,
    explicit: Option<&[String]>,
    discovered: &[String],
) -> Result<Vec<String>> {
    let types = explicit.unwrap_or(discovered);
    let mut seen = HashSet::new();
    let mut order = Vec::new();
    for entity_type in types {
        let table = resolver.resolve_table(entity_type)?;
        if seen.insert(table.clone()) {
            order.push(table);
        }
    }
    Ok(order)
}
