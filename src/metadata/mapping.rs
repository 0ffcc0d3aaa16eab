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

use std::collections::HashMap;

/// Insertion-ordered map from column name to the property (or embedded
/// field) backing it.
///
/// Re-inserting a column keeps its original position and replaces the
/// property, so the last write wins.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ZiColumnMapping {
    entries: Vec<(String, String)>,
    index: HashMap<String, usize>,
}

impl ZiColumnMapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, column: impl Into<String>, property: impl Into<String>) {
        let column = column.into();
        let property = property.into();
        match self.index.get(&column) {
            Some(&pos) => self.entries[pos].1 = property,
            None => {
                self.index.insert(column.clone(), self.entries.len());
                self.entries.push((column, property));
            }
        }
    }

    /// Property backing `column`, if any.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.index
            .get(column)
            .map(|&pos| self.entries[pos].1.as_str())
    }

    pub fn contains(&self, column: &str) -> bool {
        self.index.contains_key(column)
    }

    /// Column names in insertion order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(column, _)| column.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(column, property)| (column.as_str(), property.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
