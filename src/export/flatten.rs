//! Copyright © 2025-2026 Wenze Wei. All Rights Reserved.
//!
//! This file is part of Zi.
//! The Zi project belongs to the Dunimd project team.
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

//! # Row Flattening
//!
//! Turns one live instance into a row aligned to its table header. `None`
//! cells are written as the null sentinel.

use crate::entity::ZiMapped;
use crate::errors::Result;
use crate::metadata::{ZiEntityLayout, ZiMetadataResolver};

/// Cell text for a null value.
pub const NULL_SENTINEL: &str = "null";

/// One table row. `None` is null.
pub type ZiRow = Vec<Option<String>>;

/// Flattens instances of one entity type against a shared table header.
#[derive(Debug)]
pub struct ZiRowFlattener<'r, 'a> {
    resolver: &'r ZiMetadataResolver<'a>,
    layout: &'r ZiEntityLayout,
    header: &'r [String],
}

impl<'r, 'a> ZiRowFlattener<'r, 'a> {
    pub fn new(resolver: &'r ZiMetadataResolver<'a>, layout: &'r ZiEntityLayout, header: &'r [String]) -> Self {
        ZiRowFlattener {
            resolver,
            layout,
            header,
        }
    }

    /// Cell 0 is the identifier. Columns this type does not map are null.
    pub fn flatten(&self, instance: &dyn ZiMapped) -> Result<ZiRow> {
        let mut row = Vec::with_capacity(self.header.len());
        for (index, column) in self.header.iter().enumerate() {
            let cell = if index == 0 {
                self.resolver.resolve_identifier(instance)?.render()
            } else {
                match self.layout.property_for_column(column) {
                    Some(property) => self.resolver.reduce_value(instance, property, column)?.render(),
                    None => None,
                }
            };
            row.push(cell);
        }
        Ok(row)
    }
}
