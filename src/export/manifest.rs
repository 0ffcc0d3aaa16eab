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

use std::collections::HashSet;
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::context::ZiLineEnding;
use crate::errors::Result;
use crate::export::charset::ZiCharset;
use crate::export::writer::persist;

/// Load order of the exported tables, one table per line.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZiTableOrderingManifest {
    tables: Vec<String>,
}

impl ZiTableOrderingManifest {
    /// Builds a manifest, keeping the first occurrence of each table.
    pub fn from_tables<I, S>(tables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let tables = tables
            .into_iter()
            .map(Into::into)
            .filter(|t: &String| seen.insert(t.clone()))
            .collect();
        ZiTableOrderingManifest { tables }
    }

    /// Tables in load order.
    pub fn tables(&self) -> &[String] {
        &self.tables
    }

    pub fn contains(&self, table: &str) -> bool {
        self.tables.iter().any(|t| t == table)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Every table followed by a line terminator.
    pub fn to_text(&self, line_ending: ZiLineEnding) -> String {
        let mut text = String::new();
        for table in &self.tables {
            text.push_str(table);
            text.push_str(line_ending.as_str());
        }
        text
    }

    /// Reads the text form back. Blank lines are skipped and `\r\n` is
    /// accepted as well as `\n`.
    pub fn parse(text: &str) -> Self {
        Self::from_tables(
            text.lines()
                .map(|line| line.trim_end_matches('\r'))
                .filter(|line| !line.is_empty()),
        )
    }

    /// Encodes the text form in `charset` and writes it to `path`.
    pub fn write(&self, path: &Path, charset: ZiCharset, line_ending: ZiLineEnding, atomic: bool) -> Result<()> {
        let bytes = charset.encode(&self.to_text(line_ending))?;
        let label = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        persist(path, &label, atomic, |mut sink| {
            sink.write_all(&bytes)?;
            sink.flush()?;
            Ok(())
        })
    }

    /// Loads a manifest written in `charset`.
    pub fn read(path: &Path, charset: ZiCharset) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        Ok(Self::parse(&charset.decode(&bytes)?))
    }
}
