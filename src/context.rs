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

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::diagnostics::{ZiDiagnosticEvent, ZiDiagnostics, ZiLogDiagnostics};
use crate::errors::{Result, ZiError};
use crate::export::charset::ZiCharset;

/// Default name of the table ordering manifest.
pub const DEFAULT_MANIFEST_FILE_NAME: &str = "table-ordering.txt";

/// Line terminator for table files and the manifest.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZiLineEnding {
    #[default]
    Lf,
    CrLf,
}

impl ZiLineEnding {
    pub fn as_str(&self) -> &'static str {
        match self {
            ZiLineEnding::Lf => "\n",
            ZiLineEnding::CrLf => "\r\n",
        }
    }

    pub fn terminator(&self) -> csv::Terminator {
        match self {
            ZiLineEnding::Lf => csv::Terminator::Any(b'\n'),
            ZiLineEnding::CrLf => csv::Terminator::CRLF,
        }
    }
}

/// Settings for one export run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZiExportConfig {
    /// Existing directory that receives the table files.
    pub output_dir: PathBuf,
    /// Encoding of every file written.
    pub charset: ZiCharset,
    /// Entity types in load order. Discovery order is used when absent.
    pub table_order: Option<Vec<String>>,
    pub line_ending: ZiLineEnding,
    /// Write to a hidden temp file then rename into place.
    pub atomic_write: bool,
    pub manifest_file_name: String,
}

impl Default for ZiExportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            charset: ZiCharset::Utf8,
            table_order: None,
            line_ending: ZiLineEnding::Lf,
            atomic_write: true,
            manifest_file_name: DEFAULT_MANIFEST_FILE_NAME.to_string(),
        }
    }
}

impl ZiExportConfig {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            ..Self::default()
        }
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn with_charset(mut self, charset: ZiCharset) -> Self {
        self.charset = charset;
        self
    }

    pub fn with_table_order<I, S>(mut self, order: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.table_order = Some(order.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_line_ending(mut self, line_ending: ZiLineEnding) -> Self {
        self.line_ending = line_ending;
        self
    }

    pub fn with_atomic_write(mut self, atomic_write: bool) -> Self {
        self.atomic_write = atomic_write;
        self
    }

    pub fn with_manifest_file_name(mut self, name: impl Into<String>) -> Self {
        self.manifest_file_name = name.into();
        self
    }

    /// Path of the manifest inside the output directory.
    pub fn manifest_path(&self) -> PathBuf {
        self.output_dir.join(&self.manifest_file_name)
    }

    /// Path of the file for `table`.
    pub fn table_path(&self, table: &str) -> PathBuf {
        self.output_dir.join(format!("{}.csv", table))
    }

    /// Checks everything that can be checked without writing.
    pub fn validate(&self) -> Result<()> {
        if !self.output_dir.is_dir() {
            return Err(ZiError::config(format!(
                "output path {} is not a directory",
                self.output_dir.display()
            )));
        }
        validate_file_name("manifest file", &self.manifest_file_name)?;
        if self.manifest_file_name.to_ascii_lowercase().ends_with(".csv") {
            return Err(ZiError::config(format!(
                "manifest file name '{}' would collide with table files",
                self.manifest_file_name
            )));
        }
        if let Some(order) = &self.table_order {
            if order.iter().any(|t| t.trim().is_empty()) {
                return Err(ZiError::config("table order contains an empty entity type"));
            }
        }
        Ok(())
    }
}

/// Rejects names that are not a single plain path component.
pub(crate) fn validate_file_name(kind: &str, name: &str) -> Result<()> {
    let is_plain = !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0'])
        && Path::new(name).file_name().is_some();
    if is_plain {
        Ok(())
    } else {
        Err(ZiError::config(format!("invalid {} name '{}'", kind, name)))
    }
}

/// Configuration plus the diagnostics sink, threaded through an export.
#[derive(Clone)]
pub struct ZiExportContext {
    config: ZiExportConfig,
    diagnostics: Arc<dyn ZiDiagnostics>,
}

impl ZiExportContext {
    pub fn new(config: ZiExportConfig) -> Self {
        Self {
            config,
            diagnostics: Arc::new(ZiLogDiagnostics),
        }
    }

    pub fn with_diagnostics(mut self, diagnostics: Arc<dyn ZiDiagnostics>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn config(&self) -> &ZiExportConfig {
        &self.config
    }

    pub fn diagnostics(&self) -> Arc<dyn ZiDiagnostics> {
        Arc::clone(&self.diagnostics)
    }

    /// Borrowed view of the sink, for components that hold no `Arc`.
    pub fn sink(&self) -> &dyn ZiDiagnostics {
        self.diagnostics.as_ref()
    }

    pub fn emit(&self, event: ZiDiagnosticEvent) {
        self.diagnostics.handle(&event);
    }
}

impl fmt::Debug for ZiExportContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ZiExportContext")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
