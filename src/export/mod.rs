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

//! # Data Export Module
//!
//! This module writes grouped entities as seed datasets: one CSV file per
//! table and a manifest giving the order in which tables should be loaded.
//!
//! ## Module Components
//!
//! - **Writer** ([writer.rs](writer/index.html)): Dataset writer trait and the CSV implementation
//! - **Flatten** ([flatten.rs](flatten/index.html)): Instance → header-aligned row
//! - **Manifest** ([manifest.rs](manifest/index.html)): Table ordering manifest
//! - **Charset** ([charset.rs](charset/index.html)): Output encodings
//!
//! ## Persisted Layout
//!
//! - `<table>.csv`: comma-delimited, header first, null cells written as `null`
//! - `table-ordering.txt`: one table per line
//!
//! Both use the configured charset and line terminator.
//!
//! ## Usage Patterns
//!
//! ```rust
//! use zi_seed::context::{ZiExportConfig, ZiExportContext};
//! use zi_seed::export::{ZiCsvDatasetWriter, ZiDatasetWriter};
//!
//! let ctx = ZiExportContext::new(ZiExportConfig::new("seed"));
//! let stats = ZiCsvDatasetWriter::new().write(&resolver, &entities, &ctx)?;
//! ```

pub mod charset;
pub mod flatten;
pub mod manifest;
pub mod writer;

pub use charset::{ZiCharset, ZiCharsetWriter};
pub use flatten::{ZiRow, ZiRowFlattener, NULL_SENTINEL};
pub use manifest::ZiTableOrderingManifest;
pub use writer::{ZiCsvDatasetWriter, ZiDatasetWriter, ZiExportStats, ZiTableFileStats};
