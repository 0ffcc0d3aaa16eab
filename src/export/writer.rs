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

//! # Dataset Writer Module
//!
//! Persists grouped entities as one CSV file per table plus the table
//! ordering manifest.
//!
//! Every table is laid out and flattened before the first file is opened, so
//! metadata, value and encoding failures leave the output directory
//! untouched. Only filesystem errors can stop an export half way.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::context::{validate_file_name, ZiExportConfig, ZiExportContext};
use crate::diagnostics::{ZiDiagnosticEvent, ZiDiagnosticLevel};
use crate::errors::{Result, ZiError};
use crate::export::charset::{ZiCharset, ZiCharsetWriter};
use crate::export::flatten::{ZiRow, ZiRowFlattener, NULL_SENTINEL};
use crate::export::manifest::ZiTableOrderingManifest;
use crate::grouping::{compute_header, compute_table_order, group_by_table, ZiTableGroup};
use crate::metadata::ZiMetadataResolver;
use crate::session::ZiEntitiesPerType;

/// Statistics for one table file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZiTableFileStats {
    pub table: String,
    pub path: PathBuf,
    /// Data rows, header excluded.
    pub rows: usize,
    pub columns: usize,
}

/// Statistics about one export.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZiExportStats {
    pub tables_written: usize,
    pub rows_written: usize,
    /// Table files in manifest order.
    pub files: Vec<ZiTableFileStats>,
    pub manifest_path: Option<PathBuf>,
}

impl ZiExportStats {
    pub fn table(&self, table: &str) -> Option<&ZiTableFileStats> {
        self.files.iter().find(|f| f.table == table)
    }
}

/// Sink for a grouped entity dataset.
pub trait ZiDatasetWriter {
    fn write(
        &self,
        resolver: &ZiMetadataResolver<'_>,
        entities: &ZiEntitiesPerType,
        ctx: &ZiExportContext,
    ) -> Result<ZiExportStats>;
}

/// A table ready to be written.
#[derive(Debug)]
struct ZiPreparedTable {
    table: String,
    header: Vec<String>,
    rows: Vec<ZiRow>,
}

/// Writes `<table>.csv` files and the ordering manifest.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZiCsvDatasetWriter;

impl ZiCsvDatasetWriter {
    pub fn new() -> Self {
        ZiCsvDatasetWriter
    }

    fn prepare(
        &self,
        resolver: &ZiMetadataResolver<'_>,
        group: &ZiTableGroup<'_>,
        charset: ZiCharset,
    ) -> Result<ZiPreparedTable> {
        let header = compute_header(resolver, group)?;
        for column in &header {
            ensure_encodable(charset, &group.table, column)?;
        }

        let mut rows = Vec::with_capacity(group.entity_count());
        for set in &group.sets {
            let layout = resolver.resolve_layout(set.entity_type())?;
            let flattener = ZiRowFlattener::new(resolver, &layout, &header);
            for entity in set.iter() {
                let row = flattener.flatten(entity.as_ref())?;
                for cell in row.iter().flatten() {
                    ensure_encodable(charset, &group.table, cell)?;
                }
                rows.push(row);
            }
        }

        Ok(ZiPreparedTable {
            table: group.table.clone(),
            header,
            rows,
        })
    }

    fn write_table(&self, config: &ZiExportConfig, prepared: &ZiPreparedTable) -> Result<ZiTableFileStats> {
        let path = config.table_path(&prepared.table);
        let table = prepared.table.as_str();

        persist(&path, table, config.atomic_write, |sink| {
            let sink = ZiCharsetWriter::new(sink, config.charset);
            let mut csv_writer = csv::WriterBuilder::new()
                .terminator(config.line_ending.terminator())
                .from_writer(sink);

            csv_writer
                .write_record(&prepared.header)
                .map_err(|e| ZiError::write(table, format!("header: {}", e)))?;
            for row in &prepared.rows {
                csv_writer
                    .write_record(row.iter().map(|cell| cell.as_deref().unwrap_or(NULL_SENTINEL)))
                    .map_err(|e| ZiError::write(table, e.to_string()))?;
            }

            let sink = csv_writer
                .into_inner()
                .map_err(|e| ZiError::write(table, e.to_string()))?;
            let mut file = sink.finish().map_err(|e| ZiError::write(table, e.to_string()))?;
            file.flush().map_err(|e| ZiError::write(table, e.to_string()))?;
            Ok(())
        })?;

        Ok(ZiTableFileStats {
            table: prepared.table.clone(),
            path,
            rows: prepared.rows.len(),
            columns: prepared.header.len(),
        })
    }
}

impl ZiDatasetWriter for ZiCsvDatasetWriter {
    fn write(
        &self,
        resolver: &ZiMetadataResolver<'_>,
        entities: &ZiEntitiesPerType,
        ctx: &ZiExportContext,
    ) -> Result<ZiExportStats> {
        let config = ctx.config();
        config.validate()?;
        let resolver = &resolver.with_diagnostics(ctx.sink());

        let groups = group_by_table(resolver, entities)?;
        let order = compute_table_order(resolver, config.table_order.as_deref(), &entities.types())?;
        let manifest = manifest_for(&order, &groups);
        for table in manifest.tables() {
            validate_file_name("table", table)?;
            ensure_encodable(config.charset, table, table)?;
        }

        ctx.emit(
            ZiDiagnosticEvent::new(
                ZiDiagnosticLevel::Info,
                "export.grouped",
                format!("{} entity types grouped into {} tables", entities.len(), groups.len()),
            )
            .with_field("types", entities.len())
            .with_field("tables", manifest.tables().to_vec()),
        );

        let mut prepared = Vec::with_capacity(manifest.len());
        for table in manifest.tables() {
            if let Some(group) = groups.iter().find(|g| &g.table == table) {
                prepared.push(self.prepare(resolver, group, config.charset)?);
            }
        }

        let mut stats = ZiExportStats::default();
        for table in &prepared {
            let file = self.write_table(config, table)?;
            ctx.emit(
                ZiDiagnosticEvent::new(ZiDiagnosticLevel::Info, "table.written", &file.table)
                    .with_field("rows", file.rows)
                    .with_field("columns", file.columns)
                    .with_field("path", file.path.display().to_string()),
            );
            stats.tables_written += 1;
            stats.rows_written += file.rows;
            stats.files.push(file);
        }

        let manifest_path = config.manifest_path();
        manifest.write(&manifest_path, config.charset, config.line_ending, config.atomic_write)?;
        ctx.emit(
            ZiDiagnosticEvent::new(
                ZiDiagnosticLevel::Info,
                "manifest.written",
                manifest_path.display().to_string(),
            )
            .with_field("tables", manifest.tables().to_vec()),
        );
        stats.manifest_path = Some(manifest_path);

        Ok(stats)
    }
}

/// Tables that receive a file: the computed order first, then any table the
/// order left out, in discovery order.
fn manifest_for(order: &[String], groups: &[ZiTableGroup<'_>]) -> ZiTableOrderingManifest {
    let written = |table: &String| groups.iter().any(|g| &g.table == table);
    let ordered = order.iter().filter(|t| written(*t)).cloned();
    let remaining = groups
        .iter()
        .map(|g| g.table.clone())
        .filter(|t| !order.contains(t));
    ZiTableOrderingManifest::from_tables(ordered.chain(remaining))
}

fn ensure_encodable(charset: ZiCharset, table: &str, text: &str) -> Result<()> {
    charset.encode(text).map(|_| ()).map_err(|err| match err {
        ZiError::Encoding { charset, message } => ZiError::Encoding {
            charset,
            message: format!("table '{}': {}", table, message),
        },
        other => other,
    })
}

fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("output");
    let parent = path.parent().unwrap_or(Path::new("."));
    parent.join(format!(".{}.tmp", name))
}

/// Creates `path` (truncating) and hands a buffered sink to `fill`. With
/// `atomic` the data goes to a hidden temp file renamed into place on
/// success and removed on failure. Filesystem errors are reported as
/// [`ZiError::Write`] under `label` with the offending path.
pub(crate) fn persist<F>(path: &Path, label: &str, atomic: bool, fill: F) -> Result<()>
where
    F: FnOnce(BufWriter<File>) -> Result<()>,
{
    let target = if atomic { temp_path(path) } else { path.to_path_buf() };
    let io_error = |at: &Path, err: std::io::Error| {
        ZiError::write(label, format!("{}: {}", at.display(), err))
    };

    let result = File::create(&target)
        .map_err(|e| io_error(&target, e))
        .and_then(|file| {
            fill(BufWriter::new(file)).map_err(|err| match err {
                ZiError::Io(message) => ZiError::write(label, format!("{}: {}", target.display(), message)),
                other => other,
            })
        })
        .and_then(|()| {
            if atomic {
                fs::rename(&target, path).map_err(|e| io_error(path, e))?;
            }
            Ok(())
        });

    if result.is_err() && atomic && target.exists() {
        if let Err(err) = fs::remove_file(&target) {
            log::warn!("could not remove temp file {}: {}", target.display(), err);
        }
    }
    result
}
