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

//! # Exporter
//!
//! Entry point tying a session, the entity registry and a dataset writer
//! together. The session is read once; its tracked instances are grouped by
//! concrete type and handed to the writer.

use std::path::PathBuf;

use crate::context::{ZiExportConfig, ZiExportContext};
use crate::diagnostics::{ZiDiagnosticEvent, ZiDiagnosticLevel};
use crate::errors::Result;
use crate::export::charset::ZiCharset;
use crate::export::writer::{ZiCsvDatasetWriter, ZiDatasetWriter, ZiExportStats};
use crate::metadata::{ZiEntityRegistry, ZiMetadataResolver};
use crate::session::{ZiEntitiesPerType, ZiSession};

/// Exports the instances tracked by a session.
pub struct ZiExporter<'a, S: ZiSession + ?Sized> {
    session: &'a S,
    registry: &'a ZiEntityRegistry,
}

impl<'a, S: ZiSession + ?Sized> ZiExporter<'a, S> {
    pub fn new(session: &'a S, registry: &'a ZiEntityRegistry) -> Self {
        ZiExporter { session, registry }
    }

    pub fn resolver(&self) -> ZiMetadataResolver<'a> {
        ZiMetadataResolver::new(self.registry)
    }

    /// Snapshot of the session grouped by concrete type, types in the order
    /// they were first seen.
    pub fn collect(&self, ctx: &ZiExportContext) -> Result<ZiEntitiesPerType> {
        let resolver = self.resolver();
        let mut entities = ZiEntitiesPerType::new();
        for entity in self.session.tracked_entities() {
            let identifier = resolver.resolve_identifier(entity.as_ref())?;
            ctx.emit(
                ZiDiagnosticEvent::new(ZiDiagnosticLevel::Debug, "entity.tracked", entity.type_name())
                    .with_field("identifier", identifier.render())
                    .with_field("identifier_kind", identifier.kind_name()),
            );
            entities.insert(entity, &identifier)?;
        }
        Ok(entities)
    }

    pub fn export_with<W>(&self, writer: &W, ctx: &ZiExportContext) -> Result<ZiExportStats>
    where
        W: ZiDatasetWriter + ?Sized,
    {
        self.registry.validate()?;

        let entities = self.collect(ctx)?;
        ctx.emit(
            ZiDiagnosticEvent::new(
                ZiDiagnosticLevel::Info,
                "export.start",
                format!("fetched {} tracked entities", entities.entity_count()),
            )
            .with_field("entities", entities.entity_count())
            .with_field("types", entities.types())
            .with_field("output_dir", ctx.config().output_dir.display().to_string()),
        );

        let stats = writer.write(&self.resolver(), &entities, ctx)?;
        ctx.emit(
            ZiDiagnosticEvent::new(
                ZiDiagnosticLevel::Info,
                "export.done",
                format!("{} rows in {} tables", stats.rows_written, stats.tables_written),
            )
            .with_field("tables_written", stats.tables_written)
            .with_field("rows_written", stats.rows_written),
        );
        Ok(stats)
    }

    /// CSV export into an existing directory.
    pub fn export(
        &self,
        output_dir: impl Into<PathBuf>,
        charset: ZiCharset,
        table_order: Option<Vec<String>>,
    ) -> Result<ZiExportStats> {
        let mut config = ZiExportConfig::new(output_dir).with_charset(charset);
        config.table_order = table_order;
        self.export_with(&ZiCsvDatasetWriter::new(), &ZiExportContext::new(config))
    }

    /// UTF-8 CSV export with discovery order, creating the directory first.
    pub fn export_to_csv(&self, output_dir: impl Into<PathBuf>) -> Result<ZiExportStats> {
        let output_dir = output_dir.into();
        std::fs::create_dir_all(&output_dir)?;
        self.export(output_dir, ZiCharset::Utf8, None)
    }
}
