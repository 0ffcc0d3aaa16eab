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

//! # Zi Seed Library
//!
//! Zi Seed exports the entities tracked by a persistence session as a seed
//! dataset for database testing: one CSV file per table and a manifest
//! listing the order in which the tables should be loaded.
//!
//! ## Module Overview
//!
//! - **value**: Cell values and orderable identifier keys
//! - **entity**: The [`ZiMapped`] trait through which live instances expose their properties
//! - **metadata**: Entity registry, column mappings and the metadata resolver
//! - **session**: The session boundary and per-type entity sets
//! - **grouping**: Per-table grouping, header union and table ordering
//! - **export**: CSV dataset writer, row flattening, manifest and charsets
//! - **context**: Export configuration and the context threaded through a run
//! - **diagnostics**: Structured export events
//! - **exporter**: The [`ZiExporter`] entry point
//!
//! ## Quick Start
//!
//! ```rust
//! use zi_seed::{ZiEntityDescriptor, ZiEntityRegistry, ZiExporter, ZiMemorySession, ZiObject};
//!
//! let registry = ZiEntityRegistry::new()
//!     .with_entity(
//!         ZiEntityDescriptor::new("Order")
//!             .with_table("orders")
//!             .with_identifier("id")
//!             .with_scalar("status"),
//!     )?;
//!
//! let mut session = ZiMemorySession::new();
//! session.track(ZiObject::new("Order").with("id", 1i64).with("status", "NEW"));
//!
//! let stats = ZiExporter::new(&session, &registry).export_to_csv("target/seed")?;
//! assert_eq!(stats.tables_written, 1);
//! ```
//!
//! ## Error Handling
//!
//! All operations return `Result<T, ZiError>`. Configuration and metadata
//! errors are reported before any file is written.

pub mod context;
pub mod diagnostics;
pub mod entity;
pub mod errors;
pub mod export;
pub mod exporter;
pub mod grouping;
pub mod metadata;
pub mod session;
pub mod value;

pub use context::{ZiExportConfig, ZiExportContext, ZiLineEnding};
pub use diagnostics::{
    ZiCollectingDiagnostics, ZiDiagnosticEvent, ZiDiagnosticLevel, ZiDiagnostics, ZiLogDiagnostics,
};
pub use entity::{ZiAccessor, ZiAccessorTable, ZiMapped, ZiObject, ZiTypedEntity};
pub use errors::{Result, ZiError};
pub use export::{
    ZiCharset, ZiCsvDatasetWriter, ZiDatasetWriter, ZiExportStats, ZiTableFileStats,
    ZiTableOrderingManifest, NULL_SENTINEL,
};
pub use exporter::ZiExporter;
pub use grouping::{compute_header, compute_table_order, group_by_table, ZiTableGroup};
pub use metadata::{
    ZiColumnMapping, ZiEmbeddableDescriptor, ZiEmbeddedField, ZiEntityDescriptor, ZiEntityLayout,
    ZiEntityRegistry, ZiIdentifierDescriptor, ZiMetadataResolver, ZiPropertyDescriptor,
    ZiPropertyKind, ZiRegistryConfig,
};
pub use session::{ZiEntitiesPerType, ZiEntitySet, ZiMemorySession, ZiSession};
pub use value::{ZiIdentifierKey, ZiValue};
