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

//! # Zi Seed Error Module
//!
//! This module defines the error types used throughout the exporter.
//!
//! ## Error Categories
//!
//! - **Io**: Filesystem errors while creating table files or the manifest
//! - **Config**: Invalid registry or export configuration, detected before any I/O
//! - **NoTableMapping** / **NoMetadataForType**: Fatal metadata lookups
//! - **Property** / **Identifier**: A live instance could not supply a mapped value
//! - **Write** / **Encoding**: Failures while serializing a table
//! - **Serde**: JSON configuration parsing failures
//!
//! Cells that cannot be resolved because a column belongs to a sibling type,
//! or because an embedded field is missing, are not errors: they are written
//! as null.

use std::io;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Convenience result type used throughout Zi Seed.
pub type Result<T> = std::result::Result<T, ZiError>;

/// Canonical error enumeration for Zi Seed.
#[derive(Debug, Error, Serialize, Deserialize)]
pub enum ZiError {
    /// Errors originating from filesystem IO.
    #[error("io error: {0}")]
    Io(String),

    /// Invalid registry or export configuration.
    #[error("configuration error: {message}")]
    Config { message: String },

    /// No table is declared anywhere in the type's ancestor chain.
    #[error("no table mapping found for entity type '{entity_type}'")]
    NoTableMapping { entity_type: String },

    /// The type is unknown to the entity registry.
    #[error("no metadata registered for type '{entity_type}'")]
    NoMetadataForType { entity_type: String },

    /// A mapped property could not be read from a live instance.
    #[error("property '{entity_type}.{property}' failed: {message}")]
    Property {
        entity_type: String,
        property: String,
        message: String,
    },

    /// An identifier could not be resolved or ordered.
    #[error("identifier of '{entity_type}' failed: {message}")]
    Identifier { entity_type: String, message: String },

    /// Failures while writing a table file.
    #[error("write error on table '{table}': {message}")]
    Write { table: String, message: String },

    /// Text could not be transcoded into the requested charset.
    #[error("encoding error ({charset}): {message}")]
    Encoding { charset: String, message: String },

    /// Wrapper for serde-style serialization issues.
    #[error("serialization error: {0}")]
    Serde(String),
}

impl From<io::Error> for ZiError {
    fn from(err: io::Error) -> Self {
        ZiError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for ZiError {
    fn from(err: serde_json::Error) -> Self {
        ZiError::Serde(err.to_string())
    }
}

impl ZiError {
    /// Helper to construct configuration errors.
    pub fn config<T: Into<String>>(message: T) -> Self {
        ZiError::Config {
            message: message.into(),
        }
    }

    pub fn no_table_mapping(entity_type: impl Into<String>) -> Self {
        ZiError::NoTableMapping {
            entity_type: entity_type.into(),
        }
    }

    pub fn no_metadata(entity_type: impl Into<String>) -> Self {
        ZiError::NoMetadataForType {
            entity_type: entity_type.into(),
        }
    }

    /// Helper to construct property errors.
    pub fn property(
        entity_type: impl Into<String>,
        property: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        ZiError::Property {
            entity_type: entity_type.into(),
            property: property.into(),
            message: message.into(),
        }
    }

    pub fn identifier(entity_type: impl Into<String>, message: impl Into<String>) -> Self {
        ZiError::Identifier {
            entity_type: entity_type.into(),
            message: message.into(),
        }
    }

    /// Helper to construct table write errors.
    pub fn write(table: impl Into<String>, message: impl Into<String>) -> Self {
        ZiError::Write {
            table: table.into(),
            message: message.into(),
        }
    }

    pub fn encoding(charset: impl Into<String>, message: impl Into<String>) -> Self {
        ZiError::Encoding {
            charset: charset.into(),
            message: message.into(),
        }
    }

    /// Returns true for errors detected before any file is touched.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            ZiError::Config { .. } | ZiError::NoTableMapping { .. } | ZiError::NoMetadataForType { .. }
        )
    }
}
