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

//! # Mapping Metadata Module
//!
//! ## Module Components
//!
//! - **Registry** ([registry.rs](registry/index.html)): Declarative entity and embeddable descriptors
//! - **Mapping** ([mapping.rs](mapping/index.html)): Ordered column → property maps
//! - **Resolver** ([resolver.rs](resolver/index.html)): Table, column and value resolution
//!
//! ## Inheritance
//!
//! Entity and embeddable descriptors may name a parent. Table and identifier
//! lookups take the nearest declaration in the chain; properties accumulate
//! from the root down.

pub mod mapping;
pub mod registry;
pub mod resolver;

pub use mapping::ZiColumnMapping;
pub use registry::{
    ZiEmbeddableDescriptor, ZiEmbeddedField, ZiEntityDescriptor, ZiEntityRegistry,
    ZiIdentifierDescriptor, ZiPropertyDescriptor, ZiPropertyKind, ZiRegistryConfig,
};
pub use resolver::{ZiEntityLayout, ZiMetadataResolver};
