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

use std::collections::{BTreeSet, HashSet};
use std::fs;

use proptest::prelude::*;
use zi_seed::{
    ZiCsvDatasetWriter, ZiDatasetWriter, ZiEntitiesPerType, ZiEntityDescriptor, ZiEntityRegistry,
    ZiExportConfig, ZiExportContext, ZiMetadataResolver, ZiObject, ZiValue,
};

const TYPES: [&str; 3] = ["Order", "OrderArchive", "Customer"];

fn registry() -> ZiEntityRegistry {
    ZiEntityRegistry::new()
        .with_entity(
            ZiEntityDescriptor::new("Order")
                .with_table("orders")
                .with_identifier("id")
                .with_scalar("status"),
        )
        .expect("order")
        .with_entity(
            ZiEntityDescriptor::new("OrderArchive")
                .with_table("orders")
                .with_identifier("id")
                .with_column("archivedAt", "archived_at"),
        )
        .expect("archive")
        .with_entity(
            ZiEntityDescriptor::new("Customer")
                .with_table("customers")
                .with_identifier("id")
                .with_scalar("name"),
        )
        .expect("customer")
}

fn table_of(entity_type: &str) -> &'static str {
    match entity_type {
        "Customer" => "customers",
        _ => "orders",
    }
}

fn build(specs: &[(usize, i64, Option<String>)]) -> ZiEntitiesPerType {
    let mut entities = ZiEntitiesPerType::new();
    for (kind, id, text) in specs {
        let entity_type = TYPES[*kind];
        let property = match entity_type {
            "Order" => "status",
            "OrderArchive" => "archivedAt",
            _ => "name",
        };
        let object = ZiObject::new(entity_type)
            .with("id", *id)
            .with(property, text.clone());
        entities
            .insert(object.into_shared(), &ZiValue::Int(*id))
            .expect("insert");
    }
    entities
}

fn entity_specs() -> impl Strategy<Value = Vec<(usize, i64, Option<String>)>> {
    prop::collection::vec(
        (0usize..3, 0i64..40, prop::option::of("[a-zA-Z0-9 ,\"]{0,8}")),
        0..24,
    )
}

fn explicit_order() -> impl Strategy<Value = Option<Vec<String>>> {
    prop::option::of(
        prop::sample::subsequence(TYPES.to_vec(), 0..=3)
            .prop_shuffle()
            .prop_map(|types| types.into_iter().map(str::to_string).collect::<Vec<String>>()),
    )
}

proptest! {
    #[test]
    fn rows_align_with_header(specs in entity_specs()) {
        let dir = tempfile::tempdir().expect("tempdir");
        let registry = registry();
        let entities = build(&specs);
        let ctx = ZiExportContext::new(ZiExportConfig::new(dir.path()));
        let stats = ZiCsvDatasetWriter::new()
            .write(&ZiMetadataResolver::new(&registry), &entities, &ctx)
            .expect("write");

        prop_assert_eq!(stats.rows_written, entities.entity_count());
        for file in &stats.files {
            let mut reader = csv::Reader::from_path(&file.path).expect("reader");
            let header = reader.headers().expect("header").clone();
            prop_assert_eq!(header.len(), file.columns);
            prop_assert_eq!(&header[0], "id");

            let mut ids = Vec::new();
            for record in reader.records() {
                let record = record.expect("record");
                prop_assert_eq!(record.len(), header.len());
                prop_assert_ne!(&record[0], "null");
                ids.push(record[0].parse::<i64>().expect("numeric id"));
            }
            prop_assert_eq!(ids.len(), file.rows);
        }
    }

    #[test]
    fn manifest_lists_written_tables_once(specs in entity_specs(), order in explicit_order()) {
        let dir = tempfile::tempdir().expect("tempdir");
        let registry = registry();
        let entities = build(&specs);
        let mut config = ZiExportConfig::new(dir.path());
        config.table_order = order;
        let ctx = ZiExportContext::new(config);
        ZiCsvDatasetWriter::new()
            .write(&ZiMetadataResolver::new(&registry), &entities, &ctx)
            .expect("write");

        let manifest = fs::read_to_string(dir.path().join("table-ordering.txt")).expect("manifest");
        let lines: Vec<&str> = manifest.lines().collect();
        let unique: HashSet<&str> = lines.iter().copied().collect();
        prop_assert_eq!(unique.len(), lines.len());

        let contributing: BTreeSet<&str> = specs.iter().map(|(kind, _, _)| table_of(TYPES[*kind])).collect();
        let listed: BTreeSet<&str> = lines.iter().copied().collect();
        prop_assert_eq!(listed, contributing.clone());

        for table in contributing {
            let csv_path = dir.path().join(format!("{}.csv", table));
            prop_assert!(csv_path.is_file());
        }
    }
}
