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

use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use zi_seed::{
    ZiCharset, ZiCsvDatasetWriter, ZiDatasetWriter, ZiEntitiesPerType, ZiEntityDescriptor,
    ZiEntityRegistry, ZiError, ZiExportConfig, ZiExportContext, ZiLineEnding, ZiMetadataResolver,
    ZiObject, ZiTableOrderingManifest, ZiValue,
};

fn registry() -> ZiEntityRegistry {
    ZiEntityRegistry::new()
        .with_entity(
            ZiEntityDescriptor::new("Customer")
                .with_table("customers")
                .with_identifier("id")
                .with_scalar("name"),
        )
        .expect("customer")
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
}

fn order_dataset() -> ZiEntitiesPerType {
    let mut entities = ZiEntitiesPerType::new();
    entities
        .insert(
            ZiObject::new("Order").with("id", 1i64).with("status", "NEW").into_shared(),
            &ZiValue::Int(1),
        )
        .expect("order");
    entities
        .insert(
            ZiObject::new("OrderArchive")
                .with("id", 2i64)
                .with("archivedAt", NaiveDate::from_ymd_opt(2024, 1, 1).expect("date"))
                .into_shared(),
            &ZiValue::Int(2),
        )
        .expect("archive");
    entities
}

fn customer(entities: &mut ZiEntitiesPerType, id: i64, name: &str) {
    entities
        .insert(
            ZiObject::new("Customer").with("id", id).with("name", name).into_shared(),
            &ZiValue::Int(id),
        )
        .expect("customer");
}

fn write(
    registry: &ZiEntityRegistry,
    entities: &ZiEntitiesPerType,
    config: ZiExportConfig,
) -> zi_seed::Result<zi_seed::ZiExportStats> {
    let resolver = ZiMetadataResolver::new(registry);
    ZiCsvDatasetWriter::new().write(&resolver, entities, &ZiExportContext::new(config))
}

fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .expect("read dir")
        .map(|entry| entry.expect("entry").file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn shared_table_rows_follow_each_type_mapping() {
    let dir = tempfile::tempdir().expect("tempdir");
    let registry = registry();
    let stats = write(&registry, &order_dataset(), ZiExportConfig::new(dir.path())).expect("write");

    let csv = fs::read_to_string(dir.path().join("orders.csv")).expect("orders.csv");
    assert_eq!(csv, "id,status,archived_at\n1,NEW,null\n2,null,2024-01-01\n");

    let manifest = fs::read_to_string(dir.path().join("table-ordering.txt")).expect("manifest");
    assert_eq!(manifest, "orders\n");

    assert_eq!(stats.tables_written, 1);
    assert_eq!(stats.rows_written, 2);
    let file = stats.table("orders").expect("orders stats");
    assert_eq!(file.columns, 3);
    assert_eq!(file.rows, 2);
}

#[test]
fn empty_sets_produce_no_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let registry = registry();
    let mut entities = order_dataset();
    entities.set_mut("Customer");

    write(&registry, &entities, ZiExportConfig::new(dir.path())).expect("write");
    assert_eq!(file_names(dir.path()), vec!["orders.csv", "table-ordering.txt"]);

    let manifest = ZiTableOrderingManifest::read(&dir.path().join("table-ordering.txt"), ZiCharset::Utf8)
        .expect("manifest");
    assert!(!manifest.contains("customers"));
}

#[test]
fn output_path_must_be_a_directory() {
    let dir = tempfile::tempdir().expect("tempdir");
    let not_a_dir = dir.path().join("seed.txt");
    fs::write(&not_a_dir, "x").expect("write file");

    let err = write(&registry(), &order_dataset(), ZiExportConfig::new(&not_a_dir)).unwrap_err();
    assert!(matches!(err, ZiError::Config { .. }));
    assert_eq!(file_names(dir.path()), vec!["seed.txt"]);

    let missing = dir.path().join("missing");
    let err = write(&registry(), &order_dataset(), ZiExportConfig::new(&missing)).unwrap_err();
    assert!(err.is_configuration());
    assert!(!missing.exists());
}

#[test]
fn null_and_empty_text_stay_distinct() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut entities = ZiEntitiesPerType::new();
    entities
        .insert(
            ZiObject::new("Order").with("id", 3i64).with("status", "").into_shared(),
            &ZiValue::Int(3),
        )
        .expect("order");
    entities
        .insert(
            ZiObject::new("Order").with("id", 4i64).with("status", ZiValue::Null).into_shared(),
            &ZiValue::Int(4),
        )
        .expect("order");

    write(&registry(), &entities, ZiExportConfig::new(dir.path())).expect("write");
    let csv = fs::read_to_string(dir.path().join("orders.csv")).expect("orders.csv");
    assert_eq!(csv, "id,status\n3,\n4,null\n");
}

#[test]
fn fields_with_delimiters_are_quoted() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut entities = ZiEntitiesPerType::new();
    customer(&mut entities, 1, "Lovelace, Ada");
    customer(&mut entities, 2, "say \"hi\"");

    write(&registry(), &entities, ZiExportConfig::new(dir.path())).expect("write");
    let csv = fs::read_to_string(dir.path().join("customers.csv")).expect("customers.csv");
    assert_eq!(csv, "id,name\n1,\"Lovelace, Ada\"\n2,\"say \"\"hi\"\"\"\n");
}

#[test]
fn ordered_sets_write_ascending_identifiers() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut entities = ZiEntitiesPerType::new();
    customer(&mut entities, 30, "c");
    customer(&mut entities, 10, "a");
    customer(&mut entities, 20, "b");

    write(&registry(), &entities, ZiExportConfig::new(dir.path())).expect("write");
    let csv = fs::read_to_string(dir.path().join("customers.csv")).expect("customers.csv");
    assert_eq!(csv, "id,name\n10,a\n20,b\n30,c\n");
}

#[test]
fn latin1_output_is_single_byte() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut entities = ZiEntitiesPerType::new();
    customer(&mut entities, 1, "Café");

    let config = ZiExportConfig::new(dir.path()).with_charset(ZiCharset::Latin1);
    write(&registry(), &entities, config).expect("write");

    let bytes = fs::read(dir.path().join("customers.csv")).expect("customers.csv");
    assert_eq!(bytes, b"id,name\n1,Caf\xE9\n".to_vec());
}

#[test]
fn unencodable_text_fails_before_any_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut entities = order_dataset();
    customer(&mut entities, 1, "5 €");

    let config = ZiExportConfig::new(dir.path()).with_charset(ZiCharset::Latin1);
    let err = write(&registry(), &entities, config).unwrap_err();
    assert!(matches!(err, ZiError::Encoding { ref message, .. } if message.contains("customers")));
    assert!(file_names(dir.path()).is_empty());
}

#[test]
fn utf16_output_decodes_back() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = ZiExportConfig::new(dir.path()).with_charset(ZiCharset::Utf16Le);
    write(&registry(), &order_dataset(), config).expect("write");

    let bytes = fs::read(dir.path().join("orders.csv")).expect("orders.csv");
    assert_eq!(&bytes[..4], &[b'i', 0, b'd', 0]);
    let text = ZiCharset::Utf16Le.decode(&bytes).expect("decode");
    assert_eq!(text, "id,status,archived_at\n1,NEW,null\n2,null,2024-01-01\n");

    let manifest = ZiTableOrderingManifest::read(&dir.path().join("table-ordering.txt"), ZiCharset::Utf16Le)
        .expect("manifest");
    assert_eq!(manifest.tables(), ["orders"]);
}

#[test]
fn crlf_applies_to_tables_and_manifest() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = ZiExportConfig::new(dir.path()).with_line_ending(ZiLineEnding::CrLf);
    write(&registry(), &order_dataset(), config).expect("write");

    let csv = fs::read_to_string(dir.path().join("orders.csv")).expect("orders.csv");
    assert_eq!(csv, "id,status,archived_at\r\n1,NEW,null\r\n2,null,2024-01-01\r\n");
    let manifest = fs::read_to_string(dir.path().join("table-ordering.txt")).expect("manifest");
    assert_eq!(manifest, "orders\r\n");
}

#[test]
fn partial_explicit_order_still_lists_every_written_table() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut entities = order_dataset();
    customer(&mut entities, 1, "Ada");

    let config = ZiExportConfig::new(dir.path()).with_table_order(["Customer"]);
    let stats = write(&registry(), &entities, config).expect("write");

    let manifest = fs::read_to_string(dir.path().join("table-ordering.txt")).expect("manifest");
    assert_eq!(manifest, "customers\norders\n");
    let written: Vec<&str> = stats.files.iter().map(|f| f.table.as_str()).collect();
    assert_eq!(written, vec!["customers", "orders"]);
}

#[test]
fn explicit_order_skips_tables_without_rows() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = ZiExportConfig::new(dir.path()).with_table_order(["Customer", "Order"]);
    write(&registry(), &order_dataset(), config).expect("write");

    let manifest = fs::read_to_string(dir.path().join("table-ordering.txt")).expect("manifest");
    assert_eq!(manifest, "orders\n");
}

#[test]
fn rerun_overwrites_and_leaves_no_temp_files() {
    let dir = tempfile::tempdir().expect("tempdir");
    let registry = registry();
    fs::write(dir.path().join("orders.csv"), "stale contents that are longer than the export\n")
        .expect("stale");

    write(&registry, &order_dataset(), ZiExportConfig::new(dir.path())).expect("first");
    write(&registry, &order_dataset(), ZiExportConfig::new(dir.path())).expect("second");

    assert_eq!(file_names(dir.path()), vec!["orders.csv", "table-ordering.txt"]);
    let csv = fs::read_to_string(dir.path().join("orders.csv")).expect("orders.csv");
    assert!(csv.starts_with("id,status,archived_at\n"));
}

#[test]
fn non_atomic_mode_writes_same_layout() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = ZiExportConfig::new(dir.path())
        .with_atomic_write(false)
        .with_manifest_file_name("load-order.txt");
    write(&registry(), &order_dataset(), config).expect("write");

    assert_eq!(file_names(dir.path()), vec!["load-order.txt", "orders.csv"]);
}

#[test]
fn property_sharing_the_identifier_column_keeps_identifier_cell() {
    let dir = tempfile::tempdir().expect("tempdir");
    let registry = ZiEntityRegistry::new()
        .with_entity(
            ZiEntityDescriptor::new("Order")
                .with_table("orders")
                .with_identifier("id")
                .with_column("legacyId", "id")
                .with_scalar("status"),
        )
        .expect("order");
    let mut entities = ZiEntitiesPerType::new();
    entities
        .insert(
            ZiObject::new("Order")
                .with("id", 1i64)
                .with("legacyId", 99i64)
                .with("status", "NEW")
                .into_shared(),
            &ZiValue::Int(1),
        )
        .expect("order");

    write(&registry, &entities, ZiExportConfig::new(dir.path())).expect("write");
    let csv = fs::read_to_string(dir.path().join("orders.csv")).expect("orders.csv");
    assert_eq!(csv, "id,status\n1,NEW\n");
}

#[test]
fn same_column_reads_each_types_own_property() {
    let dir = tempfile::tempdir().expect("tempdir");
    let registry = ZiEntityRegistry::new()
        .with_entity(
            ZiEntityDescriptor::new("Product")
                .with_table("items")
                .with_identifier("id")
                .with_column("sku", "code"),
        )
        .expect("product")
        .with_entity(
            ZiEntityDescriptor::new("Voucher")
                .with_table("items")
                .with_identifier("id")
                .with_column("label", "code"),
        )
        .expect("voucher");
    let mut entities = ZiEntitiesPerType::new();
    entities
        .insert(
            ZiObject::new("Product").with("id", 1i64).with("sku", "S-1").into_shared(),
            &ZiValue::Int(1),
        )
        .expect("product");
    entities
        .insert(
            ZiObject::new("Voucher").with("id", 2i64).with("label", "L-2").into_shared(),
            &ZiValue::Int(2),
        )
        .expect("voucher");

    write(&registry, &entities, ZiExportConfig::new(dir.path())).expect("write");
    let csv = fs::read_to_string(dir.path().join("items.csv")).expect("items.csv");
    assert_eq!(csv, "id,code\n1,S-1\n2,L-2\n");
}

#[test]
fn unencodable_table_name_fails_before_any_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let registry = ZiEntityRegistry::new()
        .with_entity(ZiEntityDescriptor::new("Client").with_table("alpha").with_identifier("id"))
        .expect("client")
        .with_entity(
            ZiEntityDescriptor::new("Booking")
                .with_table("réservations")
                .with_identifier("id"),
        )
        .expect("booking");
    let mut entities = ZiEntitiesPerType::new();
    entities
        .insert(ZiObject::new("Client").with("id", 1i64).into_shared(), &ZiValue::Int(1))
        .expect("client");
    entities
        .insert(ZiObject::new("Booking").with("id", 1i64).into_shared(), &ZiValue::Int(1))
        .expect("booking");

    let config = ZiExportConfig::new(dir.path()).with_charset(ZiCharset::Ascii);
    let err = write(&registry, &entities, config).unwrap_err();
    assert!(matches!(err, ZiError::Encoding { ref message, .. } if message.contains("réservations")));
    assert!(file_names(dir.path()).is_empty());
}

#[test]
fn table_name_with_path_separator_is_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let registry = ZiEntityRegistry::new()
        .with_entity(ZiEntityDescriptor::new("Customer").with_table("customers").with_identifier("id"))
        .expect("customer")
        .with_entity(ZiEntityDescriptor::new("AuditLog").with_table("audit/log").with_identifier("id"))
        .expect("audit");
    let mut entities = ZiEntitiesPerType::new();
    entities
        .insert(ZiObject::new("Customer").with("id", 1i64).into_shared(), &ZiValue::Int(1))
        .expect("customer");
    entities
        .insert(ZiObject::new("AuditLog").with("id", 1i64).into_shared(), &ZiValue::Int(1))
        .expect("audit");

    let err = write(&registry, &entities, ZiExportConfig::new(dir.path())).unwrap_err();
    assert!(err.is_configuration());
    assert!(err.to_string().contains("audit/log"));
    assert!(file_names(dir.path()).is_empty());
}

#[test]
fn unwritable_table_path_names_table_and_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::create_dir(dir.path().join("orders.csv")).expect("blocking dir");

    let config = ZiExportConfig::new(dir.path()).with_atomic_write(false);
    let err = write(&registry(), &order_dataset(), config).unwrap_err();
    match err {
        ZiError::Write { table, message } => {
            assert_eq!(table, "orders");
            assert!(message.contains("orders.csv"), "{}", message);
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn manifest_name_ending_in_csv_is_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = ZiExportConfig::new(dir.path()).with_manifest_file_name("orders.csv");
    let err = write(&registry(), &order_dataset(), config).unwrap_err();
    assert!(err.is_configuration());
    assert!(file_names(dir.path()).is_empty());
}
