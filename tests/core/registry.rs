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

use serde_json::json;
use zi_seed::{
    ZiEntityDescriptor, ZiEntityRegistry, ZiError, ZiMetadataResolver, ZiPropertyKind,
};

const REGISTRY_JSON: &str = r#"{
  "entities": [
    {"name": "Party", "table": "parties", "identifier": {"name": "id"}},
    {"name": "Customer", "parent": "Party", "properties": [
      {"name": "name", "kind": "scalar"},
      {"name": "billing", "kind": "embedded", "embeddable": "Address"}
    ]},
    {
      "name": "Order",
      "table": "orders",
      "identifier": {"name": "id", "column": "order_id"},
      "properties": [
        {"name": "status", "kind": "scalar"},
        {"name": "customer", "kind": "association", "column": "customer_id", "target": "Customer"}
      ]
    }
  ],
  "embeddables": [
    {"name": "Address", "fields": [
      {"name": "street", "column": "street"},
      {"name": "note"}
    ]}
  ]
}"#;

#[test]
fn registry_loads_from_json() {
    let registry = ZiEntityRegistry::from_json(REGISTRY_JSON).expect("load registry");
    assert!(registry.contains_entity("Customer"));
    assert!(registry.contains_embeddable("Address"));

    let order = registry.entity("Order").expect("order");
    assert_eq!(order.identifier.as_ref().map(|i| i.column()), Some("order_id"));
    assert_eq!(
        order.properties[1].kind,
        ZiPropertyKind::Association {
            column: Some("customer_id".into()),
            target: "Customer".into(),
        }
    );

    let resolver = ZiMetadataResolver::new(&registry);
    assert_eq!(resolver.resolve_table("Customer").expect("table"), "parties");
}

#[test]
fn registry_loads_from_json_value() {
    let value = json!({
        "entities": [{"name": "Tag", "table": "tags", "identifier": {"name": "code"}}]
    });
    let registry = ZiEntityRegistry::from_json_value(value).expect("load registry");
    assert_eq!(registry.len(), 1);
}

#[test]
fn config_round_trip_preserves_descriptors() {
    let registry = ZiEntityRegistry::from_json(REGISTRY_JSON).expect("load registry");
    let config = registry.to_config();
    let names: Vec<&str> = config.entities.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["Customer", "Order", "Party"]);

    let rebuilt = ZiEntityRegistry::from_config(config).expect("rebuild");
    assert_eq!(
        rebuilt.entity("Order").expect("order"),
        registry.entity("Order").expect("order")
    );
}

#[test]
fn malformed_json_is_a_configuration_error() {
    let err = ZiEntityRegistry::from_json("{\"entities\": [{\"table\": 3}]}").unwrap_err();
    assert!(err.is_configuration());
}

#[test]
fn unknown_association_target_fails_validation() {
    let err = ZiEntityRegistry::from_json(
        r#"{"entities": [{"name": "Order", "table": "orders", "identifier": {"name": "id"},
            "properties": [{"name": "customer", "kind": "association", "target": "Customer"}]}]}"#,
    )
    .unwrap_err();
    assert!(matches!(err, ZiError::Config { .. }));
}

#[test]
fn unknown_embeddable_fails_validation() {
    let registry = ZiEntityRegistry::new()
        .with_entity(
            ZiEntityDescriptor::new("Customer")
                .with_table("customers")
                .with_identifier("id")
                .with_embedded("address", "Address"),
        )
        .expect("register");
    assert!(registry.validate().is_err());
}

#[test]
fn missing_identifier_fails_validation() {
    let registry = ZiEntityRegistry::new()
        .with_entity(ZiEntityDescriptor::new("Log").with_table("logs").with_scalar("line"))
        .expect("register");
    let err = registry.validate().unwrap_err();
    assert!(err.to_string().contains("Log"));
}

#[test]
fn abstract_parent_without_table_is_valid() {
    let registry = ZiEntityRegistry::new()
        .with_entity(ZiEntityDescriptor::new("Base").with_identifier("id"))
        .expect("register base")
        .with_entity(ZiEntityDescriptor::new("Widget").with_parent("Base").with_table("widgets"))
        .expect("register widget");
    assert!(registry.validate().is_ok());
}
