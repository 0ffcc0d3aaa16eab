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

//! # Zi Value Module
//!
//! Property values read from live entities. A value is either a scalar that
//! can be written into a cell, or an object (a referenced entity or an
//! embedded component) that the metadata resolver reduces to scalars before
//! anything is written.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Timelike, Utc};

use crate::entity::ZiMapped;

/// A property value held by a live entity.
#[derive(Clone)]
pub enum ZiValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Timestamp(DateTime<Utc>),
    /// A to-one reference to another tracked entity.
    Entity(Arc<dyn ZiMapped>),
    /// An embedded value object inlined into the owner's table.
    Component(Arc<dyn ZiMapped>),
}

impl ZiValue {
    pub fn is_null(&self) -> bool {
        matches!(self, ZiValue::Null)
    }

    /// Wraps an entity as a to-one reference value.
    pub fn entity<T: ZiMapped + 'static>(entity: T) -> Self {
        ZiValue::Entity(Arc::new(entity))
    }

    /// Wraps a value object as an embedded component value.
    pub fn component<T: ZiMapped + 'static>(component: T) -> Self {
        ZiValue::Component(Arc::new(component))
    }

    /// Renders the value as cell text. `None` means the cell is null.
    ///
    /// Objects have no textual form of their own; the resolver reduces them
    /// before rows are built.
    pub fn render(&self) -> Option<String> {
        match self {
            ZiValue::Null | ZiValue::Entity(_) | ZiValue::Component(_) => None,
            ZiValue::Bool(v) => Some(v.to_string()),
            ZiValue::Int(v) => Some(v.to_string()),
            ZiValue::Float(v) => Some(v.to_string()),
            ZiValue::Text(v) => Some(v.clone()),
            ZiValue::Date(v) => Some(v.format("%Y-%m-%d").to_string()),
            ZiValue::DateTime(v) => Some(render_date_time(v)),
            ZiValue::Timestamp(v) => Some(render_date_time(&v.naive_utc())),
        }
    }

    /// Returns the ordering key when the value is comparable.
    pub fn identifier_key(&self) -> Option<ZiIdentifierKey> {
        match self {
            ZiValue::Bool(v) => Some(ZiIdentifierKey::Bool(*v)),
            ZiValue::Int(v) => Some(ZiIdentifierKey::Int(*v)),
            ZiValue::Float(v) => Some(ZiIdentifierKey::Float(*v)),
            ZiValue::Text(v) => Some(ZiIdentifierKey::Text(v.clone())),
            ZiValue::Date(v) => Some(ZiIdentifierKey::Date(*v)),
            ZiValue::DateTime(v) => Some(ZiIdentifierKey::DateTime(*v)),
            ZiValue::Timestamp(v) => Some(ZiIdentifierKey::Timestamp(*v)),
            ZiValue::Null | ZiValue::Entity(_) | ZiValue::Component(_) => None,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            ZiValue::Null => "null",
            ZiValue::Bool(_) => "bool",
            ZiValue::Int(_) => "int",
            ZiValue::Float(_) => "float",
            ZiValue::Text(_) => "text",
            ZiValue::Date(_) => "date",
            ZiValue::DateTime(_) => "datetime",
            ZiValue::Timestamp(_) => "timestamp",
            ZiValue::Entity(_) => "entity",
            ZiValue::Component(_) => "component",
        }
    }
}

fn render_date_time(value: &NaiveDateTime) -> String {
    if value.nanosecond() == 0 {
        value.format("%Y-%m-%d %H:%M:%S").to_string()
    } else {
        value.format("%Y-%m-%d %H:%M:%S%.f").to_string()
    }
}

impl fmt::Debug for ZiValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ZiValue::Entity(e) => write!(f, "Entity({})", e.type_name()),
            ZiValue::Component(c) => write!(f, "Component({})", c.type_name()),
            other => match other.render() {
                Some(text) => write!(f, "{}({:?})", other.kind_name(), text),
                None => f.write_str("Null"),
            },
        }
    }
}

impl PartialEq for ZiValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ZiValue::Null, ZiValue::Null) => true,
            (ZiValue::Bool(a), ZiValue::Bool(b)) => a == b,
            (ZiValue::Int(a), ZiValue::Int(b)) => a == b,
            (ZiValue::Float(a), ZiValue::Float(b)) => a == b,
            (ZiValue::Text(a), ZiValue::Text(b)) => a == b,
            (ZiValue::Date(a), ZiValue::Date(b)) => a == b,
            (ZiValue::DateTime(a), ZiValue::DateTime(b)) => a == b,
            (ZiValue::Timestamp(a), ZiValue::Timestamp(b)) => a == b,
            (ZiValue::Entity(a), ZiValue::Entity(b)) => Arc::ptr_eq(a, b),
            (ZiValue::Component(a), ZiValue::Component(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<bool> for ZiValue {
    fn from(v: bool) -> Self {
        ZiValue::Bool(v)
    }
}

impl From<i64> for ZiValue {
    fn from(v: i64) -> Self {
        ZiValue::Int(v)
    }
}

impl From<i32> for ZiValue {
    fn from(v: i32) -> Self {
        ZiValue::Int(i64::from(v))
    }
}

impl From<u32> for ZiValue {
    fn from(v: u32) -> Self {
        ZiValue::Int(i64::from(v))
    }
}

impl From<f64> for ZiValue {
    fn from(v: f64) -> Self {
        ZiValue::Float(v)
    }
}

impl From<&str> for ZiValue {
    fn from(v: &str) -> Self {
        ZiValue::Text(v.to_string())
    }
}

impl From<String> for ZiValue {
    fn from(v: String) -> Self {
        ZiValue::Text(v)
    }
}

impl From<NaiveDate> for ZiValue {
    fn from(v: NaiveDate) -> Self {
        ZiValue::Date(v)
    }
}

impl From<NaiveDateTime> for ZiValue {
    fn from(v: NaiveDateTime) -> Self {
        ZiValue::DateTime(v)
    }
}

impl From<DateTime<Utc>> for ZiValue {
    fn from(v: DateTime<Utc>) -> Self {
        ZiValue::Timestamp(v)
    }
}

impl<T: Into<ZiValue>> From<Option<T>> for ZiValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(ZiValue::Null)
    }
}

/// Totally ordered key derived from a comparable identifier.
///
/// Keys of different kinds order by kind first, so a set never panics on a
/// mixed-type identifier column.
#[derive(Clone, Debug)]
pub enum ZiIdentifierKey {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Timestamp(DateTime<Utc>),
}

impl ZiIdentifierKey {
    fn rank(&self) -> u8 {
        match self {
            ZiIdentifierKey::Bool(_) => 0,
            ZiIdentifierKey::Int(_) => 1,
            ZiIdentifierKey::Float(_) => 2,
            ZiIdentifierKey::Text(_) => 3,
            ZiIdentifierKey::Date(_) => 4,
            ZiIdentifierKey::DateTime(_) => 5,
            ZiIdentifierKey::Timestamp(_) => 6,
        }
    }
}

impl Ord for ZiIdentifierKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (ZiIdentifierKey::Bool(a), ZiIdentifierKey::Bool(b)) => a.cmp(b),
            (ZiIdentifierKey::Int(a), ZiIdentifierKey::Int(b)) => a.cmp(b),
            (ZiIdentifierKey::Float(a), ZiIdentifierKey::Float(b)) => a.total_cmp(b),
            (ZiIdentifierKey::Text(a), ZiIdentifierKey::Text(b)) => a.cmp(b),
            (ZiIdentifierKey::Date(a), ZiIdentifierKey::Date(b)) => a.cmp(b),
            (ZiIdentifierKey::DateTime(a), ZiIdentifierKey::DateTime(b)) => a.cmp(b),
            (ZiIdentifierKey::Timestamp(a), ZiIdentifierKey::Timestamp(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for ZiIdentifierKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for ZiIdentifierKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ZiIdentifierKey {}
