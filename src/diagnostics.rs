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

//! # Diagnostics Module
//!
//! Structured events emitted while exporting: progress at info level,
//! tracked instances and degraded cells at debug level. Events go to a
//! [`ZiDiagnostics`] sink; [`ZiLogDiagnostics`] forwards them to the `log`
//! facade and [`ZiCollectingDiagnostics`] keeps them for inspection.

use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::{json, Map, Value};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ZiDiagnosticLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl ZiDiagnosticLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ZiDiagnosticLevel::Debug => "DEBUG",
            ZiDiagnosticLevel::Info => "INFO",
            ZiDiagnosticLevel::Warning => "WARNING",
            ZiDiagnosticLevel::Error => "ERROR",
        }
    }

    fn as_log_level(&self) -> log::Level {
        match self {
            ZiDiagnosticLevel::Debug => log::Level::Debug,
            ZiDiagnosticLevel::Info => log::Level::Info,
            ZiDiagnosticLevel::Warning => log::Level::Warn,
            ZiDiagnosticLevel::Error => log::Level::Error,
        }
    }
}

/// A structured event emitted while exporting.
#[derive(Clone, Debug)]
pub struct ZiDiagnosticEvent {
    pub level: ZiDiagnosticLevel,
    pub event: String,
    pub message: String,
    pub fields: Map<String, Value>,
    pub timestamp: SystemTime,
}

impl ZiDiagnosticEvent {
    pub fn new(level: ZiDiagnosticLevel, event: impl Into<String>, message: impl Into<String>) -> Self {
        ZiDiagnosticEvent {
            level,
            event: event.into(),
            message: message.into(),
            fields: Map::new(),
            timestamp: SystemTime::now(),
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn to_json(&self) -> Value {
        let ts = self
            .timestamp
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis();

        json!({
            "level": self.level.as_str(),
            "event": self.event,
            "message": self.message,
            "timestamp_ms": ts,
            "fields": Value::Object(self.fields.clone()),
        })
    }
}

/// Receiver of export diagnostics.
pub trait ZiDiagnostics: Send + Sync {
    fn handle(&self, event: &ZiDiagnosticEvent);
}

/// Forwards events to the `log` facade.
#[derive(Debug, Default)]
pub struct ZiLogDiagnostics;

impl ZiDiagnostics for ZiLogDiagnostics {
    fn handle(&self, event: &ZiDiagnosticEvent) {
        if event.fields.is_empty() {
            log::log!(event.level.as_log_level(), "[{}] {}", event.event, event.message);
        } else {
            log::log!(
                event.level.as_log_level(),
                "[{}] {} {}",
                event.event,
                event.message,
                Value::Object(event.fields.clone())
            );
        }
    }
}

/// Keeps every event in memory.
#[derive(Debug, Default)]
pub struct ZiCollectingDiagnostics {
    events: Mutex<Vec<ZiDiagnosticEvent>>,
}

impl ZiCollectingDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ZiDiagnosticEvent> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Events with the given name, in emission order.
    pub fn named(&self, event: &str) -> Vec<ZiDiagnosticEvent> {
        self.events().into_iter().filter(|e| e.event == event).collect()
    }
}

impl ZiDiagnostics for ZiCollectingDiagnostics {
    fn handle(&self, event: &ZiDiagnosticEvent) {
        match self.events.lock() {
            Ok(mut events) => events.push(event.clone()),
            Err(poisoned) => poisoned.into_inner().push(event.clone()),
        }
    }
}
