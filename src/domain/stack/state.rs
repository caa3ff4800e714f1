// Copyright 2025 JiangLong.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Engine state snapshot
//!
//! A JSON export of the attributes the engine recorded for each created
//! resource, keyed by logical name:
//!
//! ```json
//! { "resources": { "amiara-dev-redis": { "type": "gcp:redis/instance:Instance",
//!                                        "attributes": { "host": "10.0.0.3" } } } }
//! ```

use crate::domain::graph::{AttributeLookup, OutputRef};
use crate::shared::error::{Result, StackError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs::read_to_string;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StateSnapshot {
    #[serde(default)]
    pub resources: BTreeMap<String, ResourceState>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResourceState {
    #[serde(rename = "type")]
    pub resource_type: String,
    #[serde(default)]
    pub attributes: Map<String, Value>,
}

impl StateSnapshot {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = read_to_string(path).map_err(|e| {
            StackError::config_error(format!(
                "Failed to read state snapshot {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn insert(
        &mut self,
        name: impl Into<String>,
        resource_type: impl Into<String>,
        attributes: Value,
    ) {
        let attributes = match attributes {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        self.resources.insert(
            name.into(),
            ResourceState {
                resource_type: resource_type.into(),
                attributes,
            },
        );
    }
}

impl ResourceState {
    /// Dotted lookup; a key that itself contains dots wins over traversal.
    pub fn attribute(&self, path: &str) -> Option<&Value> {
        if let Some(value) = self.attributes.get(path) {
            return Some(value);
        }

        let mut segments = path.split('.');
        let mut current = self.attributes.get(segments.next()?)?;
        for segment in segments {
            current = match current {
                Value::Object(map) => map.get(segment)?,
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }
}

impl AttributeLookup for StateSnapshot {
    fn attribute(&self, reference: &OutputRef) -> Option<&Value> {
        let state = self.resources.get(&reference.name)?;
        if state.resource_type != reference.resource_type.as_str() {
            debug!(
                resource = %reference.name,
                expected = reference.resource_type.as_str(),
                found = %state.resource_type,
                "State entry has a different type"
            );
            return None;
        }
        state.attribute(&reference.attribute)
    }
}
