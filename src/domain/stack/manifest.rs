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

//! Engine manifest
//!
//! The document handed to the provisioning engine: stack metadata, every
//! resource in registration order, and the output expressions. Secret values
//! never appear in it; only references to where the engine keeps them.

use crate::domain::graph::Resource;
use crate::domain::stack::descriptor::Stack;
use crate::shared::error::{Result, StackError};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ManifestFormat {
    #[default]
    Json,
    Yaml,
}

impl FromStr for ManifestFormat {
    type Err = StackError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "json" => Ok(ManifestFormat::Json),
            "yaml" | "yml" => Ok(ManifestFormat::Yaml),
            _ => Err(StackError::config_error(format!(
                "Invalid manifest format '{}' (expected json or yaml)",
                s
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub stack: StackMetadata,
    pub resources: Vec<ManifestResource>,
    pub outputs: Value,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StackMetadata {
    pub name: String,
    pub project: String,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestResource {
    pub name: String,
    #[serde(rename = "type")]
    pub resource_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,
    pub options: ManifestOptions,
    pub properties: Value,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestOptions {
    pub protect: bool,
    pub retain_on_delete: bool,
}

impl Manifest {
    pub fn from_stack(stack: &Stack) -> Self {
        Self::at(stack, Utc::now())
    }

    pub fn at(stack: &Stack, generated_at: DateTime<Utc>) -> Self {
        let resources = stack
            .graph
            .iter()
            .map(|resource| Self::resource(stack, resource))
            .collect();

        Self {
            stack: StackMetadata {
                name: stack.name.clone(),
                project: stack.project.clone(),
                generated_at,
            },
            resources,
            outputs: stack.outputs.to_manifest(),
        }
    }

    fn resource(stack: &Stack, resource: &Resource) -> ManifestResource {
        ManifestResource {
            name: resource.name.clone(),
            resource_type: resource.resource_type.as_str(),
            provider: resource
                .options
                .provider
                .map(|p| stack.graph.name_of(p).to_string()),
            depends_on: resource
                .options
                .depends_on
                .iter()
                .map(|d| stack.graph.name_of(*d).to_string())
                .collect(),
            options: ManifestOptions {
                protect: resource.options.protect,
                retain_on_delete: resource.options.retain_on_delete,
            },
            properties: resource.properties.to_manifest(),
        }
    }

    pub fn render(&self, format: ManifestFormat) -> Result<String> {
        match format {
            ManifestFormat::Json => Ok(serde_json::to_string_pretty(self)?),
            ManifestFormat::Yaml => Ok(serde_yaml::to_string(self)?),
        }
    }
}
