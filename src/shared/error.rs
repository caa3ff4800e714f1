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

use thiserror::Error;
pub type Result<T> = std::result::Result<T, StackError>;

#[derive(Error, Debug)]
pub enum StackError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Duplicate resource: {resource_type} '{name}' is already declared")]
    DuplicateResource { resource_type: String, name: String },

    #[error("Unknown dependency: resource '{name}' refers to an id that is not registered ({id})")]
    UnknownDependency { name: String, id: usize },

    #[error(
        "Missing dependency: resource '{resource}' reads '{attribute}' from '{referenced}' without depending on it"
    )]
    MissingDependency {
        resource: String,
        referenced: String,
        attribute: String,
    },

    #[error("Unresolved output: '{resource}.{attribute}' is not present in the state snapshot")]
    UnresolvedOutput { resource: String, attribute: String },

    #[error("Kubeconfig error: {0}")]
    Kubeconfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Pattern error: {0}")]
    Pattern(#[from] regex::Error),
}

impl From<kube::config::KubeconfigError> for StackError {
    fn from(err: kube::config::KubeconfigError) -> Self {
        StackError::Kubeconfig(err.to_string())
    }
}

impl StackError {
    pub fn config_error(context: impl Into<String>) -> Self {
        Self::ConfigError(context.into())
    }

    pub fn validation_error(context: impl Into<String>) -> Self {
        Self::ValidationError(context.into())
    }

    pub fn duplicate(resource_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self::DuplicateResource {
            resource_type: resource_type.into(),
            name: name.into(),
        }
    }

    pub fn unresolved(resource: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self::UnresolvedOutput {
            resource: resource.into(),
            attribute: attribute.into(),
        }
    }
}
