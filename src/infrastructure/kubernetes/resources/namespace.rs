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

use crate::domain::graph::{Input, ResourceGraph, ResourceHandle, ResourceType};
use crate::infrastructure::constants::*;
use crate::infrastructure::kubernetes::provider::KubernetesProvider;
use crate::shared::error::Result;
use k8s_openapi::api::core::v1::Namespace;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use std::collections::BTreeMap;

pub struct NamespaceBuilder {
    name: String,
    component: String,
}

impl NamespaceBuilder {
    pub fn new(name: impl Into<String>, component: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            component: component.into(),
        }
    }

    pub fn build(&self) -> Namespace {
        let mut labels = BTreeMap::new();
        labels.insert(LABEL_MANAGED_BY.to_string(), LABEL_MANAGED_BY_VALUE.to_string());
        labels.insert(LABEL_COMPONENT.to_string(), self.component.clone());

        Namespace {
            metadata: ObjectMeta {
                name: Some(self.name.clone()),
                labels: Some(labels),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Registers the namespace under `resource_name`, bound to the in-cluster provider.
    pub fn register(
        &self,
        graph: &mut ResourceGraph,
        provider: &KubernetesProvider,
        resource_name: &str,
    ) -> Result<ResourceHandle> {
        graph.add(
            provider
                .spec(ResourceType::Namespace, resource_name)
                .properties(Input::from_json(serde_json::to_value(self.build())?)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_namespace_labels() {
        let ns = NamespaceBuilder::new("external-dns", "external-dns").build();
        assert_eq!(ns.metadata.name.as_deref(), Some("external-dns"));
        let labels = ns.metadata.labels.unwrap();
        assert_eq!(labels.get(LABEL_MANAGED_BY).map(String::as_str), Some("gke-stack"));
        assert_eq!(labels.get(LABEL_COMPONENT).map(String::as_str), Some("external-dns"));
    }

    #[test]
    fn test_namespace_manifest_has_kind() {
        let value = serde_json::to_value(NamespaceBuilder::new("ops", "ops").build()).unwrap();
        assert_eq!(value["kind"], "Namespace");
        assert_eq!(value["apiVersion"], "v1");
    }
}
