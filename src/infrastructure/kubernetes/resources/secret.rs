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

use crate::domain::graph::{Input, OutputRef, ResourceGraph, ResourceHandle, ResourceType};
use crate::infrastructure::constants::*;
use crate::infrastructure::kubernetes::provider::KubernetesProvider;
use crate::shared::error::Result;
use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use std::collections::BTreeMap;

/// Opaque secret whose data entries are filled from resource outputs.
///
/// The values are only known once the engine has created the source
/// resources, so the typed object carries metadata only and each entry is
/// placed into the properties as a secret-tagged reference.
pub struct SecretBuilder {
    name: String,
    namespace: String,
    component: String,
    entries: Vec<(String, OutputRef)>,
}

impl SecretBuilder {
    pub fn new(
        name: impl Into<String>,
        namespace: impl Into<String>,
        component: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            component: component.into(),
            entries: Vec::new(),
        }
    }

    pub fn entry(mut self, key: impl Into<String>, value: OutputRef) -> Self {
        self.entries.push((key.into(), value));
        self
    }

    pub fn build(&self) -> Secret {
        let mut labels = BTreeMap::new();
        labels.insert(LABEL_MANAGED_BY.to_string(), LABEL_MANAGED_BY_VALUE.to_string());
        labels.insert(LABEL_COMPONENT.to_string(), self.component.clone());

        Secret {
            metadata: ObjectMeta {
                name: Some(self.name.clone()),
                namespace: Some(self.namespace.clone()),
                labels: Some(labels),
                ..Default::default()
            },
            type_: Some("Opaque".to_string()),
            ..Default::default()
        }
    }

    pub fn properties(&self) -> Result<Input> {
        let mut properties = Input::from_json(serde_json::to_value(self.build())?);
        // Keys like `credentials.json` contain dots, so the map is set as a whole.
        let data = Input::object(
            self.entries
                .iter()
                .map(|(key, value)| (key.clone(), Input::Ref(value.clone()).secret())),
        );
        properties.set("data", data)?;
        Ok(properties)
    }

    /// Registers the secret. Every resource an entry reads from becomes a
    /// dependency, along with `dependencies`.
    pub fn register(
        &self,
        graph: &mut ResourceGraph,
        provider: &KubernetesProvider,
        resource_name: &str,
        dependencies: &[ResourceHandle],
    ) -> Result<ResourceHandle> {
        graph.add(
            provider
                .spec(ResourceType::Secret, resource_name)
                .properties(self.properties()?)
                .depends_on_all(dependencies),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::graph::ResourceId;

    fn key_ref() -> OutputRef {
        OutputRef {
            resource: ResourceId(7),
            name: "external-dns-key".to_string(),
            resource_type: ResourceType::ServiceAccountKey,
            attribute: "privateKey".to_string(),
        }
    }

    #[test]
    fn test_data_entry_is_secret_reference() {
        let props = SecretBuilder::new("creds", "external-dns", "external-dns")
            .entry("credentials.json", key_ref())
            .properties()
            .unwrap();

        assert!(props.is_secret());
        assert_eq!(props.refs().len(), 1);

        let manifest = props.to_manifest();
        assert_eq!(manifest["metadata"]["namespace"], "external-dns");
        assert_eq!(manifest["type"], "Opaque");
        assert_eq!(
            manifest["data"]["credentials.json"]["$secret"]["value"]["$ref"]["attribute"],
            "privateKey"
        );
    }
}
