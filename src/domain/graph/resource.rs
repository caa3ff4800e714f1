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

use crate::domain::graph::input::{Input, OutputRef};
use serde::Serialize;
use std::fmt;

/// Arena index of a resource inside a [`ResourceGraph`](super::ResourceGraph).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ResourceId(pub(crate) usize);

impl ResourceId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Every resource type the stack knows how to describe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceType {
    GcpProvider,
    ProjectService,
    ContainerCluster,
    NodePool,
    RedisInstance,
    SqlDatabaseInstance,
    SqlDatabase,
    SqlUser,
    ProjectIamMember,
    ServiceAccount,
    ServiceAccountKey,
    KubernetesProvider,
    ClusterRole,
    ClusterRoleBinding,
    Namespace,
    Secret,
    HelmRelease,
}

impl ResourceType {
    /// Type token understood by the provisioning engine.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::GcpProvider => "pulumi:providers:gcp",
            ResourceType::ProjectService => "gcp:projects/service:Service",
            ResourceType::ContainerCluster => "gcp:container/cluster:Cluster",
            ResourceType::NodePool => "gcp:container/nodePool:NodePool",
            ResourceType::RedisInstance => "gcp:redis/instance:Instance",
            ResourceType::SqlDatabaseInstance => "gcp:sql/databaseInstance:DatabaseInstance",
            ResourceType::SqlDatabase => "gcp:sql/database:Database",
            ResourceType::SqlUser => "gcp:sql/user:User",
            ResourceType::ProjectIamMember => "gcp:projects/iAMMember:IAMMember",
            ResourceType::ServiceAccount => "gcp:serviceaccount/account:Account",
            ResourceType::ServiceAccountKey => "gcp:serviceaccount/key:Key",
            ResourceType::KubernetesProvider => "pulumi:providers:kubernetes",
            ResourceType::ClusterRole => "kubernetes:rbac.authorization.k8s.io/v1:ClusterRole",
            ResourceType::ClusterRoleBinding => {
                "kubernetes:rbac.authorization.k8s.io/v1:ClusterRoleBinding"
            }
            ResourceType::Namespace => "kubernetes:core/v1:Namespace",
            ResourceType::Secret => "kubernetes:core/v1:Secret",
            ResourceType::HelmRelease => "kubernetes:helm.sh/v3:Release",
        }
    }

    /// Short human-readable kind used in plan tables.
    pub fn kind(&self) -> &'static str {
        match self {
            ResourceType::GcpProvider => "GcpProvider",
            ResourceType::ProjectService => "Service",
            ResourceType::ContainerCluster => "Cluster",
            ResourceType::NodePool => "NodePool",
            ResourceType::RedisInstance => "RedisInstance",
            ResourceType::SqlDatabaseInstance => "SqlInstance",
            ResourceType::SqlDatabase => "SqlDatabase",
            ResourceType::SqlUser => "SqlUser",
            ResourceType::ProjectIamMember => "IAMMember",
            ResourceType::ServiceAccount => "ServiceAccount",
            ResourceType::ServiceAccountKey => "ServiceAccountKey",
            ResourceType::KubernetesProvider => "KubernetesProvider",
            ResourceType::ClusterRole => "ClusterRole",
            ResourceType::ClusterRoleBinding => "ClusterRoleBinding",
            ResourceType::Namespace => "Namespace",
            ResourceType::Secret => "Secret",
            ResourceType::HelmRelease => "HelmRelease",
        }
    }

    pub fn is_provider(&self) -> bool {
        matches!(
            self,
            ResourceType::GcpProvider | ResourceType::KubernetesProvider
        )
    }

    /// Kubernetes objects carry a `metadata.name` that must be unique per namespace.
    pub fn is_kubernetes_object(&self) -> bool {
        matches!(
            self,
            ResourceType::ClusterRole
                | ResourceType::ClusterRoleBinding
                | ResourceType::Namespace
                | ResourceType::Secret
        )
    }

    /// Output attributes the engine stores as secrets.
    pub fn secret_attributes(&self) -> &'static [&'static str] {
        match self {
            ResourceType::RedisInstance => &["authString"],
            ResourceType::SqlUser => &["password"],
            ResourceType::ServiceAccountKey => &["privateKey"],
            ResourceType::ContainerCluster => &[
                "masterAuth.clientKey",
                "masterAuth.clientCertificate",
            ],
            ResourceType::KubernetesProvider => &["kubeconfig"],
            ResourceType::Secret => &["data", "stringData"],
            _ => &[],
        }
    }

    pub fn is_secret_attribute(&self, attribute: &str) -> bool {
        self.secret_attributes().iter().any(|a| {
            attribute == *a
                || attribute
                    .strip_prefix(a)
                    .is_some_and(|rest| rest.starts_with('.'))
        })
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceOptions {
    pub provider: Option<ResourceId>,
    pub depends_on: Vec<ResourceId>,
    pub protect: bool,
    pub retain_on_delete: bool,
}

/// Immutable description of one resource in the graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    pub id: ResourceId,
    pub name: String,
    pub resource_type: ResourceType,
    pub properties: Input,
    pub options: ResourceOptions,
}

impl Resource {
    /// Direct parents: the explicit dependencies plus the provider.
    pub fn parents(&self) -> impl Iterator<Item = ResourceId> + '_ {
        self.options
            .provider
            .iter()
            .copied()
            .chain(self.options.depends_on.iter().copied())
    }

    pub fn depends_on(&self, other: ResourceId) -> bool {
        self.options.depends_on.contains(&other)
    }

    pub fn property(&self, path: &str) -> Option<&Input> {
        self.properties.at(path)
    }
}

/// Lightweight reference to a registered resource, returned by the graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceHandle {
    pub id: ResourceId,
    pub name: String,
    pub resource_type: ResourceType,
    /// Generation of the graph that minted the handle.
    pub(crate) graph: u64,
}

impl ResourceHandle {
    /// Reference to one of this resource's output attributes (dotted path).
    pub fn output(&self, attribute: &str) -> OutputRef {
        OutputRef {
            resource: self.id,
            name: self.name.clone(),
            resource_type: self.resource_type,
            attribute: attribute.to_string(),
        }
    }

    pub fn output_input(&self, attribute: &str) -> Input {
        Input::Ref(self.output(attribute))
    }
}

/// Description of a resource before it is registered.
#[derive(Debug, Clone)]
pub struct ResourceSpec {
    pub(crate) name: String,
    pub(crate) resource_type: ResourceType,
    pub(crate) properties: Input,
    pub(crate) options: ResourceOptions,
    pub(crate) handles: Vec<ResourceHandle>,
}

impl ResourceSpec {
    pub fn new(resource_type: ResourceType, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            resource_type,
            properties: Input::empty_object(),
            options: ResourceOptions::default(),
            handles: Vec::new(),
        }
    }

    pub fn properties(mut self, properties: Input) -> Self {
        self.properties = properties;
        self
    }

    pub fn provider(mut self, provider: &ResourceHandle) -> Self {
        self.options.provider = Some(provider.id);
        self.handles.push(provider.clone());
        self
    }

    pub fn depends_on(mut self, parent: &ResourceHandle) -> Self {
        if !self.options.depends_on.contains(&parent.id) {
            self.options.depends_on.push(parent.id);
            self.handles.push(parent.clone());
        }
        self
    }

    pub fn depends_on_all<'a>(
        mut self,
        parents: impl IntoIterator<Item = &'a ResourceHandle>,
    ) -> Self {
        for parent in parents {
            self = self.depends_on(parent);
        }
        self
    }

    pub fn protect(mut self, protect: bool) -> Self {
        self.options.protect = protect;
        self
    }

    pub fn retain_on_delete(mut self, retain: bool) -> Self {
        self.options.retain_on_delete = retain;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn resource_type(&self) -> ResourceType {
        self.resource_type
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_attribute_matching() {
        assert!(ResourceType::RedisInstance.is_secret_attribute("authString"));
        assert!(!ResourceType::RedisInstance.is_secret_attribute("authStringLength"));
        assert!(ResourceType::Secret.is_secret_attribute("data.credentials.json"));
        assert!(!ResourceType::ContainerCluster.is_secret_attribute("endpoint"));
    }

    #[test]
    fn test_spec_deduplicates_dependencies() {
        let parent = ResourceHandle {
            id: ResourceId(0),
            name: "parent".to_string(),
            resource_type: ResourceType::ProjectService,
            graph: 0,
        };
        let spec = ResourceSpec::new(ResourceType::ContainerCluster, "child")
            .depends_on(&parent)
            .depends_on(&parent);
        assert_eq!(spec.options.depends_on, vec![ResourceId(0)]);
    }
}
