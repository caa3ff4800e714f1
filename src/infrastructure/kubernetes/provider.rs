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

use crate::domain::graph::{Input, ResourceGraph, ResourceHandle, ResourceSpec, ResourceType};
use crate::infrastructure::constants::KUBERNETES_PROVIDER_NAME;
use crate::infrastructure::gcp::ClusterHandles;
use crate::shared::error::Result;
use tracing::info;

/// In-cluster provider configured from the cluster's own kubeconfig.
///
/// Every Kubernetes object in the stack is bound to this provider, so none of
/// them can be created before the node pool is ready.
#[derive(Debug, Clone)]
pub struct KubernetesProvider {
    pub handle: ResourceHandle,
}

impl KubernetesProvider {
    pub fn create(graph: &mut ResourceGraph, cluster: &ClusterHandles) -> Result<Self> {
        let handle = graph.add(
            ResourceSpec::new(ResourceType::KubernetesProvider, KUBERNETES_PROVIDER_NAME)
                .properties(Input::object([(
                    "kubeconfig",
                    cluster.credentials.kubeconfig(),
                )]))
                .depends_on(&cluster.cluster)
                .depends_on(&cluster.node_pool),
        )?;

        info!(provider = KUBERNETES_PROVIDER_NAME, cluster = %cluster.cluster.name, "Kubernetes provider described");
        Ok(Self { handle })
    }

    /// Spec for a Kubernetes object bound to this provider.
    pub fn spec(&self, resource_type: ResourceType, name: impl Into<String>) -> ResourceSpec {
        ResourceSpec::new(resource_type, name).provider(&self.handle)
    }
}
