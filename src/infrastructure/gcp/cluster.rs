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

use crate::domain::config::stack::ClusterConfig;
use crate::domain::graph::{
    Input, OutputRef, ResourceGraph, ResourceHandle, ResourceType, Transform,
};
use crate::infrastructure::constants::*;
use crate::infrastructure::gcp::provider::GcpProvider;
use crate::shared::error::Result;
use tracing::info;

/// Cluster outputs needed to synthesize a kubeconfig.
#[derive(Debug, Clone)]
pub struct ClusterCredentials {
    pub name: OutputRef,
    pub endpoint: OutputRef,
    pub ca_certificate: OutputRef,
}

impl ClusterCredentials {
    /// Kubeconfig document for this cluster, secret-tagged.
    pub fn kubeconfig(&self) -> Input {
        Input::apply(
            Transform::Kubeconfig,
            vec![
                self.name.clone(),
                self.endpoint.clone(),
                self.ca_certificate.clone(),
            ],
        )
        .secret()
    }
}

#[derive(Debug, Clone)]
pub struct ClusterHandles {
    pub cluster: ResourceHandle,
    pub node_pool: ResourceHandle,
    pub credentials: ClusterCredentials,
}

pub struct ClusterBuilder<'a> {
    provider: &'a GcpProvider,
    config: &'a ClusterConfig,
}

impl<'a> ClusterBuilder<'a> {
    pub fn new(provider: &'a GcpProvider, config: &'a ClusterConfig) -> Self {
        Self { provider, config }
    }

    pub fn build(
        &self,
        graph: &mut ResourceGraph,
        dependencies: &[ResourceHandle],
    ) -> Result<ClusterHandles> {
        let cluster = graph.add(
            self.provider
                .spec(ResourceType::ContainerCluster, &self.config.cluster_name)
                .properties(self.cluster_properties())
                .depends_on_all(dependencies),
        )?;

        let node_pool = graph.add(
            self.provider
                .spec(ResourceType::NodePool, &self.config.node_pool_name)
                .properties(self.node_pool_properties(&cluster))
                .depends_on(&cluster),
        )?;

        info!(
            cluster = %self.config.cluster_name,
            node_pool = %self.config.node_pool_name,
            min_nodes = self.config.min_nodes,
            max_nodes = self.config.max_nodes,
            "Cluster described"
        );

        let credentials = ClusterCredentials {
            name: cluster.output("name"),
            endpoint: cluster.output("endpoint"),
            ca_certificate: cluster.output("masterAuth.clusterCaCertificate"),
        };

        Ok(ClusterHandles {
            cluster,
            node_pool,
            credentials,
        })
    }

    fn cluster_properties(&self) -> Input {
        // The default pool is removed; nodes live in the separately managed pool.
        Input::object([
            ("name", Input::from(self.config.cluster_name.as_str())),
            ("location", Input::from(self.provider.zone.as_str())),
            ("initialNodeCount", Input::from(self.config.min_nodes)),
            ("removeDefaultNodePool", Input::from(true)),
            ("minMasterVersion", Input::from(CLUSTER_MIN_MASTER_VERSION)),
            ("network", Input::from(CLUSTER_NETWORK)),
            ("networkingMode", Input::from(CLUSTER_NETWORKING_MODE)),
            (
                "ipAllocationPolicy",
                Input::object([
                    ("clusterIpv4CidrBlock", Input::from(CLUSTER_POD_CIDR)),
                    ("servicesIpv4CidrBlock", Input::from(CLUSTER_SERVICES_CIDR)),
                ]),
            ),
        ])
    }

    fn node_pool_properties(&self, cluster: &ResourceHandle) -> Input {
        Input::object([
            ("name", Input::from(self.config.node_pool_name.as_str())),
            ("cluster", cluster.output_input("name")),
            ("location", Input::from(self.provider.zone.as_str())),
            ("nodeCount", Input::from(self.config.min_nodes)),
            (
                "nodeConfig",
                Input::object([
                    ("machineType", Input::from(self.config.machine_type.as_str())),
                    (
                        "oauthScopes",
                        Input::list(NODE_OAUTH_SCOPES.iter().map(|s| Input::from(*s))),
                    ),
                ]),
            ),
            (
                "autoscaling",
                Input::object([
                    ("minNodeCount", Input::from(self.config.min_nodes)),
                    ("maxNodeCount", Input::from(self.config.max_nodes)),
                ]),
            ),
            (
                "management",
                Input::object([
                    ("autoRepair", Input::from(true)),
                    ("autoUpgrade", Input::from(true)),
                ]),
            ),
        ])
    }
}
