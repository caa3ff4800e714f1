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

use crate::domain::config::stack::StackConfig;
use crate::domain::graph::{Input, ResourceGraph};
use crate::domain::stack::outputs::StackOutputs;
use crate::domain::stack::validator::StackValidator;
use crate::infrastructure::addons::ExternalDnsAddon;
use crate::infrastructure::constants::*;
use crate::infrastructure::gcp::{
    create_postgres, create_redis, create_viewer_bindings, ApiHandles, ClusterBuilder,
    GcpProvider,
};
use crate::infrastructure::kubernetes::resources::RbacBuilder;
use crate::infrastructure::kubernetes::KubernetesProvider;
use crate::shared::error::Result;
use tracing::info;

/// A composed stack: every resource in creation order plus the exported outputs.
#[derive(Debug, Clone)]
pub struct Stack {
    pub name: String,
    pub project: String,
    pub graph: ResourceGraph,
    pub outputs: StackOutputs,
}

/// Turns a validated configuration into a resource graph.
pub struct StackDescriptor {
    validator: StackValidator,
}

impl StackDescriptor {
    pub fn new() -> Result<Self> {
        Ok(Self {
            validator: StackValidator::new()?,
        })
    }

    pub fn compose(&self, config: &StackConfig) -> Result<Stack> {
        self.validator.validate(config)?;
        info!(stack = %config.name, project = %config.gcp.project, "Composing stack");

        let mut graph = ResourceGraph::new();
        let gcp = GcpProvider::create(&mut graph, &config.gcp)?;
        let apis = ApiHandles::create(&mut graph, &gcp, &config.apis)?;

        let cluster = ClusterBuilder::new(&gcp, &config.cluster)
            .build(&mut graph, &apis.cluster_dependencies())?;
        let redis = create_redis(&mut graph, &gcp, &config.redis, apis.redis.as_slice())?;
        let postgres = create_postgres(
            &mut graph,
            &gcp,
            &config.postgres,
            apis.sql_admin.as_slice(),
        )?;

        // Both access halves are derived from the same validated user list.
        create_viewer_bindings(&mut graph, &gcp, &config.rbac.users)?;
        let kubernetes = KubernetesProvider::create(&mut graph, &cluster)?;
        RbacBuilder::new(&kubernetes, &config.rbac.users).build(&mut graph)?;

        let external_dns = match config.external_dns_enabled() {
            Some(dns) => Some(
                ExternalDnsAddon::new(dns, &gcp, &kubernetes).build(&mut graph, apis.dns.as_ref())?,
            ),
            None => {
                info!("ExternalDNS disabled");
                None
            }
        };

        let mut outputs = StackOutputs::new();
        outputs.export(OUTPUT_CLUSTER_NAME, cluster.cluster.output("name"));
        outputs.export(OUTPUT_KUBECONFIG, cluster.credentials.kubeconfig());
        outputs.export(OUTPUT_REDIS_HOST, redis.host);
        outputs.export(OUTPUT_REDIS_PORT, redis.port);
        outputs.export(OUTPUT_REDIS_AUTH, redis.auth_string);
        outputs.export(OUTPUT_POSTGRES_HOST, postgres.host);
        outputs.export(OUTPUT_POSTGRES_CONNECTION, postgres.connection_name);
        if let Some(dns) = &external_dns {
            outputs.export(
                OUTPUT_EXTERNAL_DNS_NAMESPACE,
                Input::from(dns.namespace_name.as_str()),
            );
        }

        graph.validate()?;
        info!(
            resources = graph.len(),
            outputs = outputs.len(),
            "Stack composed"
        );

        Ok(Stack {
            name: config.name.clone(),
            project: config.gcp.project.clone(),
            graph,
            outputs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::graph::ResourceType;

    fn config() -> StackConfig {
        StackConfig::from_yaml(include_str!("../../../demos/stack.yaml")).unwrap()
    }

    #[test]
    fn test_demo_stack_composes() {
        let stack = StackDescriptor::new().unwrap().compose(&config()).unwrap();
        assert_eq!(stack.name, "dev");
        assert_eq!(stack.project, "amiara-dev-be");
        assert!(stack.graph.validate().is_ok());
        assert_eq!(stack.outputs.len(), 8);
    }

    #[test]
    fn test_logical_names_are_unique_across_types() {
        let stack = StackDescriptor::new().unwrap().compose(&config()).unwrap();
        let mut names: Vec<&str> = stack.graph.iter().map(|r| r.name.as_str()).collect();
        let total = names.len();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), total);
    }

    #[test]
    fn test_disabled_apis_drop_edges_only() {
        let mut config = config();
        config.apis.redis = false;
        let stack = StackDescriptor::new().unwrap().compose(&config).unwrap();

        assert_eq!(stack.graph.of_type(ResourceType::ProjectService).count(), 4);
        let redis = stack
            .graph
            .find(ResourceType::RedisInstance, &config.redis.instance_name)
            .unwrap();
        assert!(redis.options.depends_on.is_empty());
    }

    #[test]
    fn test_invalid_config_fails_before_composition() {
        let mut config = config();
        config.cluster.max_nodes = 0;
        assert!(StackDescriptor::new().unwrap().compose(&config).is_err());
    }
}
