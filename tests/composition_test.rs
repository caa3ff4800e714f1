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

use gke_stack::domain::graph::{Input, ResourceGraph, ResourceSpec};
use gke_stack::infrastructure::constants::*;
use gke_stack::*;
use serde_json::{json, Value};

const DEMO: &str = include_str!("../demos/stack.yaml");

fn demo_config() -> StackConfig {
    StackConfig::from_yaml(DEMO).unwrap()
}

fn compose(config: &StackConfig) -> Stack {
    StackDescriptor::new().unwrap().compose(config).unwrap()
}

fn depends(stack: &Stack, child: (ResourceType, &str), parent: (ResourceType, &str)) -> bool {
    let child = stack.graph.find(child.0, child.1).unwrap();
    let parent = stack.graph.find(parent.0, parent.1).unwrap();
    stack.graph.transitively_depends_on(child.id, parent.id)
}

#[test]
fn test_cluster_chain() {
    let stack = compose(&demo_config());

    let cluster = (ResourceType::ContainerCluster, "amiara-dev-cluster");
    let pool = (ResourceType::NodePool, "primary-node-pool");
    let k8s = (ResourceType::KubernetesProvider, KUBERNETES_PROVIDER_NAME);

    assert!(depends(&stack, pool, cluster));
    assert!(depends(&stack, k8s, cluster));
    assert!(depends(&stack, k8s, pool));
    assert!(depends(
        &stack,
        cluster,
        (ResourceType::ProjectService, CONTAINER_API.0)
    ));
    assert!(depends(
        &stack,
        cluster,
        (ResourceType::ProjectService, COMPUTE_API.0)
    ));
}

#[test]
fn test_database_chain() {
    let stack = compose(&demo_config());
    let instance = (ResourceType::SqlDatabaseInstance, "amiara-dev-postgres");

    assert!(depends(
        &stack,
        instance,
        (ResourceType::ProjectService, SQL_ADMIN_API.0)
    ));
    assert!(depends(
        &stack,
        (ResourceType::SqlDatabase, SQL_DATABASE_RESOURCE),
        instance
    ));
    assert!(depends(
        &stack,
        (ResourceType::SqlUser, SQL_USER_RESOURCE),
        instance
    ));
    assert!(depends(
        &stack,
        (ResourceType::RedisInstance, "amiara-dev-redis"),
        (ResourceType::ProjectService, REDIS_API.0)
    ));
}

#[test]
fn test_kubernetes_objects_bind_to_cluster_provider() {
    let stack = compose(&demo_config());
    let k8s = stack
        .graph
        .find(ResourceType::KubernetesProvider, KUBERNETES_PROVIDER_NAME)
        .unwrap();

    for resource in stack.graph.iter() {
        if resource.resource_type.is_kubernetes_object() {
            assert_eq!(
                resource.options.provider,
                Some(k8s.id),
                "{} must use the cluster provider",
                resource.name
            );
        }
    }
}

#[test]
fn test_one_binding_per_user_with_matching_role() {
    let config = demo_config();
    let stack = compose(&config);

    assert_eq!(stack.graph.of_type(ResourceType::ClusterRole).count(), 3);
    assert_eq!(
        stack.graph.of_type(ResourceType::ClusterRoleBinding).count(),
        config.rbac.users.len()
    );
    assert_eq!(
        stack.graph.of_type(ResourceType::ProjectIamMember).count(),
        config.rbac.users.len() + 1
    );

    for user in &config.rbac.users {
        let binding = stack
            .graph
            .find(
                ResourceType::ClusterRoleBinding,
                &format!("{}-binding", user.email),
            )
            .unwrap();
        let props = binding.properties.to_manifest();
        assert_eq!(props["roleRef"]["name"], user.role.cluster_role_name());
        assert_eq!(props["roleRef"]["kind"], "ClusterRole");
        assert_eq!(props["subjects"][0]["kind"], "User");
        assert_eq!(props["subjects"][0]["name"], user.email.as_str());
    }
}

#[test]
fn test_unknown_role_is_a_config_error() {
    let yaml = DEMO.replace("role: viewer", "role: superuser");
    let err = StackConfig::from_yaml(&yaml).unwrap_err();
    assert!(err.to_string().contains("superuser"));
}

#[test]
fn test_dns_disabled_leaves_no_addon_resources() {
    let mut config = demo_config();
    if let Some(dns) = config.external_dns.as_mut() {
        dns.enabled = false;
    }
    let stack = compose(&config);

    assert_eq!(stack.graph.of_type(ResourceType::ServiceAccount).count(), 0);
    assert_eq!(stack.graph.of_type(ResourceType::ServiceAccountKey).count(), 0);
    assert_eq!(stack.graph.of_type(ResourceType::Secret).count(), 0);
    assert_eq!(stack.graph.of_type(ResourceType::HelmRelease).count(), 0);
    assert_eq!(stack.graph.of_type(ResourceType::Namespace).count(), 0);
    assert!(stack.outputs.get(OUTPUT_EXTERNAL_DNS_NAMESPACE).is_none());
    assert_eq!(stack.outputs.len(), 7);

    // The API itself is still enabled.
    assert!(stack
        .graph
        .find(ResourceType::ProjectService, DNS_API.0)
        .is_some());
}

#[test]
fn test_dns_absent_section_is_disabled() {
    let mut config = demo_config();
    config.external_dns = None;
    let stack = compose(&config);
    assert_eq!(stack.graph.of_type(ResourceType::HelmRelease).count(), 0);
}

#[test]
fn test_dns_workload_waits_for_dns_admin_grant() {
    let stack = compose(&demo_config());
    let grant = (ResourceType::ProjectIamMember, EXTERNAL_DNS_IAM_RESOURCE);

    assert!(depends(
        &stack,
        (ResourceType::ServiceAccountKey, EXTERNAL_DNS_KEY_RESOURCE),
        grant
    ));
    assert!(depends(
        &stack,
        (ResourceType::Secret, EXTERNAL_DNS_SECRET_NAME),
        grant
    ));
    assert!(depends(
        &stack,
        (ResourceType::HelmRelease, EXTERNAL_DNS_NAME),
        grant
    ));
}

#[test]
fn test_custom_namespace_is_created_before_secret() {
    let stack = compose(&demo_config());

    let namespace = stack
        .graph
        .find(ResourceType::Namespace, EXTERNAL_DNS_NAMESPACE_RESOURCE)
        .unwrap();
    assert_eq!(
        namespace.properties.to_manifest()["metadata"]["name"],
        "external-dns"
    );

    let secret = stack
        .graph
        .find(ResourceType::Secret, EXTERNAL_DNS_SECRET_NAME)
        .unwrap();
    assert!(secret.depends_on(namespace.id));
    assert_eq!(
        secret.properties.to_manifest()["metadata"]["namespace"],
        "external-dns"
    );

    let release = stack
        .graph
        .find(ResourceType::HelmRelease, EXTERNAL_DNS_NAME)
        .unwrap();
    assert!(release.depends_on(secret.id));
    assert!(release.depends_on(namespace.id));
}

#[test]
fn test_default_namespace_has_no_namespace_resource() {
    let mut config = demo_config();
    if let Some(dns) = config.external_dns.as_mut() {
        dns.namespace = DEFAULT_NAMESPACE.to_string();
    }
    let stack = compose(&config);

    assert_eq!(stack.graph.of_type(ResourceType::Namespace).count(), 0);
    let secret = stack
        .graph
        .find(ResourceType::Secret, EXTERNAL_DNS_SECRET_NAME)
        .unwrap();
    let key = stack
        .graph
        .find(ResourceType::ServiceAccountKey, EXTERNAL_DNS_KEY_RESOURCE)
        .unwrap();
    assert_eq!(secret.options.depends_on, vec![key.id]);
}

#[test]
fn test_chart_values_overrides_win() {
    let mut config = demo_config();
    if let Some(dns) = config.external_dns.as_mut() {
        dns.additional_values
            .insert("logLevel".to_string(), json!("debug"));
        dns.additional_values
            .insert("replicaCount".to_string(), json!(2));
    }
    let stack = compose(&config);

    let release = stack
        .graph
        .find(ResourceType::HelmRelease, EXTERNAL_DNS_NAME)
        .unwrap();
    let values = release.properties.to_manifest()["values"].clone();
    assert_eq!(values["logLevel"], "debug");
    assert_eq!(values["replicaCount"], 2);
    assert_eq!(values["provider"], "google");
    assert_eq!(values["sources"], json!(["ingress", "service"]));
}

#[test]
fn test_every_reference_is_covered_by_an_edge() {
    let stack = compose(&demo_config());
    for resource in stack.graph.iter() {
        let ancestors = stack.graph.ancestors(resource.id);
        for reference in resource.properties.refs() {
            assert!(
                ancestors.contains(&reference.resource),
                "{} reads {} without depending on it",
                resource.name,
                reference.name
            );
        }
    }
}

#[test]
fn test_missing_edge_is_rejected() {
    let mut graph = ResourceGraph::new();
    let cluster = graph
        .add(ResourceSpec::new(ResourceType::ContainerCluster, "c"))
        .unwrap();
    graph
        .add(
            ResourceSpec::new(ResourceType::NodePool, "p")
                .properties(Input::object([("cluster", cluster.output_input("name"))])),
        )
        .unwrap();
    assert!(matches!(
        graph.validate(),
        Err(StackError::MissingDependency { .. })
    ));
}

#[test]
fn test_duplicate_resource_is_rejected() {
    let mut graph = ResourceGraph::new();
    graph
        .add(ResourceSpec::new(ResourceType::RedisInstance, "cache"))
        .unwrap();
    assert!(matches!(
        graph.add(ResourceSpec::new(ResourceType::RedisInstance, "cache")),
        Err(StackError::DuplicateResource { .. })
    ));
}

#[test]
fn test_colliding_names_fail_validation() {
    let mut config = demo_config();
    config.redis.instance_name = config.cluster.cluster_name.clone();
    assert!(StackDescriptor::new().unwrap().compose(&config).is_err());

    let mut config = demo_config();
    config.postgres.instance_name = EXTERNAL_DNS_NAME.to_string();
    assert!(StackDescriptor::new().unwrap().compose(&config).is_err());
}

#[test]
fn test_postgres_password_comes_from_config_store() {
    let stack = compose(&demo_config());
    let user = stack
        .graph
        .find(ResourceType::SqlUser, SQL_USER_RESOURCE)
        .unwrap();
    let props: Value = user.properties.to_manifest();
    assert_eq!(
        props["password"]["$secret"]["config"],
        "postgres:userPassword"
    );
}

#[test]
fn test_toml_stack_composes_like_yaml() {
    let toml = r#"
name = "staging"

[gcp]
project = "amiara-stg"
region = "europe-west1"
zone = "europe-west1-b"

[cluster]
clusterName = "stg-cluster"
machineType = "e2-standard-4"
minNodes = 1
maxNodes = 2

[redis]
instanceName = "stg-redis"
memorySizeGb = 1
tier = "BASIC"
redisVersion = "REDIS_7_0"

[postgres]
instanceName = "stg-postgres"
databaseVersion = "POSTGRES_15"
tier = "db-f1-micro"
availabilityType = "ZONAL"
diskSize = 10
diskType = "PD_SSD"
dbName = "amiara"
userName = "amiara"
deletionProtection = true

[[rbac.users]]
email = "ops@amiara.io"
role = "admin"
"#;
    let config = StackConfig::from_toml(toml).unwrap();
    let stack = compose(&config);

    assert_eq!(stack.name, "staging");
    assert_eq!(stack.graph.of_type(ResourceType::HelmRelease).count(), 0);
    let instance = stack
        .graph
        .find(ResourceType::SqlDatabaseInstance, "stg-postgres")
        .unwrap();
    assert!(instance.options.protect);
}
