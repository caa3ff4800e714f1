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

use gke_stack::domain::stack::ManifestFormat;
use gke_stack::infrastructure::constants::*;
use gke_stack::infrastructure::kubernetes::kubeconfig;
use gke_stack::shared::secret::REDACTED;
use gke_stack::*;
use serde_json::json;
use std::io::Write;
use tempfile::Builder;

const DEMO: &str = include_str!("../demos/stack.yaml");
const DEMO_STATE: &str = include_str!("../demos/state.json");

fn demo_stack() -> Stack {
    let config = StackConfig::from_yaml(DEMO).unwrap();
    StackDescriptor::new().unwrap().compose(&config).unwrap()
}

fn resolved(stack: &Stack, state: &StateSnapshot) -> Vec<ResolvedOutput> {
    stack.outputs.resolve(state).unwrap()
}

fn find<'a>(outputs: &'a [ResolvedOutput], name: &str) -> &'a ResolvedOutput {
    outputs.iter().find(|o| o.name == name).unwrap()
}

#[test]
fn test_outputs_resolve_from_state_file() {
    let mut file = Builder::new().suffix(".json").tempfile().unwrap();
    file.write_all(DEMO_STATE.as_bytes()).unwrap();

    let state = StateSnapshot::from_file(file.path()).unwrap();
    let outputs = resolved(&demo_stack(), &state);

    assert_eq!(outputs.len(), 8);
    assert_eq!(
        find(&outputs, OUTPUT_CLUSTER_NAME).value.expose(),
        &json!("amiara-dev-cluster")
    );
    assert_eq!(
        find(&outputs, OUTPUT_REDIS_HOST).value.expose(),
        &json!("10.112.0.3")
    );
    assert_eq!(find(&outputs, OUTPUT_REDIS_PORT).value.expose(), &json!(6379));
    assert_eq!(
        find(&outputs, OUTPUT_POSTGRES_CONNECTION).value.expose(),
        &json!("amiara-dev-be:us-central1:amiara-dev-postgres")
    );
    assert_eq!(
        find(&outputs, OUTPUT_EXTERNAL_DNS_NAMESPACE).value.expose(),
        &json!("external-dns")
    );
}

#[test]
fn test_kubeconfig_embeds_cluster_identity() {
    let state = StateSnapshot::from_json(DEMO_STATE).unwrap();
    let outputs = resolved(&demo_stack(), &state);

    let output = find(&outputs, OUTPUT_KUBECONFIG);
    assert!(output.is_secret());
    let text = output.value.expose().as_str().unwrap();

    let config = kubeconfig::load(text).unwrap();
    assert_eq!(config.clusters.len(), 1);
    let named = &config.clusters[0];
    assert_eq!(named.name, "amiara-dev-cluster");

    let cluster = named.cluster.as_ref().unwrap();
    assert_eq!(cluster.server.as_deref(), Some("https://34.118.10.21"));
    assert_eq!(
        cluster.certificate_authority_data.as_deref(),
        state.resources["amiara-dev-cluster"]
            .attribute("masterAuth.clusterCaCertificate")
            .and_then(|v| v.as_str())
    );
    assert_eq!(config.current_context.as_deref(), Some("amiara-dev-cluster"));

    let auth = config.auth_infos[0].auth_info.as_ref().unwrap();
    let exec = auth.exec.as_ref().unwrap();
    assert_eq!(exec.command.as_deref(), Some(KUBECONFIG_EXEC_COMMAND));
}

#[test]
fn test_secret_outputs_are_masked() {
    let state = StateSnapshot::from_json(DEMO_STATE).unwrap();
    let outputs = resolved(&demo_stack(), &state);

    let auth = find(&outputs, OUTPUT_REDIS_AUTH);
    assert!(auth.is_secret());
    assert_eq!(auth.value.to_string(), REDACTED);
    assert_eq!(auth.value.render(true), "3f9c1d7e-redis-demo-auth");
    assert!(!format!("{:?}", auth).contains("3f9c1d7e"));

    let serialized = serde_json::to_string(&outputs).unwrap();
    assert!(!serialized.contains("3f9c1d7e"));
    assert!(!serialized.contains("34.118.10.21"));

    assert!(!find(&outputs, OUTPUT_REDIS_HOST).is_secret());
    assert!(!find(&outputs, OUTPUT_CLUSTER_NAME).is_secret());
}

#[test]
fn test_missing_attribute_fails_resolution() {
    let mut state = StateSnapshot::from_json(DEMO_STATE).unwrap();
    state.resources.remove("amiara-dev-redis");

    let err = demo_stack().outputs.resolve(&state).unwrap_err();
    assert!(matches!(err, StackError::UnresolvedOutput { .. }));
    assert!(err.to_string().contains("amiara-dev-redis"));
}

#[test]
fn test_state_entry_with_wrong_type_is_ignored() {
    let mut state = StateSnapshot::from_json(DEMO_STATE).unwrap();
    state.insert(
        "amiara-dev-redis",
        ResourceType::SqlDatabaseInstance.as_str(),
        json!({ "host": "10.0.0.9", "port": 6379, "authString": "x" }),
    );
    assert!(demo_stack().outputs.resolve(&state).is_err());
}

#[test]
fn test_rendered_manifest_carries_no_secret_values() {
    let stack = demo_stack();
    let manifest = Manifest::from_stack(&stack);
    let json = manifest.render(ManifestFormat::Json).unwrap();
    let yaml = manifest.render(ManifestFormat::Yaml).unwrap();

    for text in [&json, &yaml] {
        assert!(!text.contains("3f9c1d7e"));
        assert!(text.contains("amiara-dev-cluster"));
    }

    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["resources"].as_array().unwrap().len(), stack.graph.len());
    assert_eq!(value["outputs"][OUTPUT_KUBECONFIG]["secret"], true);
}
