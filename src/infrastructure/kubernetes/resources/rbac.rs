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

use crate::domain::config::stack::{Role, UserConfig};
use crate::domain::graph::{Input, ResourceGraph, ResourceHandle, ResourceType};
use crate::infrastructure::constants::*;
use crate::infrastructure::kubernetes::provider::KubernetesProvider;
use crate::shared::error::Result;
use k8s_openapi::api::rbac::v1::{ClusterRole, ClusterRoleBinding, PolicyRule, RoleRef, Subject};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use std::collections::{BTreeMap, HashMap};
use tracing::info;

const READ_VERBS: &[&str] = &["get", "list", "watch"];
const WRITE_VERBS: &[&str] = &["get", "list", "watch", "create", "update", "patch", "delete"];

#[derive(Debug, Clone)]
pub struct RbacHandles {
    pub roles: HashMap<Role, ResourceHandle>,
    pub bindings: Vec<ResourceHandle>,
}

/// Describes the three cluster roles and one binding per user.
pub struct RbacBuilder<'a> {
    provider: &'a KubernetesProvider,
    users: &'a [UserConfig],
}

impl<'a> RbacBuilder<'a> {
    pub fn new(provider: &'a KubernetesProvider, users: &'a [UserConfig]) -> Self {
        Self { provider, users }
    }

    pub fn build(&self, graph: &mut ResourceGraph) -> Result<RbacHandles> {
        let mut roles = HashMap::new();
        for role in Role::ALL {
            let object = Self::cluster_role(role);
            let handle = graph.add(
                self.provider
                    .spec(ResourceType::ClusterRole, role.cluster_role_name())
                    .properties(Input::from_json(serde_json::to_value(&object)?)),
            )?;
            roles.insert(role, handle);
        }

        let mut bindings = Vec::with_capacity(self.users.len());
        for user in self.users {
            let object = Self::binding(user);
            let binding = graph.add(
                self.provider
                    .spec(ResourceType::ClusterRoleBinding, format!("{}-binding", user.email))
                    .properties(Input::from_json(serde_json::to_value(&object)?)),
            )?;
            bindings.push(binding);
        }

        info!(
            roles = roles.len(),
            bindings = bindings.len(),
            "RBAC described"
        );
        Ok(RbacHandles { roles, bindings })
    }

    pub fn cluster_role(role: Role) -> ClusterRole {
        let rules = match role {
            Role::Admin => vec![rule(&["*"], &["*"], &["*"])],
            Role::Developer => vec![
                rule(&["apps", "extensions"], &["deployments", "replicasets"], WRITE_VERBS),
                rule(&[""], &["pods", "pods/log"], READ_VERBS),
                rule(&[""], &["services", "configmaps", "secrets"], WRITE_VERBS),
            ],
            Role::Viewer => vec![rule(&["*"], &["*"], READ_VERBS)],
        };

        ClusterRole {
            metadata: ObjectMeta {
                name: Some(role.cluster_role_name().to_string()),
                labels: Some(labels()),
                ..Default::default()
            },
            rules: Some(rules),
            ..Default::default()
        }
    }

    pub fn binding(user: &UserConfig) -> ClusterRoleBinding {
        ClusterRoleBinding {
            metadata: ObjectMeta {
                name: Some(binding_object_name(&user.email)),
                labels: Some(labels()),
                ..Default::default()
            },
            role_ref: RoleRef {
                api_group: RBAC_API_GROUP.to_string(),
                kind: "ClusterRole".to_string(),
                name: user.role.cluster_role_name().to_string(),
            },
            subjects: Some(vec![Subject {
                api_group: Some(RBAC_API_GROUP.to_string()),
                kind: "User".to_string(),
                name: user.email.clone(),
                ..Default::default()
            }]),
        }
    }
}

/// Kubernetes object name for a user's binding: `<email>-binding` lowercased,
/// with every character outside `[a-z0-9.-]` replaced by `-`, trimmed to an
/// alphanumeric start and end and capped at the object name limit.
///
/// Dots are kept, so the result can still hold an empty label (`a..b@x.io`);
/// the validator rejects those emails.
pub fn binding_object_name(email: &str) -> String {
    let mapped: String = format!("{}-binding", email)
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '.' || c == '-' {
                c
            } else {
                '-'
            }
        })
        .collect();

    let trimmed = mapped.trim_start_matches(|c: char| !c.is_ascii_alphanumeric());
    let capped = &trimmed[..trimmed.len().min(K8S_MAX_NAME_LEN)];
    capped
        .trim_end_matches(|c: char| !c.is_ascii_alphanumeric())
        .to_string()
}

fn rule(api_groups: &[&str], resources: &[&str], verbs: &[&str]) -> PolicyRule {
    let owned = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();
    PolicyRule {
        api_groups: Some(owned(api_groups)),
        resources: Some(owned(resources)),
        verbs: owned(verbs),
        ..Default::default()
    }
}

fn labels() -> BTreeMap<String, String> {
    let mut labels = BTreeMap::new();
    labels.insert(LABEL_MANAGED_BY.to_string(), LABEL_MANAGED_BY_VALUE.to_string());
    labels.insert(LABEL_COMPONENT.to_string(), "rbac".to_string());
    labels
}
