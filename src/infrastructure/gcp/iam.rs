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

use crate::domain::config::stack::UserConfig;
use crate::domain::graph::{Input, ResourceGraph, ResourceHandle, ResourceType};
use crate::infrastructure::constants::IAM_CLUSTER_VIEWER_ROLE;
use crate::infrastructure::gcp::provider::GcpProvider;
use crate::shared::error::Result;
use tracing::info;

/// Grants the project-level cluster viewer role to every RBAC user.
///
/// Each grant is a non-authoritative member binding keyed by email, so grants
/// for the same role do not overwrite one another.
pub fn create_viewer_bindings(
    graph: &mut ResourceGraph,
    provider: &GcpProvider,
    users: &[UserConfig],
) -> Result<Vec<ResourceHandle>> {
    let mut bindings = Vec::with_capacity(users.len());
    for user in users {
        let binding = graph.add(
            provider
                .spec(ResourceType::ProjectIamMember, format!("gke-viewer-{}", user.email))
                .properties(member_properties(
                    &provider.project,
                    IAM_CLUSTER_VIEWER_ROLE,
                    Input::from(format!("user:{}", user.email)),
                )),
        )?;
        bindings.push(binding);
    }

    info!(users = bindings.len(), role = IAM_CLUSTER_VIEWER_ROLE, "IAM bindings described");
    Ok(bindings)
}

pub fn member_properties(project: &str, role: &str, member: Input) -> Input {
    Input::object([
        ("project", Input::from(project)),
        ("role", Input::from(role)),
        ("member", member),
    ])
}
