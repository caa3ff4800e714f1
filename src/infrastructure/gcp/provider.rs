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

use crate::domain::config::stack::GcpConfig;
use crate::domain::graph::{Input, ResourceGraph, ResourceHandle, ResourceSpec, ResourceType};
use crate::infrastructure::constants::GCP_PROVIDER_NAME;
use crate::shared::error::Result;

/// Project, region and zone shared by every cloud resource in the stack.
#[derive(Debug, Clone)]
pub struct GcpProvider {
    pub handle: ResourceHandle,
    pub project: String,
    pub region: String,
    pub zone: String,
}

impl GcpProvider {
    pub fn create(graph: &mut ResourceGraph, config: &GcpConfig) -> Result<Self> {
        let handle = graph.add(
            ResourceSpec::new(ResourceType::GcpProvider, GCP_PROVIDER_NAME).properties(
                Input::object([
                    ("project", Input::from(config.project.as_str())),
                    ("region", Input::from(config.region.as_str())),
                    ("zone", Input::from(config.zone.as_str())),
                ]),
            ),
        )?;

        Ok(Self {
            handle,
            project: config.project.clone(),
            region: config.region.clone(),
            zone: config.zone.clone(),
        })
    }

    /// Starts a spec bound to this provider.
    pub fn spec(&self, resource_type: ResourceType, name: impl Into<String>) -> ResourceSpec {
        ResourceSpec::new(resource_type, name).provider(&self.handle)
    }
}
