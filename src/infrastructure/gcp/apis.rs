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

use crate::domain::config::stack::ApiToggles;
use crate::domain::graph::{Input, ResourceGraph, ResourceHandle, ResourceType};
use crate::infrastructure::constants::*;
use crate::infrastructure::gcp::provider::GcpProvider;
use crate::shared::error::Result;
use tracing::{debug, info};

/// Project service activations. A `None` entry means the API is managed
/// outside this stack and dependents carry no edge for it.
#[derive(Debug, Clone, Default)]
pub struct ApiHandles {
    pub compute: Option<ResourceHandle>,
    pub container: Option<ResourceHandle>,
    pub redis: Option<ResourceHandle>,
    pub sql_admin: Option<ResourceHandle>,
    pub dns: Option<ResourceHandle>,
}

impl ApiHandles {
    pub fn create(
        graph: &mut ResourceGraph,
        provider: &GcpProvider,
        toggles: &ApiToggles,
    ) -> Result<Self> {
        let mut enable = |enabled: bool,
                          (name, service): (&str, &str)|
         -> Result<Option<ResourceHandle>> {
            if !enabled {
                debug!(service, "API enablement skipped");
                return Ok(None);
            }
            // Destroying the stack leaves the API enabled on the project.
            let spec = provider
                .spec(ResourceType::ProjectService, name)
                .properties(Input::object([
                    ("project", Input::from(provider.project.as_str())),
                    ("service", Input::from(service)),
                    ("disableOnDestroy", Input::from(false)),
                    ("disableDependentServices", Input::from(false)),
                ]))
                .retain_on_delete(true);
            graph.add(spec).map(Some)
        };

        let handles = Self {
            compute: enable(toggles.compute, COMPUTE_API)?,
            container: enable(toggles.container, CONTAINER_API)?,
            redis: enable(toggles.redis, REDIS_API)?,
            sql_admin: enable(toggles.sql_admin, SQL_ADMIN_API)?,
            dns: enable(toggles.dns, DNS_API)?,
        };

        info!(enabled = handles.iter().count(), "Service APIs described");
        Ok(handles)
    }

    /// Dependencies of the cluster unit.
    pub fn cluster_dependencies(&self) -> Vec<ResourceHandle> {
        self.compute
            .iter()
            .chain(self.container.iter())
            .cloned()
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResourceHandle> {
        self.compute
            .iter()
            .chain(self.container.iter())
            .chain(self.redis.iter())
            .chain(self.sql_admin.iter())
            .chain(self.dns.iter())
    }
}
