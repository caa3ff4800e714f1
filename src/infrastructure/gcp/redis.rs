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

use crate::domain::config::stack::RedisConfig;
use crate::domain::graph::{Input, OutputRef, ResourceGraph, ResourceHandle, ResourceType};
use crate::infrastructure::gcp::provider::GcpProvider;
use crate::shared::error::Result;
use tracing::info;

#[derive(Debug, Clone)]
pub struct RedisHandles {
    pub instance: ResourceHandle,
    pub host: OutputRef,
    pub port: OutputRef,
    /// Secret-tagged by the resource type.
    pub auth_string: OutputRef,
}

pub fn create_redis(
    graph: &mut ResourceGraph,
    provider: &GcpProvider,
    config: &RedisConfig,
    dependencies: &[ResourceHandle],
) -> Result<RedisHandles> {
    let instance = graph.add(
        provider
            .spec(ResourceType::RedisInstance, &config.instance_name)
            .properties(Input::object([
                ("name", Input::from(config.instance_name.as_str())),
                ("region", Input::from(provider.region.as_str())),
                ("memorySizeGb", Input::from(config.memory_size_gb)),
                ("tier", Input::from(config.tier.as_str())),
                ("redisVersion", Input::from(config.redis_version.as_str())),
                ("authEnabled", Input::from(config.auth_enabled)),
            ]))
            .depends_on_all(dependencies),
    )?;

    info!(
        instance = %config.instance_name,
        tier = config.tier.as_str(),
        memory_gb = config.memory_size_gb,
        "Redis instance described"
    );

    Ok(RedisHandles {
        host: instance.output("host"),
        port: instance.output("port"),
        auth_string: instance.output("authString"),
        instance,
    })
}
