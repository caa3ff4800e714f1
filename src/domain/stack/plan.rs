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

use crate::domain::graph::ResourceType;
use crate::domain::stack::descriptor::Stack;

/// One row of the creation plan.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanStep {
    /// Resources in the same wave have no dependency between them.
    pub wave: usize,
    pub name: String,
    pub resource_type: ResourceType,
    pub provider: Option<String>,
    pub depends_on: Vec<String>,
    pub protected: bool,
    pub secret: bool,
}

impl Stack {
    /// Resources grouped by creation wave, in registration order within a wave.
    pub fn plan(&self) -> Vec<PlanStep> {
        let mut steps = Vec::with_capacity(self.graph.len());
        for (wave, ids) in self.graph.creation_waves().into_iter().enumerate() {
            for id in ids {
                let Some(resource) = self.graph.get(id) else {
                    continue;
                };
                steps.push(PlanStep {
                    wave,
                    name: resource.name.clone(),
                    resource_type: resource.resource_type,
                    provider: resource
                        .options
                        .provider
                        .map(|p| self.graph.name_of(p).to_string()),
                    depends_on: resource
                        .options
                        .depends_on
                        .iter()
                        .map(|d| self.graph.name_of(*d).to_string())
                        .collect(),
                    protected: resource.options.protect,
                    secret: resource.properties.is_secret(),
                });
            }
        }
        steps
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::config::stack::StackConfig;
    use crate::domain::graph::ResourceType;
    use crate::domain::stack::StackDescriptor;

    #[test]
    fn test_plan_orders_dependencies_before_dependents() {
        let config =
            StackConfig::from_yaml(include_str!("../../../demos/stack.yaml")).unwrap();
        let stack = StackDescriptor::new().unwrap().compose(&config).unwrap();
        let plan = stack.plan();

        assert_eq!(plan.len(), stack.graph.len());
        let wave_of = |name: &str| plan.iter().find(|s| s.name == name).unwrap().wave;

        assert_eq!(wave_of("gcp"), 0);
        assert!(wave_of("amiara-dev-cluster") < wave_of("primary-node-pool"));
        assert!(wave_of("primary-node-pool") < wave_of("gke-k8s"));
        assert!(wave_of("external-dns-gcp-credentials") < wave_of("external-dns"));

        for step in &plan {
            for parent in &step.depends_on {
                assert!(wave_of(parent) < step.wave, "{} before {}", parent, step.name);
            }
        }

        let user = plan
            .iter()
            .find(|s| s.resource_type == ResourceType::SqlUser)
            .unwrap();
        assert!(user.secret);
    }
}
