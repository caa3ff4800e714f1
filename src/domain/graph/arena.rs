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

use crate::domain::graph::resource::{
    Resource, ResourceHandle, ResourceId, ResourceSpec, ResourceType,
};
use crate::shared::error::{Result, StackError};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

/// Append-only arena of resources.
///
/// A resource can only depend on resources registered before it, so the
/// registration order is always a valid creation order and the graph cannot
/// contain cycles.
///
/// Handles are stamped with the graph's generation and rejected by any other
/// graph. A clone keeps the generation, so handles minted before the clone
/// stay valid in both copies.
#[derive(Debug, Clone)]
pub struct ResourceGraph {
    generation: u64,
    resources: Vec<Resource>,
    by_name: HashMap<(ResourceType, String), ResourceId>,
    object_names: HashSet<(ResourceType, String, String)>,
}

impl Default for ResourceGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceGraph {
    pub fn new() -> Self {
        Self {
            generation: NEXT_GENERATION.fetch_add(1, Ordering::Relaxed),
            resources: Vec::new(),
            by_name: HashMap::new(),
            object_names: HashSet::new(),
        }
    }

    pub fn add(&mut self, spec: ResourceSpec) -> Result<ResourceHandle> {
        let key = (spec.resource_type, spec.name.clone());
        if self.by_name.contains_key(&key) {
            return Err(StackError::duplicate(spec.resource_type.as_str(), &spec.name));
        }

        for handle in &spec.handles {
            let known = handle.graph == self.generation
                && self.resources.get(handle.id.0).is_some_and(|r| {
                    r.name == handle.name && r.resource_type == handle.resource_type
                });
            if !known {
                return Err(StackError::UnknownDependency {
                    name: spec.name.clone(),
                    id: handle.id.0,
                });
            }
        }

        if let Some(provider) = spec.options.provider {
            if !self.resources[provider.0].resource_type.is_provider() {
                return Err(StackError::validation_error(format!(
                    "resource '{}' uses '{}' as provider, which is not a provider",
                    spec.name, self.resources[provider.0].name
                )));
            }
        }

        let object_key = if spec.resource_type.is_kubernetes_object() {
            let object_name = spec
                .properties
                .at("metadata.name")
                .and_then(|i| i.as_str())
                .ok_or_else(|| {
                    StackError::validation_error(format!(
                        "kubernetes object '{}' has no metadata.name",
                        spec.name
                    ))
                })?
                .to_string();
            let namespace = spec
                .properties
                .at("metadata.namespace")
                .and_then(|i| i.as_str())
                .unwrap_or("")
                .to_string();
            let object_key = (spec.resource_type, namespace, object_name);
            if self.object_names.contains(&object_key) {
                return Err(StackError::duplicate(
                    spec.resource_type.as_str(),
                    format!("{}/{}", object_key.1, object_key.2),
                ));
            }
            Some(object_key)
        } else {
            None
        };

        let id = ResourceId(self.resources.len());
        debug!(
            resource_type = spec.resource_type.as_str(),
            name = %spec.name,
            depends_on = spec.options.depends_on.len(),
            "Registered resource"
        );

        self.by_name.insert(key, id);
        if let Some(object_key) = object_key {
            self.object_names.insert(object_key);
        }

        let handle = ResourceHandle {
            id,
            name: spec.name.clone(),
            resource_type: spec.resource_type,
            graph: self.generation,
        };
        self.resources.push(Resource {
            id,
            name: spec.name,
            resource_type: spec.resource_type,
            properties: spec.properties,
            options: spec.options,
        });
        Ok(handle)
    }

    pub fn get(&self, id: ResourceId) -> Option<&Resource> {
        self.resources.get(id.0)
    }

    pub fn find(&self, resource_type: ResourceType, name: &str) -> Option<&Resource> {
        self.by_name
            .get(&(resource_type, name.to_string()))
            .and_then(|id| self.get(*id))
    }

    pub fn of_type(&self, resource_type: ResourceType) -> impl Iterator<Item = &Resource> {
        self.resources
            .iter()
            .filter(move |r| r.resource_type == resource_type)
    }

    /// Resources in registration (creation) order.
    pub fn iter(&self) -> impl Iterator<Item = &Resource> {
        self.resources.iter()
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    pub fn name_of(&self, id: ResourceId) -> &str {
        self.resources
            .get(id.0)
            .map(|r| r.name.as_str())
            .unwrap_or("<unknown>")
    }

    /// Every resource `id` transitively depends on, provider edges included.
    pub fn ancestors(&self, id: ResourceId) -> BTreeSet<ResourceId> {
        let mut seen = BTreeSet::new();
        let mut stack: Vec<ResourceId> = match self.get(id) {
            Some(r) => r.parents().collect(),
            None => return seen,
        };
        while let Some(next) = stack.pop() {
            if seen.insert(next) {
                if let Some(r) = self.get(next) {
                    stack.extend(r.parents());
                }
            }
        }
        seen
    }

    pub fn transitively_depends_on(&self, child: ResourceId, parent: ResourceId) -> bool {
        self.ancestors(child).contains(&parent)
    }

    /// Checks that every output a resource reads is covered by a dependency edge.
    pub fn validate(&self) -> Result<()> {
        for resource in &self.resources {
            let refs = resource.properties.refs();
            if refs.is_empty() {
                continue;
            }
            let ancestors = self.ancestors(resource.id);
            for r in refs {
                if !ancestors.contains(&r.resource) {
                    return Err(StackError::MissingDependency {
                        resource: resource.name.clone(),
                        referenced: r.name.clone(),
                        attribute: r.attribute.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Groups resources into levels: every resource in wave `n` only depends on
    /// resources in earlier waves.
    pub fn creation_waves(&self) -> Vec<Vec<ResourceId>> {
        let mut levels: Vec<usize> = Vec::with_capacity(self.resources.len());
        for resource in &self.resources {
            let level = resource
                .parents()
                .map(|p| levels[p.0] + 1)
                .max()
                .unwrap_or(0);
            levels.push(level);
        }

        let depth = levels.iter().copied().max().map_or(0, |m| m + 1);
        let mut waves = vec![Vec::new(); depth];
        for (index, level) in levels.into_iter().enumerate() {
            waves[level].push(ResourceId(index));
        }
        waves
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::graph::input::Input;

    fn provider(graph: &mut ResourceGraph) -> ResourceHandle {
        graph
            .add(ResourceSpec::new(ResourceType::GcpProvider, "gcp"))
            .unwrap()
    }

    #[test]
    fn test_duplicate_names_are_rejected() {
        let mut graph = ResourceGraph::new();
        let gcp = provider(&mut graph);
        graph
            .add(ResourceSpec::new(ResourceType::ProjectService, "enable-dns").provider(&gcp))
            .unwrap();
        let err = graph
            .add(ResourceSpec::new(ResourceType::ProjectService, "enable-dns").provider(&gcp))
            .unwrap_err();
        assert!(matches!(err, StackError::DuplicateResource { .. }));
    }

    #[test]
    fn test_same_name_different_type_is_allowed() {
        let mut graph = ResourceGraph::new();
        let gcp = provider(&mut graph);
        graph
            .add(ResourceSpec::new(ResourceType::ContainerCluster, "primary").provider(&gcp))
            .unwrap();
        assert!(graph
            .add(ResourceSpec::new(ResourceType::NodePool, "primary").provider(&gcp))
            .is_ok());
    }

    #[test]
    fn test_handle_from_other_graph_is_unknown() {
        let mut other = ResourceGraph::new();
        let _ = provider(&mut other);
        let foreign = other
            .add(ResourceSpec::new(ResourceType::ProjectService, "svc"))
            .unwrap();

        let mut graph = ResourceGraph::new();
        let err = graph
            .add(ResourceSpec::new(ResourceType::ContainerCluster, "c").depends_on(&foreign))
            .unwrap_err();
        assert!(matches!(err, StackError::UnknownDependency { .. }));
    }

    #[test]
    fn test_lookalike_handle_from_other_graph_is_unknown() {
        let mut other = ResourceGraph::new();
        let foreign = provider(&mut other);

        let mut graph = ResourceGraph::new();
        let local = provider(&mut graph);
        assert_eq!(local.id, foreign.id);
        assert_eq!(local.name, foreign.name);

        let err = graph
            .add(ResourceSpec::new(ResourceType::ProjectService, "svc").provider(&foreign))
            .unwrap_err();
        assert!(matches!(err, StackError::UnknownDependency { .. }));

        let mut copy = graph.clone();
        assert!(copy
            .add(ResourceSpec::new(ResourceType::ProjectService, "svc").provider(&local))
            .is_ok());
    }

    #[test]
    fn test_non_provider_cannot_be_provider() {
        let mut graph = ResourceGraph::new();
        let svc = graph
            .add(ResourceSpec::new(ResourceType::ProjectService, "svc"))
            .unwrap();
        assert!(graph
            .add(ResourceSpec::new(ResourceType::ContainerCluster, "c").provider(&svc))
            .is_err());
    }

    #[test]
    fn test_kubernetes_object_names_are_unique() {
        let mut graph = ResourceGraph::new();
        let role = |logical: &str| {
            ResourceSpec::new(ResourceType::ClusterRole, logical).properties(Input::from_json(
                serde_json::json!({ "metadata": { "name": "viewer-role" } }),
            ))
        };
        graph.add(role("a")).unwrap();
        assert!(matches!(
            graph.add(role("b")).unwrap_err(),
            StackError::DuplicateResource { .. }
        ));
    }

    #[test]
    fn test_validate_requires_dependency_for_refs() {
        let mut graph = ResourceGraph::new();
        let gcp = provider(&mut graph);
        let cluster = graph
            .add(ResourceSpec::new(ResourceType::ContainerCluster, "c").provider(&gcp))
            .unwrap();
        graph
            .add(
                ResourceSpec::new(ResourceType::NodePool, "pool")
                    .provider(&gcp)
                    .properties(Input::object([("cluster", cluster.output_input("name"))])),
            )
            .unwrap();

        let err = graph.validate().unwrap_err();
        assert!(matches!(err, StackError::MissingDependency { .. }));
    }

    #[test]
    fn test_transitive_dependency_satisfies_refs() {
        let mut graph = ResourceGraph::new();
        let gcp = provider(&mut graph);
        let instance = graph
            .add(ResourceSpec::new(ResourceType::SqlDatabaseInstance, "db").provider(&gcp))
            .unwrap();
        let database = graph
            .add(
                ResourceSpec::new(ResourceType::SqlDatabase, "postgres-db")
                    .provider(&gcp)
                    .depends_on(&instance),
            )
            .unwrap();
        graph
            .add(
                ResourceSpec::new(ResourceType::SqlUser, "postgres-user")
                    .provider(&gcp)
                    .depends_on(&database)
                    .properties(Input::object([("instance", instance.output_input("name"))])),
            )
            .unwrap();

        assert!(graph.validate().is_ok());
        assert!(graph.transitively_depends_on(ResourceId(3), instance.id));
    }

    #[test]
    fn test_creation_waves() {
        let mut graph = ResourceGraph::new();
        let gcp = provider(&mut graph);
        let api = graph
            .add(ResourceSpec::new(ResourceType::ProjectService, "enable-container").provider(&gcp))
            .unwrap();
        let cluster = graph
            .add(
                ResourceSpec::new(ResourceType::ContainerCluster, "c")
                    .provider(&gcp)
                    .depends_on(&api),
            )
            .unwrap();
        let redis = graph
            .add(ResourceSpec::new(ResourceType::RedisInstance, "r").provider(&gcp))
            .unwrap();

        let waves = graph.creation_waves();
        assert_eq!(waves.len(), 3);
        assert_eq!(waves[0], vec![gcp.id]);
        assert_eq!(waves[1], vec![api.id, redis.id]);
        assert_eq!(waves[2], vec![cluster.id]);
    }
}
