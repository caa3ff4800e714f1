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

use crate::domain::config::stack::ExternalDnsConfig;
use crate::domain::graph::{Input, ResourceGraph, ResourceHandle, ResourceType, Transform};
use crate::infrastructure::addons::values::chart_values;
use crate::infrastructure::constants::*;
use crate::infrastructure::gcp::iam::member_properties;
use crate::infrastructure::gcp::GcpProvider;
use crate::infrastructure::kubernetes::resources::{NamespaceBuilder, SecretBuilder};
use crate::infrastructure::kubernetes::KubernetesProvider;
use crate::shared::error::Result;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct ExternalDnsHandles {
    pub service_account: ResourceHandle,
    pub dns_admin: ResourceHandle,
    pub key: ResourceHandle,
    /// Absent when the release goes into `default`.
    pub namespace: Option<ResourceHandle>,
    pub secret: ResourceHandle,
    pub release: ResourceHandle,
    pub namespace_name: String,
}

/// DNS-sync controller: a cloud service account with DNS admin rights whose
/// key is mounted into the Helm release through a Kubernetes secret.
pub struct ExternalDnsAddon<'a> {
    config: &'a ExternalDnsConfig,
    gcp: &'a GcpProvider,
    kubernetes: &'a KubernetesProvider,
}

impl<'a> ExternalDnsAddon<'a> {
    pub fn new(
        config: &'a ExternalDnsConfig,
        gcp: &'a GcpProvider,
        kubernetes: &'a KubernetesProvider,
    ) -> Self {
        Self {
            config,
            gcp,
            kubernetes,
        }
    }

    pub fn build(
        &self,
        graph: &mut ResourceGraph,
        dns_api: Option<&ResourceHandle>,
    ) -> Result<ExternalDnsHandles> {
        let service_account = graph.add(
            self.gcp
                .spec(ResourceType::ServiceAccount, EXTERNAL_DNS_SERVICE_ACCOUNT_RESOURCE)
                .properties(Input::object([
                    ("accountId", Input::from(EXTERNAL_DNS_SERVICE_ACCOUNT_ID)),
                    ("displayName", Input::from("ExternalDNS")),
                    ("project", Input::from(self.gcp.project.as_str())),
                ]))
                .depends_on_all(dns_api),
        )?;

        let dns_admin = graph.add(
            self.gcp
                .spec(ResourceType::ProjectIamMember, EXTERNAL_DNS_IAM_RESOURCE)
                .properties(member_properties(
                    &self.gcp.project,
                    IAM_DNS_ADMIN_ROLE,
                    Input::apply(
                        Transform::Format("serviceAccount:{}".to_string()),
                        vec![service_account.output("email")],
                    ),
                ))
                .depends_on(&service_account),
        )?;

        let key = graph.add(
            self.gcp
                .spec(ResourceType::ServiceAccountKey, EXTERNAL_DNS_KEY_RESOURCE)
                .properties(Input::object([(
                    "serviceAccountId",
                    service_account.output_input("name"),
                )]))
                .depends_on(&service_account)
                .depends_on(&dns_admin),
        )?;

        let namespace_name = self.config.namespace.clone();
        let namespace = if namespace_name == DEFAULT_NAMESPACE {
            debug!("ExternalDNS installs into the default namespace; no namespace resource");
            None
        } else {
            Some(
                NamespaceBuilder::new(&namespace_name, EXTERNAL_DNS_NAME).register(
                    graph,
                    self.kubernetes,
                    EXTERNAL_DNS_NAMESPACE_RESOURCE,
                )?,
            )
        };

        let mut secret_dependencies = vec![key.clone()];
        secret_dependencies.extend(namespace.iter().cloned());
        let secret = SecretBuilder::new(EXTERNAL_DNS_SECRET_NAME, &namespace_name, EXTERNAL_DNS_NAME)
            .entry(EXTERNAL_DNS_CREDENTIALS_FILE, key.output("privateKey"))
            .register(
                graph,
                self.kubernetes,
                EXTERNAL_DNS_SECRET_NAME,
                &secret_dependencies,
            )?;

        let values = chart_values(self.config, &self.gcp.project, EXTERNAL_DNS_SECRET_NAME)?;
        let release = graph.add(
            self.kubernetes
                .spec(ResourceType::HelmRelease, EXTERNAL_DNS_NAME)
                .properties(Input::object([
                    ("name", Input::from(EXTERNAL_DNS_NAME)),
                    ("chart", Input::from(EXTERNAL_DNS_CHART)),
                    ("version", Input::from(self.config.chart_version.as_str())),
                    ("namespace", Input::from(namespace_name.as_str())),
                    ("values", Input::from_json(values)),
                ]))
                .depends_on(&secret)
                .depends_on_all(namespace.as_ref()),
        )?;

        info!(
            namespace = %namespace_name,
            chart_version = %self.config.chart_version,
            policy = self.config.policy.as_str(),
            domain_filters = self.config.domain_filters.len(),
            "ExternalDNS described"
        );

        Ok(ExternalDnsHandles {
            service_account,
            dns_admin,
            key,
            namespace,
            secret,
            release,
            namespace_name,
        })
    }
}
