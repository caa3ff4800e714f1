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

//! Kubeconfig synthesis for the GKE cluster
//!
//! The document has one cluster, one context and one user, all named after
//! the cluster. Credentials come from the `gke-gcloud-auth-plugin` exec helper,
//! so no token or client key is embedded.

use crate::infrastructure::constants::*;
use crate::shared::error::Result;
use kube::config::Kubeconfig;
use serde::Serialize;

#[derive(Serialize)]
struct KubeconfigDocument<'a> {
    #[serde(rename = "apiVersion")]
    api_version: &'static str,
    clusters: Vec<NamedEntry<'a, ClusterEntry<'a>>>,
    contexts: Vec<NamedEntry<'a, ContextEntry<'a>>>,
    #[serde(rename = "current-context")]
    current_context: &'a str,
    kind: &'static str,
    users: Vec<NamedEntry<'a, UserEntry>>,
}

#[derive(Serialize)]
struct NamedEntry<'a, T> {
    #[serde(flatten)]
    body: T,
    name: &'a str,
}

#[derive(Serialize)]
struct ClusterEntry<'a> {
    cluster: ClusterBody<'a>,
}

#[derive(Serialize)]
struct ClusterBody<'a> {
    #[serde(rename = "certificate-authority-data")]
    certificate_authority_data: &'a str,
    server: String,
}

#[derive(Serialize)]
struct ContextEntry<'a> {
    context: ContextBody<'a>,
}

#[derive(Serialize)]
struct ContextBody<'a> {
    cluster: &'a str,
    user: &'a str,
}

#[derive(Serialize)]
struct UserEntry {
    user: UserBody,
}

#[derive(Serialize)]
struct UserBody {
    exec: ExecBody,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExecBody {
    api_version: &'static str,
    command: &'static str,
    install_hint: &'static str,
    provide_cluster_info: bool,
}

/// Renders the kubeconfig YAML for a cluster.
pub fn render(cluster_name: &str, endpoint: &str, ca_certificate: &str) -> Result<String> {
    let document = KubeconfigDocument {
        api_version: "v1",
        clusters: vec![NamedEntry {
            body: ClusterEntry {
                cluster: ClusterBody {
                    certificate_authority_data: ca_certificate,
                    server: server_url(endpoint),
                },
            },
            name: cluster_name,
        }],
        contexts: vec![NamedEntry {
            body: ContextEntry {
                context: ContextBody {
                    cluster: cluster_name,
                    user: cluster_name,
                },
            },
            name: cluster_name,
        }],
        current_context: cluster_name,
        kind: "Config",
        users: vec![NamedEntry {
            body: UserEntry {
                user: UserBody {
                    exec: ExecBody {
                        api_version: KUBECONFIG_EXEC_API_VERSION,
                        command: KUBECONFIG_EXEC_COMMAND,
                        install_hint: KUBECONFIG_INSTALL_HINT,
                        provide_cluster_info: true,
                    },
                },
            },
            name: cluster_name,
        }],
    };

    Ok(serde_yaml::to_string(&document)?)
}

/// Parses a rendered document with kube's own loader.
pub fn load(text: &str) -> Result<Kubeconfig> {
    Ok(Kubeconfig::from_yaml(text)?)
}

fn server_url(endpoint: &str) -> String {
    if endpoint.starts_with("https://") {
        endpoint.to_string()
    } else {
        format!("https://{}", endpoint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CA: &str = "LS0tLS1CRUdJTiBDRVJUSUZJQ0FURS0tLS0tCg==";

    #[test]
    fn test_render_is_loadable_by_kube() {
        let text = render("amiara-dev-cluster", "34.118.10.1", CA).unwrap();
        let config = load(&text).unwrap();

        assert_eq!(config.current_context.as_deref(), Some("amiara-dev-cluster"));
        assert_eq!(config.clusters.len(), 1);
        assert_eq!(config.clusters[0].name, "amiara-dev-cluster");
        let cluster = config.clusters[0].cluster.as_ref().unwrap();
        assert_eq!(cluster.server.as_deref(), Some("https://34.118.10.1"));
        assert_eq!(cluster.certificate_authority_data.as_deref(), Some(CA));
        assert_eq!(config.auth_infos[0].name, "amiara-dev-cluster");
        assert_eq!(config.contexts[0].name, "amiara-dev-cluster");
    }

    #[test]
    fn test_render_uses_exec_plugin() {
        let text = render("c", "10.0.0.1", CA).unwrap();
        assert!(text.contains("command: gke-gcloud-auth-plugin"));
        assert!(text.contains("provideClusterInfo: true"));
        assert!(text.contains("apiVersion: client.authentication.k8s.io/v1beta1"));
        assert!(text.contains("kind: Config"));
    }

    #[test]
    fn test_server_url_is_not_double_prefixed() {
        assert_eq!(server_url("https://1.2.3.4"), "https://1.2.3.4");
        assert_eq!(server_url("1.2.3.4"), "https://1.2.3.4");
    }
}
