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

/// Stack defaults
pub const DEFAULT_STACK_NAME: &str = "dev";
pub const DEFAULT_NODE_POOL_NAME: &str = "primary-node-pool";
pub const DEFAULT_NAMESPACE: &str = "default";

/// Provider handles
pub const GCP_PROVIDER_NAME: &str = "gcp";
pub const KUBERNETES_PROVIDER_NAME: &str = "gke-k8s";

/// Service APIs
pub const COMPUTE_API: (&str, &str) = ("enable-compute", "compute.googleapis.com");
pub const CONTAINER_API: (&str, &str) = ("enable-container", "container.googleapis.com");
pub const REDIS_API: (&str, &str) = ("enable-redis", "redis.googleapis.com");
pub const SQL_ADMIN_API: (&str, &str) = ("enable-sqladmin", "sqladmin.googleapis.com");
pub const DNS_API: (&str, &str) = ("enable-dns", "dns.googleapis.com");

/// Cluster networking (fixed secondary ranges)
pub const CLUSTER_NETWORK: &str = "default";
pub const CLUSTER_NETWORKING_MODE: &str = "VPC_NATIVE";
pub const CLUSTER_POD_CIDR: &str = "/16";
pub const CLUSTER_SERVICES_CIDR: &str = "/22";
pub const CLUSTER_MIN_MASTER_VERSION: &str = "latest";

/// Node pool OAuth scopes
pub const NODE_OAUTH_SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/compute",
    "https://www.googleapis.com/auth/devstorage.read_only",
    "https://www.googleapis.com/auth/logging.write",
    "https://www.googleapis.com/auth/monitoring",
];

/// Cloud SQL
pub const DEFAULT_BACKUP_START_TIME: &str = "02:00";
pub const SQL_SSL_MODE: &str = "ENCRYPTED_ONLY";
pub const SQL_DATABASE_RESOURCE: &str = "postgres-db";
pub const SQL_USER_RESOURCE: &str = "postgres-user";
pub const SQL_USER_TYPE: &str = "BUILT_IN";
pub const SQL_CHARSET: &str = "UTF8";
pub const SQL_COLLATION: &str = "en_US.UTF8";
pub const SQL_PASSWORD_SECRET: (&str, &str) = ("postgres", "userPassword");

/// IAM roles
pub const IAM_CLUSTER_VIEWER_ROLE: &str = "roles/container.viewer";
pub const IAM_DNS_ADMIN_ROLE: &str = "roles/dns.admin";

/// In-cluster RBAC
pub const RBAC_API_GROUP: &str = "rbac.authorization.k8s.io";
pub const ADMIN_ROLE_NAME: &str = "admin-role";
pub const DEVELOPER_ROLE_NAME: &str = "developer-role";
pub const VIEWER_ROLE_NAME: &str = "viewer-role";

/// Kubeconfig credential helper
pub const KUBECONFIG_EXEC_API_VERSION: &str = "client.authentication.k8s.io/v1beta1";
pub const KUBECONFIG_EXEC_COMMAND: &str = "gke-gcloud-auth-plugin";
pub const KUBECONFIG_INSTALL_HINT: &str = "Install gke-gcloud-auth-plugin for use with kubectl by following https://cloud.google.com/blog/products/containers-kubernetes/kubectl-auth-changes-in-gke";

/// ExternalDNS add-on
pub const EXTERNAL_DNS_NAME: &str = "external-dns";
pub const EXTERNAL_DNS_CHART: &str = "oci://registry-1.docker.io/bitnamicharts/external-dns";
pub const EXTERNAL_DNS_CHART_VERSION: &str = "8.7.1";
pub const EXTERNAL_DNS_SERVICE_ACCOUNT_ID: &str = "external-dns";
pub const EXTERNAL_DNS_SERVICE_ACCOUNT_RESOURCE: &str = "external-dns-sa";
pub const EXTERNAL_DNS_IAM_RESOURCE: &str = "external-dns-dns-admin";
pub const EXTERNAL_DNS_KEY_RESOURCE: &str = "external-dns-key";
pub const EXTERNAL_DNS_NAMESPACE_RESOURCE: &str = "external-dns-namespace";
pub const EXTERNAL_DNS_SECRET_NAME: &str = "external-dns-gcp-credentials";
pub const EXTERNAL_DNS_CREDENTIALS_VOLUME: &str = "google-credentials";
pub const EXTERNAL_DNS_CREDENTIALS_MOUNT: &str = "/credentials";
pub const EXTERNAL_DNS_CREDENTIALS_FILE: &str = "credentials.json";
pub const EXTERNAL_DNS_TXT_OWNER_ID: &str = "amiara-k8s";
pub const EXTERNAL_DNS_TXT_PREFIX: &str = "externaldns-";
pub const EXTERNAL_DNS_SYNC_INTERVAL: &str = "1m";
pub const EXTERNAL_DNS_LOG_LEVEL: &str = "info";
pub const EXTERNAL_DNS_DEFAULT_SOURCES: &[&str] = &["ingress"];
pub const EXTERNAL_DNS_CPU_LIMIT: &str = "100m";
pub const EXTERNAL_DNS_MEMORY_LIMIT: &str = "300Mi";
pub const EXTERNAL_DNS_CPU_REQUEST: &str = "50m";
pub const EXTERNAL_DNS_MEMORY_REQUEST: &str = "100Mi";

/// Upper bound of a Kubernetes object name (DNS-1123 subdomain)
pub const K8S_MAX_NAME_LEN: usize = 253;

/// Logical names the stack assigns itself; user-chosen names must avoid them
pub const RESERVED_RESOURCE_NAMES: &[&str] = &[
    GCP_PROVIDER_NAME,
    KUBERNETES_PROVIDER_NAME,
    COMPUTE_API.0,
    CONTAINER_API.0,
    REDIS_API.0,
    SQL_ADMIN_API.0,
    DNS_API.0,
    SQL_DATABASE_RESOURCE,
    SQL_USER_RESOURCE,
    ADMIN_ROLE_NAME,
    DEVELOPER_ROLE_NAME,
    VIEWER_ROLE_NAME,
    EXTERNAL_DNS_NAME,
    EXTERNAL_DNS_SERVICE_ACCOUNT_RESOURCE,
    EXTERNAL_DNS_IAM_RESOURCE,
    EXTERNAL_DNS_KEY_RESOURCE,
    EXTERNAL_DNS_NAMESPACE_RESOURCE,
    EXTERNAL_DNS_SECRET_NAME,
];

/// Resource labels
pub const LABEL_MANAGED_BY: &str = "app.kubernetes.io/managed-by";
pub const LABEL_MANAGED_BY_VALUE: &str = "gke-stack";
pub const LABEL_COMPONENT: &str = "app.kubernetes.io/component";

/// Stack output names
pub const OUTPUT_CLUSTER_NAME: &str = "clusterName";
pub const OUTPUT_KUBECONFIG: &str = "kubeconfig";
pub const OUTPUT_REDIS_HOST: &str = "redisHost";
pub const OUTPUT_REDIS_PORT: &str = "redisPort";
pub const OUTPUT_REDIS_AUTH: &str = "redisAuth";
pub const OUTPUT_POSTGRES_HOST: &str = "postgresHost";
pub const OUTPUT_POSTGRES_CONNECTION: &str = "postgresConnectionName";
pub const OUTPUT_EXTERNAL_DNS_NAMESPACE: &str = "externalDnsNamespace";
