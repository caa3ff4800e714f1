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

//! Stack configuration schema
//!
//! Every recognized key is listed here. Unknown keys are rejected and missing
//! required keys fail while loading, before any resource is described.

use crate::infrastructure::constants::*;
use crate::shared::error::{Result, StackError};
use k8s_openapi::api::core::v1::ResourceRequirements;
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::read_to_string;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct StackConfig {
    #[serde(default = "default_stack_name")]
    pub name: String,
    pub gcp: GcpConfig,
    #[serde(default)]
    pub apis: ApiToggles,
    pub cluster: ClusterConfig,
    pub redis: RedisConfig,
    pub postgres: PostgresConfig,
    pub rbac: RbacConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_dns: Option<ExternalDnsConfig>,
}

impl StackConfig {
    /// Load a stack file; the format follows the extension (yaml, yml, toml, json).
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = read_to_string(path).map_err(|e| {
            StackError::config_error(format!(
                "Failed to read stack file {}: {}",
                path.display(),
                e
            ))
        })?;

        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml(&content),
            Some("toml") => Self::from_toml(&content),
            Some("json") => Ok(serde_json::from_str(&content)?),
            other => Err(StackError::config_error(format!(
                "Unsupported stack file extension {:?} for {} (expected yaml, yml, toml or json)",
                other.unwrap_or(""),
                path.display()
            ))),
        }
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// The DNS add-on is described only when present and explicitly enabled.
    pub fn external_dns_enabled(&self) -> Option<&ExternalDnsConfig> {
        self.external_dns.as_ref().filter(|c| c.enabled)
    }
}

fn default_stack_name() -> String {
    DEFAULT_STACK_NAME.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct GcpConfig {
    pub project: String,
    pub region: String,
    pub zone: String,
}

/// Each service API can be switched off individually, e.g. when it is managed
/// outside this stack.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct ApiToggles {
    pub compute: bool,
    pub container: bool,
    pub redis: bool,
    pub sql_admin: bool,
    pub dns: bool,
}

impl Default for ApiToggles {
    fn default() -> Self {
        Self {
            compute: true,
            container: true,
            redis: true,
            sql_admin: true,
            dns: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ClusterConfig {
    pub cluster_name: String,
    #[serde(default = "default_node_pool_name")]
    pub node_pool_name: String,
    pub machine_type: String,
    pub min_nodes: u32,
    pub max_nodes: u32,
}

fn default_node_pool_name() -> String {
    DEFAULT_NODE_POOL_NAME.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RedisConfig {
    pub instance_name: String,
    pub memory_size_gb: u32,
    pub tier: RedisTier,
    pub redis_version: String,
    #[serde(default = "default_true")]
    pub auth_enabled: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RedisTier {
    #[serde(rename = "BASIC")]
    Basic,
    #[serde(rename = "STANDARD_HA")]
    StandardHa,
}

impl RedisTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            RedisTier::Basic => "BASIC",
            RedisTier::StandardHa => "STANDARD_HA",
        }
    }
}

impl std::str::FromStr for RedisTier {
    type Err = StackError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "BASIC" => Ok(RedisTier::Basic),
            "STANDARD_HA" => Ok(RedisTier::StandardHa),
            _ => Err(StackError::config_error(format!("Invalid redis tier: {}", s))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PostgresConfig {
    pub instance_name: String,
    pub database_version: String,
    pub tier: String,
    pub availability_type: AvailabilityType,
    pub disk_size: u32,
    pub disk_type: DiskType,
    pub db_name: String,
    pub user_name: String,
    /// Must be switched on for any durable environment.
    #[serde(default)]
    pub deletion_protection: bool,
    #[serde(default = "default_backup_start_time")]
    pub backup_start_time: String,
}

fn default_backup_start_time() -> String {
    DEFAULT_BACKUP_START_TIME.to_string()
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AvailabilityType {
    Zonal,
    Regional,
}

impl AvailabilityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AvailabilityType::Zonal => "ZONAL",
            AvailabilityType::Regional => "REGIONAL",
        }
    }
}

impl std::str::FromStr for AvailabilityType {
    type Err = StackError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "ZONAL" => Ok(AvailabilityType::Zonal),
            "REGIONAL" => Ok(AvailabilityType::Regional),
            _ => Err(StackError::config_error(format!(
                "Invalid availability type: {}",
                s
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiskType {
    PdSsd,
    PdHdd,
}

impl DiskType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiskType::PdSsd => "PD_SSD",
            DiskType::PdHdd => "PD_HDD",
        }
    }
}

impl std::str::FromStr for DiskType {
    type Err = StackError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "PD_SSD" => Ok(DiskType::PdSsd),
            "PD_HDD" => Ok(DiskType::PdHdd),
            _ => Err(StackError::config_error(format!("Invalid disk type: {}", s))),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RbacConfig {
    #[serde(default)]
    pub users: Vec<UserConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UserConfig {
    pub email: String,
    pub role: Role,
}

/// In-cluster privilege level. There is no fallback variant: a role outside
/// this set is rejected while parsing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Developer,
    Viewer,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::Developer, Role::Viewer];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Developer => "developer",
            Role::Viewer => "viewer",
        }
    }

    pub fn cluster_role_name(&self) -> &'static str {
        match self {
            Role::Admin => ADMIN_ROLE_NAME,
            Role::Developer => DEVELOPER_ROLE_NAME,
            Role::Viewer => VIEWER_ROLE_NAME,
        }
    }
}

impl std::str::FromStr for Role {
    type Err = StackError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "admin" => Ok(Role::Admin),
            "developer" => Ok(Role::Developer),
            "viewer" => Ok(Role::Viewer),
            _ => Err(StackError::config_error(format!(
                "Invalid role '{}' (expected admin, developer or viewer)",
                s
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ExternalDnsConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_namespace")]
    pub namespace: String,
    #[serde(default = "default_chart_version")]
    pub chart_version: String,
    #[serde(default)]
    pub policy: SyncPolicy,
    #[serde(default)]
    pub domain_filters: Vec<String>,
    #[serde(default = "default_txt_owner_id")]
    pub txt_owner_id: String,
    #[serde(default = "default_txt_prefix")]
    pub txt_prefix: String,
    #[serde(default = "default_sync_interval")]
    pub sync_interval: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_external_dns_resources")]
    pub resources: ResourceRequirements,
    /// Chart values merged last; any key here replaces the computed value.
    #[serde(default)]
    pub additional_values: BTreeMap<String, serde_json::Value>,
}

impl Default for ExternalDnsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            namespace: default_namespace(),
            chart_version: default_chart_version(),
            policy: SyncPolicy::default(),
            domain_filters: Vec::new(),
            txt_owner_id: default_txt_owner_id(),
            txt_prefix: default_txt_prefix(),
            sync_interval: default_sync_interval(),
            log_level: default_log_level(),
            resources: default_external_dns_resources(),
            additional_values: BTreeMap::new(),
        }
    }
}

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}

fn default_chart_version() -> String {
    EXTERNAL_DNS_CHART_VERSION.to_string()
}

fn default_txt_owner_id() -> String {
    EXTERNAL_DNS_TXT_OWNER_ID.to_string()
}

fn default_txt_prefix() -> String {
    EXTERNAL_DNS_TXT_PREFIX.to_string()
}

fn default_sync_interval() -> String {
    EXTERNAL_DNS_SYNC_INTERVAL.to_string()
}

fn default_log_level() -> String {
    EXTERNAL_DNS_LOG_LEVEL.to_string()
}

fn default_external_dns_resources() -> ResourceRequirements {
    let quantities = |cpu: &str, memory: &str| {
        let mut map = BTreeMap::new();
        map.insert("cpu".to_string(), Quantity(cpu.to_string()));
        map.insert("memory".to_string(), Quantity(memory.to_string()));
        map
    };

    ResourceRequirements {
        limits: Some(quantities(
            EXTERNAL_DNS_CPU_LIMIT,
            EXTERNAL_DNS_MEMORY_LIMIT,
        )),
        requests: Some(quantities(
            EXTERNAL_DNS_CPU_REQUEST,
            EXTERNAL_DNS_MEMORY_REQUEST,
        )),
        ..Default::default()
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum SyncPolicy {
    #[default]
    Sync,
    UpsertOnly,
    CreateOnly,
}

impl SyncPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncPolicy::Sync => "sync",
            SyncPolicy::UpsertOnly => "upsert-only",
            SyncPolicy::CreateOnly => "create-only",
        }
    }
}

impl std::str::FromStr for SyncPolicy {
    type Err = StackError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "sync" => Ok(SyncPolicy::Sync),
            "upsert-only" => Ok(SyncPolicy::UpsertOnly),
            "create-only" => Ok(SyncPolicy::CreateOnly),
            _ => Err(StackError::config_error(format!("Invalid sync policy: {}", s))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
gcp:
  project: amiara-dev-be
  region: us-central1
  zone: us-central1-a
cluster:
  clusterName: amiara-dev-cluster
  machineType: e2-standard-2
  minNodes: 1
  maxNodes: 3
redis:
  instanceName: amiara-dev-redis
  memorySizeGb: 1
  tier: BASIC
  redisVersion: REDIS_6_X
postgres:
  instanceName: amiara-dev-postgres
  databaseVersion: POSTGRES_15
  tier: db-f1-micro
  availabilityType: ZONAL
  diskSize: 10
  diskType: PD_SSD
  dbName: amiara
  userName: amiara
rbac:
  users:
    - email: dev@example.com
      role: developer
"#;

    #[test]
    fn test_minimal_yaml_applies_defaults() {
        let config = StackConfig::from_yaml(MINIMAL).unwrap();
        assert_eq!(config.name, DEFAULT_STACK_NAME);
        assert_eq!(config.cluster.node_pool_name, DEFAULT_NODE_POOL_NAME);
        assert!(config.redis.auth_enabled);
        assert!(!config.postgres.deletion_protection);
        assert_eq!(config.postgres.backup_start_time, "02:00");
        assert_eq!(config.apis, ApiToggles::default());
        assert!(config.external_dns.is_none());
        assert_eq!(config.rbac.users[0].role, Role::Developer);
    }

    #[test]
    fn test_unknown_role_is_rejected() {
        let yaml = MINIMAL.replace("role: developer", "role: superuser");
        let err = StackConfig::from_yaml(&yaml).unwrap_err();
        assert!(err.to_string().contains("superuser"));
    }

    #[test]
    fn test_missing_role_is_rejected() {
        let yaml = MINIMAL.replace("      role: developer\n", "");
        assert!(StackConfig::from_yaml(&yaml).is_err());
    }

    #[test]
    fn test_missing_required_section_fails_fast() {
        let yaml = MINIMAL.replace("redis:", "cache:");
        assert!(StackConfig::from_yaml(&yaml).is_err());
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let yaml = MINIMAL.replace("  maxNodes: 3", "  maxNodes: 3\n  autopilot: true");
        let err = StackConfig::from_yaml(&yaml).unwrap_err();
        assert!(err.to_string().contains("autopilot"));
    }

    #[test]
    fn test_external_dns_defaults() {
        let yaml = format!("{}externalDns:\n  enabled: true\n", MINIMAL);
        let config = StackConfig::from_yaml(&yaml).unwrap();
        let dns = config.external_dns_enabled().unwrap();
        assert_eq!(dns.namespace, "default");
        assert_eq!(dns.chart_version, "8.7.1");
        assert_eq!(dns.policy, SyncPolicy::Sync);
        assert_eq!(dns.sync_interval, "1m");
        let limits = dns.resources.limits.as_ref().unwrap();
        assert_eq!(limits["memory"], Quantity("300Mi".to_string()));
    }

    #[test]
    fn test_disabled_external_dns_is_not_active() {
        let yaml = format!("{}externalDns:\n  enabled: false\n", MINIMAL);
        let config = StackConfig::from_yaml(&yaml).unwrap();
        assert!(config.external_dns.is_some());
        assert!(config.external_dns_enabled().is_none());
    }

    #[test]
    fn test_toml_roundtrip_of_the_same_stack() {
        let config = StackConfig::from_yaml(MINIMAL).unwrap();
        let toml_text = toml::to_string(&config).unwrap();
        assert_eq!(StackConfig::from_toml(&toml_text).unwrap(), config);
    }

    #[test]
    fn test_role_from_str() {
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert!("Admin".parse::<Role>().is_err());
        assert_eq!(Role::Viewer.cluster_role_name(), VIEWER_ROLE_NAME);
    }
}
