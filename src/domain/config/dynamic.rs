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

use crate::domain::config::stack::{ExternalDnsConfig, StackConfig};
use crate::shared::error::{Result, StackError};
use std::collections::HashMap;
use std::str::FromStr;

/// Parses `-D key=value` arguments. A later occurrence of a key wins.
pub fn parse_dynamic_configs(properties: &[String]) -> Result<HashMap<String, String>> {
    let mut configs = HashMap::new();
    for property in properties {
        let (key, value) = property.split_once('=').ok_or_else(|| {
            StackError::config_error(format!(
                "Invalid property '{}': expected KEY=VALUE",
                property
            ))
        })?;
        let key = key.trim();
        if key.is_empty() {
            return Err(StackError::config_error(format!(
                "Invalid property '{}': empty key",
                property
            )));
        }
        configs.insert(key.to_string(), value.trim().to_string());
    }
    Ok(configs)
}

/// Applies overrides to a loaded stack. Keys use the same dotted camelCase
/// paths as the stack file; unknown keys are an error.
pub fn apply_to_stack_config(
    configs: &HashMap<String, String>,
    config: &mut StackConfig,
) -> Result<()> {
    let mut keys: Vec<&String> = configs.keys().collect();
    keys.sort();

    for key in keys {
        let value = configs[key].as_str();
        match key.as_str() {
            "name" => config.name = value.to_string(),

            "gcp.project" => config.gcp.project = value.to_string(),
            "gcp.region" => config.gcp.region = value.to_string(),
            "gcp.zone" => config.gcp.zone = value.to_string(),

            "apis.compute" => config.apis.compute = parse(key, value)?,
            "apis.container" => config.apis.container = parse(key, value)?,
            "apis.redis" => config.apis.redis = parse(key, value)?,
            "apis.sqlAdmin" => config.apis.sql_admin = parse(key, value)?,
            "apis.dns" => config.apis.dns = parse(key, value)?,

            "cluster.clusterName" => config.cluster.cluster_name = value.to_string(),
            "cluster.nodePoolName" => config.cluster.node_pool_name = value.to_string(),
            "cluster.machineType" => config.cluster.machine_type = value.to_string(),
            "cluster.minNodes" => config.cluster.min_nodes = parse(key, value)?,
            "cluster.maxNodes" => config.cluster.max_nodes = parse(key, value)?,

            "redis.instanceName" => config.redis.instance_name = value.to_string(),
            "redis.memorySizeGb" => config.redis.memory_size_gb = parse(key, value)?,
            "redis.tier" => config.redis.tier = parse(key, value)?,
            "redis.redisVersion" => config.redis.redis_version = value.to_string(),
            "redis.authEnabled" => config.redis.auth_enabled = parse(key, value)?,

            "postgres.instanceName" => config.postgres.instance_name = value.to_string(),
            "postgres.databaseVersion" => config.postgres.database_version = value.to_string(),
            "postgres.tier" => config.postgres.tier = value.to_string(),
            "postgres.availabilityType" => {
                config.postgres.availability_type = parse(key, value)?
            }
            "postgres.diskSize" => config.postgres.disk_size = parse(key, value)?,
            "postgres.diskType" => config.postgres.disk_type = parse(key, value)?,
            "postgres.dbName" => config.postgres.db_name = value.to_string(),
            "postgres.userName" => config.postgres.user_name = value.to_string(),
            "postgres.deletionProtection" => {
                config.postgres.deletion_protection = parse(key, value)?
            }
            "postgres.backupStartTime" => config.postgres.backup_start_time = value.to_string(),

            other if other.starts_with("externalDns.") => {
                let dns = config
                    .external_dns
                    .get_or_insert_with(ExternalDnsConfig::default);
                apply_external_dns(other, value, dns)?;
            }

            other => {
                return Err(StackError::config_error(format!(
                    "Unknown property '{}'",
                    other
                )))
            }
        }
    }

    Ok(())
}

fn apply_external_dns(key: &str, value: &str, dns: &mut ExternalDnsConfig) -> Result<()> {
    match key {
        "externalDns.enabled" => dns.enabled = parse(key, value)?,
        "externalDns.namespace" => dns.namespace = value.to_string(),
        "externalDns.chartVersion" => dns.chart_version = value.to_string(),
        "externalDns.policy" => dns.policy = parse(key, value)?,
        "externalDns.domainFilters" => {
            dns.domain_filters = value
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        }
        "externalDns.txtOwnerId" => dns.txt_owner_id = value.to_string(),
        "externalDns.txtPrefix" => dns.txt_prefix = value.to_string(),
        "externalDns.syncInterval" => dns.sync_interval = value.to_string(),
        "externalDns.logLevel" => dns.log_level = value.to_string(),
        other => {
            return Err(StackError::config_error(format!(
                "Unknown property '{}'",
                other
            )))
        }
    }
    Ok(())
}

fn parse<T>(key: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.parse::<T>().map_err(|e| {
        StackError::config_error(format!("Invalid value '{}' for {}: {}", value, key, e))
    })
}
