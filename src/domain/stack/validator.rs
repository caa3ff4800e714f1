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
use crate::infrastructure::constants::{K8S_MAX_NAME_LEN, RESERVED_RESOURCE_NAMES};
use crate::infrastructure::kubernetes::resources::rbac::binding_object_name;
use crate::shared::error::{Result, StackError};
use chrono::NaiveTime;
use regex::Regex;
use std::collections::HashSet;

const VALID_LOG_LEVELS: &[&str] = &["panic", "debug", "info", "warning", "error", "fatal"];

/// Checks a loaded stack against the naming and sizing rules of the
/// resources it describes. Runs before any resource is registered.
pub struct StackValidator {
    project_id: Regex,
    region: Regex,
    gcp_name: Regex,
    machine_type: Regex,
    redis_version: Regex,
    postgres_version: Regex,
    sql_tier: Regex,
    sql_identifier: Regex,
    email: Regex,
    chart_version: Regex,
    interval: Regex,
    domain_filter: Regex,
}

impl StackValidator {
    pub fn new() -> Result<Self> {
        let re = |pattern: &str| Regex::new(pattern);
        Ok(Self {
            project_id: re(r"^[a-z][a-z0-9-]{4,28}[a-z0-9]$")?,
            region: re(r"^[a-z]+-[a-z]+[0-9]+$")?,
            gcp_name: re(r"^[a-z]([-a-z0-9]*[a-z0-9])?$")?,
            machine_type: re(r"^[a-z][a-z0-9]*-[a-z0-9-]+$")?,
            redis_version: re(r"^REDIS_[0-9]+_(X|[0-9]+)$")?,
            postgres_version: re(r"^POSTGRES_[0-9]+$")?,
            sql_tier: re(r"^db-[a-z0-9-]+$")?,
            sql_identifier: re(r"^[A-Za-z_][A-Za-z0-9_]{0,62}$")?,
            email: re(r"^[^@\s]+@[^@\s]+\.[^@\s]+$")?,
            chart_version: re(r"^[0-9]+\.[0-9]+\.[0-9]+([-+][0-9A-Za-z.-]+)?$")?,
            interval: re(r"^([0-9]+h)?([0-9]+m)?([0-9]+s)?$")?,
            domain_filter: re(r"^(\*\.)?[a-z0-9]([-a-z0-9]*[a-z0-9])?(\.[a-z0-9]([-a-z0-9]*[a-z0-9])?)*$")?,
        })
    }

    pub fn validate(&self, config: &StackConfig) -> Result<()> {
        self.validate_provider(config)?;
        self.validate_cluster(config)?;
        self.validate_redis(config)?;
        self.validate_postgres(config)?;
        self.validate_users(config)?;
        validate_distinct_names(config)?;
        if let Some(dns) = config.external_dns_enabled() {
            self.validate_external_dns(dns)?;
        }
        Ok(())
    }

    fn validate_provider(&self, config: &StackConfig) -> Result<()> {
        let gcp = &config.gcp;
        if !self.project_id.is_match(&gcp.project) {
            return Err(invalid("gcp.project", &gcp.project));
        }
        if !self.region.is_match(&gcp.region) {
            return Err(invalid("gcp.region", &gcp.region));
        }
        let zone_suffix = gcp
            .zone
            .strip_prefix(gcp.region.as_str())
            .and_then(|rest| rest.strip_prefix('-'));
        if !zone_suffix.is_some_and(|s| s.len() == 1 && s.chars().all(|c| c.is_ascii_lowercase()))
        {
            return Err(StackError::ValidationError(format!(
                "gcp.zone '{}' is not a zone of region '{}'",
                gcp.zone, gcp.region
            )));
        }
        Ok(())
    }

    fn validate_cluster(&self, config: &StackConfig) -> Result<()> {
        let cluster = &config.cluster;
        self.check_gcp_name("cluster.clusterName", &cluster.cluster_name, 40)?;
        self.check_gcp_name("cluster.nodePoolName", &cluster.node_pool_name, 40)?;

        if !self.machine_type.is_match(&cluster.machine_type) {
            return Err(invalid("cluster.machineType", &cluster.machine_type));
        }
        if cluster.max_nodes == 0 {
            return Err(StackError::validation_error(
                "cluster.maxNodes must be > 0",
            ));
        }
        if cluster.min_nodes > cluster.max_nodes {
            return Err(StackError::ValidationError(format!(
                "cluster.minNodes ({}) must not exceed cluster.maxNodes ({})",
                cluster.min_nodes, cluster.max_nodes
            )));
        }
        if cluster.max_nodes > 1000 {
            return Err(StackError::validation_error(
                "cluster.maxNodes must be <= 1000",
            ));
        }
        Ok(())
    }

    fn validate_redis(&self, config: &StackConfig) -> Result<()> {
        let redis = &config.redis;
        self.check_gcp_name("redis.instanceName", &redis.instance_name, 40)?;
        if redis.memory_size_gb == 0 || redis.memory_size_gb > 300 {
            return Err(StackError::ValidationError(format!(
                "redis.memorySizeGb must be between 1 and 300, got {}",
                redis.memory_size_gb
            )));
        }
        if !self.redis_version.is_match(&redis.redis_version) {
            return Err(invalid("redis.redisVersion", &redis.redis_version));
        }
        Ok(())
    }

    fn validate_postgres(&self, config: &StackConfig) -> Result<()> {
        let postgres = &config.postgres;
        self.check_gcp_name("postgres.instanceName", &postgres.instance_name, 98)?;
        if !self.postgres_version.is_match(&postgres.database_version) {
            return Err(invalid("postgres.databaseVersion", &postgres.database_version));
        }
        if !self.sql_tier.is_match(&postgres.tier) {
            return Err(invalid("postgres.tier", &postgres.tier));
        }
        if postgres.disk_size < 10 {
            return Err(StackError::ValidationError(format!(
                "postgres.diskSize must be at least 10 GB, got {}",
                postgres.disk_size
            )));
        }
        if !self.sql_identifier.is_match(&postgres.db_name) {
            return Err(invalid("postgres.dbName", &postgres.db_name));
        }
        if !self.sql_identifier.is_match(&postgres.user_name) {
            return Err(invalid("postgres.userName", &postgres.user_name));
        }
        NaiveTime::parse_from_str(&postgres.backup_start_time, "%H:%M").map_err(|e| {
            StackError::ValidationError(format!(
                "postgres.backupStartTime '{}' is not HH:MM: {}",
                postgres.backup_start_time, e
            ))
        })?;
        Ok(())
    }

    fn validate_users(&self, config: &StackConfig) -> Result<()> {
        let mut emails = HashSet::new();
        let mut object_names = HashSet::new();

        for user in &config.rbac.users {
            if !self.email.is_match(&user.email) {
                return Err(invalid("rbac.users[].email", &user.email));
            }
            if !emails.insert(user.email.to_lowercase()) {
                return Err(StackError::ValidationError(format!(
                    "rbac user '{}' is listed more than once",
                    user.email
                )));
            }
            let object_name = binding_object_name(&user.email);
            if !is_valid_k8s_subdomain(&object_name) {
                return Err(StackError::ValidationError(format!(
                    "rbac user '{}' maps to binding name '{}' which is not a valid Kubernetes object name",
                    user.email, object_name
                )));
            }
            if !object_names.insert(object_name.clone()) {
                return Err(StackError::ValidationError(format!(
                    "rbac user '{}' maps to binding name '{}' which is already taken",
                    user.email, object_name
                )));
            }
        }
        Ok(())
    }

    fn validate_external_dns(&self, dns: &ExternalDnsConfig) -> Result<()> {
        if !is_valid_k8s_name(&dns.namespace) || dns.namespace.len() > 63 {
            return Err(invalid("externalDns.namespace", &dns.namespace));
        }
        if !self.chart_version.is_match(&dns.chart_version) {
            return Err(invalid("externalDns.chartVersion", &dns.chart_version));
        }
        if dns.sync_interval.is_empty() || !self.interval.is_match(&dns.sync_interval) {
            return Err(invalid("externalDns.syncInterval", &dns.sync_interval));
        }
        if dns.txt_owner_id.trim().is_empty() {
            return Err(StackError::validation_error(
                "externalDns.txtOwnerId must not be empty",
            ));
        }
        if !VALID_LOG_LEVELS.contains(&dns.log_level.as_str()) {
            return Err(invalid("externalDns.logLevel", &dns.log_level));
        }
        for filter in &dns.domain_filters {
            if !self.domain_filter.is_match(filter) {
                return Err(invalid("externalDns.domainFilters[]", filter));
            }
        }
        Ok(())
    }

    fn check_gcp_name(&self, key: &str, value: &str, max_len: usize) -> Result<()> {
        if value.len() > max_len {
            return Err(StackError::ValidationError(format!(
                "{} too long (max {} chars): {}",
                key, max_len, value
            )));
        }
        if !self.gcp_name.is_match(value) {
            return Err(invalid(key, value));
        }
        Ok(())
    }
}

/// State snapshots are keyed by logical name, so the user-chosen names must
/// not collide with each other or with the fixed ones.
fn validate_distinct_names(config: &StackConfig) -> Result<()> {
    let mut seen: HashSet<&str> = RESERVED_RESOURCE_NAMES.iter().copied().collect();
    let names = [
        ("cluster.clusterName", config.cluster.cluster_name.as_str()),
        ("cluster.nodePoolName", config.cluster.node_pool_name.as_str()),
        ("redis.instanceName", config.redis.instance_name.as_str()),
        ("postgres.instanceName", config.postgres.instance_name.as_str()),
    ];
    for (key, name) in names {
        if !seen.insert(name) {
            return Err(StackError::ValidationError(format!(
                "{} '{}' collides with another resource name in the stack",
                key, name
            )));
        }
    }
    Ok(())
}

fn invalid(key: &str, value: &str) -> StackError {
    StackError::ValidationError(format!("Invalid {}: '{}'", key, value))
}

pub(crate) fn is_valid_k8s_name(name: &str) -> bool {
    if name.is_empty() || name.len() > 253 {
        return false;
    }

    if !name.chars().next().unwrap_or(' ').is_ascii_alphanumeric() {
        return false;
    }
    if !name.chars().last().unwrap_or(' ').is_ascii_alphanumeric() {
        return false;
    }

    name.chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

/// DNS-1123 subdomain: dot-separated labels, each a valid name.
pub(crate) fn is_valid_k8s_subdomain(name: &str) -> bool {
    name.len() <= K8S_MAX_NAME_LEN && name.split('.').all(is_valid_k8s_name)
}
