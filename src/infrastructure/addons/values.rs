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

//! Helm values for the ExternalDNS chart

use crate::domain::config::stack::ExternalDnsConfig;
use crate::infrastructure::constants::*;
use crate::shared::error::{Result, StackError};
use k8s_openapi::api::core::v1::ResourceRequirements;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::warn;

/// Top-level keys that carry the credential wiring. Overriding them can leave
/// the controller without access to the mounted key.
pub const CREDENTIAL_KEYS: &[&str] = &["env", "extraVolumes", "extraVolumeMounts", "google"];

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExternalDnsValues<'a> {
    provider: &'static str,
    google: GoogleValues<'a>,
    env: Vec<EnvVar>,
    extra_volumes: Vec<SecretVolume<'a>>,
    extra_volume_mounts: Vec<VolumeMount>,
    domain_filters: &'a [String],
    txt_owner_id: &'a str,
    policy: &'static str,
    registry: &'static str,
    txt_prefix: &'a str,
    interval: &'a str,
    log_level: &'a str,
    sources: Value,
    resources: &'a ResourceRequirements,
}

#[derive(Debug, Serialize)]
struct GoogleValues<'a> {
    project: &'a str,
}

#[derive(Debug, Serialize)]
struct EnvVar {
    name: &'static str,
    value: String,
}

#[derive(Debug, Serialize)]
struct SecretVolume<'a> {
    name: &'static str,
    secret: SecretSource<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SecretSource<'a> {
    secret_name: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VolumeMount {
    name: &'static str,
    mount_path: &'static str,
    read_only: bool,
}

/// Builds the chart values: computed settings first, then every entry of
/// `additionalValues` replacing the top-level key of the same name.
pub fn chart_values(config: &ExternalDnsConfig, project: &str, secret_name: &str) -> Result<Value> {
    let sources = config
        .additional_values
        .get("sources")
        .cloned()
        .unwrap_or_else(|| {
            Value::Array(
                EXTERNAL_DNS_DEFAULT_SOURCES
                    .iter()
                    .map(|s| Value::String(s.to_string()))
                    .collect(),
            )
        });

    let values = ExternalDnsValues {
        provider: "google",
        google: GoogleValues { project },
        env: vec![EnvVar {
            name: "GOOGLE_APPLICATION_CREDENTIALS",
            value: format!(
                "{}/{}",
                EXTERNAL_DNS_CREDENTIALS_MOUNT, EXTERNAL_DNS_CREDENTIALS_FILE
            ),
        }],
        extra_volumes: vec![SecretVolume {
            name: EXTERNAL_DNS_CREDENTIALS_VOLUME,
            secret: SecretSource { secret_name },
        }],
        extra_volume_mounts: vec![VolumeMount {
            name: EXTERNAL_DNS_CREDENTIALS_VOLUME,
            mount_path: EXTERNAL_DNS_CREDENTIALS_MOUNT,
            read_only: true,
        }],
        domain_filters: &config.domain_filters,
        txt_owner_id: &config.txt_owner_id,
        policy: config.policy.as_str(),
        registry: "txt",
        txt_prefix: &config.txt_prefix,
        interval: &config.sync_interval,
        log_level: &config.log_level,
        sources,
        resources: &config.resources,
    };

    let mut values = match serde_json::to_value(&values)? {
        Value::Object(map) => map,
        _ => {
            return Err(StackError::validation_error(
                "chart values did not serialize to an object",
            ))
        }
    };
    merge_overrides(&mut values, &config.additional_values);
    Ok(Value::Object(values))
}

/// Shallow merge: each override replaces the whole top-level key.
pub fn merge_overrides(values: &mut Map<String, Value>, overrides: &BTreeMap<String, Value>) {
    for (key, value) in overrides {
        if CREDENTIAL_KEYS.contains(&key.as_str()) {
            warn!(
                key = %key,
                "additionalValues replaces ExternalDNS credential wiring"
            );
        }
        values.insert(key.clone(), value.clone());
    }
}
