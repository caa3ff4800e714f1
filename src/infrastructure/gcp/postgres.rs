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

use crate::domain::config::stack::PostgresConfig;
use crate::domain::graph::{Input, OutputRef, ResourceGraph, ResourceHandle, ResourceType};
use crate::infrastructure::constants::*;
use crate::infrastructure::gcp::provider::GcpProvider;
use crate::shared::error::Result;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct PostgresHandles {
    pub instance: ResourceHandle,
    pub database: ResourceHandle,
    pub user: ResourceHandle,
    pub host: OutputRef,
    pub connection_name: OutputRef,
}

/// Describes instance, database and user, each depending on the previous one.
///
/// The user's password is a reference into the engine's secret config
/// (`postgres:userPassword`); it is never generated or read here.
pub fn create_postgres(
    graph: &mut ResourceGraph,
    provider: &GcpProvider,
    config: &PostgresConfig,
    dependencies: &[ResourceHandle],
) -> Result<PostgresHandles> {
    if !config.deletion_protection {
        warn!(
            instance = %config.instance_name,
            "Deletion protection is disabled for the database instance; enable postgres.deletionProtection for durable environments"
        );
    }

    let instance = graph.add(
        provider
            .spec(ResourceType::SqlDatabaseInstance, &config.instance_name)
            .properties(instance_properties(provider, config))
            .depends_on_all(dependencies)
            .protect(config.deletion_protection),
    )?;

    let database = graph.add(
        provider
            .spec(ResourceType::SqlDatabase, SQL_DATABASE_RESOURCE)
            .properties(Input::object([
                ("instance", instance.output_input("name")),
                ("name", Input::from(config.db_name.as_str())),
                ("charset", Input::from(SQL_CHARSET)),
                ("collation", Input::from(SQL_COLLATION)),
            ]))
            .depends_on(&instance),
    )?;

    let (secret_namespace, secret_key) = SQL_PASSWORD_SECRET;
    let user = graph.add(
        provider
            .spec(ResourceType::SqlUser, SQL_USER_RESOURCE)
            .properties(Input::object([
                ("instance", instance.output_input("name")),
                ("name", Input::from(config.user_name.as_str())),
                ("password", Input::config_secret(secret_namespace, secret_key)),
                ("type", Input::from(SQL_USER_TYPE)),
            ]))
            .depends_on(&database),
    )?;

    info!(
        instance = %config.instance_name,
        version = %config.database_version,
        database = %config.db_name,
        "Postgres described"
    );

    Ok(PostgresHandles {
        host: instance.output("publicIpAddress"),
        connection_name: instance.output("connectionName"),
        instance,
        database,
        user,
    })
}

fn instance_properties(provider: &GcpProvider, config: &PostgresConfig) -> Input {
    Input::object([
        ("name", Input::from(config.instance_name.as_str())),
        ("databaseVersion", Input::from(config.database_version.as_str())),
        ("region", Input::from(provider.region.as_str())),
        ("deletionProtection", Input::from(config.deletion_protection)),
        (
            "settings",
            Input::object([
                ("tier", Input::from(config.tier.as_str())),
                (
                    "availabilityType",
                    Input::from(config.availability_type.as_str()),
                ),
                ("diskSize", Input::from(config.disk_size)),
                ("diskType", Input::from(config.disk_type.as_str())),
                (
                    "ipConfiguration",
                    Input::object([
                        ("ipv4Enabled", Input::from(true)),
                        ("authorizedNetworks", Input::List(Vec::new())),
                        ("sslMode", Input::from(SQL_SSL_MODE)),
                    ]),
                ),
                (
                    "backupConfiguration",
                    Input::object([
                        ("enabled", Input::from(true)),
                        ("startTime", Input::from(config.backup_start_time.as_str())),
                    ]),
                ),
            ]),
        ),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::config::stack::{AvailabilityType, DiskType, GcpConfig};
    use serde_json::json;

    fn build() -> (ResourceGraph, PostgresHandles) {
        let mut graph = ResourceGraph::new();
        let provider = GcpProvider::create(
            &mut graph,
            &GcpConfig {
                project: "amiara-dev-be".to_string(),
                region: "us-central1".to_string(),
                zone: "us-central1-a".to_string(),
            },
        )
        .unwrap();
        let config = PostgresConfig {
            instance_name: "amiara-dev-postgres".to_string(),
            database_version: "POSTGRES_15".to_string(),
            tier: "db-f1-micro".to_string(),
            availability_type: AvailabilityType::Zonal,
            disk_size: 10,
            disk_type: DiskType::PdSsd,
            db_name: "amiara".to_string(),
            user_name: "amiara".to_string(),
            deletion_protection: false,
            backup_start_time: "02:00".to_string(),
        };
        let handles = create_postgres(&mut graph, &provider, &config, &[]).unwrap();
        (graph, handles)
    }

    #[test]
    fn test_strict_creation_chain() {
        let (graph, pg) = build();
        assert!(graph.get(pg.database.id).unwrap().depends_on(pg.instance.id));
        assert!(graph.get(pg.user.id).unwrap().depends_on(pg.database.id));
        assert!(graph.validate().is_ok());
    }

    #[test]
    fn test_ssl_only_and_daily_backup() {
        let (graph, pg) = build();
        let props = graph.get(pg.instance.id).unwrap().properties.to_manifest();
        assert_eq!(props["settings"]["ipConfiguration"]["sslMode"], json!("ENCRYPTED_ONLY"));
        assert_eq!(props["settings"]["backupConfiguration"]["enabled"], json!(true));
        assert_eq!(props["settings"]["backupConfiguration"]["startTime"], json!("02:00"));
        assert_eq!(props["deletionProtection"], json!(false));
    }

    #[test]
    fn test_password_is_external_secret_reference() {
        let (graph, pg) = build();
        let user = graph.get(pg.user.id).unwrap();
        assert_eq!(
            user.property("password"),
            Some(&Input::config_secret("postgres", "userPassword"))
        );
        assert!(user.properties.is_secret());
    }
}
