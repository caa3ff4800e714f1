//! Stack commands

use crate::cli::display::{StatusIcon, TableRenderer};
use crate::domain::config::{apply_to_stack_config, parse_dynamic_configs, StackConfig};
use crate::domain::stack::{
    Manifest, ManifestFormat, OutputValue, Stack, StackDescriptor, StateSnapshot,
};
use crate::infrastructure::constants::OUTPUT_KUBECONFIG;
use crate::infrastructure::kubernetes::kubeconfig;
use clap::{Args, Parser, ValueEnum};
use colored::Colorize;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Arguments shared by every command that loads a stack file
#[derive(Args, Debug, Clone)]
pub struct StackArgs {
    /// Path to the stack file (.yaml, .yml, .toml or .json)
    #[arg(long = "file", short = 'f', value_name = "PATH", default_value = "stack.yaml")]
    pub file: PathBuf,

    /// Override stack settings (-D key=value), applied before validation
    ///
    /// Keys use the stack file's dotted camelCase paths:
    /// Provider: gcp.project, gcp.region, gcp.zone
    /// APIs: apis.compute, apis.container, apis.redis, apis.sqlAdmin, apis.dns
    /// Cluster: cluster.clusterName, cluster.nodePoolName, cluster.machineType, cluster.minNodes, cluster.maxNodes
    /// Redis: redis.instanceName, redis.memorySizeGb, redis.tier, redis.redisVersion, redis.authEnabled
    /// Postgres: postgres.instanceName, postgres.tier, postgres.diskSize, postgres.deletionProtection, ...
    /// ExternalDNS: externalDns.enabled, externalDns.namespace, externalDns.chartVersion, externalDns.policy, ...
    ///
    /// Example: -Dcluster.maxNodes=5 -DexternalDns.enabled=false
    #[arg(short = 'D', value_name = "KEY=VALUE")]
    pub properties: Vec<String>,
}

impl StackArgs {
    pub fn load(&self) -> anyhow::Result<StackConfig> {
        let mut config = StackConfig::from_file(&self.file).map_err(|e| {
            anyhow::anyhow!("Failed to load stack from {}: {}", self.file.display(), e)
        })?;

        if !self.properties.is_empty() {
            let configs = parse_dynamic_configs(&self.properties)
                .map_err(|e| anyhow::anyhow!("Failed to parse dynamic configs: {}", e))?;
            apply_to_stack_config(&configs, &mut config)
                .map_err(|e| anyhow::anyhow!("Failed to apply dynamic configs: {}", e))?;
        }
        Ok(config)
    }

    pub fn compose(&self) -> anyhow::Result<Stack> {
        let config = self.load()?;
        let descriptor = StackDescriptor::new()?;
        descriptor
            .compose(&config)
            .map_err(|e| anyhow::anyhow!("Stack '{}' is invalid: {}", config.name, e))
    }
}

#[derive(Parser, Debug, Clone)]
pub struct ValidateCommand {
    #[command(flatten)]
    pub stack: StackArgs,
}

impl ValidateCommand {
    pub fn execute(&self) -> anyhow::Result<()> {
        let stack = self.stack.compose()?;
        println!(
            "{} Stack '{}' is valid: {} resources, {} outputs",
            StatusIcon::SUCCESS.green(),
            stack.name,
            stack.graph.len(),
            stack.outputs.len()
        );
        Ok(())
    }
}

#[derive(Parser, Debug, Clone)]
pub struct PlanCommand {
    #[command(flatten)]
    pub stack: StackArgs,
}

impl PlanCommand {
    pub fn execute(&self) -> anyhow::Result<()> {
        let stack = self.stack.compose()?;
        let renderer = TableRenderer::new();
        println!("{}", renderer.render_plan(&stack));
        println!("{}", renderer.render_output_expressions(&stack.outputs));
        Ok(())
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatArg {
    Json,
    Yaml,
}

impl From<FormatArg> for ManifestFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Json => ManifestFormat::Json,
            FormatArg::Yaml => ManifestFormat::Yaml,
        }
    }
}

#[derive(Parser, Debug, Clone)]
pub struct RenderCommand {
    #[command(flatten)]
    pub stack: StackArgs,

    /// Manifest format
    #[arg(long, value_enum, default_value = "json")]
    pub format: FormatArg,

    /// Write the manifest to a file instead of stdout
    #[arg(long, short = 'o', value_name = "PATH")]
    pub output: Option<PathBuf>,
}

impl RenderCommand {
    pub fn execute(&self) -> anyhow::Result<()> {
        let stack = self.stack.compose()?;
        let rendered = Manifest::from_stack(&stack)
            .render(self.format.into())
            .map_err(|e| anyhow::anyhow!("Failed to render manifest: {}", e))?;

        match &self.output {
            Some(path) => {
                fs::write(path, rendered).map_err(|e| {
                    anyhow::anyhow!("Failed to write manifest to {}: {}", path.display(), e)
                })?;
                info!(path = %path.display(), resources = stack.graph.len(), "Manifest written");
                println!("{} Manifest written to {}", StatusIcon::SUCCESS.green(), path.display());
            }
            None => println!("{}", rendered),
        }
        Ok(())
    }
}

#[derive(Parser, Debug, Clone)]
pub struct OutputsCommand {
    #[command(flatten)]
    pub stack: StackArgs,

    /// State snapshot exported by the provisioning engine (JSON)
    #[arg(long, value_name = "PATH")]
    pub state: PathBuf,

    /// Print secret outputs in clear text
    #[arg(long)]
    pub show_secrets: bool,

    /// Print outputs as JSON instead of a table
    #[arg(long)]
    pub json: bool,

    /// Write the resolved kubeconfig to this path
    #[arg(long, value_name = "PATH")]
    pub write_kubeconfig: Option<PathBuf>,
}

impl OutputsCommand {
    pub fn execute(&self) -> anyhow::Result<()> {
        let stack = self.stack.compose()?;
        let state = StateSnapshot::from_file(&self.state).map_err(|e| {
            anyhow::anyhow!("Failed to load state from {}: {}", self.state.display(), e)
        })?;
        let resolved = stack
            .outputs
            .resolve(&state)
            .map_err(|e| anyhow::anyhow!("Failed to resolve outputs: {}", e))?;

        if let Some(path) = &self.write_kubeconfig {
            let kubeconfig = resolved
                .iter()
                .find(|o| o.name == OUTPUT_KUBECONFIG)
                .ok_or_else(|| anyhow::anyhow!("Stack has no kubeconfig output"))?;
            write_kubeconfig(path, &kubeconfig.value)?;
            println!(
                "{} Kubeconfig written to {}",
                StatusIcon::SUCCESS.green(),
                path.display()
            );
        }

        if self.json {
            let text = if self.show_secrets {
                let revealed: Map<String, Value> = resolved
                    .iter()
                    .map(|o| (o.name.clone(), o.value.expose().clone()))
                    .collect();
                serde_json::to_string_pretty(&revealed)?
            } else {
                serde_json::to_string_pretty(&resolved)?
            };
            println!("{}", text);
        } else {
            println!(
                "{}",
                TableRenderer::new().render_outputs(&resolved, self.show_secrets)
            );
        }
        Ok(())
    }
}

/// Checks the document with kube's loader before writing it, owner-readable only.
fn write_kubeconfig(path: &Path, value: &OutputValue) -> anyhow::Result<()> {
    let text = value
        .expose()
        .as_str()
        .ok_or_else(|| anyhow::anyhow!("kubeconfig output is not a string"))?;
    kubeconfig::load(text).map_err(|e| anyhow::anyhow!("Resolved kubeconfig is invalid: {}", e))?;

    fs::write(path, text)
        .map_err(|e| anyhow::anyhow!("Failed to write kubeconfig to {}: {}", path.display(), e))?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::secret::Sensitive;
    use serde_json::json;
    use std::io::Write;
    use tempfile::{Builder, TempDir};

    const DEMO: &str = include_str!("../../demos/stack.yaml");

    fn stack_file() -> tempfile::NamedTempFile {
        let mut file = Builder::new().suffix(".yaml").tempfile().unwrap();
        file.write_all(DEMO.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_overrides_apply_before_validation() {
        let file = stack_file();
        let args = StackArgs {
            file: file.path().to_path_buf(),
            properties: vec!["externalDns.enabled=false".to_string()],
        };
        let stack = args.compose().unwrap();
        assert!(stack.outputs.get("externalDnsNamespace").is_none());

        let args = StackArgs {
            file: file.path().to_path_buf(),
            properties: vec!["cluster.maxNodes=0".to_string()],
        };
        assert!(args.compose().is_err());
    }

    #[test]
    fn test_unknown_override_key_fails() {
        let file = stack_file();
        let args = StackArgs {
            file: file.path().to_path_buf(),
            properties: vec!["cluster.flavour=large".to_string()],
        };
        assert!(args.load().is_err());
    }

    #[test]
    fn test_write_kubeconfig_validates_document() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("kubeconfig");

        let bad = OutputValue::Secret(Sensitive::new(json!("not: [a kubeconfig")));
        assert!(write_kubeconfig(&path, &bad).is_err());
        assert!(!path.exists());

        let text = kubeconfig::render("c", "10.0.0.1", "Q0E=").unwrap();
        let good = OutputValue::Secret(Sensitive::new(json!(text)));
        write_kubeconfig(&path, &good).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), text);
    }
}
