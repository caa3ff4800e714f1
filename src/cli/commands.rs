// CLI command definitions

use super::stack::{OutputsCommand, PlanCommand, RenderCommand, ValidateCommand};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "gke-stack",
    version,
    about = "Compile a GKE platform stack into a dependency-ordered resource graph",
    long_about = "A CLI tool that validates a GKE platform stack file, plans and renders the resource graph for the provisioning engine, and resolves stack outputs from an engine state snapshot"
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Validate the stack file and the composed resource graph
    Validate(ValidateCommand),

    /// Show resources in creation order and the stack outputs
    Plan(PlanCommand),

    /// Render the engine manifest (JSON or YAML)
    Render(RenderCommand),

    /// Resolve stack outputs from an engine state snapshot
    Outputs(OutputsCommand),
}
