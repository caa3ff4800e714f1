//! Build automation for gke-stack
//!
//! Usage: cargo xtask <command>
//!
//! Available commands:
//! - build: Build the CLI
//! - test: Run unit and integration tests
//! - demo: Validate, plan and render the demo stack
//! - dist: Package the release binary
//! - ci: Format check, clippy, tests and demo render

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use xshell::{cmd, Shell};

const BINARY: &str = "gke-stack";
const DEMO_STACK: &str = "demos/stack.yaml";

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Build automation for gke-stack")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the CLI
    Build {
        /// Build in release mode
        #[arg(long)]
        release: bool,
    },
    /// Run tests
    Test {
        /// Run only the tests/ integration suites
        #[arg(long)]
        integration: bool,
    },
    /// Validate, plan and render the demo stack
    Demo {
        /// Directory the rendered manifests are written to
        #[arg(long, default_value = "target/demo")]
        out_dir: PathBuf,
    },
    /// Package the release binary with the demo stack
    Dist {
        /// Target triple (e.g., x86_64-unknown-linux-gnu)
        #[arg(long)]
        target: Option<String>,
    },
    /// Run CI checks (format, clippy, test, demo)
    Ci,
    /// Format code
    Format {
        /// Check formatting without modifying files
        #[arg(long)]
        check: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let sh = Shell::new()?;

    sh.change_dir(project_root()?);

    match cli.command {
        Commands::Build { release } => build(&sh, release),
        Commands::Test { integration } => test(&sh, integration),
        Commands::Demo { out_dir } => demo(&sh, &out_dir),
        Commands::Dist { target } => dist(&sh, target),
        Commands::Ci => ci(&sh),
        Commands::Format { check } => format(&sh, check),
    }
}

fn build(sh: &Shell, release: bool) -> Result<()> {
    println!("🔨 Building {}...", BINARY);

    if release {
        cmd!(sh, "cargo build --release --bin {BINARY}").run()?;
        println!("✅ Release build completed: target/release/{}", BINARY);
    } else {
        cmd!(sh, "cargo build --bin {BINARY}").run()?;
        println!("✅ Debug build completed: target/debug/{}", BINARY);
    }

    Ok(())
}

fn test(sh: &Shell, integration: bool) -> Result<()> {
    println!("🧪 Running tests...");

    if integration {
        cmd!(sh, "cargo test --test '*'").run()?;
    } else {
        cmd!(sh, "cargo test --workspace").run()?;
    }

    println!("✅ All tests passed");
    Ok(())
}

fn demo(sh: &Shell, out_dir: &Path) -> Result<()> {
    println!("🗺  Composing {}...", DEMO_STACK);
    sh.create_dir(out_dir)?;

    cmd!(sh, "cargo run --quiet --bin {BINARY} -- validate -f {DEMO_STACK}").run()?;
    cmd!(sh, "cargo run --quiet --bin {BINARY} -- plan -f {DEMO_STACK}").run()?;

    for format in ["json", "yaml"] {
        let manifest = out_dir.join(format!("manifest.{}", format));
        cmd!(
            sh,
            "cargo run --quiet --bin {BINARY} -- render -f {DEMO_STACK} --format {format} -o {manifest}"
        )
        .run()
        .with_context(|| format!("Failed to render {} manifest", format))?;
    }

    println!("✅ Demo manifests written to {}", out_dir.display());
    Ok(())
}

fn dist(sh: &Shell, target: Option<String>) -> Result<()> {
    println!("📦 Creating distribution package...");

    if let Some(ref target_triple) = target {
        cmd!(sh, "cargo build --release --bin {BINARY} --target {target_triple}").run()?;
    } else {
        cmd!(sh, "cargo build --release --bin {BINARY}").run()?;
    }

    let root = project_root()?;
    let dist_dir = root.join("dist");
    sh.create_dir(&dist_dir)?;

    let binary_src = match target {
        Some(ref target_triple) => root.join(format!("target/{}/release/{}", target_triple, BINARY)),
        None => root.join(format!("target/release/{}", BINARY)),
    };
    sh.copy_file(&binary_src, dist_dir.join(BINARY))?;
    sh.copy_file(root.join(DEMO_STACK), dist_dir.join("stack.example.yaml"))?;

    let version = env!("CARGO_PKG_VERSION");
    let archive_name = format!("{}-{}.tar.gz", BINARY, version);

    cmd!(sh, "tar -czf {archive_name} -C dist {BINARY} stack.example.yaml")
        .run()
        .context("Failed to create tarball")?;

    println!("✅ Distribution package created: {}", archive_name);
    Ok(())
}

fn ci(sh: &Shell) -> Result<()> {
    println!("🔍 Running CI checks...");

    println!("\n📝 Checking formatting...");
    format(sh, true)?;

    println!("\n🔧 Running clippy...");
    cmd!(sh, "cargo clippy --workspace --all-targets -- -D warnings").run()?;

    println!("\n🧪 Running tests...");
    test(sh, false)?;

    println!("\n🗺  Rendering demo stack...");
    demo(sh, Path::new("target/demo"))?;

    println!("\n✅ All CI checks passed!");
    Ok(())
}

fn format(sh: &Shell, check: bool) -> Result<()> {
    if check {
        cmd!(sh, "cargo fmt --all -- --check").run()?;
        println!("✅ Code formatting is correct");
    } else {
        cmd!(sh, "cargo fmt --all").run()?;
        println!("✅ Code formatted");
    }
    Ok(())
}

fn project_root() -> Result<PathBuf> {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .map(Path::to_path_buf)
        .context("xtask manifest has no parent directory")
}
