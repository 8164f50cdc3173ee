//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand};

/// BlockBT - a dbt-like build tool for blockchain data models
#[derive(Parser, Debug)]
#[command(name = "bbt")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to project directory
    #[arg(short = 'p', long, global = true, default_value = ".")]
    pub project_dir: String,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compile and materialize models against the database
    Run(RunArgs),

    /// Render templates and write compiled SQL without touching the database
    Compile(CompileArgs),

    /// Run data tests declared in model schema files
    Test(TestArgs),

    /// Scaffold a new BlockBT project
    Init(InitArgs),
}

/// Arguments for the run command
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Selector expressions (model, +model, model+, tag:name); default: all
    pub targets: Vec<String>,

    /// Additional selector expressions (repeatable)
    #[arg(short, long)]
    pub select: Vec<String>,

    /// Rebuild incremental models from scratch
    #[arg(long)]
    pub full_refresh: bool,

    /// Worker pool size (overrides execution.threads)
    #[arg(long)]
    pub threads: Option<usize>,

    /// Per-model timeout in seconds (overrides execution.timeout_secs)
    #[arg(long)]
    pub timeout: Option<u64>,
}

/// Arguments for the compile command
#[derive(Args, Debug)]
pub struct CompileArgs {
    /// Selector expressions; default: all
    pub targets: Vec<String>,

    /// Additional selector expressions (repeatable)
    #[arg(short, long)]
    pub select: Vec<String>,
}

/// Arguments for the test command
#[derive(Args, Debug)]
pub struct TestArgs {
    /// Selector expressions; default: all models with tests
    pub targets: Vec<String>,

    /// Additional selector expressions (repeatable)
    #[arg(short, long)]
    pub select: Vec<String>,
}

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Project name (also the directory to create)
    pub name: String,

    /// Chain adapter for the scaffolded sources
    #[arg(long, default_value = "ethereum")]
    pub adapter: String,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
