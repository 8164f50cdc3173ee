//! BlockBT CLI - a dbt-like build tool for blockchain data models

use clap::Parser;

mod cli;
mod commands;

use cli::Cli;
use commands::common::ExitCode;
use commands::{compile, init, run, test};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match &cli.command {
        cli::Commands::Run(args) => run::execute(args, &cli.global).await,
        cli::Commands::Compile(args) => compile::execute(args, &cli.global).await,
        cli::Commands::Test(args) => test::execute(args, &cli.global).await,
        cli::Commands::Init(args) => init::execute(args, &cli.global).await,
    };

    if let Err(err) = result {
        if let Some(exit) = err.downcast_ref::<ExitCode>() {
            std::process::exit(exit.0);
        }
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}
