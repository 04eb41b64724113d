// ABOUTME: Entry point for the n8n-deploy CLI application.
// ABOUTME: Parses arguments, initialises logging, and maps failures to exit codes.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use n8n_deploy::output::Output;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // RUST_LOG wins; otherwise the verbose flag picks the level
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("warn")
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let mut output = Output::new(cli.output.into());

    let result = match cli.command {
        Commands::Deploy {
            target,
            edge,
            workers,
            dry_run,
        } => {
            let mut args = target.into_deploy_args();
            edge.apply(&mut args);
            args.workers = workers;
            args.dry_run = dry_run;
            commands::deploy(args, &mut output).await
        }
        Commands::Edge {
            target,
            edge,
            from,
            workers,
            dry_run,
        } => {
            let mut args = target.into_deploy_args();
            edge.apply(&mut args);
            args.workers = workers;
            args.dry_run = dry_run;
            commands::edge(args, from, &mut output).await
        }
        Commands::Status { target, domain } => {
            let mut args = target.into_deploy_args();
            args.domain = domain;
            commands::status(args, &mut output).await
        }
    };

    if let Err(e) = result {
        output.error(&e);
        std::process::exit(e.exit_code());
    }
}
