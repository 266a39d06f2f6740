//! wsbuild CLI - builds every project of a workspace in declared order

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use wsbuild::ops::{build_workspace, BuildOptions};
use wsbuild::util::Shell;

mod cli;

use cli::Cli;

fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("wsbuild=debug")
    } else {
        EnvFilter::new("wsbuild=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();

    let shell = Arc::new(Shell::from_flags(cli.quiet, cli.verbose, cli.no_color));
    shell.println(format!(
        "wsbuild {}: {} ({})",
        env!("CARGO_PKG_VERSION"),
        cli.workspace.display(),
        cli.mode
    ));

    let opts = BuildOptions {
        workspace: cli.workspace,
        mode: cli.mode,
    };

    if let Err(e) = build_workspace(&opts, shell.clone()) {
        let code = e.exit_code();
        let failure = e.failure().cloned();

        shell.error(format!("{:#}", anyhow::Error::new(e)));
        if let Some(failure) = failure {
            shell.failure_report(&failure.diagnostics, &failure.command);
        }
        std::process::exit(code);
    }
}
