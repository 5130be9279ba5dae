//! reclaim - disk space reclamation CLI

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use reclaim_cli::cmd::{self, Settings};
use reclaim_cli::ui::Output;
use reclaim_cli::{Cli, Commands};

fn main() -> Result<()> {
    // Logs go to stderr so they never interleave with the report
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Some(Commands::Completions { shell }) = cli.command {
        cmd::completions::completions(shell);
        return Ok(());
    }

    reclaim_core::platform::ensure_supported()?;

    let output = Output::new(cli.quiet);
    let settings = Settings::resolve(&cli)?;
    tracing::debug!(core = reclaim_core::VERSION, ?settings, "starting");

    match cli.command {
        None => cmd::clean::clean(&settings, &output, cli.yes),
        Some(Commands::Scan) => cmd::scan::scan(&settings, &output),
        Some(Commands::Completions { .. }) => Ok(()),
    }
}
