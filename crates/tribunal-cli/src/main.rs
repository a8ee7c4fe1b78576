//! Tribunal CLI - adjudicate queries from the command line.

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use tribunal_cli::{commands, load_config, Cli, Command, Formatter};

#[tokio::main]
async fn main() {
    // Logs go to stderr so stdout stays parseable
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::try_from_env("TRIBUNAL_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    if let Err(e) = run().await {
        let formatter = Formatter::new(Default::default(), true);
        eprintln!("{}", formatter.error(&format!("{:#}", e)));
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;
    let formatter = Formatter::new(cli.format.into(), !cli.no_color);

    match cli.command {
        Command::Run(args) => commands::execute_run(args, config, &formatter).await?,
        Command::Verify(args) => commands::execute_verify(args, config, &formatter).await?,
        Command::Replay(args) => commands::execute_replay(args, &formatter)?,
        Command::Config(args) => commands::execute_config(args, config)?,
    }

    Ok(())
}
