//! Razer report protocol tooling
//!
//! Offline encoding and decoding of reports and lighting frames.

mod cli;

use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level)),
        )
        .with_target(false)
        .init();

    let config = cli::load_config(cli.config.as_ref())?;

    let output = match cli.command {
        Commands::Encode {
            class,
            id,
            args,
            transaction_id,
        } => cli::encode(&config, class, id, &args, transaction_id)?,
        Commands::Decode { hex } => cli::decode(&hex)?,
        Commands::Frame { channel, colors } => cli::frame(channel, &colors)?,
        Commands::Config => cli::show_config(&config)?,
    };
    println!("{}", output.trim_end());

    Ok(())
}
