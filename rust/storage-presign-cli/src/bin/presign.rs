use anyhow::{Context, Result};
use clap::Parser;
use storage_presign::{Config, Signer};
use storage_presign_cli::{PresignCli, run};
use tracing_subscriber::EnvFilter;

pub fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = PresignCli::parse();

    let config = Config::from_env().context("Failed to load storage configuration")?;
    let signer = Signer::new(config).context("Invalid storage configuration")?;

    println!("{}", run(&signer, &cli)?);

    Ok(())
}
