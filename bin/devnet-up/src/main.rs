//! devnet-up brings a local rollup devnet up from a monorepo checkout.

mod cli;

use anyhow::Result;
use clap::Parser;
use tokio_util::sync::CancellationToken;

use cli::Cli;
use devnet_up_deploy::{DeployerBuilder, DevnetSettings, DockerStatus, render_states};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    // Initialize the logger.
    tracing_subscriber::fmt()
        .with_max_level(cli.verbosity)
        .init();

    if let Err(err) = run(cli).await {
        tracing::error!("{err:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let settings = DevnetSettings::load(cli.config.as_deref())?;

    let docker = if cli.skip_docker_check {
        None
    } else {
        let docker = DockerStatus::connect()?;
        docker.ping().await?;
        Some(docker)
    };

    // Ctrl-C cancels the readiness waits. Started services are left running.
    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Interrupted, aborting bring-up");
                cancel.cancel();
            }
        }
    });

    let mode = cli.mode();
    let deployer = DeployerBuilder::new(&cli.monorepo_dir)
        .settings(settings)
        .cancellation_token(cancel.clone())
        .build()?;

    let report = tokio::select! {
        report = deployer.run(mode) => report?,
        _ = cancel.cancelled() => anyhow::bail!("Devnet bring-up interrupted"),
    };

    if let Some(addresses) = &report.addresses {
        for (contract, address) in addresses.iter() {
            tracing::debug!(%contract, %address, "Deployed contract");
        }
    }

    if let Some(docker) = docker {
        match docker.service_states(&report.launched).await {
            Ok(states) => println!("{}", render_states(&states)),
            Err(err) => tracing::warn!(error = %err, "Failed to read service states"),
        }
    }

    Ok(())
}
