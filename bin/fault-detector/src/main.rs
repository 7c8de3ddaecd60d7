//! CLI to run the fault detector service.

mod config;

use std::path::PathBuf;

use alloy_provider::ProviderBuilder;
use clap::Parser;
use metrics_exporter_prometheus::PrometheusBuilder;
use op_fault_detector_chain::{ChainApiClient, ChainClient, OracleAccessor};
use op_fault_detector_core::FaultDetector;
use op_fault_detector_notification::{Notifier, SlackClient};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use crate::config::{Config, LogLevel};

/// Fault detector for OP Stack output roots.
#[derive(Debug, Parser)]
#[command(name = "op-fault-detector", version)]
struct Cli {
    /// Path to the config file.
    #[arg(long, default_value = "./config.toml")]
    config: PathBuf,
}

fn init_tracing(level: LogLevel) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_directive()));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let cli = Cli::parse();
    let config = config::from_toml_path(&cli.config)?;
    config.validate()?;

    init_tracing(config.system.log_level);

    let prometheus = PrometheusBuilder::new().install_recorder()?;

    let notifier = build_notifier(&config)?;

    let fd_config = &config.fault_detector;
    let l1_provider = ProviderBuilder::new().connect(&fd_config.l1_rpc_endpoint).await?;
    let l2_provider = ProviderBuilder::new().connect(&fd_config.l2_rpc_endpoint).await?;

    let l2_client = ChainApiClient::new(l2_provider);
    let l2_chain_id = l2_client.chain_id().await?;

    let oracle = OracleAccessor::new(
        l1_provider,
        l2_chain_id,
        fd_config.l2_output_oracle_contract_address,
    )?;
    tracing::info!(
        target: "faultdetector",
        l2_chain_id,
        oracle = %oracle.address(),
        "resolved output oracle deployment"
    );

    let detector =
        FaultDetector::new(oracle, l2_client, notifier, fd_config.start_batch_index).await?;

    let cancellation = CancellationToken::new();
    let router = op_fault_detector_api::router(
        &config.api.base_path,
        &config.api.register_versions,
        detector.status(),
        prometheus,
    );
    let addr = config.api.server.socket_addr()?;

    let mut api_task =
        tokio::spawn(op_fault_detector_api::serve(addr, router, cancellation.clone()));
    let detector_task = tokio::spawn(detector.run(cancellation.clone()));

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            tracing::info!(target: "faultdetector", "received interrupt signal, shutting down");
            cancellation.cancel();
            let (api_result, detector_result) = tokio::join!(api_task, detector_task);
            detector_result?;
            api_result??;
        }
        result = &mut api_task => {
            cancellation.cancel();
            detector_task.await?;
            result??;
            eyre::bail!("http server stopped unexpectedly");
        }
    }

    tracing::info!(target: "faultdetector", "successfully stopped all services");
    Ok(())
}

fn build_notifier(config: &Config) -> eyre::Result<Notifier> {
    if !config.notification.enable {
        return Ok(Notifier::Disabled);
    }
    match &config.notification.slack {
        Some(slack) => Ok(Notifier::Slack(SlackClient::from_env(slack.channel_id.clone())?)),
        // Unreachable after validation, kept as a hard failure for direct callers.
        None => eyre::bail!("notification.slack.channel_id is required"),
    }
}
