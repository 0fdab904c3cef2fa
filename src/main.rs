use anyhow::Context;
use std::io;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

use dmarc_report::{
    Cli, ConfigManager, ConverterConfig, Output, ProgressCallback, ReportConverter, ReportError,
    RunPhase, RunProgress,
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse_args();
    let verbosity = cli.verbosity();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.log_filter()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<bool> {
    let config = ConfigManager::load_config(&cli)
        .await
        .map_err(ReportError::from)
        .context("Failed to load configuration")?;
    debug!("Using configuration: {:?}", config);

    let converter = ReportConverter::new(ConverterConfig::from(&config));

    let progress: ProgressCallback = Arc::new(|progress: RunProgress| match progress.phase {
        RunPhase::Processing => {
            if let Some(ref path) = progress.current_file {
                debug!(
                    "[{}/{}] {}",
                    progress.completed,
                    progress.total,
                    path.display()
                );
            }
        }
        phase => debug!("Phase: {:?}", phase),
    });

    let summary = converter.run_with_progress(Some(progress)).await;

    let output = Output::new(cli.verbosity());
    print!("{}", output.format_results(&summary));

    Ok(summary.is_success())
}
