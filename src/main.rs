use anyhow::Context;
use clap::Parser;
use std::process;
use storm_impact::cli::Args;
use storm_impact::processor::StormAnalysis;
use tokio_util::sync::CancellationToken;
use tracing::debug;

fn main() {
    let args = Args::parse();
    setup_logging(&args);

    let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
        eprintln!("Failed to create async runtime: {}", e);
        process::exit(1);
    });

    match runtime.block_on(run(args)) {
        Ok(()) => process::exit(0),
        Err(error) => {
            eprintln!("Error: {:#}", error);
            process::exit(1);
        }
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    let config = args.to_config().context("Invalid configuration")?;
    let analysis = StormAnalysis::new(config)?;

    // Ctrl-C only cancels; the run stops at its next checkpoint
    let cancellation_token = CancellationToken::new();
    let shutdown_signal = tokio::spawn({
        let token = cancellation_token.clone();
        async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    eprintln!("\nReceived CTRL+C, shutting down...");
                    token.cancel();
                }
                Err(e) => eprintln!("Failed to listen for CTRL+C: {}", e),
            }
        }
    });

    let result = analysis.run_with_cancellation(cancellation_token).await;
    shutdown_signal.abort();
    result.context("Storm impact analysis failed")?;
    Ok(())
}

/// Set up structured logging on stderr
fn setup_logging(args: &Args) {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.log_level();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("storm_impact={}", log_level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_timer(fmt::time::uptime())
                .with_writer(std::io::stderr),
        )
        .init();

    debug!("Logging initialized at level: {}", log_level);
}
