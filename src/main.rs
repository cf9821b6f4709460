//! proc-cache-inspector - ranked live view of per-process CPU, resident
//! memory and executable page-cache impact.

mod cli;
mod commands;
mod config;
mod probe;
mod render;
mod residency;
mod sampler;
mod score;

use anyhow::Result;
use clap::Parser;
use std::io::Write;
use std::sync::Arc;
use tokio::{signal, time::interval};
use tracing::{debug, error, info, Level};

use cli::{Args, Commands, LogLevel};
use config::{render_config, resolve_config, validate_effective_config, Config};
use sampler::Sampler;

/// Initializes tracing logging with the resolved log level. Logs go to
/// stderr so they never corrupt the rendered table on stdout.
fn setup_logging(config: &Config, args: &Args) {
    let log_level = match &args.log_level {
        Some(LogLevel::Off) => Level::ERROR, // Off not fully supported, use ERROR as minimal
        Some(LogLevel::Error) => Level::ERROR,
        Some(LogLevel::Warn) => Level::WARN,
        Some(LogLevel::Info) => Level::INFO,
        Some(LogLevel::Debug) => Level::DEBUG,
        Some(LogLevel::Trace) => Level::TRACE,
        None => match config.log_level.as_deref() {
            Some("error") | Some("off") => Level::ERROR,
            Some("info") => Level::INFO,
            Some("debug") => Level::DEBUG,
            Some("trace") => Level::TRACE,
            _ => Level::WARN,
        },
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Early config resolution for show/check modes
    if args.show_config || args.check_config {
        let config = resolve_config(&args)?;

        if args.check_config {
            if let Err(e) = validate_effective_config(&config) {
                eprintln!("❌ Configuration invalid: {}", e);
                std::process::exit(1);
            }
            println!("✅ Configuration is valid");
            return Ok(());
        }

        println!("{}", render_config(&config, &args.config_format)?);
        return Ok(());
    }

    // Handle subcommands
    if let Some(command) = &args.command {
        let config = resolve_config(&args)?;
        if let Err(e) = validate_effective_config(&config) {
            eprintln!("❌ Configuration invalid: {}", e);
            std::process::exit(1);
        }

        return match command {
            Commands::Check {
                proc,
                residency,
                all,
            } => commands::command_check(*proc, *residency, *all, &config),
            Commands::Config { output, format } => {
                commands::command_config(output.clone(), format.clone())
            }
            Commands::Test { rounds, verbose } => {
                commands::command_test(*rounds, *verbose, &config)
            }
        };
    }

    // Load configuration for live inspector mode
    let config = resolve_config(&args)?;
    if let Err(e) = validate_effective_config(&config) {
        eprintln!("❌ Configuration invalid: {}", e);
        std::process::exit(1);
    }

    setup_logging(&config, &args);
    info!("Starting proc-cache-inspector");

    // Configure parallel probing thread pool if specified
    if let Some(threads) = config.parallelism {
        if threads > 0 {
            rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build_global()
                .unwrap_or_else(|e| error!("Failed to set rayon thread pool: {}", e));
            debug!("Rayon thread pool configured with {} threads", threads);
        }
    }

    let sampler = Arc::new(Sampler::new(config.proc_root(), config.max_processes()));
    let top_n = config.top_n();
    let clear = config.clear_screen();
    let tick = config.interval();

    info!(
        "Sampling {} every {}s (top {} displayed)",
        config.proc_root().display(),
        tick.as_secs(),
        top_n
    );

    // Scheduled sampling task: one full round per tick
    let loop_sampler = sampler.clone();
    let mut sampling_task = tokio::spawn(async move {
        let mut ticker = interval(tick);
        loop {
            ticker.tick().await;

            let samples = loop_sampler.sample_round();
            let ranked = score::rank(samples);
            let summary = score::summarize(&ranked);
            debug!(
                "round complete: {} processes, total cpu {:.2}%, {} baselines tracked",
                summary.process_count,
                summary.total_cpu_percent,
                loop_sampler.tracked_pids()
            );

            if clear {
                if let Err(e) = render::clear_screen() {
                    debug!("failed to clear terminal: {}", e);
                }
            }
            print!(
                "{}",
                render::render_round(&ranked, &summary, top_n, tick.as_secs())
            );
            std::io::stdout().flush().ok();
        }
    });

    // Setup graceful shutdown signal handlers
    let shutdown_signal = async {
        let ctrl_c = async {
            signal::ctrl_c()
                .await
                .expect("Failed to install Ctrl+C handler");
        };

        #[cfg(unix)]
        let terminate = async {
            signal::unix::signal(signal::unix::SignalKind::terminate())
                .expect("Failed to install signal handler")
                .recv()
                .await;
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {
                info!("Received SIGINT (Ctrl+C), shutting down gracefully...");
            }
            _ = terminate => {
                info!("Received SIGTERM, shutting down gracefully...");
            }
        }
    };

    tokio::select! {
        result = &mut sampling_task => {
            if let Err(e) = result {
                error!("Sampling task terminated unexpectedly: {}", e);
            }
        }
        _ = shutdown_signal => {
            info!("Shutdown signal received, exiting...");
        }
    }

    // Cleanup: cancel sampling task before exit
    sampling_task.abort();
    let _ = sampling_task.await;

    info!("proc-cache-inspector stopped gracefully");
    Ok(())
}
