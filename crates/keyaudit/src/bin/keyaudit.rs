//! keyaudit: scans every file listed in a CSV or workbook manifest for
//! configured keywords and records one outcome per file. With
//! `--check-exists` it only records whether each listed path is present.
//!
//! Exit codes: 0 completed, 1 configuration error, 2 run aborted,
//! 130 cancelled by signal.

use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::{error, info, warn};

use keyaudit::alert::{AlertAggregator, AlertNotifier, LogNotifier, WebhookNotifier};
use keyaudit::config::{self, Config};
use keyaudit::sanitize;
use keyaudit::sink::{ResultSink, SinkPaths};
use keyaudit::{logging, ExistenceCheck, ScanPipeline};

const EXIT_CONFIG: u8 = 1;
const EXIT_FATAL: u8 = 2;
const EXIT_CANCELLED: u8 = 130;

/// Concurrent keyword audit over documents, spreadsheets, text and archives.
#[derive(Parser, Debug)]
#[command(name = "keyaudit", version, about)]
struct Cli {
    /// Path to the YAML settings file.
    #[arg(long, short, env = "KEYAUDIT_CONFIG", default_value = "config/settings.yaml")]
    config: PathBuf,

    /// Manifest CSV or workbook to scan, overriding `file_paths.csv`.
    #[arg(long, env = "KEYAUDIT_MANIFEST")]
    manifest: Option<PathBuf>,

    /// Number of scan workers, overriding `worker_count`.
    #[arg(long, short, env = "KEYAUDIT_WORKERS")]
    workers: Option<usize>,

    /// Output file base, overriding `logging.file_base`.
    #[arg(long, env = "KEYAUDIT_OUTPUT_BASE")]
    output_base: Option<String>,

    /// Send errors still buffered below the alert threshold at the end.
    #[arg(long)]
    flush_on_finish: bool,

    /// Only check that each listed path exists; writes
    /// `{output_base}_file_check.csv`.
    #[arg(long)]
    check_exists: bool,

    /// Never draw the progress bar.
    #[arg(long)]
    no_progress: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut config = match config::load_config(&cli.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("keyaudit: {}", e);
            return ExitCode::from(EXIT_CONFIG);
        }
    };
    apply_overrides(&mut config, &cli);

    if let Err(e) = logging::init(&config.logging) {
        eprintln!("keyaudit: {}", e);
        return ExitCode::from(EXIT_CONFIG);
    }

    info!(path = %cli.config.display(), "Loaded configuration");

    if config.worker_count == 0 {
        error!("worker count must be at least 1");
        return ExitCode::from(EXIT_CONFIG);
    }

    let shutdown = Arc::new(AtomicBool::new(false));
    let handler_flag = Arc::clone(&shutdown);
    if let Err(e) = ctrlc::set_handler(move || {
        handler_flag.store(true, Ordering::Relaxed);
    }) {
        warn!("Failed to install signal handler: {}", e);
    }
    let show_progress = !cli.no_progress && std::io::stderr().is_terminal();
    let manifest = PathBuf::from(&config.file_paths.csv);

    if cli.check_exists {
        let output = PathBuf::from(format!("{}_file_check.csv", config.logging.file_base));
        let check = ExistenceCheck::new()
            .with_shutdown(Arc::clone(&shutdown))
            .with_progress(show_progress);
        return match check.run(&manifest, &output, config.worker_count) {
            Ok(summary) => {
                println!("{}", summary);
                println!("Results: {}", output.display());
                if summary.cancelled {
                    ExitCode::from(EXIT_CANCELLED)
                } else {
                    ExitCode::SUCCESS
                }
            }
            Err(e) => {
                error!("Existence check aborted: {}", e);
                ExitCode::from(EXIT_FATAL)
            }
        };
    }

    let notifier: Arc<dyn AlertNotifier> = match build_notifier(&config) {
        Ok(notifier) => notifier,
        Err(message) => {
            error!("{}", message);
            return ExitCode::from(EXIT_CONFIG);
        }
    };
    let alerts = Arc::new(AlertAggregator::new(
        config.notifications.error_threshold,
        notifier,
    ));

    let sink_paths = SinkPaths::from_base(&config.logging.file_base);
    let sink = match ResultSink::create(&sink_paths) {
        Ok(sink) => Arc::new(sink),
        Err(e) => {
            error!("{}", e);
            return ExitCode::from(EXIT_FATAL);
        }
    };

    let pipeline = ScanPipeline::new(&config.keywords.a, &config.keywords.b, sink, alerts)
        .with_shutdown(Arc::clone(&shutdown))
        .with_final_flush(config.notifications.flush_on_finish)
        .with_progress(show_progress);

    match pipeline.run(&manifest, config.worker_count) {
        Ok(summary) => {
            println!("{}", summary);
            println!(
                "Results: {} and {}",
                sink_paths.structured.display(),
                sink_paths.narrative.display()
            );
            if summary.cancelled {
                ExitCode::from(EXIT_CANCELLED)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            error!("Scan aborted: {}", e);
            ExitCode::from(EXIT_FATAL)
        }
    }
}

fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(manifest) = &cli.manifest {
        config.file_paths.csv = manifest.to_string_lossy().into_owned();
    }
    if let Some(workers) = cli.workers {
        config.worker_count = workers;
    }
    if let Some(base) = &cli.output_base {
        config.logging.file_base = base.clone();
    }
    if cli.flush_on_finish {
        config.notifications.flush_on_finish = true;
    }
}

fn build_notifier(config: &Config) -> Result<Arc<dyn AlertNotifier>, String> {
    let url = config::resolve_webhook_url(config).map_err(|e| e.to_string())?;

    match url {
        Some(url) => {
            let timeout = Duration::from_secs(config.notifications.timeout_secs);
            info!(
                endpoint = %sanitize::redact_url(secrecy::ExposeSecret::expose_secret(&url)),
                threshold = config.notifications.error_threshold,
                "Webhook alerts enabled"
            );
            let notifier = WebhookNotifier::new(url, timeout)
                .map_err(|e| format!("Failed to build webhook client: {}", e))?;
            Ok(Arc::new(notifier))
        }
        None => {
            warn!("No webhook configured; error alerts will only be logged");
            Ok(Arc::new(LogNotifier))
        }
    }
}
