mod metrics;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::NaiveDateTime;
use clap::{ArgGroup, Parser};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use flexprep_core::{
    load_config, validate_config, CommandPreprocessor, CompletionStore, Config, FileDescriptor,
    FsObjectStore, HttpObjectStore, LogFormat, ObjectStore, Processing, ProcessingReport,
    SqliteCompletionStore, StorageBackend,
};

#[derive(Parser, Debug)]
#[command(
    name = "flexprep",
    version,
    about = "Run one FLEXPART input preprocessing step"
)]
#[command(group(ArgGroup::new("source").required(true).args(["batch", "run"])))]
struct Cli {
    /// JSON file holding the batch of file descriptors
    batch: Option<PathBuf>,

    /// Process the registered files of the run with this reference time
    #[arg(long, value_name = "FORECAST_REF_TIME", value_parser = parse_ref_time)]
    run: Option<NaiveDateTime>,

    /// Configuration file
    #[arg(long, env = "FLEXPREP_CONFIG", default_value = "flexprep.toml")]
    config: PathBuf,
}

impl Cli {
    fn invocation(&self) -> Result<Invocation> {
        match (&self.batch, self.run) {
            (Some(path), None) => Ok(Invocation::BatchFile(path.clone())),
            (None, Some(forecast_ref_time)) => Ok(Invocation::Run(forecast_ref_time)),
            _ => bail!("exactly one of <BATCH> or --run is required"),
        }
    }
}

/// Where the batch of one invocation comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Invocation {
    /// JSON array of file descriptors.
    BatchFile(PathBuf),
    /// Every registered row of a forecast run.
    Run(NaiveDateTime),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        error!("Fatal error: {:#}", e);
        eprintln!("flexprep: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let invocation = cli.invocation()?;
    let config_path = cli.config;

    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;
    validate_config(&config).context("Configuration validation failed")?;

    init_logging(&config);
    info!("Configuration loaded from {:?}", config_path);
    info!("Database path: {:?}", config.database.path);

    let completion = Arc::new(
        SqliteCompletionStore::new(&config.database.path)
            .context("Failed to open completion store")?,
    );

    let batch = match &invocation {
        Invocation::BatchFile(path) => {
            let batch = read_batch(path)?;
            // Rows must exist before they can be marked.
            for descriptor in &batch {
                completion
                    .register(descriptor)
                    .with_context(|| format!("Failed to register row {}", descriptor.row_id))?;
            }
            batch
        }
        Invocation::Run(forecast_ref_time) => completion
            .list_run(*forecast_ref_time)
            .with_context(|| format!("Failed to list files of run {}", forecast_ref_time))?,
    };
    info!("Batch of {} files", batch.len());

    let result = match config.storage.backend {
        StorageBackend::Http => {
            let http = config
                .storage
                .http
                .clone()
                .context("storage.http is not configured")?;
            let store = HttpObjectStore::new(http).context("Failed to create HTTP store")?;
            process_batch(&config, store, completion, batch).await
        }
        StorageBackend::Filesystem => {
            let fs = config
                .storage
                .filesystem
                .clone()
                .context("storage.filesystem is not configured")?;
            process_batch(&config, FsObjectStore::new(fs), completion, batch).await
        }
    };

    if let Some(path) = &config.metrics.textfile {
        if let Err(e) = metrics::write_textfile(path) {
            warn!("Failed to export metrics: {:#}", e);
        }
    }

    let report = result?;
    info!(
        run_id = %report.run_id,
        row_id = %report.row_id,
        key = %report.artifact.key,
        size_bytes = report.artifact.size_bytes,
        missing_inputs = report.missing_inputs.len(),
        total_duration_ms = report.total_duration_ms,
        "Preprocessing step complete"
    );

    Ok(())
}

async fn process_batch<S: ObjectStore>(
    config: &Config,
    store: S,
    completion: Arc<SqliteCompletionStore>,
    batch: Vec<FileDescriptor>,
) -> Result<ProcessingReport> {
    info!("Using object store: {}", store.name());
    let preprocessor = CommandPreprocessor::new(config.preprocessor.clone());
    let processing = Processing::new(config.staging.clone(), store, preprocessor, completion);

    processing
        .process(batch)
        .await
        .context("Preprocessing step failed")
}

fn init_logging(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    let (text, json) = match config.logging.format {
        LogFormat::Text => (Some(tracing_subscriber::fmt::layer()), None),
        LogFormat::Json => (None, Some(tracing_subscriber::fmt::layer().json())),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(text)
        .with(json)
        .init();
}

fn parse_ref_time(value: &str) -> Result<NaiveDateTime, String> {
    value
        .parse::<NaiveDateTime>()
        .map_err(|e| format!("expected YYYY-MM-DDTHH:MM:SS ({})", e))
}

fn read_batch(path: &Path) -> Result<Vec<FileDescriptor>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read batch file {:?}", path))?;
    serde_json::from_str(&content).with_context(|| format!("Invalid batch file {:?}", path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn parse(args: &[&str]) -> Result<Invocation> {
        let cli = Cli::try_parse_from(std::iter::once("flexprep").chain(args.iter().copied()))?;
        cli.invocation()
    }

    #[test]
    fn test_parse_batch_file() {
        let invocation = parse(&["batch.json"]).unwrap();
        assert_eq!(invocation, Invocation::BatchFile(PathBuf::from("batch.json")));
    }

    #[test]
    fn test_parse_run() {
        let invocation = parse(&["--run", "2024-03-01T00:00:00"]).unwrap();
        let expected = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(invocation, Invocation::Run(expected));
    }

    #[test]
    fn test_parse_config_flag() {
        let cli = Cli::try_parse_from([
            "flexprep",
            "--config",
            "/etc/flexprep.toml",
            "batch.json",
        ])
        .unwrap();
        assert_eq!(cli.config, PathBuf::from("/etc/flexprep.toml"));
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(parse(&[]).is_err());
        assert!(parse(&["--run"]).is_err());
        assert!(parse(&["--run", "yesterday"]).is_err());
        assert!(parse(&["--verbose"]).is_err());
        assert!(parse(&["a.json", "b.json"]).is_err());
        assert!(parse(&["batch.json", "--run", "2024-03-01T00:00:00"]).is_err());
    }

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_read_batch_accepts_string_steps() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("batch.json");
        std::fs::write(
            &path,
            r#"[
                {"row_id": 1, "forecast_ref_time": "2024-03-01T00:00:00", "step": 0, "key": "ifs/a_000"},
                {"row_id": "2", "forecast_ref_time": "2024-03-01T00:00:00", "step": "3", "key": "ifs/a_003"}
            ]"#,
        )
        .unwrap();

        let batch = read_batch(&path).unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0].row_id, "1");
        assert_eq!(batch[1].step, 3);
    }

    #[test]
    fn test_read_batch_invalid_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("batch.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(read_batch(&path).is_err());
    }
}
