//! Sensor Monitor CLI - Command-line shell for the sensor health core
//!
//! Commands:
//! - run: Process NDJSON requests from stdin (interactive/streaming mode)
//! - score: Compute the health score and status of one reading
//! - predict: Predict the status of one reading with the classifier
//! - summary: Print per-sensor statistics
//! - export: Write the reading snapshot
//! - doctor: Diagnose configuration and classifier training

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use sensor_health::input::parse_features;
use sensor_health::types::{SensorReading, StoreSummary};
use sensor_health::{
    Features, MonitorConfig, MonitorError, Response, SensorMonitor, MONITOR_VERSION, PRODUCER_NAME,
};
use tracing_subscriber::EnvFilter;

/// Sensor Monitor - health scoring and status prediction for structural sensors
#[derive(Parser)]
#[command(name = "sensor-monitor")]
#[command(version = MONITOR_VERSION)]
#[command(about = "Score, label and classify structural sensor readings", long_about = None)]
struct Cli {
    /// Configuration file (JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the health threshold
    #[arg(long, global = true)]
    threshold: Option<f64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process NDJSON requests from stdin, one response per line
    Run {
        /// Load a reading snapshot instead of the seed readings
        #[arg(long)]
        load: Option<PathBuf>,

        /// Save the reading snapshot on exit
        #[arg(long)]
        save: Option<PathBuf>,

        /// Flush output after each response
        #[arg(long, default_value_t = true, action = ArgAction::Set)]
        flush: bool,
    },

    /// Compute health score and threshold status
    Score {
        #[command(flatten)]
        measurements: Measurements,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Predict status with the trained classifier
    Predict {
        #[command(flatten)]
        measurements: Measurements,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print per-sensor statistics
    Summary {
        /// Load a reading snapshot instead of the seed readings
        #[arg(long)]
        load: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write the reading snapshot
    Export {
        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Output format
        #[arg(long, default_value = "json-pretty")]
        format: ExportFormat,

        /// Load a reading snapshot instead of the seed readings
        #[arg(long)]
        load: Option<PathBuf>,
    },

    /// Diagnose configuration and classifier training
    Doctor {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(clap::Args)]
struct Measurements {
    /// Temperature (°C)
    #[arg(long, allow_hyphen_values = true)]
    temperature: String,

    /// Stress
    #[arg(long, allow_hyphen_values = true)]
    stress: String,

    /// Displacement
    #[arg(long, allow_hyphen_values = true)]
    displacement: String,
}

impl Measurements {
    /// Parse through the same boundary checks as the request protocol
    fn features(&self) -> Result<Features, MonitorError> {
        parse_features(&self.temperature, &self.stress, &self.displacement)
    }
}

#[derive(Clone, ValueEnum)]
enum ExportFormat {
    /// JSON array of readings
    Json,
    /// Pretty-printed JSON array
    JsonPretty,
    /// Newline-delimited JSON (one reading per line)
    Ndjson,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliErrorReport::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config = load_config(cli.config.as_deref(), cli.threshold)?;

    match cli.command {
        Commands::Run { load, save, flush } => {
            cmd_run(config, load.as_deref(), save.as_deref(), flush)
        }
        Commands::Score { measurements, json } => cmd_score(config, &measurements, json),
        Commands::Predict { measurements, json } => cmd_predict(config, &measurements, json),
        Commands::Summary { load, json } => cmd_summary(config, load.as_deref(), json),
        Commands::Export {
            output,
            format,
            load,
        } => cmd_export(config, &output, format, load.as_deref()),
        Commands::Doctor { json } => cmd_doctor(config, json),
    }
}

fn load_config(path: Option<&Path>, threshold: Option<f64>) -> Result<MonitorConfig, CliError> {
    let mut config = match path {
        Some(path) => MonitorConfig::from_json(&fs::read_to_string(path)?)?,
        None => MonitorConfig::default(),
    };
    if let Some(threshold) = threshold {
        config.threshold = threshold;
    }
    config.validate()?;
    Ok(config)
}

fn start_monitor(config: MonitorConfig, load: Option<&Path>) -> Result<SensorMonitor, CliError> {
    let mut monitor = SensorMonitor::bootstrap(config).map_err(CliError::Training)?;
    if let Some(path) = load {
        let snapshot = fs::read_to_string(path)?;
        monitor.load_snapshot(&snapshot)?;
    }
    Ok(monitor)
}

fn cmd_run(
    config: MonitorConfig,
    load: Option<&Path>,
    save: Option<&Path>,
    flush: bool,
) -> Result<(), CliError> {
    let mut monitor = start_monitor(config, load)?;

    let interactive = atty::is(atty::Stream::Stdin);
    if interactive {
        eprintln!(
            "{} {} ready: {} readings loaded, one JSON request per line",
            PRODUCER_NAME,
            MONITOR_VERSION,
            monitor.store().len()
        );
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let response = monitor.handle_json(trimmed);
        writeln!(stdout, "{}", serde_json::to_string(&response)?)?;
        if flush {
            stdout.flush()?;
        }
    }
    stdout.flush()?;

    if let Some(path) = save {
        fs::write(path, monitor.save_snapshot()?)?;
    }

    Ok(())
}

fn cmd_score(
    config: MonitorConfig,
    measurements: &Measurements,
    json: bool,
) -> Result<(), CliError> {
    let features = measurements.features()?;
    let monitor = start_monitor(config, None)?;
    let (health_score, status) = monitor.score(&features);

    if json {
        let response = Response::Score {
            health_score,
            status,
        };
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        println!("Health score: {:.2}", health_score);
        println!(
            "Status:       {} ({}, threshold {})",
            status.as_u8(),
            status,
            monitor.labeler().threshold()
        );
    }
    Ok(())
}

fn cmd_predict(
    config: MonitorConfig,
    measurements: &Measurements,
    json: bool,
) -> Result<(), CliError> {
    let features = measurements.features()?;
    let monitor = start_monitor(config, None)?;
    let predicted_status = monitor.predict_only(&features);

    if json {
        let response = Response::Prediction { predicted_status };
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        let probability = monitor.classifier().healthy_probability(&features);
        println!(
            "Predicted status: {} ({})",
            predicted_status.as_u8(),
            predicted_status
        );
        println!("Healthy votes:    {:.1}%", probability * 100.0);
    }
    Ok(())
}

fn cmd_summary(config: MonitorConfig, load: Option<&Path>, json: bool) -> Result<(), CliError> {
    let monitor = start_monitor(config, load)?;
    let summary = monitor.summary();
    let counts = monitor.status_counts();

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    print_summary(&summary);
    println!();
    println!(
        "Status: {} healthy, {} unhealthy{}",
        counts.healthy,
        counts.unhealthy,
        counts
            .healthy_pct()
            .map(|pct| format!(" ({:.1}% healthy)", pct))
            .unwrap_or_default()
    );
    Ok(())
}

fn print_summary(summary: &StoreSummary) {
    println!("Summary per sensor");
    println!("==================");
    println!(
        "{:<10} {:>3}  {:>24}  {:>24}  {:>30}",
        "sensor",
        "n",
        "temperature mean/min/max",
        "stress mean/min/max",
        "displacement mean/min/max"
    );
    for s in &summary.sensors {
        println!(
            "{:<10} {:>3}  {:>8.2}/{:>7.2}/{:>7.2}  {:>8.2}/{:>7.2}/{:>7.2}  {:>10.5}/{:>9.5}/{:>9.5}",
            s.sensor_id,
            s.readings,
            s.temperature.mean,
            s.temperature.min,
            s.temperature.max,
            s.stress.mean,
            s.stress.min,
            s.stress.max,
            s.displacement.mean,
            s.displacement.min,
            s.displacement.max,
        );
    }

    println!();
    println!(
        "Sensor with highest average stress: {}",
        summary.highest_mean_stress.as_deref().unwrap_or("-")
    );

    println!();
    println!(
        "Readings with temperature > {:.1}:",
        summary.high_temperature_cutoff
    );
    for r in &summary.high_temperature {
        println!("  {}", format_reading(r));
    }
}

fn format_reading(r: &SensorReading) -> String {
    format!(
        "{} {} temp={} stress={} disp={} score={:.2} status={}",
        r.sensor_id,
        r.timestamp.format(sensor_health::types::TIMESTAMP_FORMAT),
        r.temperature,
        r.stress,
        r.displacement,
        r.health_score,
        r.status.as_u8()
    )
}

fn cmd_export(
    config: MonitorConfig,
    output: &Path,
    format: ExportFormat,
    load: Option<&Path>,
) -> Result<(), CliError> {
    let monitor = start_monitor(config, load)?;
    let readings = monitor.export_snapshot();

    let data = match format {
        ExportFormat::Json => serde_json::to_string(&readings)?,
        ExportFormat::JsonPretty => serde_json::to_string_pretty(&readings)?,
        ExportFormat::Ndjson => {
            let mut lines = Vec::with_capacity(readings.len());
            for r in &readings {
                lines.push(serde_json::to_string(r)?);
            }
            lines.join("\n") + "\n"
        }
    };

    if output.to_string_lossy() == "-" {
        print!("{}", data);
    } else {
        fs::write(output, data)?;
    }
    Ok(())
}

fn cmd_doctor(config: MonitorConfig, json: bool) -> Result<(), CliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck {
        name: "version".to_string(),
        status: CheckStatus::Ok,
        message: format!("{} {}", PRODUCER_NAME, MONITOR_VERSION),
    });

    let threshold_in_range = (0.0..=100.0).contains(&config.threshold);
    checks.push(DoctorCheck {
        name: "config".to_string(),
        status: if threshold_in_range {
            CheckStatus::Ok
        } else {
            CheckStatus::Warning
        },
        message: if threshold_in_range {
            format!(
                "threshold {}, {} trees, seed {}",
                config.threshold, config.forest.n_trees, config.forest.seed
            )
        } else {
            format!(
                "threshold {} is outside the 0-100 score range, every reading gets the same label",
                config.threshold
            )
        },
    });

    match SensorMonitor::bootstrap(config) {
        Ok(monitor) => {
            let info = monitor.classifier().info();
            checks.push(DoctorCheck {
                name: "classifier".to_string(),
                status: CheckStatus::Ok,
                message: format!(
                    "model {} trained on {} readings ({} healthy, {} unhealthy)",
                    info.model_id,
                    info.training_samples,
                    info.class_counts.healthy,
                    info.class_counts.unhealthy
                ),
            });
        }
        Err(e) => {
            checks.push(DoctorCheck {
                name: "classifier".to_string(),
                status: CheckStatus::Error,
                message: e.to_string(),
            });
        }
    }

    let stdin_check = if atty::is(atty::Stream::Stdin) {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a TTY (interactive mode)".to_string(),
        }
    } else {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a pipe (streaming mode ready)".to_string(),
        }
    };
    checks.push(stdin_check);

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: MONITOR_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Sensor Monitor Doctor Report");
        println!("============================");
        for check in &report.checks {
            let status_icon = match check.status {
                CheckStatus::Ok => "[OK]",
                CheckStatus::Warning => "[WARN]",
                CheckStatus::Error => "[ERR]",
            };
            println!("  {} {}: {}", status_icon, check.name, check.message);
        }
    }

    let has_errors = report
        .checks
        .iter()
        .any(|c| matches!(c.status, CheckStatus::Error));
    if has_errors {
        Err(CliError::DoctorFailed)
    } else {
        Ok(())
    }
}

// Error types

#[derive(Debug)]
enum CliError {
    Io(io::Error),
    Monitor(MonitorError),
    Training(MonitorError),
    Json(serde_json::Error),
    DoctorFailed,
}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        CliError::Io(e)
    }
}

impl From<MonitorError> for CliError {
    fn from(e: MonitorError) -> Self {
        CliError::Monitor(e)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliErrorReport {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<CliError> for CliErrorReport {
    fn from(e: CliError) -> Self {
        match e {
            CliError::Io(e) => CliErrorReport {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            CliError::Monitor(e) => CliErrorReport {
                code: e.code().to_string(),
                hint: if e.is_input_error() {
                    Some("Check the input values".to_string())
                } else {
                    Some("Check the configuration and snapshot files".to_string())
                },
                message: e.to_string(),
            },
            CliError::Training(e) => CliErrorReport {
                code: e.code().to_string(),
                message: e.to_string(),
                hint: Some(
                    "The seed dataset must contain both healthy and unhealthy readings".to_string(),
                ),
            },
            CliError::Json(e) => CliErrorReport {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            CliError::DoctorFailed => CliErrorReport {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct DoctorReport {
    producer: String,
    version: String,
    checks: Vec<DoctorCheck>,
}

#[derive(serde::Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

#[derive(serde::Serialize)]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("sensor-monitor").chain(args.iter().copied())).unwrap()
    }

    fn measurements(cli: Cli) -> Measurements {
        match cli.command {
            Commands::Score { measurements, .. } | Commands::Predict { measurements, .. } => {
                measurements
            }
            _ => panic!("expected a measurement command"),
        }
    }

    #[test]
    fn test_score_rejects_non_finite_measurement() {
        for bad in ["NaN", "inf", "-inf", "warm"] {
            let cli = parse(&[
                "score",
                "--temperature",
                bad,
                "--stress",
                "12",
                "--displacement",
                "0.002",
            ]);
            let err = measurements(cli).features().unwrap_err();
            let report = CliErrorReport::from(CliError::from(err));
            assert_eq!(report.code, "INVALID_MEASUREMENT", "input {bad:?}");
        }
    }

    #[test]
    fn test_predict_parses_negative_measurements() {
        let cli = parse(&[
            "predict",
            "--temperature",
            "-5",
            "--stress",
            "12",
            "--displacement",
            "0.002",
        ]);
        assert_eq!(
            measurements(cli).features().unwrap(),
            Features::new(-5.0, 12.0, 0.002)
        );
    }

    #[test]
    fn test_run_flush_can_be_disabled() {
        match parse(&["run"]).command {
            Commands::Run { flush, .. } => assert!(flush),
            _ => panic!("expected run"),
        }
        match parse(&["run", "--flush", "false"]).command {
            Commands::Run { flush, .. } => assert!(!flush),
            _ => panic!("expected run"),
        }
    }
}
