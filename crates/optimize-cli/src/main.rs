//! Thin CLI shell around `optimize_core::execute` (spec §10.5).

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use optimize_core::{Options, ProgressEvent, ProgressStatus};

#[derive(Parser)]
#[command(name = "optimize-cli")]
#[command(about = "Optimize a glTF 2.0 binary asset", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the optimization pipeline over one asset
    Run {
        /// Source .glb file
        input: PathBuf,

        /// Destination .glb file
        output: PathBuf,

        /// Named preset (fast, balanced, maximum); mutually exclusive with --config
        #[arg(long, value_name = "NAME")]
        preset: Option<String>,

        /// Path to a JSON file holding a full `Options` object
        #[arg(long, value_name = "PATH")]
        config: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Run { input, output, preset, config } => run(input, output, preset, config),
    }
}

fn run(input: PathBuf, output: PathBuf, preset: Option<String>, config: Option<PathBuf>) -> ExitCode {
    let options = match load_options(preset.as_deref(), config.as_deref()) {
        Ok(opts) => opts,
        Err(message) => {
            print_error("InvalidOptions", &message);
            return ExitCode::FAILURE;
        }
    };

    let mut sink = |event: ProgressEvent| {
        let marker = match event.status {
            ProgressStatus::Start => "start",
            ProgressStatus::Done => "done",
            ProgressStatus::Error => "error",
        };
        eprintln!(
            "[{}/{}] {} {}{}",
            event.index + 1,
            event.total,
            event.step,
            marker,
            event
                .duration_ms
                .map(|ms| format!(" ({ms}ms)"))
                .unwrap_or_default(),
        );
    };

    match optimize_core::execute(&input, &output, &options, Some(&mut sink)) {
        Ok(result) if result.success => {
            println!("{}", serde_json::to_string_pretty(&result).unwrap_or_default());
            ExitCode::SUCCESS
        }
        Ok(result) => {
            println!("{}", serde_json::to_string_pretty(&result).unwrap_or_default());
            ExitCode::FAILURE
        }
        Err(err) => {
            print_error(err.kind(), &err.to_string());
            ExitCode::FAILURE
        }
    }
}

fn load_options(preset: Option<&str>, config: Option<&std::path::Path>) -> Result<Options, String> {
    match (preset, config) {
        (Some(_), Some(_)) => Err("--preset and --config are mutually exclusive".to_string()),
        (Some(name), None) => {
            Options::preset(name).ok_or_else(|| format!("unknown preset `{name}`"))
        }
        (None, Some(path)) => {
            let text = std::fs::read_to_string(path).map_err(|e| e.to_string())?;
            serde_json::from_str(&text).map_err(|e| e.to_string())
        }
        (None, None) => Ok(Options::default()),
    }
}

fn print_error(kind: &str, message: &str) {
    let body = serde_json::json!({ "error": { "kind": kind, "message": message } });
    println!("{}", serde_json::to_string_pretty(&body).unwrap_or_default());
}
