// remrecon - two-ledger reconciliation with a reduction proof

mod exit_codes;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use rem_recon::ProofConfig;
use rem_recon_cli::{proof, synth};
use rem_recon_io::IoError;
use tracing_subscriber::EnvFilter;

use exit_codes::{
    EXIT_EQUIVALENCE_FAILED, EXIT_INVALID_CONFIG, EXIT_IO, EXIT_MALFORMED_INPUT, EXIT_SUCCESS,
};

#[derive(Parser)]
#[command(name = "remrecon")]
#[command(about = "Reconcile two ledgers and prove a reduced dataset reproduces every mismatch")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a synthetic ledger pair with known breaks
    #[command(after_help = "\
Examples:
  remrecon generate --out-dir data
  remrecon generate --out-dir data --n 5000 --seed 7")]
    Generate {
        /// Directory for ledger_A.csv, ledger_B.csv and injected_breaks.json
        #[arg(long)]
        out_dir: PathBuf,

        /// Base transactions per ledger (before breaks)
        #[arg(long, default_value_t = synth::DEFAULT_ROWS)]
        n: usize,

        /// RNG seed
        #[arg(long, default_value_t = synth::DEFAULT_SEED)]
        seed: u64,
    },

    /// Reconcile, reduce, and write all artifacts plus a SHA-256 manifest
    #[command(after_help = "\
Examples:
  remrecon run --data-dir data --out-dir out
  remrecon run --data-dir data --out-dir out --json
  remrecon run --data-dir data --out-dir out --config proof.toml")]
    Run {
        /// Directory holding both ledgers
        #[arg(long)]
        data_dir: PathBuf,

        /// Directory for results, reduced ledgers and the manifest
        #[arg(long)]
        out_dir: PathBuf,

        /// Optional TOML file overriding file names
        #[arg(long)]
        config: Option<PathBuf>,

        /// Print the run summary as JSON to stdout
        #[arg(long)]
        json: bool,
    },

    /// Check a written reduced result against the full one (exit 6 on failure)
    #[command(after_help = "\
Examples:
  remrecon verify --out-dir out
  remrecon verify --out-dir out --json
  remrecon verify --out-dir out --config proof.toml")]
    Verify {
        /// Directory written by `remrecon run`
        #[arg(long)]
        out_dir: PathBuf,

        /// Optional TOML file overriding file names
        #[arg(long)]
        config: Option<PathBuf>,

        /// Print the verdict as JSON instead of the one-line message
        #[arg(long)]
        json: bool,
    },

    /// Run then verify
    #[command(after_help = "\
Examples:
  remrecon prove --data-dir data --out-dir out")]
    Prove {
        #[arg(long)]
        data_dir: PathBuf,

        #[arg(long)]
        out_dir: PathBuf,

        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Validate a proof config without running
    #[command(after_help = "\
Examples:
  remrecon validate-config proof.toml")]
    ValidateConfig {
        /// Path to the TOML config
        config: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    let result = match cli.command {
        Commands::Generate { out_dir, n, seed } => cmd_generate(&out_dir, n, seed),
        Commands::Run { data_dir, out_dir, config, json } => {
            cmd_run(&data_dir, &out_dir, config.as_deref(), json)
        }
        Commands::Verify { out_dir, config, json } => cmd_verify(&out_dir, config.as_deref(), json),
        Commands::Prove { data_dir, out_dir, config } => {
            cmd_run(&data_dir, &out_dir, config.as_deref(), false)
                .and_then(|_| cmd_verify(&out_dir, config.as_deref(), false))
        }
        Commands::ValidateConfig { config } => cmd_validate_config(&config),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

/// Logs go to stderr. Quiet by default; `RUST_LOG=info` shows file activity.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    fn new(code: u8, msg: impl Into<String>) -> Self {
        Self { code, message: msg.into(), hint: None }
    }

    fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<IoError> for CliError {
    fn from(err: IoError) -> Self {
        let code = match &err {
            IoError::Read { .. } | IoError::Write { .. } => EXIT_IO,
            IoError::Csv { source, .. } if source.is_io_error() => EXIT_IO,
            IoError::Csv { .. } | IoError::Json { .. } | IoError::Record { .. } => {
                EXIT_MALFORMED_INPUT
            }
        };
        let hint = match &err {
            IoError::Record { .. } => Some(
                "each row needs ledger, trace_id, timestamp_iso, amount_cents (integer), currency, direction (DEBIT|CREDIT)",
            ),
            _ => None,
        };
        let out = CliError::new(code, err.to_string());
        match hint {
            Some(h) => out.with_hint(h),
            None => out,
        }
    }
}

impl From<proof::ProofError> for CliError {
    fn from(err: proof::ProofError) -> Self {
        match err {
            proof::ProofError::Io(e) => e.into(),
            proof::ProofError::Recon(e) => CliError::new(EXIT_MALFORMED_INPUT, e.to_string())
                .with_hint("amount sums must stay within signed 64-bit minor units"),
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<ProofConfig, CliError> {
    let Some(path) = path else {
        return Ok(ProofConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .map_err(|e| CliError::new(EXIT_IO, format!("cannot read config {}: {e}", path.display())))?;
    ProofConfig::from_toml(&text)
        .map_err(|e| CliError::new(EXIT_INVALID_CONFIG, format!("{}: {e}", path.display())))
}

// ============================================================================
// generate
// ============================================================================

fn cmd_generate(out_dir: &Path, n: usize, seed: u64) -> Result<(), CliError> {
    let data = synth::generate(n, seed);
    let paths = synth::write_synthetic(out_dir, &data)?;

    eprintln!("wrote {} rows to {}", data.ledger_a.len(), paths.ledger_a.display());
    eprintln!("wrote {} rows to {}", data.ledger_b.len(), paths.ledger_b.display());
    eprintln!("wrote {}", paths.breaks.display());
    Ok(())
}

// ============================================================================
// run / verify
// ============================================================================

fn cmd_run(
    data_dir: &Path,
    out_dir: &Path,
    config: Option<&Path>,
    json_output: bool,
) -> Result<(), CliError> {
    let config = load_config(config)?;
    let summary = proof::run_proof(&config, data_dir, out_dir)?;

    if json_output {
        let json = serde_json::to_string_pretty(&summary).map_err(|e| {
            CliError::new(EXIT_MALFORMED_INPUT, format!("JSON serialization error: {e}"))
        })?;
        println!("{json}");
    }

    eprintln!("full rows A+B: {}", summary.full_rows());
    eprintln!(
        "reduced rows A+B: {} ({:.2}% dropped)",
        summary.reduced_rows(),
        summary.reduction.reduction_ratio * 100.0
    );
    eprintln!(
        "mismatches: {} full, {} reduced (delta {} cents)",
        summary.full_mismatches, summary.reduced_mismatches, summary.mismatch_delta_total_cents
    );
    eprintln!("wrote manifest: {}", summary.manifest.display());
    Ok(())
}

fn cmd_verify(out_dir: &Path, config: Option<&Path>, json_output: bool) -> Result<(), CliError> {
    let config = load_config(config)?;
    let outcome = proof::verify_proof(&config, out_dir).map_err(|e| {
        let missing = matches!(e, IoError::Read { .. });
        let err = CliError::from(e);
        if missing {
            err.with_hint("run `remrecon run` first to write both results")
        } else {
            err
        }
    })?;

    if json_output {
        let json = serde_json::to_string_pretty(&outcome.equivalence.report()).map_err(|e| {
            CliError::new(EXIT_MALFORMED_INPUT, format!("JSON serialization error: {e}"))
        })?;
        println!("{json}");
    } else {
        println!("{}", outcome.equivalence.message());
    }
    eprintln!("wrote {}", outcome.report.display());

    if !outcome.equivalence.passed() {
        return Err(CliError::new(
            EXIT_EQUIVALENCE_FAILED,
            "reduced reconciliation is not equivalent to the full one",
        ));
    }
    Ok(())
}

// ============================================================================
// validate-config
// ============================================================================

fn cmd_validate_config(path: &Path) -> Result<(), CliError> {
    let config = load_config(Some(path))?;
    eprintln!("config ok: {}", path.display());
    eprintln!("  inputs:  {}, {}", config.inputs.ledger_a, config.inputs.ledger_b);
    eprintln!(
        "  outputs: {}, {}, {}, {}, {}, {}",
        config.outputs.full_result,
        config.outputs.reduced_result,
        config.outputs.reduced_a,
        config.outputs.reduced_b,
        config.outputs.manifest,
        config.outputs.report,
    );
    Ok(())
}
