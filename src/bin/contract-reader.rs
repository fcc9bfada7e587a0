//! CLI binary for contract-reader.
//!
//! A thin shim over the library crate that maps CLI flags to `ClientConfig`,
//! drives one `UploadOrchestrator` attempt and prints the summary.

use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use contract_reader::report::{generate_report, obtain_report};
use contract_reader::{
    normalize, render_text, save_report, AnalysisBackend, AnalysisResult, ClientConfig,
    HttpBackend, Language, Phase, ProgressCallback, SimulatedBackend, UploadFile,
    UploadOrchestrator, UploadProgressCallback,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress: one 0–100 bar whose prefix follows the phase and whose
/// message is the current status line.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(100);
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold:<10} [{bar:42.green/238}] {pos:>3}%  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);
        bar.set_prefix("Preparing");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }
}

impl UploadProgressCallback for CliProgressCallback {
    fn on_phase_change(&self, phase: Phase) {
        match phase {
            Phase::Uploading => self.bar.set_prefix("Uploading"),
            Phase::Analyzing => self.bar.set_prefix("Analyzing"),
            _ => {}
        }
    }

    fn on_progress(&self, _phase: Phase, percent: u8) {
        self.bar.set_position(u64::from(percent));
    }

    fn on_status(&self, message: &str) {
        self.bar.set_message(message.to_string());
    }

    fn on_finished(&self, phase: Phase, _error: Option<&str>) {
        self.bar.finish_and_clear();
        if phase == Phase::Success {
            eprintln!("{} {}", green("✔"), bold("Analysis complete"));
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Analyse a contract and print the summary
  contract-reader analyze contrat.pdf

  # Save the PDF report next to it
  contract-reader analyze contrat.pdf --report-dir ./rapports

  # Raw JSON result
  contract-reader analyze contrat.pdf --json > result.json

  # Re-render a saved result without the network
  contract-reader render result.json -o rapport.pdf

  # Try the demonstration contract offline
  contract-reader --offline sample

ENVIRONMENT VARIABLES:
  CONTRACT_READER_API_URL    Analysis service base URL (default http://localhost:8002)
  CONTRACT_READER_SITE_URL   Site base URL for the sample and simulation routes
  CONTRACT_READER_TIMEOUT    Analysis deadline in seconds (default 30)
  CONTRACT_READER_LANG       fr or en
  RUST_LOG                   Overrides the log filter
"#;

/// Submit contracts for analysis and render their summaries.
#[derive(Parser, Debug)]
#[command(
    name = "contract-reader",
    version,
    about = "Submit contracts for analysis and render their summaries",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Analysis service base URL.
    #[arg(long, global = true, env = "CONTRACT_READER_API_URL")]
    api_url: Option<String>,

    /// Site base URL (sample contract and simulation routes).
    #[arg(long, global = true, env = "CONTRACT_READER_SITE_URL")]
    site_url: Option<String>,

    /// Analysis deadline in seconds.
    #[arg(long, global = true, env = "CONTRACT_READER_TIMEOUT", default_value_t = 30)]
    timeout: u64,

    /// Language of messages and report labels.
    #[arg(long, global = true, env = "CONTRACT_READER_LANG", value_enum, default_value = "fr")]
    lang: LangArg,

    /// Dev only: filenames containing this token go to the simulation route.
    #[arg(long, global = true, env = "CONTRACT_READER_DEV_TRIGGER")]
    dev_trigger: Option<String>,

    /// Use the in-process simulated service instead of HTTP.
    #[arg(long, global = true, env = "CONTRACT_READER_OFFLINE")]
    offline: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "CONTRACT_READER_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "CONTRACT_READER_QUIET")]
    quiet: bool,

    /// Disable progress bar.
    #[arg(long, global = true, env = "CONTRACT_READER_NO_PROGRESS")]
    no_progress: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyse a local PDF.
    Analyze {
        /// Contract to submit.
        file: PathBuf,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Analyse the demonstration contract.
    Sample {
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Normalize a saved JSON result and write its PDF report.
    Render {
        /// JSON result saved with `analyze --json`.
        result: PathBuf,
        /// Report path. Default: rapport_board_ready_<date>.pdf
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(clap::Args, Debug)]
struct OutputArgs {
    /// Print the raw JSON result instead of the summary.
    #[arg(long)]
    json: bool,

    /// Obtain the PDF report and save it in this directory.
    #[arg(long)]
    report_dir: Option<PathBuf>,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum LangArg {
    Fr,
    En,
}

impl From<LangArg> for Language {
    fn from(v: LangArg) -> Self {
        match v {
            LangArg::Fr => Language::Fr,
            LangArg::En => Language::En,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the progress bar is active;
    // the bar provides all the feedback that matters to the user.
    let wants_json = matches!(
        &cli.command,
        Command::Analyze { output, .. } | Command::Sample { output } if output.json
    );
    let runs_analysis = !matches!(cli.command, Command::Render { .. });
    let show_progress = runs_analysis && !cli.quiet && !cli.no_progress && !wants_json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let config = build_config(&cli)?;

    match &cli.command {
        Command::Render { result, output } => render(&cli, &config, result, output.as_deref()).await,
        Command::Analyze { file, output } => {
            let file = UploadFile::from_path(file)
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;
            analyze(&cli, config, Some(file), output, show_progress).await
        }
        Command::Sample { output } => analyze(&cli, config, None, output, show_progress).await,
    }
}

/// Map CLI args to `ClientConfig`.
fn build_config(cli: &Cli) -> Result<ClientConfig> {
    let mut builder = ClientConfig::builder()
        .request_timeout(Duration::from_secs(cli.timeout))
        .language(cli.lang.into());
    if let Some(url) = &cli.api_url {
        builder = builder.api_base_url(url.clone());
    }
    if let Some(url) = &cli.site_url {
        builder = builder.site_base_url(url.clone());
    }
    if let Some(token) = &cli.dev_trigger {
        builder = builder.simulate_trigger(token.clone());
    }
    builder.build().context("Invalid configuration")
}

/// Submit `file` (or the sample when `None`), print, and optionally save
/// the report.
async fn analyze(
    cli: &Cli,
    config: ClientConfig,
    file: Option<UploadFile>,
    output: &OutputArgs,
    show_progress: bool,
) -> Result<()> {
    let backend: Arc<dyn AnalysisBackend> = if cli.offline {
        Arc::new(SimulatedBackend::new())
    } else {
        Arc::new(HttpBackend::new(config.clone()).context("Failed to build HTTP client")?)
    };

    let mut orchestrator = UploadOrchestrator::new(Arc::clone(&backend), config.clone());
    if show_progress {
        orchestrator = orchestrator.with_callback(CliProgressCallback::new() as ProgressCallback);
    }

    // Ctrl-C cancels the attempt instead of killing the process mid-write.
    let on_interrupt = tokio::spawn({
        let orchestrator = orchestrator.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                orchestrator.cancel();
            }
        }
    });

    let outcome = match file {
        Some(file) => orchestrator.submit(file).await,
        None => orchestrator.load_sample().await,
    };
    on_interrupt.abort();

    let result = outcome.map_err(|e| {
        let message = e.user_message(config.language);
        anyhow::Error::new(e).context(message)
    })?;

    print_result(&result, &config, output.json)?;

    if let Some(dir) = &output.report_dir {
        let report = obtain_report(backend.as_ref(), &config, &result)
            .await
            .context(config.language.messages().report_failed)?;
        let path = save_report(&report, dir)
            .await
            .context("Failed to save report")?;
        if !cli.quiet {
            eprintln!("{} {}", green("✔"), bold(&path.display().to_string()));
        }
    }
    Ok(())
}

fn print_result(result: &AnalysisResult, config: &ClientConfig, json: bool) -> Result<()> {
    if json {
        let text =
            serde_json::to_string_pretty(result.raw()).context("Failed to serialise result")?;
        println!("{text}");
    } else {
        let summary = normalize(result);
        print!("{}", render_text(&summary, config.language));
        eprintln!("{}", dim(&format!("schema: {}", summary.schema)));
    }
    Ok(())
}

/// `render`: saved JSON → text summary + local PDF report.
async fn render(cli: &Cli, config: &ClientConfig, input: &Path, output: Option<&Path>) -> Result<()> {
    let body = tokio::fs::read(input)
        .await
        .with_context(|| format!("Failed to read {}", input.display()))?;
    let result = AnalysisResult::from_slice(&body)
        .with_context(|| format!("{} is not an analysis result", input.display()))?;

    let summary = normalize(&result);
    if !cli.quiet {
        print!("{}", render_text(&summary, config.language));
    }

    let mut report = generate_report(&summary, config, Local::now().date_naive())
        .context(config.language.messages().report_failed)?;
    let dir = match output {
        Some(path) => {
            if let Some(name) = path.file_name() {
                report.filename = name.to_string_lossy().into_owned();
            }
            path.parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."))
        }
        None => PathBuf::from("."),
    };
    let path = save_report(&report, &dir)
        .await
        .context("Failed to save report")?;
    if !cli.quiet {
        eprintln!("{} {}", green("✔"), bold(&path.display().to_string()));
    }
    Ok(())
}
