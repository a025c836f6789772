//! CLI command definitions, routing, and tracing setup.

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr};
use daf_core::pipeline::{ProgressReporter, handle_range};
use daf_core::{AmudLocator, Document, RangeLocator, TracingSink, parse_search_term};
use daf_fetcher::Fetcher;
use daf_shared::{AppConfig, FetchConfig, init_config, load_config, validate};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{error, info};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// daf: a page of Talmud with its commentary, as one JSON document.
#[derive(Parser)]
#[command(
    name = "daf",
    version,
    about = "Fetch a Talmud amud with its bilingual text and layered commentary as JSON.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Override the upstream API root.
    #[arg(long, global = true, env = "DAF_BASE_URL")]
    pub base_url: Option<String>,

    /// Override the number of comment details fetched at once.
    #[arg(long, global = true)]
    pub max_concurrent: Option<usize>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Fetch one amud, or an inclusive range of amudim.
    Fetch {
        /// Tractate name; common spellings are accepted.
        masechet: String,

        /// Amud, e.g. `2a`.
        amud: String,

        /// Last amud of a range.
        #[arg(long)]
        to: Option<String>,

        /// Print compact JSON instead of pretty-printed.
        #[arg(long)]
        compact: bool,
    },

    /// Resolve a free-form search such as "brachot 2:" or "Shabbat 2a-3b" and fetch it.
    Search {
        term: String,

        /// Print compact JSON instead of pretty-printed.
        #[arg(long)]
        compact: bool,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags. Logs go to stderr; stdout is JSON output.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "daf=info",
        1 => "daf=debug",
        _ => "daf=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let overrides = Overrides {
        base_url: cli.base_url,
        max_concurrent: cli.max_concurrent,
    };
    match cli.command {
        Command::Fetch {
            masechet,
            amud,
            to,
            compact,
        } => {
            let range = match to {
                Some(end) => RangeLocator::new(&masechet, &amud, &end)?,
                None => RangeLocator::single(AmudLocator::new(&masechet, &amud)?),
            };
            cmd_fetch(&range, &overrides, compact).await
        }
        Command::Search { term, compact } => {
            let range = parse_search_term(&term)?;
            info!(term, start = %range.start, end = %range.end, "resolved search");
            cmd_fetch(&range, &overrides, compact).await
        }
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show(&overrides).await,
        },
    }
}

/// Command-line values that take precedence over the config file.
struct Overrides {
    base_url: Option<String>,
    max_concurrent: Option<usize>,
}

impl Overrides {
    fn apply(&self, mut config: AppConfig) -> Result<AppConfig> {
        if let Some(base_url) = &self.base_url {
            config.upstream.base_url = base_url.clone();
        }
        if let Some(max) = self.max_concurrent {
            config.fetch.max_concurrent_comments = max;
        }
        validate(&config)?;
        Ok(config)
    }
}

async fn cmd_fetch(range: &RangeLocator, overrides: &Overrides, compact: bool) -> Result<()> {
    let config = overrides.apply(load_config()?)?;
    let fetcher = Fetcher::new(FetchConfig::from(&config))?;

    info!(
        start = %range.start,
        end = %range.end,
        base_url = %config.upstream.base_url,
        "fetching"
    );

    let reporter = CliProgress::new();
    let documents = match handle_range(&fetcher, range, &TracingSink, &reporter).await {
        Ok(documents) => documents,
        Err(e) => {
            reporter.spinner.finish_and_clear();
            error!(
                code = e.code() as u8,
                severity = ?e.severity(),
                status = e.http_status(),
                "request failed"
            );
            return Err(e).wrap_err_with(|| format!("failed to fetch {}", range.start));
        }
    };

    let json = if compact {
        serde_json::to_string(&documents)?
    } else {
        serde_json::to_string_pretty(&documents)?
    };
    println!("{json}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn amud_started(&self, locator: &AmudLocator, current: usize, total: usize) {
        self.spinner
            .set_message(format!("[{current}/{total}] {locator}"));
    }

    fn details_fetched(&self, count: usize) {
        self.spinner
            .set_message(format!("Placing {count} comments"));
    }

    fn done(&self, documents: &[Document]) {
        self.spinner.finish_and_clear();
        let sections: usize = documents.iter().map(|d| d.sections.len()).sum();
        info!(documents = documents.len(), sections, "done");
    }
}

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show(overrides: &Overrides) -> Result<()> {
    let config = overrides.apply(load_config()?)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}
