// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{info, warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::PathBuf;

use booktrans::app_config::{self, Config, TranslationProvider};
use booktrans::app_controller::{Controller, TranslateRequest};
use booktrans::file_utils::FileManager;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Translate a document with a language model
    Translate(TranslateArgs),

    /// Generate shell completions for booktrans
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct TranslateArgs {
    /// Source document: http(s) URL, file:// URL or local path
    #[arg(value_name = "FILE_URL")]
    file_url: String,

    /// Destination language name or ISO code (e.g. 'Spanish', 'es', 'spa')
    #[arg(short, long)]
    dest_language: String,

    /// Soft token ceiling per batch (config value when omitted)
    #[arg(long)]
    max_len: Option<usize>,

    /// Hard token ceiling per unit (config value when omitted)
    #[arg(long)]
    hard_max_len: Option<usize>,

    /// Tokens of the previous batch repeated as context (config value when omitted)
    #[arg(long)]
    overlap_len: Option<usize>,

    /// Model name to use for translation
    #[arg(short, long)]
    model: Option<String>,

    /// Translate only the first N batches
    #[arg(short, long)]
    num_pages: Option<usize>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: PathBuf,

    /// Directory receiving the translated document
    #[arg(short, long)]
    output_dir: Option<String>,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,

    /// API key for the provider serving the selected model
    #[arg(long)]
    api_key: Option<String>,

    /// OpenAI API key
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    openai_api_key: Option<String>,

    /// Anthropic API key
    #[arg(long, env = "ANTHROPIC_API_KEY", hide_env_values = true)]
    anthropic_api_key: Option<String>,

    /// Do not store the translated document, only print it
    #[arg(long)]
    no_store: bool,

    /// Also write the translated text to this file
    #[arg(long)]
    output_file: Option<PathBuf>,

    /// Hide the progress bar
    #[arg(short, long)]
    quiet: bool,
}

/// booktrans - Markup-preserving book translation with language models
///
/// Splits a large document into token-bounded, overlapping batches, translates
/// each batch with a chat model while leaving markup commands untouched, and
/// reassembles the result.
#[derive(Parser, Debug)]
#[command(name = "booktrans")]
#[command(version)]
#[command(about = "Markup-preserving document translation with language models")]
#[command(long_about = "booktrans translates large LaTeX (or other markup) documents with a chat model.

EXAMPLES:
    booktrans translate book.tex -d Spanish                      # Translate with the configured model
    booktrans translate https://host/book.tex -d en -m gpt-4o    # Fetch over HTTP, use a specific model
    booktrans translate book.tex -d fr -n 2 --no-store           # Try the first two batches only
    booktrans completions bash > booktrans.bash                  # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.

SUPPORTED PROVIDERS:
    openai    - OpenAI API or any compatible server (OPENAI_API_KEY)
    anthropic - Anthropic Claude API, used for models named claude* (ANTHROPIC_API_KEY)")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "1;31",
            Level::Warn => "1;33",
            Level::Info => "1;32",
            Level::Debug => "1;36",
            Level::Trace => "1;35",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");

            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "\x1B[{}m{} {:<5} {}\x1B[0m",
                Self::color_for_level(record.level()),
                now,
                record.level(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // The level is lowered or raised once the config is loaded
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "booktrans", &mut std::io::stdout());
            Ok(())
        }
        Commands::Translate(args) => run_translate(args).await,
    }
}

async fn run_translate(options: TranslateArgs) -> Result<()> {
    // If log level is set via command line, apply it immediately
    if let Some(cmd_log_level) = &options.log_level {
        let config_log_level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(config_log_level.to_level_filter());
    }

    // Load or create configuration
    if !options.config_path.exists() {
        warn!("Config file not found at '{}', creating default config.", options.config_path.display());
    }
    let mut config = Config::load_or_create(&options.config_path)?;

    // Override config with CLI options if provided
    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }
    if let Some(output_dir) = &options.output_dir {
        config.storage.output_dir = output_dir.clone();
    }
    if let Some(key) = &options.openai_api_key {
        config.set_api_key(&TranslationProvider::OpenAI, key.clone());
    }
    if let Some(key) = &options.anthropic_api_key {
        config.set_api_key(&TranslationProvider::Anthropic, key.clone());
    }
    if let Some(key) = &options.api_key {
        let model = options.model.as_deref().unwrap_or(&config.translation.model);
        let provider = TranslationProvider::for_model(model);
        config.set_api_key(&provider, key.clone());
    }

    // If log level was not set via command line, update it from config now
    if options.log_level.is_none() {
        log::set_max_level(config.log_level.to_level_filter());
    }

    let request = TranslateRequest {
        file_url: options.file_url.clone(),
        max_len: options.max_len,
        hard_max_len: options.hard_max_len,
        overlap_len: options.overlap_len,
        dest_language: options.dest_language.clone(),
        model: options.model.clone(),
        num_pages: options.num_pages,
    };

    // Create controller
    let controller = Controller::with_config(config)
        .context("Failed to initialize translation")?
        .store_output(!options.no_store)
        .show_progress(!options.quiet);

    let response = controller.translate(&request).await
        .context(format!("Failed to translate {}", options.file_url))?;

    if let Some(output_file) = &options.output_file {
        FileManager::write_to_file(output_file, &response.translated_text)?;
        info!("Translated text written to {}", output_file.display());
    }

    let response_json = serde_json::to_string_pretty(&response)
        .context("Failed to serialize response to JSON")?;
    println!("{}", response_json);

    Ok(())
}
