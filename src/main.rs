// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::{BufRead, Write};
use std::path::PathBuf;

use udaan::app_config::{self, Config, EngineKind};
use udaan::app_controller::{Command, Controller};

/// CLI Wrapper for EngineKind to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliEngine {
    Mock,
    Generative,
    Provider,
}

impl From<CliEngine> for EngineKind {
    fn from(cli_engine: CliEngine) -> Self {
        match cli_engine {
            CliEngine::Mock => EngineKind::Mock,
            CliEngine::Generative => EngineKind::Generative,
            CliEngine::Provider => EngineKind::Provider,
        }
    }
}

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
    /// Translate a single text
    Translate {
        /// Text to translate
        text: String,

        /// Target language code (e.g., 'hi', 'es', 'fr')
        #[arg(short, long = "to")]
        target_language: String,

        /// Source language code; detected when omitted
        #[arg(short, long = "from")]
        source_language: Option<String>,
    },

    /// Translate several texts; reads one text per line from stdin when none are given
    Bulk {
        /// Texts to translate, in order
        texts: Vec<String>,

        /// Target language code
        #[arg(short, long = "to")]
        target_language: String,
    },

    /// List supported languages
    Languages,

    /// Detect the language of a text
    Detect {
        /// Text to inspect
        text: String,
    },

    /// Show usage statistics
    Stats {
        /// Size of the window in days
        #[arg(short, long, default_value_t = 7)]
        days: u32,
    },

    /// Show the most recent audit log entries
    Logs {
        /// Maximum number of entries
        #[arg(short, long, default_value_t = 10)]
        limit: usize,

        /// Number of newest entries to skip
        #[arg(short, long, default_value_t = 0)]
        offset: usize,
    },

    /// Show service health
    Health,

    /// Generate shell completions for udaan
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Udaan - translation broker
///
/// Validates translation requests, dispatches them to the configured engine,
/// keeps an append-only audit log of every attempt and reports usage statistics.
#[derive(Parser, Debug)]
#[command(name = "udaan")]
#[command(version)]
#[command(about = "Translation broker with audit log and usage statistics")]
#[command(long_about = "Udaan validates translation requests, dispatches them to a pluggable engine
and records every attempt in an append-only audit log.

EXAMPLES:
    udaan translate hello --to hi                # Translate one text
    udaan bulk hello world --to ta               # Translate several texts
    cat lines.txt | udaan bulk --to es           # Translate stdin, one text per line
    udaan detect \"नमस्ते\"                        # Detect the language of a text
    udaan stats --days 7                         # Usage over the last week
    udaan logs --limit 20                        # Recent audit entries
    udaan completions bash > udaan.bash          # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config. If the config file doesn't exist, a default one
    will be created automatically.

ENGINES:
    mock       - Deterministic offline engine (default)
    generative - Anthropic Messages API (requires API key)
    provider   - LibreTranslate-compatible API (requires API key)")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true, default_value = "conf.json")]
    config: PathBuf,

    /// Translation engine to use
    #[arg(short, long, global = true, value_enum)]
    engine: Option<CliEngine>,

    /// Set logging level
    #[arg(long, global = true, value_enum)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
/// Filters against `log::max_level()`, so the level can change after init
struct CustomLogger;

impl CustomLogger {
    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color and tag for log level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("1;31", "ERROR"),
            Level::Warn => ("1;33", "WARN "),
            Level::Info => ("1;32", "INFO "),
            Level::Debug => ("1;36", "DEBUG"),
            Level::Trace => ("1;35", "TRACE"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (color, tag) = Self::style_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "\x1B[{}m{} {} {}\x1B[0m",
                color, now, tag, record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn level_filter(level: &app_config::LogLevel) -> LevelFilter {
    match level {
        app_config::LogLevel::Error => LevelFilter::Error,
        app_config::LogLevel::Warn => LevelFilter::Warn,
        app_config::LogLevel::Info => LevelFilter::Info,
        app_config::LogLevel::Debug => LevelFilter::Debug,
        app_config::LogLevel::Trace => LevelFilter::Trace,
    }
}

fn read_stdin_lines() -> Result<Vec<String>> {
    let stdin = std::io::stdin();
    let mut texts = Vec::new();
    for line in stdin.lock().lines() {
        let line = line.context("Failed to read texts from stdin")?;
        if !line.trim().is_empty() {
            texts.push(line);
        }
    }
    Ok(texts)
}

#[tokio::main]
async fn main() -> Result<()> {
    // The level is lowered or raised once the config is known
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    let command = match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "udaan", &mut std::io::stdout());
            return Ok(());
        }
        Commands::Translate {
            text,
            target_language,
            source_language,
        } => Command::Translate {
            text,
            target_lang: target_language,
            source_lang: source_language,
        },
        Commands::Bulk {
            texts,
            target_language,
        } => {
            let texts = if texts.is_empty() {
                read_stdin_lines()?
            } else {
                texts
            };
            Command::Bulk {
                texts,
                target_lang: target_language,
            }
        }
        Commands::Languages => Command::Languages,
        Commands::Detect { text } => Command::Detect { text },
        Commands::Stats { days } => Command::Stats { days },
        Commands::Logs { limit, offset } => Command::Logs { limit, offset },
        Commands::Health => Command::Health,
    };

    let mut config = Config::load_or_create(&cli.config)?;

    if let Some(engine) = cli.engine {
        config.engine = engine.into();
    }
    if let Some(log_level) = cli.log_level {
        config.log_level = log_level.into();
    }
    log::set_max_level(level_filter(&config.log_level));

    let controller = Controller::with_config(&config)?;
    let output = controller.run_to_string(command).await?;
    println!("{}", output);

    Ok(())
}
