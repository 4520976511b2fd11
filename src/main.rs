// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, error};
use std::io::Write;
use std::path::PathBuf;

use greyparrot::app_config::{LogLevel, ProjectConfig};
use greyparrot::{Controller, TransOptions};

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => LogLevel::Error,
            CliLogLevel::Warn => LogLevel::Warn,
            CliLogLevel::Info => LogLevel::Info,
            CliLogLevel::Debug => LogLevel::Debug,
            CliLogLevel::Trace => LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Scan, submit marked texts, then pull translations
    #[command(alias = "translate")]
    Trans {
        /// Replace marked calls with key references after submission
        #[arg(short, long)]
        replace: bool,

        /// Reconcile against the local store instead of the dashboard
        #[arg(long)]
        local: bool,
    },

    /// Fetch translations and write one JSON file per locale
    Pull {
        /// Read from the local store instead of the dashboard
        #[arg(long)]
        local: bool,
    },

    /// List marked texts and duplicates without any network call
    Scan,

    /// Report marked texts as files change, until Ctrl-C
    Watch,

    /// Generate shell completions for greyparrot
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// greyparrot - translation key extraction for web and Flutter projects
///
/// Finds `$tt('...')` calls, reconciles them with a translation sheet and
/// rewrites them into `$t('key')` references.
#[derive(Parser, Debug)]
#[command(name = "greyparrot")]
#[command(version)]
#[command(about = "Extract, reconcile and replace translatable texts")]
#[command(long_about = "greyparrot scans a project for marked texts, submits the unique ones to a translation sheet and optionally replaces them with generated keys.

EXAMPLES:
    greyparrot scan                         # List marked texts and duplicates
    greyparrot trans                        # Submit texts and pull translations
    greyparrot trans --replace              # ... and rewrite the source files
    greyparrot trans --local                # Reconcile against the local store
    greyparrot pull                         # Only pull translations
    greyparrot watch                        # Live extraction feedback
    greyparrot completions bash > gp.bash   # Generate bash completions

CONFIGURATION:
    Configuration is read from .grey-parrot.json in the working directory,
    or from the file given with --config. The dashboard token is read from
    GREY_PARROT_TOKEN, or from a .env file next to the configuration.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true, env = "GREY_PARROT_CONFIG")]
    config: Option<PathBuf>,

    /// Set logging level
    #[arg(short, long, global = true, value_enum)]
    log_level: Option<CliLogLevel>,
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

    // @returns: Emoji for log level
    fn get_emoji_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "❌",
            Level::Warn => "🚧",
            Level::Info => " ",
            Level::Debug => "🔍",
            Level::Trace => "📋",
        }
    }

    // @returns: ANSI color code for log level
    fn get_color_for_level(level: Level) -> &'static str {
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
                "\x1B[{}m{} {} {}\x1B[0m",
                Self::get_color_for_level(record.level()),
                now,
                Self::get_emoji_for_level(record.level()),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() {
    // The logger accepts everything; the effective level is set with set_max_level
    if CustomLogger::init(LevelFilter::Trace).is_ok() {
        log::set_max_level(LevelFilter::Info);
    }

    let cli = CommandLineOptions::parse();
    if let Err(e) = run(cli).await {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: CommandLineOptions) -> Result<()> {
    if let Some(level) = cli.log_level {
        log::set_max_level(LogLevel::from(level).to_level_filter());
    }

    if let Commands::Completions { shell } = cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(shell, &mut cmd, "greyparrot", &mut std::io::stdout());
        return Ok(());
    }

    let config_path = ProjectConfig::locate(cli.config.as_deref());
    let config = ProjectConfig::load(&config_path)?;

    // The command line wins over the config file
    if cli.log_level.is_none() {
        if let Some(level) = config.log_level {
            log::set_max_level(level.to_level_filter());
        }
    }

    let controller = Controller::new(config);
    match cli.command {
        Commands::Trans { replace, local } => {
            controller.trans(TransOptions { replace, local }).await?;
        }
        Commands::Pull { local } => {
            controller.pull(local).await?;
        }
        Commands::Scan => {
            controller.run_scan().await?;
        }
        Commands::Watch => controller.watch().await?,
        Commands::Completions { .. } => {}
    }

    Ok(())
}
