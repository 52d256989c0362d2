//! Argument parsing, logging setup, and command dispatch.

use std::path::PathBuf;

use amr_config::DEFAULT_CONFIG_PATH;
use amr_core::RangeSelector;
use amr_telemetry::{DEFAULT_LOG_LEVEL, LogFormat, LoggingConfig, init_logging};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::debug;

use crate::client::{AppContext, CliError, CliResult};
use crate::commands::config::{handle_config_init, handle_config_show, load_or_init};
use crate::commands::rename::{handle_movie, handle_tv};

/// Parses CLI arguments, installs logging, and executes the requested
/// command. Returns the process exit code.
pub async fn run() -> i32 {
    let cli = Cli::parse();

    if let Err(err) = install_logging(&cli) {
        eprintln!("error: {}", err.display_message());
        return err.exit_code();
    }

    match dispatch(cli).await {
        Ok(()) => 0,
        Err(CliError::Aborted) => {
            println!("See you!");
            CliError::Aborted.exit_code()
        }
        Err(err) => {
            eprintln!("error: {}", err.display_message());
            err.exit_code()
        }
    }
}

fn install_logging(cli: &Cli) -> CliResult<()> {
    let config = LoggingConfig {
        level: cli.log_level(),
        format: match cli.output {
            OutputFormat::Table => LogFormat::Pretty,
            OutputFormat::Json => LogFormat::Json,
        },
        log_file: cli.log_file.as_deref(),
    };
    init_logging(&config).map_err(CliError::failure)
}

async fn dispatch(cli: Cli) -> CliResult<()> {
    debug!(config = %cli.config.display(), "dispatching command");
    match cli.command {
        Command::Tv(args) => {
            let settings = load_or_init(&cli.config, cli.yes)?;
            let mut ctx = AppContext::from_settings(settings, cli.yes, cli.output)?;
            handle_tv(&mut ctx, args).await
        }
        Command::Movie(args) => {
            let settings = load_or_init(&cli.config, cli.yes)?;
            let mut ctx = AppContext::from_settings(settings, cli.yes, cli.output)?;
            handle_movie(&mut ctx, args).await
        }
        Command::Config(ConfigCommand::Init(args)) => handle_config_init(&cli.config, &args),
        Command::Config(ConfigCommand::Show) => handle_config_show(&cli.config, cli.output),
    }
}

#[derive(Parser)]
#[command(
    name = "amr",
    version,
    about = "Rename Alist media files after their TMDB titles",
    after_help = "Example: amr tv \"Sword Art Online\" --dir /aliyun/SAO/"
)]
pub(crate) struct Cli {
    #[arg(
        short,
        long,
        global = true,
        env = "AMR_CONFIG",
        default_value = DEFAULT_CONFIG_PATH,
        help = "Configuration file (YAML or JSON)"
    )]
    pub(crate) config: PathBuf,
    #[arg(short, long, global = true, help = "Log progress at info level")]
    pub(crate) verbose: bool,
    #[arg(
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Log requests and payloads at debug level"
    )]
    pub(crate) debug: bool,
    #[arg(long, global = true, env = "AMR_LOG_FILE", help = "Also append logs to this file")]
    pub(crate) log_file: Option<PathBuf>,
    #[arg(short, long, global = true, help = "Apply renames without asking")]
    pub(crate) yes: bool,
    #[arg(
        long = "output",
        alias = "format",
        global = true,
        value_enum,
        default_value_t = OutputFormat::Table,
        help = "Select output format for commands that render structured data"
    )]
    pub(crate) output: OutputFormat,
    #[command(subcommand)]
    pub(crate) command: Command,
}

impl Cli {
    fn log_level(&self) -> &'static str {
        if self.debug {
            "debug"
        } else if self.verbose {
            "info"
        } else {
            DEFAULT_LOG_LEVEL
        }
    }
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// Rename the episodes of one season of a series.
    Tv(TvArgs),
    /// Rename a film and its subtitles.
    Movie(MovieArgs),
    /// Create or inspect the configuration file.
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand)]
pub(crate) enum ConfigCommand {
    /// Write a new configuration file interactively.
    Init(ConfigInitArgs),
    /// Print the loaded configuration with secrets masked.
    Show,
}

#[derive(Args, Debug, Clone)]
pub(crate) struct ConfigInitArgs {
    #[arg(long, help = "Overwrite an existing file")]
    pub(crate) force: bool,
}

#[derive(Args, Debug, Clone)]
pub(crate) struct TvArgs {
    #[arg(help = "Search keyword, or a TMDB id with --id")]
    pub(crate) keyword: String,
    #[arg(short, long, help = "Treat KEYWORD as a TMDB series id")]
    pub(crate) id: bool,
    #[arg(short, long, help = "Alist folder holding the episodes; omit to only list titles")]
    pub(crate) dir: Option<String>,
    #[arg(short, long, help = "Folder access password")]
    pub(crate) password: Option<String>,
    #[arg(
        short,
        long,
        default_value = "1",
        help = "Episodes to rename: N, N-M, or N- (1-based)"
    )]
    pub(crate) number: RangeSelector,
    #[arg(short, long, help = "Season number; prompts when several exist")]
    pub(crate) season: Option<u32>,
    #[arg(long, help = "Pick the Nth search result (1-based) instead of prompting")]
    pub(crate) pick: Option<usize>,
}

#[derive(Args, Debug, Clone)]
pub(crate) struct MovieArgs {
    #[arg(help = "Search keyword, or a TMDB id with --id")]
    pub(crate) keyword: String,
    #[arg(short, long, help = "Treat KEYWORD as a TMDB movie id")]
    pub(crate) id: bool,
    #[arg(short, long, help = "Alist folder holding the film; omit to only show its title")]
    pub(crate) dir: Option<String>,
    #[arg(short, long, help = "Folder access password")]
    pub(crate) password: Option<String>,
    #[arg(long, help = "Pick the Nth search result (1-based) instead of prompting")]
    pub(crate) pick: Option<usize>,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    #[default]
    Table,
    Json,
}
