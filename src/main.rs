use clap::error::ErrorKind;
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::*;
use std::env;
use std::path::{Path, PathBuf};

use polyglot_lib::config::{self as polyglot_config, ConfigSource, OnCollision, PolyglotConfig};
use polyglot_lib::exit_codes::exit;
use polyglot_lib::pipeline::MergeRequest;
use polyglot_lib::registry::LanguageRegistry;

mod commands;

/// Merge a C/C++ file with a Python, Ruby, Shell or Perl file into one
/// polyglot source that is valid in both languages.
#[derive(Parser)]
#[command(name = "polyglot", author, version, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// First input file (C/C++ or guest, in either order)
    first: Option<PathBuf>,

    /// Second input file
    second: Option<PathBuf>,

    /// Output file, overwritten if it exists
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    #[command(flatten)]
    global: GlobalArgs,
}

#[derive(Args)]
struct GlobalArgs {
    /// Configuration file path (default: discover .polyglot.toml upward)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Ignore any configuration file and use built-in defaults
    #[arg(long, global = true, conflicts_with = "config")]
    no_config: bool,

    /// Show debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only print errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// What to do when a line would break the guest fence: fail or warn
    #[arg(long, global = true, value_name = "POLICY")]
    on_collision: Option<OnCollision>,

    /// Timeout per syntax checker in milliseconds, 0 waits forever
    #[arg(long, global = true, value_name = "MS")]
    timeout: Option<u64>,

    /// Skip advisory linters such as pyflakes
    #[arg(long, global = true)]
    no_advisory: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a source recovered from a merged file
    Extract {
        /// Merged polyglot file
        file: PathBuf,

        /// Which source to print
        #[arg(long, value_enum, default_value = "guest")]
        part: Part,
    },
    /// List supported languages, extensions, fences and checkers
    Languages {
        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        output_format: OutputFormat,
    },
    /// Create a default .polyglot.toml in the current directory
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print the JSON schema of .polyglot.toml
    Schema,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum Part {
    Host,
    Guest,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

fn usage_error(message: &str) -> ! {
    eprintln!("{}: {message}", "Error".red().bold());
    eprintln!("Usage: polyglot <SOURCE1> <SOURCE2> -o <OUTPUT>");
    exit::config_error();
}

fn init_logging(global: &GlobalArgs) {
    let default_filter = if global.verbose {
        "debug"
    } else if global.quiet {
        "error"
    } else {
        "warn"
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}

/// Load the configuration, apply command line overrides and build the registry.
fn load_settings(global: &GlobalArgs) -> (PolyglotConfig, LanguageRegistry) {
    let start_dir = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

    let (mut config, source) =
        polyglot_config::resolve_config(global.config.as_deref(), global.no_config, &start_dir)
            .unwrap_or_else(|e| {
                eprintln!("{}: {e}", "Config error".red().bold());
                exit::config_error();
            });

    match &source {
        ConfigSource::File(path) => log::debug!("[polyglot-config] Using {}", path.display()),
        ConfigSource::Default => log::debug!("[polyglot-config] Using built-in defaults"),
    }

    if let Some(on_collision) = global.on_collision {
        config.on_collision = on_collision;
    }
    if let Some(timeout) = global.timeout {
        config.timeout = timeout;
    }
    if global.no_advisory {
        config.advisory = false;
    }

    let registry = config.build_registry().unwrap_or_else(|e| {
        eprintln!("{}: {e}", "Config error".red().bold());
        exit::config_error();
    });

    (config, registry)
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => e.exit(),
            _ => {
                let _ = e.print();
                exit::config_error();
            }
        },
    };

    init_logging(&cli.global);
    let quiet = cli.global.quiet;

    match cli.command {
        Some(command) => {
            if cli.first.is_some() || cli.output.is_some() {
                usage_error("Input files cannot be combined with a subcommand");
            }

            match command {
                Commands::Extract { file, part } => {
                    let (_, registry) = load_settings(&cli.global);
                    commands::extract::handle_extract(&file, part, &registry);
                }
                Commands::Languages { output_format } => {
                    let (_, registry) = load_settings(&cli.global);
                    commands::languages::handle_languages(&registry, output_format);
                }
                Commands::Init { force } => {
                    commands::init::handle_init(Path::new(polyglot_config::CONFIG_FILE_NAME), force, quiet);
                }
                Commands::Schema => commands::schema::handle_schema(),
            }
        }
        None => {
            let (Some(first), Some(second)) = (cli.first, cli.second) else {
                usage_error("Two input files are required");
            };
            let Some(output) = cli.output else {
                usage_error("No output file given (use -o <OUTPUT>)");
            };

            let (config, registry) = load_settings(&cli.global);
            let request = MergeRequest { first, second, output };
            commands::merge::handle_merge(&request, &config, &registry, quiet);
        }
    }

    exit::success();
}
