//! Command-line interface parsing and handling
//!
//! This module handles parsing command-line arguments and executing the appropriate commands.

pub mod settings;

use std::error::Error;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::actions::{ChatSummary, DataContext, ExportTarget, Notice};
use crate::cli::settings::{SetContext, SettingError, SettingRegistry};
use crate::core::config::data::path_display;
use crate::core::config::Config;

/// Environment variable holding the tracing filter.
pub const LOG_FILTER_ENV: &str = "CHATKEEP_LOG";

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("VERGEN_GIT_DESCRIBE"),
    ", built ",
    env!("VERGEN_BUILD_DATE"),
    ")"
);

#[derive(Parser)]
#[command(name = "chatkeep")]
#[command(version, long_version = LONG_VERSION)]
#[command(about = "Back up, restore, and reset an AI coding assistant's local data")]
#[command(
    long_about = "Chatkeep exports and imports the chat history, settings snapshot, and \
provider API keys an AI coding assistant keeps on disk.\n\n\
Chat exports cover every stored chat. Imports accept either a single chat \
({\"messages\": [...]}) or a full export ({\"chats\": [...]}).\n\n\
Environment Variables:\n\
  CHATKEEP_CONFIG   Path to the config file (default: platform config dir)\n\
  CHATKEEP_LOG      Tracing filter for diagnostics on stderr (default: warn)"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Append an event log of data operations to this file
    #[arg(short = 'l', long, global = true, value_name = "FILE")]
    pub log: Option<PathBuf>,

    /// Use this config file instead of the default location
    #[arg(short = 'c', long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Export, import, list, or delete chat history
    Chats {
        #[command(subcommand)]
        command: ChatCommands,
    },
    /// Export or import the settings snapshot
    Settings {
        #[command(subcommand)]
        command: SettingsCommands,
    },
    /// Export an API key template or import API keys
    Keys {
        #[command(subcommand)]
        command: KeyCommands,
    },
    /// Show or change feature toggles
    Features {
        #[command(subcommand)]
        command: SettingCommands,
    },
    /// Show or change chatkeep configuration
    Config {
        #[command(subcommand)]
        command: SettingCommands,
    },
}

#[derive(Subcommand)]
pub enum ChatCommands {
    /// Export every stored chat to one JSON file
    Export {
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Import a single chat or a chat export
    Import {
        /// JSON file to import
        file: PathBuf,
    },
    /// List stored chats
    List,
    /// Delete every stored chat
    DeleteAll {
        /// Skip the confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum SettingsCommands {
    /// Write the settings snapshot to a JSON file
    Export {
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Apply a settings snapshot
    Import {
        /// JSON file to import
        file: PathBuf,
    },
}

#[derive(Subcommand)]
pub enum KeyCommands {
    /// Write a blank API key file to fill in
    Template {
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Import provider API keys and base URLs
    Import {
        /// JSON file to import
        file: PathBuf,
    },
}

#[derive(Subcommand)]
pub enum SettingCommands {
    /// Show current values
    Show,
    /// Set a value
    Set {
        /// Key to set
        key: String,
        /// Value to set (can be multiple words)
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        value: Vec<String>,
    },
    /// Reset a value to its default
    Unset {
        /// Key to unset
        key: String,
    },
}

#[derive(clap::Args, Debug, Clone, Default)]
pub struct OutputArgs {
    /// Output file or directory (default: current directory)
    #[arg(short = 'o', long, value_name = "PATH")]
    pub out: Option<PathBuf>,

    /// Overwrite an existing file
    #[arg(short = 'f', long)]
    pub force: bool,
}

impl From<OutputArgs> for ExportTarget {
    fn from(args: OutputArgs) -> Self {
        ExportTarget {
            out: args.out,
            overwrite: args.force,
        }
    }
}

pub fn main() -> Result<(), Box<dyn Error>> {
    init_tracing();
    let args = Args::parse();

    tokio::runtime::Runtime::new()?.block_on(async_main(args))
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_env(LOG_FILTER_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    // A subscriber may already be installed when embedded; keep it.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

async fn async_main(args: Args) -> Result<(), Box<dyn Error>> {
    let config_path = match args.config {
        Some(path) => path,
        None => Config::get_config_path()?,
    };
    let mut config = Config::load_from_path(&config_path)?;
    debug!(
        config = %path_display(&config_path),
        build = env!("VERGEN_GIT_SHA"),
        "Loaded configuration"
    );

    match args.command {
        Commands::Config { command } => run_config_command(command, &mut config, &config_path),
        Commands::Features { command } => {
            let mut context = DataContext::open(&config, args.log)?;
            let mut ctx = SetContext {
                config: &mut config,
                kv: context.kv.as_mut(),
            };
            run_setting_command(&SettingRegistry::feature_settings(), command, &mut ctx)
                .map(|_| ())
        }
        Commands::Chats { command } => {
            let context = DataContext::open(&config, args.log)?;
            run_chat_command(command, &context).await
        }
        Commands::Settings { command } => {
            let mut context = DataContext::open(&config, args.log)?;
            let notice = match command {
                SettingsCommands::Export { output } => {
                    context.export_settings(&ExportTarget::from(output)).await
                }
                SettingsCommands::Import { file } => context.import_settings(&file).await,
            };
            report(notice)
        }
        Commands::Keys { command } => {
            let mut context = DataContext::open(&config, args.log)?;
            let notice = match command {
                KeyCommands::Template { output } => {
                    context.export_api_key_template(&ExportTarget::from(output)).await
                }
                KeyCommands::Import { file } => context.import_api_keys(&file).await,
            };
            context.flush_events().await;
            report(notice)
        }
    }
}

async fn run_chat_command(
    command: ChatCommands,
    context: &DataContext,
) -> Result<(), Box<dyn Error>> {
    match command {
        ChatCommands::Export { output } => {
            report(context.export_chats(&ExportTarget::from(output)).await)
        }
        ChatCommands::Import { file } => report(context.import_chats(&file).await),
        ChatCommands::List => match context.list_chats().await {
            Ok(chats) => {
                print_chat_list(&chats);
                Ok(())
            }
            Err(notice) => report(notice),
        },
        ChatCommands::DeleteAll { yes } => {
            let notice = context
                .delete_all_chats(|| yes || confirm_delete_all())
                .await;
            report(notice)
        }
    }
}

fn run_config_command(
    command: SettingCommands,
    config: &mut Config,
    config_path: &Path,
) -> Result<(), Box<dyn Error>> {
    // Config keys never touch the key/value store.
    let mut scratch = crate::store::MemoryKeyValueStore::new();
    let mut ctx = SetContext {
        config: &mut *config,
        kv: &mut scratch,
    };
    let changed = run_setting_command(&SettingRegistry::config_settings(), command, &mut ctx)?;
    if changed {
        config.save_to_path(config_path)?;
        debug!(config = %path_display(config_path), "Saved configuration");
    }
    Ok(())
}

/// Run a show/set/unset against `registry`. Returns whether anything changed.
fn run_setting_command(
    registry: &SettingRegistry,
    command: SettingCommands,
    ctx: &mut SetContext<'_>,
) -> Result<bool, Box<dyn Error>> {
    let outcome = match command {
        SettingCommands::Show => {
            for line in registry.format_all(ctx)? {
                println!("{line}");
            }
            return Ok(false);
        }
        SettingCommands::Set { key, value } => registry
            .require(&key)
            .and_then(|handler| handler.set(&value, ctx)),
        SettingCommands::Unset { key } => registry
            .require(&key)
            .and_then(|handler| handler.unset(ctx)),
    };

    match outcome {
        Ok(message) => {
            println!("{message}");
            Ok(true)
        }
        Err(err) => {
            err.print();
            if let SettingError::UnknownKey(_) = err {
                eprintln!("Available keys: {}", registry.keys_sorted().join(", "));
            }
            std::process::exit(1);
        }
    }
}

fn report(notice: Notice) -> Result<(), Box<dyn Error>> {
    if notice.is_error() {
        eprintln!("{notice}");
        std::process::exit(1);
    }
    println!("{notice}");
    Ok(())
}

fn confirm_delete_all() -> bool {
    print!("Are you sure you want to delete all chats? This action cannot be undone. [y/N]: ");
    if io::stdout().flush().is_err() {
        return false;
    }
    let mut input = String::new();
    if io::stdin().read_line(&mut input).is_err() {
        return false;
    }
    matches!(input.trim().to_lowercase().as_str(), "y" | "yes")
}

fn print_chat_list(chats: &[ChatSummary]) {
    if chats.is_empty() {
        println!("No chats stored.");
        return;
    }
    println!("Stored chats:");
    for chat in chats {
        let when = chat
            .timestamp
            .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  {}  {}  {} ({} message{})",
            chat.id,
            when,
            chat.description,
            chat.message_count,
            if chat.message_count == 1 { "" } else { "s" }
        );
    }
}
