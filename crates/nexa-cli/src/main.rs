//! Nexa - a local password manager
//!
//! Credentials are encrypted at rest and unlocked with a single master
//! password. Running without a subcommand opens the interactive menu.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

use nexa_core::{paths, Vault, VaultError};

mod commands;
mod console;
mod logging;
mod menu;

use console::Console;

/// Nexa - store, retrieve, edit and manage your credentials safely
#[derive(Parser, Debug)]
#[command(name = "nexa")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Mirror log events to stderr
    #[arg(short, long)]
    verbose: bool,

    /// Data directory (defaults to the platform application-data directory)
    #[arg(long, env = "NEXA_DATA_DIR")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Set the master password (first run only)
    Init,

    /// Store credentials for a service
    Add {
        service: String,
        username: String,

        /// Generate the password instead of prompting for it
        #[arg(short, long)]
        generate: bool,

        /// Length of a generated password
        #[arg(short, long)]
        length: Option<usize>,
    },

    /// List stored service names
    List,

    /// Show the credentials for a service
    Get { service: String },

    /// Change the stored fields of a service
    Edit {
        service: String,

        /// New service name
        #[arg(long)]
        rename: Option<String>,

        /// New username
        #[arg(long)]
        username: Option<String>,

        /// Prompt for a new password
        #[arg(long)]
        password: bool,
    },

    /// Delete the credentials for a service
    Delete { service: String },

    /// Generate a random password, optionally storing it
    Generate {
        #[arg(short, long)]
        length: Option<usize>,

        /// Store the password under this service (requires --username)
        #[arg(long, requires = "username")]
        service: Option<String>,

        #[arg(long, requires = "service")]
        username: Option<String>,
    },

    /// Interactive menu (default)
    Menu,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    finish(run(cli), &mut io::stderr())
}

/// Map the outcome of a run to the process exit status, printing any denial
fn finish(result: Result<()>, err_out: &mut impl Write) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report(&e, err_out);
            ExitCode::FAILURE
        }
    }
}

fn report(err: &anyhow::Error, err_out: &mut impl Write) {
    let notice = match err.downcast_ref::<VaultError>() {
        Some(VaultError::LockedOut) => "Too many failed attempts. Exiting.".to_string(),
        Some(VaultError::StorageMissing(_)) | Some(VaultError::StorageCorrupt(_)) => {
            "ERROR: Master password file not found or unreadable. Exiting.".to_string()
        }
        _ => format!("ERROR: {:#}", err),
    };
    let _ = writeln!(err_out, "{}", notice);
    error!("Exiting with failure: {:#}", err);
}

fn run(cli: Cli) -> Result<()> {
    let data_dir = match cli.data_dir {
        Some(dir) => dir,
        None => paths::default_data_dir()?,
    };

    let mut vault = Vault::open(&data_dir)?;
    logging::init(vault.data_dir(), vault.settings(), cli.verbose)?;
    info!("Nexa {} starting", env!("CARGO_PKG_VERSION"));

    let stdin = io::stdin();
    let mut console = Console::new(stdin.lock(), io::stdout());

    let command = cli.command.unwrap_or(Commands::Menu);
    if let Commands::Init = command {
        if vault.is_initialized() {
            return Err(VaultError::AlreadyInitialized.into());
        }
        return commands::setup(&mut vault, &mut console);
    }

    if !vault.is_initialized() {
        commands::setup(&mut vault, &mut console)?;
    }
    commands::unlock(&mut vault, &mut console, |prompt| rpassword::prompt_password(prompt))?;

    let result = match command {
        Commands::Init => unreachable!("handled above"),
        Commands::Add {
            service,
            username,
            generate,
            length,
        } => commands::add(&mut vault, &mut console, &service, &username, generate, length),
        Commands::List => commands::list(&vault, &mut console),
        Commands::Get { service } => commands::get(&vault, &mut console, &service),
        Commands::Edit {
            service,
            rename,
            username,
            password,
        } => commands::edit(&mut vault, &mut console, &service, rename, username, password),
        Commands::Delete { service } => commands::delete(&mut vault, &mut console, &service),
        Commands::Generate {
            length,
            service,
            username,
        } => commands::generate(&mut vault, &mut console, length, service.zip(username)),
        Commands::Menu => menu::run(&mut vault, &mut console),
    };

    vault.lock();
    result
}
