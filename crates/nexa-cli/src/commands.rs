//! CLI command implementations.

use anyhow::{bail, Context, Result};
use std::io::{self, BufRead, Write};
use tracing::error;

use nexa_core::{RecordUpdate, Vault, VaultError, MAX_ATTEMPTS};

use crate::console::Console;

/// Get password from user with secure input (masked).
fn get_password(prompt: &str) -> Result<String> {
    rpassword::prompt_password(prompt).context("Failed to read password")
}

/// Create the master password, re-prompting until input is valid.
pub fn setup<R: BufRead, W: Write>(vault: &mut Vault, console: &mut Console<R, W>) -> Result<()> {
    console.say("Welcome to Nexa!")?;
    console.say("IMPORTANT: Your master password is the key to your vault.")?;
    console.say("* Do not share it with anyone.")?;
    console.say("* If you forget it, your data cannot be recovered.")?;
    console.say("-".repeat(50))?;

    loop {
        let password = get_password("Enter new master password: ")?;
        let confirmation = get_password("Confirm master password: ")?;

        match vault.initialize(&password, &confirmation) {
            Ok(_) => return console.say("\nMaster password set successfully!"),
            Err(VaultError::Validation(msg)) => console.say(format!("ERROR: {}", msg))?,
            Err(e) => return Err(e.into()),
        }
    }
}

/// Verify the master password with up to three attempts.
///
/// `read_password` is called once per attempt with the prompt text.
pub fn unlock<R, W, P>(vault: &mut Vault, console: &mut Console<R, W>, mut read_password: P) -> Result<()>
where
    R: BufRead,
    W: Write,
    P: FnMut(&str) -> io::Result<String>,
{
    console.say("Please enter your master password to unlock your vault.")?;

    let result = vault.unlock_with(|attempt| {
        announce_attempt(console, attempt).map_err(|e| io::Error::new(io::ErrorKind::Other, format!("{:#}", e)))?;
        Ok(read_password("Enter master password: ")?)
    });

    match result {
        Ok(()) => console.say("Access granted. Welcome to Nexa!"),
        Err(e) => {
            error!("Unlock failed: {}", e);
            Err(e.into())
        }
    }
}

fn announce_attempt<R: BufRead, W: Write>(console: &mut Console<R, W>, attempt: u32) -> Result<()> {
    if attempt > 1 {
        console.say("ERROR: Incorrect password. Try again.")?;
    }
    console.say(format!("\nAttempt {} of {}", attempt, MAX_ATTEMPTS))
}

pub fn add<R: BufRead, W: Write>(
    vault: &mut Vault,
    console: &mut Console<R, W>,
    service: &str,
    username: &str,
    generate: bool,
    length: Option<usize>,
) -> Result<()> {
    let entered = if generate {
        String::new()
    } else {
        get_password("Password (leave blank to generate): ")?
    };
    let generated = entered.is_empty();
    let password = if generated {
        vault.generate_password(length)?
    } else {
        entered
    };

    store_new(vault, console, service, username, &password, generated)
}

fn store_new<R: BufRead, W: Write>(
    vault: &mut Vault,
    console: &mut Console<R, W>,
    service: &str,
    username: &str,
    password: &str,
    show_password: bool,
) -> Result<()> {
    vault.add(service, username, password)?;
    console.say("New credentials created:")?;
    console.say(format!("Service: {}", service))?;
    console.say(format!("Username: {}", username))?;
    if show_password {
        console.say(format!("Password: {}", password))?;
    }
    Ok(())
}

pub fn list<R: BufRead, W: Write>(vault: &Vault, console: &mut Console<R, W>) -> Result<()> {
    let services = vault.services()?;
    if services.is_empty() {
        return console.say("No services found in the database.");
    }

    for (idx, service) in services.iter().enumerate() {
        console.say(format!("{}. {}", idx + 1, service))?;
    }
    Ok(())
}

pub fn get<R: BufRead, W: Write>(vault: &Vault, console: &mut Console<R, W>, service: &str) -> Result<()> {
    match vault.find(service)? {
        Some(credentials) => {
            console.say(format!("Credentials for {}:", service))?;
            console.say(format!("Username: {}", credentials.username))?;
            console.say(format!("Password: {}", credentials.password.expose()))
        }
        None => console.say("Service not found or no credentials stored."),
    }
}

pub fn edit<R: BufRead, W: Write>(
    vault: &mut Vault,
    console: &mut Console<R, W>,
    service: &str,
    rename: Option<String>,
    username: Option<String>,
    change_password: bool,
) -> Result<()> {
    let mut update = RecordUpdate::new();
    if let Some(rename) = rename {
        update = update.service(rename);
    }
    if let Some(username) = username {
        update = update.username(username);
    }
    if change_password {
        update = update.password(get_password("New password: ")?);
    }
    if update.is_empty() {
        bail!("Nothing to change: pass --rename, --username or --password");
    }

    if vault.update(service, &update)? {
        console.say(format!("Password for '{}' was updated.", service))
    } else {
        console.say("Service not found or could not be updated.")
    }
}

pub fn delete<R: BufRead, W: Write>(vault: &mut Vault, console: &mut Console<R, W>, service: &str) -> Result<()> {
    if vault.delete(service)? {
        console.say(format!("Password for '{}' deleted.", service))
    } else {
        console.say("Service not found or could not be deleted.")
    }
}

pub fn generate<R: BufRead, W: Write>(
    vault: &mut Vault,
    console: &mut Console<R, W>,
    length: Option<usize>,
    attach: Option<(String, String)>,
) -> Result<()> {
    let password = vault.generate_password(length)?;
    console.say(format!("Generated password: {}", password))?;

    if let Some((service, username)) = attach {
        vault.add(&service, &username, &password)?;
        console.say(format!("Stored for service: {}", service))?;
    }
    Ok(())
}
