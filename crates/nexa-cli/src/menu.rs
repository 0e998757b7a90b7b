//! Interactive main menu

use anyhow::Result;
use std::io::{BufRead, Write};
use tracing::info;

use nexa_core::{RecordUpdate, Vault, VaultError};

use crate::console::Console;

const MENU: &str = "\
=== Password Manager ===
1. Add Password
2. Retrieve Password
3. Edit Password
4. Delete Password
5. Generate Password
6. Exit";

/// Run the menu until the user exits or input ends
pub fn run<R: BufRead, W: Write>(vault: &mut Vault, console: &mut Console<R, W>) -> Result<()> {
    loop {
        console.say(MENU)?;
        let Some(choice) = console.line("Select: ")? else {
            return Ok(());
        };

        let outcome = match choice.as_str() {
            "1" => add_password(vault, console),
            "2" => retrieve_password(vault, console),
            "3" => edit_password(vault, console),
            "4" => delete_password(vault, console),
            "5" => generate_password(vault, console),
            "6" => {
                console.say("Goodbye!")?;
                return Ok(());
            }
            _ => console.say("Invalid choice."),
        };

        if let Err(e) = outcome {
            match e.downcast_ref::<VaultError>() {
                Some(err) if !err.is_fatal() => console.say(format!("\nERROR: {}", err))?,
                _ => return Err(e),
            }
        }
    }
}

fn add_password<R: BufRead, W: Write>(vault: &mut Vault, console: &mut Console<R, W>) -> Result<()> {
    console.say("=== Add New Password ===")?;

    let service = console.ask("Service: ")?;
    if service.is_empty() {
        return console.say("\nERROR: Service name is required. No changes made.");
    }
    let username = console.ask("Username: ")?;
    if username.is_empty() {
        return console.say("\nERROR: Username is required. No changes made.");
    }

    let mut password = console.ask("Enter password (leave blank to generate a random password): ")?;
    if password.is_empty() {
        if !console.confirm("Generate a random password? (Y/n): ")? {
            return console.say("\nNo password generated.");
        }
        password = generate_with_prompted_length(vault, console)?;
        console.say(format!("\nGenerated password: {}", password))?;
    }

    vault.add(&service, &username, &password)?;
    console.say("\nNew credentials created:")?;
    console.say(format!("Service: {}", service))?;
    console.say(format!("Username: {}", username))?;
    console.say(format!("Password: {}", password))
}

fn retrieve_password<R: BufRead, W: Write>(vault: &mut Vault, console: &mut Console<R, W>) -> Result<()> {
    let Some(service) = select_service(vault, console, "\nSelect service by number or name: ")? else {
        return Ok(());
    };

    match vault.find(&service)? {
        Some(credentials) => {
            console.say(format!("\nCredentials for {}:", service))?;
            console.say(format!("Username: {}", credentials.username))?;
            console.say(format!("Password: {}", credentials.password.expose()))
        }
        None => console.say("\nService not found or no credentials stored."),
    }
}

fn edit_password<R: BufRead, W: Write>(vault: &mut Vault, console: &mut Console<R, W>) -> Result<()> {
    let Some(service) = select_service(vault, console, "Select service to edit by number or name: ")? else {
        return Ok(());
    };

    let Some(current) = vault.find(&service)? else {
        return console.say("Service not found or no credentials stored.");
    };
    console.say(format!("\nCurrent credentials for {}:", service))?;
    console.say(format!("Username: {}", current.username))?;
    console.say(format!("Password: {}", current.password.expose()))?;

    let update = RecordUpdate::new()
        .service(console.ask("\nNew service name (leave blank to keep the same): ")?)
        .username(console.ask("New username (blank to skip): ")?)
        .password(console.ask("New password (blank to skip): ")?);

    if vault.update(&service, &update)? {
        info!("Edited credentials");
        console.say(format!("\nPassword for '{}' was updated.", service))
    } else {
        console.say("Service not found or could not be updated.")
    }
}

fn delete_password<R: BufRead, W: Write>(vault: &mut Vault, console: &mut Console<R, W>) -> Result<()> {
    let Some(service) = select_service(vault, console, "Select service to delete by number or name: ")? else {
        return Ok(());
    };

    if vault.delete(&service)? {
        console.say(format!("Password for '{}' deleted.", service))
    } else {
        console.say("Service not found or could not be deleted.")
    }
}

fn generate_password<R: BufRead, W: Write>(vault: &mut Vault, console: &mut Console<R, W>) -> Result<()> {
    console.say("=== Generate Random Password ===")?;
    let password = generate_with_prompted_length(vault, console)?;
    console.say(format!("\nGenerated password: {}", password))?;

    if !console.confirm("\nWould you like to attach a service to this password? (Y/n): ")? {
        return console.say("\nNo changes made.");
    }

    let service = console.ask("Service: ")?;
    if service.is_empty() {
        return console.say("\nERROR: Service name is required. No changes made.");
    }
    let username = console.ask("Username: ")?;
    if username.is_empty() {
        return console.say("\nERROR: Username is required. No changes made.");
    }

    vault.add(&service, &username, &password)?;
    console.say("\nNew credentials created:")?;
    console.say(format!("Service: {}", service))?;
    console.say(format!("Username: {}", username))
}

/// Ask for a length; blank or unparsable input uses the configured default
fn generate_with_prompted_length<R: BufRead, W: Write>(
    vault: &Vault,
    console: &mut Console<R, W>,
) -> Result<String> {
    let default = vault.settings().password_length;
    let answer = console.ask(&format!("Password length (default {}): ", default))?;
    let length = answer.parse().unwrap_or(default);
    Ok(vault.generate_password(Some(length))?)
}

/// List services and resolve the user's pick (a 1-based number or a name)
fn select_service<R: BufRead, W: Write>(
    vault: &Vault,
    console: &mut Console<R, W>,
    prompt: &str,
) -> Result<Option<String>> {
    let services = vault.services()?;
    if services.is_empty() {
        console.say("No services found in the database.")?;
        return Ok(None);
    }

    console.say("Available services:")?;
    for (idx, service) in services.iter().enumerate() {
        console.say(format!("{}. {}", idx + 1, service))?;
    }

    let selection = console.ask(prompt)?;
    if !selection.is_empty() && selection.bytes().all(|b| b.is_ascii_digit()) {
        return match selection.parse::<usize>() {
            Ok(n) if (1..=services.len()).contains(&n) => Ok(Some(services[n - 1].clone())),
            _ => {
                console.say("Invalid selection.")?;
                Ok(None)
            }
        };
    }
    Ok(Some(selection))
}
