use crate::config::Config;
use crate::db::Database;
use anyhow::{Context, Result};
use dialoguer::{Input, theme::ColorfulTheme};

pub fn run_onboarding(assume_defaults: bool) -> Result<Config> {
    println!("──────────────────────────────────────────");
    println!("  Welcome to HabitDeck onboarding.");
    println!("──────────────────────────────────────────");

    let theme = ColorfulTheme::default();
    let defaults = Config::default();

    let username = if assume_defaults {
        "me".to_string()
    } else {
        println!("\n[1/3] Choose a username");
        println!("  Short handle used in URLs and CLI commands.");
        Input::with_theme(&theme)
            .with_prompt("  Username")
            .default("me".to_string())
            .validate_with(|input: &String| -> std::result::Result<(), &str> {
                if input.trim().is_empty() {
                    Err("Username must not be empty")
                } else {
                    Ok(())
                }
            })
            .interact_text()
            .map(|input: String| input.trim().to_string())
            .context("Failed to read username")?
    };

    let display_name = if assume_defaults {
        username.clone()
    } else {
        println!("\n[2/3] Display name");
        Input::with_theme(&theme)
            .with_prompt("  Shown on the dashboard and in challenges")
            .default(username.clone())
            .interact_text()
            .context("Failed to read display name")?
    };

    let api_port = if assume_defaults {
        defaults.api_port
    } else {
        println!("\n[3/3] API port");
        let raw: String = Input::with_theme(&theme)
            .with_prompt("  Port for the local dashboard server")
            .default(defaults.api_port.to_string())
            .validate_with(|input: &String| -> std::result::Result<(), &str> {
                input
                    .trim()
                    .parse::<u16>()
                    .map(|_| ())
                    .map_err(|_| "Use a port number between 1 and 65535")
            })
            .interact_text()
            .context("Failed to read API port")?;

        raw.trim()
            .parse::<u16>()
            .context("Failed to parse API port")?
    };

    let config = Config {
        api_port,
        default_username: Some(username.clone()),
        ..Config::default()
    };

    config.ensure_bootstrap_files()?;
    config.save()?;

    let database = Database::open(&config.db_path)?;
    if database.user_by_username(&username)?.is_none() {
        database.create_user(&username, &display_name, None)?;
        println!("  ✓ Created user '{username}'");
    } else {
        println!("  ✓ User '{username}' already exists");
    }

    println!("\n──────────────────────────────────────────");
    println!("  Onboarding complete!");
    println!("  Add a habit:   habitdeck habit add \"Leer 30m\" --kind time --unit min");
    println!("  Log progress:  habitdeck log add --habit 1 --value 30");
    println!(
        "  Open the app:  habitdeck serve  ->  http://127.0.0.1:{}",
        config.api_port
    );
    println!("──────────────────────────────────────────");

    Ok(config)
}
