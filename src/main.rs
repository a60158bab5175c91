mod api;
mod cli;
mod config;
mod dashboard;
mod db;
mod store;

use crate::cli::onboard::run_onboarding;
use crate::cli::{
    ChallengeCommands, Cli, Commands, ConfigCommands, HabitCommands, LogCommands, UserCommands,
};
use crate::config::Config;
use crate::dashboard::metadata;
use crate::db::{Database, UserRow};
use crate::store::ChallengeStore;
use anyhow::{Context, Result, bail};
use chrono::{DateTime, NaiveDate, Utc};
use clap::Parser;
use serde_json::Value;
use std::sync::Arc;
use tokio::signal;
use tracing::info;
use tracing_subscriber::EnvFilter;
use url::Url;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init { yes } => {
            let _ = run_onboarding(yes)?;
            Ok(())
        }
        Commands::Config { command } => handle_config_command(command),
        Commands::Status => handle_status(),
        Commands::Doctor => handle_doctor(),
        Commands::Serve => {
            let config = load_config()?;
            run_service(config).await
        }
        Commands::Dashboard { user, habit } => handle_dashboard(user, habit),
        Commands::User { command } => handle_user_command(command),
        Commands::Habit { command } => handle_habit_command(command),
        Commands::Log { command } => handle_log_command(command),
        Commands::Challenge { command } => handle_challenge_command(command),
    }
}

fn handle_config_command(command: ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Set { key, value } => {
            let mut config = load_or_default_config()?;
            config.set_value(&key, &value)?;
            config.ensure_bootstrap_files()?;
            config.save()?;

            println!("Config saved: {key} = {value}");
            Ok(())
        }
        ConfigCommands::Get { key } => {
            let config = load_config()?;
            let value = config
                .get_value(&key)
                .with_context(|| format!("Unsupported config key: {key}"))?;

            println!("{value}");
            Ok(())
        }
    }
}

fn handle_status() -> Result<()> {
    let config = load_config()?;
    let database = Database::open(&config.db_path)?;
    let stats = database.stats()?;

    println!("HabitDeck status");
    println!("- config: {}", Config::config_path()?.display());
    println!("- db_path: {}", config.db_path.display());
    println!("- api_port: {}", config.api_port);
    println!(
        "- default_username: {}",
        config
            .default_username
            .clone()
            .unwrap_or_else(|| "none".to_string())
    );
    println!("- users: {}", stats.users);
    println!("- habits: {}", stats.habits);
    println!("- logs: {}", stats.logs);
    println!("- challenges: {}", stats.challenges);

    Ok(())
}

fn handle_doctor() -> Result<()> {
    let config_path = Config::config_path()?;
    let mut issues = Vec::new();

    if config_path.exists() {
        println!("[OK] config.json found: {}", config_path.display());
    } else {
        println!("[WARN] config.json not found: {}", config_path.display());
        issues.push("config missing".to_string());
    }

    let config = load_or_default_config()?;

    match Database::open(&config.db_path) {
        Ok(database) => {
            println!("[OK] SQLite reachable: {}", config.db_path.display());

            match database.stats() {
                Ok(stats) if stats.users == 0 => {
                    println!("[WARN] no users yet. Run `habitdeck init` or `habitdeck user add`.");
                    issues.push("no users".to_string());
                }
                Ok(stats) => println!("[OK] {} user(s), {} habit(s)", stats.users, stats.habits),
                Err(error) => {
                    println!("[WARN] stats query failed: {error}");
                    issues.push("stats unreadable".to_string());
                }
            }

            if let Some(username) = config.default_username.as_deref() {
                if database.user_by_username(username)?.is_some() {
                    println!("[OK] default user '{username}' exists");
                } else {
                    println!("[WARN] default user '{username}' not found in DB");
                    issues.push("default user missing".to_string());
                }
            }
        }
        Err(error) => {
            println!("[WARN] SQLite check failed: {error}");
            issues.push("db unreachable".to_string());
        }
    }

    if api::frontend_asset("index.html").is_some() {
        println!("[OK] embedded dashboard frontend present");
    } else {
        println!("[WARN] embedded dashboard frontend missing");
        issues.push("frontend missing".to_string());
    }

    if issues.is_empty() {
        println!("doctor result: no issues");
    } else {
        println!("doctor result: {} warning(s)", issues.len());
    }

    Ok(())
}

fn handle_dashboard(user: Option<String>, habit: Option<i64>) -> Result<()> {
    let config = load_config()?;
    let database = Database::open(&config.db_path)?;
    let username = resolve_username(&config, user)?;
    let user_row = database
        .user_by_username(&username)?
        .with_context(|| format!("Unknown user: {username}. Run `habitdeck user add` first."))?;

    let filter = habit.map(|id| vec![id]);
    let view = dashboard::compose(
        &database,
        &database,
        &database,
        user_row.id,
        filter.as_deref(),
        Utc::now(),
    )?;

    println!("{}", serde_json::to_string_pretty(&view)?);
    Ok(())
}

fn handle_user_command(command: UserCommands) -> Result<()> {
    match command {
        UserCommands::Add {
            username,
            display_name,
            avatar,
        } => {
            let username = username.trim().to_string();
            if username.is_empty() {
                bail!("Username must not be empty");
            }
            if let Some(raw) = avatar.as_deref() {
                Url::parse(raw).with_context(|| format!("Invalid avatar URL: {raw}"))?;
            }

            let config = load_or_default_config()?;
            let database = Database::open(&config.db_path)?;
            let display = display_name.unwrap_or_else(|| username.clone());
            let id = database.create_user(&username, &display, avatar.as_deref())?;

            println!("Created user '{username}' (id {id})");
            Ok(())
        }
    }
}

fn handle_habit_command(command: HabitCommands) -> Result<()> {
    match command {
        HabitCommands::Add {
            name,
            user,
            emoji,
            color,
            category,
            kind,
            unit,
        } => {
            let name = name.trim().to_string();
            if name.is_empty() {
                bail!("Habit name must not be empty");
            }

            let config = load_config()?;
            let database = Database::open(&config.db_path)?;
            let user_row = resolve_user_row(&config, &database, user)?;

            let id = database.create_habit(
                user_row.id,
                &name,
                emoji.as_deref(),
                color.as_deref(),
                category.as_deref(),
                kind.as_deref(),
                unit.as_deref(),
            )?;

            println!("Created habit '{name}' (id {id})");
            Ok(())
        }
        HabitCommands::List { user } => {
            let config = load_config()?;
            let database = Database::open(&config.db_path)?;
            let user_row = resolve_user_row(&config, &database, user)?;
            let habits = database.list_habits(user_row.id)?;

            if habits.is_empty() {
                println!("No habits yet. Run `habitdeck habit add <name>`.");
                return Ok(());
            }

            for habit in habits {
                let emoji = habit
                    .emoji
                    .as_deref()
                    .filter(|value| !value.trim().is_empty())
                    .unwrap_or_else(|| metadata::guess_emoji(&habit.name));
                let kind = metadata::normalize_kind(habit.kind.as_deref());
                let unit = metadata::normalize_unit(habit.unit.as_deref());

                println!(
                    "{:>4}  {} {}  [{} in {}]",
                    habit.id,
                    emoji,
                    habit.name,
                    kind.as_str(),
                    unit
                );
            }

            Ok(())
        }
    }
}

fn handle_log_command(command: LogCommands) -> Result<()> {
    match command {
        LogCommands::Add {
            habit,
            value,
            user,
            at,
        } => {
            let config = load_config()?;
            let database = Database::open(&config.db_path)?;
            let user_row = resolve_user_row(&config, &database, user)?;

            let owned = database
                .list_habits(user_row.id)?
                .iter()
                .any(|row| row.id == habit);
            if !owned {
                bail!(
                    "Unknown habit id {habit} for user '{}'. Run `habitdeck habit list`.",
                    user_row.username
                );
            }

            let recorded_at = parse_optional_timestamp(at)?;
            // A bare `log add` marks the habit done for the day.
            let raw = value.unwrap_or_else(|| "1".to_string());
            let parsed: Value = serde_json::from_str(&raw).unwrap_or(Value::String(raw));

            let id = database.create_log(user_row.id, habit, recorded_at, Some(&parsed))?;
            println!(
                "Logged {parsed} for habit {habit} at {} (log id {id})",
                recorded_at.format("%Y-%m-%d %H:%M")
            );

            Ok(())
        }
    }
}

fn handle_challenge_command(command: ChallengeCommands) -> Result<()> {
    match command {
        ChallengeCommands::Add {
            title,
            user,
            opponent,
            kind,
            end_date,
        } => {
            let title = title.trim().to_string();
            if title.is_empty() {
                bail!("Challenge title must not be empty");
            }

            let config = load_config()?;
            let database = Database::open(&config.db_path)?;
            let owner = resolve_user_row(&config, &database, user)?;

            let opponent_id = opponent
                .as_deref()
                .map(|name| {
                    database
                        .user_by_username(name)?
                        .map(|row| row.id)
                        .with_context(|| format!("Unknown opponent: {name}"))
                })
                .transpose()?;

            let end = end_date.as_deref().map(parse_end_date).transpose()?;
            let kind = kind.unwrap_or_else(|| {
                if opponent_id.is_some() { "friend" } else { "personal" }.to_string()
            });

            let id = database.create_challenge(&title, &kind, owner.id, opponent_id, end)?;
            println!("Created challenge '{title}' (id {id})");

            Ok(())
        }
        ChallengeCommands::List { user } => {
            let config = load_config()?;
            let database = Database::open(&config.db_path)?;
            let user_row = resolve_user_row(&config, &database, user)?;

            let challenges = database.active_for(user_row.id)?;
            if challenges.is_empty() {
                println!("No active challenges.");
                return Ok(());
            }

            let summaries =
                dashboard::challenge::challenge_summaries(user_row.id, &challenges, Utc::now());
            for summary in summaries {
                let rival = summary
                    .opponent_name
                    .map(|name| format!("  vs {name}"))
                    .unwrap_or_default();

                println!(
                    "{:>4}  {}  ({} joined, {} day(s) left){rival}",
                    summary.id, summary.title, summary.participants, summary.days_left
                );
            }

            Ok(())
        }
        ChallengeCommands::Archive { id } => {
            let config = load_config()?;
            let database = Database::open(&config.db_path)?;

            if database.archive_challenge(id)? {
                println!("Archived challenge {id}");
            } else {
                bail!("No challenge with id {id}");
            }

            Ok(())
        }
    }
}

async fn run_service(config: Config) -> Result<()> {
    config.ensure_bootstrap_files()?;
    let _ = Database::open(&config.db_path)?;

    let shared_config = Arc::new(config);

    info!("HabitDeck service started");

    tokio::select! {
        api_result = api::run_server(Arc::clone(&shared_config)) => {
            api_result?;
        }
        _ = signal::ctrl_c() => {
            info!("shutdown signal received");
        }
    }

    Ok(())
}

fn resolve_username(config: &Config, explicit: Option<String>) -> Result<String> {
    explicit
        .or_else(|| config.default_username.clone())
        .context("No user given. Pass --user or set `default_username` in the config.")
}

fn resolve_user_row(
    config: &Config,
    database: &Database,
    explicit: Option<String>,
) -> Result<UserRow> {
    let username = resolve_username(config, explicit)?;

    database
        .user_by_username(&username)?
        .with_context(|| format!("Unknown user: {username}. Run `habitdeck user add` first."))
}

fn parse_optional_timestamp(input: Option<String>) -> Result<DateTime<Utc>> {
    input
        .as_deref()
        .map(|raw| {
            DateTime::parse_from_rfc3339(raw)
                .map(|parsed| parsed.with_timezone(&Utc))
                .or_else(|_| parse_end_date(raw))
                .with_context(|| {
                    format!("Invalid timestamp: {raw}. Example: 2026-02-18T21:30:00Z or 2026-02-18")
                })
        })
        .transpose()?
        .map_or_else(|| Ok(Utc::now()), Ok)
}

fn parse_end_date(input: &str) -> Result<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .with_context(|| format!("Invalid date format: {input}. Example: 2026-02-18"))?;

    date.and_hms_opt(0, 0, 0)
        .map(|datetime| datetime.and_utc())
        .with_context(|| format!("Invalid date: {input}"))
}

fn load_or_default_config() -> Result<Config> {
    Config::load().or_else(|_| {
        let config = Config::default();
        config.ensure_bootstrap_files()?;
        config.save()?;
        Ok(config)
    })
}

fn load_config() -> Result<Config> {
    Config::load().with_context(|| "Config file not found. Run `habitdeck init` first.".to_string())
}
