pub mod onboard;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "habitdeck",
    about = "Self-hosted habit tracking & dashboard service"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    Init {
        #[arg(long, default_value_t = false)]
        yes: bool,
    },
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    Status,
    Doctor,
    Serve,
    Dashboard {
        #[arg(long)]
        user: Option<String>,
        #[arg(long)]
        habit: Option<i64>,
    },
    User {
        #[command(subcommand)]
        command: UserCommands,
    },
    Habit {
        #[command(subcommand)]
        command: HabitCommands,
    },
    Log {
        #[command(subcommand)]
        command: LogCommands,
    },
    Challenge {
        #[command(subcommand)]
        command: ChallengeCommands,
    },
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    Set { key: String, value: String },
    Get { key: String },
}

#[derive(Debug, Subcommand)]
pub enum UserCommands {
    Add {
        username: String,
        #[arg(long)]
        display_name: Option<String>,
        #[arg(long)]
        avatar: Option<String>,
    },
}

#[derive(Debug, Subcommand)]
pub enum HabitCommands {
    Add {
        name: String,
        #[arg(long)]
        user: Option<String>,
        #[arg(long)]
        emoji: Option<String>,
        #[arg(long)]
        color: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        kind: Option<String>,
        #[arg(long)]
        unit: Option<String>,
    },
    List {
        #[arg(long)]
        user: Option<String>,
    },
}

#[derive(Debug, Subcommand)]
pub enum LogCommands {
    Add {
        #[arg(long)]
        habit: i64,
        #[arg(long)]
        value: Option<String>,
        #[arg(long)]
        user: Option<String>,
        #[arg(long)]
        at: Option<String>,
    },
}

#[derive(Debug, Subcommand)]
pub enum ChallengeCommands {
    Add {
        title: String,
        #[arg(long)]
        user: Option<String>,
        #[arg(long)]
        opponent: Option<String>,
        #[arg(long)]
        kind: Option<String>,
        #[arg(long)]
        end_date: Option<String>,
    },
    List {
        #[arg(long)]
        user: Option<String>,
    },
    Archive { id: i64 },
}
