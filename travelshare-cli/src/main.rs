//! TravelShare CLI - share your trips from the terminal

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use uuid::Uuid;

mod commands;
mod output;

use commands::{admin, auth, demo, feed, setup, status, trips, upgrade};

/// TravelShare - share your trips from the terminal
#[derive(Parser)]
#[command(name = "tvs", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in with email and password
    Login {
        /// Account email
        email: Option<String>,
        /// Password (prompted when omitted)
        #[arg(long)]
        password: Option<String>,
    },

    /// Create an account and its profile
    Register {
        /// Account email
        email: Option<String>,
        /// Public username
        #[arg(long)]
        username: Option<String>,
        /// Password (prompted when omitted)
        #[arg(long)]
        password: Option<String>,
    },

    /// Sign out of the current session
    Logout,

    /// Show the signed-in account, plan, and entitlements
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Browse the public trip feed
    Feed {
        /// Filter by title or location
        search: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List your own trips
    Trips {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show one trip in full
    Show {
        /// Trip id
        id: Uuid,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Post a new trip
    Post {
        /// Trip title
        title: String,
        /// What happened on the trip
        #[arg(long, short)]
        description: String,
        /// Where the trip took place
        #[arg(long, short)]
        location: String,
        /// Latitude of the location
        #[arg(long)]
        lat: Option<f64>,
        /// Longitude of the location
        #[arg(long)]
        lng: Option<f64>,
        /// Path to a photo to attach
        #[arg(long)]
        photo: Option<PathBuf>,
    },

    /// Edit one of your trips
    Edit {
        /// Trip id
        id: Uuid,
        /// New title
        #[arg(long)]
        title: Option<String>,
        /// New description
        #[arg(long, short)]
        description: Option<String>,
        /// New location
        #[arg(long, short)]
        location: Option<String>,
        /// New latitude
        #[arg(long)]
        lat: Option<f64>,
        /// New longitude
        #[arg(long)]
        lng: Option<f64>,
        /// Replacement photo
        #[arg(long)]
        photo: Option<PathBuf>,
    },

    /// Delete one of your trips
    Delete {
        /// Trip id
        id: Uuid,
        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
    },

    /// Upgrade to the premium plan
    Upgrade {
        /// Skip confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },

    /// Moderation commands (admin account only)
    Admin {
        #[command(subcommand)]
        command: admin::AdminCommands,
    },

    /// Manage demo mode
    Demo {
        #[command(subcommand)]
        command: Option<demo::DemoCommands>,
    },

    /// Point the CLI at a Supabase project
    Setup {
        /// Supabase project URL
        #[arg(long)]
        url: Option<String>,
        /// Anon (publishable) key
        #[arg(long)]
        anon_key: Option<String>,
        /// Admin account email
        #[arg(long)]
        admin_email: Option<String>,
    },
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    if !atty::is(atty::Stream::Stdout) {
        colored::control::set_override(false);
    }
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(&format!("{e}"));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Login { email, password } => auth::login(email, password).await,
        Commands::Register { email, username, password } => {
            auth::register(email, username, password).await
        }
        Commands::Logout => auth::logout().await,
        Commands::Status { json } => status::run(json).await,
        Commands::Feed { search, json } => feed::run(search, json).await,
        Commands::Trips { json } => trips::list(json).await,
        Commands::Show { id, json } => trips::show(id, json).await,
        Commands::Post { title, description, location, lat, lng, photo } => {
            trips::post(title, description, location, lat, lng, photo).await
        }
        Commands::Edit { id, title, description, location, lat, lng, photo } => {
            trips::edit(id, title, description, location, lat, lng, photo).await
        }
        Commands::Delete { id, force } => trips::delete(id, force).await,
        Commands::Upgrade { yes } => upgrade::run(yes).await,
        Commands::Admin { command } => admin::run(command).await,
        Commands::Demo { command } => demo::run(command),
        Commands::Setup { url, anon_key, admin_email } => setup::run(url, anon_key, admin_email),
    }
}
