//! Admin commands - moderation dashboard

use anyhow::Result;
use clap::Subcommand;
use dialoguer::Confirm;
use uuid::Uuid;

use super::{get_context, require_user};
use crate::output;

#[derive(Subcommand)]
pub enum AdminCommands {
    /// List every trip with its author
    List {
        /// Filter by author username or trip title
        search: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete any trip by id
    Delete {
        /// Trip id
        id: Uuid,
        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
    },
}

pub async fn run(command: AdminCommands) -> Result<()> {
    match command {
        AdminCommands::List { search, json } => list(search, json).await,
        AdminCommands::Delete { id, force } => delete(id, force).await,
    }
}

async fn list(search: Option<String>, json: bool) -> Result<()> {
    let context = get_context().await?;
    let user = require_user(&context)?;
    let trips = context
        .admin_service
        .list_all_trips(&user, search.as_deref())
        .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&trips)?);
        return Ok(());
    }

    if trips.is_empty() {
        output::info("No trips found");
        return Ok(());
    }

    let mut table = output::create_table();
    table.set_header(vec!["ID", "Title", "Author", "Location", "Posted"]);
    for item in &trips {
        table.add_row(vec![
            item.trip.id.to_string(),
            output::truncate(&item.trip.title, 40),
            item.author_username
                .clone()
                .unwrap_or_else(|| "unknown".to_string()),
            item.trip.location_name.clone(),
            item.trip.created_at.format("%Y-%m-%d").to_string(),
        ]);
    }
    println!("{table}");
    println!("{} trip(s)", trips.len());
    Ok(())
}

async fn delete(id: Uuid, force: bool) -> Result<()> {
    let context = get_context().await?;
    let user = require_user(&context)?;

    if !force {
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete trip {id} as admin?"))
            .default(false)
            .interact()?;
        if !confirmed {
            output::info("Cancelled");
            return Ok(());
        }
    }

    context.admin_service.delete_trip(&user, id).await?;
    output::success("Trip deleted");
    Ok(())
}
