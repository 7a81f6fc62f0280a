//! CLI command implementations

pub mod admin;
pub mod auth;
pub mod demo;
pub mod feed;
pub mod setup;
pub mod status;
pub mod trips;
pub mod upgrade;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use travelshare_core::services::{requires_session, GuardDecision};
use travelshare_core::{EnrichedUser, TravelShareContext};

/// Get the TravelShare directory from environment or default
pub fn get_app_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("TRAVELSHARE_DIR") {
        PathBuf::from(dir)
    } else {
        dirs::home_dir()
            .expect("Could not find home directory")
            .join(".travelshare")
    }
}

/// Build the context and resolve the persisted session
pub async fn get_context() -> Result<TravelShareContext> {
    let app_dir = get_app_dir();

    std::fs::create_dir_all(&app_dir)
        .with_context(|| format!("Failed to create TravelShare directory: {:?}", app_dir))?;

    let context = TravelShareContext::new(&app_dir)
        .context("Failed to initialize TravelShare context")?;
    context.session.bootstrap().await;
    Ok(context)
}

/// The signed-in user, or a sign-in hint if there is none
pub fn require_user(context: &TravelShareContext) -> Result<EnrichedUser> {
    let state = context.session.state();
    match requires_session(&state) {
        GuardDecision::Allowed => Ok(state
            .user
            .clone()
            .context("session state changed underneath the guard")?),
        _ => bail!("Not signed in. Run 'tvs login' first."),
    }
}
