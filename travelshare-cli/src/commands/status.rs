//! Status command - who is signed in and what their plan allows

use anyhow::Result;
use colored::Colorize;
use serde_json::json;

use super::get_context;
use crate::output;
use travelshare_core::{PlanLevel, MAX_FREE_TRIPS};

pub async fn run(json: bool) -> Result<()> {
    let context = get_context().await?;
    let state = context.session.state();

    let Some(user) = state.user.clone() else {
        if json {
            println!("{}", json!({ "signedIn": false }));
        } else {
            output::warning("Not signed in. Run 'tvs login' first.");
        }
        return Ok(());
    };
    let entitlements = context.session.entitlements();
    let trip_count = context.trip_service.trip_count(user.id()).await?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({
                "signedIn": true,
                "email": user.email(),
                "username": user.username(),
                "planLevel": user.plan_level(),
                "isPremium": entitlements.is_premium,
                "isAdmin": entitlements.is_admin,
                "tripCount": trip_count,
            }))?
        );
        return Ok(());
    }

    println!("Signed in as {}", user.email().bold());
    match user.username() {
        Some(username) => println!("Username:  {username}"),
        None => output::warning("Profile missing: showing bare account details"),
    }
    let plan = match user.plan_level() {
        PlanLevel::Premium => "premium".magenta().to_string(),
        PlanLevel::Free => "free".normal().to_string(),
    };
    println!("Plan:      {plan}");
    if entitlements.is_admin {
        println!("Role:      {}", "admin".red());
    }
    if entitlements.is_premium {
        println!("Trips:     {trip_count} (unlimited posting)");
    } else {
        println!("Trips:     {trip_count} of {MAX_FREE_TRIPS} free post used");
    }
    Ok(())
}
