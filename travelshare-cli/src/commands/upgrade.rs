//! Upgrade command - move the account to the premium plan

use anyhow::Result;
use dialoguer::Confirm;

use super::{get_context, require_user};
use crate::output;
use travelshare_core::PlanLevel;

pub async fn run(yes: bool) -> Result<()> {
    let context = get_context().await?;
    let user = require_user(&context)?;

    if user.plan_level() == PlanLevel::Premium {
        output::info("Already on the premium plan");
        return Ok(());
    }

    if let Some(username) = context.upgrade_service.current_username(user.id()).await? {
        println!("Upgrading account '{username}' to premium.");
    }
    println!("Premium removes the one-post limit on the free plan.");

    if !yes {
        let confirmed = Confirm::new()
            .with_prompt("Upgrade now?")
            .default(true)
            .interact()?;
        if !confirmed {
            output::info("Cancelled");
            return Ok(());
        }
    }

    context.upgrade_service.upgrade(&user).await?;
    output::success("You are now on the premium plan. Happy travels!");
    Ok(())
}
