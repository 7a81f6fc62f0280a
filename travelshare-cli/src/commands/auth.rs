//! Auth commands - login, register, logout

use anyhow::Result;
use dialoguer::{Input, Password};

use super::get_context;
use crate::output;

pub async fn login(email: Option<String>, password: Option<String>) -> Result<()> {
    let context = get_context().await?;

    let email = match email {
        Some(email) => email,
        None => Input::new().with_prompt("Email").interact_text()?,
    };
    let password = match password {
        Some(password) => password,
        None => Password::new().with_prompt("Password").interact()?,
    };

    let session = context.auth_service.sign_in(&email, &password).await?;
    // The auth listener re-enriches in the background; wait for the
    // store to settle so the greeting can show the profile.
    context.session.refresh().await;

    let state = context.session.state();
    let greeting = state
        .user
        .as_ref()
        .and_then(|u| u.username().map(str::to_string))
        .unwrap_or_else(|| session.user.email.clone());
    output::success(&format!("Signed in as {greeting}"));
    Ok(())
}

pub async fn register(
    email: Option<String>,
    username: Option<String>,
    password: Option<String>,
) -> Result<()> {
    let context = get_context().await?;

    let email = match email {
        Some(email) => email,
        None => Input::new().with_prompt("Email").interact_text()?,
    };
    let username = match username {
        Some(username) => username,
        None => Input::new().with_prompt("Username").interact_text()?,
    };
    let password = match password {
        Some(password) => password,
        None => Password::new()
            .with_prompt("Password")
            .with_confirmation("Confirm password", "Passwords do not match")
            .interact()?,
    };

    context
        .auth_service
        .sign_up(&email, &password, &username)
        .await?;
    context.session.refresh().await;
    output::success(&format!("Welcome to TravelShare, {username}!"));
    output::info("You are on the free plan: one trip post included.");
    Ok(())
}

pub async fn logout() -> Result<()> {
    let context = get_context().await?;
    if !context.session.state().has_identity() {
        output::warning("Not signed in");
        return Ok(());
    }
    context.session.sign_out().await?;
    output::success("Signed out");
    Ok(())
}
