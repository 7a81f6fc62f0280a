//! Setup command - point the CLI at a Supabase project

use anyhow::Result;
use dialoguer::Input;

use super::get_app_dir;
use crate::output;
use travelshare_core::config::Config;

pub fn run(url: Option<String>, anon_key: Option<String>, admin_email: Option<String>) -> Result<()> {
    let app_dir = get_app_dir();
    std::fs::create_dir_all(&app_dir)?;
    let mut config = Config::load(&app_dir)?;

    let url = match url {
        Some(url) => url,
        None => Input::new()
            .with_prompt("Supabase project URL")
            .with_initial_text(config.supabase_url.clone().unwrap_or_default())
            .interact_text()?,
    };
    let anon_key = match anon_key {
        Some(key) => key,
        None => Input::new()
            .with_prompt("Anon (publishable) key")
            .interact_text()?,
    };

    config.supabase_url = Some(url);
    config.anon_key = Some(anon_key);
    if let Some(admin_email) = admin_email {
        config.admin_email = admin_email;
    }
    config.demo_mode = false;
    config.save(&app_dir)?;

    output::success("Configuration saved");
    output::info("Run 'tvs login' to sign in, or 'tvs register' to create an account.");
    Ok(())
}
