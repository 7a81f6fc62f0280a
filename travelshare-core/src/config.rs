//! Configuration management
//!
//! Settings live in `settings.json` inside the TravelShare directory:
//! ```json
//! {
//!   "app": {
//!     "demoMode": false,
//!     "supabaseUrl": "https://xyz.supabase.co",
//!     "anonKey": "...",
//!     "adminEmail": "admin@travelshare.app"
//!   }
//! }
//! ```

use std::collections::HashMap;
use std::path::Path;

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Raw settings.json structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default)]
    app: AppSettings,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppSettings {
    #[serde(default)]
    demo_mode: bool,
    #[serde(default)]
    supabase_url: Option<String>,
    #[serde(default)]
    anon_key: Option<String>,
    #[serde(default)]
    admin_email: Option<String>,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

/// TravelShare configuration (simplified view of settings)
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub demo_mode: bool,
    pub supabase_url: Option<String>,
    pub anon_key: Option<String>,
    pub admin_email: String,
    // Keep the raw settings for preservation when saving
    _raw_settings: SettingsFile,
}

impl Config {
    /// Load config from the TravelShare directory
    ///
    /// Environment variables override the file, which keeps CI and
    /// one-off runs away from the user's settings:
    /// `TRAVELSHARE_URL`, `TRAVELSHARE_ANON_KEY`,
    /// `TRAVELSHARE_ADMIN_EMAIL`, `TRAVELSHARE_DEMO_MODE`.
    pub fn load(app_dir: &Path) -> Result<Self> {
        let settings_path = app_dir.join("settings.json");

        let raw: SettingsFile = if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)?;
            serde_json::from_str(&content).unwrap_or_default()
        } else {
            SettingsFile::default()
        };

        let demo_mode = match std::env::var("TRAVELSHARE_DEMO_MODE").ok().as_deref() {
            Some("true" | "1" | "yes" | "TRUE" | "YES") => true,
            Some("false" | "0" | "no" | "FALSE" | "NO") => false,
            _ => raw.app.demo_mode,
        };

        let supabase_url = std::env::var("TRAVELSHARE_URL")
            .ok()
            .or_else(|| raw.app.supabase_url.clone());
        let anon_key = std::env::var("TRAVELSHARE_ANON_KEY")
            .ok()
            .or_else(|| raw.app.anon_key.clone());
        let admin_email = std::env::var("TRAVELSHARE_ADMIN_EMAIL")
            .ok()
            .or_else(|| raw.app.admin_email.clone())
            .unwrap_or_else(|| "admin@travelshare.app".to_string());

        Ok(Self {
            demo_mode,
            supabase_url,
            anon_key,
            admin_email,
            _raw_settings: raw,
        })
    }

    /// Save config to the TravelShare directory
    /// Preserves settings fields the CLI doesn't manage
    pub fn save(&self, app_dir: &Path) -> Result<()> {
        let settings_path = app_dir.join("settings.json");

        let mut settings = if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)?;
            serde_json::from_str::<SettingsFile>(&content).unwrap_or_default()
        } else {
            SettingsFile::default()
        };

        settings.app.demo_mode = self.demo_mode;
        settings.app.supabase_url = self.supabase_url.clone();
        settings.app.anon_key = self.anon_key.clone();
        settings.app.admin_email = Some(self.admin_email.clone());

        let content = serde_json::to_string_pretty(&settings)?;
        std::fs::write(&settings_path, content)?;
        Ok(())
    }

    /// Enable demo mode
    pub fn enable_demo_mode(&mut self) {
        self.demo_mode = true;
    }

    /// Disable demo mode
    pub fn disable_demo_mode(&mut self) {
        self.demo_mode = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert!(!config.demo_mode);
        assert_eq!(config.admin_email, "admin@travelshare.app");
    }

    #[test]
    fn test_save_round_trips_managed_fields() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::load(dir.path()).unwrap();
        config.demo_mode = true;
        config.supabase_url = Some("http://localhost:54321".to_string());
        config.anon_key = Some("anon".to_string());
        config.save(dir.path()).unwrap();

        let loaded = Config::load(dir.path()).unwrap();
        assert!(loaded.demo_mode);
        assert_eq!(loaded.supabase_url.as_deref(), Some("http://localhost:54321"));
        assert_eq!(loaded.anon_key.as_deref(), Some("anon"));
    }

    #[test]
    fn test_unmanaged_fields_survive_save() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("settings.json"),
            r#"{"app": {"demoMode": false, "theme": "dark"}}"#,
        )
        .unwrap();

        let mut config = Config::load(dir.path()).unwrap();
        config.demo_mode = true;
        config.save(dir.path()).unwrap();

        let content = std::fs::read_to_string(dir.path().join("settings.json")).unwrap();
        assert!(content.contains("theme"));
    }
}
