use anyhow::{anyhow, Context, Result};
use directories::ProjectDirs;
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

static SETTINGS_FILE_NAME: &str = "settings.json";

const DEFAULT_SERVER_URL: &str = "http://localhost:3000";

/// Process-wide settings with an explicit load-at-startup / save-on-change
/// lifecycle. The core components only ever see the resolved server address;
/// nothing in here leaks into their state.
pub struct ProjectConfig {
    pub settings: Settings,
    settings_path: PathBuf,
}

impl ProjectConfig {
    pub fn new() -> Result<Self> {
        let proj_dirs = ProjectDirs::from("com", "ftpweb", "ftpweb-client")
            .ok_or_else(|| anyhow!("Failed to resolve project directories"))?;
        let config_dir = proj_dirs.config_dir();
        if !config_dir.exists() {
            fs::create_dir_all(config_dir).context("Failed to create config directory")?;
        }
        let settings_path = config_dir.join(SETTINGS_FILE_NAME);
        let settings = Settings::load_or_default(&settings_path)?;
        Ok(Self { settings, settings_path })
    }

    pub fn save(&self) -> Result<()> {
        self.settings.save_to_file(&self.settings_path)
    }

    /// Record a new server address. The caller must treat this as a logout:
    /// a token is only valid for the address that issued it.
    pub fn set_server_url(&mut self, url: &str) -> Result<()> {
        self.settings.last_url = url.trim_end_matches('/').to_string();
        self.save()
    }

    /// Save the current server address under a preset name.
    pub fn save_preset(&mut self, name: &str) -> Result<()> {
        let url = self.settings.last_url.clone();
        self.settings.presets.insert(name.to_string(), url);
        self.save()
    }

    /// Look up a preset and make it the current server address.
    pub fn apply_preset(&mut self, name: &str) -> Result<()> {
        let url = self
            .settings
            .presets
            .get(name)
            .cloned()
            .ok_or_else(|| anyhow!("No preset named `{}`", name))?;
        self.set_server_url(&url)
    }
}

/// Persisted settings: the last-used server address and named URL presets.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Settings {
    pub last_url: String,
    #[serde(default)]
    pub presets: BTreeMap<String, String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            last_url: DEFAULT_SERVER_URL.to_string(),
            presets: BTreeMap::new(),
        }
    }
}

impl Settings {
    /// Load settings, falling back to (and persisting) defaults when the
    /// file is missing or unreadable.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        match Self::load_from_file(path) {
            Ok(settings) => Ok(settings),
            Err(e) => {
                warn!("Error loading settings, creating default config: {}", e);
                let default = Self::default();
                default.save_to_file(path)?;
                Ok(default)
            }
        }
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;
        serde_json::from_str(&raw).context("Failed to parse settings file")
    }

    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let raw = serde_json::to_string_pretty(self).context("Failed to serialize settings")?;
        fs::write(path, raw)
            .with_context(|| format!("Failed to write settings to {}", path.display()))?;
        Ok(())
    }
}
