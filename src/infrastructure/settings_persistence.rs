use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing::info;

/// User settings remembered between runs.
///
/// Range and side are stored in their textual form (`"region"`, `"5"`,
/// `"buy"`) and parsed on load, so the file stays hand-editable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedSettings {
    pub order_range: String,
    pub reprice_side: String,
    pub marketlog_dir: Option<PathBuf>,
}

impl Default for PersistedSettings {
    fn default() -> Self {
        Self {
            order_range: "region".to_string(),
            reprice_side: "buy".to_string(),
            marketlog_dir: None,
        }
    }
}

pub struct SettingsPersistence {
    file_path: PathBuf,
}

impl SettingsPersistence {
    pub fn new() -> Result<Self> {
        let home = std::env::var("HOME").context("Could not find HOME directory")?;
        Ok(Self::in_dir(PathBuf::from(home).join(".outbid")))
    }

    /// Settings under an explicit base directory. Tests use this to stay
    /// out of the real user profile.
    pub fn in_dir(config_dir: PathBuf) -> Self {
        Self {
            file_path: config_dir.join("settings.json"),
        }
    }

    pub fn load(&self) -> Result<Option<PersistedSettings>> {
        if !self.file_path.exists() {
            return Ok(None);
        }

        let content =
            fs::read_to_string(&self.file_path).context("Failed to read settings file")?;
        let settings: PersistedSettings =
            serde_json::from_str(&content).context("Failed to parse settings JSON")?;

        info!("Loaded settings from {}", self.file_path.display());
        Ok(Some(settings))
    }

    pub fn save(&self, settings: &PersistedSettings) -> Result<()> {
        if let Some(dir) = self.file_path.parent() {
            fs::create_dir_all(dir).context("Failed to create config directory")?;
        }
        let content =
            serde_json::to_string_pretty(settings).context("Failed to serialize settings")?;

        // Atomic write: write to temp file then rename
        let temp_path = self.file_path.with_extension("tmp");
        fs::write(&temp_path, content).context("Failed to write temp settings file")?;
        fs::rename(&temp_path, &self.file_path).context("Failed to rename settings file")?;

        info!("Saved settings to {}", self.file_path.display());
        Ok(())
    }
}
