//! Named parameter presets stored as JSON

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::Result;

use super::mode::IndependentMode;
use super::params::AnimationParameters;

/// A saved mode selection together with its parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnimationPreset {
    pub name: String,
    #[serde(default)]
    pub mode: IndependentMode,
    #[serde(default)]
    pub parameters: AnimationParameters,
}

impl AnimationPreset {
    pub fn new(name: impl Into<String>, mode: IndependentMode, parameters: AnimationParameters) -> Self {
        Self {
            name: name.into(),
            mode,
            parameters,
        }
    }

    /// Parse and validate a preset.
    pub fn from_json(json: &str) -> Result<Self> {
        let preset: Self = serde_json::from_str(json)?;
        preset.parameters.validate()?;
        Ok(preset)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load from file
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Save to file, creating parent directories as needed
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = self.to_json()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load every `*.json` preset in `dir`, sorted by name.
    ///
    /// Files that fail to parse or validate are skipped with a warning.
    pub fn load_dir(dir: &Path) -> Result<Vec<Self>> {
        let mut presets = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().is_none_or(|ext| ext != "json") {
                continue;
            }
            match Self::load(&path) {
                Ok(preset) => presets.push(preset),
                Err(e) => log::warn!("Skipping preset {}: {}", path.display(), e),
            }
        }
        presets.sort_by(|a, b| a.name.cmp(&b.name));
        log::debug!("Loaded {} presets from {}", presets.len(), dir.display());
        Ok(presets)
    }
}
