use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Application configuration for persisting user preferences.
///
/// DSP parameters are fixed; only host-side choices live here.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct AppConfig {
    #[serde(default)]
    pub last_input: String,
    /// Samples per block when feeding files through the pipeline (one render quantum).
    #[serde(default = "default_block_size")]
    pub block_size: usize,
    #[serde(default)]
    pub json_output: bool,
}

fn default_block_size() -> usize {
    128
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            last_input: String::new(),
            block_size: default_block_size(),
            json_output: false,
        }
    }
}

impl AppConfig {
    /// Loads configuration from disk, or returns default if not found.
    pub fn load() -> Self {
        if let Some(path) = config_path() {
            if let Ok(content) = fs::read_to_string(path) {
                if let Ok(cfg) = serde_json::from_str(&content) {
                    return cfg;
                }
            }
        }
        Self::default()
    }

    /// Saves configuration to disk in JSON format.
    pub fn save(&self) {
        if let Some(path) = config_path() {
            if let Some(parent) = path.parent() {
                let _ = fs::create_dir_all(parent);
            }
            if let Ok(json) = serde_json::to_string_pretty(self) {
                let _ = fs::write(path, json);
            }
        }
    }

    /// Input device to open: the explicit choice, else the last one used, else "default".
    pub fn resolve_input(&self, requested: Option<&str>) -> String {
        match requested {
            Some(name) => name.to_string(),
            None if !self.last_input.is_empty() => self.last_input.clone(),
            None => "default".to_string(),
        }
    }
}

fn config_path() -> Option<PathBuf> {
    ProjectDirs::from("com", "voxfront", "voxfront").map(|dirs| dirs.config_dir().join("config.json"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_values() {
        let config = AppConfig::default();
        assert_eq!(config.block_size, 128);
        assert!(config.last_input.is_empty());
        assert!(!config.json_output);
    }

    #[test]
    fn test_config_deserialization_with_defaults() {
        // Minimal JSON - should fill in defaults
        let json = r#"{"last_input":"USB Mic"}"#;
        let config: AppConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.last_input, "USB Mic");
        assert_eq!(config.block_size, 128); // Default
        assert!(!config.json_output); // Default false
    }

    #[test]
    fn test_config_roundtrip() {
        let original = AppConfig {
            last_input: "Headset".to_string(),
            block_size: 441,
            json_output: true,
        };

        let json = serde_json::to_string(&original).unwrap();
        assert!(json.contains("\"block_size\":441"));
        let restored: AppConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(restored.last_input, original.last_input);
        assert_eq!(restored.block_size, original.block_size);
        assert_eq!(restored.json_output, original.json_output);
    }

    #[test]
    fn test_resolve_input() {
        let mut config = AppConfig::default();
        assert_eq!(config.resolve_input(None), "default");
        config.last_input = "Headset".to_string();
        assert_eq!(config.resolve_input(None), "Headset");
        assert_eq!(config.resolve_input(Some("USB Mic")), "USB Mic");
    }
}
