use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{DashError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub source_file: String,
    #[serde(default = "default_sheet_name")]
    pub sheet_name: String,
    #[serde(default = "default_export_dir")]
    pub export_dir: String,
}

fn default_sheet_name() -> String {
    "Sheet1".to_string()
}

fn default_export_dir() -> String {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Documents")
        .join("expdash")
        .join("exports")
        .to_string_lossy()
        .to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            source_file: String::new(),
            sheet_name: default_sheet_name(),
            export_dir: default_export_dir(),
        }
    }
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("expdash")
}

pub fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

fn read_settings(path: &Path) -> Settings {
    if path.exists() {
        let content = std::fs::read_to_string(path).unwrap_or_default();
        serde_json::from_str(&content).unwrap_or_default()
    } else {
        Settings::default()
    }
}

fn write_settings(path: &Path, settings: &Settings) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| DashError::Settings(e.to_string()))?;
    std::fs::write(path, format!("{json}\n"))?;
    Ok(())
}

pub fn load_settings() -> Settings {
    read_settings(&settings_path())
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    write_settings(&settings_path(), settings)
}

pub fn shellexpand_path(path: &str) -> String {
    if path.starts_with('~') {
        if let Some(home) = dirs::home_dir() {
            return path.replacen('~', &home.to_string_lossy(), 1);
        }
    }
    std::fs::canonicalize(path)
        .unwrap_or_else(|_| PathBuf::from(path))
        .to_string_lossy()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let settings = Settings {
            source_file: "/tmp/exp1.xlsx".to_string(),
            sheet_name: "bng ".to_string(),
            export_dir: "/tmp/out".to_string(),
        };
        write_settings(&path, &settings).unwrap();
        let loaded = read_settings(&path);
        assert_eq!(loaded.source_file, "/tmp/exp1.xlsx");
        assert_eq!(loaded.sheet_name, "bng ");
        assert_eq!(loaded.export_dir, "/tmp/out");
    }

    #[test]
    fn test_load_returns_defaults_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let s = read_settings(&dir.path().join("settings.json"));
        assert!(s.source_file.is_empty());
        assert_eq!(s.sheet_name, "Sheet1");
        assert!(s.export_dir.ends_with("exports"));
    }

    #[test]
    fn test_load_merges_with_defaults() {
        let json = r#"{"source_file": "exp1.xlsx"}"#;
        let s: Settings = serde_json::from_str(json).unwrap();
        assert_eq!(s.source_file, "exp1.xlsx");
        assert_eq!(s.sheet_name, "Sheet1");
    }

    #[test]
    fn test_corrupt_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{not json").unwrap();
        assert_eq!(read_settings(&path).sheet_name, "Sheet1");
    }

    #[test]
    fn test_shellexpand_leaves_plain_paths() {
        assert_eq!(shellexpand_path("/no/such/path.xlsx"), "/no/such/path.xlsx");
    }
}
