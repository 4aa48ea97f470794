//! Save policies: loads `save.toml` style configuration.

use anyhow::{Context, Result}; // anyhow error handling
use serde::Deserialize; // trait for deserializing toml
use std::fs; // file system access
use std::path::Path; // file path handling

/// Policies governing how saves behave.
///
/// All fields have defaults, so a missing or empty config file is fine.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SaveConfig {
    /// Write to a staging file first and atomically rename it over the
    /// target, so an interrupted save never corrupts the original.
    /// Requires a rename-capable backend; falls back to a direct save when
    /// the backend cannot produce a staging name.
    pub two_stage_save: bool,

    /// Take a backup before every save instead of once per session.
    pub backup_every_save: bool,

    /// Persist markers to a companion file next to the target (only on
    /// backends that can also delete stale companions).
    pub persistent_markers: bool,
}

impl Default for SaveConfig {
    fn default() -> Self {
        Self {
            two_stage_save: true,
            backup_every_save: false,
            persistent_markers: true,
        }
    }
}

impl SaveConfig {
    /// Load policies from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let s = fs::read_to_string(path)
            .with_context(|| format!("Reading {}", path.display()))?;
        let config: SaveConfig = toml::from_str(&s)
            .with_context(|| format!("Parsing {}", path.display()))?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_safe() {
        let c = SaveConfig::default();
        assert!(c.two_stage_save);
        assert!(!c.backup_every_save);
        assert!(c.persistent_markers);
    }

    #[test]
    fn load_partial_file() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "backup_every_save = true").unwrap();
        let c = SaveConfig::load(f.path()).unwrap();
        assert!(c.backup_every_save);
        // untouched fields keep their defaults
        assert!(c.two_stage_save);
    }

    #[test]
    fn load_rejects_bad_toml() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "two_stage_save = maybe").unwrap();
        assert!(SaveConfig::load(f.path()).is_err());
    }
}
