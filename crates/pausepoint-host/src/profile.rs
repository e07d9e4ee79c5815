//! Persisted savings profile.
//!
//! Stored as a small JSON document (`savingsTarget`, `currentSavings`). The
//! detection core only reads it; `pausepoint profile set` is the one writer.

use std::path::{Path, PathBuf};

use pausepoint::SavingsProfile;

use crate::error::HostResult;

/// File-backed [`SavingsProfile`].
#[derive(Debug, Clone)]
pub struct ProfileStore {
    path: PathBuf,
}

impl ProfileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the profile. A missing file or missing keys yield the defaults.
    pub fn load(&self) -> HostResult<SavingsProfile> {
        if !self.path.exists() {
            tracing::debug!("no profile at {}; using defaults", self.path.display());
            return Ok(SavingsProfile::default());
        }
        let raw = std::fs::read_to_string(&self.path)?;
        let profile: SavingsProfile = serde_json::from_str(&raw)?;
        Ok(profile)
    }

    /// Load, writing the defaults first if no profile exists yet.
    pub fn load_or_seed(&self) -> HostResult<SavingsProfile> {
        if !self.path.exists() {
            tracing::info!("Seeding default savings profile: {}", self.path.display());
            self.save(&SavingsProfile::default())?;
        }
        self.load()
    }

    /// Overwrite the profile on disk.
    pub fn save(&self, profile: &SavingsProfile) -> HostResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(profile)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProfileStore::new(dir.path().join("profile.json"));
        assert_eq!(store.load().unwrap(), SavingsProfile::default());
        assert!(!store.path().exists());
    }

    #[test]
    fn test_seed_then_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProfileStore::new(dir.path().join("nested").join("profile.json"));
        assert_eq!(store.load_or_seed().unwrap(), SavingsProfile::default());
        assert!(store.path().exists());

        store.save(&SavingsProfile::new(2500.0, 400.0)).unwrap();
        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("savingsTarget"));
        assert!(raw.contains("currentSavings"));
        assert_eq!(store.load().unwrap(), SavingsProfile::new(2500.0, 400.0));
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profile.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(ProfileStore::new(path).load().is_err());
    }
}
