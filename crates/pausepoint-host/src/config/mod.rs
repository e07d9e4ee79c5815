//! Configuration loading and resolution.

use std::path::PathBuf;

/// Environment variable overriding the savings profile location.
pub const PROFILE_ENV: &str = "PAUSEPOINT_PROFILE";

const PROFILE_RELATIVE: &str = ".pausepoint/profile.json";

/// Resolve the savings profile path.
///
/// Order: explicit flag, `PAUSEPOINT_PROFILE`, `./.pausepoint/profile.json`
/// if it exists, then the per-user default.
pub fn resolve_profile_path(explicit: Option<&str>) -> PathBuf {
    if let Some(path) = explicit {
        return PathBuf::from(path);
    }

    if let Ok(env_path) = std::env::var(PROFILE_ENV) {
        if !env_path.is_empty() {
            return PathBuf::from(env_path);
        }
    }

    let cwd_profile = PathBuf::from(PROFILE_RELATIVE);
    if cwd_profile.exists() {
        return cwd_profile;
    }

    default_profile_path()
}

fn default_profile_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(PROFILE_RELATIVE)
}
