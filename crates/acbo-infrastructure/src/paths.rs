//! Path management for ACBO configuration files.
//!
//! ```text
//! ~/.config/acbo/          # Config directory (platform config dir + "acbo")
//! └── config.toml          # Application configuration
//! ```
//!
//! `ACBO_CONFIG_DIR` overrides the directory.

use std::path::PathBuf;

use acbo_core::error::{AcboError, Result};

const APP_DIR: &str = "acbo";
const CONFIG_DIR_ENV: &str = "ACBO_CONFIG_DIR";

pub struct AcboPaths;

impl AcboPaths {
    /// Returns the ACBO configuration directory.
    ///
    /// # Returns
    ///
    /// - `Ok(PathBuf)`: e.g. `~/.config/acbo/`
    /// - `Err(AcboError::Config)`: no config directory on this platform
    pub fn config_dir() -> Result<PathBuf> {
        if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV).filter(|d| !d.is_empty()) {
            return Ok(PathBuf::from(dir));
        }
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or_else(|| AcboError::config("cannot determine the config directory"))
    }

    pub fn config_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_file_is_inside_config_dir() {
        let Ok(file) = AcboPaths::config_file() else {
            // Headless CI without a home directory
            return;
        };
        assert_eq!(file.file_name().unwrap(), "config.toml");
        assert_eq!(file.parent().unwrap(), AcboPaths::config_dir().unwrap());
    }
}
