//! RON config loader
//!
//! Loads sky settings from a RON file, with fallback to built-in defaults
//! when the file does not exist.

use std::fs;
use std::path::{Path, PathBuf};

use super::{ConfigError, SkyConfig};

/// Where the config lives when no path is given on the command line
pub fn default_config_path() -> PathBuf {
    use directories::ProjectDirs;

    if let Some(proj_dirs) = ProjectDirs::from("com", "skyscape", "Skyscape") {
        let mut path = proj_dirs.config_dir().to_path_buf();
        path.push("sky.ron");
        path
    } else {
        PathBuf::from("./sky.ron")
    }
}

/// Load and validate a config file.
///
/// A missing file is not an error: the defaults are used. A file that
/// exists but cannot be read or parsed is.
pub fn load_config(path: &Path) -> Result<SkyConfig, ConfigError> {
    if !path.exists() {
        log::info!("No config at {:?}, using defaults", path);
        let config = SkyConfig::default();
        config.validate()?;
        return Ok(config);
    }

    let content = fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
    let config: SkyConfig =
        ron::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;
    config.validate()?;

    log::info!("Config loaded from {:?}", path);
    Ok(config)
}

/// Write a config as pretty RON, creating parent directories as needed
pub fn export_config(config: &SkyConfig, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io(e.to_string()))?;
        }
    }

    let ron = ron::ser::to_string_pretty(config, ron::ser::PrettyConfig::default())
        .map_err(|e| ConfigError::Parse(e.to_string()))?;
    fs::write(path, ron).map_err(|e| ConfigError::Io(e.to_string()))?;

    log::info!("Config written to {:?}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Interval;

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("skyscape-test-{}", std::process::id()))
            .join(name)
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = load_config(&scratch_path("does-not-exist.ron")).unwrap();
        assert_eq!(config, SkyConfig::default());
    }

    #[test]
    fn test_export_then_load() {
        let path = scratch_path("exported.ron");
        let mut config = SkyConfig::default();
        config.seed = Some(99);
        config.clouds.pool_capacity = 7;

        export_config(&config, &path).unwrap();
        let loaded = load_config(&path).unwrap();
        assert_eq!(loaded, config);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let path = scratch_path("partial.ron");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "(seed: Some(3), clouds: (pool_capacity: 4))").unwrap();

        let loaded = load_config(&path).unwrap();
        assert_eq!(loaded.seed, Some(3));
        assert_eq!(loaded.clouds.pool_capacity, 4);
        assert_eq!(loaded.clouds.lifespan, SkyConfig::default().clouds.lifespan);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_invalid_file_is_rejected() {
        let path = scratch_path("invalid.ron");
        let mut config = SkyConfig::default();
        config.stars.spawn_interval = Interval::Fixed(-1.0);
        export_config(&config, &path).unwrap();

        assert!(matches!(load_config(&path), Err(ConfigError::NonPositive { .. })));

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_garbage_is_a_parse_error() {
        let path = scratch_path("garbage.ron");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "this is not ron {").unwrap();

        assert!(matches!(load_config(&path), Err(ConfigError::Parse(_))));

        let _ = fs::remove_file(&path);
    }
}
