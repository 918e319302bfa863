use crate::settings::Settings;
use color_eyre::eyre::{eyre, WrapErr};
use color_eyre::Result;
use log::{debug, info};
use std::fs::File;
use std::path::{Path, PathBuf};

/// Load and validate settings from a YAML file
pub fn load_settings(settings_path: &Path) -> Result<Settings> {
    info!("Loading settings from: {:?}", settings_path);

    let file = File::open(settings_path)
        .wrap_err_with(|| format!("Failed to open settings file '{}'", settings_path.display()))?;

    let settings: Settings = serde_yaml::from_reader(file)
        .wrap_err_with(|| format!("Failed to parse settings file '{}'", settings_path.display()))?;

    settings.validate()?;

    Ok(settings)
}

/// Load settings if a path was given, otherwise fall back to defaults
pub fn load_settings_or_default(settings_path: Option<&Path>) -> Result<Settings> {
    match settings_path {
        Some(path) => load_settings(path),
        None => {
            debug!("No settings file given, using defaults");
            Ok(Settings::default())
        }
    }
}

/// Locate a topology file.
///
/// An existing path is used as given. Otherwise the name is looked up inside
/// `config_dir`, first verbatim and then with `extension` appended.
pub fn resolve_topology_path(name: &Path, config_dir: &Path, extension: &str) -> Result<PathBuf> {
    if name.is_file() {
        return Ok(name.to_path_buf());
    }

    let in_config_dir = config_dir.join(name);
    if in_config_dir.is_file() {
        return Ok(in_config_dir);
    }

    if name.extension().is_none() {
        let with_extension = in_config_dir.with_extension(extension.trim_start_matches('.'));
        if with_extension.is_file() {
            return Ok(with_extension);
        }
    }

    Err(eyre!(
        "Topology file '{}' not found (also searched in '{}')",
        name.display(),
        config_dir.display()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Write;
    use tempfile::{tempdir, NamedTempFile};

    #[test]
    fn test_load_settings() {
        let yaml = r#"
general:
  config_dir: "topologies"
resolver:
  slow_call_warning: "5s"
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "{}", yaml).unwrap();

        let settings = load_settings(temp_file.path()).unwrap();
        assert_eq!(settings.general.config_dir, PathBuf::from("topologies"));
        assert_eq!(
            settings.resolver.slow_call_warning,
            Some(std::time::Duration::from_secs(5))
        );
    }

    #[test]
    fn test_load_invalid_settings() {
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "general:\n  config_extension: \"\"\n").unwrap();

        assert!(load_settings(temp_file.path()).is_err());
    }

    #[test]
    fn test_missing_settings_file() {
        assert!(load_settings(Path::new("/nonexistent/lunarnet.yaml")).is_err());
        let defaults = load_settings_or_default(None).unwrap();
        assert_eq!(defaults, Settings::default());
    }

    #[test]
    fn test_resolve_topology_path() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("surface.txt");
        fs::write(&file, "NODECONFIGHEADER\n").unwrap();

        // Existing path used as-is
        assert_eq!(resolve_topology_path(&file, Path::new("elsewhere"), "txt").unwrap(), file);
        // Bare file name inside the config directory
        assert_eq!(
            resolve_topology_path(Path::new("surface.txt"), dir.path(), "txt").unwrap(),
            file
        );
        // Name without extension
        assert_eq!(
            resolve_topology_path(Path::new("surface"), dir.path(), "txt").unwrap(),
            file
        );
        assert!(resolve_topology_path(Path::new("missing"), dir.path(), "txt").is_err());
    }
}
