use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::constants::{DEFAULT_CONFIG_FILE, DEFAULT_INPUT_DIR, DEFAULT_OUTPUT_FILE};
use crate::error::{PrepError, Result};
use crate::normalize::NormalizationTable;
use crate::palette::HueStrategy;

/// Contents of the optional TOML config file
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub paths: PathsConfig,
    pub palette: PaletteConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    pub input_dir: Option<PathBuf>,
    pub output_file: Option<PathBuf>,
    pub normalization: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PaletteConfig {
    pub hue_strategy: Option<HueStrategy>,
}

impl Config {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    /// Loads the config file.
    ///
    /// An explicitly named file must exist. Without one, `cluster_viz.toml` in
    /// the working directory is used when present, else an empty config.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let config_path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !default.is_file() {
                    return Ok(Config::default());
                }
                default
            }
        };

        let config_content = fs::read_to_string(&config_path).map_err(|e| {
            PrepError::Config(format!(
                "Failed to read config file '{}': {}",
                config_path.display(),
                e
            ))
        })?;
        debug!("Loaded config from {}", config_path.display());
        Self::from_toml_str(&config_content)
    }
}

/// Values supplied on the command line or through the environment
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub input_dir: Option<PathBuf>,
    pub output_file: Option<PathBuf>,
    pub normalization: Option<PathBuf>,
    pub hue_strategy: Option<HueStrategy>,
}

/// Fully resolved settings for a run: overrides, then config file, then defaults
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub input_dir: PathBuf,
    pub output_file: PathBuf,
    /// `None` means the built-in table
    pub normalization: Option<PathBuf>,
    pub hue_strategy: HueStrategy,
}

impl Settings {
    pub fn resolve(overrides: Overrides, config: Config) -> Self {
        Self {
            input_dir: overrides
                .input_dir
                .or(config.paths.input_dir)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_INPUT_DIR)),
            output_file: overrides
                .output_file
                .or(config.paths.output_file)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_FILE)),
            normalization: overrides.normalization.or(config.paths.normalization),
            hue_strategy: overrides
                .hue_strategy
                .or(config.palette.hue_strategy)
                .unwrap_or_default(),
        }
    }

    pub fn normalization_table(&self) -> Result<NormalizationTable> {
        match &self.normalization {
            Some(path) => NormalizationTable::load(path),
            None => NormalizationTable::builtin(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_without_config_or_overrides() {
        let settings = Settings::resolve(Overrides::default(), Config::default());
        assert_eq!(settings.input_dir, PathBuf::from("./cluster_results/"));
        assert_eq!(settings.output_file, PathBuf::from("./miccai_viz_data.json"));
        assert_eq!(settings.normalization, None);
        assert_eq!(settings.hue_strategy, HueStrategy::Even);
    }

    #[test]
    fn config_file_fills_gaps_and_overrides_win() {
        let config = Config::from_toml_str(
            r#"
[paths]
input_dir = "data/clusters"
output_file = "public/points.json"

[palette]
hue_strategy = "golden-angle"
"#,
        )
        .unwrap();

        let overrides = Overrides {
            output_file: Some(PathBuf::from("override.json")),
            ..Overrides::default()
        };
        let settings = Settings::resolve(overrides, config);
        assert_eq!(settings.input_dir, PathBuf::from("data/clusters"));
        assert_eq!(settings.output_file, PathBuf::from("override.json"));
        assert_eq!(settings.hue_strategy, HueStrategy::GoldenAngle);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = Config::from_toml_str("[paths]\ninput = \"x\"\n").unwrap_err();
        assert!(matches!(err, PrepError::Toml(_)));
    }

    #[test]
    fn explicit_missing_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(Some(&dir.path().join("missing.toml"))).unwrap_err();
        assert!(matches!(err, PrepError::Config(_)));
    }

    #[test]
    fn explicit_config_is_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cluster_viz.toml");
        fs::write(&path, "[paths]\ninput_dir = \"in\"\n").unwrap();
        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.paths.input_dir, Some(PathBuf::from("in")));
    }

    #[test]
    fn builtin_table_is_used_when_no_path_is_set() {
        let settings = Settings::resolve(Overrides::default(), Config::default());
        let table = settings.normalization_table().unwrap();
        assert!(table.lookup_institution("TUM").is_some());
    }
}
