//! Config command handler.
//!
//! Implements the `config` subcommand: show the effective configuration, its
//! JSON Schema, an example file, or where config files are searched.

use crate::config::{
    AppConfig, ConfigPreset, Validatable, discover_config_file, generate_example_config,
    generate_json_schema, load_or_default,
};
use crate::pipeline::{OutputTarget, write_output};
use anyhow::{Context, Result, bail};
use std::path::{Path, PathBuf};

/// What the `config` command prints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigCommand {
    /// Effective configuration (file merged over defaults, or a preset)
    Show { preset: Option<ConfigPreset> },
    /// JSON Schema of the config format
    Schema,
    /// Commented example file
    Example,
    /// Search paths and the discovered file
    Path,
}

/// Run the config command.
pub fn run_config(
    command: ConfigCommand,
    explicit_path: Option<&Path>,
    output_file: Option<PathBuf>,
) -> Result<()> {
    let target = OutputTarget::from_option(output_file);
    match command {
        ConfigCommand::Show { preset } => {
            let config = match preset {
                Some(preset) => {
                    eprintln!("# Preset: {}", preset.name());
                    AppConfig::from_preset(preset)
                }
                None => {
                    let (config, loaded_from) = load_or_default(explicit_path);
                    match &loaded_from {
                        Some(path) => eprintln!("# Loaded from: {}", path.display()),
                        None => eprintln!("# No config file found; showing defaults"),
                    }
                    config
                }
            };
            let errors = config.validate();
            for error in &errors {
                eprintln!("# Invalid: {error}");
            }
            let yaml = serde_yaml_ng::to_string(&config).context("failed to serialize config")?;
            write_output(yaml.trim_end(), &target, false)?;
            if !errors.is_empty() {
                bail!("configuration has {} invalid value(s)", errors.len());
            }
            Ok(())
        }
        ConfigCommand::Schema => write_output(&generate_json_schema(), &target, false),
        ConfigCommand::Example => write_output(generate_example_config().trim_end(), &target, false),
        ConfigCommand::Path => {
            let search_paths = [
                std::env::current_dir().ok(),
                dirs::config_dir().map(|p| p.join("opossum-tools")),
                dirs::home_dir(),
            ];
            let mut out = String::from("Config file search paths (in order):\n");
            for path in search_paths.into_iter().flatten() {
                out.push_str(&format!("  {}\n", path.display()));
            }
            match discover_config_file(explicit_path) {
                Some(path) => out.push_str(&format!("Active config file: {}", path.display())),
                None => out.push_str("No config file found"),
            }
            write_output(&out, &target, false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_schema_to_file() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("schema.json");
        run_config(ConfigCommand::Schema, None, Some(out.clone())).unwrap();
        let schema: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(out).unwrap()).unwrap();
        assert!(schema["properties"]["worker"].is_object());
    }

    #[test]
    fn test_show_rejects_invalid_file() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("config.yaml");
        std::fs::write(&config_path, "filters:\n  low_confidence_threshold: 400\n").unwrap();
        let out = tmp.path().join("out.yaml");
        let result = run_config(
            ConfigCommand::Show { preset: None },
            Some(&config_path),
            Some(out.clone()),
        );
        assert!(result.is_err());
        assert!(std::fs::read_to_string(out).unwrap().contains("400"));
    }

    #[test]
    fn test_show_preset() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("out.yaml");
        run_config(
            ConfigCommand::Show {
                preset: Some(ConfigPreset::ReadOnly),
            },
            None,
            Some(out.clone()),
        )
        .unwrap();
        let shown: AppConfig =
            serde_yaml_ng::from_str(&std::fs::read_to_string(out).unwrap()).unwrap();
        assert_eq!(shown, AppConfig::from_preset(ConfigPreset::ReadOnly));
    }
}
