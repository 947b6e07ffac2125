use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "agrifilter")]
#[command(about = "Runs the livestock project screening service", long_about = None)]
pub struct Cli {
    #[arg(short = 'c', long = "config")]
    pub config_path: Option<String>,

    /// Overrides app.port from the config file
    #[arg(short = 'p', long = "port")]
    pub port: Option<u16>,
}

pub fn default_config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".agrifilter")
}

pub fn default_config_path() -> PathBuf {
    default_config_dir().join("config.yaml")
}

#[derive(Debug, Deserialize, Clone)]
pub struct App {
    #[serde(default = "default_port")]
    port: u16,
    #[serde(default = "default_keywords_file")]
    keywords_file: PathBuf,
    #[serde(default = "default_max_upload_mb")]
    pub max_upload_mb: usize,
}

fn default_port() -> u16 {
    8080
}

fn default_keywords_file() -> PathBuf {
    PathBuf::from("keywords.txt")
}

fn default_max_upload_mb() -> usize {
    25
}

impl Default for App {
    fn default() -> Self {
        App {
            port: default_port(),
            keywords_file: default_keywords_file(),
            max_upload_mb: default_max_upload_mb(),
        }
    }
}

impl App {
    pub fn get_port(&self) -> u16 {
        self.port
    }

    pub fn set_port(&mut self, port: u16) {
        self.port = port;
    }

    pub fn get_keywords_file(&self) -> &Path {
        &self.keywords_file
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb.saturating_mul(1024 * 1024)
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub app: App,
}

impl Config {
    pub fn new(path: &str) -> Result<Self> {
        let cfg = Config::load_config(path)?;
        Ok(cfg)
    }

    /// Loads `path` when given. Without one the default location is used if
    /// it exists, otherwise built-in defaults apply.
    pub fn resolve(path: Option<&str>) -> Result<Self> {
        match path {
            Some(path) => Config::new(path),
            None => {
                let path = default_config_path();
                if path.exists() {
                    Config::new(&path.to_string_lossy())
                } else {
                    tracing::info!(path = ?path, "no config file, using defaults");
                    Ok(Config::default())
                }
            }
        }
    }

    fn load_config(path: &str) -> Result<Config> {
        let yaml_str =
            fs::read_to_string(path).with_context(|| format!("failed to read config {}", path))?;
        Config::from_yaml(&yaml_str)
    }

    pub fn from_yaml(yaml_str: &str) -> Result<Config> {
        let yaml_with_env = Config::substitute_env_vars(yaml_str)?;
        let config: Config = serde_yaml::from_str(&yaml_with_env)?;
        Ok(config)
    }

    fn substitute_env_vars(yaml_str: &str) -> Result<String> {
        let mut result = yaml_str.to_string();
        let mut offset = 0;

        while let Some(start) = result[offset..].find("${") {
            let actual_start = offset + start;
            if let Some(end) = result[actual_start..].find("}") {
                let var_name = &result[actual_start + 2..actual_start + end];

                // ${VAR:-default}
                let env_value = if let Some(default_start) = var_name.find(":-") {
                    let actual_var = &var_name[..default_start];
                    let default_val = &var_name[default_start + 2..];
                    env::var(actual_var).unwrap_or_else(|_| default_val.to_string())
                } else {
                    env::var(var_name).unwrap_or_else(|_| {
                        tracing::warn!("environment variable '{}' not found", var_name);
                        String::new()
                    })
                };

                result.replace_range(actual_start..actual_start + end + 1, &env_value);
                offset = actual_start + env_value.len();
            } else {
                break;
            }
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_keys_missing() {
        let cfg = Config::from_yaml("app:\n  port: 9000\n").unwrap();
        assert_eq!(cfg.app.get_port(), 9000);
        assert_eq!(cfg.app.get_keywords_file(), Path::new("keywords.txt"));
        assert_eq!(cfg.app.max_upload_bytes(), 25 * 1024 * 1024);

        let cfg = Config::from_yaml("{}").unwrap();
        assert_eq!(cfg.app.get_port(), 8080);
    }

    #[test]
    fn test_env_default_substitution() {
        let yaml = "app:\n  port: ${AGRIFILTER_TEST_UNSET_PORT:-7070}\n  keywords_file: ${AGRIFILTER_TEST_UNSET_KW:-/etc/kw.txt}\n";
        let cfg = Config::from_yaml(yaml).unwrap();
        assert_eq!(cfg.app.get_port(), 7070);
        assert_eq!(cfg.app.get_keywords_file(), Path::new("/etc/kw.txt"));
    }

    #[test]
    fn test_missing_explicit_config_is_error() {
        assert!(Config::resolve(Some("/no/such/agrifilter.yaml")).is_err());
    }
}
