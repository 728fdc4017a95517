use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use crate::render::Feature;
use crate::theme::{Palette, Theme};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:7341".to_string()
}
fn default_max_upload_bytes() -> usize {
    25 * 1024 * 1024
}

/// Defaults applied when a presentation request leaves a field unset.
#[derive(Debug, Deserialize, Clone)]
pub struct RenderConfig {
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_palette")]
    pub palette: String,
    /// Empty means every feature.
    #[serde(default)]
    pub features: Vec<String>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            palette: default_palette(),
            features: Vec::new(),
        }
    }
}

fn default_theme() -> String {
    "modern".to_string()
}
fn default_palette() -> String {
    "purple".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct AnalysisConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Name of the environment variable holding a bearer token.
    #[serde(default)]
    pub api_key_env: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            endpoint: None,
            api_key_env: None,
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
        }
    }
}

fn default_provider() -> String {
    "heuristic".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_max_retries() -> u32 {
    3
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: default_log_format(),
        }
    }
}

fn default_log_format() -> String {
    "compact".to_string()
}

impl LoggingConfig {
    pub fn is_json(&self) -> bool {
        self.format == "json"
    }
}

/// Loads and validates the config file. A missing file yields defaults.
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    if config.server.max_upload_bytes == 0 {
        anyhow::bail!("server.max_upload_bytes must be > 0");
    }

    // Unknown ids would silently fall back at render time; reject them here instead.
    if !Theme::ALL
        .iter()
        .any(|t| t.id().eq_ignore_ascii_case(config.render.theme.trim()))
    {
        anyhow::bail!(
            "Unknown render.theme: '{}'. Must be one of: {}",
            config.render.theme,
            Theme::ALL.map(|t| t.id()).join(", ")
        );
    }
    if !Palette::ALL
        .iter()
        .any(|p| p.id().eq_ignore_ascii_case(config.render.palette.trim()))
    {
        anyhow::bail!(
            "Unknown render.palette: '{}'. Must be one of: {}",
            config.render.palette,
            Palette::ALL.map(|p| p.id()).join(", ")
        );
    }
    for id in &config.render.features {
        if Feature::parse(id).is_none() {
            anyhow::bail!("Unknown render feature: '{}'", id);
        }
    }

    match config.analysis.provider.as_str() {
        "heuristic" => {}
        "remote" => {
            if config.analysis.endpoint.as_deref().unwrap_or("").is_empty() {
                anyhow::bail!("analysis.endpoint must be set when provider is 'remote'");
            }
        }
        other => anyhow::bail!(
            "Unknown analysis provider: '{}'. Must be heuristic or remote.",
            other
        ),
    }

    match config.logging.format.as_str() {
        "compact" | "json" => Ok(()),
        other => anyhow::bail!("Unknown logging.format: '{}'. Must be compact or json.", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml_src: &str) -> Result<Config> {
        let config: Config = toml::from_str(toml_src)?;
        validate(&config)?;
        Ok(config)
    }

    #[test]
    fn empty_file_uses_defaults() {
        let config = parse("").unwrap();
        assert_eq!(config.server.bind, "127.0.0.1:7341");
        assert_eq!(config.render.theme, "modern");
        assert_eq!(config.render.palette, "purple");
        assert_eq!(config.analysis.provider, "heuristic");
        assert!(!config.logging.is_json());
    }

    #[test]
    fn missing_file_uses_defaults() {
        let config = load_config(Path::new("/definitely/not/here/dvz.toml")).unwrap();
        assert_eq!(config.server.max_upload_bytes, 25 * 1024 * 1024);
    }

    #[test]
    fn rejects_unknown_theme() {
        let err = parse("[render]\ntheme = \"neon\"\n").unwrap_err();
        assert!(err.to_string().contains("render.theme"));
    }

    #[test]
    fn accepts_mixed_case_ids() {
        let config = parse("[render]\ntheme = \"Dark\"\npalette = \"OCEAN\"\n").unwrap();
        assert_eq!(Theme::parse(&config.render.theme), Theme::Dark);
        assert_eq!(Palette::parse(&config.render.palette), Palette::Ocean);
    }

    #[test]
    fn rejects_unknown_feature() {
        let err = parse("[render]\nfeatures = [\"bar\", \"sparkle\"]\n").unwrap_err();
        assert!(err.to_string().contains("sparkle"));
    }

    #[test]
    fn remote_requires_endpoint() {
        assert!(parse("[analysis]\nprovider = \"remote\"\n").is_err());
        let config =
            parse("[analysis]\nprovider = \"remote\"\nendpoint = \"http://localhost:9/analyze\"\n")
                .unwrap();
        assert_eq!(config.analysis.max_retries, 3);
    }
}
