use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::analysis::{ReportLimits, MEDIA_OMITTED};

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub analysis: AnalysisConfig,
    pub gemini: GeminiConfig,
    #[serde(default)]
    pub web: WebConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Whitespace-separated stop words; lexical tables are unfiltered without it.
    pub stop_words_path: Option<PathBuf>,
    pub media_marker: String,
    pub top_words: usize,
    pub top_authors: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            stop_words_path: None,
            media_marker: MEDIA_OMITTED.to_string(),
            top_words: 20,
            top_authors: 5,
        }
    }
}

impl AnalysisConfig {
    pub fn limits(&self) -> ReportLimits {
        ReportLimits {
            top_words: self.top_words,
            top_authors: self.top_authors,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct GeminiConfig {
    pub model: String,
    pub max_concurrent: usize,
    pub base_url: String,
    // Loaded from env
    #[serde(skip)]
    pub api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    pub host: String,
    pub port: u16,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self> {
        dotenvy::dotenv().ok();

        let config_text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let mut config = Self::from_toml(&config_text)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        config.gemini.api_key = std::env::var("GEMINI_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty());

        Ok(config)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }
}
