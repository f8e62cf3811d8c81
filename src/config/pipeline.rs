// src/config/pipeline.rs
//! Pipeline configuration loaded from TOML.
//!
//! Resolution order:
//! 1) `$PIPELINE_CONFIG_PATH` (must exist)
//! 2) `config/pipeline.toml`
//! 3) built-in defaults
//!
//! After loading, `$CORPUS_PATH` and `$CORPUS_MODE` override the `[source]` section.

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::{
    env, fs,
    path::{Path, PathBuf},
};

use crate::corpus::processor::ProcessingOptions;
use crate::corpus::source::{SourceMode, SourceSpec};

pub const DEFAULT_PIPELINE_CONFIG_PATH: &str = "config/pipeline.toml";
pub const ENV_PIPELINE_CONFIG_PATH: &str = "PIPELINE_CONFIG_PATH";
pub const ENV_CORPUS_PATH: &str = "CORPUS_PATH";
pub const ENV_CORPUS_MODE: &str = "CORPUS_MODE";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub source: SourceSpec,
    pub lexicon: LexiconPaths,
    pub processing: ProcessingOptions,
    pub cache: CacheOptions,
}

/// Optional override files for the embedded language data.
/// A path that cannot be read or parsed falls back to the embedded data.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LexiconPaths {
    pub slang: Option<PathBuf>,
    pub stopwords: Option<PathBuf>,
    pub root_words: Option<PathBuf>,
    pub sentiment: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct CacheOptions {
    pub enabled: bool,
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl PipelineConfig {
    /// Load from an explicit TOML file (no env overrides).
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading pipeline config from {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("parsing pipeline config {}", path.display()))
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        let cfg: PipelineConfig = toml::from_str(s)?;
        cfg.source.delimiter_byte()?;
        Ok(cfg)
    }

    /// Load using env var + fallbacks, then apply corpus env overrides.
    pub fn load_default() -> Result<Self> {
        let mut cfg = if let Ok(p) = env::var(ENV_PIPELINE_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!(
                    "{ENV_PIPELINE_CONFIG_PATH} points to non-existent path {}",
                    pb.display()
                ));
            }
            Self::load_from(&pb)?
        } else {
            let default_path = PathBuf::from(DEFAULT_PIPELINE_CONFIG_PATH);
            if default_path.exists() {
                Self::load_from(&default_path)?
            } else {
                Self::default()
            }
        };
        cfg.apply_env_overrides()?;
        Ok(cfg)
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(p) = env::var(ENV_CORPUS_PATH) {
            let p = p.trim();
            if !p.is_empty() {
                self.source.path = PathBuf::from(p);
            }
        }
        if let Ok(m) = env::var(ENV_CORPUS_MODE) {
            self.source.mode = m
                .parse::<SourceMode>()
                .with_context(|| format!("invalid {ENV_CORPUS_MODE}"))?;
        }
        Ok(())
    }
}
