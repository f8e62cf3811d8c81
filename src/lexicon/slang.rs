// src/lexicon/slang.rs
//! Informal/slang token -> canonical token mapping.

use anyhow::{Context, Result};
use std::{collections::HashMap, fs, path::Path};
use tracing::warn;

const EMBEDDED_SLANG: &str = include_str!("../../data/slang.json");

#[derive(Debug, Clone, Default)]
pub struct NormalizationDictionary {
    rules: HashMap<String, String>,
}

impl NormalizationDictionary {
    /// Dictionary shipped with the crate (`data/slang.json`).
    pub fn embedded() -> Self {
        Self::from_json(EMBEDDED_SLANG).expect("valid embedded slang dictionary")
    }

    /// Parse a JSON object `{ "informal": "canonical", ... }`.
    /// Keys/values are trimmed and lowercased; empty keys are ignored.
    pub fn from_json(raw: &str) -> Result<Self> {
        let map: HashMap<String, String> = serde_json::from_str(raw)?;
        Ok(Self::from_pairs(map))
    }

    /// Build from explicit pairs. Duplicate keys: last write wins.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut rules = HashMap::new();
        for (k, v) in pairs {
            let k = k.as_ref().trim().to_lowercase();
            if k.is_empty() {
                continue;
            }
            rules.insert(k, v.as_ref().trim().to_lowercase());
        }
        Self { rules }
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading slang dictionary from {}", path.display()))?;
        Self::from_json(&raw).with_context(|| format!("parsing {}", path.display()))
    }

    /// Override file if given and valid, otherwise the embedded dictionary.
    pub fn load_or_embedded(path: Option<&Path>) -> Self {
        match path {
            Some(p) => Self::load_from_file(p).unwrap_or_else(|e| {
                warn!(
                    target: "lexicon",
                    error = %format!("{e:#}"),
                    "slang override unusable, using embedded"
                );
                Self::embedded()
            }),
            None => Self::embedded(),
        }
    }

    /// Total lookup: the canonical form, or the token itself.
    #[inline]
    pub fn lookup<'a>(&'a self, token: &'a str) -> &'a str {
        self.rules.get(token).map(String::as_str).unwrap_or(token)
    }

    /// Single-pass substitution over whitespace tokens. Substituted values are not looked up again.
    pub fn normalize_tokens(&self, text: &str) -> String {
        text.split_whitespace()
            .map(|t| self.lookup(t))
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
