// src/clean/mod.rs
//! Text cleaner: one raw comment in, one cleaned string out.
//!
//! Stage order is fixed:
//! 1) case fold
//! 2) noise strip (URLs, mentions, hashtags, digits)
//! 3) punctuation strip + whitespace collapse
//! 4) slang normalization (single pass)
//! 5) stopword removal (service)
//! 6) stopword removal (manual set)
//! 7) stemming (service)
//!
//! HTML entities are decoded before stage 1.

pub mod stages;

use anyhow::{Error, Result};
use metrics::counter;
use std::fmt;
use tracing::warn;

use crate::lexicon::{NormalizationDictionary, StopwordSet};
use crate::services::LanguageServices;

pub use stages::{case_fold, decode_entities, prepare, strip_noise, strip_punctuation};

/// Short anonymized id for log lines. Raw comment text is never logged.
pub(crate) fn anon_hash(text: &str) -> String {
    use sha2::{Digest, Sha256};
    let digest = Sha256::digest(text.as_bytes());
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

/// Stages backed by a pluggable service, i.e. the ones that can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceStage {
    StopwordRemoval,
    Stemming,
}

impl ServiceStage {
    pub fn as_str(self) -> &'static str {
        match self {
            ServiceStage::StopwordRemoval => "stopword_removal",
            ServiceStage::Stemming => "stemming",
        }
    }
}

impl fmt::Display for ServiceStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TextCleaner<'a> {
    dictionary: &'a NormalizationDictionary,
    stopwords: &'a StopwordSet,
    services: &'a LanguageServices,
}

impl<'a> TextCleaner<'a> {
    pub fn new(
        dictionary: &'a NormalizationDictionary,
        stopwords: &'a StopwordSet,
        services: &'a LanguageServices,
    ) -> Self {
        Self {
            dictionary,
            stopwords,
            services,
        }
    }

    /// Fail-soft cleaning. `None` and any service failure both yield `""`.
    pub fn clean(&self, raw: Option<&str>) -> String {
        let Some(raw) = raw else {
            return String::new();
        };
        match self.run(raw) {
            Ok(s) => s,
            Err((stage, e)) => {
                counter!("clean_stage_errors_total", "stage" => stage.as_str()).increment(1);
                warn!(
                    target: "clean",
                    id = %anon_hash(raw),
                    %stage,
                    error = %format!("{e:#}"),
                    "service stage failed; record degrades to empty"
                );
                String::new()
            }
        }
    }

    /// Same pipeline, but service errors are returned.
    pub fn try_clean(&self, raw: &str) -> Result<String> {
        self.run(raw)
            .map_err(|(stage, e)| e.context(format!("clean stage `{stage}` failed")))
    }

    fn run(&self, raw: &str) -> std::result::Result<String, (ServiceStage, Error)> {
        let text = prepare(raw);
        if text.is_empty() {
            return Ok(text);
        }
        let text = self.dictionary.normalize_tokens(&text);
        let text = self
            .services
            .stopwords
            .remove_stopwords(&text)
            .map_err(|e| (ServiceStage::StopwordRemoval, e))?;
        let text = self.stopwords.remove_from(&text);
        if text.is_empty() {
            return Ok(text);
        }
        let text = self
            .services
            .stemmer
            .stem(&text)
            .map_err(|e| (ServiceStage::Stemming, e))?;
        Ok(text.split_whitespace().collect::<Vec<_>>().join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{IndonesianStemmer, IndonesianStopwordRemover, Stemmer};
    use anyhow::anyhow;
    use std::sync::Arc;

    struct Boom;
    impl Stemmer for Boom {
        fn stem(&self, _: &str) -> Result<String> {
            Err(anyhow!("boom"))
        }
        fn name(&self) -> &'static str {
            "boom"
        }
    }

    fn indonesian() -> LanguageServices {
        LanguageServices::new(
            Arc::new(IndonesianStopwordRemover::new()),
            Arc::new(IndonesianStemmer::embedded()),
        )
    }

    #[test]
    fn full_pipeline_on_a_typical_comment() {
        let dict = NormalizationDictionary::embedded();
        let stop = StopwordSet::embedded();
        let svc = indonesian();
        let c = TextCleaner::new(&dict, &stop, &svc);
        assert_eq!(
            c.clean(Some("ChatGPT sangat membantu pekerjaan sy yg banyak!! https://t.co/x")),
            "chatgpt bantu kerja banyak"
        );
    }

    #[test]
    fn hyphenated_reduplication_is_split_before_stemming() {
        let dict = NormalizationDictionary::default();
        let stop = StopwordSet::default();
        let svc = indonesian();
        let c = TextCleaner::new(&dict, &stop, &svc);
        assert_eq!(c.clean(Some("buku-buku")), "buku buku");
        assert_eq!(IndonesianStemmer::embedded().stem_word("buku-buku"), "buku");
    }

    #[test]
    fn anon_hash_is_short_hex() {
        let id = anon_hash("rahasia");
        assert_eq!(id.len(), 12);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(id, anon_hash("rahasia"));
    }

    #[test]
    fn failing_stemmer_degrades_and_try_clean_reports_stage() {
        let dict = NormalizationDictionary::default();
        let stop = StopwordSet::default();
        let svc = LanguageServices::new(
            Arc::new(IndonesianStopwordRemover::new()),
            Arc::new(Boom),
        );
        let c = TextCleaner::new(&dict, &stop, &svc);
        assert_eq!(c.clean(Some("bagus sekali")), "");
        let err = c.try_clean("bagus sekali").unwrap_err();
        assert!(format!("{err:#}").contains("stemming"));
        // Stemmer never runs on text emptied by earlier stages.
        assert_eq!(c.try_clean("!!! 123").unwrap(), "");
    }
}
