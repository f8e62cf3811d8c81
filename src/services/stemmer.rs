// src/services/stemmer.rs
//! Dictionary-backed Indonesian stemmer.
//!
//! Affix stripping in the usual order for Indonesian morphology:
//! 1) inflectional particles (`-lah -kah -tah -pun`)
//! 2) possessive pronouns (`-ku -mu -nya`)
//! 3) derivational suffixes (`-kan -an -i`)
//! 4) up to three derivational prefixes (`di- ke- se- be(r)- te(r)- me(N)- pe(N)-`),
//!    including nasal recoding (`meny+V -> s`, `mem+V -> p|m`, `men+V -> t|n`, `meng+V -> k|∅`).
//!
//! Every candidate is checked against the root-word dictionary. A word that cannot be
//! resolved to a known root is returned unchanged, so unknown vocabulary passes through.

use anyhow::{Context, Result};
use std::{collections::HashSet, fs, path::Path};

use super::Stemmer;
use crate::lexicon::parse_word_lines;

const EMBEDDED_ROOT_WORDS: &str = include_str!("../../data/root_words.txt");

const PARTICLES: &[&str] = &["lah", "kah", "tah", "pun"];
const POSSESSIVES: &[&str] = &["nya", "ku", "mu"];
const DERIVATIONAL: &[&str] = &["kan", "an", "i"];

const MAX_PREFIXES: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Prefix {
    Di,
    Ke,
    Se,
    Be,
    Te,
    Me,
    Pe,
}

#[derive(Debug, Clone)]
pub struct IndonesianStemmer {
    roots: HashSet<String>,
}

impl IndonesianStemmer {
    pub fn embedded() -> Self {
        Self::from_lines(EMBEDDED_ROOT_WORDS)
    }

    pub fn from_lines(raw: &str) -> Self {
        Self {
            roots: parse_word_lines(raw).collect(),
        }
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading root words from {}", path.display()))?;
        Ok(Self::from_lines(&raw))
    }

    pub fn root_count(&self) -> usize {
        self.roots.len()
    }

    #[inline]
    fn is_root(&self, w: &str) -> bool {
        self.roots.contains(w)
    }

    /// Stem one word. Reduplicated plurals (`buku-buku`) collapse when both halves agree.
    ///
    /// Only direct callers see hyphenated words: inside `TextCleaner` the punctuation stage
    /// has already split `buku-buku` into two tokens, which are stemmed separately.
    pub fn stem_word(&self, word: &str) -> String {
        let word = word.to_lowercase();
        if let Some((left, right)) = word.split_once('-') {
            let l = self.stem_single(left);
            if !l.is_empty() && l == self.stem_single(right) {
                return l;
            }
        }
        self.stem_single(&word)
    }

    fn stem_single(&self, word: &str) -> String {
        if word.chars().count() <= 3 || self.is_root(word) {
            return word.to_string();
        }

        let mut current = word.to_string();
        for group in [PARTICLES, POSSESSIVES] {
            if let Some((stripped, _)) = strip_suffix_any(&current, group) {
                if self.is_root(&stripped) {
                    return stripped;
                }
                current = stripped;
            }
        }

        // Candidates: each matching derivational suffix removed, then the suffix kept.
        let mut candidates: Vec<(String, Option<&'static str>)> = DERIVATIONAL
            .iter()
            .filter_map(|sfx| strip_suffix_min(&current, sfx).map(|s| (s, Some(*sfx))))
            .collect();
        candidates.push((current.clone(), None));

        if let Some((root, _)) = candidates.iter().find(|(c, _)| self.is_root(c)) {
            return root.clone();
        }
        for (cand, sfx) in &candidates {
            if let Some(root) = self.strip_prefixes(cand, *sfx, 0, None) {
                return root;
            }
        }
        if current != word {
            if let Some(root) = self.strip_prefixes(word, None, 0, None) {
                return root;
            }
        }
        word.to_string()
    }

    fn strip_prefixes(
        &self,
        word: &str,
        suffix: Option<&str>,
        depth: usize,
        previous: Option<Prefix>,
    ) -> Option<String> {
        if depth >= MAX_PREFIXES {
            return None;
        }
        for (prefix, cand) in prefix_candidates(word) {
            if previous == Some(prefix) {
                continue;
            }
            if depth == 0 && suffix.is_some_and(|s| is_forbidden_pair(prefix, s)) {
                continue;
            }
            if cand.chars().count() < 3 {
                continue;
            }
            if self.is_root(&cand) {
                return Some(cand);
            }
            if let Some(root) = self.strip_prefixes(&cand, suffix, depth + 1, Some(prefix)) {
                return Some(root);
            }
        }
        None
    }
}

impl Stemmer for IndonesianStemmer {
    fn stem(&self, text: &str) -> Result<String> {
        Ok(text
            .split_whitespace()
            .map(|w| self.stem_word(w))
            .collect::<Vec<_>>()
            .join(" "))
    }

    fn name(&self) -> &'static str {
        "indonesian-affix-stemmer"
    }
}

/// Confix combinations that do not occur in Indonesian (prefix + derivational suffix).
fn is_forbidden_pair(prefix: Prefix, suffix: &str) -> bool {
    matches!(
        (prefix, suffix),
        (Prefix::Be, "i")
            | (Prefix::Di, "an")
            | (Prefix::Ke, "i")
            | (Prefix::Ke, "kan")
            | (Prefix::Me, "an")
            | (Prefix::Se, "i")
            | (Prefix::Se, "kan")
            | (Prefix::Te, "an")
    )
}

fn strip_suffix_min(word: &str, suffix: &str) -> Option<String> {
    word.strip_suffix(suffix)
        .filter(|rest| rest.chars().count() >= 2)
        .map(str::to_string)
}

fn strip_suffix_any(word: &str, suffixes: &[&'static str]) -> Option<(String, &'static str)> {
    suffixes
        .iter()
        .find_map(|s| strip_suffix_min(word, s).map(|rest| (rest, *s)))
}

fn starts_with_vowel(s: &str) -> bool {
    s.chars()
        .next()
        .is_some_and(|c| matches!(c, 'a' | 'e' | 'i' | 'o' | 'u'))
}

fn starts_with_any(s: &str, set: &str) -> bool {
    s.chars().next().is_some_and(|c| set.contains(c))
}

/// All `(prefix, remainder)` readings of `word`, most specific first.
fn prefix_candidates(word: &str) -> Vec<(Prefix, String)> {
    let mut out = Vec::new();

    if let Some(rest) = word.strip_prefix("di") {
        out.push((Prefix::Di, rest.to_string()));
    }
    if let Some(rest) = word.strip_prefix("ke") {
        out.push((Prefix::Ke, rest.to_string()));
    }
    if let Some(rest) = word.strip_prefix("se") {
        out.push((Prefix::Se, rest.to_string()));
    }

    if let Some(rest) = word.strip_prefix("ber") {
        out.push((Prefix::Be, rest.to_string()));
        if starts_with_vowel(rest) {
            out.push((Prefix::Be, format!("r{rest}")));
        }
    } else if let Some(rest) = word.strip_prefix("bel").filter(|r| r.starts_with("ajar")) {
        out.push((Prefix::Be, rest.to_string()));
    } else if let Some(rest) = word.strip_prefix("be").filter(|r| !starts_with_vowel(r)) {
        out.push((Prefix::Be, rest.to_string()));
    }

    if let Some(rest) = word.strip_prefix("ter") {
        out.push((Prefix::Te, rest.to_string()));
        if starts_with_vowel(rest) {
            out.push((Prefix::Te, format!("r{rest}")));
        }
    } else if let Some(rest) = word.strip_prefix("te").filter(|r| !starts_with_vowel(r)) {
        out.push((Prefix::Te, rest.to_string()));
    }

    if let Some(rest) = word.strip_prefix("meng") {
        out.push((Prefix::Me, rest.to_string()));
        if starts_with_vowel(rest) {
            out.push((Prefix::Me, format!("k{rest}")));
        }
    } else if let Some(rest) = word.strip_prefix("meny") {
        if starts_with_vowel(rest) {
            out.push((Prefix::Me, format!("s{rest}")));
        }
    } else if let Some(rest) = word.strip_prefix("mem") {
        if starts_with_any(rest, "bfvp") {
            out.push((Prefix::Me, rest.to_string()));
        } else if starts_with_vowel(rest) {
            out.push((Prefix::Me, format!("p{rest}")));
            out.push((Prefix::Me, format!("m{rest}")));
        }
    } else if let Some(rest) = word.strip_prefix("men") {
        if starts_with_any(rest, "cdjstz") {
            out.push((Prefix::Me, rest.to_string()));
        } else if starts_with_vowel(rest) {
            out.push((Prefix::Me, format!("t{rest}")));
            out.push((Prefix::Me, format!("n{rest}")));
        }
    } else if let Some(rest) = word.strip_prefix("me").filter(|r| starts_with_any(r, "lrwymn")) {
        out.push((Prefix::Me, rest.to_string()));
    }

    if let Some(rest) = word.strip_prefix("peng") {
        out.push((Prefix::Pe, rest.to_string()));
        if starts_with_vowel(rest) {
            out.push((Prefix::Pe, format!("k{rest}")));
        }
    } else if let Some(rest) = word.strip_prefix("peny") {
        if starts_with_vowel(rest) {
            out.push((Prefix::Pe, format!("s{rest}")));
        }
    } else if let Some(rest) = word.strip_prefix("pem") {
        if starts_with_any(rest, "bfv") {
            out.push((Prefix::Pe, rest.to_string()));
        } else if starts_with_vowel(rest) {
            out.push((Prefix::Pe, format!("p{rest}")));
            out.push((Prefix::Pe, format!("m{rest}")));
        }
    } else if let Some(rest) = word.strip_prefix("pen") {
        if starts_with_any(rest, "cdjstz") {
            out.push((Prefix::Pe, rest.to_string()));
        } else if starts_with_vowel(rest) {
            out.push((Prefix::Pe, format!("t{rest}")));
            out.push((Prefix::Pe, format!("n{rest}")));
        }
    } else if let Some(rest) = word.strip_prefix("per") {
        out.push((Prefix::Pe, rest.to_string()));
        if starts_with_vowel(rest) {
            out.push((Prefix::Pe, format!("r{rest}")));
        }
    } else if let Some(rest) = word.strip_prefix("pel").filter(|r| r.starts_with("ajar")) {
        out.push((Prefix::Pe, rest.to_string()));
    } else if let Some(rest) = word.strip_prefix("pe").filter(|r| !starts_with_vowel(r)) {
        out.push((Prefix::Pe, rest.to_string()));
    }

    out
}
