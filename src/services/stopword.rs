// src/services/stopword.rs
//! Indonesian stopword-removal service: general-purpose function words plus
//! multi-token filler phrases.

use anyhow::Result;
use std::collections::HashSet;

use super::StopwordRemover;

/// General Indonesian function words.
const INDONESIAN_STOPWORDS: &[&str] = &[
    // Conjunctions / connectives
    "dan", "atau", "tetapi", "tapi", "namun", "serta", "sedangkan", "melainkan", "sehingga",
    "karena", "sebab", "maka", "agar", "supaya", "jika", "kalau", "ketika", "saat", "selagi",
    "sambil", "seraya", "walau", "walaupun", "meskipun", "bahwa", "yaitu", "yakni",
    // Prepositions
    "di", "ke", "dari", "pada", "kepada", "oleh", "untuk", "bagi", "dengan", "dalam", "tentang",
    "terhadap", "antara", "demi", "tanpa", "sampai", "hingga", "sejak", "menurut", "seperti",
    "daripada", "sekitar",
    // Pronouns
    "saya", "kami", "kita", "anda", "kamu", "dia", "ia", "mereka", "kalian", "beliau",
    // Demonstratives / relatives
    "yang", "ini", "itu", "itulah", "inilah", "sini", "situ", "sana", "tersebut",
    // Aspect / modality
    "akan", "sudah", "telah", "sedang", "masih", "belum", "harus", "bisa", "dapat", "boleh",
    "mungkin", "pernah", "lagi", "pula", "juga", "hanya", "saja", "pun", "kah", "lah", "toh",
    // Adverbs / determiners
    "sangat", "amat", "agak", "lebih", "paling", "para", "setiap", "semua", "secara", "sebagai",
    "adalah", "ialah", "merupakan", "ada", "tidak", "apakah", "apalagi", "kembali", "lain",
    "selain", "kecuali", "setelah", "sebelum", "sesudah", "sementara", "begitu", "demikian",
    "dll", "dsb", "dst", "mari", "nanti", "ya", "oh", "ok",
    // Question words
    "apa", "siapa", "mengapa", "kenapa", "bagaimana", "dimana", "kemana", "kapan",
];

/// Filler phrases removed as a unit before single-word matching.
const INDONESIAN_PHRASES: &[&str] = &[
    "dan lain lain",
    "dan sebagainya",
    "dan seterusnya",
    "oleh karena itu",
    "di samping itu",
    "dengan kata lain",
    "tidak apa apa",
    "ngomong ngomong",
    "sama sama",
];

#[derive(Debug, Clone)]
pub struct IndonesianStopwordRemover {
    words: HashSet<String>,
    /// Tokenized phrases, longest first.
    phrases: Vec<Vec<String>>,
}

impl IndonesianStopwordRemover {
    pub fn new() -> Self {
        Self::with_vocabulary(INDONESIAN_STOPWORDS, INDONESIAN_PHRASES)
    }

    pub fn with_vocabulary<W, P>(words: &[W], phrases: &[P]) -> Self
    where
        W: AsRef<str>,
        P: AsRef<str>,
    {
        let words = words
            .iter()
            .map(|w| w.as_ref().trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();

        let mut phrases: Vec<Vec<String>> = phrases
            .iter()
            .map(|p| {
                p.as_ref()
                    .split_whitespace()
                    .map(str::to_lowercase)
                    .collect::<Vec<_>>()
            })
            .filter(|p| !p.is_empty())
            .collect();
        phrases.sort_by(|a, b| b.len().cmp(&a.len()));

        Self { words, phrases }
    }

    fn phrase_len_at(&self, tokens: &[&str]) -> Option<usize> {
        self.phrases
            .iter()
            .find(|p| {
                p.len() <= tokens.len() && p.iter().zip(tokens).all(|(a, b)| a.as_str() == *b)
            })
            .map(Vec::len)
    }
}

impl Default for IndonesianStopwordRemover {
    fn default() -> Self {
        Self::new()
    }
}

impl StopwordRemover for IndonesianStopwordRemover {
    fn remove_stopwords(&self, text: &str) -> Result<String> {
        let tokens: Vec<&str> = text.split_whitespace().collect();
        let mut kept = Vec::with_capacity(tokens.len());
        let mut i = 0;
        while i < tokens.len() {
            if let Some(n) = self.phrase_len_at(&tokens[i..]) {
                i += n;
                continue;
            }
            if !self.words.contains(tokens[i]) {
                kept.push(tokens[i]);
            }
            i += 1;
        }
        Ok(kept.join(" "))
    }

    fn name(&self) -> &'static str {
        "indonesian-stopwords"
    }
}
