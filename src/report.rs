// src/report.rs
//! Aggregates over enriched records: label filter, summary, word frequencies, histogram.
//!
//! Every function accepts an empty slice and returns a well-defined "no data" result.

use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

use crate::corpus::EnrichedRecord;
use crate::sentiment::{ParseLabelError, SentimentLabel};

pub const DEFAULT_TOP_WORDS: usize = 10;
pub const DEFAULT_HISTOGRAM_BINS: usize = 30;

/// Selected labels. An empty selection means "all labels".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelFilter {
    labels: BTreeSet<SentimentLabel>,
}

impl LabelFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn only<I: IntoIterator<Item = SentimentLabel>>(labels: I) -> Self {
        Self {
            labels: labels.into_iter().collect(),
        }
    }

    /// Comma-separated label names (`Positif,Negatif`); blank input selects everything.
    pub fn parse(raw: &str) -> Result<Self, ParseLabelError> {
        let labels = raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::parse)
            .collect::<Result<BTreeSet<_>, _>>()?;
        Ok(Self { labels })
    }

    pub fn matches(&self, label: SentimentLabel) -> bool {
        self.labels.is_empty() || self.labels.contains(&label)
    }

    pub fn is_all(&self) -> bool {
        self.labels.is_empty() || self.labels.len() == SentimentLabel::ALL.len()
    }
}

pub fn filter_by_labels<'a>(
    records: &'a [EnrichedRecord],
    filter: &LabelFilter,
) -> Vec<&'a EnrichedRecord> {
    records
        .iter()
        .filter(|r| filter.matches(r.sentiment_label))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tendency {
    Positive,
    Negative,
    Neutral,
    NoData,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LabelCount {
    pub label: SentimentLabel,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LabelShare {
    pub label: SentimentLabel,
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub total: usize,
    /// `total - unfiltered_total`; zero when nothing is filtered out.
    pub delta_vs_all: i64,
    pub mean_score: Option<f64>,
    pub median_score: Option<f64>,
    pub dominant: Option<LabelCount>,
    /// Descending by count.
    pub label_counts: Vec<LabelCount>,
    /// Always all three labels, in fixed order.
    pub label_shares: Vec<LabelShare>,
    pub tendency: Tendency,
    pub no_data: bool,
}

impl Summary {
    pub fn from_records(filtered: &[&EnrichedRecord], unfiltered_total: usize) -> Self {
        let total = filtered.len();
        let delta_vs_all = total as i64 - unfiltered_total as i64;

        let mut counts: HashMap<SentimentLabel, usize> = HashMap::new();
        for r in filtered {
            *counts.entry(r.sentiment_label).or_default() += 1;
        }
        let mut label_counts: Vec<LabelCount> = counts
            .into_iter()
            .map(|(label, count)| LabelCount { label, count })
            .collect();
        // count desc, then label string asc
        label_counts.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| a.label.as_str().cmp(b.label.as_str()))
        });
        let dominant = label_counts.first().copied();

        let label_shares = SentimentLabel::ALL
            .iter()
            .map(|&label| {
                let n = label_counts
                    .iter()
                    .find(|c| c.label == label)
                    .map_or(0, |c| c.count);
                let percent = if total == 0 {
                    0.0
                } else {
                    n as f64 / total as f64 * 100.0
                };
                LabelShare { label, percent }
            })
            .collect();

        let mut scores: Vec<f64> = filtered.iter().map(|r| r.sentiment_score).collect();
        let mean_score = mean(&scores);
        let median_score = median(&mut scores);
        let tendency = match mean_score {
            None => Tendency::NoData,
            Some(m) if m > 0.0 => Tendency::Positive,
            Some(m) if m < 0.0 => Tendency::Negative,
            Some(_) => Tendency::Neutral,
        };

        Self {
            total,
            delta_vs_all,
            mean_score,
            median_score,
            dominant,
            label_counts,
            label_shares,
            tendency,
            no_data: total == 0,
        }
    }
}

fn mean(xs: &[f64]) -> Option<f64> {
    (!xs.is_empty()).then(|| xs.iter().sum::<f64>() / xs.len() as f64)
}

fn median(xs: &mut [f64]) -> Option<f64> {
    if xs.is_empty() {
        return None;
    }
    xs.sort_by(|a, b| a.total_cmp(b));
    let mid = xs.len() / 2;
    Some(if xs.len() % 2 == 0 {
        (xs[mid - 1] + xs[mid]) / 2.0
    } else {
        xs[mid]
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WordCount {
    pub word: String,
    pub count: usize,
}

/// Most frequent `clean_text` tokens. Ties keep first-occurrence order.
pub fn top_words<'a, I>(records: I, n: usize) -> Vec<WordCount>
where
    I: IntoIterator<Item = &'a EnrichedRecord>,
{
    // word -> (count, first position)
    let mut freq: HashMap<&'a str, (usize, usize)> = HashMap::new();
    let mut pos = 0usize;
    for r in records {
        for w in r.clean_text.split_whitespace() {
            freq.entry(w).or_insert((0, pos)).0 += 1;
            pos += 1;
        }
    }
    let mut words: Vec<(&str, usize, usize)> =
        freq.into_iter().map(|(w, (c, first))| (w, c, first)).collect();
    words.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));
    words
        .into_iter()
        .take(n)
        .map(|(w, count, _)| WordCount {
            word: w.to_string(),
            count,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelWords {
    pub label: SentimentLabel,
    pub words: Vec<WordCount>,
    pub no_data: bool,
}

/// Top words for each of the three labels, over whatever records are passed in.
pub fn words_by_label(records: &[EnrichedRecord], n: usize) -> Vec<LabelWords> {
    SentimentLabel::ALL
        .iter()
        .map(|&label| {
            let words = top_words(records.iter().filter(|r| r.sentiment_label == label), n);
            LabelWords {
                label,
                no_data: words.is_empty(),
                words,
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

/// Equal-width bins over [-1, 1]. The last bin is closed on the right.
pub fn score_histogram(records: &[&EnrichedRecord], bins: usize) -> Vec<HistogramBin> {
    let bins = bins.max(1);
    let width = 2.0 / bins as f64;
    let mut counts = vec![0usize; bins];
    for r in records {
        let s = r.sentiment_score;
        if !s.is_finite() {
            continue;
        }
        let idx = (((s.clamp(-1.0, 1.0) + 1.0) / width).floor() as usize).min(bins - 1);
        counts[idx] += 1;
    }
    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBin {
            start: -1.0 + i as f64 * width,
            end: -1.0 + (i + 1) as f64 * width,
            count,
        })
        .collect()
}
