// src/corpus/source.rs
//! Row-oriented source reading (`csv`).
//!
//! Raw mode yields `RawComment`s for the pipeline; precomputed mode yields finished
//! `EnrichedRecord`s and bypasses cleaning and scoring. Malformed rows are skipped and counted.
//! A missing header or required column is fatal.

use anyhow::anyhow;
use csv::{ReaderBuilder, StringRecord};
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fmt, io,
    path::{Path, PathBuf},
    str::FromStr,
};
use tracing::debug;

use super::{CorpusError, EnrichedRecord, RawComment};
use crate::sentiment::SentimentLabel;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceMode {
    #[default]
    Raw,
    Precomputed,
}

impl SourceMode {
    pub fn as_str(self) -> &'static str {
        match self {
            SourceMode::Raw => "raw",
            SourceMode::Precomputed => "precomputed",
        }
    }
}

impl fmt::Display for SourceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "raw" => Ok(SourceMode::Raw),
            "precomputed" => Ok(SourceMode::Precomputed),
            other => Err(anyhow!("unknown source mode `{other}` (expected raw|precomputed)")),
        }
    }
}

/// Column names in the source header.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ColumnNames {
    /// Free-form comment text. Required in raw mode.
    pub text: String,
    pub clean: String,
    pub score: String,
    pub label: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            text: "Comment".into(),
            clean: "clean_comment".into(),
            score: "sentiment_score".into(),
            label: "sentiment_label".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SourceSpec {
    pub path: PathBuf,
    pub mode: SourceMode,
    /// Single ASCII byte; `\t` is accepted as a two-char escape.
    pub delimiter: String,
    pub columns: ColumnNames,
}

impl Default for SourceSpec {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/comments.csv"),
            mode: SourceMode::Raw,
            delimiter: ",".into(),
            columns: ColumnNames::default(),
        }
    }
}

impl SourceSpec {
    pub fn new(path: impl Into<PathBuf>, mode: SourceMode) -> Self {
        Self {
            path: path.into(),
            mode,
            ..Self::default()
        }
    }

    pub fn delimiter_byte(&self) -> anyhow::Result<u8> {
        parse_delimiter(&self.delimiter).ok_or_else(|| {
            anyhow!(
                "delimiter must be a single ASCII byte, got {:?}",
                self.delimiter
            )
        })
    }
}

fn parse_delimiter(d: &str) -> Option<u8> {
    match d {
        "\\t" => Some(b'\t'),
        _ => match d.as_bytes() {
            [b] if b.is_ascii() => Some(*b),
            _ => None,
        },
    }
}

/// Parsed rows of either mode, plus how many rows were skipped.
#[derive(Debug, Clone)]
pub enum SourceRows {
    Raw {
        comments: Vec<RawComment>,
        skipped: usize,
    },
    Precomputed {
        records: Vec<EnrichedRecord>,
        skipped: usize,
    },
}

impl SourceRows {
    pub fn skipped(&self) -> usize {
        match self {
            SourceRows::Raw { skipped, .. } | SourceRows::Precomputed { skipped, .. } => *skipped,
        }
    }
}

/// Parse `reader` according to `spec`. `spec.path` is only used for error messages.
pub fn read_rows<R: io::Read>(reader: R, spec: &SourceSpec) -> Result<SourceRows, CorpusError> {
    let delim = parse_delimiter(&spec.delimiter)
        .ok_or_else(|| CorpusError::InvalidDelimiter(spec.delimiter.clone()))?;
    let mut rdr = ReaderBuilder::new()
        .delimiter(delim)
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = rdr
        .headers()
        .map_err(|source| CorpusError::Csv {
            path: spec.path.clone(),
            source,
        })?
        .clone();
    if headers.is_empty() || headers.iter().all(|h| h.trim().is_empty()) {
        return Err(missing(&spec.path, &spec.columns.text));
    }

    let mut rows = Vec::new();
    let mut skipped = 0usize;
    for (line, result) in rdr.records().enumerate() {
        match result {
            Ok(rec) if rec.len() == headers.len() => rows.push(rec),
            Ok(rec) => {
                skipped += 1;
                debug!(
                    target: "corpus",
                    row = line + 1,
                    fields = rec.len(),
                    expected = headers.len(),
                    "skipping row with wrong field count"
                );
            }
            Err(e) => {
                skipped += 1;
                debug!(target: "corpus", row = line + 1, error = %e, "skipping unparsable row");
            }
        }
    }

    match spec.mode {
        SourceMode::Raw => {
            let text_idx = column_index(&headers, &spec.columns.text)
                .ok_or_else(|| missing(&spec.path, &spec.columns.text))?;
            let comments = rows
                .iter()
                .map(|rec| RawComment {
                    text: rec
                        .get(text_idx)
                        .filter(|t| !t.trim().is_empty())
                        .map(str::to_string),
                    metadata: passthrough(&headers, rec, &[text_idx]),
                })
                .collect();
            Ok(SourceRows::Raw { comments, skipped })
        }
        SourceMode::Precomputed => {
            let cols = &spec.columns;
            let clean_idx = column_index(&headers, &cols.clean)
                .ok_or_else(|| missing(&spec.path, &cols.clean))?;
            let score_idx = column_index(&headers, &cols.score)
                .ok_or_else(|| missing(&spec.path, &cols.score))?;
            let label_idx = column_index(&headers, &cols.label)
                .ok_or_else(|| missing(&spec.path, &cols.label))?;
            let text_idx = column_index(&headers, &cols.text);

            let used: Vec<usize> = [Some(clean_idx), Some(score_idx), Some(label_idx), text_idx]
                .into_iter()
                .flatten()
                .collect();

            let mut records = Vec::with_capacity(rows.len());
            for (line, rec) in rows.iter().enumerate() {
                let record = precomputed_record(
                    rec,
                    &headers,
                    text_idx,
                    clean_idx,
                    score_idx,
                    label_idx,
                    &used,
                );
                match record {
                    Some(r) => records.push(r),
                    None => {
                        skipped += 1;
                        debug!(
                            target: "corpus",
                            row = line + 1,
                            "skipping incomplete precomputed row"
                        );
                    }
                }
            }
            Ok(SourceRows::Precomputed { records, skipped })
        }
    }
}

fn precomputed_record(
    rec: &StringRecord,
    headers: &StringRecord,
    text_idx: Option<usize>,
    clean_idx: usize,
    score_idx: usize,
    label_idx: usize,
    used: &[usize],
) -> Option<EnrichedRecord> {
    let clean = rec.get(clean_idx)?.trim();
    if clean.is_empty() {
        return None;
    }
    let label: SentimentLabel = rec.get(label_idx)?.parse().ok()?;
    let score: f64 = rec
        .get(score_idx)?
        .trim()
        .parse()
        .ok()
        .filter(|s: &f64| s.is_finite())?;
    Some(EnrichedRecord {
        original_text: text_idx
            .and_then(|i| rec.get(i))
            .unwrap_or_default()
            .to_string(),
        clean_text: clean.to_string(),
        sentiment_score: score,
        sentiment_label: label,
        metadata: passthrough(headers, rec, used),
    })
}

fn column_index(headers: &StringRecord, name: &str) -> Option<usize> {
    headers.iter().position(|h| h.trim() == name)
}

fn passthrough(
    headers: &StringRecord,
    rec: &StringRecord,
    used: &[usize],
) -> BTreeMap<String, String> {
    headers
        .iter()
        .zip(rec.iter())
        .enumerate()
        .filter(|(i, (h, _))| !used.contains(i) && !h.trim().is_empty())
        .map(|(_, (h, v))| (h.trim().to_string(), v.to_string()))
        .collect()
}

fn missing(path: &Path, column: &str) -> CorpusError {
    CorpusError::MissingColumn {
        path: path.to_path_buf(),
        column: column.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_spec() -> SourceSpec {
        SourceSpec::new("mem.csv", SourceMode::Raw)
    }

    #[test]
    fn raw_rows_keep_metadata_and_blank_text_is_missing() {
        let csv = "id,Comment,author\n1,Bagus sekali,budi\n2,   ,sari\n";
        let rows = read_rows(csv.as_bytes(), &raw_spec()).unwrap();
        let SourceRows::Raw { comments, skipped } = rows else {
            panic!("expected raw rows");
        };
        assert_eq!(skipped, 0);
        assert_eq!(comments.len(), 2);
        assert_eq!(comments[0].text.as_deref(), Some("Bagus sekali"));
        assert_eq!(comments[0].metadata.get("author").map(String::as_str), Some("budi"));
        assert!(!comments[0].metadata.contains_key("Comment"));
        assert_eq!(comments[1].text, None);
    }

    #[test]
    fn rows_with_wrong_field_count_are_skipped() {
        let csv = "Comment,author\nok,a\ntoo,many,fields\nshort\nfine,b\n";
        let rows = read_rows(csv.as_bytes(), &raw_spec()).unwrap();
        assert_eq!(rows.skipped(), 2);
        let SourceRows::Raw { comments, .. } = rows else { panic!() };
        assert_eq!(comments.len(), 2);
    }

    #[test]
    fn invalid_utf8_row_is_skipped_not_fatal() {
        let mut bytes = b"Comment\nbaik\n".to_vec();
        bytes.extend_from_slice(&[0xff, 0xfe, b'\n']);
        bytes.extend_from_slice(b"lagi\n");
        let rows = read_rows(&bytes[..], &raw_spec()).unwrap();
        assert_eq!(rows.skipped(), 1);
    }

    #[test]
    fn missing_text_column_is_fatal() {
        let err = read_rows("text,author\nx,y\n".as_bytes(), &raw_spec()).unwrap_err();
        assert!(matches!(
            err,
            CorpusError::MissingColumn { ref column, .. } if column == "Comment"
        ));
        assert!(err.to_string().contains("mem.csv"));
        assert!(read_rows("".as_bytes(), &raw_spec()).is_err());
    }

    #[test]
    fn semicolon_and_tab_delimiters() {
        let mut spec = raw_spec();
        spec.delimiter = ";".into();
        let rows = read_rows("Comment;x\nhalo;1\n".as_bytes(), &spec).unwrap();
        assert_eq!(rows.skipped(), 0);
        spec.delimiter = "\\t".into();
        assert_eq!(spec.delimiter_byte().unwrap(), b'\t');
        spec.delimiter = "ab".into();
        assert!(matches!(
            read_rows("".as_bytes(), &spec),
            Err(CorpusError::InvalidDelimiter(_))
        ));
    }

    #[test]
    fn precomputed_rows_pass_through_and_incomplete_rows_drop() {
        let csv = "Comment,clean_comment,sentiment_score,sentiment_label,likes\n\
                   Mantap!,mantap,0.5,Positif,3\n\
                   Buruk,buruk,-0.4,Negatif,0\n\
                   x,,0.1,Netral,1\n\
                   y,y,abc,Netral,1\n\
                   z,z,0.0,unknown,1\n";
        let spec = SourceSpec::new("pre.csv", SourceMode::Precomputed);
        let rows = read_rows(csv.as_bytes(), &spec).unwrap();
        let SourceRows::Precomputed { records, skipped } = rows else {
            panic!("expected precomputed rows");
        };
        assert_eq!(skipped, 3);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].original_text, "Mantap!");
        assert_eq!(records[0].sentiment_label, SentimentLabel::Positive);
        assert_eq!(records[1].sentiment_score, -0.4);
        assert_eq!(records[1].metadata.get("likes").map(String::as_str), Some("0"));
    }

    #[test]
    fn precomputed_requires_label_column() {
        let spec = SourceSpec::new("pre.csv", SourceMode::Precomputed);
        let csv = "clean_comment,sentiment_score\na,0.1\n";
        let err = read_rows(csv.as_bytes(), &spec).unwrap_err();
        assert!(matches!(
            err,
            CorpusError::MissingColumn { ref column, .. } if column == "sentiment_label"
        ));
    }

    #[test]
    fn mode_parses_from_env_style_strings() {
        assert_eq!("Precomputed".parse::<SourceMode>().unwrap(), SourceMode::Precomputed);
        assert!("stream".parse::<SourceMode>().is_err());
    }
}
