//! TF-IDF feature transformer loaded from a fitted-vectorizer export
//!
//! Tokenization follows the usual word pattern (`\b\w\w+\b`), stop words are
//! removed before n-grams are built, and n-grams are space-joined tokens.
//! Terms missing from the fitted vocabulary are ignored.

use crate::classifier::{FeatureTransformer, FeatureVector};
use fraudfilter_core::{Error, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

const TOKEN_PATTERN: &str = r"\b\w\w+\b";

/// Serialized form of a fitted TF-IDF vectorizer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorizerArtifact {
    /// Term -> feature column
    pub vocabulary: HashMap<String, usize>,

    /// Inverse document frequency per column
    pub idf: Vec<f32>,

    #[serde(default = "default_ngram_range")]
    pub ngram_range: (usize, usize),

    #[serde(default = "default_true")]
    pub lowercase: bool,

    /// Use `1 + ln(tf)` instead of raw counts
    #[serde(default)]
    pub sublinear_tf: bool,

    #[serde(default)]
    pub norm: Norm,

    #[serde(default)]
    pub stop_words: Vec<String>,

    /// Longest text (in chars) the transformer accepts
    #[serde(default = "default_max_input_chars")]
    pub max_input_chars: usize,
}

impl VectorizerArtifact {
    /// Artifact with default settings over the given vocabulary
    pub fn new(vocabulary: HashMap<String, usize>, idf: Vec<f32>) -> Self {
        Self {
            vocabulary,
            idf,
            ngram_range: default_ngram_range(),
            lowercase: true,
            sublinear_tf: false,
            norm: Norm::default(),
            stop_words: Vec::new(),
            max_input_chars: default_max_input_chars(),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.idf.len() != self.vocabulary.len() {
            return Err(Error::config(format!(
                "idf length {} does not match vocabulary size {}",
                self.idf.len(),
                self.vocabulary.len()
            )));
        }

        let dimension = self.idf.len();
        if let Some((term, col)) = self.vocabulary.iter().find(|(_, col)| **col >= dimension) {
            return Err(Error::config(format!(
                "vocabulary term '{}' maps to column {} outside dimension {}",
                term, col, dimension
            )));
        }

        let (min_n, max_n) = self.ngram_range;
        if min_n == 0 || min_n > max_n {
            return Err(Error::config(format!(
                "invalid ngram_range ({}, {})",
                min_n, max_n
            )));
        }

        if self.idf.iter().any(|v| !v.is_finite()) {
            return Err(Error::config("idf contains non-finite values"));
        }

        Ok(())
    }
}

/// Row normalization applied after weighting
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Norm {
    #[default]
    L2,
    L1,
    #[serde(rename = "none")]
    Identity,
}

/// Fitted TF-IDF vectorizer
pub struct TfidfVectorizer {
    name: String,
    vocabulary: HashMap<String, usize>,
    idf: Vec<f32>,
    ngram_range: (usize, usize),
    lowercase: bool,
    sublinear_tf: bool,
    norm: Norm,
    stop_words: HashSet<String>,
    max_input_chars: usize,
    token_pattern: Regex,
}

impl TfidfVectorizer {
    /// Build from an already-parsed artifact
    pub fn from_artifact(name: impl Into<String>, artifact: VectorizerArtifact) -> Result<Self> {
        artifact.validate()?;

        let token_pattern = Regex::new(TOKEN_PATTERN)
            .map_err(|e| Error::internal(format!("Failed to compile token pattern: {}", e)))?;

        Ok(Self {
            name: name.into(),
            vocabulary: artifact.vocabulary,
            idf: artifact.idf,
            ngram_range: artifact.ngram_range,
            lowercase: artifact.lowercase,
            sublinear_tf: artifact.sublinear_tf,
            norm: artifact.norm,
            stop_words: artifact.stop_words.into_iter().collect(),
            max_input_chars: artifact.max_input_chars,
            token_pattern,
        })
    }

    /// Load from a JSON artifact file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let artifact: VectorizerArtifact = serde_json::from_str(&raw)?;

        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("tfidf")
            .to_string();

        Self::from_artifact(name, artifact)
    }

    fn tokenize<'a>(&self, text: &'a str) -> Vec<&'a str> {
        self.token_pattern
            .find_iter(text)
            .map(|m| m.as_str())
            .filter(|token| !self.stop_words.contains(*token))
            .collect()
    }

    /// Counts keyed by column, so norms are always summed in column order
    fn term_counts(&self, tokens: &[&str]) -> BTreeMap<usize, f32> {
        let mut counts = BTreeMap::new();
        let (min_n, max_n) = self.ngram_range;

        for n in min_n..=max_n {
            for window in tokens.windows(n) {
                let gram = window.join(" ");
                if let Some(&col) = self.vocabulary.get(&gram) {
                    *counts.entry(col).or_insert(0.0) += 1.0;
                }
            }
        }

        counts
    }

    fn apply_norm(&self, entries: &mut [(usize, f32)]) {
        let total = match self.norm {
            Norm::L2 => entries.iter().map(|(_, v)| v * v).sum::<f32>().sqrt(),
            Norm::L1 => entries.iter().map(|(_, v)| v.abs()).sum::<f32>(),
            Norm::Identity => return,
        };

        if total > 0.0 {
            for (_, value) in entries.iter_mut() {
                *value /= total;
            }
        }
    }
}

impl FeatureTransformer for TfidfVectorizer {
    fn transform(&self, text: &str) -> Result<FeatureVector> {
        let length = text.chars().count();
        if length > self.max_input_chars {
            return Err(Error::classifier(format!(
                "text length {} exceeds transformer limit of {} characters",
                length, self.max_input_chars
            )));
        }

        if text.contains('\u{FFFD}') {
            return Err(Error::classifier(
                "text contains undecodable bytes (U+FFFD replacement character)",
            ));
        }

        let lowered;
        let text = if self.lowercase {
            lowered = text.to_lowercase();
            lowered.as_str()
        } else {
            text
        };

        let tokens = self.tokenize(text);
        let counts = self.term_counts(&tokens);

        let mut entries: Vec<(usize, f32)> = counts
            .into_iter()
            .map(|(col, tf)| {
                let tf = if self.sublinear_tf { 1.0 + tf.ln() } else { tf };
                (col, tf * self.idf[col])
            })
            .collect();

        self.apply_norm(&mut entries);

        FeatureVector::from_sparse(self.dimension(), entries)
    }

    fn dimension(&self) -> usize {
        self.idf.len()
    }

    fn name(&self) -> &str {
        &self.name
    }
}

fn default_ngram_range() -> (usize, usize) {
    (1, 1)
}

fn default_true() -> bool {
    true
}

fn default_max_input_chars() -> usize {
    20_000
}
