use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::error::{AppError, AppResult};

/// English stop words excluded from the TF-IDF vocabulary
const STOP_WORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "all", "also", "am", "an", "and", "any", "are",
    "as", "at", "be", "because", "been", "before", "being", "below", "between", "both", "but",
    "by", "can", "could", "did", "do", "does", "doing", "down", "during", "each", "few", "for",
    "from", "further", "had", "has", "have", "having", "he", "her", "here", "hers", "him",
    "his", "how", "if", "in", "into", "is", "it", "its", "itself", "just", "me", "more",
    "most", "my", "no", "nor", "not", "now", "of", "off", "on", "once", "only", "or", "other",
    "our", "ours", "out", "over", "own", "same", "she", "should", "so", "some", "such", "than",
    "that", "the", "their", "theirs", "them", "then", "there", "these", "they", "this",
    "those", "through", "to", "too", "under", "until", "up", "very", "was", "we", "were",
    "what", "when", "where", "which", "while", "who", "whom", "why", "will", "with", "would",
    "you", "your", "yours",
];

/// Splits text into lowercase alphanumeric tokens of at least two characters,
/// dropping stop words.
fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.len() >= 2)
        .filter(|t| !STOP_WORDS.contains(t))
        .map(|t| t.to_string())
        .collect()
}

/// TF-IDF vectorizer over course feature text.
///
/// Term weights use smoothed inverse document frequency,
/// `idf = ln((1 + n) / (1 + df)) + 1`, and every document vector is
/// l2-normalized so cosine similarity reduces to a dot product. The learned
/// vocabulary and idf weights are part of the persisted snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
}

impl TfidfVectorizer {
    /// Learns the vocabulary and document frequencies from a corpus
    pub fn fit(documents: &[String]) -> AppResult<Self> {
        if documents.is_empty() {
            return Err(AppError::InsufficientData(
                "cannot fit vectorizer on an empty corpus".to_string(),
            ));
        }

        // Vocabulary in sorted term order so column indices are deterministic
        let mut terms: HashSet<String> = HashSet::new();
        for doc in documents {
            terms.extend(tokenize(doc));
        }
        if terms.is_empty() {
            return Err(AppError::InsufficientData(
                "vocabulary is empty after stop-word filtering".to_string(),
            ));
        }
        let mut sorted_terms: Vec<String> = terms.into_iter().collect();
        sorted_terms.sort();

        let vocabulary: HashMap<String, usize> = sorted_terms
            .into_iter()
            .enumerate()
            .map(|(i, t)| (t, i))
            .collect();

        // Document frequency per term
        let mut df = vec![0usize; vocabulary.len()];
        for doc in documents {
            let unique: HashSet<String> = tokenize(doc).into_iter().collect();
            for term in unique {
                if let Some(&idx) = vocabulary.get(&term) {
                    df[idx] += 1;
                }
            }
        }

        let n = documents.len() as f64;
        let idf = df
            .iter()
            .map(|&d| ((1.0 + n) / (1.0 + d as f64)).ln() + 1.0)
            .collect();

        Ok(Self { vocabulary, idf })
    }

    /// Maps documents into l2-normalized TF-IDF row vectors.
    ///
    /// Documents with no in-vocabulary tokens produce all-zero rows.
    pub fn transform(&self, documents: &[String]) -> Array2<f64> {
        let mut matrix = Array2::zeros((documents.len(), self.vocabulary.len()));

        for (row, doc) in documents.iter().enumerate() {
            let mut counts: HashMap<usize, f64> = HashMap::new();
            for token in tokenize(doc) {
                if let Some(&idx) = self.vocabulary.get(&token) {
                    *counts.entry(idx).or_insert(0.0) += 1.0;
                }
            }

            for (idx, count) in &counts {
                matrix[[row, *idx]] = count * self.idf[*idx];
            }

            let norm = matrix.row(row).iter().map(|v| v * v).sum::<f64>().sqrt();
            if norm > 0.0 {
                matrix.row_mut(row).mapv_inplace(|v| v / norm);
            }
        }

        matrix
    }

    /// Fits the vectorizer and transforms the corpus in one pass
    pub fn fit_transform(documents: &[String]) -> AppResult<(Self, Array2<f64>)> {
        let vectorizer = Self::fit(documents)?;
        let matrix = vectorizer.transform(documents);
        Ok((vectorizer, matrix))
    }

    /// Number of learned vocabulary terms
    pub fn vocabulary_len(&self) -> usize {
        self.vocabulary.len()
    }
}
