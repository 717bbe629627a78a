use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::error::VocabularyError;

/// Fixed token → column mapping built offline.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    columns: HashMap<String, usize>,
    tokens: Vec<String>,
}

/// On-disk vocabulary: an ordered token list or an explicit mapping.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VocabularyFile {
    Ordered(Vec<String>),
    Mapping(HashMap<String, usize>),
}

impl Vocabulary {
    /// Builds a vocabulary where each token's column is its position.
    pub fn from_tokens<I, S>(tokens: I) -> Result<Self, VocabularyError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tokens: Vec<String> = tokens.into_iter().map(Into::into).collect();
        let mut columns = HashMap::with_capacity(tokens.len());
        for (column, token) in tokens.iter().enumerate() {
            if columns.insert(token.clone(), column).is_some() {
                return Err(VocabularyError::Duplicate(token.clone()));
            }
        }
        Ok(Self { columns, tokens })
    }

    /// Builds a vocabulary from a token → column mapping whose columns must
    /// cover `0..len` exactly once.
    pub fn from_mapping(mapping: HashMap<String, usize>) -> Result<Self, VocabularyError> {
        let size = mapping.len();
        let mut slots: Vec<Option<String>> = vec![None; size];
        for (token, &column) in &mapping {
            let slot = slots
                .get_mut(column)
                .ok_or_else(|| VocabularyError::ColumnOutOfRange {
                    token: token.clone(),
                    column,
                    size,
                })?;
            if let Some(other) = slot.as_deref() {
                return Err(VocabularyError::SharedColumn {
                    column,
                    first: other.to_string(),
                    second: token.clone(),
                });
            }
            *slot = Some(token.clone());
        }
        let tokens = slots.into_iter().flatten().collect();
        Ok(Self {
            columns: mapping,
            tokens,
        })
    }

    pub fn from_file(file: VocabularyFile) -> Result<Self, VocabularyError> {
        let vocabulary = match file {
            VocabularyFile::Ordered(tokens) => Self::from_tokens(tokens)?,
            VocabularyFile::Mapping(mapping) => Self::from_mapping(mapping)?,
        };
        if vocabulary.is_empty() {
            return Err(VocabularyError::Empty);
        }
        Ok(vocabulary)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn column(&self, token: &str) -> Option<usize> {
        self.columns.get(token).copied()
    }

    pub fn token(&self, column: usize) -> Option<&str> {
        self.tokens.get(column).map(String::as_str)
    }

    /// Tokens in column order.
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Counts vocabulary tokens in a normalized, space-separated string.
    /// Tokens outside the vocabulary are ignored.
    pub fn vectorize(&self, normalized: &str) -> CountVector {
        let mut counts = BTreeMap::new();
        for token in normalized.split_whitespace() {
            if let Some(column) = self.column(token) {
                *counts.entry(column).or_insert(0u32) += 1;
            }
        }
        CountVector {
            dim: self.len(),
            counts,
        }
    }
}

/// Bag-of-words counts over the vocabulary; only non-zero columns are stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountVector {
    dim: usize,
    counts: BTreeMap<usize, u32>,
}

impl CountVector {
    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn get(&self, column: usize) -> f64 {
        self.counts.get(&column).copied().unwrap_or(0) as f64
    }

    pub fn nnz(&self) -> usize {
        self.counts.len()
    }

    pub fn to_dense(&self) -> Vec<f64> {
        (0..self.dim).map(|c| self.get(c)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vocab() -> Vocabulary {
        Vocabulary::from_tokens(["gobierno", "anuncia", "ley", "falso", "real"]).unwrap()
    }

    #[test]
    fn test_counts_known_tokens() {
        let v = vocab().vectorize("gobierno ley real");
        assert_eq!(v.to_dense(), vec![1.0, 0.0, 1.0, 0.0, 1.0]);
        assert_eq!(v.nnz(), 3);
    }

    #[test]
    fn test_repeated_and_unknown_tokens() {
        let v = vocab().vectorize("ley ley desconocido ley");
        assert_eq!(v.to_dense(), vec![0.0, 0.0, 3.0, 0.0, 0.0]);
        assert_eq!(v.dim(), 5);
    }

    #[test]
    fn test_order_invariance() {
        let a = vocab().vectorize("gobierno anuncia ley falso");
        let b = vocab().vectorize("falso ley anuncia gobierno");
        assert_eq!(a, b);
    }

    #[test]
    fn test_mapping_must_be_dense() {
        let mut mapping = HashMap::new();
        mapping.insert("uno".to_string(), 0);
        mapping.insert("dos".to_string(), 2);
        assert!(matches!(
            Vocabulary::from_mapping(mapping),
            Err(VocabularyError::ColumnOutOfRange { column: 2, size: 2, .. })
        ));

        let mut mapping = HashMap::new();
        mapping.insert("uno".to_string(), 0);
        mapping.insert("dos".to_string(), 0);
        assert!(matches!(
            Vocabulary::from_mapping(mapping),
            Err(VocabularyError::SharedColumn { column: 0, .. })
        ));

        let mut mapping = HashMap::new();
        mapping.insert("uno".to_string(), 1);
        mapping.insert("dos".to_string(), 0);
        let v = Vocabulary::from_mapping(mapping).unwrap();
        assert_eq!(v.token(0), Some("dos"));
        assert_eq!(v.column("uno"), Some(1));
    }

    #[test]
    fn test_duplicate_tokens_rejected() {
        assert_eq!(
            Vocabulary::from_tokens(["ley", "ley"]).unwrap_err(),
            VocabularyError::Duplicate("ley".to_string())
        );
    }

    #[test]
    fn test_empty_vocabulary_file_rejected() {
        let empty: VocabularyFile = serde_json::from_str("[]").unwrap();
        assert_eq!(Vocabulary::from_file(empty).unwrap_err(), VocabularyError::Empty);
    }

    #[test]
    fn test_vocabulary_file_forms() {
        let ordered: VocabularyFile = serde_json::from_str(r#"["ley", "real"]"#).unwrap();
        assert_eq!(Vocabulary::from_file(ordered).unwrap().column("real"), Some(1));

        let mapping: VocabularyFile = serde_json::from_str(r#"{"ley": 1, "real": 0}"#).unwrap();
        assert_eq!(Vocabulary::from_file(mapping).unwrap().column("real"), Some(0));
    }
}
