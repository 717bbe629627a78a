//! Typed artifact store for the offline-tuned classifier.
//!
//! A model directory holds `vocabulary.json`, `selection.json`,
//! `weights.json`, `thresholds.json` and an optional `manifest.json`. All
//! cross-artifact consistency is checked here, once, so the request path can
//! index without bounds reasoning.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

use crate::error::ArtifactError;
use crate::selection::{
    FeatureSelector, IndexSelection, Mask, RangeSelection, Selection, SelectionFile, SelectionKind,
};
use crate::vectorize::{Vocabulary, VocabularyFile};

pub const VOCABULARY_FILE: &str = "vocabulary.json";
pub const SELECTION_FILE: &str = "selection.json";
pub const WEIGHTS_FILE: &str = "weights.json";
pub const THRESHOLDS_FILE: &str = "thresholds.json";
pub const MANIFEST_FILE: &str = "manifest.json";

const ARTIFACT_FILES: [&str; 4] = [VOCABULARY_FILE, SELECTION_FILE, WEIGHTS_FILE, THRESHOLDS_FILE];

/// Which offline search produced the artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchStrategy {
    Pso,
    Vns,
}

impl SearchStrategy {
    /// Particle swarm keeps a contiguous range; neighbourhood search keeps
    /// explicit indices.
    pub fn selection_kind(self) -> SelectionKind {
        match self {
            SearchStrategy::Pso => SelectionKind::Range,
            SearchStrategy::Vns => SelectionKind::Indices,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub strategy: Option<SearchStrategy>,
    /// Expected SHA-256 (hex) per artifact file name.
    #[serde(default)]
    pub sha256: HashMap<String, String>,
}

#[derive(Debug, Clone)]
pub struct ModelArtifacts {
    pub manifest: Manifest,
    pub vocabulary: Vocabulary,
    pub selection: Selection,
    pub weights: Vec<f64>,
    pub thresholds: Vec<f64>,
    pub fingerprint: String,
}

impl ModelArtifacts {
    pub fn load(dir: &Path) -> Result<Self, ArtifactError> {
        let manifest_path = dir.join(MANIFEST_FILE);
        let manifest = if manifest_path.exists() {
            parse_json::<Manifest>(&manifest_path, &read_file(&manifest_path)?)?
        } else {
            debug!("No manifest in {}, skipping checksum verification", dir.display());
            Manifest::default()
        };

        let mut contents = HashMap::new();
        for name in ARTIFACT_FILES {
            let bytes = read_file(&dir.join(name))?;
            verify_checksum(&manifest, name, &bytes)?;
            contents.insert(name, bytes);
        }

        let vocabulary: VocabularyFile = parse_json(&dir.join(VOCABULARY_FILE), &contents[VOCABULARY_FILE])?;
        let selection: SelectionFile = parse_json(&dir.join(SELECTION_FILE), &contents[SELECTION_FILE])?;
        let weights: Vec<f64> = parse_json(&dir.join(WEIGHTS_FILE), &contents[WEIGHTS_FILE])?;
        let thresholds: Vec<f64> = parse_json(&dir.join(THRESHOLDS_FILE), &contents[THRESHOLDS_FILE])?;

        let artifacts = Self::from_parts(manifest, vocabulary, selection, weights, thresholds)?;
        info!(
            "Loaded model artifacts from {}: version {}, vocabulary {}, {} selected features ({:?})",
            dir.display(),
            artifacts.version(),
            artifacts.vocabulary.len(),
            artifacts.weights.len(),
            artifacts.selection.kind(),
        );
        Ok(artifacts)
    }

    /// Assembles and validates artifacts already in memory.
    pub fn from_parts(
        manifest: Manifest,
        vocabulary: VocabularyFile,
        selection: SelectionFile,
        weights: Vec<f64>,
        thresholds: Vec<f64>,
    ) -> Result<Self, ArtifactError> {
        check_manifest_entries(&manifest)?;
        let vocabulary = Vocabulary::from_file(vocabulary)?;
        let fingerprint = fingerprint(&vocabulary, &selection, &weights, &thresholds)?;

        let selection = build_selection(selection, vocabulary.len())?;
        if let Some(strategy) = manifest.strategy {
            if selection.kind() != strategy.selection_kind() {
                return Err(ArtifactError::Inconsistent(format!(
                    "manifest strategy {:?} expects a {:?} selection, found {:?}",
                    strategy,
                    strategy.selection_kind(),
                    selection.kind()
                )));
            }
        }

        let k = selection.len();
        if k == 0 {
            return Err(ArtifactError::Inconsistent("selection has no features".to_string()));
        }
        if weights.len() != k || thresholds.len() != k {
            return Err(ArtifactError::Inconsistent(format!(
                "selection has {} features but {} weights and {} thresholds",
                k,
                weights.len(),
                thresholds.len()
            )));
        }
        if let Some(i) = weights.iter().position(|w| !w.is_finite()) {
            return Err(ArtifactError::Inconsistent(format!("weight {} is not finite", i)));
        }
        if let Some(i) = thresholds.iter().position(|t| !t.is_finite()) {
            return Err(ArtifactError::Inconsistent(format!("threshold {} is not finite", i)));
        }

        Ok(Self {
            manifest,
            vocabulary,
            selection,
            weights,
            thresholds,
            fingerprint,
        })
    }

    /// Manifest version if present, otherwise the first 12 hex chars of the fingerprint.
    pub fn version(&self) -> String {
        match &self.manifest.version {
            Some(v) => v.clone(),
            None => self.fingerprint.chars().take(12).collect(),
        }
    }
}

/// SHA-256 over the parsed artifacts, each prefixed by its file name. The
/// vocabulary is hashed in column order, so a token list and an equivalent
/// mapping give the same fingerprint.
fn fingerprint(
    vocabulary: &Vocabulary,
    selection: &SelectionFile,
    weights: &[f64],
    thresholds: &[f64],
) -> Result<String, ArtifactError> {
    let parts = [
        (VOCABULARY_FILE, serde_json::to_vec(vocabulary.tokens())),
        (SELECTION_FILE, serde_json::to_vec(selection)),
        (WEIGHTS_FILE, serde_json::to_vec(weights)),
        (THRESHOLDS_FILE, serde_json::to_vec(thresholds)),
    ];
    let mut hasher = Sha256::new();
    for (name, bytes) in parts {
        let bytes = bytes.map_err(|e| ArtifactError::Inconsistent(e.to_string()))?;
        hasher.update(name.as_bytes());
        hasher.update(&bytes);
    }
    Ok(hex::encode(hasher.finalize()))
}

fn check_manifest_entries(manifest: &Manifest) -> Result<(), ArtifactError> {
    match manifest.sha256.keys().find(|name| !ARTIFACT_FILES.contains(&name.as_str())) {
        Some(unknown) => Err(ArtifactError::UnknownArtifact(unknown.clone())),
        None => Ok(()),
    }
}

fn build_selection(file: SelectionFile, vocabulary_len: usize) -> Result<Selection, ArtifactError> {
    let mask_from = |mask: Option<Vec<bool>>| -> Result<Mask, ArtifactError> {
        match mask {
            None => Ok(Mask::identity(vocabulary_len)),
            Some(bits) if bits.len() == vocabulary_len => Ok(Mask::from_bools(&bits)),
            Some(bits) => Err(ArtifactError::Inconsistent(format!(
                "mask has {} entries for a vocabulary of {}",
                bits.len(),
                vocabulary_len
            ))),
        }
    };

    match file {
        SelectionFile::Range { mask, k } => {
            let mask = mask_from(mask)?;
            let k = k.unwrap_or_else(|| mask.width());
            if k > mask.width() {
                return Err(ArtifactError::Inconsistent(format!(
                    "range of {} features exceeds {} mask survivors",
                    k,
                    mask.width()
                )));
            }
            Ok(Selection::Range(RangeSelection::new(mask, k)))
        }
        SelectionFile::Indices { mask, indices } => {
            let mask = mask_from(mask)?;
            if let Some(&bad) = indices.iter().find(|&&i| i >= mask.width()) {
                return Err(ArtifactError::Inconsistent(format!(
                    "selection index {} out of range for {} mask survivors",
                    bad,
                    mask.width()
                )));
            }
            Ok(Selection::Indices(IndexSelection::new(mask, indices)))
        }
    }
}

fn verify_checksum(manifest: &Manifest, name: &str, bytes: &[u8]) -> Result<(), ArtifactError> {
    let Some(expected) = manifest.sha256.get(name) else {
        return Ok(());
    };
    let actual = hex::encode(Sha256::digest(bytes));
    if !actual.eq_ignore_ascii_case(expected) {
        return Err(ArtifactError::Checksum {
            file: name.to_string(),
            expected: expected.clone(),
            actual,
        });
    }
    Ok(())
}

fn read_file(path: &Path) -> Result<Vec<u8>, ArtifactError> {
    std::fs::read(path).map_err(|source| ArtifactError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_json<T: serde::de::DeserializeOwned>(path: &Path, bytes: &[u8]) -> Result<T, ArtifactError> {
    serde_json::from_slice(bytes).map_err(|source| ArtifactError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
