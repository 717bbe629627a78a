use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, info};

use crate::{
    artifacts::ModelArtifacts,
    decision::{self, INSUFFICIENT_CONFIDENCE},
    model::{Binarizer, LinearScorer},
    normalize::TextNormalizer,
    selection::{FeatureSelector, Selection},
    types::{Prediction, Verdict},
    vectorize::Vocabulary,
};

/// The loaded classifier: every stage of the inference pipeline, immutable
/// once built and safe to share across request handlers.
#[derive(Debug, Clone)]
pub struct Analyzer {
    normalizer: TextNormalizer,
    vocabulary: Vocabulary,
    selection: Selection,
    binarizer: Binarizer,
    scorer: LinearScorer,
    model_version: String,
}

/// Intermediate values for one scored document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trace {
    pub normalized: String,
    pub reduced: Vec<f64>,
    pub bits: Vec<u8>,
    pub logit: f64,
    pub score: f64,
}

impl Analyzer {
    pub fn from_artifacts(artifacts: ModelArtifacts, stop_words: HashSet<String>) -> Self {
        let model_version = artifacts.version();
        let scorer = LinearScorer::new(artifacts.weights);

        let strongest: Vec<(usize, f64)> = scorer.feature_importance().into_iter().take(5).collect();
        debug!("Strongest selected features (position, |weight|): {:?}", strongest);

        let analyzer = Self {
            normalizer: TextNormalizer::new(stop_words),
            vocabulary: artifacts.vocabulary,
            selection: artifacts.selection,
            binarizer: Binarizer::new(artifacts.thresholds),
            scorer,
            model_version,
        };
        info!(
            "Analyzer ready: model {}, {} stopwords, {} features",
            analyzer.model_version,
            analyzer.normalizer.stop_word_count(),
            analyzer.feature_count()
        );
        analyzer
    }

    pub fn model_version(&self) -> &str {
        &self.model_version
    }

    pub fn feature_count(&self) -> usize {
        self.selection.len()
    }

    /// Scores a headline and body taken together.
    pub fn predict(&self, title: &str, body: &str) -> Prediction {
        self.predict_text(&format!("{} {}", title, body))
    }

    pub fn predict_text(&self, text: &str) -> Prediction {
        match self.trace(text) {
            None => Prediction {
                verdict: Verdict::InsufficientText,
                confidence: INSUFFICIENT_CONFIDENCE.to_string(),
                analyzed_text: String::new(),
            },
            Some(trace) => {
                let (verdict, confidence) = decision::decide(trace.score);
                debug!(
                    "Scored document: {} active of {} features, logit {:.4}, {} ({})",
                    trace.bits.iter().filter(|&&b| b == 1).count(),
                    trace.bits.len(),
                    trace.logit,
                    verdict,
                    confidence
                );
                Prediction {
                    verdict,
                    confidence,
                    analyzed_text: trace.normalized,
                }
            }
        }
    }

    /// Runs every stage and keeps the intermediate vectors. `None` when the
    /// text normalizes to nothing, in which case nothing is vectorized.
    pub fn trace(&self, text: &str) -> Option<Trace> {
        let normalized = self.normalizer.normalize(text);
        if normalized.is_empty() {
            return None;
        }

        let counts = self.vocabulary.vectorize(&normalized);
        let reduced = self.selection.select(&counts);
        let bits = self.binarizer.binarize(&reduced);
        let scored = self.scorer.score(&bits);

        Some(Trace {
            normalized,
            reduced,
            bits,
            logit: scored.logit,
            score: scored.score,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::Manifest;
    use crate::selection::SelectionFile;
    use crate::stopwords;
    use crate::vectorize::VocabularyFile;

    fn analyzer(weights: Vec<f64>, thresholds: Vec<f64>) -> Analyzer {
        let artifacts = ModelArtifacts::from_parts(
            Manifest::default(),
            VocabularyFile::Ordered(
                ["gobierno", "anuncia", "ley", "falso", "real"]
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
            ),
            SelectionFile::Indices {
                mask: None,
                indices: vec![0, 2, 4],
            },
            weights,
            thresholds,
        )
        .unwrap();
        Analyzer::from_artifacts(artifacts, stopwords::spanish())
    }

    fn demo() -> Analyzer {
        analyzer(vec![1.0, -1.0, 2.0], vec![0.0, 0.0, 0.0])
    }

    #[test]
    fn test_scenario_selected_tokens() {
        let a = demo();
        let trace = a.trace("El gobierno y la ley real.").unwrap();
        assert_eq!(trace.normalized, "gobierno ley real");
        assert_eq!(trace.reduced, vec![1.0, 1.0, 1.0]);
        assert_eq!(trace.bits, vec![1, 1, 1]);
        assert_eq!(trace.logit, 2.0);
        assert!((trace.score - 0.881).abs() < 1e-3);

        let p = a.predict("El gobierno", "y la ley real.");
        assert_eq!(p.verdict, Verdict::Real);
        assert_eq!(p.confidence, "88.08%");
        assert_eq!(p.analyzed_text, "gobierno ley real");
    }

    #[test]
    fn test_scenario_unselected_token_only() {
        let a = demo();
        let trace = a.trace("falso").unwrap();
        assert_eq!(trace.reduced, vec![0.0, 0.0, 0.0]);
        assert_eq!(trace.bits, vec![1, 1, 1]);
        assert_eq!(trace.logit, 2.0);

        let p = a.predict_text("falso");
        assert_eq!(p.verdict, Verdict::Real);
        assert_eq!(p.confidence, "88.08%");
    }

    #[test]
    fn test_insufficient_text() {
        let a = demo();
        for text in ["", "   ", "123 456", "¡¿?!", "de la que el", "ab cd", "https://x.com/a www.y.es"] {
            let p = a.predict_text(text);
            assert_eq!(p.verdict, Verdict::InsufficientText, "input {:?}", text);
            assert_eq!(p.confidence, "0.00%");
            assert_eq!(p.analyzed_text, "");
            assert!(a.trace(text).is_none());
        }
        assert_eq!(a.predict("", "").verdict, Verdict::InsufficientText);
    }

    #[test]
    fn test_bit_vector_length_matches_model() {
        let a = demo();
        for text in ["gobierno", "palabras fuera del vocabulario", "ley ley ley falso anuncia"] {
            let trace = a.trace(text).unwrap();
            assert_eq!(trace.bits.len(), a.feature_count());
            assert_eq!(trace.reduced.len(), 3);
        }
    }

    #[test]
    fn test_fake_verdict_reports_raw_score() {
        // fires only when "ley" appears at least twice
        let a = analyzer(vec![0.0, -3.0, 0.0], vec![5.0, 2.0, 5.0]);
        let p = a.predict_text("ley ley gobierno");
        assert_eq!(p.verdict, Verdict::Fake);
        assert_eq!(p.confidence, "4.74%");

        let p = a.predict_text("ley gobierno");
        assert_eq!(p.verdict, Verdict::Real);
        assert_eq!(p.confidence, "50.00%");
    }

    #[test]
    fn test_threshold_boundary_is_inclusive() {
        let a = analyzer(vec![0.0, 4.0, 0.0], vec![9.0, 2.0, 9.0]);
        assert_eq!(a.trace("ley ley").unwrap().bits, vec![0, 1, 0]);
        assert_eq!(a.trace("ley").unwrap().bits, vec![0, 0, 0]);
    }

    #[test]
    fn test_deterministic_and_order_invariant() {
        let a = analyzer(vec![0.7, -1.3, 0.4], vec![1.0, 2.0, 1.0]);
        let forward = "El gobierno anuncia una ley. La ley es real. Nada es falso.";
        let shuffled = "Nada es falso. La ley es real. El gobierno anuncia una ley.";
        let first = a.predict_text(forward);
        assert_eq!(first, a.predict_text(forward));
        assert_eq!(a.trace(forward).unwrap().score, a.trace(shuffled).unwrap().score);
        assert_eq!(first.verdict, a.predict_text(shuffled).verdict);
    }
}
