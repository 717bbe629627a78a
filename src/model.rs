use serde::Serialize;

/// Per-feature cutoffs; a feature fires when its value reaches the cutoff.
#[derive(Debug, Clone)]
pub struct Binarizer {
    thresholds: Vec<f64>,
}

impl Binarizer {
    pub fn new(thresholds: Vec<f64>) -> Self {
        Self { thresholds }
    }

    pub fn len(&self) -> usize {
        self.thresholds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.thresholds.is_empty()
    }

    pub fn binarize(&self, reduced: &[f64]) -> Vec<u8> {
        reduced
            .iter()
            .zip(&self.thresholds)
            .map(|(value, threshold)| u8::from(value >= threshold))
            .collect()
    }
}

/// Linear combination of binary indicators passed through the logistic.
#[derive(Debug, Clone)]
pub struct LinearScorer {
    weights: Vec<f64>,
}

/// What the scorer saw and produced for one document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreTrace {
    pub logit: f64,
    pub score: f64,
}

impl LinearScorer {
    pub fn new(weights: Vec<f64>) -> Self {
        Self { weights }
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn logit(&self, bits: &[u8]) -> f64 {
        self.weights
            .iter()
            .zip(bits)
            .filter(|(_, bit)| **bit == 1)
            .map(|(weight, _)| weight)
            .sum()
    }

    pub fn score(&self, bits: &[u8]) -> ScoreTrace {
        let logit = self.logit(bits);
        ScoreTrace {
            logit,
            score: sigmoid(logit),
        }
    }

    /// Weights sorted by magnitude, strongest first.
    pub fn feature_importance(&self) -> Vec<(usize, f64)> {
        let mut importance: Vec<(usize, f64)> = self
            .weights
            .iter()
            .enumerate()
            .map(|(i, w)| (i, w.abs()))
            .collect();
        importance.sort_by(|a, b| b.1.total_cmp(&a.1));
        importance
    }
}

/// Logistic function, split on sign so `exp` never sees a large positive argument.
pub fn sigmoid(x: f64) -> f64 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}
