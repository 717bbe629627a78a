//! Projection of the full count vector onto the feature subset found by the
//! offline search.
//!
//! Both search variants first apply a boolean mask over the vocabulary
//! columns. The particle-swarm artifacts then use the first `k` mask
//! survivors; the neighbourhood-search artifacts pick an explicit, ordered
//! list of survivor positions.

use serde::{Deserialize, Serialize};

use crate::vectorize::CountVector;

pub trait FeatureSelector {
    /// Number of features produced by [`FeatureSelector::select`].
    fn len(&self) -> usize;

    fn select(&self, vector: &CountVector) -> Vec<f64>;
}

/// First-stage reduction: vocabulary columns that survive the mask, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    survivors: Vec<usize>,
}

impl Mask {
    pub fn identity(dim: usize) -> Self {
        Self {
            survivors: (0..dim).collect(),
        }
    }

    pub fn from_bools(mask: &[bool]) -> Self {
        let survivors = mask
            .iter()
            .enumerate()
            .filter_map(|(column, &keep)| keep.then_some(column))
            .collect();
        Self { survivors }
    }

    /// Size of the working vector after masking.
    pub fn width(&self) -> usize {
        self.survivors.len()
    }

    pub fn column(&self, position: usize) -> usize {
        self.survivors[position]
    }
}

/// Contiguous `[0, k)` over the masked working vector.
#[derive(Debug, Clone)]
pub struct RangeSelection {
    mask: Mask,
    k: usize,
}

/// Arbitrary ordered positions into the masked working vector.
#[derive(Debug, Clone)]
pub struct IndexSelection {
    mask: Mask,
    indices: Vec<usize>,
}

impl RangeSelection {
    pub fn new(mask: Mask, k: usize) -> Self {
        Self { mask, k }
    }
}

impl IndexSelection {
    pub fn new(mask: Mask, indices: Vec<usize>) -> Self {
        Self { mask, indices }
    }
}

impl FeatureSelector for RangeSelection {
    fn len(&self) -> usize {
        self.k
    }

    fn select(&self, vector: &CountVector) -> Vec<f64> {
        (0..self.k)
            .map(|position| vector.get(self.mask.column(position)))
            .collect()
    }
}

impl FeatureSelector for IndexSelection {
    fn len(&self) -> usize {
        self.indices.len()
    }

    fn select(&self, vector: &CountVector) -> Vec<f64> {
        self.indices
            .iter()
            .map(|&position| vector.get(self.mask.column(position)))
            .collect()
    }
}

/// The active selection realisation, as loaded from the artifact store.
#[derive(Debug, Clone)]
pub enum Selection {
    Range(RangeSelection),
    Indices(IndexSelection),
}

impl Selection {
    pub fn kind(&self) -> SelectionKind {
        match self {
            Selection::Range(_) => SelectionKind::Range,
            Selection::Indices(_) => SelectionKind::Indices,
        }
    }
}

impl FeatureSelector for Selection {
    fn len(&self) -> usize {
        match self {
            Selection::Range(s) => s.len(),
            Selection::Indices(s) => s.len(),
        }
    }

    fn select(&self, vector: &CountVector) -> Vec<f64> {
        match self {
            Selection::Range(s) => s.select(vector),
            Selection::Indices(s) => s.select(vector),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionKind {
    Range,
    Indices,
}

/// On-disk form of `selection.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SelectionFile {
    Range {
        #[serde(default)]
        mask: Option<Vec<bool>>,
        #[serde(default)]
        k: Option<usize>,
    },
    Indices {
        #[serde(default)]
        mask: Option<Vec<bool>>,
        indices: Vec<usize>,
    },
}
