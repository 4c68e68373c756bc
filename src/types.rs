use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Placeholder written in CoNLL-U columns that carry no value
pub const EMPTY_FIELD: &str = "_";

/// Weights closer than this are treated as equal when voting
pub const WEIGHT_EPSILON: f64 = 1e-9;

/// Target sentence -> target token -> value
pub type TokenTable<T> = BTreeMap<String, BTreeMap<String, T>>;

/// What a single aligned source token projected to
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Projected {
    /// UPOS of the matching row in the source block
    Tag(String),
    /// No row in the source block had this form
    Unmatched(String),
}

/// A POS tag weighted by the reliability of the source that proposed it
#[derive(Clone, Debug, PartialEq)]
pub struct Candidate {
    pub weight: f64,
    pub tag: String,
}

impl Candidate {
    pub fn new(weight: f64, tag: impl Into<String>) -> Self {
        Candidate {
            weight,
            tag: tag.into(),
        }
    }
}

/// Labeling state of one target token
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Decision {
    /// No candidate tag at all
    Unresolved,
    Resolved(String),
    /// Co-maximal tags, kept sorted
    Ambiguous(Vec<String>),
}

impl Decision {
    /// Build a decision from a set of equally good tags
    pub fn from_tags(mut tags: Vec<String>) -> Self {
        tags.sort();
        tags.dedup();
        match tags.len() {
            0 => Decision::Unresolved,
            1 => Decision::Resolved(tags.remove(0)),
            _ => Decision::Ambiguous(tags),
        }
    }

    pub fn resolved(&self) -> Option<&str> {
        match self {
            Decision::Resolved(tag) => Some(tag),
            _ => None,
        }
    }

    pub fn is_unresolved(&self) -> bool {
        matches!(self, Decision::Unresolved)
    }

    pub fn is_ambiguous(&self) -> bool {
        matches!(self, Decision::Ambiguous(_))
    }
}
