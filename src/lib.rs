//! Part-of-speech projection from annotated source languages onto an
//! unannotated target corpus through word alignments.
//!
//! Each source language contributes the UPOS of the source tokens aligned to
//! a target token, weighted by how reliable that language is. Weighted
//! candidates are summed per tag and voted on; ties and tokens without any
//! aligned source are settled from word and lemma frequency statistics
//! gathered over the rest of the corpus.

pub mod alignment;
pub mod checkpoint;
pub mod config;
pub mod conllu;
pub mod disambiguate;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod projection;
pub mod sampler;
pub mod scoring;
pub mod sources;
pub mod stats;
pub mod types;
pub mod voting;
pub mod weights;

pub use config::{CheckpointMode, ProjectionConfig};
pub use disambiguate::{GapFill, TieBreak};
pub use error::{Error, Result};
pub use pipeline::{run, RunOutcome};
pub use sampler::{SeededSampler, TieBreaker};
pub use scoring::MissPolicy;
pub use types::{Candidate, Decision};
