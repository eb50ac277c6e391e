//! Adaptive bitrate (ABR) ladder exploration.
//!
//! This crate enumerates candidate renditions for a reference video, pushes
//! each one through an external transcode and quality-scoring pipeline, and
//! collects the produced quality artifacts per analysis model so a ladder
//! can be chosen from them afterwards.
//!
//! # Overview
//!
//! - [`PairGenerator`] builds the (resolution, bitrate) pairs allowed by a
//!   [`BitrateFilter`] and by per-resolution [`BitrateRange`]s.
//! - [`variants::expand`] multiplies the pairs by named option grids.
//! - [`naming`] derives the deterministic output path of each candidate,
//!   which is what makes skip-existing reuse possible.
//! - [`AnalysisOrchestrator`] runs the candidates, either all at once or one
//!   at a time, through the [`Transcoder`] and [`QualityAnalyzer`] seams.
//! - [`ResultAggregator`] groups artifacts by [`AnalysisModel`].
//!
//! # Example
//!
//! ```
//! use abr_explorer::{
//!     variants, BitrateFilter, LadderDefaults, PairGenerator, Resolution, VariableGrid,
//! };
//!
//! let generator = PairGenerator::new(LadderDefaults::default());
//! let pairs = generator.generate(
//!     &[Resolution::new(1280, 720)],
//!     &[500_000, 920_000, 3_000_000],
//!     &BitrateFilter::default(),
//! );
//! let candidates = variants::expand(pairs, &[VariableGrid::new("preset", ["fast", "slow"])]);
//! assert_eq!(candidates.len(), 6);
//! ```

mod aggregator;
mod candidate;
pub mod collaborator;
pub mod command;
mod config;
mod error;
mod explorer;
mod model;
pub mod naming;
mod orchestrator;
mod pairs;
mod report;
mod resolution;
pub mod variants;

pub use aggregator::{AggregatedResult, QualityResult, ResultAggregator};
pub use candidate::{Candidate, Variables};
pub use collaborator::{ArtifactStore, FsArtifactStore, QualityAnalyzer, Transcoder};
pub use command::{CommandQualityAnalyzer, CommandTemplate, CommandTranscoder};
pub use config::{
    BitrateFilter, Concurrency, ExplorerConfig, ExplorerConfigBuilder, LadderDefaults,
    VariableGrid, DEFAULT_BITRATES,
};
pub use error::{ExplorerError, Result};
pub use explorer::Explorer;
pub use model::AnalysisModel;
pub use orchestrator::{AnalysisOrchestrator, RunSettings};
pub use pairs::PairGenerator;
pub use report::{CandidateFailure, FailureStage, RunReport};
pub use resolution::{BitrateRange, Resolution};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
