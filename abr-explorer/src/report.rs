//! Outcome of one exploration run.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use crate::aggregator::AggregatedResult;

/// Where a candidate's pipeline stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureStage {
    Transcode,
    Analysis,
    /// The candidate's task panicked.
    Panicked,
}

impl fmt::Display for FailureStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transcode => write!(f, "transcode"),
            Self::Analysis => write!(f, "analysis"),
            Self::Panicked => write!(f, "panicked"),
        }
    }
}

/// A candidate that contributed no quality results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidateFailure {
    /// Output identifier of the candidate.
    pub output: PathBuf,
    pub stage: FailureStage,
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    pub results: AggregatedResult,
    /// Candidates handed to the orchestrator.
    pub candidates: usize,
    /// Candidates whose variant came from a fresh transcode.
    pub transcoded: usize,
    /// Candidates whose existing output was reused.
    pub reused: usize,
    pub failures: Vec<CandidateFailure>,
}

impl RunReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn succeeded(&self) -> usize {
        self.candidates - self.failures.len()
    }
}
