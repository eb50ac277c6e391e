//! Per-model aggregation of quality artifacts.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Serialize;

use crate::model::AnalysisModel;

/// One model's scoring of one candidate's variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QualityResult {
    pub model: AnalysisModel,
    pub quality_file: PathBuf,
}

/// Quality artifacts per model, in the order they were recorded.
pub type AggregatedResult = BTreeMap<AnalysisModel, Vec<PathBuf>>;

#[derive(Debug, Default)]
pub struct ResultAggregator {
    results: AggregatedResult,
}

impl ResultAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append every result's artifact under its model.
    pub fn record<I>(&mut self, results: I)
    where
        I: IntoIterator<Item = QualityResult>,
    {
        for result in results {
            self.results
                .entry(result.model)
                .or_default()
                .push(result.quality_file);
        }
    }

    pub fn into_results(self) -> AggregatedResult {
        self.results
    }
}
