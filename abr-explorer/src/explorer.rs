//! Entry point tying generation, expansion and orchestration together.

use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::candidate::Candidate;
use crate::collaborator::{ArtifactStore, QualityAnalyzer, Transcoder};
use crate::config::{ExplorerConfig, LadderDefaults};
use crate::error::Result;
use crate::orchestrator::{AnalysisOrchestrator, RunSettings};
use crate::pairs::PairGenerator;
use crate::report::RunReport;
use crate::variants;

pub struct Explorer {
    config: ExplorerConfig,
    generator: PairGenerator,
    orchestrator: AnalysisOrchestrator,
}

impl Explorer {
    /// Validate `config` once and wire the collaborators.
    pub fn new(
        config: ExplorerConfig,
        defaults: LadderDefaults,
        transcoder: Arc<dyn Transcoder>,
        analyzer: Arc<dyn QualityAnalyzer>,
        store: Arc<dyn ArtifactStore>,
    ) -> Result<Self> {
        config.validate()?;
        let orchestrator =
            AnalysisOrchestrator::new(RunSettings::from(&config), transcoder, analyzer, store);
        Ok(Self {
            generator: PairGenerator::new(defaults),
            orchestrator,
            config,
        })
    }

    pub fn config(&self) -> &ExplorerConfig {
        &self.config
    }

    /// Candidates a run would process, in submission order.
    pub fn plan(&self) -> Vec<Candidate> {
        let pairs = self.generator.generate(
            &self.config.resolutions,
            &self.config.bitrates,
            &self.config.filter,
        );
        let pair_count = pairs.len();
        let candidates = variants::expand(pairs, &self.config.variables);
        debug!(
            pairs = pair_count,
            candidates = candidates.len(),
            grids = self.config.variables.len(),
            "Planned candidates"
        );
        candidates
    }

    /// Plan, then transcode and score every candidate against `reference`.
    pub async fn run(&self, reference: &Path) -> Result<RunReport> {
        let candidates = self.plan();
        self.orchestrator.run(reference, candidates).await
    }
}
