//! Per-candidate transcode and scoring, fanned out over a whole run.

use std::panic::AssertUnwindSafe;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures::FutureExt;
use parking_lot::Mutex;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::aggregator::{QualityResult, ResultAggregator};
use crate::candidate::Candidate;
use crate::collaborator::{ArtifactStore, QualityAnalyzer, Transcoder};
use crate::config::{Concurrency, ExplorerConfig};
use crate::error::{ExplorerError, Result};
use crate::model::AnalysisModel;
use crate::naming;
use crate::report::{CandidateFailure, FailureStage, RunReport};

/// The part of [`ExplorerConfig`] the orchestrator acts on.
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub models: Vec<AnalysisModel>,
    pub concurrency: Concurrency,
    pub skip_transcode: bool,
    pub skip_existing: bool,
    pub output_dir: PathBuf,
}

impl From<&ExplorerConfig> for RunSettings {
    fn from(config: &ExplorerConfig) -> Self {
        Self {
            models: config.models.clone(),
            concurrency: config.concurrency,
            skip_transcode: config.skip_transcode,
            skip_existing: config.skip_existing,
            output_dir: config.output_dir.clone(),
        }
    }
}

/// What happened to a single candidate.
#[derive(Debug)]
enum CandidateOutcome {
    Scored {
        reused: bool,
        results: Vec<QualityResult>,
    },
    Failed {
        transcoded: bool,
        failure: CandidateFailure,
    },
}

struct Shared {
    transcoder: Arc<dyn Transcoder>,
    analyzer: Arc<dyn QualityAnalyzer>,
    store: Arc<dyn ArtifactStore>,
    settings: RunSettings,
}

/// Drives transcode and quality scoring for every candidate of a run.
pub struct AnalysisOrchestrator {
    shared: Arc<Shared>,
}

impl AnalysisOrchestrator {
    pub fn new(
        settings: RunSettings,
        transcoder: Arc<dyn Transcoder>,
        analyzer: Arc<dyn QualityAnalyzer>,
        store: Arc<dyn ArtifactStore>,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                transcoder,
                analyzer,
                store,
                settings,
            }),
        }
    }

    /// Process every candidate and aggregate the quality artifacts per model.
    ///
    /// Fails with [`ExplorerError::NoPairs`] before touching any
    /// collaborator when `candidates` is empty. Individual candidate failures
    /// are logged and listed in the report; they never abort the run.
    pub async fn run(&self, reference: &Path, candidates: Vec<Candidate>) -> Result<RunReport> {
        if candidates.is_empty() {
            error!(reference = %reference.display(), "No pairs to analyze");
            return Err(ExplorerError::NoPairs);
        }

        let settings = &self.shared.settings;
        info!(
            reference = %reference.display(),
            candidates = candidates.len(),
            models = settings.models.len(),
            concurrency = ?settings.concurrency,
            "Starting ladder exploration"
        );

        let mut report = RunReport {
            candidates: candidates.len(),
            ..RunReport::default()
        };

        let aggregator = match settings.concurrency {
            Concurrency::Sequential => {
                self.run_sequential(reference, candidates, &mut report).await
            }
            Concurrency::Concurrent => {
                self.run_concurrent(reference, candidates, &mut report).await?
            }
        };

        report.results = aggregator.into_results();
        info!(
            succeeded = report.succeeded(),
            failed = report.failures.len(),
            transcoded = report.transcoded,
            reused = report.reused,
            "Ladder exploration finished"
        );
        Ok(report)
    }

    async fn run_sequential(
        &self,
        reference: &Path,
        candidates: Vec<Candidate>,
        report: &mut RunReport,
    ) -> ResultAggregator {
        let mut aggregator = ResultAggregator::new();
        for candidate in candidates {
            let transcoded = AtomicBool::new(false);
            let outcome = process_candidate(&self.shared, reference, &candidate, &transcoded).await;
            if let Some(results) = tally(outcome, report) {
                aggregator.record(results);
            }
        }
        aggregator
    }

    async fn run_concurrent(
        &self,
        reference: &Path,
        candidates: Vec<Candidate>,
        report: &mut RunReport,
    ) -> Result<ResultAggregator> {
        let aggregator = Arc::new(Mutex::new(ResultAggregator::new()));
        let reference: Arc<Path> = Arc::from(reference);
        let mut tasks = JoinSet::new();

        for candidate in candidates {
            let shared = Arc::clone(&self.shared);
            let aggregator = Arc::clone(&aggregator);
            let reference = Arc::clone(&reference);

            tasks.spawn(async move {
                // Set once the transcode succeeds; still readable after a panic.
                let transcoded = AtomicBool::new(false);
                let pipeline = process_candidate(&shared, &reference, &candidate, &transcoded);
                let outcome = match AssertUnwindSafe(pipeline).catch_unwind().await {
                    Ok(outcome) => outcome,
                    Err(panic) => {
                        let failure = CandidateFailure {
                            output: naming::output_path(&shared.settings.output_dir, &candidate),
                            stage: FailureStage::Panicked,
                            message: panic_message(panic.as_ref()),
                        };
                        error!(
                            reference = %reference.display(),
                            candidate = %failure.output.display(),
                            message = %failure.message,
                            "Candidate task panicked"
                        );
                        CandidateOutcome::Failed {
                            transcoded: transcoded.load(Ordering::Acquire),
                            failure,
                        }
                    }
                };

                // Only the aggregation step is serialized.
                match outcome {
                    CandidateOutcome::Scored { reused, results } => {
                        aggregator.lock().record(results);
                        CandidateOutcome::Scored {
                            reused,
                            results: Vec::new(),
                        }
                    }
                    failed => failed,
                }
            });
        }

        while let Some(joined) = tasks.join_next().await {
            tally(joined?, report);
        }

        let aggregator = std::mem::take(&mut *aggregator.lock());
        Ok(aggregator)
    }
}

/// Fold a candidate's outcome into the report counters, returning the
/// results still to be aggregated.
fn tally(outcome: CandidateOutcome, report: &mut RunReport) -> Option<Vec<QualityResult>> {
    match outcome {
        CandidateOutcome::Scored { reused, results } => {
            if reused {
                report.reused += 1;
            } else {
                report.transcoded += 1;
            }
            Some(results)
        }
        CandidateOutcome::Failed {
            transcoded,
            failure,
        } => {
            if transcoded {
                report.transcoded += 1;
            }
            report.failures.push(failure);
            None
        }
    }
}

async fn process_candidate(
    shared: &Shared,
    reference: &Path,
    candidate: &Candidate,
    transcoded: &AtomicBool,
) -> CandidateOutcome {
    let settings = &shared.settings;
    let output = naming::output_path(&settings.output_dir, candidate);
    let reused = should_reuse(shared, &output).await;

    let variant = if reused {
        debug!(candidate = %output.display(), "Reusing existing output");
        output.clone()
    } else {
        debug!(candidate = %output.display(), "Transcoding");
        let result = shared
            .transcoder
            .transcode(
                reference,
                &candidate.resolution,
                candidate.bitrate,
                &output,
                &candidate.variables,
            )
            .await;

        match result {
            Ok(path) if !path.as_os_str().is_empty() => {
                transcoded.store(true, Ordering::Release);
                path
            }
            Ok(_) => {
                return transcode_failed(reference, output, "transcoder returned no output".into())
            }
            Err(e) => return transcode_failed(reference, output, e.to_string()),
        }
    };

    let scored = match settings.concurrency {
        Concurrency::Sequential => score_sequential(shared, reference, &variant, &output).await,
        Concurrency::Concurrent => score_concurrent(shared, reference, &variant, &output).await,
    };

    match scored {
        Ok(results) => {
            debug!(
                candidate = %output.display(),
                results = results.len(),
                "Candidate scored"
            );
            CandidateOutcome::Scored { reused, results }
        }
        Err(e) => {
            error!(
                reference = %reference.display(),
                candidate = %output.display(),
                error = %e,
                "Quality analysis failed"
            );
            CandidateOutcome::Failed {
                transcoded: !reused,
                failure: CandidateFailure {
                    output,
                    stage: FailureStage::Analysis,
                    message: e.to_string(),
                },
            }
        }
    }
}

async fn should_reuse(shared: &Shared, output: &Path) -> bool {
    let settings = &shared.settings;
    if settings.skip_transcode {
        return true;
    }
    if !settings.skip_existing {
        return false;
    }
    match shared.store.exists(output).await {
        Ok(exists) => exists,
        Err(e) => {
            warn!(
                candidate = %output.display(),
                error = %e,
                "Existence check failed, transcoding instead"
            );
            false
        }
    }
}

fn transcode_failed(reference: &Path, output: PathBuf, message: String) -> CandidateOutcome {
    error!(
        reference = %reference.display(),
        candidate = %output.display(),
        error = %message,
        "Transcode failed"
    );
    CandidateOutcome::Failed {
        transcoded: false,
        failure: CandidateFailure {
            output,
            stage: FailureStage::Transcode,
            message,
        },
    }
}

/// Models one after another; the first failure stops the candidate.
async fn score_sequential(
    shared: &Shared,
    reference: &Path,
    variant: &Path,
    output: &Path,
) -> Result<Vec<QualityResult>> {
    let mut results = Vec::with_capacity(shared.settings.models.len());
    for &model in &shared.settings.models {
        results.push(score(shared, reference, variant, output, model).await?);
    }
    Ok(results)
}

/// All models at once. Every scoring call runs to completion; the first
/// failure in model order then fails the candidate.
async fn score_concurrent(
    shared: &Shared,
    reference: &Path,
    variant: &Path,
    output: &Path,
) -> Result<Vec<QualityResult>> {
    let scoring = shared
        .settings
        .models
        .iter()
        .map(|&model| score(shared, reference, variant, output, model));
    futures::future::join_all(scoring).await.into_iter().collect()
}

async fn score(
    shared: &Shared,
    reference: &Path,
    variant: &Path,
    output: &Path,
    model: AnalysisModel,
) -> Result<QualityResult> {
    let quality_file = naming::quality_path(output, model);
    let quality_file = shared
        .analyzer
        .analyze_quality(reference, variant, &quality_file, model)
        .await?;
    Ok(QualityResult {
        model,
        quality_file,
    })
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "candidate task panicked".to_string()
    }
}
