//! Exploration configuration.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{ExplorerError, Result};
use crate::model::AnalysisModel;
use crate::resolution::Resolution;

/// Default ladder, 150 kbps to 9 Mbps, in bps.
pub const DEFAULT_BITRATES: [u64; 22] = [
    150_000, 200_000, 300_000, 400_000, 500_000, 600_000, 700_000, 800_000, 920_000, 1_000_000,
    1_200_000, 1_500_000, 2_000_000, 2_500_000, 3_000_000, 3_500_000, 4_000_000, 5_000_000,
    6_000_000, 7_000_000, 8_000_000, 9_000_000,
];

/// Default bitrate and resolution tables.
///
/// Injected into the pair generator so that range defaulting never depends
/// on process-wide state. Per-resolution ranges with a missing bound fall
/// back to these bitrates, whatever bitrate set the caller explores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LadderDefaults {
    pub bitrates: Vec<u64>,
    pub resolutions: Vec<Resolution>,
}

impl Default for LadderDefaults {
    fn default() -> Self {
        Self {
            bitrates: DEFAULT_BITRATES.to_vec(),
            resolutions: Resolution::standard_ladder(),
        }
    }
}

impl LadderDefaults {
    pub fn min_bitrate(&self) -> u64 {
        self.bitrates.iter().copied().min().unwrap_or(0)
    }

    pub fn max_bitrate(&self) -> u64 {
        self.bitrates.iter().copied().max().unwrap_or(u64::MAX)
    }
}

/// Predicate deciding whether a bitrate is worth trying at a resolution.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BitrateFilter {
    /// Accept `b` iff `min * pixels <= b <= max * pixels`.
    PixelRatio { min: f64, max: f64 },
    #[serde(skip)]
    Custom(Arc<dyn Fn(u64, &Resolution) -> bool + Send + Sync>),
}

impl BitrateFilter {
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(u64, &Resolution) -> bool + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(f))
    }

    pub fn accepts(&self, bitrate: u64, resolution: &Resolution) -> bool {
        match self {
            Self::PixelRatio { min, max } => {
                let pixels = resolution.pixels() as f64;
                let bitrate = bitrate as f64;
                min * pixels <= bitrate && bitrate <= max * pixels
            }
            Self::Custom(f) => f(bitrate, resolution),
        }
    }
}

impl Default for BitrateFilter {
    fn default() -> Self {
        Self::PixelRatio { min: 0.3, max: 8.0 }
    }
}

impl fmt::Debug for BitrateFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PixelRatio { min, max } => f
                .debug_struct("PixelRatio")
                .field("min", min)
                .field("max", max)
                .finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// How candidates are scheduled for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Concurrency {
    /// Every candidate, and every model of a candidate, in flight at once.
    #[default]
    Concurrent,
    /// One candidate, and one model, at a time.
    Sequential,
}

/// Named list of values for one extra transcode option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableGrid {
    pub name: String,
    pub values: Vec<String>,
}

/// Replace the grid named like `grid` in place, or append it.
pub(crate) fn upsert_grid(grids: &mut Vec<VariableGrid>, grid: VariableGrid) {
    match grids.iter_mut().find(|g| g.name == grid.name) {
        Some(slot) => *slot = grid,
        None => grids.push(grid),
    }
}

impl VariableGrid {
    pub fn new<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }
}

/// Every recognized option of an exploration run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplorerConfig {
    pub models: Vec<AnalysisModel>,
    pub bitrates: Vec<u64>,
    pub resolutions: Vec<Resolution>,
    pub filter: BitrateFilter,
    pub concurrency: Concurrency,
    /// Extra option grids, expanded in the listed order.
    pub variables: Vec<VariableGrid>,
    /// Never transcode; score whatever already sits at each output path.
    pub skip_transcode: bool,
    /// Reuse outputs that already exist instead of transcoding again.
    pub skip_existing: bool,
    pub output_dir: PathBuf,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        let defaults = LadderDefaults::default();
        Self {
            models: vec![AnalysisModel::Hd],
            bitrates: defaults.bitrates,
            resolutions: defaults.resolutions,
            filter: BitrateFilter::default(),
            concurrency: Concurrency::Concurrent,
            variables: Vec::new(),
            skip_transcode: false,
            skip_existing: false,
            output_dir: PathBuf::from("./output"),
        }
    }
}

impl ExplorerConfig {
    pub fn builder() -> ExplorerConfigBuilder {
        ExplorerConfigBuilder::default()
    }

    /// Load a JSON configuration; omitted fields keep their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&data)
    }

    pub fn from_json_str(data: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(data)?;
        config.validate()?;
        Ok(config)
    }

    /// Set the values of one variable grid, keeping the position of a grid
    /// that already has this name.
    pub fn set_variable(&mut self, grid: VariableGrid) {
        upsert_grid(&mut self.variables, grid);
    }

    pub fn validate(&self) -> Result<()> {
        let fail = |message: String| -> Result<()> { Err(ExplorerError::Config { message }) };

        if self.models.is_empty() {
            return fail("at least one analysis model is required".into());
        }
        if let Some(r) = self
            .resolutions
            .iter()
            .find(|r| r.width == 0 || r.height == 0)
        {
            return fail(format!("resolution {r} has a zero dimension"));
        }
        if self.bitrates.contains(&0) {
            return fail("bitrates must be positive".into());
        }
        if let BitrateFilter::PixelRatio { min, max } = self.filter {
            if min > max {
                return fail(format!("pixel ratio filter min {min} exceeds max {max}"));
            }
        }
        for (i, grid) in self.variables.iter().enumerate() {
            if grid.name.is_empty() {
                return fail(format!("variable grid with values {:?} has no name", grid.values));
            }
            if self.variables[..i].iter().any(|g| g.name == grid.name) {
                return fail(format!("variable `{}` is defined more than once", grid.name));
            }
            if let Some(value) = grid
                .values
                .iter()
                .enumerate()
                .find_map(|(j, v)| grid.values[..j].contains(v).then_some(v))
            {
                return fail(format!("variable `{}` lists `{value}` twice", grid.name));
            }
        }
        Ok(())
    }
}

/// Builder for [`ExplorerConfig`].
#[derive(Default)]
pub struct ExplorerConfigBuilder {
    models: Option<Vec<AnalysisModel>>,
    bitrates: Option<Vec<u64>>,
    resolutions: Option<Vec<Resolution>>,
    filter: Option<BitrateFilter>,
    concurrency: Option<Concurrency>,
    variables: Vec<VariableGrid>,
    skip_transcode: Option<bool>,
    skip_existing: Option<bool>,
    output_dir: Option<PathBuf>,
}

impl ExplorerConfigBuilder {
    pub fn models(mut self, models: Vec<AnalysisModel>) -> Self {
        self.models = Some(models);
        self
    }

    pub fn bitrates(mut self, bitrates: Vec<u64>) -> Self {
        self.bitrates = Some(bitrates);
        self
    }

    pub fn resolutions(mut self, resolutions: Vec<Resolution>) -> Self {
        self.resolutions = Some(resolutions);
        self
    }

    pub fn filter(mut self, filter: BitrateFilter) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn concurrency(mut self, concurrency: Concurrency) -> Self {
        self.concurrency = Some(concurrency);
        self
    }

    /// Add a variable grid. Grids expand in the order they are first added;
    /// a grid with an already used name replaces the earlier values.
    pub fn variable(mut self, grid: VariableGrid) -> Self {
        upsert_grid(&mut self.variables, grid);
        self
    }

    pub fn skip_transcode(mut self, skip: bool) -> Self {
        self.skip_transcode = Some(skip);
        self
    }

    pub fn skip_existing(mut self, skip: bool) -> Self {
        self.skip_existing = Some(skip);
        self
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    pub fn build(self) -> ExplorerConfig {
        let base = ExplorerConfig::default();
        ExplorerConfig {
            models: self.models.unwrap_or(base.models),
            bitrates: self.bitrates.unwrap_or(base.bitrates),
            resolutions: self.resolutions.unwrap_or(base.resolutions),
            filter: self.filter.unwrap_or(base.filter),
            concurrency: self.concurrency.unwrap_or(base.concurrency),
            variables: self.variables,
            skip_transcode: self.skip_transcode.unwrap_or(base.skip_transcode),
            skip_existing: self.skip_existing.unwrap_or(base.skip_existing),
            output_dir: self.output_dir.unwrap_or(base.output_dir),
        }
    }
}
