//! Collaborators that shell out to external tools (ffmpeg by default).
//!
//! Arguments are templates. Placeholders are substituted per invocation:
//!
//! - transcoder: `{input}`, `{output}`, `{width}`, `{height}`, `{bitrate}`,
//!   `{var:<name>}`, and a standalone `{vars}` argument that expands to
//!   `-<name> <value>` for every variable of the candidate;
//! - analyzer: `{reference}`, `{variant}`, `{quality}`, `{model}` (the
//!   libvmaf model version).

use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};

use serde::{Deserialize, Serialize};
use tokio::process::Command;
use tracing::debug;

use crate::candidate::Variables;
use crate::collaborator::{QualityAnalyzer, Transcoder};
use crate::error::{ExplorerError, Result};
use crate::model::AnalysisModel;
use crate::resolution::Resolution;

const VARS_TOKEN: &str = "{vars}";
const STDERR_TAIL: usize = 400;

/// External program plus its argument template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandTemplate {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandTemplate {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    fn render(&self, values: &[(&str, String)], variables: Option<&Variables>) -> Vec<String> {
        let mut rendered = Vec::with_capacity(self.args.len());
        for arg in &self.args {
            if arg == VARS_TOKEN {
                if let Some(vars) = variables {
                    for (name, value) in vars.iter() {
                        rendered.push(format!("-{name}"));
                        rendered.push(value.to_string());
                    }
                }
                continue;
            }

            let mut out = arg.clone();
            for (key, value) in values {
                out = out.replace(&format!("{{{key}}}"), value);
            }
            if let Some(vars) = variables {
                for (name, value) in vars.iter() {
                    out = out.replace(&format!("{{var:{name}}}"), value);
                }
            }
            rendered.push(out);
        }
        rendered
    }

    async fn execute(&self, args: Vec<String>) -> Result<Output> {
        debug!(program = %self.program, args = ?args, "Spawning");
        let output = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await?;

        if output.status.success() {
            Ok(output)
        } else {
            Err(ExplorerError::Command {
                program: self.program.clone(),
                status: format!("{} ({})", output.status, stderr_tail(&output)),
            })
        }
    }
}

fn stderr_tail(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stderr = stderr.trim();
    let start = stderr
        .char_indices()
        .rev()
        .nth(STDERR_TAIL)
        .map(|(i, _)| i)
        .unwrap_or(0);
    stderr[start..].to_string()
}

async fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    Ok(())
}

/// [`Transcoder`] running an external encoder.
#[derive(Debug, Clone)]
pub struct CommandTranscoder {
    template: CommandTemplate,
}

impl CommandTranscoder {
    pub fn new(template: CommandTemplate) -> Self {
        Self { template }
    }
}

impl Default for CommandTranscoder {
    fn default() -> Self {
        Self::new(CommandTemplate::new(
            "ffmpeg",
            [
                "-hide_banner",
                "-y",
                "-i",
                "{input}",
                "-vf",
                "scale={width}:{height}",
                "-c:v",
                "libx264",
                "-b:v",
                "{bitrate}",
                VARS_TOKEN,
                "-an",
                "{output}",
            ],
        ))
    }
}

#[async_trait::async_trait]
impl Transcoder for CommandTranscoder {
    async fn transcode(
        &self,
        reference: &Path,
        resolution: &Resolution,
        bitrate: u64,
        output: &Path,
        variables: &Variables,
    ) -> Result<PathBuf> {
        ensure_parent(output).await?;
        let args = self.template.render(
            &[
                ("input", reference.display().to_string()),
                ("output", output.display().to_string()),
                ("width", resolution.width.to_string()),
                ("height", resolution.height.to_string()),
                ("bitrate", bitrate.to_string()),
            ],
            Some(variables),
        );

        self.template
            .execute(args)
            .await
            .map_err(|e| ExplorerError::Transcode {
                output: output.to_path_buf(),
                message: e.to_string(),
            })?;
        Ok(output.to_path_buf())
    }
}

/// [`QualityAnalyzer`] running an external scorer.
#[derive(Debug, Clone)]
pub struct CommandQualityAnalyzer {
    template: CommandTemplate,
}

impl CommandQualityAnalyzer {
    pub fn new(template: CommandTemplate) -> Self {
        Self { template }
    }
}

impl Default for CommandQualityAnalyzer {
    fn default() -> Self {
        Self::new(CommandTemplate::new(
            "ffmpeg",
            [
                "-hide_banner",
                "-i",
                "{variant}",
                "-i",
                "{reference}",
                "-lavfi",
                "[0:v][1:v]scale2ref=flags=bicubic[dist][ref];[dist][ref]libvmaf=model=version={model}:log_fmt=json:log_path={quality}",
                "-f",
                "null",
                "-",
            ],
        ))
    }
}

#[async_trait::async_trait]
impl QualityAnalyzer for CommandQualityAnalyzer {
    async fn analyze_quality(
        &self,
        reference: &Path,
        variant: &Path,
        quality_file: &Path,
        model: AnalysisModel,
    ) -> Result<PathBuf> {
        ensure_parent(quality_file).await?;
        let args = self.template.render(
            &[
                ("reference", reference.display().to_string()),
                ("variant", variant.display().to_string()),
                ("quality", quality_file.display().to_string()),
                ("model", model.libvmaf_version().to_string()),
            ],
            None,
        );

        self.template
            .execute(args)
            .await
            .map_err(|e| ExplorerError::Analysis {
                quality_file: quality_file.to_path_buf(),
                message: e.to_string(),
            })?;
        Ok(quality_file.to_path_buf())
    }
}
