//! Deterministic output and quality-artifact paths for candidates.

use std::path::{Path, PathBuf};

use crate::candidate::Candidate;
use crate::model::AnalysisModel;

/// Container extension of transcoded variants.
pub const VARIANT_EXTENSION: &str = "mp4";

/// Extension of quality artifacts.
pub const QUALITY_EXTENSION: &str = "json";

/// `{dir}/{w}x{h}_{bitrate}[_{name}_{value}...].mp4`
///
/// Variables render in the candidate's assignment order, so the name is
/// order-sensitive even though [`Candidate`] equality is not. Candidates
/// from one [`crate::variants::expand`] call all share grid order, which
/// keeps names unique among them.
pub fn output_path(directory: &Path, candidate: &Candidate) -> PathBuf {
    let mut stem = format!(
        "{}x{}_{}",
        candidate.resolution.width, candidate.resolution.height, candidate.bitrate
    );
    for (name, value) in candidate.variables.iter() {
        stem.push('_');
        stem.push_str(name);
        stem.push('_');
        stem.push_str(value);
    }
    directory.join(format!("{stem}.{VARIANT_EXTENSION}"))
}

/// Quality artifact for `model`, next to the variant under a directory
/// named after the model: `out/a.mp4` becomes `out/hd/a.json`.
pub fn quality_path(output: &Path, model: AnalysisModel) -> PathBuf {
    let parent = output.parent().unwrap_or_else(|| Path::new(""));
    let file_name = output.with_extension(QUALITY_EXTENSION);
    let file_name = file_name.file_name().unwrap_or_default();
    parent.join(model.name()).join(file_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolution::Resolution;

    #[test]
    fn test_plain_name() {
        let c = Candidate::new(Resolution::new(1280, 720), 920_000);
        assert_eq!(
            output_path(Path::new("out"), &c),
            PathBuf::from("out/1280x720_920000.mp4")
        );
    }

    #[test]
    fn test_variables_in_stored_order() {
        let c = Candidate::new(Resolution::new(640, 360), 400_000)
            .with_variable("preset", "slow")
            .with_variable("crf", "23");
        assert_eq!(
            output_path(Path::new("/data/ladder"), &c),
            PathBuf::from("/data/ladder/640x360_400000_preset_slow_crf_23.mp4")
        );
    }

    #[test]
    fn test_name_follows_assignment_order() {
        let res = Resolution::new(640, 360);
        let a = Candidate::new(res, 400_000)
            .with_variable("preset", "slow")
            .with_variable("crf", "23");
        let b = Candidate::new(res, 400_000)
            .with_variable("crf", "23")
            .with_variable("preset", "slow");
        assert_eq!(a, b);
        assert_eq!(
            output_path(Path::new("o"), &b),
            PathBuf::from("o/640x360_400000_crf_23_preset_slow.mp4")
        );
        assert_ne!(output_path(Path::new("o"), &a), output_path(Path::new("o"), &b));
    }

    #[test]
    fn test_same_candidate_same_name() {
        let a = Candidate::new(Resolution::new(640, 360), 400_000).with_variable("preset", "slow");
        let b = a.clone();
        assert_eq!(output_path(Path::new("o"), &a), output_path(Path::new("o"), &b));
    }

    #[test]
    fn test_quality_path_inserts_model_segment() {
        let output = PathBuf::from("out/1280x720_920000.mp4");
        assert_eq!(
            quality_path(&output, AnalysisModel::Hd),
            PathBuf::from("out/hd/1280x720_920000.json")
        );
        assert_eq!(
            quality_path(&output, AnalysisModel::Phone),
            PathBuf::from("out/phone/1280x720_920000.json")
        );
    }

    #[test]
    fn test_quality_path_without_directory() {
        assert_eq!(
            quality_path(Path::new("a.mp4"), AnalysisModel::Uhd4k),
            PathBuf::from("uhd4k/a.json")
        );
    }
}
