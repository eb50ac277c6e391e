//! Perceptual quality models a candidate can be scored with.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ExplorerError;

/// VMAF model used to score a transcoded variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnalysisModel {
    /// 1080p viewing on a living-room display.
    #[default]
    Hd,
    /// HD model without enhancement gain.
    HdNeg,
    /// 4K viewing distance.
    Uhd4k,
    /// Mobile viewing.
    Phone,
}

impl AnalysisModel {
    pub const ALL: [AnalysisModel; 4] = [Self::Hd, Self::HdNeg, Self::Uhd4k, Self::Phone];

    /// Name used as the directory segment of quality artifacts.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Hd => "hd",
            Self::HdNeg => "hd-neg",
            Self::Uhd4k => "uhd4k",
            Self::Phone => "phone",
        }
    }

    /// Model version understood by the libvmaf filter.
    pub fn libvmaf_version(&self) -> &'static str {
        match self {
            Self::Hd | Self::Phone => "vmaf_v0.6.1",
            Self::HdNeg => "vmaf_v0.6.1neg",
            Self::Uhd4k => "vmaf_4k_v0.6.1",
        }
    }
}

impl fmt::Display for AnalysisModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AnalysisModel {
    type Err = ExplorerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|m| m.name() == wanted)
            .ok_or_else(|| ExplorerError::Config {
                message: format!(
                    "unknown analysis model `{s}` (expected one of: hd, hd-neg, uhd4k, phone)"
                ),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_roundtrip() {
        for model in AnalysisModel::ALL {
            assert_eq!(model.name().parse::<AnalysisModel>().unwrap(), model);
        }
        assert_eq!("HD".parse::<AnalysisModel>().unwrap(), AnalysisModel::Hd);
        assert!("vmaf".parse::<AnalysisModel>().is_err());
    }

    #[test]
    fn test_serde_names_match_path_names() {
        let json = serde_json::to_string(&AnalysisModel::HdNeg).unwrap();
        assert_eq!(json, "\"hd-neg\"");
        let json = serde_json::to_string(&AnalysisModel::Uhd4k).unwrap();
        assert_eq!(json, "\"uhd4k\"");
    }
}
