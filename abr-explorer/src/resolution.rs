//! Output resolutions and their optional bitrate windows.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ExplorerError;

/// Bitrate window (bps) that narrows the legal bitrates of one resolution.
///
/// Missing bounds fall back to the bounds of the default bitrate ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BitrateRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<u64>,
}

impl BitrateRange {
    pub fn new(min: Option<u64>, max: Option<u64>) -> Self {
        Self { min, max }
    }

    /// Resolve missing bounds against the default ladder bounds.
    pub fn effective(&self, default_min: u64, default_max: u64) -> (u64, u64) {
        (
            self.min.unwrap_or(default_min),
            self.max.unwrap_or(default_max),
        )
    }

    /// Inclusive check. An inverted window contains nothing.
    pub fn contains(&self, bitrate: u64, default_min: u64, default_max: u64) -> bool {
        let (min, max) = self.effective(default_min, default_max);
        min <= bitrate && bitrate <= max
    }
}

/// Resolution of a candidate rendition.
///
/// Equality and hashing only consider `width` and `height`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<BitrateRange>,
}

impl Resolution {
    pub const fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            range: None,
        }
    }

    pub fn with_range(mut self, range: BitrateRange) -> Self {
        self.range = Some(range);
        self
    }

    pub fn pixels(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Five 16:9 rungs from 360p to 1080p.
    pub fn standard_ladder() -> Vec<Resolution> {
        vec![
            Resolution::new(640, 360),
            Resolution::new(854, 480),
            Resolution::new(960, 540),
            Resolution::new(1280, 720),
            Resolution::new(1920, 1080),
        ]
    }
}

impl PartialEq for Resolution {
    fn eq(&self, other: &Self) -> bool {
        self.width == other.width && self.height == other.height
    }
}

impl Eq for Resolution {}

impl Hash for Resolution {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.width.hash(state);
        self.height.hash(state);
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Parses `WIDTHxHEIGHT` with an optional `:MIN-MAX` window where either
/// bound may be left empty, e.g. `640x360:-500000`.
impl FromStr for Resolution {
    type Err = ExplorerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |message: &str| ExplorerError::InvalidResolution {
            input: s.to_string(),
            message: message.to_string(),
        };

        let (dims, window) = match s.split_once(':') {
            Some((dims, window)) => (dims, Some(window)),
            None => (s, None),
        };

        let (w, h) = dims
            .trim()
            .split_once(['x', 'X'])
            .ok_or_else(|| invalid("expected WIDTHxHEIGHT"))?;
        let width: u32 = w.trim().parse().map_err(|_| invalid("bad width"))?;
        let height: u32 = h.trim().parse().map_err(|_| invalid("bad height"))?;
        if width == 0 || height == 0 {
            return Err(invalid("dimensions must be positive"));
        }

        let mut resolution = Resolution::new(width, height);
        if let Some(window) = window {
            let (min, max) = window
                .split_once('-')
                .ok_or_else(|| invalid("expected MIN-MAX bitrate window"))?;
            let bound = |v: &str| -> Result<Option<u64>, ExplorerError> {
                let v = v.trim();
                if v.is_empty() {
                    Ok(None)
                } else {
                    v.parse().map(Some).map_err(|_| invalid("bad bitrate bound"))
                }
            };
            resolution.range = Some(BitrateRange::new(bound(min)?, bound(max)?));
        }
        Ok(resolution)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_pixels() {
        let r = Resolution::new(1920, 1080);
        assert_eq!(r.pixels(), 2_073_600);
    }

    #[test]
    fn test_identity_ignores_range() {
        let plain = Resolution::new(1280, 720);
        let ranged = plain.with_range(BitrateRange::new(None, Some(500_000)));
        assert_eq!(plain, ranged);
    }

    #[test]
    fn test_range_defaults_missing_bounds() {
        let range = BitrateRange::new(None, Some(500_000));
        assert_eq!(range.effective(150_000, 9_000_000), (150_000, 500_000));
        assert!(range.contains(150_000, 150_000, 9_000_000));
        assert!(range.contains(500_000, 150_000, 9_000_000));
        assert!(!range.contains(600_000, 150_000, 9_000_000));
    }

    #[test]
    fn test_inverted_range_is_empty() {
        let range = BitrateRange::new(Some(800_000), Some(400_000));
        assert!(!range.contains(600_000, 0, u64::MAX));
    }

    #[test]
    fn test_parse() {
        let r: Resolution = "1280x720".parse().unwrap();
        assert_eq!((r.width, r.height), (1280, 720));
        assert!(r.range.is_none());

        let r: Resolution = "640x360:-500000".parse().unwrap();
        assert_eq!(r.range, Some(BitrateRange::new(None, Some(500_000))));

        let r: Resolution = "1920x1080:2000000-".parse().unwrap();
        assert_eq!(r.range, Some(BitrateRange::new(Some(2_000_000), None)));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("1280".parse::<Resolution>().is_err());
        assert!("0x720".parse::<Resolution>().is_err());
        assert!("1280x720:abc-1".parse::<Resolution>().is_err());
        assert!("1280x720:100".parse::<Resolution>().is_err());
    }
}
