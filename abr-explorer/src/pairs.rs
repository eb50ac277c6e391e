//! (resolution, bitrate) pair generation.

use tracing::debug;

use crate::candidate::Candidate;
use crate::config::{BitrateFilter, LadderDefaults};
use crate::resolution::Resolution;

/// Builds the valid (resolution, bitrate) pairs for an exploration run.
#[derive(Debug, Clone, Default)]
pub struct PairGenerator {
    defaults: LadderDefaults,
}

impl PairGenerator {
    pub fn new(defaults: LadderDefaults) -> Self {
        Self { defaults }
    }

    /// Every pair accepted by `filter` and by the resolution's own range.
    ///
    /// Resolutions keep input order, and bitrates keep input order within a
    /// resolution. A bitrate listed twice is only paired once.
    pub fn generate(
        &self,
        resolutions: &[Resolution],
        bitrates: &[u64],
        filter: &BitrateFilter,
    ) -> Vec<Candidate> {
        let default_min = self.defaults.min_bitrate();
        let default_max = self.defaults.max_bitrate();
        let mut pairs = Vec::new();

        for res in resolutions {
            let before = pairs.len();
            for (i, &bitrate) in bitrates.iter().enumerate() {
                if bitrates[..i].contains(&bitrate) {
                    continue;
                }
                if !filter.accepts(bitrate, res) {
                    continue;
                }
                if let Some(range) = &res.range {
                    if !range.contains(bitrate, default_min, default_max) {
                        continue;
                    }
                }
                pairs.push(Candidate::new(*res, bitrate));
            }

            debug!(
                resolution = %res,
                accepted = pairs.len() - before,
                "Bitrates paired"
            );
        }

        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_BITRATES;
    use crate::resolution::BitrateRange;

    fn bitrates_for(pairs: &[Candidate], res: Resolution) -> Vec<u64> {
        pairs
            .iter()
            .filter(|p| p.resolution == res)
            .map(|p| p.bitrate)
            .collect()
    }

    #[test]
    fn test_default_filter_examples() {
        let gen = PairGenerator::default();
        let filter = BitrateFilter::default();

        let hd = Resolution::new(1280, 720);
        let pairs = gen.generate(&[hd], &[920_000], &filter);
        assert_eq!(pairs.len(), 1);

        let low = Resolution::new(640, 360);
        let pairs = gen.generate(&[low], &[50_000], &filter);
        assert!(pairs.is_empty());
    }

    #[test]
    fn test_order_follows_input() {
        let gen = PairGenerator::default();
        let filter = BitrateFilter::custom(|_, _| true);
        let resolutions = [Resolution::new(1920, 1080), Resolution::new(640, 360)];
        let pairs = gen.generate(&resolutions, &[3, 1, 2], &filter);

        let order: Vec<_> = pairs.iter().map(|p| (p.resolution.width, p.bitrate)).collect();
        assert_eq!(
            order,
            vec![(1920, 3), (1920, 1), (1920, 2), (640, 3), (640, 1), (640, 2)]
        );
    }

    #[test]
    fn test_range_with_missing_min_uses_default_floor() {
        let gen = PairGenerator::default();
        let res = Resolution::new(640, 360).with_range(BitrateRange::new(None, Some(500_000)));
        let filter = BitrateFilter::custom(|_, _| true);
        let pairs = gen.generate(&[res], &[100_000, 150_000, 500_000, 600_000], &filter);
        assert_eq!(bitrates_for(&pairs, res), vec![150_000, 500_000]);
    }

    #[test]
    fn test_range_defaults_ignore_supplied_bitrates() {
        // Supplied set starts at 400k, but the missing minimum still resolves
        // against the default ladder floor of 150k.
        let gen = PairGenerator::default();
        let res = Resolution::new(640, 360).with_range(BitrateRange::new(None, Some(450_000)));
        let filter = BitrateFilter::custom(|_, _| true);
        let pairs = gen.generate(&[res], &[400_000, 450_000, 500_000], &filter);
        assert_eq!(bitrates_for(&pairs, res), vec![400_000, 450_000]);
    }

    #[test]
    fn test_substituted_defaults() {
        let gen = PairGenerator::new(LadderDefaults {
            bitrates: vec![1_000, 2_000],
            resolutions: vec![],
        });
        let res = Resolution::new(2, 2).with_range(BitrateRange::new(None, None));
        let filter = BitrateFilter::custom(|_, _| true);
        let pairs = gen.generate(&[res], &[500, 1_000, 2_000, 3_000], &filter);
        assert_eq!(bitrates_for(&pairs, res), vec![1_000, 2_000]);
    }

    #[test]
    fn test_inverted_range_yields_nothing() {
        let gen = PairGenerator::default();
        let res = Resolution::new(1280, 720)
            .with_range(BitrateRange::new(Some(3_000_000), Some(1_000_000)));
        let pairs = gen.generate(&[res], &DEFAULT_BITRATES, &BitrateFilter::default());
        assert!(pairs.is_empty());
    }

    #[test]
    fn test_duplicate_bitrates_paired_once() {
        let gen = PairGenerator::default();
        let res = Resolution::new(1280, 720);
        let pairs = gen.generate(&[res], &[920_000, 920_000], &BitrateFilter::default());
        assert_eq!(pairs.len(), 1);
    }

    #[test]
    fn test_default_tables_produce_pairs_per_resolution() {
        let defaults = LadderDefaults::default();
        let gen = PairGenerator::new(defaults.clone());
        let pairs = gen.generate(
            &defaults.resolutions,
            &defaults.bitrates,
            &BitrateFilter::default(),
        );
        for res in &defaults.resolutions {
            let accepted = bitrates_for(&pairs, *res);
            assert!(!accepted.is_empty(), "no bitrates for {res}");
            let pixels = res.pixels() as f64;
            for b in accepted {
                assert!(b as f64 >= 0.3 * pixels && b as f64 <= 8.0 * pixels);
            }
        }
    }
}
