//! Cross-product of generated pairs with option-variable grids.

use crate::candidate::Candidate;
use crate::config::VariableGrid;

/// Expand `pairs` against every grid, in grid order.
///
/// Each pass replaces the working set with one copy of every candidate per
/// value of the next grid, so a candidate's copies stay adjacent and follow
/// the grid's value order. With no grids the pairs pass through unchanged.
pub fn expand(pairs: Vec<Candidate>, grids: &[VariableGrid]) -> Vec<Candidate> {
    let mut current = pairs;

    for grid in grids {
        let mut next = Vec::with_capacity(current.len() * grid.values.len());
        for candidate in &current {
            for value in &grid.values {
                next.push(candidate.with_variable(&grid.name, value));
            }
        }
        current = next;
    }

    current
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolution::Resolution;

    fn two_pairs() -> Vec<Candidate> {
        vec![
            Candidate::new(Resolution::new(640, 360), 400_000),
            Candidate::new(Resolution::new(1280, 720), 1_500_000),
        ]
    }

    #[test]
    fn test_no_grids_passes_through() {
        let expanded = expand(two_pairs(), &[]);
        assert_eq!(expanded, two_pairs());
    }

    #[test]
    fn test_single_grid_cross_product() {
        let grids = [VariableGrid::new("preset", ["fast", "medium", "slow"])];
        let expanded = expand(two_pairs(), &grids);
        assert_eq!(expanded.len(), 6);
        assert!(expanded.iter().all(|c| c.variables.len() == 1));

        let first: Vec<_> = expanded[..3]
            .iter()
            .map(|c| c.variables.get("preset").unwrap())
            .collect();
        assert_eq!(first, vec!["fast", "medium", "slow"]);
        assert!(expanded[..3].iter().all(|c| c.bitrate == 400_000));
    }

    #[test]
    fn test_grids_accumulate() {
        let grids = [
            VariableGrid::new("preset", ["fast", "slow"]),
            VariableGrid::new("tune", ["film", "grain"]),
        ];
        let expanded = expand(two_pairs(), &grids);
        assert_eq!(expanded.len(), 8);
        assert!(expanded.iter().all(|c| c.variables.len() == 2));

        let head: Vec<_> = expanded[..4]
            .iter()
            .map(|c| {
                (
                    c.variables.get("preset").unwrap(),
                    c.variables.get("tune").unwrap(),
                )
            })
            .collect();
        assert_eq!(
            head,
            vec![
                ("fast", "film"),
                ("fast", "grain"),
                ("slow", "film"),
                ("slow", "grain"),
            ]
        );
    }

    #[test]
    fn test_empty_grid_empties_product() {
        let grids = [VariableGrid::new("preset", Vec::<String>::new())];
        assert!(expand(two_pairs(), &grids).is_empty());
    }
}
