use tracing::debug;

/// Build the sorted station grid: the observed positions merged with
/// `fill_count` evenly spaced positions across `[min, max]` of the observed
/// span.
///
/// Positions within `tolerance` of each other collapse to one, and an
/// observed position always wins over a fill position so that exact
/// readings are never displaced. With fewer than two distinct observed
/// positions the span is a single point and that point is the whole grid;
/// with none at all the grid is the inlet, `[0.0]`.
pub fn build(observed: &[f64], fill_count: usize, tolerance: f64) -> Vec<f64> {
    let mut sorted: Vec<f64> = observed.iter().copied().filter(|p| p.is_finite()).collect();
    sorted.sort_by(f64::total_cmp);
    let stations = dedup_sorted(&sorted, tolerance);

    let (min, max) = match (stations.first(), stations.last()) {
        (Some(&min), Some(&max)) if stations.len() >= 2 => (min, max),
        (Some(&only), _) => return vec![only],
        _ => return vec![0.0],
    };

    let span = max - min;
    let steps = fill_count.saturating_sub(1).max(1) as f64;
    let mut grid = stations.clone();
    for i in 0..fill_count {
        let fill = min + span * i as f64 / steps;
        if !stations.iter().any(|&s| (s - fill).abs() <= tolerance) {
            grid.push(fill);
        }
    }
    grid.sort_by(f64::total_cmp);
    let grid = dedup_sorted(&grid, tolerance);

    debug!(
        "Station grid: {} observed + {} fill -> {} positions over [{min:.4}, {max:.4}]",
        stations.len(),
        fill_count,
        grid.len()
    );
    grid
}

/// Collapse runs of sorted positions that lie within `tolerance` of the
/// first position of the run.
pub(crate) fn dedup_sorted(sorted: &[f64], tolerance: f64) -> Vec<f64> {
    let mut out: Vec<f64> = Vec::with_capacity(sorted.len());
    for &p in sorted {
        match out.last() {
            Some(&start) if p - start <= tolerance => {}
            _ => out.push(p),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{DEFAULT_FILL_COUNT, POSITION_TOLERANCE};

    fn strictly_increasing(grid: &[f64]) -> bool {
        grid.windows(2).all(|w| w[0] < w[1])
    }

    #[test]
    fn test_merges_observed_and_fill() {
        let observed = [1.0 / 12.0, 0.5, 11.0 / 12.0];
        let grid = build(&observed, DEFAULT_FILL_COUNT, POSITION_TOLERANCE);

        assert!(strictly_increasing(&grid), "grid not strictly increasing: {grid:?}");
        assert_eq!(grid.first().copied(), Some(1.0 / 12.0));
        assert_eq!(grid.last().copied(), Some(11.0 / 12.0));
        for p in observed {
            assert!(grid.contains(&p), "observed position {p} missing");
        }
        // both endpoints coincide with fill positions; 0.5 does not
        assert_eq!(grid.len(), DEFAULT_FILL_COUNT + 1);
    }

    #[test]
    fn test_duplicates_collapse() {
        let grid = build(&[0.2, 0.2 + 1e-12, 0.8, 0.8], 2, POSITION_TOLERANCE);
        assert_eq!(grid, vec![0.2, 0.8]);
    }

    #[test]
    fn test_single_position_degenerates() {
        assert_eq!(build(&[0.3, 0.3], 20, POSITION_TOLERANCE), vec![0.3]);
        assert_eq!(build(&[], 20, POSITION_TOLERANCE), vec![0.0]);
    }

    #[test]
    fn test_fill_spacing_is_even() {
        let grid = build(&[0.0, 1.0], 5, POSITION_TOLERANCE);
        assert_eq!(grid.len(), 5);
        for (i, &p) in grid.iter().enumerate() {
            assert!((p - i as f64 * 0.25).abs() < 1e-12, "position {i} = {p}");
        }
    }

    #[test]
    fn test_unsorted_input() {
        let grid = build(&[0.9, 0.1, 0.4], 0, POSITION_TOLERANCE);
        assert_eq!(grid, vec![0.1, 0.4, 0.9]);
    }
}
