//! Distance estimates between grid cells.

use civitas_types::GridPos;
use serde::{Deserialize, Serialize};

/// Distance metric used as the A* heuristic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// `|dx| + |dy|`. Admissible for 4-connected movement only.
    Manhattan,
    /// Straight-line distance.
    #[default]
    Euclidean,
    /// `max(|dx|, |dy|)`.
    Chebyshev,
}

/// Estimate the distance between two cells under `metric`.
pub fn heuristic(a: GridPos, b: GridPos, metric: Metric) -> f64 {
    let dx = (f64::from(a.x) - f64::from(b.x)).abs();
    let dy = (f64::from(a.y) - f64::from(b.y)).abs();
    match metric {
        Metric::Manhattan => dx + dy,
        Metric::Euclidean => dx.hypot(dy),
        Metric::Chebyshev => dx.max(dy),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metrics_on_a_3_4_offset() {
        let a = GridPos::new(0, 0);
        let b = GridPos::new(3, -4);
        assert!((heuristic(a, b, Metric::Manhattan) - 7.0).abs() < 1e-12);
        assert!((heuristic(a, b, Metric::Euclidean) - 5.0).abs() < 1e-12);
        assert!((heuristic(a, b, Metric::Chebyshev) - 4.0).abs() < 1e-12);
    }

    #[test]
    fn symmetric_and_zero_on_identity() {
        let a = GridPos::new(2, 7);
        let b = GridPos::new(-1, 3);
        for metric in [Metric::Manhattan, Metric::Euclidean, Metric::Chebyshev] {
            assert!(heuristic(a, a, metric).abs() < 1e-12);
            assert!((heuristic(a, b, metric) - heuristic(b, a, metric)).abs() < 1e-12);
        }
    }

    #[test]
    fn default_is_euclidean() {
        assert_eq!(Metric::default(), Metric::Euclidean);
    }
}
