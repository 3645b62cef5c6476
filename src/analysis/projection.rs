use tracing::warn;

use crate::models::{DemandProjection, DemandVector, DemandWarning, Selection};

/// Turn a selected curve into per-interval demand.
///
/// Demand for interval `i` is `predicted[i + 1] - predicted[i]`. Negative
/// increments are clamped to zero, and a non-positive slope zeroes the whole
/// vector. Remaining increments are truncated to whole cells.
pub fn project_demand(selection: &Selection) -> DemandProjection {
    project_increments(&selection.subregion, &selection.predicted, selection.best.slope)
}

/// Zero demand for a subregion where no regression method could be fitted.
pub fn project_unfitted(subregion: &str, intervals: usize, reason: impl Into<String>) -> DemandProjection {
    let warning = DemandWarning::NoViableModel {
        subregion: subregion.to_string(),
        reason: reason.into(),
    };
    warn!(subregion, "{warning}");
    DemandProjection {
        vector: DemandVector::zeros(subregion, intervals),
        warnings: vec![warning],
    }
}

/// Same as [`project_demand`] on raw predictions.
pub fn project_increments(subregion: &str, predicted: &[f64], slope: f64) -> DemandProjection {
    let intervals = predicted.len().saturating_sub(1);
    let mut warnings = Vec::new();

    if slope <= 0.0 {
        let warning = DemandWarning::InverseRelationship {
            subregion: subregion.to_string(),
            slope,
        };
        warn!(subregion, slope, "{warning}");
        warnings.push(warning);
        return DemandProjection {
            vector: DemandVector::zeros(subregion, intervals),
            warnings,
        };
    }

    let deltas: Vec<f64> = predicted.windows(2).map(|w| w[1] - w[0]).collect();
    let negative = deltas.iter().filter(|d| **d < 0.0).count();
    if negative > 0 {
        let warning = DemandWarning::NegativeDemandClamped {
            subregion: subregion.to_string(),
            intervals: negative,
        };
        warn!(subregion, intervals = negative, "{warning}");
        warnings.push(warning);
    }

    let cells = deltas
        .into_iter()
        .map(|d| if d > 0.0 { d.trunc() as u64 } else { 0 })
        .collect();

    DemandProjection {
        vector: DemandVector {
            subregion: subregion.to_string(),
            cells,
        },
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_increasing_predictions() {
        let p = project_increments("1", &[100.0, 150.5, 230.9], 0.5);
        assert_eq!(p.vector.cells, vec![50, 80]);
        assert!(p.warnings.is_empty());
    }

    #[test]
    fn test_negative_increment_is_clamped() {
        let p = project_increments("2", &[100.0, 90.0, 120.0, 119.0], 0.5);
        assert_eq!(p.vector.cells, vec![0, 30, 0]);
        assert_eq!(
            p.warnings,
            vec![DemandWarning::NegativeDemandClamped {
                subregion: "2".into(),
                intervals: 2
            }]
        );
    }

    #[test]
    fn test_non_positive_slope_zeroes_everything() {
        for slope in [0.0, -1.5] {
            let p = project_increments("3", &[10.0, 50.0, 200.0], slope);
            assert_eq!(p.vector.cells, vec![0, 0]);
            assert_eq!(p.warnings.len(), 1);
            assert!(matches!(
                p.warnings[0],
                DemandWarning::InverseRelationship { .. }
            ));
        }
    }

    #[test]
    fn test_length_is_times_minus_one() {
        let p = project_increments("4", &[1.0, 2.0, 3.0, 4.0, 5.0], 1.0);
        assert_eq!(p.vector.len(), 4);
        let p = project_increments("4", &[1.0], 1.0);
        assert!(p.vector.is_empty());
    }

    #[test]
    fn test_unfitted_is_zero_with_warning() {
        let p = project_unfitted("12", 3, "exponential: ln of 0");
        assert_eq!(p.vector.cells, vec![0, 0, 0]);
        assert_eq!(p.warnings.len(), 1);
        assert_eq!(p.warnings[0].subregion(), "12");
        assert!(p.warnings[0].to_string().contains("subregion 12"));
    }

    #[test]
    fn test_fractional_increment_truncates() {
        let p = project_increments("5", &[0.0, 0.999, 2.5], 1.0);
        assert_eq!(p.vector.cells, vec![0, 1]);
    }
}
