use crate::error::DemandError;
use crate::models::TimeSeries;

/// Piecewise-linear interpolation of `values` over `times` at every target.
///
/// `times` must be sorted ascending. Targets before the first or after the last
/// sample take the boundary value; there is no extrapolation. Targets that
/// coincide with a sample return that sample's value exactly.
///
/// # Examples
///
/// ```
/// use land_demand::analysis::interpolate;
///
/// let pop = interpolate(&[2000.0, 2010.0], &[100.0, 200.0], &[1990.0, 2005.0, 2030.0]).unwrap();
/// assert_eq!(pop, vec![100.0, 150.0, 200.0]);
/// ```
pub fn interpolate(times: &[f64], values: &[f64], targets: &[f64]) -> Result<Vec<f64>, DemandError> {
    if times.is_empty() {
        return Err(DemandError::InsufficientData(
            "Cannot interpolate an empty series".to_string(),
        ));
    }
    if times.len() != values.len() {
        return Err(DemandError::ValidationError(format!(
            "Interpolation needs as many values as times ({} vs {})",
            values.len(),
            times.len()
        )));
    }
    if times.windows(2).any(|w| w[1] < w[0]) {
        return Err(DemandError::ValidationError(
            "Interpolation times must be sorted ascending".to_string(),
        ));
    }
    if targets.iter().any(|t| !t.is_finite()) {
        return Err(DemandError::ValidationError(
            "Interpolation targets must be finite".to_string(),
        ));
    }

    let last = times.len() - 1;
    let interpolated = targets
        .iter()
        .map(|&t| {
            if t <= times[0] {
                return values[0];
            }
            if t >= times[last] {
                return values[last];
            }
            // first sample strictly after t; 1 <= hi <= last here
            let hi = times.partition_point(|&x| x <= t);
            let lo = hi - 1;
            if times[lo] == t {
                return values[lo];
            }
            let span = times[hi] - times[lo];
            values[lo] + (values[hi] - values[lo]) * (t - times[lo]) / span
        })
        .collect();

    Ok(interpolated)
}

/// Population of one subregion at each simulation time, interpolated over the
/// observed and projected series combined.
pub fn simulated_population(
    observed: &TimeSeries,
    projected: &TimeSeries,
    simulation_times: &[f64],
) -> Result<Vec<f64>, DemandError> {
    let combined = observed.concat(projected);
    interpolate(&combined.times, &combined.values, simulation_times)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_at_samples() {
        let times = [2000.0, 2005.0, 2010.0];
        let values = [1000.0, 1500.0, 2000.0];
        let out = interpolate(&times, &values, &times).unwrap();
        assert_eq!(out, values.to_vec());
    }

    #[test]
    fn test_midpoint() {
        let out = interpolate(&[0.0, 10.0], &[0.0, 100.0], &[2.5]).unwrap();
        assert!((out[0] - 25.0).abs() < 1e-12);
    }

    #[test]
    fn test_clamps_outside_range() {
        let out = interpolate(&[2000.0, 2010.0], &[5.0, 15.0], &[1900.0, 2100.0]).unwrap();
        assert_eq!(out, vec![5.0, 15.0]);
    }

    #[test]
    fn test_single_sample_is_constant() {
        let out = interpolate(&[2000.0], &[42.0], &[1990.0, 2000.0, 2020.0]).unwrap();
        assert_eq!(out, vec![42.0, 42.0, 42.0]);
    }

    #[test]
    fn test_output_length_matches_targets() {
        let targets: Vec<f64> = (0..17).map(|i| 1995.0 + i as f64 * 2.5).collect();
        let out = interpolate(&[2000.0, 2020.0, 2030.0], &[1.0, 2.0, 4.0], &targets).unwrap();
        assert_eq!(out.len(), targets.len());
    }

    #[test]
    fn test_empty_targets() {
        let out = interpolate(&[2000.0], &[1.0], &[]).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_empty_series_is_error() {
        assert!(interpolate(&[], &[], &[2000.0]).is_err());
    }

    #[test]
    fn test_unsorted_times_is_error() {
        assert!(interpolate(&[2010.0, 2000.0], &[1.0, 2.0], &[2005.0]).is_err());
    }

    #[test]
    fn test_length_mismatch_is_error() {
        assert!(interpolate(&[2000.0, 2010.0], &[1.0], &[2005.0]).is_err());
    }

    #[test]
    fn test_simulated_population_spans_observed_and_projected() {
        let observed = TimeSeries::new(vec![2000.0, 2010.0], vec![1000.0, 2000.0]).unwrap();
        let projected = TimeSeries::new(vec![2020.0, 2030.0], vec![3000.0, 3500.0]).unwrap();
        let out = simulated_population(&observed, &projected, &[2010.0, 2015.0, 2025.0, 2040.0])
            .unwrap();
        assert_eq!(out, vec![2000.0, 2500.0, 3250.0, 3500.0]);
    }
}
