//! Grid generation for frequency and gain sweeps.

use crate::error::{LtiError, LtiResult};

/// Uniformly spaced points, endpoints included.
pub fn linear_sweep(start: f64, end: f64, num_points: usize) -> LtiResult<Vec<f64>> {
    if !start.is_finite() || !end.is_finite() {
        return Err(LtiError::invalid_input("sweep bounds must be finite"));
    }
    if num_points <= 1 {
        return Ok(vec![start]);
    }

    let mut points = Vec::with_capacity(num_points);
    let delta = (end - start) / (num_points - 1) as f64;
    for i in 0..num_points {
        points.push(start + i as f64 * delta);
    }

    // Ensure exact endpoint
    points[num_points - 1] = end;
    Ok(points)
}

/// Logarithmically spaced points between two positive bounds.
///
/// # Errors
///
/// Returns `InvalidInput` unless both bounds are positive and finite.
pub fn log_sweep(start: f64, end: f64, num_points: usize) -> LtiResult<Vec<f64>> {
    if !(start > 0.0 && end > 0.0 && start.is_finite() && end.is_finite()) {
        return Err(LtiError::invalid_input(
            "logarithmic sweep bounds must be positive and finite",
        ));
    }
    if num_points <= 1 {
        return Ok(vec![start]);
    }

    let mut points = Vec::with_capacity(num_points);
    let log_start = start.ln();
    let log_end = end.ln();
    let log_delta = (log_end - log_start) / (num_points - 1) as f64;

    for i in 0..num_points {
        let log_val = log_start + i as f64 * log_delta;
        points.push(log_val.exp());
    }

    // Ensure exact endpoint
    points[num_points - 1] = end;
    Ok(points)
}

/// Number of points giving `per_decade` resolution between two positive bounds.
pub fn points_for_decades(start: f64, end: f64, per_decade: usize) -> usize {
    let decades = (end / start).log10().abs();
    ((decades * per_decade as f64 - 1e-9).ceil() as usize).max(2) + 1
}
