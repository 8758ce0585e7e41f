//! Step-response figures of merit.

use serde::{Deserialize, Serialize};

/// Unit-step metrics; `None` marks a figure that is undefined for the response.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StepMetrics {
    pub rise_time: Option<f64>,
    pub peak_time: Option<f64>,
    /// Percent of the final value
    pub max_overshoot: Option<f64>,
    pub settling_time_2_percent: Option<f64>,
    pub settling_time_5_percent: Option<f64>,
}

/// Extract metrics from a sampled response settling at `final_value`.
///
/// The response is normalized by the final value, so negative DC gains are
/// handled the same as positive ones. With a zero final value the rise, peak
/// and overshoot figures are undefined and the settling bands are taken
/// relative to the largest excursion instead.
pub fn extract_metrics(time: &[f64], response: &[f64], final_value: f64) -> StepMetrics {
    if time.len() < 2 || time.len() != response.len() {
        return StepMetrics::default();
    }

    if final_value == 0.0 {
        let peak = response.iter().fold(0.0f64, |m, y| m.max(y.abs()));
        if peak == 0.0 {
            return StepMetrics {
                settling_time_2_percent: Some(0.0),
                settling_time_5_percent: Some(0.0),
                ..StepMetrics::default()
            };
        }
        let dev: Vec<f64> = response.iter().map(|y| y / peak).collect();
        let (s2, s5) = settling_pair(time, &dev);
        return StepMetrics {
            settling_time_2_percent: s2,
            settling_time_5_percent: s5,
            ..StepMetrics::default()
        };
    }

    let yn: Vec<f64> = response.iter().map(|y| y / final_value).collect();
    let dev: Vec<f64> = yn.iter().map(|y| y - 1.0).collect();

    let rise_time = match (first_crossing(time, &yn, 0.1), first_crossing(time, &yn, 0.9)) {
        (Some(t10), Some(t90)) => Some(t90 - t10),
        _ => None,
    };

    let (peak_idx, overshoot) = match first_peak_above_final(&yn) {
        Some(i) => (i, (yn[i] - 1.0) * 100.0),
        None => (argmax(&yn), 0.0),
    };

    let (s2, s5) = settling_pair(time, &dev);

    StepMetrics {
        rise_time,
        peak_time: Some(time[peak_idx]),
        max_overshoot: Some(overshoot),
        settling_time_2_percent: s2,
        settling_time_5_percent: s5,
    }
}

fn settling_pair(time: &[f64], dev: &[f64]) -> (Option<f64>, Option<f64>) {
    let s2 = settling_time(time, dev, 0.02);
    let s5 = settling_time(time, dev, 0.05);
    // the 2% band sits inside the 5% band
    match (s2, s5) {
        (Some(a), Some(b)) => (Some(a.max(b)), Some(b)),
        other => other,
    }
}

/// First time the series reaches `level`, linearly interpolated.
fn first_crossing(time: &[f64], y: &[f64], level: f64) -> Option<f64> {
    if y[0] >= level {
        return Some(time[0]);
    }
    for i in 1..y.len() {
        if y[i] >= level {
            let frac = (level - y[i - 1]) / (y[i] - y[i - 1]);
            return Some(time[i - 1] + frac * (time[i] - time[i - 1]));
        }
    }
    None
}

/// Index of the first local maximum that exceeds the final value.
fn first_peak_above_final(yn: &[f64]) -> Option<usize> {
    for i in 1..yn.len().saturating_sub(1) {
        if yn[i] > 1.0 && yn[i] >= yn[i - 1] && yn[i] > yn[i + 1] {
            return Some(i);
        }
    }
    None
}

fn argmax(y: &[f64]) -> usize {
    y.iter()
        .enumerate()
        .fold((0, f64::NEG_INFINITY), |acc, (i, v)| {
            if *v > acc.1 { (i, *v) } else { acc }
        })
        .0
}

/// Time of the last exit from the `|dev| <= tol` band.
///
/// `None` when the final sample is still outside the band.
fn settling_time(time: &[f64], dev: &[f64], tol: f64) -> Option<f64> {
    let n = dev.len();
    if dev[n - 1].abs() > tol {
        return None;
    }
    let last_out = (0..n).rev().find(|&i| dev[i].abs() > tol);
    match last_out {
        None => Some(time[0]),
        Some(i) => {
            let target = tol.copysign(dev[i]);
            let frac = (dev[i] - target) / (dev[i] - dev[i + 1]);
            Some(time[i] + frac.clamp(0.0, 1.0) * (time[i + 1] - time[i]))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first_order(n: usize, dt: f64) -> (Vec<f64>, Vec<f64>) {
        let t: Vec<f64> = (0..n).map(|i| i as f64 * dt).collect();
        let y = t.iter().map(|t| 1.0 - (-t).exp()).collect();
        (t, y)
    }

    #[test]
    fn first_order_figures() {
        let (t, y) = first_order(10_001, 1e-3);
        let m = extract_metrics(&t, &y, 1.0);
        // ln(9) for 10-90%
        assert!((m.rise_time.unwrap() - 9f64.ln()).abs() < 1e-3);
        assert_eq!(m.max_overshoot, Some(0.0));
        assert!((m.settling_time_2_percent.unwrap() - 50f64.ln()).abs() < 1e-3);
        assert!((m.settling_time_5_percent.unwrap() - 20f64.ln()).abs() < 1e-3);
    }

    #[test]
    fn negative_gain_is_normalized() {
        let (t, y) = first_order(10_001, 1e-3);
        let neg: Vec<f64> = y.iter().map(|v| -2.0 * v).collect();
        let m = extract_metrics(&t, &neg, -2.0);
        assert!((m.rise_time.unwrap() - 9f64.ln()).abs() < 1e-3);
    }

    #[test]
    fn zero_final_value_leaves_shape_metrics_undefined() {
        let t: Vec<f64> = (0..5001).map(|i| i as f64 * 2e-3).collect();
        let y: Vec<f64> = t.iter().map(|t| t * (-t).exp()).collect();
        let m = extract_metrics(&t, &y, 0.0);
        assert_eq!(m.rise_time, None);
        assert_eq!(m.max_overshoot, None);
        assert!(m.settling_time_2_percent.is_some());
    }

    #[test]
    fn settling_is_none_when_not_settled() {
        let t = vec![0.0, 1.0, 2.0];
        let y = vec![0.0, 0.5, 0.8];
        let m = extract_metrics(&t, &y, 1.0);
        assert_eq!(m.settling_time_2_percent, None);
        assert_eq!(m.settling_time_5_percent, None);
    }
}
