//! Integration tests for forward time-domain analysis.

use lti_sim::StepOptions;
use lti_time::{StabilityStatus, TimeError, analyze};
use proptest::prelude::*;

#[test]
fn underdamped_metrics_match_closed_form() {
    // wn = 2, zeta = 0.5
    let res = analyze(&[4.0], &[1.0, 2.0, 4.0], &StepOptions::default()).unwrap();
    assert_eq!(res.stability.status, StabilityStatus::Stable);
    let m = res.metrics.unwrap();

    let zeta: f64 = 0.5;
    let beta = (1.0 - zeta * zeta).sqrt();
    let os = 100.0 * (-zeta * std::f64::consts::PI / beta).exp();
    assert!((m.max_overshoot.unwrap() - os).abs() < 0.05);
    assert!((m.peak_time.unwrap() - std::f64::consts::PI / (2.0 * beta)).abs() < 0.01);
    assert!(m.rise_time.unwrap() > 0.5 && m.rise_time.unwrap() < 1.0);
    assert!(m.settling_time_2_percent.unwrap() >= m.settling_time_5_percent.unwrap());
}

#[test]
fn unstable_system_is_not_simulated() {
    let res = analyze(&[1.0], &[1.0, -1.0, 2.0], &StepOptions::default()).unwrap();
    assert_eq!(res.stability.status, StabilityStatus::Unstable);
    assert!(res.metrics.is_none());
    assert_eq!(res.stability.poles.len(), 2);
}

fn assert_rel(actual: f64, expected: f64, rel: f64) {
    assert!(
        (actual - expected).abs() <= rel * expected.abs(),
        "actual {actual}, expected {expected}"
    );
}

#[test]
fn three_decades_of_pole_separation() {
    // poles -1 and -1000, DC gain 1: y = 1 - (1000 e^-t - e^-1000t) / 999
    let res = analyze(&[1000.0], &[1.0, 1001.0, 1000.0], &StepOptions::default()).unwrap();
    assert_eq!(res.stability.status, StabilityStatus::Stable);
    let m = res.metrics.unwrap();
    let a = 1000.0f64 / 999.0;
    assert_rel(m.rise_time.unwrap(), 9.0f64.ln(), 5e-3);
    assert_rel(m.settling_time_2_percent.unwrap(), (a / 0.02).ln(), 5e-3);
    assert_rel(m.settling_time_5_percent.unwrap(), (a / 0.05).ln(), 5e-3);
    assert!(m.max_overshoot.unwrap() < 1e-6);
}

#[test]
fn seven_decades_of_pole_separation() {
    // poles -1e-3 and -1e4: the slow pole dominates with tau = 1000 s
    let res = analyze(&[10.0], &[1.0, 10000.001, 10.0], &StepOptions::default()).unwrap();
    assert_eq!(res.stability.status, StabilityStatus::Stable);
    let m = res.metrics.unwrap();
    let tau = 1000.0;
    assert_rel(m.rise_time.unwrap(), tau * 9.0f64.ln(), 5e-3);
    assert_rel(m.settling_time_2_percent.unwrap(), tau * 50.0f64.ln(), 5e-3);
    assert_rel(m.settling_time_5_percent.unwrap(), tau * 20.0f64.ln(), 5e-3);
    assert!(m.max_overshoot.unwrap() < 1e-6);
}

#[test]
fn diverged_run_of_stable_system_is_an_error() {
    // the 30 % overshoot crosses a limit of 1.2 x DC gain
    let opts = StepOptions {
        divergence_limit: 1.2,
        ..StepOptions::default()
    };
    let err = analyze(&[4.0], &[1.0, 1.4, 4.0], &opts).unwrap_err();
    assert!(matches!(err, TimeError::Simulation { .. }), "{err:?}");
}

#[test]
fn invalid_denominator_is_rejected() {
    assert!(analyze(&[1.0], &[0.0, 0.0], &StepOptions::default()).is_err());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn stable_systems_have_ordered_settling_times(a in 0.2f64..5.0, b in 0.2f64..5.0, k in 0.5f64..3.0) {
        let den = [1.0, a + b, a * b];
        let res = analyze(&[k * a * b], &den, &StepOptions::default()).unwrap();
        prop_assert_eq!(res.stability.status, StabilityStatus::Stable);
        let m = res.metrics.unwrap();
        let s2 = m.settling_time_2_percent.unwrap();
        let s5 = m.settling_time_5_percent.unwrap();
        prop_assert!(s2 >= s5);
        prop_assert!(m.rise_time.is_some());
    }
}
