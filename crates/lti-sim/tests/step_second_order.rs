//! Integration test: simulated step responses against closed-form solutions.

use lti_core::TransferFunction;
use lti_sim::{LinearScheme, StepOptions, simulate_step, step_response};

#[test]
fn underdamped_second_order_peak() {
    // wn = 2, zeta = 0.5
    let tf = TransferFunction::new(&[4.0], &[1.0, 2.0, 4.0]).unwrap();
    let resp = step_response(&tf, &StepOptions::default()).unwrap();

    let (i_max, y_max) = resp
        .response
        .iter()
        .copied()
        .enumerate()
        .fold((0, f64::MIN), |acc, (i, y)| if y > acc.1 { (i, y) } else { acc });

    let zeta: f64 = 0.5;
    let wd = 2.0 * (1.0 - zeta * zeta).sqrt();
    let expected_peak = 1.0 + (-zeta * std::f64::consts::PI / (1.0 - zeta * zeta).sqrt()).exp();
    assert!((y_max - expected_peak).abs() < 1e-4);
    assert!((resp.time[i_max] - std::f64::consts::PI / wd).abs() < 1e-2);

    let last = *resp.response.last().unwrap();
    assert!((last - 1.0).abs() < 1e-3);
}

#[test]
fn horizon_tracks_slowest_pole() {
    let tf = TransferFunction::new(&[1.0], &[1.0, 10.1, 1.0]).unwrap();
    let resp = step_response(&tf, &StepOptions::default()).unwrap();
    let t_end = *resp.time.last().unwrap();
    // slowest pole near -0.1
    assert!(t_end > 90.0 && t_end < 110.0);
}

/// Full-resolution sample nearest to `t`.
fn sample_at(time: &[f64], y: &[f64], t: f64) -> f64 {
    let i = time
        .iter()
        .enumerate()
        .min_by(|a, b| (a.1 - t).abs().total_cmp(&(b.1 - t).abs()))
        .map(|(i, _)| i)
        .unwrap();
    y[i]
}

#[test]
fn three_decade_separation_stays_on_rk4() {
    // poles -1 and -1000
    let tf = TransferFunction::new(&[1000.0], &[1.0, 1001.0, 1000.0]).unwrap();
    let run = simulate_step(&tf, &StepOptions::default()).unwrap();
    assert_eq!(run.scheme, LinearScheme::RK4);
    assert!(!run.diverged);
    for t in [0.5f64, 1.0, 3.0] {
        let exact = 1.0 - (1000.0 * (-t).exp() - (-1000.0 * t).exp()) / 999.0;
        let y = sample_at(&run.full.time, &run.full.response, t);
        assert!((y - exact).abs() < 1e-6, "t {t}: {y} vs {exact}");
    }
}

#[test]
fn seven_decade_separation_follows_slow_pole() {
    // poles -1e-3 and -1e4, DC gain 1
    let tf = TransferFunction::new(&[10.0], &[1.0, 10000.001, 10.0]).unwrap();
    let run = simulate_step(&tf, &StepOptions::default()).unwrap();
    assert_eq!(run.scheme, LinearScheme::ExactHold);
    assert!(!run.diverged);
    for t in [500.0f64, 1000.0, 3000.0] {
        let exact = 1.0 - (-t / 1000.0).exp();
        let y = sample_at(&run.full.time, &run.full.response, t);
        assert!((y - exact).abs() < 1e-4, "t {t}: {y} vs {exact}");
    }
}
