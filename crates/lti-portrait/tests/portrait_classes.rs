use lti_portrait::{EquilibriumType, PortraitOptions, phase_portrait};

fn kind(den: &[f64]) -> EquilibriumType {
    phase_portrait(&[1.0], den, &PortraitOptions::default())
        .unwrap()
        .equilibrium_analysis
        .kind
}

#[test]
fn second_order_classes() {
    assert_eq!(kind(&[1.0, 1.0, 1.0]), EquilibriumType::StableFocus);
    assert_eq!(kind(&[1.0, 3.0, 2.0]), EquilibriumType::StableNode);
    assert_eq!(kind(&[1.0, 0.0, -1.0]), EquilibriumType::Saddle);
    assert_eq!(kind(&[1.0, 0.0, 1.0]), EquilibriumType::Center);
    assert_eq!(kind(&[1.0, -1.0, 1.0]), EquilibriumType::UnstableFocus);
    assert_eq!(kind(&[1.0, -3.0, 2.0]), EquilibriumType::UnstableNode);
}

#[test]
fn stable_focus_spirals_in() {
    let p = phase_portrait(&[1.0], &[1.0, 1.0, 1.0], &PortraitOptions::default()).unwrap();
    assert_eq!(p.trajectories.len(), 80);
    for t in &p.trajectories {
        let start = t.x[0].hypot(t.y[0]);
        let end = t.x[t.x.len() - 1].hypot(t.y[t.y.len() - 1]);
        assert!(t.x.iter().chain(&t.y).all(|v| v.is_finite()));
        assert!(end < 0.2 * start, "start {start} end {end}");
    }
}

#[test]
fn stiff_stable_node_decays() {
    // poles -1 and -1000: the step 5/500 is far outside RK4's stable range
    let p = phase_portrait(&[1.0], &[1.0, 1001.0, 1000.0], &PortraitOptions::default()).unwrap();
    assert_eq!(p.equilibrium_analysis.kind, EquilibriumType::StableNode);
    assert!((p.horizon - 5.0).abs() < 1e-9);
    for t in &p.trajectories {
        assert_eq!(t.x.len(), 501, "trajectory left the bounding box");
        let start = t.x[0].hypot(t.y[0]);
        let end = t.x[500].hypot(t.y[500]);
        assert!(end < 0.05 * start, "start {start} end {end}");
    }
}

#[test]
fn center_orbits_are_closed() {
    // x'' + x = 0: x^2 + x'^2 is conserved
    let p = phase_portrait(&[1.0], &[1.0, 0.0, 1.0], &PortraitOptions::default()).unwrap();
    for t in &p.trajectories {
        let r0 = t.x[0].hypot(t.y[0]);
        for (x, y) in t.x.iter().zip(&t.y) {
            assert!((x.hypot(*y) - r0).abs() < 1e-3 * r0);
        }
    }
}

#[test]
fn higher_order_projects_first_two_states() {
    let p = phase_portrait(&[1.0], &[1.0, 6.0, 11.0, 6.0], &PortraitOptions::default()).unwrap();
    assert_eq!(p.equilibrium_analysis.kind, EquilibriumType::StableNode);
    assert_eq!(p.equilibrium_analysis.eigenvalues.len(), 3);
    assert_eq!(p.trajectories.len(), 80);
}

#[test]
fn response_contract_keys() {
    let p = phase_portrait(&[1.0], &[1.0, 1.0, 1.0], &PortraitOptions::default()).unwrap();
    let v = serde_json::to_value(&p).unwrap();
    assert!(v["trajectories"][0]["x"].is_array());
    assert!(v["trajectories"][0]["y"].is_array());
    assert_eq!(v["equilibrium_analysis"]["type"], "stable_focus");
    assert_eq!(v["equilibrium_analysis"]["point"].as_array().unwrap().len(), 2);
}
