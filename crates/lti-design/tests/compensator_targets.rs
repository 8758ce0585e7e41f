use lti_design::{DesignError, DesignOptions, design_lag, design_lag_lead, design_lead};

#[test]
fn lead_meets_phase_margin() {
    let d = design_lead(&[10.0], &[1.0, 3.0, 2.0], 60.0, &DesignOptions::default()).unwrap();
    let pm = d.performance.after.phase_margin.unwrap();
    assert!((pm - 60.0).abs() <= 2.0, "phase margin {pm}");
    assert!(d.performance.before.phase_margin.unwrap() < 60.0);
    assert_eq!(d.message, "Lead compensator designed successfully.");
    assert!(d.compensator.alpha > 0.0 && d.compensator.alpha < 1.0);
}

#[test]
fn lag_meets_velocity_constant() {
    let d = design_lag(&[10.0], &[1.0, 3.0, 2.0, 0.0], 10.0, &DesignOptions::default()).unwrap();
    let kv = d.performance.after.kv.unwrap();
    assert!((kv - 10.0).abs() <= 0.5, "kv {kv}");
    assert!((d.performance.before.kv.unwrap() - 5.0).abs() < 1e-12);
    assert!((d.compensator.beta - 2.0).abs() < 1e-12);
    // pole sits closer to the origin than the zero
    assert!(d.compensator.pole > d.compensator.zero && d.compensator.pole < 0.0);
}

#[test]
fn lag_lead_meets_both_targets() {
    let d = design_lag_lead(&[1.0], &[1.0, 1.0, 0.0], 60.0, 10.0, &DesignOptions::default())
        .unwrap();
    let after = d.performance.after;
    assert!((after.kv.unwrap() - 10.0).abs() <= 0.5, "kv {:?}", after.kv);
    let pm = after.phase_margin.unwrap();
    assert!(pm > 55.0 && pm < 65.0, "phase margin {pm}");
    assert_eq!(d.message, "Lag-Lead compensator designed successfully.");
}

#[test]
fn plots_share_a_grid() {
    let d = design_lead(&[10.0], &[1.0, 3.0, 2.0], 60.0, &DesignOptions::default()).unwrap();
    let bode = &d.plots.bode;
    assert!(!bode.omega.is_empty());
    assert_eq!(bode.omega.len(), bode.uncompensated_mag_db.len());
    assert_eq!(bode.omega.len(), bode.compensated_phase_deg.len());
    let step = &d.plots.step_response;
    assert_eq!(step.compensated_time.len(), step.compensated_response.len());
    // type-0 plant with DC gain 5: closed loop settles at 5/6
    let last = *step.uncompensated_response.last().unwrap();
    assert!((last - 5.0 / 6.0).abs() < 1e-2, "final value {last}");
}

#[test]
fn design_serializes_with_contract_keys() {
    let d = design_lead(&[10.0], &[1.0, 3.0, 2.0], 60.0, &DesignOptions::default()).unwrap();
    let v = serde_json::to_value(&d).unwrap();
    for key in ["zero", "pole", "alpha"] {
        assert!(v["compensator"].get(key).is_some(), "missing compensator.{key}");
    }
    for key in ["phase_margin", "gain_margin_db", "gain_crossover_freq", "kv"] {
        assert!(v["performance"]["before"].get(key).is_some(), "missing {key}");
    }
    assert!(v["plots"]["bode"].get("omega").is_some());
    assert!(v["plots"]["step_response"].get("compensated_response").is_some());
}

#[test]
fn improper_plant_rejected() {
    let err = design_lead(&[1.0, 0.0, 0.0], &[1.0, 1.0], 45.0, &DesignOptions::default())
        .unwrap_err();
    assert!(matches!(err, DesignError::InvalidInput { .. }));
}
