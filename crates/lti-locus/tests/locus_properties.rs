use lti_core::{Complex64, ComplexPoint, Polynomial};
use lti_locus::{LocusOptions, root_locus};
use proptest::prelude::*;

fn opts() -> LocusOptions {
    LocusOptions {
        samples: 300,
        ..LocusOptions::default()
    }
}

#[test]
fn classic_type_one_plant() {
    // 1 / (s (s + 1) (s + 2))
    let poles = [
        ComplexPoint::new(0.0, 0.0),
        ComplexPoint::new(-1.0, 0.0),
        ComplexPoint::new(-2.0, 0.0),
    ];
    let res = root_locus(&[], &poles, &LocusOptions::default()).unwrap();

    let a = res.asymptotes.unwrap();
    assert!((a.centroid + 1.0).abs() < 1e-12);
    assert_eq!(a.angles, vec![60.0, 180.0, 300.0]);

    assert_eq!(res.breakaway_points.len(), 1);
    assert!((res.breakaway_points[0].x + 0.4226).abs() < 1e-4);

    let ys: Vec<f64> = res.imag_axis_crossings.iter().map(|c| c.y).collect();
    assert_eq!(ys.len(), 2);
    assert!((ys[1] - 2f64.sqrt()).abs() < 1e-4);
    assert!((ys[0] + 2f64.sqrt()).abs() < 1e-4);
    assert!(res.imag_axis_crossings.iter().all(|c| (c.k - 6.0).abs() < 1e-6));
}

#[test]
fn complex_poles_with_zero_reaches_axis_nowhere() {
    // (s + 2) / (s^2 + 2s + 2): stable for all K > 0
    let res = root_locus(
        &[ComplexPoint::new(-2.0, 0.0)],
        &[ComplexPoint::new(-1.0, 1.0), ComplexPoint::new(-1.0, -1.0)],
        &opts(),
    )
    .unwrap();
    assert!(res.imag_axis_crossings.is_empty());
    assert_eq!(res.branches.len(), 2);
    // break-in on the real axis left of the zero: -2 - √2
    assert!(
        res.breakaway_points
            .iter()
            .any(|p| (p.x + 2.0 + 2f64.sqrt()).abs() < 1e-4 && p.y == 0.0)
    );
}

#[test]
fn same_input_same_output() {
    let poles = [
        ComplexPoint::new(0.0, 0.0),
        ComplexPoint::new(-1.0, 0.0),
        ComplexPoint::new(-1.0, 0.0),
        ComplexPoint::new(-4.0, 0.0),
    ];
    let a = root_locus(&[], &poles, &opts()).unwrap();
    let b = root_locus(&[], &poles, &opts()).unwrap();
    assert_eq!(a, b);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn branches_start_at_poles_and_solve_characteristic(
        poles in prop::collection::vec(-10.0f64..0.0, 1..5),
        zero in prop::option::of(-10.0f64..-0.1),
    ) {
        let pole_pts: Vec<ComplexPoint> = poles.iter().map(|p| ComplexPoint::new(*p, 0.0)).collect();
        let zero_pts: Vec<ComplexPoint> = zero.iter().map(|z| ComplexPoint::new(*z, 0.0)).collect();
        let res = root_locus(&zero_pts, &pole_pts, &opts()).unwrap();

        let mut sorted = res.poles.clone();
        sorted.sort_by(|a, b| a.x.total_cmp(&b.x));
        prop_assert_eq!(res.branches.len(), res.poles.len().max(res.zeros.len()));
        for (b, p) in res.branches.iter().zip(&sorted) {
            prop_assert_eq!(b.k[0], 0.0);
            prop_assert_eq!((b.x[0], b.y[0]), (p.x, p.y));
        }

        let zeros: Vec<Complex64> = res.zeros.iter().map(|z| Complex64::new(z.x, z.y)).collect();
        let remaining: Vec<Complex64> = res.poles.iter().map(|p| Complex64::new(p.x, p.y)).collect();
        let num = Polynomial::from_roots(&zeros).unwrap();
        let den = Polynomial::from_roots(&remaining).unwrap();
        for b in &res.branches {
            let n = b.x.len() / 2;
            let s = Complex64::new(b.x[n], b.y[n]);
            let k = b.k[n];
            let residual = (den.eval_complex(s) + num.eval_complex(s) * k).norm();
            let scale = den.eval_complex(Complex64::new(s.norm(), 0.0)).norm().max(1.0) + k;
            prop_assert!(residual <= 1e-6 * scale);
        }
    }
}
