//! 粉末衍射图谱计算的端到端测试

use rstest::rstest;
use xrdcalc::error::XrdError;
use xrdcalc::models::{Lattice, Site, Structure};
use xrdcalc::xrd::aggregator::DEFAULT_MERGE_TOLERANCE;
use xrdcalc::xrd::{calculate_pattern, Pattern, Radiation, XrdCalculator};

/// 岩盐结构的两原子原胞（a = 5.64 Å）
fn rock_salt_primitive() -> Structure {
    let h = 5.64 / 2.0;
    Structure::new(
        Lattice::from_vectors([[0.0, h, h], [h, 0.0, h], [h, h, 0.0]]),
        vec![
            Site::new("Na", [0.0, 0.0, 0.0]),
            Site::new("Cl", [0.5, 0.5, 0.5]),
        ],
    )
}

/// 三斜 P-1 晶胞：每个原子都有反演对称的伙伴
fn centrosymmetric_triclinic() -> Structure {
    let lattice = Lattice::from_parameters(5.1, 6.3, 7.2, 82.0, 95.0, 104.0);
    let mut sites = Vec::new();
    for (element, [x, y, z]) in [
        ("Fe", [0.12, 0.21, 0.33]),
        ("O", [0.31, 0.14, 0.42]),
        ("Si", [0.71, 0.38, 0.09]),
    ] {
        sites.push(Site::new(element, [x, y, z]));
        sites.push(Site::new(element, [-x, -y, -z]));
    }
    Structure::new(lattice, sites)
}

fn assert_well_ordered(pattern: &Pattern) {
    for pair in pattern.peaks().windows(2) {
        assert!(pair[0].two_theta < pair[1].two_theta);
        assert!(pair[1].two_theta - pair[0].two_theta >= DEFAULT_MERGE_TOLERANCE);
    }
}

#[test]
fn rock_salt_first_peak_is_111() {
    let pattern = calculate_pattern(&rock_salt_primitive(), 1.54184, (5.0, 60.0), true).unwrap();

    let first = &pattern.peaks()[0];
    assert!(
        first.two_theta > 27.3 && first.two_theta < 27.5,
        "first peak at {}",
        first.two_theta
    );
    assert!(first.hkls.contains(&[1, 1, 1]));
    assert!(first.hkls.contains(&[-1, -1, -1]));
    // d = a/√3
    assert!((first.d_spacing - 5.64 / 3f64.sqrt()).abs() < 1e-9);
}

#[test]
fn named_and_numeric_wavelengths_agree() {
    let structure = rock_salt_primitive();
    let named = calculate_pattern(&structure, "CuKa", (5.0, 60.0), true).unwrap();
    let numeric = calculate_pattern(&structure, 1.54184, (5.0, 60.0), true).unwrap();
    assert_eq!(named, numeric);
}

#[test]
fn repeated_calls_are_identical() {
    let structure = centrosymmetric_triclinic();
    let calc = XrdCalculator::new("MoKa");

    let first = calc.calculate(&structure, 5.0, 40.0, false).unwrap();
    let second = calc.calculate(&structure, 5.0, 40.0, false).unwrap();
    assert_eq!(first, second);
}

#[test]
fn concurrent_calls_match_serial_result() {
    let structure = centrosymmetric_triclinic();
    let serial = calculate_pattern(&structure, "CuKa", (10.0, 70.0), true).unwrap();

    let results: Vec<Pattern> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| calculate_pattern(&structure, "CuKa", (10.0, 70.0), true)))
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().unwrap().unwrap())
            .collect()
    });

    for pattern in results {
        assert_eq!(pattern, serial);
    }
}

#[rstest]
#[case("CuKa", 5.0, 90.0)]
#[case("MoKa", 2.0, 60.0)]
#[case("CrKa", 20.0, 150.0)]
fn peaks_are_ordered_and_in_range(#[case] source: &str, #[case] min: f64, #[case] max: f64) {
    let pattern = calculate_pattern(&centrosymmetric_triclinic(), source, (min, max), true).unwrap();

    assert!(!pattern.is_empty());
    assert_well_ordered(&pattern);
    for peak in pattern.peaks() {
        assert!(peak.two_theta >= min && peak.two_theta <= max);
        assert!(peak.intensity >= 0.0);
        assert!(!peak.hkls.is_empty());
    }
}

#[test]
fn scaling_preserves_ratios() {
    let structure = centrosymmetric_triclinic();
    let raw = calculate_pattern(&structure, "CuKa", (10.0, 80.0), false).unwrap();
    let scaled = calculate_pattern(&structure, "CuKa", (10.0, 80.0), true).unwrap();

    assert_eq!(raw.two_thetas(), scaled.two_thetas());
    assert!(!raw.is_scaled());
    assert!(scaled.is_scaled());

    let max_scaled = scaled.intensities().into_iter().fold(0.0, f64::max);
    assert!((max_scaled - 100.0).abs() < 1e-9);

    let max_raw = raw.strongest().unwrap().intensity;
    assert!(max_raw > 100.0, "raw intensities stay unnormalized");
    for (r, s) in raw.intensities().iter().zip(scaled.intensities()) {
        assert!((r / max_raw * 100.0 - s).abs() < 1e-9);
    }
}

#[test]
fn friedel_pairs_share_a_peak() {
    let pattern = calculate_pattern(&centrosymmetric_triclinic(), "CuKa", (5.0, 90.0), false).unwrap();

    for peak in pattern.peaks() {
        for hkl in &peak.hkls {
            let mate = hkl.map(|x| -x);
            assert!(
                peak.hkls.contains(&mate),
                "{:?} and {:?} split at {:.4}°",
                hkl,
                mate,
                peak.two_theta
            );
        }
    }
}

#[test]
fn fractional_occupancy_matches_virtual_atom() {
    // 两个半占据的 Cu 叠在同一位置，等价于一个完全占据的 Cu
    let lattice = Lattice::cubic(3.61);
    let split = Structure::new(
        lattice.clone(),
        vec![
            Site::new("Cu", [0.0, 0.0, 0.0]).with_occupancy(0.5),
            Site::new("Cu", [0.0, 0.0, 0.0]).with_occupancy(0.5),
        ],
    );
    let whole = Structure::new(lattice, vec![Site::new("Cu", [0.0, 0.0, 0.0])]);

    let a = calculate_pattern(&split, "CuKa", (20.0, 100.0), false).unwrap();
    let b = calculate_pattern(&whole, "CuKa", (20.0, 100.0), false).unwrap();

    assert_eq!(a.two_thetas(), b.two_thetas());
    for (x, y) in a.intensities().iter().zip(b.intensities()) {
        assert!((x - y).abs() < 1e-9 * y);
    }
}

#[test]
fn zero_merge_tolerance_is_rejected() {
    // 容差为 0 时相同 2θ 的 Friedel 对会拆成两个峰
    let err = XrdCalculator::new("CuKa")
        .with_merge_tolerance(0.0)
        .calculate(&rock_salt_primitive(), 5.0, 60.0, true)
        .unwrap_err();
    assert!(matches!(err, XrdError::InvalidArgument(_)));
}

#[test]
fn lanthanide_and_actinide_oxides() {
    for metal in ["Nd", "Hf", "Ta", "Th"] {
        let structure = Structure::new(
            Lattice::from_vectors([[0.0, 2.7, 2.7], [2.7, 0.0, 2.7], [2.7, 2.7, 0.0]]),
            vec![
                Site::new(metal, [0.0, 0.0, 0.0]),
                Site::new("O", [0.25, 0.25, 0.25]),
                Site::new("O", [0.75, 0.75, 0.75]),
            ],
        );
        let pattern = calculate_pattern(&structure, "CuKa", (10.0, 80.0), true).unwrap();
        assert!(!pattern.is_empty(), "{}O2 gave no peaks", metal);
    }
}

#[test]
fn non_finite_position_is_rejected() {
    let structure = Structure::new(
        Lattice::cubic(4.0),
        vec![Site::new("Cu", [0.0, f64::NAN, 0.0])],
    );
    assert!(matches!(
        calculate_pattern(&structure, "CuKa", (5.0, 60.0), true),
        Err(XrdError::InvalidArgument(_))
    ));
}

#[test]
fn unknown_wavelength_name() {
    let err = calculate_pattern(&rock_salt_primitive(), "Unobtainium", (5.0, 60.0), true).unwrap_err();
    assert!(matches!(err, XrdError::UnknownWavelength { .. }));
}

#[test]
fn negative_wavelength() {
    let err = calculate_pattern(&rock_salt_primitive(), -1.0, (5.0, 60.0), true).unwrap_err();
    assert_eq!(err, XrdError::InvalidWavelength(-1.0));
    assert!(matches!(
        Radiation::Angstrom(-1.0).resolve(),
        Err(XrdError::InvalidWavelength(_))
    ));
}

#[test]
fn unsupported_element() {
    let structure = Structure::new(
        Lattice::cubic(4.0),
        vec![
            Site::new("Na", [0.0, 0.0, 0.0]),
            Site::new("Unobtainium", [0.5, 0.5, 0.5]),
        ],
    );
    let err = calculate_pattern(&structure, "CuKa", (5.0, 60.0), true).unwrap_err();
    assert!(matches!(err, XrdError::UnsupportedElement { ref element } if element == "Unobtainium"));
}

#[test]
fn inverted_range() {
    let err = calculate_pattern(&rock_salt_primitive(), "CuKa", (50.0, 10.0), true).unwrap_err();
    assert_eq!(err, XrdError::InvalidRange { min: 50.0, max: 10.0 });
}

#[rstest]
#[case(0.0, 60.0)]
#[case(-5.0, 60.0)]
#[case(10.0, 180.0)]
#[case(10.0, 200.0)]
fn out_of_domain_range(#[case] min: f64, #[case] max: f64) {
    assert!(matches!(
        calculate_pattern(&rock_salt_primitive(), "CuKa", (min, max), true),
        Err(XrdError::InvalidRange { .. })
    ));
}

#[test]
fn empty_structure() {
    let structure = Structure::new(Lattice::cubic(4.0), vec![]);
    let err = calculate_pattern(&structure, "CuKa", (5.0, 60.0), true).unwrap_err();
    assert_eq!(err, XrdError::EmptyStructure);
}

#[test]
fn failed_call_does_not_disturb_later_calls() {
    let structure = rock_salt_primitive();
    let before = calculate_pattern(&structure, "CuKa", (5.0, 60.0), true).unwrap();

    let bad = Structure::new(Lattice::cubic(4.0), vec![Site::new("Xx", [0.0, 0.0, 0.0])]);
    assert!(calculate_pattern(&bad, "CuKa", (5.0, 60.0), true).is_err());
    assert!(calculate_pattern(&structure, "Unobtainium", (5.0, 60.0), true).is_err());

    let after = calculate_pattern(&structure, "CuKa", (5.0, 60.0), true).unwrap();
    assert_eq!(before, after);
}
