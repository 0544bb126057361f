//! End-to-end readings of the chart through the public API.

use vc_core::ExactDecimal;
use vc_engine::{Calculator, CorrectionFactors, HRatio, flags};
use vc_units::{DensityUnit, FlowrateUnit, HeadUnit, Parameters, Units, ViscosityUnit};

fn base(flowrate: f64, head: f64, viscosity: f64) -> CorrectionFactors {
    Calculator::default().calculate_base(&Parameters::from_f64(flowrate, head, viscosity))
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-6
}

#[test]
fn reference_operating_point() {
    let f = base(100.0, 100.0, 100.0);
    assert_eq!(f.error_flag, 0);
    assert!((f.q - 0.98).abs() <= 0.01, "q = {}", f.q);
    assert!((f.eta - 0.75).abs() <= 0.01, "eta = {}", f.eta);
    assert!((f.h_for(HRatio::H06) - 0.97).abs() <= 0.01, "h0.6 = {}", f.h[0]);
    // head correction shrinks as the operating point moves right
    assert!(f.h.windows(2).all(|w| w[1] < w[0]));
}

#[test]
fn chart_readings() {
    // (flow m³/h, head m, viscosity mm²/s) -> (q, eta, h0.6)
    let cases = [
        ((6.0, 5.0, 10.0), (1.0, 0.907_53, 0.999_77)),
        ((2000.0, 200.0, 4000.0), (0.609_41, 0.160_06, 0.792_33)),
        ((50.0, 30.0, 500.0), (0.517_19, 0.0, 0.742_73)),
        ((300.0, 60.0, 200.0), (0.995_48, 0.800_07, 0.986_07)),
        ((100.0, 100.0, 10.0), (1.0, 1.0, 1.0)),
        ((100.0, 100.0, 4000.0), (0.0, 0.0, 0.0)),
    ];
    for ((q_in, h_in, v_in), (q, eta, h0)) in cases {
        let f = base(q_in, h_in, v_in);
        assert!(f.is_ok(), "{q_in}/{h_in}/{v_in}: flag {}", f.error_flag);
        assert!((f.q - q).abs() < 1e-4, "{q_in}/{h_in}/{v_in}: q = {}", f.q);
        assert!((f.eta - eta).abs() < 1e-4, "{q_in}/{h_in}/{v_in}: eta = {}", f.eta);
        assert!((f.h[0] - h0).abs() < 1e-4, "{q_in}/{h_in}/{v_in}: h0.6 = {}", f.h[0]);
    }
}

#[test]
fn range_failures_zero_everything() {
    let cases = [
        ((5.0, 50.0, 100.0), flags::FLOWRATE),
        ((2001.0, 50.0, 100.0), flags::FLOWRATE),
        ((100.0, 4.0, 100.0), flags::TOTAL_HEAD),
        ((100.0, 100.0, 4001.0), flags::VISCOSITY),
        ((1.0, 1.0, 1.0), flags::FLOWRATE | flags::TOTAL_HEAD | flags::VISCOSITY),
    ];
    for ((q, h, v), flag) in cases {
        assert_eq!(base(q, h, v), CorrectionFactors::failed(flag));
    }
}

#[test]
fn decimal_text_inputs_with_units() {
    // 440.3 gpm ≈ 100 m³/h, 328.084 ft ≈ 100 m, 90 cP at 0.9 kg/l = 100 mm²/s
    let params = Parameters::new(
        ExactDecimal::parse("440.28618602091359"),
        ExactDecimal::parse("328.0839895013123"),
        ExactDecimal::parse("90"),
    )
    .with_density(ExactDecimal::parse("900"));
    let units = Units {
        flowrate: FlowrateUnit::GallonsPerMinute,
        head: HeadUnit::Feet,
        viscosity: ViscosityUnit::Centipoise,
        density: DensityUnit::KilogramsPerCubicMeter,
    };
    let converted = Calculator::default().calculate(&params, &units);
    let reference = base(100.0, 100.0, 100.0);
    assert!(converted.is_ok());
    assert!(close(converted.q, reference.q));
    assert!(close(converted.eta, reference.eta));
    for (a, b) in converted.h.iter().zip(reference.h) {
        assert!(close(*a, b));
    }
}

#[test]
fn repeated_calls_are_identical() {
    let calc = Calculator::default();
    let params = Parameters::from_f64(123.4, 56.7, 890.1);
    let first = calc.calculate(&params, &Units::default());
    for _ in 0..10 {
        assert_eq!(calc.calculate(&params, &Units::default()), first);
    }
}

#[test]
fn calculator_is_shareable_across_threads() {
    let calc = std::sync::Arc::new(Calculator::default());
    let expected = calc.calculate_base(&Parameters::from_f64(100.0, 100.0, 100.0));
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let calc = calc.clone();
            std::thread::spawn(move || calc.calculate_base(&Parameters::from_f64(100.0, 100.0, 100.0)))
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected);
    }
}
