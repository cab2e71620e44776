use tuner_core::{Gains, ReferenceModel, ReferenceModelParams, Tuner};

#[test]
fn critically_damped_step_converges_without_overshoot() {
    let mut m = ReferenceModel::new(0.1, ReferenceModelParams::new(1.0, 1.0));
    let mut prev = 0.0;
    for _ in 0..400 {
        let y = m.advance(1.0);
        assert!(y >= prev, "not monotone: {y} < {prev}");
        assert!(y <= 1.0, "overshoot: {y}");
        prev = y;
    }
    assert!((prev - 1.0).abs() < 1e-6, "final = {prev}");
}

#[test]
fn tuner_output_follows_model_and_ignores_plant() {
    let mut t = Tuner::new(0.1, Gains::new(1.0, 0.0, 0.0), 1.0, 1.0).unwrap();
    let mut m = ReferenceModel::new(0.1, ReferenceModelParams::new(1.0, 1.0));
    for i in 0..100 {
        let plant = (i as f64).sin() * 10.0;
        t.process_measurement(1.0, plant);
        assert_eq!(t.reference_model_output(), m.advance(1.0));
    }
}

#[test]
fn parameter_change_applies_from_next_tick() {
    let mut t = Tuner::new(0.1, Gains::new(1.0, 0.0, 0.0), 1.0, 1.0).unwrap();
    let mut m = ReferenceModel::new(0.1, ReferenceModelParams::new(1.0, 1.0));
    for _ in 0..10 {
        t.process_measurement(1.0, 0.0);
        m.advance(1.0);
    }
    t.set_reference_model_params(4.0, 0.6);
    m.set_params(4.0, 0.6);
    for _ in 0..10 {
        t.process_measurement(1.0, 0.0);
        assert_eq!(t.reference_model_output(), m.advance(1.0));
    }
}

#[test]
fn reset_returns_model_to_rest() {
    let mut t = Tuner::new(0.1, Gains::new(1.0, 0.0, 0.0), 2.0, 0.7).unwrap();
    for _ in 0..25 {
        t.process_measurement(3.0, 0.0);
    }
    assert!(t.reference_model_output() > 0.0);
    t.reset();
    assert_eq!(t.reference_model_output(), 0.0);
    assert_eq!(t.reference_model().velocity(), 0.0);
}
