//! End-to-end behaviour of the adaptation rules through the public API.

use tuner_core::{Gains, ReferenceModel, ReferenceModelParams, Tuner};

const DT: f64 = 0.1;

fn tuner(initial: Gains) -> Tuner {
    let mut t = Tuner::new(DT, initial, 1.0, 1.0).unwrap();
    t.set_history_size(20);
    assert_eq!(t.adaptation_cfg().min_data_for_tuning, 10);
    t
}

/// Drive `t` with a plant that sits `offset(tick)` away from the model output.
fn drive_around_model(
    t: &mut Tuner,
    ticks: usize,
    offset: impl Fn(usize) -> f64,
    mut each: impl FnMut(&Tuner),
) {
    let mut mirror = ReferenceModel::new(DT, ReferenceModelParams::new(1.0, 1.0));
    for i in 0..ticks {
        let y_m = mirror.advance(1.0);
        t.process_measurement(1.0, y_m + offset(i));
        assert_eq!(t.reference_model_output(), y_m);
        each(t);
    }
}

#[test]
fn persistent_positive_bias_lowers_ki() {
    let mut t = tuner(Gains::new(1.0, 0.5, 0.1));
    t.start_active_tuning();
    let mut prev_ki = t.adapted_gains().ki;
    let mut active_ticks = 0;
    for _ in 0..60 {
        t.process_measurement(1.0, 2.0);
        let ki = t.adapted_gains().ki;
        if t.is_actively_tuning() {
            active_ticks += 1;
            assert!(ki < prev_ki, "ki must strictly decrease: {ki} !< {prev_ki}");
        } else {
            assert_eq!(ki, prev_ki);
        }
        prev_ki = ki;
    }
    assert_eq!(active_ticks, 51);
    assert!((t.adapted_gains().ki - (0.5 - 51.0 * 0.001)).abs() < 1e-9);
}

#[test]
fn plant_below_model_raises_ki() {
    let mut t = tuner(Gains::new(1.0, 0.5, 0.1));
    t.start_active_tuning();
    for _ in 0..30 {
        t.process_measurement(1.0, -1.0);
    }
    assert!(t.adapted_gains().ki > 0.5);
}

#[test]
fn oscillation_lowers_kp_and_raises_kd() {
    let mut t = tuner(Gains::new(1.0, 0.5, 0.1));
    t.start_active_tuning();
    drive_around_model(&mut t, 60, |i| if i % 2 == 0 { 0.5 } else { -0.5 }, |_| {});
    let g = t.adapted_gains();
    assert!(g.kp < 1.0, "kp = {}", g.kp);
    assert!(g.kd > 0.1, "kd = {}", g.kd);
    let adj = t.last_adjustment().unwrap();
    assert!(adj.stats.oscillations > 2);
}

#[test]
fn pinned_kp_never_moves_under_oscillation() {
    let mut t = tuner(Gains::new(5.0, 0.5, 0.1));
    t.set_gain_limits(5.0, 5.0, 0.0, 100.0, 0.0, 100.0);
    t.start_active_tuning();
    drive_around_model(
        &mut t,
        60,
        |i| if i % 2 == 0 { 0.5 } else { -0.5 },
        |t| assert_eq!(t.adapted_gains().kp, 5.0),
    );
    assert!(t.adapted_gains().kd > 0.1);
}

#[test]
fn nan_limit_keeps_previous_bound() {
    let mut t = tuner(Gains::new(1.0, 0.5, 0.1));
    t.set_gain_limits(f64::NAN, 5.0, 0.0, 100.0, 0.0, f64::NAN);
    let limits = *t.gain_limits();
    assert_eq!((limits.kp.min(), limits.kp.max()), (0.0, 5.0));
    assert_eq!((limits.kd.min(), limits.kd.max()), (0.0, 100.0));

    t.start_active_tuning();
    drive_around_model(
        &mut t,
        400,
        |i| if i % 2 == 0 { 3.0 } else { -3.0 },
        |t| assert!(t.gain_limits().contains(&t.adapted_gains())),
    );
    assert_eq!(t.adapted_gains().kp, 0.0);
}

#[test]
fn idle_tuner_never_touches_gains() {
    let initial = Gains::new(2.0, 0.3, 0.05);
    let mut t = Tuner::new(DT, initial, 1.0, 1.0).unwrap();
    let mut outputs = Vec::with_capacity(1000);
    for i in 0..1000 {
        let plant = if i % 2 == 0 { 3.0 } else { -3.0 };
        t.process_measurement(1.0, plant);
        assert_eq!(t.adapted_gains(), initial);
        outputs.push(t.reference_model_output());
    }
    assert!(!t.is_actively_tuning());
    assert!(t.last_adjustment().is_none());
    assert!(outputs.windows(2).any(|w| w[0] != w[1]));
    assert!((t.reference_model_output() - 1.0).abs() < 1e-6);
}

#[test]
fn zero_aggressiveness_freezes_gains_while_active() {
    let initial = Gains::new(1.0, 0.5, 0.1);
    let mut t = tuner(initial);
    t.set_adaptation_aggressiveness(0.0);
    t.start_active_tuning();
    for _ in 0..40 {
        t.process_measurement(1.0, 4.0);
    }
    assert!(t.is_actively_tuning());
    assert_eq!(t.adapted_gains(), initial);
}

#[test]
fn sluggish_plant_gets_more_kp() {
    // Quiet, steady lag behind the model: small spread, no sign changes.
    let mut t = tuner(Gains::new(1.0, 0.5, 0.1));
    t.start_active_tuning();
    drive_around_model(&mut t, 30, |_| -0.2, |_| {});
    let adj = t.last_adjustment().unwrap();
    assert_eq!(adj.dynamics, tuner_core::DynamicsRule::Sluggish);
    assert!(t.adapted_gains().kp > 1.0);
}
