//! Tuner driving a simulated axis through the runner.

use std::sync::atomic::AtomicBool;

use tuner_core::runner::{RunParams, run};
use tuner_core::{GainLimits, Gains, Tuner, TuningMode};
use tuner_sim::{PidController, Plant, SetpointProfile, SimulatedAxis};

#[test]
fn tuned_gains_reach_the_controller_and_stay_bounded() {
    let initial = Gains::new(2.0, 0.5, 0.05);
    let limits = GainLimits::new(0.1, 5.0, 0.0, 2.0, 0.0, 1.0);
    let mut tuner = Tuner::builder()
        .with_dt(0.1)
        .with_initial_gains(initial)
        .with_limits(limits)
        .build()
        .unwrap();
    tuner.set_history_size(40);

    let axis = SimulatedAxis::new(
        Plant::new(1.0, 0.8, 0.2),
        PidController::new(initial.kp, initial.ki, initial.kd).with_output_limit(20.0),
        SetpointProfile::Square {
            amplitude: 1.0,
            offset: 0.0,
            period_s: 20.0,
            dt_s: 0.1,
        },
        0.1,
    );
    let (mut src, mut sink) = axis.split();

    let params = RunParams {
        ticks: 2000,
        apply_every: 10,
        start_tuning_after: Some(50),
        ..RunParams::default()
    };
    let summary = run(&mut src, &mut sink, &mut tuner, &params, &AtomicBool::new(false)).unwrap();

    assert_eq!(summary.mode, TuningMode::Active);
    assert!(summary.gains.is_finite());
    assert!(limits.contains(&summary.gains));
    assert_ne!(summary.gains, initial);
    // 2000 is a multiple of apply_every, so the controller holds the final gains
    let g = summary.gains;
    assert_eq!(axis.controller_gains(), (g.kp, g.ki, g.kd));
    assert!(axis.plant_output().is_finite());
}
