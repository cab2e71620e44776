use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use rstest::rstest;
use tuner_core::runner::{RunParams, run, run_with};
use tuner_core::{Gains, Tuner, TunerError, TuningMode};
use tuner_sim::{
    PidController, Plant, RecordingSink, ScriptedSource, SetpointProfile, SimFault, SimulatedAxis,
};
use tuner_traits::clock::ManualClock;

fn tuner() -> Tuner {
    let mut t = Tuner::new(0.1, Gains::new(1.0, 0.5, 0.1), 1.0, 1.0).unwrap();
    t.set_history_size(20);
    t
}

fn axis() -> SimulatedAxis {
    SimulatedAxis::new(
        Plant::new(1.0, 0.5, 0.0),
        PidController::new(1.0, 0.5, 0.1).with_output_limit(50.0),
        SetpointProfile::Square {
            amplitude: 1.0,
            offset: 0.0,
            period_s: 8.0,
            dt_s: 0.1,
        },
        0.1,
    )
}

#[rstest]
#[case(1, 40)]
#[case(3, 13)]
#[case(7, 5)]
fn gains_are_pushed_every_n_ticks(#[case] apply_every: u64, #[case] expected: usize) {
    let mut t = tuner();
    let mut src = ScriptedSource::from_pairs(vec![(1.0, 0.5); 40]);
    let mut sink = RecordingSink::new();
    let params = RunParams {
        ticks: 40,
        apply_every,
        ..RunParams::default()
    };
    let summary = run(&mut src, &mut sink, &mut t, &params, &AtomicBool::new(false)).unwrap();
    assert_eq!(sink.applied.len(), expected);
    assert_eq!(summary.gains_applied, expected as u64);
    assert_eq!(summary.ticks, 40);
    if 40 % apply_every == 0 {
        let g = summary.gains;
        assert_eq!(sink.last(), Some((g.kp, g.ki, g.kd)));
    }
}

#[rstest]
fn delayed_start_and_summary() {
    let mut t = tuner();
    let mut src = ScriptedSource::from_pairs(vec![(1.0, 2.0); 30]);
    let mut sink = RecordingSink::new();
    let mut modes = Vec::new();
    let params = RunParams {
        ticks: 30,
        start_tuning_after: Some(15),
        ..RunParams::default()
    };
    let summary = run_with(
        &mut src,
        &mut sink,
        &mut t,
        &params,
        &AtomicBool::new(false),
        &ManualClock::new(),
        |rec| modes.push((rec.tick, rec.mode)),
    )
    .unwrap();
    assert_eq!(modes.len(), 30);
    assert_eq!(modes[14], (14, TuningMode::Idle));
    // 15 idle samples already satisfy min_data (10): active on the first requested tick
    assert_eq!(modes[15], (15, TuningMode::Active));
    assert_eq!(summary.mode, TuningMode::Active);
    assert!(summary.gains.ki < 0.5);
    assert_eq!(summary.model_output, t.reference_model_output());
}

#[rstest]
fn never_started_run_keeps_gains() {
    let mut t = tuner();
    let mut src = ScriptedSource::from_pairs(vec![(1.0, 3.0); 25]);
    let mut sink = RecordingSink::new();
    let params = RunParams {
        ticks: 25,
        start_tuning_after: None,
        ..RunParams::default()
    };
    let summary = run(&mut src, &mut sink, &mut t, &params, &AtomicBool::new(false)).unwrap();
    assert_eq!(summary.gains, Gains::new(1.0, 0.5, 0.1));
    assert_eq!(summary.mode, TuningMode::Idle);
}

#[rstest]
fn shutdown_flag_interrupts() {
    let mut t = tuner();
    let mut src = ScriptedSource::from_pairs(vec![(1.0, 0.0); 100]);
    let mut sink = RecordingSink::new();
    let stop = AtomicBool::new(false);
    let mut seen = 0;
    let err = run_with(
        &mut src,
        &mut sink,
        &mut t,
        &RunParams {
            ticks: 100,
            ..RunParams::default()
        },
        &stop,
        &ManualClock::new(),
        |rec| {
            seen += 1;
            if rec.tick == 4 {
                stop.store(true, Ordering::Relaxed);
            }
        },
    )
    .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<TunerError>(),
        Some(TunerError::Interrupted)
    ));
    assert_eq!(seen, 5);
}

#[rstest]
fn source_timeout_is_typed() {
    let a = axis().with_fault(SimFault::TimeoutAt(7));
    let (mut src, mut sink) = a.split();
    let mut t = tuner();
    let err = run(
        &mut src,
        &mut sink,
        &mut t,
        &RunParams {
            ticks: 50,
            ..RunParams::default()
        },
        &AtomicBool::new(false),
    )
    .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<TunerError>(),
        Some(TunerError::Timeout)
    ));
    assert!(format!("{err}").contains("tick 7"));
}

#[rstest]
fn exhausted_source_maps_to_source_error() {
    let mut src = ScriptedSource::from_pairs(vec![(1.0, 0.0); 3]);
    let mut sink = RecordingSink::new();
    let mut t = tuner();
    let err = run(
        &mut src,
        &mut sink,
        &mut t,
        &RunParams {
            ticks: 10,
            ..RunParams::default()
        },
        &AtomicBool::new(false),
    )
    .unwrap_err();
    match err.downcast_ref::<TunerError>() {
        Some(TunerError::Source(msg)) => assert!(msg.contains("exhausted")),
        other => panic!("expected Source, got {other:?}"),
    }
}

#[rstest]
fn sink_fault_maps_to_sink_error() {
    let a = axis().with_fault(SimFault::SinkFaultAt(2));
    let (mut src, mut sink) = a.split();
    let mut t = tuner();
    let err = run(
        &mut src,
        &mut sink,
        &mut t,
        &RunParams {
            ticks: 20,
            ..RunParams::default()
        },
        &AtomicBool::new(false),
    )
    .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<TunerError>(),
        Some(TunerError::Sink(_))
    ));
    assert_eq!(a.ticks(), 3);
}

#[rstest]
fn paced_run_advances_virtual_clock() {
    let mut src = ScriptedSource::from_pairs(vec![(1.0, 0.0); 12]);
    let mut sink = RecordingSink::new();
    let mut t = tuner();
    let clock = ManualClock::new();
    run_with(
        &mut src,
        &mut sink,
        &mut t,
        &RunParams {
            ticks: 12,
            pace: true,
            ..RunParams::default()
        },
        &AtomicBool::new(false),
        &clock,
        |_| {},
    )
    .unwrap();
    assert_eq!(clock.elapsed(), Duration::from_millis(1200));
}

#[rstest]
fn rejected_samples_are_reported() {
    let mut src = ScriptedSource::from_pairs([
        (1.0, 0.0),
        (f64::NAN, 0.0),
        (1.0, f64::INFINITY),
        (1.0, 0.0),
    ]);
    let mut sink = RecordingSink::new();
    let mut t = tuner();
    let summary = run(
        &mut src,
        &mut sink,
        &mut t,
        &RunParams {
            ticks: 4,
            ..RunParams::default()
        },
        &AtomicBool::new(false),
    )
    .unwrap();
    assert_eq!(summary.rejected_samples, 2);
    assert_eq!(t.history().len(), 2);
}
