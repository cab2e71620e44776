use std::time::Duration;

use rstest::rstest;
use tuner_sim::{RecordingSink, ScriptedSource, SimError};
use tuner_traits::{GainSink, Measurement, MeasurementSource};

#[rstest]
fn scripted_source_replays_then_exhausts() {
    let mut src = ScriptedSource::from_pairs([(1.0, 0.1), (1.0, 0.2)]);
    assert_eq!(src.remaining(), 2);
    let a = src.sample(Duration::ZERO).unwrap();
    let b = src.sample(Duration::ZERO).unwrap();
    assert_eq!(a, Measurement::new(1.0, 0.1));
    assert_eq!(b.plant_output, 0.2);

    let err = src.sample(Duration::ZERO).unwrap_err();
    match err.downcast_ref::<SimError>() {
        Some(SimError::Exhausted(n)) => assert_eq!(*n, 2),
        other => panic!("unexpected {other:?}"),
    }
}

#[rstest]
fn scripted_errors_surface_in_order() {
    let mut src = ScriptedSource::from_results([
        Ok(Measurement::new(0.0, 0.0)),
        Err(SimError::Timeout),
    ]);
    assert!(src.sample(Duration::ZERO).is_ok());
    let err = src.sample(Duration::ZERO).unwrap_err();
    assert!(err.to_string().contains("timeout"));
}

#[rstest]
fn recording_sink_keeps_history() {
    let mut sink = RecordingSink::new();
    assert_eq!(sink.last(), None);
    sink.apply_gains(1.0, 2.0, 3.0).unwrap();
    sink.apply_gains(4.0, 5.0, 6.0).unwrap();
    assert_eq!(sink.applied.len(), 2);
    assert_eq!(sink.last(), Some((4.0, 5.0, 6.0)));
}
