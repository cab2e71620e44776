use std::fs::File;
use std::io::Write;

use rstest::rstest;
use tempfile::tempdir;
use tuner_config::{ProfilePoint, load_profile_csv};

fn write_csv(contents: &str) -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempdir().unwrap();
    let path = dir.path().join("profile.csv");
    let mut f = File::create(&path).unwrap();
    f.write_all(contents.as_bytes()).unwrap();
    (dir, path)
}

#[rstest]
fn loads_points_in_order() {
    let (_dir, path) = write_csv("tick,setpoint\n0,0.0\n50,1.5\n300,-0.5\n");
    let pts = load_profile_csv(&path).unwrap();
    assert_eq!(
        pts,
        vec![
            ProfilePoint { tick: 0, setpoint: 0.0 },
            ProfilePoint { tick: 50, setpoint: 1.5 },
            ProfilePoint { tick: 300, setpoint: -0.5 },
        ]
    );
}

#[rstest]
fn tolerates_whitespace_around_fields() {
    let (_dir, path) = write_csv("tick, setpoint\n0, 2.0\n");
    let pts = load_profile_csv(&path).unwrap();
    assert_eq!(pts[0].setpoint, 2.0);
}

#[rstest]
#[case("time,value\n0,1.0\n", "headers 'tick,setpoint'")]
#[case("tick,setpoint\n", "no rows")]
#[case("tick,setpoint\n0,1.0\n0,2.0\n", "strictly increasing")]
#[case("tick,setpoint\n10,1.0\n5,2.0\n", "strictly increasing")]
#[case("tick,setpoint\n0,abc\n", "invalid CSV row 2")]
#[case("tick,setpoint\n0,inf\n", "non-finite setpoint")]
fn rejects_malformed_profiles(#[case] csv: &str, #[case] msg: &str) {
    let (_dir, path) = write_csv(csv);
    let err = load_profile_csv(&path).unwrap_err();
    assert!(format!("{err}").contains(msg), "got: {err}");
}

#[test]
fn missing_file_is_reported() {
    let dir = tempdir().unwrap();
    let err = load_profile_csv(&dir.path().join("absent.csv")).unwrap_err();
    assert!(format!("{err}").contains("open profile CSV"));
}
