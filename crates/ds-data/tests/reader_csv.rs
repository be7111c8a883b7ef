use std::fs;

use ds_data::{DataReader, SubjectRange};

const HEADER: &str = "subj_id,exp_type,trial_no,reward_left,reward_right,t,x,y\n";

fn write_dataset(dir: &tempfile::TempDir, body: &str) -> std::path::PathBuf {
    let path = dir.path().join("data.csv");
    fs::write(&path, format!("{HEADER}{body}")).expect("write csv");
    path
}

#[test]
fn reads_rows_in_file_order() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let path = write_dataset(
        &dir,
        "20,20,1,20,5,0.0,0.0,0.0\n20,20,1,20,5,0.1, 0.1 ,0.2\n",
    );
    let table = DataReader::new(&path).read_data().expect("read");
    assert_eq!(table.len(), 2);
    assert_eq!(table.records[1].x, 0.1);
    assert_eq!(table.records[0].rewards_sum(), 25.0);
    assert_eq!(table.source.as_deref(), Some(path.as_path()));
    assert_eq!(table.input_hash.len(), 64);
}

#[test]
fn extra_columns_are_ignored() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let path = dir.path().join("wide.csv");
    fs::write(
        &path,
        "subj_id,exp_type,trial_no,reward_left,reward_right,t,x,y,comment\n1,20,1,5,5,0,0,0,ok\n",
    )
    .expect("write csv");
    let table = DataReader::new(&path).read_data().expect("read");
    assert_eq!(table.len(), 1);
}

#[test]
fn missing_file_reports_path() {
    let err = DataReader::new("/definitely/not/here.csv")
        .read_data()
        .expect_err("missing file");
    assert_eq!(err.code(), "data-open");
    assert_eq!(err.info().context["path"], "/definitely/not/here.csv");
}

#[test]
fn malformed_row_reports_line() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let path = write_dataset(&dir, "20,20,1,20,5,0.0,0.0,0.0\n20,20,1,20,5,zero,0.0,0.0\n");
    let err = DataReader::new(&path).read_data().expect_err("bad row");
    assert_eq!(err.code(), "data-parse");
    assert_eq!(err.info().context["row"], "3");
}

#[test]
fn non_finite_positions_are_rejected() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let path = write_dataset(&dir, "20,20,1,20,5,0.0,NaN,0.0\n");
    let err = DataReader::new(&path).read_data().expect_err("nan row");
    assert_eq!(err.code(), "data-parse");
}

#[test]
fn header_only_file_is_empty() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let path = write_dataset(&dir, "");
    let err = DataReader::new(&path).read_data().expect_err("empty");
    assert_eq!(err.code(), "data-empty");
}

#[test]
fn reader_pipeline_appends_derivatives() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let path = write_dataset(
        &dir,
        "20,20,1,20,5,0.0,0.0,0.0\n20,20,1,20,5,0.5,1.0,0.5\n20,20,1,20,5,1.0,2.0,1.0\n",
    );
    let reader = DataReader::new(&path);
    let raw = reader.read_data().expect("read");
    let (subjects, table) = reader
        .preprocess_data(&raw, 20, 25.0, SubjectRange::default())
        .expect("preprocess");
    assert_eq!(subjects, vec![20]);
    let table = reader.append_derivatives(table).expect("derivatives");
    assert!(table.has_derivatives());
    let d = table.trajectories[0].samples[1].derivatives.expect("derived");
    assert!((d.vx - 2.0).abs() < 1e-12);
    assert!((d.vy - 1.0).abs() < 1e-12);
}
