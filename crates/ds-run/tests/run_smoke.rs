use std::path::Path;

use ds_data::{synthesise, write_csv, RawRecord, RawTable, SubjectRange, SynthSpec};
use ds_plot::Colormap;
use ds_run::{
    run_analysis, run_analysis_from_path, summarize, AnalysisConfig, RunMeta, META_FILE,
    REPORT_FILE,
};
use ds_space::GridSpec;

fn write_dataset(dir: &Path) {
    let spec = SynthSpec {
        subjects: SubjectRange::new(18, 25).expect("range"),
        trials_per_condition: 3,
        samples_per_trial: 40,
        ..SynthSpec::with_seed(42)
    };
    write_csv(&synthesise(&spec), &dir.join("trajectories.csv")).expect("write csv");
}

fn small_config(dir: &Path) -> AnalysisConfig {
    let mut config = AnalysisConfig {
        grid: GridSpec::with_bins(6, 6),
        base_dir: dir.to_path_buf(),
        ..AnalysisConfig::default()
    };
    config.plots.style.width = 480;
    config.plots.style.height = 360;
    config
}

#[test]
fn default_run_writes_two_plots_and_report() {
    let data = tempfile::tempdir().expect("tmp dir");
    write_dataset(data.path());
    let out = tempfile::tempdir().expect("out dir");
    let report = run_analysis(&small_config(data.path()), out.path()).expect("run");

    assert_eq!(report.plots, vec!["ds_row_wise.svg", "ds_cell_wise.svg"]);
    for plot in &report.plots {
        let svg = std::fs::read_to_string(out.path().join(plot)).expect("svg");
        assert!(svg.contains("<svg"));
    }
    assert!(out.path().join("ds_row_wise.json").exists());
    assert!(out.path().join("ds_cell_wise.json").exists());
    assert!(!out.path().join("ds_difference.svg").exists());

    assert_eq!(report.exp_type, 20);
    assert_eq!(report.rewards_sum, 25.0);
    assert_eq!(report.subject_ids, (18..=25).collect::<Vec<_>>());
    assert_eq!(report.trajectories, 24);
    assert_eq!(report.samples, 24 * 40);
    assert_eq!(report.grid.shape(), (6, 6));
    assert_eq!(report.row_wise.defined_cells, report.cell_wise.defined_cells);
    assert!(report.comparison.co_defined > 0);

    let read_back = summarize(out.path()).expect("summarize");
    assert_eq!(read_back.config_hash, report.config_hash);
    assert_eq!(read_back.subject_ids, report.subject_ids);
    assert_eq!(read_back.plots, report.plots);
    assert_eq!(read_back.provenance, report.provenance);
    assert_eq!(read_back.cell_wise.defined_cells, report.cell_wise.defined_cells);
}

#[test]
fn difference_plot_is_optional() {
    let data = tempfile::tempdir().expect("tmp dir");
    write_dataset(data.path());
    let out = tempfile::tempdir().expect("out dir");
    let mut config = small_config(data.path());
    config.plots.difference = Some(Colormap::Cool);
    config.outputs.write_surfaces = false;

    let report = run_analysis(&config, out.path()).expect("run");
    assert_eq!(report.plots.len(), 3);
    assert!(out.path().join("ds_difference.svg").exists());
    assert!(!out.path().join("ds_row_wise.json").exists());
}

#[test]
fn relative_data_path_resolves_against_config_dir() {
    let dir = tempfile::tempdir().expect("tmp dir");
    write_dataset(dir.path());
    let config_path = dir.path().join("analysis.yaml");
    std::fs::write(
        &config_path,
        "data:\n  path: trajectories.csv\ngrid:\n  x_bins: 6\n  y_bins: 6\nplots:\n  style:\n    width: 400\n    height: 300\n",
    )
    .expect("write config");

    let out = dir.path().join("out");
    let report = run_analysis_from_path(&config_path, &out).expect("run");
    assert!(out.join(REPORT_FILE).exists());
    assert_eq!(report.plots.len(), 2);
}

#[test]
fn empty_selection_is_an_error() {
    let data = tempfile::tempdir().expect("tmp dir");
    write_dataset(data.path());
    let out = tempfile::tempdir().expect("out dir");
    let mut config = small_config(data.path());
    config.selection.exp_type = 30;

    let err = run_analysis(&config, out.path()).expect_err("nothing selected");
    assert_eq!(err.code(), "data-no-trials");
    assert!(!out.path().join(REPORT_FILE).exists());
}

#[test]
fn missing_dataset_surfaces_data_error() {
    let data = tempfile::tempdir().expect("tmp dir");
    let out = tempfile::tempdir().expect("out dir");
    let err = run_analysis(&small_config(data.path()), out.path()).expect_err("no csv");
    assert_eq!(err.code(), "data-open");
}

#[test]
fn surfaces_are_byte_identical_across_runs() {
    let data = tempfile::tempdir().expect("tmp dir");
    write_dataset(data.path());
    let config = small_config(data.path());
    let first = tempfile::tempdir().expect("first");
    let second = tempfile::tempdir().expect("second");
    let a = run_analysis(&config, first.path()).expect("first run");
    let b = run_analysis(&config, second.path()).expect("second run");

    for name in ["ds_row_wise.json", "ds_cell_wise.json", REPORT_FILE] {
        let left = std::fs::read(first.path().join(name)).expect("left");
        let right = std::fs::read(second.path().join(name)).expect("right");
        assert_eq!(left, right, "{name} differs between runs");
    }
    assert_eq!(a.config_hash, b.config_hash);
    assert_eq!(a.provenance.input_hash, b.provenance.input_hash);
    assert_eq!(a.comparison, b.comparison);
}

#[test]
fn run_meta_hashes_the_report() {
    let data = tempfile::tempdir().expect("tmp dir");
    write_dataset(data.path());
    let out = tempfile::tempdir().expect("out dir");
    let report = run_analysis(&small_config(data.path()), out.path()).expect("run");

    let bytes = std::fs::read(out.path().join(META_FILE)).expect("meta");
    let meta: RunMeta = serde_json::from_slice(&bytes).expect("parse meta");
    assert_eq!(
        meta.report_hash,
        ds_core::hash::stable_hash_string(&report).expect("hash")
    );
    assert!(!meta.created_at.is_empty());
}

#[test]
fn single_bin_axis_still_plots() {
    let data = tempfile::tempdir().expect("tmp dir");
    write_dataset(data.path());
    let out = tempfile::tempdir().expect("out dir");
    let mut config = small_config(data.path());
    config.grid = GridSpec::with_bins(1, 6);

    let report = run_analysis(&config, out.path()).expect("run");
    assert_eq!(report.grid.shape(), (6, 1));
    assert_eq!(report.plots.len(), 2);
}

#[test]
fn single_trajectory_on_default_grid_completes() {
    let data = tempfile::tempdir().expect("tmp dir");
    let records = (0..30)
        .map(|step| {
            let s = f64::from(step) / 29.0;
            RawRecord {
                subj_id: 18,
                exp_type: 20,
                trial_no: 1,
                reward_left: 20.0,
                reward_right: 5.0,
                t: s,
                x: s,
                y: s,
            }
        })
        .collect();
    write_csv(
        &RawTable::from_records(records),
        &data.path().join("trajectories.csv"),
    )
    .expect("write csv");
    let config = AnalysisConfig {
        base_dir: data.path().to_path_buf(),
        ..AnalysisConfig::default()
    };
    let out = tempfile::tempdir().expect("out dir");

    let report = run_analysis(&config, out.path()).expect("sparse run");
    assert_eq!(report.trajectories, 1);
    assert_eq!(report.plots, vec!["ds_row_wise.svg", "ds_cell_wise.svg"]);
    assert!(out.path().join(REPORT_FILE).exists());
    assert!(out.path().join("ds_cell_wise.json").exists());
}
