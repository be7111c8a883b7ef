use ds_data::{
    append_derivatives, preprocess, synthesise, Derivatives, ProcessedTable, RewardCondition,
    Sample, SubjectRange, SynthSpec, Trajectory, TrajectoryKey, DEFAULT_MIN_SAMPLES,
};
use ds_space::{Aggregation, DecisionSpaceGenerator, FieldColumn, GridSpec, Surface};
use proptest::prelude::*;

fn trajectory(trial_no: u32, samples: Vec<Sample>) -> Trajectory {
    Trajectory {
        key: TrajectoryKey {
            subj_id: 20,
            trial_no,
        },
        exp_type: 20,
        reward_left: 20.0,
        reward_right: 5.0,
        samples,
    }
}

fn fixed_grid(x_bins: usize, y_bins: usize, x_hi: f64) -> GridSpec {
    GridSpec {
        x_bins,
        y_bins,
        x_range: Some([0.0, x_hi]),
        y_range: Some([0.0, 1.0]),
    }
}

/// Trajectory 1 dwells three samples in the left cell, trajectory 2 passes
/// through it once and then moves right.
fn dwell_table() -> ProcessedTable {
    ProcessedTable::new(vec![
        trajectory(
            1,
            vec![
                Sample::new(0.0, 0.5, 0.5),
                Sample::new(1.0, 0.6, 0.5),
                Sample::new(2.0, 0.7, 0.5),
            ],
        ),
        trajectory(
            2,
            vec![Sample::new(4.0, 0.2, 0.5), Sample::new(6.0, 1.5, 0.5)],
        ),
    ])
}

#[test]
fn row_wise_weighs_samples_and_cell_wise_weighs_trajectories() {
    let generator = DecisionSpaceGenerator::new(fixed_grid(2, 1, 2.0), FieldColumn::T);
    let table = dwell_table();

    let rows = generator.generate_ds(&table).expect("row-wise");
    assert_eq!(rows.aggregation, Aggregation::RowWise);
    assert_eq!(rows.field.values, vec![Some(1.75), Some(6.0)]);
    assert_eq!(rows.field.support, vec![4, 1]);

    let cells = generator.generate_ds_cell_wise(&table).expect("cell-wise");
    assert_eq!(cells.aggregation, Aggregation::CellWise);
    assert_eq!(cells.field.values, vec![Some(2.5), Some(6.0)]);
    assert_eq!(cells.field.support, vec![2, 1]);

    assert_eq!(rows.mesh, cells.mesh);
    assert_eq!(rows.mesh.x_centers, vec![0.5, 1.5]);
    assert_eq!(rows.mesh.y_centers, vec![0.5]);
}

#[test]
fn min_support_blanks_thin_cells() {
    let generator =
        DecisionSpaceGenerator::new(fixed_grid(2, 1, 2.0), FieldColumn::T).with_min_support(2);
    let table = dwell_table();
    let rows = generator.generate_ds(&table).expect("row-wise");
    assert_eq!(rows.field.values, vec![Some(1.75), None]);
    assert_eq!(rows.field.support, vec![4, 1]);
    let cells = generator.generate_ds_cell_wise(&table).expect("cell-wise");
    assert_eq!(cells.field.values, vec![Some(2.5), None]);
}

#[test]
fn samples_outside_fixed_bounds_are_skipped() {
    let generator = DecisionSpaceGenerator::new(fixed_grid(1, 1, 1.0), FieldColumn::T);
    let ds = generator.generate_ds(&dwell_table()).expect("row-wise");
    assert_eq!(ds.skipped, 1);
    assert_eq!(ds.field.support, vec![4]);
}

#[test]
fn into_parts_returns_meshgrids() {
    let generator = DecisionSpaceGenerator::new(fixed_grid(2, 1, 2.0), FieldColumn::T);
    let (field, x_grid, y_grid) = generator.generate_ds(&dwell_table()).expect("ds").into_parts();
    assert_eq!(field.shape(), (1, 2));
    assert_eq!(x_grid, vec![vec![0.5, 1.5]]);
    assert_eq!(y_grid, vec![vec![0.5, 0.5]]);
}

#[test]
fn velocity_columns_need_derivatives() {
    let generator = DecisionSpaceGenerator::new(GridSpec::default(), FieldColumn::Vx);
    let err = generator.generate_ds(&dwell_table()).expect_err("no derivatives");
    assert_eq!(err.code(), "space-missing-derivatives");
}

#[test]
fn velocity_columns_read_derivatives() {
    let mut table = dwell_table();
    for traj in table.trajectories.iter_mut() {
        for sample in traj.samples.iter_mut() {
            sample.derivatives = Some(Derivatives {
                vx: sample.x * 10.0,
                vy: 0.0,
                speed: sample.x * 10.0,
                ax: 0.0,
                ay: 0.0,
            });
        }
    }
    let generator = DecisionSpaceGenerator::new(fixed_grid(2, 1, 2.0), FieldColumn::Vx);
    let ds = generator.generate_ds(&table).expect("row-wise");
    let left = ds.field.get(0, 0).expect("left cell");
    assert!((left - 5.0).abs() < 1e-12);
    assert_eq!(ds.field.get(0, 1), Some(15.0));
}

#[test]
fn empty_tables_and_zero_bins_are_rejected() {
    let generator = DecisionSpaceGenerator::new(GridSpec::default(), FieldColumn::T);
    let err = generator
        .generate_ds(&ProcessedTable::default())
        .expect_err("empty");
    assert_eq!(err.code(), "space-empty");

    let generator = DecisionSpaceGenerator::new(GridSpec::with_bins(0, 3), FieldColumn::T);
    let err = generator.generate_ds_cell_wise(&dwell_table()).expect_err("zero bins");
    assert_eq!(err.code(), "space-grid");
}

#[test]
fn difference_subtracts_defined_cells() {
    let generator = DecisionSpaceGenerator::new(fixed_grid(3, 1, 3.0), FieldColumn::T);
    let table = dwell_table();
    let rows = generator.generate_ds(&table).expect("row-wise");
    let cells = generator.generate_ds_cell_wise(&table).expect("cell-wise");
    let diff = rows.field.difference(&cells.field).expect("diff");
    assert_eq!(diff.values, vec![Some(-0.75), Some(0.0), None]);

    let other = Surface::empty(2, 2);
    assert_eq!(
        rows.field.difference(&other).expect_err("shape").code(),
        "space-shape"
    );
}

#[test]
fn synthetic_dataset_yields_matching_grids() {
    let spec = SynthSpec {
        subjects: SubjectRange::new(18, 22).expect("range"),
        trials_per_condition: 3,
        ..SynthSpec::with_seed(42)
    };
    let raw = synthesise(&spec);
    let (_, table) = preprocess(
        &raw,
        20,
        RewardCondition::HighLow.rewards_sum(20),
        SubjectRange::default(),
        DEFAULT_MIN_SAMPLES,
    )
    .expect("preprocess");
    let table = append_derivatives(table).expect("derivatives");

    let generator = DecisionSpaceGenerator::new(GridSpec::with_bins(12, 10), FieldColumn::Vx);
    let rows = generator.generate_ds(&table).expect("row-wise");
    let cells = generator.generate_ds_cell_wise(&table).expect("cell-wise");

    assert_eq!(rows.field.shape(), (10, 12));
    assert_eq!(rows.field.shape(), cells.field.shape());
    assert_eq!(rows.binning, cells.binning);
    assert_eq!(rows.skipped, 0);
    for (a, b) in rows.field.values.iter().zip(&cells.field.values) {
        assert_eq!(a.is_some(), b.is_some());
    }
    assert!(rows.field.defined_cells() > 0);
}

proptest! {
    #[test]
    fn single_visits_make_both_policies_agree(
        points in proptest::collection::vec((0.0f64..=1.0, 0.0f64..=1.0, -3.0f64..3.0), 1..40),
    ) {
        let trajectories = points
            .iter()
            .enumerate()
            .map(|(idx, &(x, y, value))| trajectory(idx as u32, vec![Sample::new(value, x, y)]))
            .collect();
        let table = ProcessedTable::new(trajectories);
        let generator = DecisionSpaceGenerator::new(fixed_grid(4, 4, 1.0), FieldColumn::T);
        let rows = generator.generate_ds(&table).unwrap();
        let cells = generator.generate_ds_cell_wise(&table).unwrap();
        prop_assert_eq!(&rows.field.values, &cells.field.values);
        prop_assert_eq!(rows.skipped, 0);
        prop_assert_eq!(rows.field.support.iter().sum::<u32>() as usize, points.len());
    }

    #[test]
    fn both_policies_share_the_grid(
        points in proptest::collection::vec((-5.0f64..5.0, -5.0f64..5.0), 1..30),
        x_bins in 1usize..8,
        y_bins in 1usize..8,
    ) {
        let samples = points
            .iter()
            .enumerate()
            .map(|(idx, &(x, y))| Sample::new(idx as f64, x, y))
            .collect();
        let table = ProcessedTable::new(vec![trajectory(1, samples)]);
        let generator = DecisionSpaceGenerator::new(GridSpec::with_bins(x_bins, y_bins), FieldColumn::T);
        let rows = generator.generate_ds(&table).unwrap();
        let cells = generator.generate_ds_cell_wise(&table).unwrap();
        prop_assert_eq!(rows.field.shape(), (y_bins, x_bins));
        prop_assert_eq!(rows.field.shape(), cells.field.shape());
        prop_assert_eq!(&rows.mesh, &cells.mesh);
        prop_assert_eq!(rows.skipped, 0);
    }
}
