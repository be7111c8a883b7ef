use std::fs;
use std::path::Path;

use ds_core::errors::{DsError, ErrorInfo};
use ds_core::serde::to_canonical_json_bytes;
use ds_data::DataReader;
use ds_plot::{Colormap, DsPlotter};
use ds_space::{DecisionSpace, DecisionSpaceGenerator, Surface};
use serde::Serialize;
use tracing::{info, warn};

use crate::config::{load_config, AnalysisConfig};
use crate::report::{AnalysisReport, ReportParts, RunMeta, META_FILE, REPORT_FILE};

fn io_error(code: &str, path: &Path, err: impl ToString) -> DsError {
    DsError::Serde(
        ErrorInfo::new(code, err.to_string()).with_context("path", path.display().to_string()),
    )
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), DsError> {
    let bytes = to_canonical_json_bytes(value)?;
    fs::write(path, bytes).map_err(|err| io_error("report-write", path, err))
}

/// Runs the full analysis and writes plots, surfaces and the report into `out`.
///
/// The pipeline reads the dataset, keeps the configured condition and
/// subjects, appends derivatives, builds the row-wise and cell-wise decision
/// spaces on one grid and renders each as a surface.
pub fn run_analysis(config: &AnalysisConfig, out: &Path) -> Result<AnalysisReport, DsError> {
    config.validate()?;
    fs::create_dir_all(out).map_err(|err| io_error("output-dir", out, err))?;
    let config_hash = config.config_hash()?;
    let selection = &config.selection;
    let rewards_sum = selection.rewards_sum();
    info!(config_hash = %config_hash, selection = %selection.label(), out = %out.display(), "starting analysis");

    let reader = DataReader::new(config.data_path()).with_min_samples(config.data.min_samples);
    let raw = reader.read_data()?;
    let (subject_ids, table) =
        reader.preprocess_data(&raw, selection.exp_type, rewards_sum, selection.subjects)?;
    if table.is_empty() {
        return Err(DsError::Data(
            ErrorInfo::new("data-no-trials", "no trajectories match the selection")
                .with_context("exp_type", selection.exp_type.to_string())
                .with_context("rewards_sum", rewards_sum.to_string())
                .with_context("subjects", selection.subjects.to_string())
                .with_hint("check exp_type, condition and subject range against the dataset"),
        ));
    }
    let table = reader.append_derivatives(table)?;

    let generator = DecisionSpaceGenerator::new(config.grid.clone(), config.field)
        .with_min_support(config.min_support);
    let row_wise = generator.generate_ds(&table)?;
    let cell_wise = generator.generate_ds_cell_wise(&table)?;
    if row_wise.field.shape() != cell_wise.field.shape() || row_wise.mesh != cell_wise.mesh {
        return Err(DsError::Space(ErrorInfo::new(
            "space-shape",
            "row-wise and cell-wise grids disagree",
        )));
    }

    let plotter = DsPlotter::new(config.plots.style.clone());
    let x_grid = row_wise.x_grid();
    let y_grid = row_wise.y_grid();
    let title = |what: &str| format!("{what} decision space: {} ({})", config.field, selection.label());
    let mut plots = Vec::new();
    let mut render = |name: &str, field: &Surface, cmap: Colormap, title: String| {
        match plotter.plot_surface(&x_grid, &y_grid, field, cmap, &out.join(name), &title) {
            Ok(_) => plots.push(name.to_string()),
            Err(err) if err.code() == "plot-empty" => {
                warn!(plot = name, "nothing to draw; skipping plot");
            }
            Err(err) => return Err(err),
        }
        Ok::<(), DsError>(())
    };
    render(
        "ds_row_wise.svg",
        &row_wise.field,
        config.plots.row_wise,
        title("row-wise"),
    )?;
    render(
        "ds_cell_wise.svg",
        &cell_wise.field,
        config.plots.cell_wise,
        title("cell-wise"),
    )?;
    if let Some(cmap) = config.plots.difference {
        let difference = row_wise.field.difference(&cell_wise.field)?;
        render(
            "ds_difference.svg",
            &difference,
            cmap,
            title("row-wise minus cell-wise"),
        )?;
    }

    if config.outputs.write_surfaces {
        persist_space(out, "ds_row_wise.json", &row_wise)?;
        persist_space(out, "ds_cell_wise.json", &cell_wise)?;
    }

    let report = AnalysisReport::assemble(ReportParts {
        config_hash,
        input_hash: raw.input_hash.clone(),
        exp_type: selection.exp_type,
        rewards_sum,
        subjects: selection.subjects,
        subject_ids,
        trajectories: table.trajectories.len(),
        samples: table.sample_count(),
        row_wise: &row_wise,
        cell_wise: &cell_wise,
        plots,
    });
    write_json(&out.join(REPORT_FILE), &report)?;
    write_json(&out.join(META_FILE), &RunMeta::stamp(&report)?)?;
    info!(
        plots = report.plots.len(),
        trajectories = report.trajectories,
        co_defined = report.comparison.co_defined,
        "analysis complete"
    );
    Ok(report)
}

/// Loads a configuration from disk and runs it.
pub fn run_analysis_from_path(config_path: &Path, out: &Path) -> Result<AnalysisReport, DsError> {
    let config = load_config(config_path)?;
    run_analysis(&config, out)
}

fn persist_space(out: &Path, name: &str, space: &DecisionSpace) -> Result<(), DsError> {
    write_json(&out.join(name), space)
}
