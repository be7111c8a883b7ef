use ds_core::errors::{DsError, ErrorInfo};
use tracing::info;

use crate::table::{Derivatives, ProcessedTable, Trajectory};

/// Differentiates `values` with respect to the strictly increasing `t`.
///
/// Interior points use second-order central differences on non-uniform
/// spacing; the first and last points use one-sided differences. Inputs with
/// fewer than two points yield zeros.
pub fn gradient(values: &[f64], t: &[f64]) -> Vec<f64> {
    let n = values.len().min(t.len());
    if n < 2 {
        return vec![0.0; n];
    }
    let mut out = Vec::with_capacity(n);
    out.push((values[1] - values[0]) / (t[1] - t[0]));
    for i in 1..n - 1 {
        let hs = t[i] - t[i - 1];
        let hd = t[i + 1] - t[i];
        let num = hs * hs * values[i + 1] + (hd * hd - hs * hs) * values[i] - hd * hd * values[i - 1];
        out.push(num / (hs * hd * (hd + hs)));
    }
    out.push((values[n - 1] - values[n - 2]) / (t[n - 1] - t[n - 2]));
    out
}

/// Fills velocity, speed and acceleration for every sample of every trajectory.
///
/// Existing derivative columns are recomputed.
pub fn append_derivatives(mut table: ProcessedTable) -> Result<ProcessedTable, DsError> {
    for traj in table.trajectories.iter_mut() {
        derive_trajectory(traj)?;
    }
    info!(
        trajectories = table.trajectories.len(),
        samples = table.sample_count(),
        "appended derivatives"
    );
    Ok(table)
}

fn derive_trajectory(traj: &mut Trajectory) -> Result<(), DsError> {
    let error = |message: &str| {
        DsError::Data(
            ErrorInfo::new("data-derivatives", message)
                .with_context("subj_id", traj.key.subj_id.to_string())
                .with_context("trial_no", traj.key.trial_no.to_string()),
        )
    };
    if traj.samples.len() < 2 {
        return Err(error("trajectory needs at least two samples"));
    }
    if traj.samples.windows(2).any(|pair| pair[1].t <= pair[0].t) {
        return Err(error("timestamps must be strictly increasing"));
    }

    let t: Vec<f64> = traj.samples.iter().map(|s| s.t).collect();
    let x: Vec<f64> = traj.samples.iter().map(|s| s.x).collect();
    let y: Vec<f64> = traj.samples.iter().map(|s| s.y).collect();
    let vx = gradient(&x, &t);
    let vy = gradient(&y, &t);
    let ax = gradient(&vx, &t);
    let ay = gradient(&vy, &t);

    for (idx, sample) in traj.samples.iter_mut().enumerate() {
        sample.derivatives = Some(Derivatives {
            vx: vx[idx],
            vy: vy[idx],
            speed: vx[idx].hypot(vy[idx]),
            ax: ax[idx],
            ay: ay[idx],
        });
    }
    Ok(())
}
