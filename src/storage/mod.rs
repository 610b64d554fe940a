//! Results persistence module

use anyhow::Result;
use serde_json::{json, to_string_pretty};
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use crate::config::Config;
use crate::data::LabeledLog;
use crate::lockstep::LockstepReport;

/// Save the detection report and input statistics to `output_dir`
pub fn save_results(
    report: &LockstepReport,
    labeled: &LabeledLog,
    config: &Config,
    output_dir: &str,
) -> Result<()> {
    log::info!("Saving lockstep report to {}", output_dir);

    fs::create_dir_all(output_dir)?;

    save_report(report, labeled, config, output_dir)?;
    save_summary(report, labeled, output_dir)?;

    log::info!("Results saved successfully");

    Ok(())
}

/// Save the final center, subspace and suspected users, with original ids
fn save_report(
    report: &LockstepReport,
    labeled: &LabeledLog,
    config: &Config,
    output_dir: &str,
) -> Result<()> {
    let path = Path::new(output_dir).join("report.json");
    let mut file = File::create(path)?;

    let state = &report.state;
    let pages = state
        .subspace_center()
        .into_iter()
        .map(|(page, center)| {
            json!({
                "index": page,
                "id": labeled.page_ids[page],
                "center": center,
            })
        })
        .collect::<Vec<_>>();

    let users = state
        .suspected_users
        .iter()
        .map(|&user| {
            json!({
                "index": user,
                "id": labeled.user_ids[user],
            })
        })
        .collect::<Vec<_>>();

    let report_json = json!({
        "status": report.status,
        "iterations": state.iteration,
        "config": config,
        "meets_user_threshold": state.suspected_users.len() >= config.n,
        "center": state.center.to_vec(),
        "subspace": pages,
        "suspected_users": users,
    });

    file.write_all(to_string_pretty(&report_json)?.as_bytes())?;

    Ok(())
}

/// Save statistics about the interaction log the run was made on
fn save_summary(report: &LockstepReport, labeled: &LabeledLog, output_dir: &str) -> Result<()> {
    let path = Path::new(output_dir).join("summary.json");
    let mut file = File::create(path)?;

    let log = &labeled.log;
    let cells = log.user_count() * log.page_count();
    let suspected = report.state.suspected_users.len();
    let summary = json!({
        "log_stats": {
            "user_count": log.user_count(),
            "page_count": log.page_count(),
            "interaction_count": log.interaction_count(),
            "density": log.interaction_count() as f64 / cells as f64,
        },
        "result_stats": {
            "subspace_size": report.state.subspace.len(),
            "suspected_user_count": suspected,
            "suspected_user_fraction": suspected as f64 / log.user_count() as f64,
        }
    });

    file.write_all(to_string_pretty(&summary)?.as_bytes())?;

    Ok(())
}
