pub mod aggregate;
pub mod bilan;
pub mod charts;
pub mod registry;
pub mod sections;
pub mod store;

use anyhow::{Context, Result};
use models::{BilanReport, BudgetSnapshot, ChartPalette};
use std::{fs, path::Path};

pub use bilan::{build_slices, render, BilanView};
pub use registry::{CategoryUpdate, SharedRegistry, TotalsRegistry};
pub use sections::Budget;

/// Loads a budget snapshot from a JSON file.
pub fn load_snapshot(path: &Path) -> Result<BudgetSnapshot> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Reading budget file: {}", path.display()))?;
    let snapshot: BudgetSnapshot = serde_json::from_str(&raw)
        .with_context(|| format!("Parsing budget JSON in {}", path.display()))?;
    Ok(snapshot)
}

/// Runs a snapshot through the sections and renders the bilan from the resulting totals.
pub fn generate_bilan(snapshot: &BudgetSnapshot, palette: &ChartPalette) -> BilanReport {
    let budget = Budget::from_snapshot(snapshot.clone());
    let totals = budget.totals();
    tracing::debug!(
        revenue = totals.revenue,
        fixed = totals.fixed_expenses,
        variable = totals.variable_expenses,
        apartments = totals.apartments,
        "rendering bilan"
    );
    render(&totals, palette)
}

pub fn write_report_json(report: &BilanReport, out_path: &Path) -> Result<()> {
    if let Some(parent) = out_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Creating output dir: {}", parent.display()))?;
        }
    }
    let json = serde_json::to_string_pretty(report)?;
    fs::write(out_path, json)
        .with_context(|| format!("Writing report file: {}", out_path.display()))?;
    Ok(())
}
