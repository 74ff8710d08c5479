//! `muallim render` and `muallim schema`: offline commands.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use muallim_core::plan::{LessonPlan, lesson_plan_schema};
use muallim_core::render::{RenderOptions, render_plan_html};

use crate::generate_cmd::write_output;

/// Read a plan JSON file and render it.
///
/// Writes to `output` when given, otherwise prints the HTML to stdout.
pub fn run_render(plan_path: &Path, output: Option<&PathBuf>, chrome: bool) -> Result<()> {
    let content = std::fs::read_to_string(plan_path)
        .with_context(|| format!("failed to read plan file: {}", plan_path.display()))?;
    let plan: LessonPlan = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse plan file: {}", plan_path.display()))?;

    let options = if chrome {
        RenderOptions::default()
    } else {
        RenderOptions::standalone()
    };
    let html = render_plan_html(&plan, options);

    match output {
        Some(path) => {
            write_output(path, &html)?;
            println!(
                "Rendered {} section(s) to {}",
                plan.sections.len(),
                path.display()
            );
        }
        None => print!("{html}"),
    }
    Ok(())
}

/// Print the response schema sent with every generation request.
pub fn run_schema() -> Result<()> {
    let schema =
        serde_json::to_string_pretty(&lesson_plan_schema()).context("failed to serialize schema")?;
    println!("{schema}");
    Ok(())
}
