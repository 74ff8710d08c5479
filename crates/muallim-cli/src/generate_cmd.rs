//! `muallim generate`: one generation from the command line.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};

use muallim_core::client::GeminiClient;
use muallim_core::controller::{Controller, GENERATION_FAILED_MESSAGE, SubmitError};
use muallim_core::form::LessonForm;
use muallim_core::ingest::{FileHandle, Ingestor};
use muallim_core::render::{RenderOptions, render_plan_html};

use crate::config::MuallimConfig;

/// Options for `muallim generate`.
#[derive(Debug)]
pub struct GenerateOptions {
    pub form: LessonForm,
    pub files: Vec<PathBuf>,
    pub output: PathBuf,
    pub json: Option<PathBuf>,
}

pub async fn run_generate(config: &MuallimConfig, options: GenerateOptions) -> Result<()> {
    // 1. Ingest attachments (unsupported types are skipped).
    let mut ingestor = Ingestor::new();
    ingestor
        .ingest(options.files.iter().map(FileHandle::from_path))
        .await
        .context("failed to read attached files")?;

    if ingestor.len() < options.files.len() {
        println!(
            "Skipped {} file(s): only images and PDFs are sent.",
            options.files.len() - ingestor.len()
        );
    }

    // 2. Generate.
    let client = Arc::new(GeminiClient::new(config.endpoint.clone()));
    let controller = Controller::new(client, config.credential.clone(), config.model.clone());

    println!(
        "Generating {} / {} / {} ({} file(s))...",
        options.form.level.label(),
        options.form.period.label(),
        options.form.week.label(),
        ingestor.len()
    );

    let plan = match controller
        .submit(&options.form, &ingestor.inline_payloads())
        .await
    {
        Ok(plan) => plan,
        Err(SubmitError::Plan(e)) => {
            eprintln!("{GENERATION_FAILED_MESSAGE}");
            let kind = e.kind();
            return Err(anyhow::Error::new(e).context(format!("generation failed ({kind})")));
        }
        Err(e) => return Err(e.into()),
    };

    // 3. Write outputs.
    let html = render_plan_html(&plan, RenderOptions::standalone());
    write_output(&options.output, &html)?;

    if let Some(json_path) = &options.json {
        let json = serde_json::to_string_pretty(&plan).context("failed to serialize plan")?;
        write_output(json_path, &json)?;
    }

    println!("Lesson card written.");
    println!();
    println!("  Level:    {}", plan.level);
    println!("  Period:   {}", plan.period);
    println!("  Week:     {}", plan.week);
    println!("  Session:  {}", plan.session);
    println!("  Sections: {}", plan.sections.len());
    println!("  Card:     {}", options.output.display());
    if let Some(json_path) = &options.json {
        println!("  Plan:     {}", json_path.display());
    }

    Ok(())
}

/// Write `contents` to `path`, creating parent directories as needed.
pub fn write_output(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }
    std::fs::write(path, contents)
        .with_context(|| format!("failed to write {}", path.display()))
}
