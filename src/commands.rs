//! CLI command implementations.
//!
//! Each `run_*` function backs one `dvz` subcommand. Human-facing output goes
//! to stdout; diagnostics go through `tracing` and progress goes to stderr.

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::analysis::create_analyzer;
use crate::config::Config;
use crate::ingest::{collect_files, ingest_paths};
use crate::models::{AnalysisResult, RenderedDocument};
use crate::progress::ProgressMode;
use crate::render::{Feature, PresentationRequest};
use crate::theme::{Palette, Theme};

/// Default output file for rendered presentations.
pub const DEFAULT_OUTPUT: &str = "DataViz-Presentation.html";

/// Options shared by `render` and `build`.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    pub theme: Option<String>,
    pub palette: Option<String>,
    pub features: Option<Vec<String>>,
    pub output: Option<PathBuf>,
}

/// `dvz parse`: extracts files and prints the batch as JSON.
pub fn run_parse(paths: &[PathBuf], output: Option<&Path>, progress: ProgressMode) -> Result<()> {
    let files = collect_files(paths)?;
    if files.is_empty() {
        bail!("No input files found");
    }

    let reporter = progress.reporter();
    let docs = ingest_paths(&files, reporter.as_ref());
    let failed = docs.iter().filter(|d| !d.is_ok()).count();
    let json = serde_json::to_string_pretty(&docs)?;

    match output {
        Some(path) => {
            std::fs::write(path, &json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!(
                "Extracted {} file(s) ({} failed) to {}",
                docs.len(),
                failed,
                path.display()
            );
        }
        None => println!("{}", json),
    }
    Ok(())
}

/// `dvz render`: renders an analysis JSON file to HTML.
pub fn run_render(config: &Config, analysis_path: &Path, opts: &RenderOptions) -> Result<()> {
    let content = std::fs::read_to_string(analysis_path)
        .with_context(|| format!("Failed to read {}", analysis_path.display()))?;
    let analysis: AnalysisResult = serde_json::from_str(&content)
        .with_context(|| format!("Invalid analysis JSON in {}", analysis_path.display()))?;

    let rendered = render_with(config, analysis, opts)?;
    write_presentation(&rendered, opts.output.as_deref())
}

/// `dvz build`: ingest, analyze and render in one step.
pub async fn run_build(
    config: &Config,
    paths: &[PathBuf],
    instructions: Option<&str>,
    opts: &RenderOptions,
    progress: ProgressMode,
) -> Result<()> {
    let files = collect_files(paths)?;
    if files.is_empty() {
        bail!("No input files found");
    }

    let reporter = progress.reporter();
    let docs = ingest_paths(&files, reporter.as_ref());

    let analyzer = create_analyzer(&config.analysis)?;
    info!(analyzer = analyzer.name(), files = docs.len(), "analyzing batch");
    let mut analysis = analyzer
        .analyze(&docs, instructions)
        .await
        .with_context(|| format!("{} analysis failed", analyzer.name()))?;
    if analysis.generated_on.is_none() {
        analysis.generated_on = Some(chrono::Local::now().format("%B %-d, %Y").to_string());
    }

    let rendered = render_with(config, analysis, opts)?;
    write_presentation(&rendered, opts.output.as_deref())
}

/// `dvz themes`: lists theme and palette identifiers.
pub fn run_themes() {
    println!("Themes:");
    for theme in Theme::ALL {
        println!("  {:<10} {}", theme.id(), theme.background());
    }
    println!();
    println!("Palettes:");
    for palette in Palette::ALL {
        let (primary, secondary) = palette.colors();
        println!("  {:<10} {} / {}", palette.id(), primary, secondary);
    }
    println!();
    println!("Features:");
    for feature in Feature::ALL {
        println!("  {}", feature.id());
    }
}

fn render_with(
    config: &Config,
    analysis: AnalysisResult,
    opts: &RenderOptions,
) -> Result<RenderedDocument> {
    if let Some(ids) = &opts.features {
        for id in ids.iter().filter(|id| Feature::parse(id).is_none()) {
            warn!(feature = %id, "ignoring unknown feature");
        }
    }
    let request = PresentationRequest {
        analyzed_data: Some(analysis),
        theme: opts.theme.clone(),
        palette: opts.palette.clone(),
        selected_features: opts.features.clone(),
    };
    Ok(request.render(&config.render)?)
}

fn write_presentation(rendered: &RenderedDocument, output: Option<&Path>) -> Result<()> {
    let path = output.unwrap_or_else(|| Path::new(DEFAULT_OUTPUT));
    std::fs::write(path, &rendered.html)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!(
        "Wrote {} ({} bytes, sha256 {})",
        path.display(),
        rendered.size,
        &rendered.digest[..12]
    );
    Ok(())
}
