//! `dwell studio`: one design session end to end, written to a directory.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use dwell_genai::GenerativeBackend;
use dwell_pipeline::{DesignSession, Pipeline, PipelineError, RefineOutcome, VersionOrigin};
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::StudioArgs;
use crate::commands::io;
use crate::context::AppContext;
use crate::output::output;
use crate::progress::Progress;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VersionSummary {
    number: usize,
    origin: VersionOrigin,
    file: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StudioSummary {
    room: String,
    style: String,
    versions: Vec<VersionSummary>,
    rejected: usize,
    failed: usize,
    selected: Vec<usize>,
    materials: usize,
    out_dir: String,
}

/// Handle `dwell studio`.
pub async fn handle(args: &StudioArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let floorplan = io::read_image(&args.image)?;
    let style = ctx.style_or_default(args.style.as_deref());

    let model = Progress::spinner("Analyzing floorplan")
        .track("Floorplan analyzed", ctx.pipeline.analyze(&floorplan))
        .await
        .context("floorplan analysis failed")?;
    io::write_json(&args.out_dir.join("spatial_model.json"), &model)?;

    let session = Progress::spinner(&format!("Rendering {} ({style})", args.room))
        .track(
            "Initial design ready",
            DesignSession::start(&ctx.pipeline, Arc::new(model), &args.room, style),
        )
        .await
        .with_context(|| format!("failed to render {}", args.room))?;

    let project = args.project.as_deref().unwrap_or(&args.room);
    let summary = run_session(&ctx.pipeline, session, args, project, &args.out_dir).await?;
    output(&summary, flags.format)
}

async fn run_session<B: GenerativeBackend>(
    pipeline: &Pipeline<B>,
    mut session: DesignSession,
    args: &StudioArgs,
    project: &str,
    out_dir: &Path,
) -> anyhow::Result<StudioSummary> {
    let mut rejected = 0;
    let mut failed = 0;

    for instruction in &args.instructions {
        let result = Progress::spinner(&format!("Refining: {instruction}"))
            .track("Refinement finished", session.refine(pipeline, instruction))
            .await;
        match result {
            Ok(RefineOutcome::Updated { version, .. }) => {
                tracing::info!(version, instruction = %instruction, "design updated");
            }
            Ok(RefineOutcome::Rejected { explanation }) => {
                rejected += 1;
                tracing::warn!(instruction = %instruction, %explanation, "refinement refused");
            }
            Err(error @ PipelineError::Configuration(_)) => return Err(error.into()),
            Err(error) => {
                failed += 1;
                tracing::warn!(instruction = %instruction, %error, "refinement failed; continuing");
            }
        }
    }

    Progress::spinner("Generating material list")
        .track("Material list ready", session.extract_materials(pipeline))
        .await
        .context("material list generation failed")?;

    for number in selection(&args.select, session.current().number) {
        session
            .toggle_final(number)
            .with_context(|| format!("cannot select version {number}"))?;
    }

    let request = session
        .supplier_request(project)
        .context("failed to build the supplier request")?;

    let mut versions = Vec::with_capacity(session.versions().len());
    for version in session.versions() {
        let file = format!("version_{:02}.{}", version.number, io::extension(&version.image));
        io::write_image(&out_dir.join(&file), &version.image)?;
        versions.push(VersionSummary {
            number: version.number,
            origin: version.origin.clone(),
            file,
        });
    }
    io::write_json(&out_dir.join("transcript.json"), &session.transcript())?;
    io::write_json(&out_dir.join("materials.json"), &session.materials())?;
    io::write_json(&out_dir.join("supplier_request.json"), &request)?;

    Ok(StudioSummary {
        room: session.room().to_string(),
        style: session.style().to_string(),
        versions,
        rejected,
        failed,
        selected: session.selected().to_vec(),
        materials: session.materials().len(),
        out_dir: out_dir.display().to_string(),
    })
}

/// Versions to hand off: the requested ones without repeats, or the latest.
fn selection(requested: &[usize], latest: usize) -> Vec<usize> {
    if requested.is_empty() {
        return vec![latest];
    }
    let mut numbers = Vec::with_capacity(requested.len());
    for &number in requested {
        if !numbers.contains(&number) {
            numbers.push(number);
        }
    }
    numbers
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::selection;

    #[test]
    fn defaults_to_latest_version() {
        assert_eq!(selection(&[], 4), vec![4]);
    }

    #[test]
    fn repeated_numbers_are_selected_once() {
        assert_eq!(selection(&[2, 1, 2], 4), vec![2, 1]);
    }
}
