use anyhow::Context;
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::RefineArgs;
use crate::commands::io;
use crate::context::AppContext;
use crate::output::output;
use crate::progress::Progress;

#[derive(Serialize)]
struct RefineSummary {
    updated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    out: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    explanation: Option<String>,
}

/// Handle `dwell refine`.
///
/// A refused edit is not an error: nothing is written and the explanation is
/// reported instead.
pub async fn handle(args: &RefineArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let model = io::read_model(&args.model)?;
    let base = io::read_image(&args.image)?;

    let refinement = Progress::spinner("Refining design")
        .track(
            "Refinement finished",
            ctx.pipeline.refine(&args.instruction, &model, &base),
        )
        .await
        .context("refinement failed")?;

    let out = match &refinement.image {
        Some(image) => {
            io::write_image(&args.out, image)?;
            Some(args.out.display().to_string())
        }
        None => None,
    };

    output(
        &RefineSummary {
            updated: refinement.is_update(),
            out,
            explanation: refinement.explanation,
        },
        flags.format,
    )
}
