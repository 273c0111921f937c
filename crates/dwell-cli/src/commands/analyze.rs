use anyhow::Context;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::AnalyzeArgs;
use crate::commands::io;
use crate::context::AppContext;
use crate::output::output;
use crate::progress::Progress;

/// Handle `dwell analyze`.
pub async fn handle(args: &AnalyzeArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let image = io::read_image(&args.image)?;

    let model = Progress::spinner("Analyzing floorplan")
        .track("Floorplan analyzed", ctx.pipeline.analyze(&image))
        .await
        .context("floorplan analysis failed")?;

    tracing::debug!(
        rooms = model.rooms.len(),
        elements = model.elements.len(),
        "spatial model ready"
    );
    output(&model, flags.format)
}
