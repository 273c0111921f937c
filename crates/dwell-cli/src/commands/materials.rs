use anyhow::Context;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::MaterialsArgs;
use crate::commands::io;
use crate::context::AppContext;
use crate::output::output;
use crate::progress::Progress;

/// Handle `dwell materials`.
pub async fn handle(
    args: &MaterialsArgs,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let image = io::read_image(&args.image)?;

    let materials = Progress::spinner("Generating material list")
        .track("Material list ready", ctx.pipeline.extract_materials(&image))
        .await
        .context("material list generation failed")?;

    output(&materials, flags.format)
}
