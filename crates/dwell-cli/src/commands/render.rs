use anyhow::Context;
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::RenderArgs;
use crate::commands::io;
use crate::context::AppContext;
use crate::output::output;
use crate::progress::Progress;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RenderSummary<'a> {
    room: &'a str,
    style: &'a str,
    mime_type: &'a str,
    out: String,
}

/// Handle `dwell render`.
pub async fn handle(args: &RenderArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let model = io::read_model(&args.model)?;
    let style = ctx.style_or_default(args.style.as_deref());

    let image = Progress::spinner(&format!("Rendering {} ({style})", args.room))
        .track("Render ready", ctx.pipeline.render(&model, &args.room, style))
        .await
        .with_context(|| format!("failed to render {}", args.room))?;

    io::write_image(&args.out, &image)?;

    output(
        &RenderSummary {
            room: &args.room,
            style,
            mime_type: &image.mime_type,
            out: args.out.display().to_string(),
        },
        flags.format,
    )
}
