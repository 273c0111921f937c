use crate::cli::GlobalFlags;
use crate::cli::root_commands::Commands;
use crate::commands;
use crate::context::AppContext;

/// Dispatch a parsed command to the corresponding handler module.
pub async fn dispatch(command: Commands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match command {
        Commands::Analyze(args) => commands::analyze::handle(&args, ctx, flags).await,
        Commands::Render(args) => commands::render::handle(&args, ctx, flags).await,
        Commands::Refine(args) => commands::refine::handle(&args, ctx, flags).await,
        Commands::Materials(args) => commands::materials::handle(&args, ctx, flags).await,
        Commands::Studio(args) => commands::studio::handle(&args, ctx, flags).await,
        Commands::Schema(_) => unreachable!("schema is pre-dispatched in main"),
    }
}
