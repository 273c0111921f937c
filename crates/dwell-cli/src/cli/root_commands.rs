use std::path::PathBuf;

use clap::{Args, Subcommand};

/// Top-level commands.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Turn a floorplan image into a spatial model
    Analyze(AnalyzeArgs),
    /// Render one room of a spatial model
    Render(RenderArgs),
    /// Apply a conversational edit to a render
    Refine(RefineArgs),
    /// Derive a bill of materials from a design image
    Materials(MaterialsArgs),
    /// Run a full design session from floorplan to supplier request
    Studio(StudioArgs),
    /// List registered schemas or print one
    Schema(SchemaArgs),
}

#[derive(Clone, Debug, Args)]
pub struct AnalyzeArgs {
    /// Floorplan image (PNG, JPEG, WebP, GIF, or a file holding a data URL)
    pub image: PathBuf,
}

#[derive(Clone, Debug, Args)]
pub struct RenderArgs {
    /// Spatial model JSON produced by `dwell analyze`
    #[arg(long)]
    pub model: PathBuf,

    /// Room name as it appears in the model
    #[arg(long)]
    pub room: String,

    /// Design style (defaults to `studio.default_style`)
    #[arg(long)]
    pub style: Option<String>,

    /// Where to write the rendered image
    #[arg(long)]
    pub out: PathBuf,
}

#[derive(Clone, Debug, Args)]
pub struct RefineArgs {
    /// Spatial model JSON produced by `dwell analyze`
    #[arg(long)]
    pub model: PathBuf,

    /// The design image to edit
    #[arg(long)]
    pub image: PathBuf,

    /// What to change, in plain language
    #[arg(long)]
    pub instruction: String,

    /// Where to write the edited image
    #[arg(long)]
    pub out: PathBuf,
}

#[derive(Clone, Debug, Args)]
pub struct MaterialsArgs {
    /// Design image to itemize
    pub image: PathBuf,
}

#[derive(Clone, Debug, Args)]
pub struct StudioArgs {
    /// Floorplan image
    pub image: PathBuf,

    /// Room to design
    #[arg(long)]
    pub room: String,

    /// Design style (defaults to `studio.default_style`)
    #[arg(long)]
    pub style: Option<String>,

    /// Project name for the supplier request (defaults to the room name)
    #[arg(long)]
    pub project: Option<String>,

    /// Edit to apply after the initial render (repeatable, applied in order)
    #[arg(long = "instruction")]
    pub instructions: Vec<String>,

    /// Version number to hand to suppliers (repeatable; defaults to the latest)
    #[arg(long)]
    pub select: Vec<usize>,

    /// Directory for every artifact of the session
    #[arg(long)]
    pub out_dir: PathBuf,
}

#[derive(Clone, Debug, Args)]
pub struct SchemaArgs {
    /// Schema name; omit to list every registered schema
    pub name: Option<String>,
}
