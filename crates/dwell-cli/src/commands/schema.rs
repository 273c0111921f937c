use anyhow::anyhow;
use dwell_schema::SchemaRegistry;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::SchemaArgs;
use crate::output::output;

/// Handle `dwell schema`. Needs no configuration or credentials.
pub fn handle(args: &SchemaArgs, flags: &GlobalFlags) -> anyhow::Result<()> {
    let registry = SchemaRegistry::new();
    match &args.name {
        None => output(&registry.list(), flags.format),
        Some(name) => {
            let schema = registry.get(name).ok_or_else(|| {
                anyhow!(
                    "unknown schema '{name}' (available: {})",
                    registry.list().join(", ")
                )
            })?;
            output(schema, flags.format)
        }
    }
}
