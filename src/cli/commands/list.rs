//! list command - List modules in the library

use anyhow::Result;

use super::{open_library, verbosity};
use crate::engine::{self, Context};
use crate::ui::output;

/// List modules, optionally of one kind.
pub fn list(ctx: &Context, kind: Option<&str>, json: bool) -> Result<()> {
    let (_paths, config) = open_library()?;
    let modules = engine::list_modules(&config.library, kind);

    if json {
        println!("{}", serde_json::to_string_pretty(&modules)?);
        return Ok(());
    }

    let verbosity = verbosity(ctx);
    for module in &modules {
        output::print(
            format!("{:10}\t\t{} module from {}", module.name, module.kind, module.url),
            verbosity,
        );
    }
    match kind {
        Some(kind) => output::print(format!("Found {} {} modules", modules.len(), kind), verbosity),
        None => output::print(
            format!("Found {} modules of any kind", modules.len()),
            verbosity,
        ),
    }
    Ok(())
}
