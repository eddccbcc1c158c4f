//! config command - Create or update a kind

use anyhow::{Context as _, Result};

use super::{open_library, verbosity};
use crate::core::config::KindConfig;
use crate::engine::{self, Context, KindUpdate};
use crate::ui::output::{self, format_setting};

/// Create or update a kind, showing what changed.
pub fn config(ctx: &Context, kind: &str, update: KindUpdate) -> Result<()> {
    let verbosity = verbosity(ctx);
    let (_paths, mut config) = open_library()?;

    let change = engine::configure_kind(&mut config.library, kind, update)
        .with_context(|| format!("Failed to configure kind '{}'", kind))?;

    match &change.previous {
        None if change.is_modified() => {
            output::print(format!("Added new kind '{}':", kind), verbosity)
        }
        None => output::print(format!("Kind '{}' is not registered.", kind), verbosity),
        Some(previous) => {
            output::print(format!("Kind '{}' already registered:", kind), verbosity);
            output::print(describe_kind(previous), verbosity);
        }
    }

    if !change.is_modified() {
        output::print("(No config changes written.)", verbosity);
        return Ok(());
    }

    let lines: Vec<String> = change
        .changes
        .iter()
        .map(|c| {
            format!(
                "{}: {} -> {}",
                c.field,
                format_setting(c.old.as_deref()),
                format_setting(c.new.as_deref())
            )
        })
        .collect();
    output::print(output::format_list(&lines, "  "), verbosity);

    let path = config.save().context("Failed to write library config")?;
    output::print(format!("Wrote {}", path.display()), verbosity);
    Ok(())
}

fn describe_kind(kind: &KindConfig) -> String {
    let lines = [
        format!("lib_path = {}", format_setting(kind.lib_path.as_deref())),
        format!(
            "include_pattern = {}",
            format_setting(kind.include_pattern.as_deref())
        ),
        format!(
            "exclude_pattern = {}",
            format_setting(kind.exclude_pattern.as_deref())
        ),
        format!("root_marker = {}", format_setting(kind.root_marker.as_deref())),
        format!(
            "rename_pattern = {}",
            format_setting(kind.rename_pattern.as_deref())
        ),
    ];
    output::format_list(&lines, "  ")
}
