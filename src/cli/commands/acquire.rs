//! acquire command - Clone a module into the library

use anyhow::{Context as _, Result};

use super::{display_path, open_library, verbosity};
use crate::core::config::Registration;
use crate::core::types::ModuleName;
use crate::engine::{self, AcquireReport, Context};
use crate::ui::output::{self, indent};

/// Clone a module into the library.
pub fn acquire(ctx: &Context, kind: &str, module: &str, url: &str) -> Result<()> {
    let verbosity = verbosity(ctx);
    let module = ModuleName::new(module)?;
    let (paths, mut config) = open_library()?;

    output::print(
        format!("Cloning \"{}\" module \"{}\" into Library...", kind, module),
        verbosity,
    );
    let report = engine::acquire(&paths, &mut config.library, kind, &module, url)?;

    let registration = match &report {
        AcquireReport::Cloned { registration, .. } => registration,
        AcquireReport::AlreadyCloned { registration } => registration,
    };
    if let Registration::Existing(existing) = registration {
        output::print(
            format!(
                "Module '{}' already registered:\n  kind = {}\n  clone = {}\n  url = {}",
                module,
                existing.kind,
                display_path(&existing.clone),
                existing.url
            ),
            verbosity,
        );
    }

    match &report {
        AcquireReport::AlreadyCloned { .. } => {
            output::print(
                format!(
                    "Module \"{0}\" already exists in Library.\nUse \"librarian pull {0}\" to update.",
                    module
                ),
                verbosity,
            );
        }
        AcquireReport::Cloned { upstream, head, .. } => {
            output::print(
                format!(
                    "Tracking {}\n\tCommit: {}\n\tMessage:\n{}",
                    upstream,
                    head.oid,
                    indent(head.message.trim(), "\t")
                ),
                verbosity,
            );
        }
    }

    if registration.is_created() {
        config.save().context("Failed to write library config")?;
    }
    Ok(())
}
