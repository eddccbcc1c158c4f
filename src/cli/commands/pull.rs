//! pull command - Update a module in the library from upstream

use anyhow::Result;

use super::{display_path, open_library, verbosity};
use crate::core::types::ModuleName;
use crate::engine::{self, Context};
use crate::ui::output::{self, format_list, indent};

/// Fast-forward a module's master from its upstream.
pub fn pull(ctx: &Context, module: &str, remote: Option<&str>) -> Result<()> {
    let verbosity = verbosity(ctx);
    let module = ModuleName::new(module)?;
    let (paths, config) = open_library()?;

    let report = engine::pull(&paths, &config.library, &module, remote)?;

    let clone = config
        .library
        .module(&module)
        .map(|m| display_path(&m.clone))
        .unwrap_or_default();
    output::print(
        format!(
            "Pulling module \"{}\" changes from \"{}\" into {}",
            module, report.upstream, clone
        ),
        verbosity,
    );

    if report.is_up_to_date() {
        output::print("Already up to date.", verbosity);
        return Ok(());
    }

    output::print("Changelog:", verbosity);
    output::print(format_list(&report.changelog, "  * "), verbosity);
    output::print("Latest:", verbosity);
    output::print(
        format!(
            "\tCommit: {}\n\tDate: {}\n\tMessage:\n{}",
            report.head.oid,
            report.head.author_time.format("%Y-%m-%d %H:%M:%S %Z"),
            indent(report.head.message.trim(), "\t")
        ),
        verbosity,
    );
    Ok(())
}
