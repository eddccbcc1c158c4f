use librarian::cli::{self, Cli};
use librarian::engine::SyncError;
use librarian::ui::output;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse_args();
    init_logging(cli.debug);

    if let Err(err) = cli::run(cli) {
        output::error(format!("{:#}", err));
        let code = err
            .downcast_ref::<SyncError>()
            .map(SyncError::exit_code)
            .unwrap_or(1);
        std::process::exit(code);
    }
}

/// Diagnostics go to stderr; `RUST_LOG` overrides the level from `--debug`.
fn init_logging(debug: bool) {
    let default_level = if debug { "librarian=debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
