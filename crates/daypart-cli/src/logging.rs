use tracing_subscriber::{EnvFilter, fmt};

const DEFAULT_FILTER: &str = "warn";
const VERBOSE_FILTER: &str = "info";

/// Installs the stderr subscriber. `RUST_LOG` wins over `--verbose`; stdout
/// stays reserved for command output.
pub fn init(verbose: bool) {
    let fallback = if verbose { VERBOSE_FILTER } else { DEFAULT_FILTER };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// `--verbose`/`-v` anywhere in the raw arguments.
pub fn verbose_requested(raw_args: &[String]) -> bool {
    raw_args
        .iter()
        .skip(1)
        .any(|value| value == "--verbose" || value == "-v")
}
