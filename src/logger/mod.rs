//! Console logging: `YYYY-mm-dd HH:MM:SS LEVEL message` lines on stdout.

use tracing::Level;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::ChronoLocal;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Default filter for the given verbosity; `RUST_LOG` takes precedence.
#[must_use]
pub fn default_level(debug: bool) -> Level {
    if debug { Level::DEBUG } else { Level::INFO }
}

/// Install the global subscriber. Calling this twice is harmless; the second
/// call is ignored.
pub fn init(debug: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level(debug).as_str()));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stdout)
        .with_timer(ChronoLocal::new(TIME_FORMAT.to_string()))
        .with_target(false)
        .with_ansi(false)
        .try_init();
}
