// Small logging facade with DEBUG/INFO/ERROR helpers, backed by tracing.
// `init` installs a fmt subscriber on stderr; RUST_LOG overrides the level
// unless --debug forces it.

use std::sync::atomic::{AtomicBool, Ordering};
use tracing_subscriber::EnvFilter;

static DEBUG: AtomicBool = AtomicBool::new(false);

// Install the global subscriber. Safe to call more than once (tests).
pub fn init(debug: bool) {
    set_debug(debug);
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

pub fn set_debug(enabled: bool) {
    DEBUG.store(enabled, Ordering::Relaxed);
}

// True if --debug was given or the subscriber accepts DEBUG events.
pub fn is_debug() -> bool {
    DEBUG.load(Ordering::Relaxed) || tracing::enabled!(tracing::Level::DEBUG)
}

pub fn info(msg: &str) {
    tracing::info!("{msg}");
}

pub fn debug(msg: &str) {
    tracing::debug!("{msg}");
}

pub fn error(msg: &str) {
    tracing::error!("{msg}");
}
