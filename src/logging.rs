//! Tracing subscriber setup for the shell and the `swapper` tool.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::Subscriber;

/// Install a global formatting subscriber writing to stderr.
///
/// The filter is read from `RUST_LOG` and falls back to `default_directive` (usually
/// `info`). Calling this a second time leaves the first subscriber in place.
pub fn init(default_directive: &str) {
  let filter =
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

  let subscriber = Subscriber::builder()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .with_target(false)
    .finish();

  if tracing::subscriber::set_global_default(subscriber).is_err() {
    tracing::debug!("tracing subscriber already installed");
  }
}
