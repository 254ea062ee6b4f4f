//! Tracing subscriber setup.
//!
//! `RUST_LOG` wins when set. Otherwise the configured level applies to this
//! service and the engine, with HTTP client/server internals held at `warn`.

use std::sync::Once;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static INIT: Once = Once::new();

pub fn init(level: &str, json: bool) {
  INIT.call_once(|| {
    let filter = if std::env::var("RUST_LOG").is_ok() {
      EnvFilter::from_default_env()
    } else {
      EnvFilter::new(default_directives(level))
    };

    let registry = tracing_subscriber::registry().with(filter);
    // Another subscriber may already be installed (embedding, tests).
    let _ = if json {
      registry
        .with(fmt::layer().json().with_writer(std::io::stderr))
        .try_init()
    } else {
      registry
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .try_init()
    };
  });
}

fn default_directives(level: &str) -> String {
  let level = match level.to_ascii_lowercase().as_str() {
    l @ ("trace" | "debug" | "info" | "warn" | "error") => l.to_string(),
    _ => "info".to_string(),
  };
  format!(
    "impact_api={level},impact_engine={level},tower_http={level},hyper=warn,reqwest=warn"
  )
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn unknown_level_falls_back_to_info() {
    assert!(default_directives("loud").starts_with("impact_api=info,"));
    assert!(default_directives("DEBUG").contains("impact_engine=debug"));
  }
}
