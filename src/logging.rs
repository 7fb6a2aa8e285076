use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Installs the global subscriber. `RUST_LOG` overrides the default of
/// warnings only; output goes to stderr so `--json` stays parseable.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, EnvFilter};

        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("moneta=warn"));

        fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    });
}
