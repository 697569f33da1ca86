use tracing_subscriber::EnvFilter;

/// Install the process-wide tracing subscriber.  `env_filter` takes the same syntax as `RUST_LOG`,
/// so a bare level (`info`) or per-module directives (`kx_core::simulator=debug`) both work.
pub fn setup(env_filter: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(env_filter))
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .compact()
        .init();
}
