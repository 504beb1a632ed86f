//! Subscriber setup for hosts embedding the runtime.

/// Installs a `fmt` subscriber writing to stderr.
///
/// Filtering comes from `RUST_LOG` with `info` as the floor. If the host
/// already installed a global subscriber, that one stays.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .try_init();
}
