//! Logging initialization and utilities

/// Initialize the logging system
///
/// Uses env_logger with default filter level of `info`.
/// Override with RUST_LOG environment variable (e.g. `RUST_LOG=procanim=debug`
/// to see animator lifecycle transitions).
///
/// # Example
/// ```
/// procanim::core::logging::init();
/// log::info!("Preview started");
/// ```
pub fn init() {
    let _ = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info")
    ).try_init();
}
