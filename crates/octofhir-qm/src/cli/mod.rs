//! CLI functionality for the measure transfer tool
//!
//! - Record conversion
//! - Unit code lookup
//! - Output formatting

pub mod convert;
pub mod output;
pub mod unit;

/// Install the logger.
///
/// `RUST_LOG` is honoured with a `warn` default; `verbose` forces `debug`.
pub fn init_logging(verbose: bool) {
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    // A second initialisation (tests, embedding) keeps the first logger
    let _ = builder.try_init();
}
