use log::LevelFilter;
use std::io::Write;

/// Maps the CLI verbosity switches onto a log level.
///
/// `--quiet` wins over `--verbose`, mirroring how the old quiet flag silenced
/// everything but warnings and errors.
pub fn level_for(quiet: bool, verbose: bool) -> LevelFilter {
    if quiet {
        LevelFilter::Warn
    } else if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

/// Installs the global logger. `RUST_LOG` still overrides the computed level.
pub fn init(quiet: bool, verbose: bool) {
    let mut builder = env_logger::Builder::new();
    builder
        .filter_level(level_for(quiet, verbose))
        // oxipng warns every time it declines to interlace
        .filter_module("oxipng", LevelFilter::Error)
        .format(|buf, record| match record.level() {
            log::Level::Error | log::Level::Warn | log::Level::Info => {
                writeln!(buf, "{}", record.args())
            }
            _ => writeln!(buf, "🔍 {}", record.args()),
        })
        .parse_default_env();

    // A second init (tests, embedding) is harmless.
    let _ = builder.try_init();
}
