use tracing::Level;

/// Verbosity picked from the global flags; warnings by default.
pub fn level(verbose: bool, quiet: bool) -> Level {
    if verbose {
        Level::INFO
    } else if quiet {
        Level::ERROR
    } else {
        Level::WARN
    }
}

pub fn init(level: Level) {
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_levels() {
        assert_eq!(level(false, false), Level::WARN);
        assert_eq!(level(true, false), Level::INFO);
        assert_eq!(level(false, true), Level::ERROR);
    }
}
