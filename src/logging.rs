use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Map the `-v` count onto a tracing level
pub fn level_for(verbosity: u8) -> Level {
    match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Install the stderr subscriber. `RUST_LOG` directives are honoured on top
/// of the verbosity level.
pub fn init(verbosity: u8) {
    let filter = EnvFilter::from_default_env().add_directive(level_for(verbosity).into());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbosity >= 2)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_level_mapping() {
        assert_eq!(level_for(0), Level::WARN);
        assert_eq!(level_for(1), Level::INFO);
        assert_eq!(level_for(2), Level::DEBUG);
        assert_eq!(level_for(3), Level::TRACE);
        assert_eq!(level_for(9), Level::TRACE);
    }
}
