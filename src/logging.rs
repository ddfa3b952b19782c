//! Logger Setup
//!
//! One fmt subscriber per binary, leveled by the `LOG_LEVEL` environment
//! variable (`debug`, `info`, `warn`, `error`; default `info`).

use tracing::Level;

/// Installs the global subscriber. Call once at the top of `main`.
pub fn init() {
    let raw = std::env::var("LOG_LEVEL").unwrap_or_default();
    tracing_subscriber::fmt()
        .with_max_level(parse_level(&raw))
        .init();
}

fn parse_level(raw: &str) -> Level {
    match raw.trim().to_lowercase().as_str() {
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

#[cfg(test)]
mod tests {
    use super::parse_level;
    use tracing::Level;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("debug"), Level::DEBUG);
        assert_eq!(parse_level(" WARN "), Level::WARN);
        assert_eq!(parse_level("error"), Level::ERROR);
        assert_eq!(parse_level("info"), Level::INFO);
        assert_eq!(parse_level(""), Level::INFO);
        assert_eq!(parse_level("verbose"), Level::INFO);
    }
}
