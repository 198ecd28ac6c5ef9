// src/logging.rs
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::{LogFormat, Settings};

/// Install the global subscriber. `RUST_LOG` wins over `settings.log_level`.
/// Calling it twice is harmless (the second call returns an error we ignore).
pub fn init_tracing(settings: &Settings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},tower_http=warn", settings.log_level)));

    let registry = tracing_subscriber::registry().with(filter);
    let _ = match settings.log_format {
        LogFormat::Compact => registry.with(fmt::layer().compact()).try_init(),
        LogFormat::Json => registry.with(fmt::layer().json()).try_init(),
    };
}

/// Short, non-reversible id for a post; raw text never goes into logs.
pub fn anon_hash(text: &str) -> String {
    use sha2::{Digest, Sha256};
    let digest = Sha256::digest(text.as_bytes());
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anon_hash_is_stable_and_short() {
        let a = anon_hash("Great turnout at the town hall");
        assert_eq!(a.len(), 12);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(a, anon_hash("Great turnout at the town hall"));
        assert_ne!(a, anon_hash("great turnout at the town hall"));
    }

    #[test]
    fn init_twice_does_not_panic() {
        let s = Settings::default();
        init_tracing(&s);
        init_tracing(&s);
    }
}
