//! Logging setup.
//!
//! The crate logs through [`tracing`]; binaries call [`init_logging`] once to
//! print those events on standard output. Debug mode is switched on with the
//! `PHAB_DEBUG` environment variable, set to anything but `0`, `no`, `off`,
//! `false` or `disable`:
//!
//! ```text
//! PHAB_DEBUG unset   →  INFO Some regular message
//! PHAB_DEBUG=1       →  2023-11-26T14:52:13.692Z DEBUG phab::simbad: Some debug message
//! ```
//!
//! `RUST_LOG` takes precedence over both levels when it is set.
use tracing_subscriber::EnvFilter;

/// Environment variable enabling debug mode.
pub const DEBUG_ENV_VAR: &str = "PHAB_DEBUG";

const DEBUG_OFF_VALUES: [&str; 5] = ["0", "no", "off", "false", "disable"];

/// Whether a `PHAB_DEBUG` value enables debug mode.
pub fn debug_mode_from(value: Option<&str>) -> bool {
    match value {
        Some(value) => !DEBUG_OFF_VALUES.contains(&value.to_lowercase().as_str()),
        None => false,
    }
}

pub fn debug_mode() -> bool {
    debug_mode_from(std::env::var(DEBUG_ENV_VAR).ok().as_deref())
}

fn env_filter(debug: bool) -> EnvFilter {
    let level = if debug { "debug" } else { "info" };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(format!("phab={level}")))
}

/// Install the global subscriber.
///
/// Return
/// ------
/// * `false` if a global subscriber was already installed, which is left untouched
pub fn init_logging() -> bool {
    let debug = debug_mode();
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter(debug))
        .with_writer(std::io::stdout);

    if debug {
        builder.try_init().is_ok()
    } else {
        builder.without_time().with_target(false).try_init().is_ok()
    }
}

#[cfg(test)]
mod logs_test {
    use super::*;

    #[test]
    fn test_debug_mode_values() {
        assert!(!debug_mode_from(None));
        assert!(debug_mode_from(Some("1")));
        assert!(debug_mode_from(Some("yes")));
        assert!(debug_mode_from(Some("")));
        for off in ["0", "no", "OFF", "False", "disable"] {
            assert!(!debug_mode_from(Some(off)), "{off} should disable debug mode");
        }
    }

    #[test]
    fn test_init_logging_twice() {
        init_logging();
        assert!(!init_logging());
    }
}
