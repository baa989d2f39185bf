use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub mod settings;
pub mod validation;

pub use settings::{Settings, SettingsSource};

/// Default filter directive, raised to `debug` by `--debug`
fn default_directive(debug: bool) -> &'static str {
    if debug {
        "zbx_cachet=debug,reqwest=info,hyper=warn"
    } else {
        "zbx_cachet=info,reqwest=warn,hyper=warn"
    }
}

/// Initialize logging with structured stderr output. `RUST_LOG` takes precedence.
pub fn init_logging(debug: bool) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(debug)));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(debug)
                .with_file(debug)
                .with_line_number(debug)
                .with_level(true)
                .compact(),
        )
        .try_init()?;

    tracing::debug!("Debug mode is on");
    Ok(())
}

/// Initialize logging for testing with reduced verbosity
pub fn init_test_logging() -> anyhow::Result<()> {
    let env_filter = EnvFilter::new("zbx_cachet=debug");

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_test_writer().compact())
        .try_init()
        .or_else(|_| Ok(())) // Ignore if already initialized
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive_follows_debug_flag() {
        assert!(default_directive(true).starts_with("zbx_cachet=debug"));
        assert!(default_directive(false).starts_with("zbx_cachet=info"));
    }

    #[test]
    fn test_test_logging_is_idempotent() {
        assert!(init_test_logging().is_ok());
        assert!(init_test_logging().is_ok());
    }
}
