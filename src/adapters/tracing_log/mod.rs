// Tracing log adapter - Structured logging using tracing crate

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::{ReelcutError, ReelcutResult};
use crate::settings::LogSettings;

/// Installs the global `tracing` subscriber
pub struct TracingLogAdapter;

impl TracingLogAdapter {
    /// `RUST_LOG` wins over the configured level when set
    pub fn init(settings: &LogSettings) -> ReelcutResult<()> {
        let filter = Self::filter(settings)?;
        let registry = tracing_subscriber::registry().with(filter);

        let result = if settings.json {
            registry
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .try_init()
        } else {
            registry
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .try_init()
        };

        result.map_err(|e| ReelcutError::Logging {
            message: e.to_string(),
        })
    }

    fn filter(settings: &LogSettings) -> ReelcutResult<EnvFilter> {
        if let Ok(filter) = EnvFilter::try_from_default_env() {
            return Ok(filter);
        }
        EnvFilter::try_new(Self::directive(&settings.level)).map_err(|e| ReelcutError::Logging {
            message: format!("invalid log level {:?}: {}", settings.level, e),
        })
    }

    /// A bare level also enables request tracing from tower-http
    fn directive(level: &str) -> String {
        let level = level.trim();
        if level.contains('=') || level.contains(',') {
            level.to_string()
        } else {
            format!("reelcut={level},tower_http={level}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_level_expands() {
        assert_eq!(
            TracingLogAdapter::directive("debug"),
            "reelcut=debug,tower_http=debug"
        );
    }

    #[test]
    fn test_full_directive_kept() {
        assert_eq!(
            TracingLogAdapter::directive("reelcut=trace,hyper=warn"),
            "reelcut=trace,hyper=warn"
        );
    }
}
