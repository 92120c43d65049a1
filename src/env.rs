//! Runtime environment detection.
//!
//! Determines the runtime environment (test, development, production) from
//! the `WEBSHELL_ENV` environment variable.
//!
//! Set `WEBSHELL_ENV` to one of:
//! - `test` - Test mode (config lives under the system temp dir)
//! - `development` or `dev` - Development mode (verbose default logging)
//! - (anything else or unset) - Production mode

/// Runtime environment for the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    /// Production environment (default).
    Production,
    /// Development environment.
    Development,
    /// Test environment.
    Test,
}

impl Environment {
    /// Detect current environment from `WEBSHELL_ENV`.
    #[must_use]
    pub fn current() -> Self {
        Self::parse(std::env::var("WEBSHELL_ENV").ok().as_deref())
    }

    fn parse(value: Option<&str>) -> Self {
        match value {
            Some("test") => Self::Test,
            Some("development" | "dev") => Self::Development,
            _ => Self::Production,
        }
    }

    /// Returns `true` if this is the test environment.
    #[must_use]
    pub fn is_test(self) -> bool {
        self == Self::Test
    }

    /// Returns `true` if this is the development environment.
    #[must_use]
    pub fn is_development(self) -> bool {
        self == Self::Development
    }

    /// Default `env_logger` filter for this environment.
    #[must_use]
    pub fn default_log_filter(self) -> &'static str {
        if self.is_development() {
            "debug"
        } else {
            "info"
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Production => write!(f, "production"),
            Self::Development => write!(f, "development"),
            Self::Test => write!(f, "test"),
        }
    }
}

/// Convenience function to check if running in test mode.
#[must_use]
pub fn is_test_mode() -> bool {
    Environment::current().is_test()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_parse() {
        assert_eq!(Environment::parse(Some("test")), Environment::Test);
        assert_eq!(Environment::parse(Some("dev")), Environment::Development);
        assert_eq!(
            Environment::parse(Some("development")),
            Environment::Development
        );
        assert_eq!(Environment::parse(Some("staging")), Environment::Production);
        assert_eq!(Environment::parse(None), Environment::Production);
    }

    #[test]
    fn test_environment_display() {
        assert_eq!(Environment::Production.to_string(), "production");
        assert_eq!(Environment::Development.to_string(), "development");
        assert_eq!(Environment::Test.to_string(), "test");
    }

    #[test]
    fn test_default_log_filter() {
        assert_eq!(Environment::Development.default_log_filter(), "debug");
        assert_eq!(Environment::Production.default_log_filter(), "info");
    }
}
