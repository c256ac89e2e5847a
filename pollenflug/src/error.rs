//! Mapping of failures to user-facing messages and exit codes

use colored::Colorize;
use pollen_core::ConfigError;

use crate::exitcode;

/// A fatal error together with how much detail to show for it.
#[derive(Debug)]
pub struct Failure {
    pub error: anyhow::Error,
    pub verbose: bool,
}

impl Failure {
    pub fn new(error: impl Into<anyhow::Error>, verbose: bool) -> Self {
        Self { error: error.into(), verbose }
    }

    pub fn exit_code(&self) -> u8 {
        if let Some(err) = self.error.downcast_ref::<ConfigError>() {
            return match err {
                ConfigError::InvalidArguments(_) => exitcode::USAGE,
                _ => exitcode::CONFIG,
            };
        }
        // request failures and anything unexpected
        exitcode::SOFTWARE
    }

    pub fn is_usage(&self) -> bool {
        self.exit_code() == exitcode::USAGE
    }

    /// Message for stderr; verbose mode appends the chain of causes.
    pub fn message(&self) -> String {
        if self.verbose {
            format!("{:#}", self.error)
        } else {
            self.error.to_string()
        }
    }

    pub fn report(&self) {
        eprintln!("{}: {}", "Error".red(), self.message());
    }
}
