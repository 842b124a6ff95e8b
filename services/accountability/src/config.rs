//! Settings for the accountability batch service

use anyhow::Result;
use config::{Config, Environment};
use serde::Deserialize;

/// Cron schedules for the three nightly jobs
///
/// Expressions are in tokio-cron-scheduler's six-field format
/// (`sec min hour day month weekday`). Defaults fire the penalty job at
/// midnight, the reset sweep one minute later, and auto-completion one
/// minute after that.
#[derive(Debug, Clone, Deserialize)]
pub struct BatchSettings {
    pub penalty_schedule: String,
    pub reset_schedule: String,
    pub autocomplete_schedule: String,
}

impl BatchSettings {
    /// Load settings, layering `ACCT_`-prefixed environment variables over
    /// the defaults
    ///
    /// # Environment Variables
    /// - `ACCT_PENALTY_SCHEDULE`: cron expression for the penalty job
    /// - `ACCT_RESET_SCHEDULE`: cron expression for the reset sweep
    /// - `ACCT_AUTOCOMPLETE_SCHEDULE`: cron expression for auto-completion
    pub fn load() -> Result<Self> {
        let settings = Config::builder()
            .set_default("penalty_schedule", "0 0 0 * * *")?
            .set_default("reset_schedule", "0 1 0 * * *")?
            .set_default("autocomplete_schedule", "0 2 0 * * *")?
            .add_source(Environment::with_prefix("ACCT"))
            .build()?
            .try_deserialize()?;

        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn load_uses_nightly_defaults() {
        unsafe {
            std::env::remove_var("ACCT_PENALTY_SCHEDULE");
            std::env::remove_var("ACCT_RESET_SCHEDULE");
            std::env::remove_var("ACCT_AUTOCOMPLETE_SCHEDULE");
        }

        let settings = BatchSettings::load().unwrap();
        assert_eq!(settings.penalty_schedule, "0 0 0 * * *");
        assert_eq!(settings.reset_schedule, "0 1 0 * * *");
        assert_eq!(settings.autocomplete_schedule, "0 2 0 * * *");
    }

    #[test]
    #[serial]
    fn load_prefers_environment_overrides() {
        unsafe {
            std::env::set_var("ACCT_PENALTY_SCHEDULE", "0 30 3 * * *");
        }

        let settings = BatchSettings::load().unwrap();
        assert_eq!(settings.penalty_schedule, "0 30 3 * * *");
        assert_eq!(settings.reset_schedule, "0 1 0 * * *");

        unsafe {
            std::env::remove_var("ACCT_PENALTY_SCHEDULE");
        }
    }
}
