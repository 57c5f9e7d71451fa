//! Environment overrides.

use std::time::Duration;

use subhuti_grammar::AnalysisConfig;
use tracing::warn;

/// Milliseconds allowed for one grammar analysis.
pub const TIMEOUT_ENV_VAR: &str = "SUBHUTI_ANALYSIS_TIMEOUT_MS";

/// Default analysis configuration, with the timeout taken from
/// `SUBHUTI_ANALYSIS_TIMEOUT_MS` when it is set to a number.
pub fn analysis_config_from_env() -> AnalysisConfig {
    apply_timeout(AnalysisConfig::default(), std::env::var(TIMEOUT_ENV_VAR).ok())
}

fn apply_timeout(config: AnalysisConfig, value: Option<String>) -> AnalysisConfig {
    let Some(value) = value else {
        return config;
    };
    match value.trim().parse::<u64>() {
        Ok(ms) => config.with_timeout(Duration::from_millis(ms)),
        Err(err) => {
            warn!(var = TIMEOUT_ENV_VAR, %value, %err, "ignoring invalid analysis timeout");
            config
        }
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "tests use unwrap for brevity"
)]
mod tests;
