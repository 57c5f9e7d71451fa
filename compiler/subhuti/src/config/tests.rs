use std::time::Duration;

use super::*;

#[test]
fn timeout_override() {
    let config = apply_timeout(AnalysisConfig::default(), Some("250".to_owned()));
    assert_eq!(config.timeout, Duration::from_millis(250));
}

#[test]
fn invalid_or_missing_override_keeps_the_default() {
    let default = AnalysisConfig::default();
    assert_eq!(apply_timeout(default.clone(), None), default);
    assert_eq!(
        apply_timeout(default.clone(), Some("soon".to_owned())),
        default
    );
}
