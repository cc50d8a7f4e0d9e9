//! Tests for [`MatcherConfig`].

use crate::{ConfigError, MatcherConfig};

#[test]
fn default_config_has_expected_values() {
    let config = MatcherConfig::default();
    assert_eq!(config.max_nesting_depth(), 64);
    assert!(config.skip_body_comments());
    assert!(config.unwrap_parenthesized_calls());
    assert_eq!(config.empty_placeholder_prefix(), "__empty_");
}

#[test]
fn custom_config_construction() {
    let config = MatcherConfig::new(3, false, false, String::from("__hole_"));
    assert_eq!(config.max_nesting_depth(), 3);
    assert!(!config.skip_body_comments());
    assert!(!config.unwrap_parenthesized_calls());
    assert_eq!(config.empty_placeholder_prefix(), "__hole_");
}

#[test]
fn builder_methods_override_single_fields() {
    let config = MatcherConfig::default()
        .with_skip_body_comments(false)
        .with_empty_placeholder_prefix("");
    assert!(!config.skip_body_comments());
    assert!(config.unwrap_parenthesized_calls());
    assert_eq!(config.empty_placeholder_prefix(), "");
}

#[test]
fn zero_nesting_depth_is_rejected() {
    let config = MatcherConfig::default().with_max_nesting_depth(0);
    assert_eq!(config.validate(), Err(ConfigError::ZeroNestingDepth));
    assert_eq!(MatcherConfig::default().validate(), Ok(()));
}

#[test]
fn partial_json_falls_back_to_defaults() {
    let config: MatcherConfig =
        serde_json::from_str(r#"{"max_nesting_depth": 5}"#).expect("deserialize");
    assert_eq!(config.max_nesting_depth(), 5);
    assert!(config.skip_body_comments());
    assert_eq!(config.empty_placeholder_prefix(), "__empty_");
}
