/// Configuration for the issueflow data layer
///
/// Holds the workflow closing rule and the field limits enforced by the
/// validators. Defaults can be overridden through environment variables.

use crate::workflow::ClosingRule;
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// Default maximum attachment size (50 MiB)
pub const DEFAULT_MAX_ATTACHMENT_BYTES: u64 = 50 * 1024 * 1024;

/// Default upper bound for `per_page` in paginated listings
pub const DEFAULT_MAX_PER_PAGE: u32 = 100;

/// Main library configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Workflow engine configuration
    pub workflow: WorkflowConfig,
    /// Field size limits
    pub limits: LimitsConfig,
}

/// Workflow engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowConfig {
    /// How a status is classified as closing (`final_flag` or `literal_names`)
    pub closing_rule: ClosingRule,
}

/// Limits enforced by input validators
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Largest accepted attachment, in bytes
    pub max_attachment_bytes: u64,
    /// Largest accepted page size
    pub max_per_page: u32,
}

pub const CLOSING_RULE_VAR: &str = "ISSUEFLOW_CLOSING_RULE";
pub const MAX_ATTACHMENT_BYTES_VAR: &str = "ISSUEFLOW_MAX_ATTACHMENT_BYTES";
pub const MAX_PER_PAGE_VAR: &str = "ISSUEFLOW_MAX_PER_PAGE";

impl Config {
    /// Read the configuration from ENV_VARs, failing on any unparsable value
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let max_per_page = parse_var(&lookup, MAX_PER_PAGE_VAR)?.unwrap_or(DEFAULT_MAX_PER_PAGE);
        if max_per_page == 0 {
            return Err(anyhow!("{} must be at least 1", MAX_PER_PAGE_VAR));
        }

        Ok(Self {
            workflow: WorkflowConfig {
                closing_rule: parse_var(&lookup, CLOSING_RULE_VAR)?.unwrap_or_default(),
            },
            limits: LimitsConfig {
                max_attachment_bytes: parse_var(&lookup, MAX_ATTACHMENT_BYTES_VAR)?
                    .unwrap_or(DEFAULT_MAX_ATTACHMENT_BYTES),
                max_per_page,
            },
        })
    }

    fn built_in() -> Self {
        Self {
            workflow: WorkflowConfig {
                closing_rule: ClosingRule::default(),
            },
            limits: LimitsConfig::default(),
        }
    }
}

impl Default for Config {
    /// Default configuration with ENV_VAR overrides for container deployment
    ///
    /// An invalid override is logged and the built-in configuration is used.
    /// Call `Config::from_env` to treat it as an error instead.
    fn default() -> Self {
        Self::from_env().unwrap_or_else(|e| {
            tracing::warn!("⚠️ Ignoring environment configuration: {:#}", e);
            Self::built_in()
        })
    }
}

/// Parse an optional variable; present but invalid is an error
fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: Display,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| anyhow!("invalid {}={:?}: {}", key, raw, e))
        })
        .transpose()
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_attachment_bytes: DEFAULT_MAX_ATTACHMENT_BYTES,
            max_per_page: DEFAULT_MAX_PER_PAGE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_limits_defaults() {
        let limits = LimitsConfig::default();
        assert_eq!(limits.max_attachment_bytes, 52_428_800);
        assert_eq!(limits.max_per_page, 100);
    }

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_absent_vars_use_built_in_values() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, Config::built_in());
        assert_eq!(config.workflow.closing_rule, ClosingRule::FinalFlag);
    }

    #[test]
    fn test_env_overrides_are_parsed() {
        let config = Config::from_lookup(lookup(&[
            (CLOSING_RULE_VAR, "literal_names"),
            (MAX_ATTACHMENT_BYTES_VAR, "1024"),
            (MAX_PER_PAGE_VAR, " 25 "),
        ]))
        .unwrap();
        assert_eq!(config.workflow.closing_rule, ClosingRule::LiteralNames);
        assert_eq!(config.limits.max_attachment_bytes, 1024);
        assert_eq!(config.limits.max_per_page, 25);
    }

    #[test]
    fn test_misspelled_closing_rule_is_rejected() {
        let err = Config::from_lookup(lookup(&[(CLOSING_RULE_VAR, "literal_name")])).unwrap_err();
        let message = err.to_string();
        assert!(message.contains(CLOSING_RULE_VAR));
        assert!(message.contains("literal_name"));
    }

    #[test]
    fn test_invalid_limits_are_rejected() {
        assert!(Config::from_lookup(lookup(&[(MAX_ATTACHMENT_BYTES_VAR, "50MB")])).is_err());
        assert!(Config::from_lookup(lookup(&[(MAX_PER_PAGE_VAR, "-1")])).is_err());
        assert!(Config::from_lookup(lookup(&[(MAX_PER_PAGE_VAR, "0")])).is_err());
    }

    #[test]
    fn test_config_round_trips_through_json() {
        let config = Config {
            workflow: WorkflowConfig {
                closing_rule: ClosingRule::LiteralNames,
            },
            limits: LimitsConfig::default(),
        };
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["workflow"]["closing_rule"], "literal_names");

        let back: Config = serde_json::from_value(json).unwrap();
        assert_eq!(back, config);
    }
}
