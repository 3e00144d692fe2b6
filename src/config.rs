//! Configuration loaded from environment variables
//!
//! | Variable | Default | Meaning |
//! |---|---|---|
//! | `TOPIC_FILTER_ALPHA` | `0.3` | smoothing coefficient shared by every variable |
//! | `TOPIC_FILTER_VARIABLES` | catalog environment group | comma separated variable list |
//! | `TOPIC_FILTER_NODE_NAME` | `topic_filter` | node name on the bus |

use crate::catalog;
use crate::error::{Error, Result};
use crate::perception::filters::{Ewma, DEFAULT_ALPHA};
use std::env;

pub const DEFAULT_NODE_NAME: &str = "topic_filter";

/// Relay configuration
#[derive(Debug, Clone, PartialEq)]
pub struct FilterConfig {
    /// Smoothing coefficient in (0, 1]
    pub alpha: f64,

    /// Node name used when registering on the bus
    pub node_name: String,

    /// Explicit variable list. `None` falls back to the catalog's
    /// environment group; an empty list relays nothing.
    pub variables: Option<Vec<String>>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        FilterConfig {
            alpha: DEFAULT_ALPHA,
            node_name: DEFAULT_NODE_NAME.to_string(),
            variables: None,
        }
    }
}

impl FilterConfig {
    /// Load configuration from the process environment (and `.env` if present)
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let alpha = match lookup("TOPIC_FILTER_ALPHA") {
            Some(raw) => raw
                .trim()
                .parse::<f64>()
                .map_err(|e| Error::config(format!("Invalid TOPIC_FILTER_ALPHA: {}", e)))?,
            None => DEFAULT_ALPHA,
        };
        Ewma::new(alpha).map_err(|e| Error::config(format!("Invalid TOPIC_FILTER_ALPHA: {}", e)))?;

        let node_name = lookup("TOPIC_FILTER_NODE_NAME")
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| DEFAULT_NODE_NAME.to_string());

        let variables = lookup("TOPIC_FILTER_VARIABLES").map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .collect::<Vec<_>>()
        });

        Ok(FilterConfig {
            alpha,
            node_name,
            variables,
        })
    }

    /// Variables to relay
    pub fn resolve_variables(&self) -> Vec<String> {
        match &self.variables {
            Some(variables) => variables.clone(),
            None => catalog::environment_variables()
                .into_iter()
                .map(str::to_string)
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = FilterConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, FilterConfig::default());
        assert_eq!(config.alpha, 0.3);
        assert_eq!(config.node_name, "topic_filter");
        assert_eq!(config.resolve_variables(), catalog::environment_variables());
    }

    #[test]
    fn test_overrides() {
        let config = FilterConfig::from_lookup(lookup_from(&[
            ("TOPIC_FILTER_ALPHA", "0.5"),
            ("TOPIC_FILTER_NODE_NAME", "bench_filter"),
            ("TOPIC_FILTER_VARIABLES", " air_temperature, ,water_temperature "),
        ]))
        .unwrap();

        assert_eq!(config.alpha, 0.5);
        assert_eq!(config.node_name, "bench_filter");
        assert_eq!(
            config.resolve_variables(),
            vec!["air_temperature".to_string(), "water_temperature".to_string()]
        );
    }

    #[test]
    fn test_empty_variable_list_is_valid() {
        let config =
            FilterConfig::from_lookup(lookup_from(&[("TOPIC_FILTER_VARIABLES", "")])).unwrap();
        assert!(config.resolve_variables().is_empty());
    }

    #[test]
    fn test_invalid_alpha_is_config_error() {
        for raw in ["abc", "0", "1.2", "-0.1"] {
            let result = FilterConfig::from_lookup(lookup_from(&[("TOPIC_FILTER_ALPHA", raw)]));
            assert!(matches!(result, Err(Error::Config(_))), "alpha {raw}");
        }
    }
}
