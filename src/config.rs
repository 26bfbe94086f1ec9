use std::collections::HashMap;

use serde::Deserialize;

use crate::env::{EnvProvider, EnvSnapshot, Layered, ProcessEnv};

/// Where prepended module references end up relative to each other.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportOrder {
    /// Each reference goes to the very top, so the last one resolved comes first.
    #[default]
    Reverse,
    /// References keep the order they were resolved in.
    Source,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// Variables that win over the process environment.
    pub env: HashMap<String, String>,
    pub inherit_process_env: bool,
    pub import_order: ImportOrder,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            env: HashMap::new(),
            inherit_process_env: true,
            import_order: ImportOrder::default(),
        }
    }
}

impl Config {
    /// Parses the plugin's JSON config; anything unreadable falls back to defaults.
    pub fn from_json(raw: &str) -> Self {
        match serde_json::from_str(raw) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(%err, "invalid perenv plugin config, using defaults");
                Self::default()
            }
        }
    }

    pub fn env_provider(&self) -> Box<dyn EnvProvider> {
        let snapshot = EnvSnapshot::new(self.env.clone());
        if self.inherit_process_env {
            Box::new(Layered {
                over: snapshot,
                under: ProcessEnv,
            })
        } else {
            Box::new(snapshot)
        }
    }
}
