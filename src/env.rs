use std::collections::HashMap;

/// Read-only view of the environment the transform decides against.
pub trait EnvProvider {
    fn var(&self, name: &str) -> Option<String>;
}

/// The live process environment.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessEnv;

impl EnvProvider for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// A fixed set of variables, e.g. from plugin config or a test.
#[derive(Debug, Default, Clone)]
pub struct EnvSnapshot {
    vars: HashMap<String, String>,
}

impl EnvSnapshot {
    pub fn new(vars: HashMap<String, String>) -> Self {
        Self { vars }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for EnvSnapshot {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl EnvProvider for EnvSnapshot {
    fn var(&self, name: &str) -> Option<String> {
        self.vars.get(name).cloned()
    }
}

/// Looks a name up in `over` first and falls back to `under`.
pub struct Layered<A, B> {
    pub over: A,
    pub under: B,
}

impl<A: EnvProvider, B: EnvProvider> EnvProvider for Layered<A, B> {
    fn var(&self, name: &str) -> Option<String> {
        self.over.var(name).or_else(|| self.under.var(name))
    }
}

/// `envar` must be set (to anything non-empty), or equal `expected` when given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvCondition {
    pub envar: String,
    pub expected: Option<String>,
}

impl EnvCondition {
    pub fn is_satisfied(&self, env: &dyn EnvProvider) -> bool {
        let live = env.var(&self.envar);
        match &self.expected {
            Some(expected) => live.as_deref() == Some(expected.as_str()),
            None => live.is_some_and(|v| !v.is_empty()),
        }
    }
}

/// Renders a live value the way it shows up in diagnostics.
pub(crate) fn display_value(value: Option<&str>) -> String {
    value.unwrap_or("undefined").to_string()
}
