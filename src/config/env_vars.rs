use std::collections::HashMap;

/// Source of environment variable values.
///
/// The hive locator consults the environment only as a last resort, so the
/// lookup is kept behind a trait object. Tests swap in a fixed map instead
/// of mutating the process environment.
pub trait EnvLookup: Send + Sync {
    /// Returns the value of `name`, or `None` when unset or empty.
    fn get(&self, name: &str) -> Option<String>;
}

/// Reads the real process environment.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessEnv;

impl EnvLookup for ProcessEnv {
    fn get(&self, name: &str) -> Option<String> {
        std::env::var(name).ok().filter(|value| !value.is_empty())
    }
}

/// Fixed set of variables, for tests and embedding.
#[derive(Debug, Default, Clone)]
pub struct StaticEnv(HashMap<String, String>);

impl StaticEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, value: &str) -> Self {
        self.0.insert(name.to_string(), value.to_string());
        self
    }
}

impl EnvLookup for StaticEnv {
    fn get(&self, name: &str) -> Option<String> {
        self.0.get(name).filter(|value| !value.is_empty()).cloned()
    }
}

/// Default lookup used by the command line tool
pub fn process_env() -> Box<dyn EnvLookup> {
    Box::new(ProcessEnv)
}
