use std::collections::HashMap;
use std::env as stdenv;
use std::path::PathBuf;

/// Snapshot of the process environment the playground reads from.
///
/// Configuration overrides and `PATH` lookups go through this type instead of
/// `std::env` directly, so tests can supply their own variables.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    /// Key-value store of environment variables (e.g., PATH, TMPDIR).
    pub vars: HashMap<String, String>,
}

impl Environment {
    /// Capture the current process variables.
    pub fn capture() -> Self {
        Self {
            vars: stdenv::vars().collect(),
        }
    }

    /// Build an environment from explicit pairs, ignoring the process state.
    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: vars
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Get the value of a variable, treating empty values as unset.
    pub fn get_var(&self, key: &str) -> Option<&str> {
        self.vars
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// Set or override a variable.
    pub fn set_var(&mut self, key: impl Into<String>, val: impl Into<String>) {
        self.vars.insert(key.into(), val.into());
    }

    /// The OS temp root, or `None` when the platform reports an empty path.
    ///
    /// `TMPDIR` from this snapshot wins over the live process value.
    pub fn temp_root(&self) -> Option<PathBuf> {
        let root = match self.get_var("TMPDIR") {
            Some(dir) => PathBuf::from(dir),
            None => stdenv::temp_dir(),
        };
        if root.as_os_str().is_empty() {
            None
        } else {
            Some(root)
        }
    }
}
