//! Secret lookup
//!
//! Secrets are looked up by name. In deployments they are mounted as one file per
//! secret under a fixed directory; when the file is absent the process environment
//! is consulted. `LayeredSecrets::mounted_then_env` fixes that precedence.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

/// Directory where the orchestrator mounts secret files
pub const DEFAULT_SECRETS_DIR: &str = "/etc/secrets";

/// Source of named secret values.
///
/// Empty values are treated as absent by every implementation in this module.
pub trait SecretProvider: Send + Sync {
    fn lookup(&self, name: &str) -> Option<String>;
}

/// Reads `<dir>/<name>`, trimmed.
#[derive(Debug, Clone)]
pub struct MountedSecrets {
    dir: PathBuf,
}

impl MountedSecrets {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl Default for MountedSecrets {
    fn default() -> Self {
        Self::new(DEFAULT_SECRETS_DIR)
    }
}

fn is_plain_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\'])
        && !name.contains('\0')
}

impl SecretProvider for MountedSecrets {
    fn lookup(&self, name: &str) -> Option<String> {
        if !is_plain_name(name) {
            tracing::warn!(secret = %name, "Refusing to read secret with a path-like name");
            return None;
        }

        let path = self.dir.join(name);
        match std::fs::read_to_string(&path) {
            Ok(contents) => non_empty(contents.trim()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => {
                tracing::warn!(
                    secret = %name,
                    path = %path.display(),
                    error = %e,
                    "Failed to read mounted secret"
                );
                None
            }
        }
    }
}

/// Reads the process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvSecrets;

impl SecretProvider for EnvSecrets {
    fn lookup(&self, name: &str) -> Option<String> {
        std::env::var(name).ok().and_then(|v| non_empty(&v))
    }
}

/// Fixed in-memory values. Useful for tests and for embedding callers that
/// already resolved their configuration.
#[derive(Debug, Clone, Default)]
pub struct StaticSecrets {
    values: HashMap<String, String>,
}

impl StaticSecrets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for StaticSecrets {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl SecretProvider for StaticSecrets {
    fn lookup(&self, name: &str) -> Option<String> {
        self.values.get(name).and_then(|v| non_empty(v))
    }
}

/// First provider that returns a value wins.
pub struct LayeredSecrets {
    layers: Vec<Box<dyn SecretProvider>>,
}

impl LayeredSecrets {
    pub fn new(layers: Vec<Box<dyn SecretProvider>>) -> Self {
        Self { layers }
    }

    /// Mounted secret files take precedence over environment variables.
    pub fn mounted_then_env(dir: impl Into<PathBuf>) -> Self {
        Self::new(vec![
            Box::new(MountedSecrets::new(dir)),
            Box::new(EnvSecrets),
        ])
    }

    /// Uses `SECRETS_DIR` when set, otherwise `/etc/secrets`.
    pub fn from_env() -> Self {
        let dir = std::env::var("SECRETS_DIR").unwrap_or_else(|_| DEFAULT_SECRETS_DIR.to_string());
        Self::mounted_then_env(dir)
    }
}

impl SecretProvider for LayeredSecrets {
    fn lookup(&self, name: &str) -> Option<String> {
        self.layers.iter().find_map(|layer| layer.lookup(name))
    }
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_secret(dir: &Path, name: &str, value: &str) {
        std::fs::write(dir.join(name), value).expect("write secret");
    }

    #[test]
    fn mounted_secret_is_trimmed() {
        let dir = tempfile::tempdir().unwrap();
        write_secret(dir.path(), "CLEANER_API_KEY", "  s3cret\n");

        let secrets = MountedSecrets::new(dir.path());
        assert_eq!(secrets.lookup("CLEANER_API_KEY").as_deref(), Some("s3cret"));
    }

    #[test]
    fn missing_or_blank_mounted_secret_is_absent() {
        let dir = tempfile::tempdir().unwrap();
        write_secret(dir.path(), "BLANK", "\n");

        let secrets = MountedSecrets::new(dir.path());
        assert!(secrets.lookup("NOPE").is_none());
        assert!(secrets.lookup("BLANK").is_none());
    }

    #[test]
    fn mounted_lookup_rejects_path_like_names() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("sub");
        std::fs::create_dir(&nested).unwrap();
        write_secret(dir.path(), "outside", "leak");

        let secrets = MountedSecrets::new(&nested);
        assert!(secrets.lookup("../outside").is_none());
        assert!(secrets.lookup("..").is_none());
    }

    #[test]
    fn mounted_secret_takes_precedence() {
        let dir = tempfile::tempdir().unwrap();
        write_secret(dir.path(), "DB_USER", "from-file");

        let layered = LayeredSecrets::new(vec![
            Box::new(MountedSecrets::new(dir.path())),
            Box::new(StaticSecrets::new().with("DB_USER", "from-env")),
        ]);
        assert_eq!(layered.lookup("DB_USER").as_deref(), Some("from-file"));
    }

    #[test]
    fn falls_back_when_file_absent() {
        let dir = tempfile::tempdir().unwrap();

        let layered = LayeredSecrets::new(vec![
            Box::new(MountedSecrets::new(dir.path())),
            Box::new(StaticSecrets::new().with("DB_PASSWORD", "from-env")),
        ]);
        assert_eq!(layered.lookup("DB_PASSWORD").as_deref(), Some("from-env"));
        assert!(layered.lookup("UNSET").is_none());
    }

    #[test]
    fn static_secrets_from_iter() {
        let secrets: StaticSecrets = [("A", "1"), ("B", "")].into_iter().collect();
        assert_eq!(secrets.lookup("A").as_deref(), Some("1"));
        assert!(secrets.lookup("B").is_none());
    }
}
