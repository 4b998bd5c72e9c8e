// ABOUTME: holds the run configuration and the api credentials needed by the pipeline.
// ABOUTME: loads an optional key=value env file before credentials are read from the environment.

use std::path::{Path, PathBuf};

pub const GEMINI_KEY_VAR: &str = "GEMINI_API_KEY";
pub const NEYNAR_KEY_VAR: &str = "NEYNAR_API_KEY";

#[derive(Debug, Clone)]
pub struct Config {
    pub output: PathBuf,
    pub fid: u64,
    pub limit: u32,
    pub author_name: String,
    pub feed_url: String,
    pub model_base_url: String,
    pub model: String,
}

#[derive(Clone)]
pub struct Credentials {
    pub gemini_api_key: String,
    pub neynar_api_key: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("gemini_api_key", &"[redacted]")
            .field("neynar_api_key", &"[redacted]")
            .finish()
    }
}

impl Credentials {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let read = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let gemini = read(GEMINI_KEY_VAR);
        let neynar = read(NEYNAR_KEY_VAR);

        match (gemini, neynar) {
            (Some(gemini_api_key), Some(neynar_api_key)) => Ok(Self {
                gemini_api_key,
                neynar_api_key,
            }),
            (gemini, neynar) => {
                let missing: Vec<&str> = [(GEMINI_KEY_VAR, gemini.is_none()), (NEYNAR_KEY_VAR, neynar.is_none())]
                    .into_iter()
                    .filter_map(|(key, missing)| missing.then_some(key))
                    .collect();
                Err(anyhow::anyhow!(
                    "{GEMINI_KEY_VAR} and {NEYNAR_KEY_VAR} must be set in the environment or the env file; missing: {}",
                    missing.join(", ")
                ))
            }
        }
    }
}

/// Loads `path` into the process environment, overriding existing values.
/// A missing file is not an error; an unparseable one is logged and skipped.
pub fn load_env_file(path: &Path) {
    if !path.exists() {
        return;
    }

    match dotenvy::from_path_override(path) {
        Ok(()) => tracing::info!(path = %path.display(), "loaded environment variables from env file"),
        Err(err) => tracing::warn!(path = %path.display(), "could not load env file: {err}"),
    }
}
