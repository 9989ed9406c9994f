//! Server configuration from the process environment.

use std::path::PathBuf;
use std::str::FromStr;

use attrition_inferences::ArtifactPaths;
use log::warn;

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: usize,
    pub artifacts: ArtifactPaths,
    pub static_dir: PathBuf,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any key lookup; unset keys take defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let text = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        ServerConfig {
            host: text("HOST", "127.0.0.1"),
            port: parsed(&lookup, "PORT", 8080),
            // Requests are served one at a time against the shared artifacts.
            workers: parsed(&lookup, "WORKERS", 1usize).max(1),
            artifacts: ArtifactPaths::new(
                text("TRANSFORMER_PATH", "models/transformer.json"),
                text("MODEL_PATH", "models/model.json"),
            ),
            static_dir: PathBuf::from(text("STATIC_DIR", "./static")),
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parsed<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + std::fmt::Display + Copy,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("Invalid {key}={raw:?}, using {default}");
            default
        }),
        None => default,
    }
}
