//! Runtime configuration.
//!
//! All environment lookups happen once, in `Config::from_env` at startup; the
//! resulting struct is shared (Arc) with every command handler so nothing in
//! the handler bodies reaches for the environment on its own.
//! Discord token is resolved (in order) from: DISCORD_BOT_TOKEN env, then a
//! .config.env file (current dir, then ~/.ollama-bridge). Token is never logged.

use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Model used when neither MODEL nor a per-user switch-model is set.
pub const DEFAULT_MODEL: &str = "llama3.2:latest";

/// Immutable runtime configuration, built once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Ollama server host (OLLAMA_IP, default 127.0.0.1).
    pub ollama_ip: String,
    /// Ollama server port (OLLAMA_PORT, default 11434).
    pub ollama_port: u16,
    /// Model reported when a user has no switch-model override (MODEL env).
    pub default_model: String,
    /// Directory holding per-user config files and preprompt.txt (DATA_DIR, default "data").
    pub data_dir: PathBuf,
}

impl Config {
    /// Build configuration from the environment. Missing variables fall back
    /// to local defaults; nothing here fails.
    pub fn from_env() -> Self {
        let ollama_ip = std::env::var("OLLAMA_IP").unwrap_or_else(|_| "127.0.0.1".to_string());
        let ollama_port = std::env::var("OLLAMA_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(11434);
        let default_model = std::env::var("MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        let data_dir = std::env::var("DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("data"));

        info!(
            "Config: Ollama at {}:{}, default model '{}', data dir {:?}",
            ollama_ip, ollama_port, default_model, data_dir
        );
        Self {
            ollama_ip,
            ollama_port,
            default_model,
            data_dir,
        }
    }

    /// Base URL of the Ollama HTTP API, e.g. "http://127.0.0.1:11434".
    pub fn ollama_base_url(&self) -> String {
        format!("http://{}:{}", self.ollama_ip, self.ollama_port)
    }

    /// Path to the persisted pre-prompt text file.
    pub fn preprompt_path(&self) -> PathBuf {
        self.data_dir.join("preprompt.txt")
    }

    /// Path to one user's JSON config file.
    pub fn user_config_path(&self, username: &str) -> PathBuf {
        self.data_dir.join(format!("{}-config.json", username))
    }

    /// Ensure the data directory exists.
    pub fn ensure_data_dir(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.data_dir)
    }

    /// Get the version string from CARGO_PKG_VERSION.
    pub fn version() -> String {
        env!("CARGO_PKG_VERSION").to_string()
    }

    /// Log file path: `$HOME/.ollama-bridge/debug.log`, temp dir fallback.
    pub fn log_file_path() -> PathBuf {
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home).join(".ollama-bridge").join("debug.log");
        }
        std::env::temp_dir().join("ollama-bridge-debug.log")
    }
}

/// Read the bot token from a .config.env-style file (DISCORD_BOT_TOKEN= line).
fn token_from_config_env_file(path: &Path) -> Option<String> {
    let content = std::fs::read_to_string(path).ok()?;
    let token = content
        .lines()
        .find(|l| l.trim_start().starts_with("DISCORD_BOT_TOKEN="))
        .and_then(|l| l.split_once('='))
        .map(|(_, v)| v.trim().to_string());
    token.filter(|t| !t.is_empty())
}

/// Get the Discord bot token: DISCORD_BOT_TOKEN env, then .config.env in the
/// current dir, then ~/.ollama-bridge/.config.env.
pub fn get_discord_token() -> Option<String> {
    if let Ok(t) = std::env::var("DISCORD_BOT_TOKEN") {
        let t = t.trim().to_string();
        if !t.is_empty() {
            info!("Config: Token from DISCORD_BOT_TOKEN env");
            return Some(t);
        }
    }
    if let Ok(cwd) = std::env::current_dir() {
        let p = cwd.join(".config.env");
        if p.is_file() {
            if let Some(t) = token_from_config_env_file(&p) {
                info!("Config: Token from .config.env (current dir)");
                return Some(t);
            }
        }
    }
    if let Ok(home) = std::env::var("HOME") {
        let p = Path::new(&home).join(".ollama-bridge").join(".config.env");
        if p.is_file() {
            if let Some(t) = token_from_config_env_file(&p) {
                info!("Config: Token from ~/.ollama-bridge/.config.env");
                return Some(t);
            }
        }
    }
    debug!("Config: No Discord token found (env or .config.env)");
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn test_config() -> Config {
        Config {
            ollama_ip: "127.0.0.1".to_string(),
            ollama_port: 11434,
            default_model: DEFAULT_MODEL.to_string(),
            data_dir: PathBuf::from("data"),
        }
    }

    #[test]
    fn user_config_path_is_keyed_by_username() {
        let cfg = test_config();
        assert_eq!(
            cfg.user_config_path("alice"),
            PathBuf::from("data/alice-config.json")
        );
        assert_eq!(cfg.preprompt_path(), PathBuf::from("data/preprompt.txt"));
    }

    #[test]
    fn base_url_joins_ip_and_port() {
        let cfg = Config {
            ollama_ip: "10.0.0.5".to_string(),
            ollama_port: 8080,
            ..test_config()
        };
        assert_eq!(cfg.ollama_base_url(), "http://10.0.0.5:8080");
    }

    #[test]
    fn token_file_parsing_skips_blank_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".config.env");

        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "# comment").unwrap();
        writeln!(f, "DISCORD_BOT_TOKEN=abc123").unwrap();
        assert_eq!(token_from_config_env_file(&path), Some("abc123".to_string()));

        std::fs::write(&path, "DISCORD_BOT_TOKEN=\n").unwrap();
        assert_eq!(token_from_config_env_file(&path), None);
    }
}
