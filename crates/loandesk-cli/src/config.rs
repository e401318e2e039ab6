// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use loandesk_api::ResourcePath;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const APP_NAME: &str = "loandesk";

const CONFIG_VERSION: i64 = 1;
const DEFAULT_BASE_URL: &str = "http://localhost:5000/api";
const DEFAULT_TIMEOUT: &str = "10s";
const DEFAULT_LOG_LEVEL: &str = "info";
const TOKEN_FILE_NAME: &str = "session-token";
const LOG_FILE_NAME: &str = "loandesk.log";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub api: Api,
    #[serde(default)]
    pub session: Session,
    #[serde(default)]
    pub downloads: Downloads,
    #[serde(default)]
    pub log: Log,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            api: Api::default(),
            session: Session::default(),
            downloads: Downloads::default(),
            log: Log::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Api {
    pub base_url: Option<String>,
    pub resource: Option<String>,
    pub timeout: Option<String>,
}

impl Default for Api {
    fn default() -> Self {
        Self {
            base_url: Some(DEFAULT_BASE_URL.to_owned()),
            resource: Some(ResourcePath::default().as_str().to_owned()),
            timeout: Some(DEFAULT_TIMEOUT.to_owned()),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Session {
    pub token_path: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Downloads {
    pub dir: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Log {
    pub level: Option<String>,
    pub file: Option<String>,
}

impl Default for Log {
    fn default() -> Self {
        Self {
            level: Some(DEFAULT_LOG_LEVEL.to_owned()),
            file: None,
        }
    }
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os("LOANDESK_CONFIG_PATH") {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set LOANDESK_CONFIG_PATH to the config file")
        })?;
        Ok(config_root.join(APP_NAME).join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let value: toml::Value = toml::from_str(&raw)
            .with_context(|| format!("parse TOML config {}", path.display()))?;

        let version = value
            .get("version")
            .and_then(toml::Value::as_integer)
            .ok_or_else(|| {
                anyhow!(
                    "config file {} is not versioned. Add `version = 1` and put values under [api], [session], [downloads], and [log]",
                    path.display()
                )
            })?;

        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = 1",
                version,
                path.display()
            );
        }

        let config: Config = value
            .try_into()
            .with_context(|| format!("decode config {}", path.display()))?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        if let Some(base_url) = &self.api.base_url {
            let trimmed = base_url.trim();
            if trimmed.is_empty() {
                bail!("api.base_url in {} must not be empty", path.display());
            }
            if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
                bail!(
                    "api.base_url in {} must start with http:// or https://, got {:?}",
                    path.display(),
                    base_url
                );
            }
        }

        if let Some(resource) = &self.api.resource
            && ResourcePath::parse(resource).is_none()
        {
            bail!(
                "api.resource in {} must be \"applications\" or \"application\", got {:?}",
                path.display(),
                resource
            );
        }

        if let Some(timeout) = &self.api.timeout {
            let parsed = parse_duration(timeout)?;
            if parsed <= Duration::ZERO {
                bail!(
                    "api.timeout in {} must be positive, got {}",
                    path.display(),
                    timeout
                );
            }
        }

        if let Some(level) = &self.log.level
            && level.trim().is_empty()
        {
            bail!("log.level in {} must not be empty", path.display());
        }

        Ok(())
    }

    pub fn api_base_url(&self) -> &str {
        self.api
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL)
            .trim()
            .trim_end_matches('/')
    }

    pub fn api_resource(&self) -> Result<ResourcePath> {
        let raw = self
            .api
            .resource
            .as_deref()
            .unwrap_or(ResourcePath::default().as_str());
        ResourcePath::parse(raw).ok_or_else(|| {
            anyhow!("api.resource must be \"applications\" or \"application\", got {raw:?}")
        })
    }

    pub fn api_timeout(&self) -> Result<Duration> {
        parse_duration(self.api.timeout.as_deref().unwrap_or(DEFAULT_TIMEOUT))
    }

    /// `[session].token_path`, then `LOANDESK_TOKEN_PATH`, then the per-user
    /// runtime directory (cache directory where there is none).
    pub fn token_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.session.token_path {
            return Ok(PathBuf::from(path));
        }
        if let Some(path) = env::var_os("LOANDESK_TOKEN_PATH") {
            return Ok(PathBuf::from(path));
        }

        let root = dirs::runtime_dir()
            .or_else(dirs::cache_dir)
            .ok_or_else(|| {
                anyhow!(
                    "cannot resolve a directory for the session token; set [session].token_path or LOANDESK_TOKEN_PATH"
                )
            })?;
        Ok(root.join(APP_NAME).join(TOKEN_FILE_NAME))
    }

    pub fn downloads_dir(&self) -> PathBuf {
        if let Some(dir) = &self.downloads.dir {
            return PathBuf::from(dir);
        }
        dirs::download_dir()
            .or_else(|| env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn log_level(&self) -> &str {
        self.log.level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }

    pub fn log_file(&self) -> Result<PathBuf> {
        if let Some(file) = &self.log.file {
            return Ok(PathBuf::from(file));
        }
        let cache_root = dirs::cache_dir().ok_or_else(|| {
            anyhow!("cannot resolve cache directory; set [log].file to a writable path")
        })?;
        Ok(cache_root.join(APP_NAME).join(LOG_FILE_NAME))
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# loandesk config\n# Place this file at: {}\n\nversion = 1\n\n[api]\nbase_url = \"{}\"\n# \"applications\" or \"application\", whichever the backend mounts\nresource = \"{}\"\ntimeout = \"{}\"\n\n[session]\n# Optional. Default is the per-user runtime dir (for example /run/user/1000/loandesk/session-token)\n# token_path = \"/absolute/path/to/session-token\"\n\n[downloads]\n# Optional. Default is the platform download dir\n# dir = \"/absolute/path/to/pdfs\"\n\n[log]\n# RUST_LOG takes precedence when set\nlevel = \"{}\"\n# file = \"/absolute/path/to/loandesk.log\"\n",
            path.display(),
            DEFAULT_BASE_URL,
            ResourcePath::default().as_str(),
            DEFAULT_TIMEOUT,
            DEFAULT_LOG_LEVEL,
        )
    }
}

fn parse_duration(raw: &str) -> Result<Duration> {
    if let Some(value) = raw.strip_suffix("ms") {
        let millis: u64 = value
            .parse()
            .with_context(|| format!("invalid timeout duration {raw:?}"))?;
        return Ok(Duration::from_millis(millis));
    }
    if let Some(value) = raw.strip_suffix('s') {
        let secs: u64 = value
            .parse()
            .with_context(|| format!("invalid timeout duration {raw:?}"))?;
        return Ok(Duration::from_secs(secs));
    }
    if let Some(value) = raw.strip_suffix('m') {
        let mins: u64 = value
            .parse()
            .with_context(|| format!("invalid timeout duration {raw:?}"))?;
        let secs = mins
            .checked_mul(60)
            .ok_or_else(|| anyhow!("timeout duration {raw:?} is too large"))?;
        return Ok(Duration::from_secs(secs));
    }

    bail!("invalid duration {raw:?}; use one of: <N>ms, <N>s, <N>m (for example 500ms or 10s)")
}

#[cfg(test)]
mod tests {
    use super::{Config, parse_duration};
    use anyhow::Result;
    use loandesk_api::ResourcePath;
    use std::path::PathBuf;
    use std::sync::{Mutex, OnceLock};
    use std::time::Duration;

    fn write_config(content: &str) -> Result<(tempfile::TempDir, PathBuf)> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("config.toml");
        std::fs::write(&path, content)?;
        Ok((temp, path))
    }

    fn env_lock() -> std::sync::MutexGuard<'static, ()> {
        static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        match ENV_LOCK.get_or_init(|| Mutex::new(())).lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    #[test]
    fn missing_config_uses_defaults() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let config = Config::load(&temp.path().join("missing.toml"))?;
        assert_eq!(config.version, 1);
        assert_eq!(config.api_base_url(), "http://localhost:5000/api");
        assert_eq!(config.api_resource()?, ResourcePath::Applications);
        assert_eq!(config.api_timeout()?, Duration::from_secs(10));
        assert_eq!(config.log_level(), "info");
        Ok(())
    }

    #[test]
    fn unversioned_config_is_rejected_with_actionable_message() -> Result<()> {
        let (_temp, path) = write_config("[api]\nbase_url = \"http://localhost:5000/api\"\n")?;
        let error = Config::load(&path).expect_err("unversioned config should fail");
        let message = error.to_string();
        assert!(message.contains("version = 1"), "unexpected message: {message}");
        Ok(())
    }

    #[test]
    fn v1_config_parses() -> Result<()> {
        let (_temp, path) = write_config(
            "version = 1\n[api]\nbase_url = \"https://loans.example/api//\"\nresource = \"application\"\ntimeout = \"500ms\"\n[downloads]\ndir = \"/srv/pdfs\"\n[log]\nlevel = \"debug\"\nfile = \"/var/log/loandesk.log\"\n",
        )?;
        let config = Config::load(&path)?;
        assert_eq!(config.api_base_url(), "https://loans.example/api");
        assert_eq!(config.api_resource()?, ResourcePath::Application);
        assert_eq!(config.api_timeout()?, Duration::from_millis(500));
        assert_eq!(config.downloads_dir(), PathBuf::from("/srv/pdfs"));
        assert_eq!(config.log_level(), "debug");
        assert_eq!(config.log_file()?, PathBuf::from("/var/log/loandesk.log"));
        Ok(())
    }

    #[test]
    fn malformed_config_returns_parse_error() -> Result<()> {
        let (_temp, path) = write_config("version = [")?;
        let error = Config::load(&path).expect_err("malformed TOML should fail");
        assert!(error.to_string().contains("parse TOML config"));
        Ok(())
    }

    #[test]
    fn unsupported_config_version_is_rejected() -> Result<()> {
        let (_temp, path) = write_config("version = 7\n")?;
        let error = Config::load(&path).expect_err("wrong version should fail");
        assert!(error.to_string().contains("unsupported config version 7"));
        Ok(())
    }

    #[test]
    fn api_values_are_validated() -> Result<()> {
        for (content, needle) in [
            ("version = 1\n[api]\nbase_url = \"localhost:5000\"\n", "http://"),
            ("version = 1\n[api]\nbase_url = \"  \"\n", "must not be empty"),
            ("version = 1\n[api]\nresource = \"loans\"\n", "api.resource"),
            ("version = 1\n[api]\ntimeout = \"0s\"\n", "must be positive"),
            ("version = 1\n[api]\ntimeout = \"soon\"\n", "invalid duration"),
        ] {
            let (_temp, path) = write_config(content)?;
            let error = Config::load(&path).expect_err("invalid api config should fail");
            let message = format!("{error:#}");
            assert!(message.contains(needle), "{content:?}: {message}");
        }
        Ok(())
    }

    #[test]
    fn default_path_honors_env_override() -> Result<()> {
        let _guard = env_lock();
        let temp = tempfile::tempdir()?;
        let override_path = temp.path().join("custom-config.toml");
        // SAFETY: test-only process-local env mutation.
        unsafe {
            std::env::set_var("LOANDESK_CONFIG_PATH", &override_path);
        }
        let resolved = Config::default_path();
        // SAFETY: test cleanup for process-local env mutation.
        unsafe {
            std::env::remove_var("LOANDESK_CONFIG_PATH");
        }
        assert_eq!(resolved?, override_path);
        Ok(())
    }

    #[test]
    fn token_path_prefers_session_config_over_env_override() -> Result<()> {
        let _guard = env_lock();
        let (_temp, path) =
            write_config("version = 1\n[session]\ntoken_path = \"/explicit/token\"\n")?;
        // SAFETY: test-only process-local env mutation.
        unsafe {
            std::env::set_var("LOANDESK_TOKEN_PATH", "/from/env/token");
        }
        let config = Config::load(&path)?;
        let resolved = config.token_path();
        // SAFETY: test cleanup for process-local env mutation.
        unsafe {
            std::env::remove_var("LOANDESK_TOKEN_PATH");
        }
        assert_eq!(resolved?, PathBuf::from("/explicit/token"));
        Ok(())
    }

    #[test]
    fn token_path_uses_env_override_when_config_missing() -> Result<()> {
        let _guard = env_lock();
        let (_temp, path) = write_config("version = 1\n")?;
        // SAFETY: test-only process-local env mutation.
        unsafe {
            std::env::set_var("LOANDESK_TOKEN_PATH", "/from/env-only/token");
        }
        let config = Config::load(&path)?;
        let resolved = config.token_path();
        // SAFETY: test cleanup for process-local env mutation.
        unsafe {
            std::env::remove_var("LOANDESK_TOKEN_PATH");
        }
        assert_eq!(resolved?, PathBuf::from("/from/env-only/token"));
        Ok(())
    }

    #[test]
    fn durations_parse_ms_seconds_and_minutes() -> Result<()> {
        assert_eq!(parse_duration("500ms")?, Duration::from_millis(500));
        assert_eq!(parse_duration("10s")?, Duration::from_secs(10));
        assert_eq!(parse_duration("2m")?, Duration::from_secs(120));
        assert!(parse_duration("10h").is_err());
        Ok(())
    }

    #[test]
    fn oversized_minute_duration_is_an_error() {
        let error = parse_duration("999999999999999999m").expect_err("minutes overflow seconds");
        assert!(error.to_string().contains("too large"), "error: {error}");
    }

    #[test]
    fn example_config_round_trips_through_load() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("config.toml");
        let example = Config::example_config(&path);
        assert!(example.contains("version = 1"));
        assert!(example.contains("[api]"));
        assert!(example.contains("[session]"));
        assert!(example.contains("[downloads]"));
        assert!(example.contains("[log]"));

        std::fs::write(&path, example)?;
        let config = Config::load(&path)?;
        assert_eq!(config.api_base_url(), "http://localhost:5000/api");
        Ok(())
    }
}
