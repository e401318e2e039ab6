// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use std::fs::{self, OpenOptions};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Routes `tracing` output to `path` so it never lands on the terminal the UI
/// is drawing on. Keep the guard alive until exit or buffered lines are lost.
pub fn init(path: &Path, default_level: &str) -> Result<WorkerGuard> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("create log directory {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| {
            format!(
                "open log file {}; set [log].file to a writable path",
                path.display()
            )
        })?;

    let filter = env_filter(default_level)?;
    let (writer, guard) = tracing_appender::non_blocking(file);
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .try_init()
        .context("install log subscriber")?;
    Ok(guard)
}

fn env_filter(default_level: &str) -> Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(default_level)
            .with_context(|| format!("invalid [log].level {default_level:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::env_filter;

    #[test]
    fn config_level_is_a_valid_directive() {
        assert!(env_filter("debug").is_ok());
        assert!(env_filter("loandesk_api=trace,info").is_ok());
    }
}
