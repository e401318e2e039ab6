// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, bail};
use std::fmt;

/// Bearer credential for the admin API. Issued by the server; the client only
/// stores it and attaches it to requests.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            bail!("session token must not be empty; paste the token issued by the login endpoint");
        }
        if trimmed.chars().any(char::is_whitespace) {
            bail!("session token must not contain whitespace");
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(<redacted>)")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Dashboard,
    Settings,
}

impl Route {
    pub const fn path(self) -> &'static str {
        match self {
            Self::Login => "/admin/login",
            Self::Dashboard => "/admin/dashboard",
            Self::Settings => "/admin/settings",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::Dashboard => "applications",
            Self::Settings => "settings",
        }
    }
}

/// Marker error for a 401 from the backend. Runtimes wrap it in
/// `anyhow::Error` so the UI can force a logout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("session expired or invalid; sign in again")]
pub struct SessionExpired;

pub fn is_session_expired(error: &anyhow::Error) -> bool {
    error.chain().any(|cause| cause.is::<SessionExpired>())
}
