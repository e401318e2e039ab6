// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use loandesk_app::{Application, ApplicationId, SessionToken, StorageStatus};
use reqwest::StatusCode;
use reqwest::blocking::{Client as HttpClient, RequestBuilder, Response};
use reqwest::header::{ACCEPT, AUTHORIZATION};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;
use url::Url;

const STORAGE_STATUS_PATH: &str = "storage-status";

/// Collection name used by the backend. Older deployments mount the routes
/// under the singular form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResourcePath {
    #[default]
    Applications,
    Application,
}

impl ResourcePath {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Applications => "applications",
            Self::Application => "application",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "applications" => Some(Self::Applications),
            "application" => Some(Self::Application),
            _ => None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("invalid api config: {0}")]
    InvalidConfig(String),
    #[error("{path} rejected the session token (401)")]
    Unauthorized { path: String },
    #[error("server error ({status}): {message}")]
    Status { status: u16, message: String },
    #[error("cannot reach {base_url} -- check [api].base_url and that the backend is running")]
    Connection {
        base_url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("read {what} response body")]
    Read {
        what: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("decode {what}")]
    Decode {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl ApiError {
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }
}

#[derive(Debug, Clone)]
pub struct Client {
    base_url: Url,
    resource: ResourcePath,
    timeout: Duration,
    http: HttpClient,
}

impl Client {
    pub fn new(
        base_url: &str,
        resource: ResourcePath,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let trimmed = base_url.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            return Err(ApiError::InvalidConfig(
                "api.base_url must not be empty".to_owned(),
            ));
        }
        let base_url = Url::parse(trimmed).map_err(|error| {
            ApiError::InvalidConfig(format!("api.base_url {trimmed:?} is not a URL: {error}"))
        })?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(ApiError::InvalidConfig(format!(
                "api.base_url {trimmed:?} must use http or https"
            )));
        }
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidConfig(format!(
                "api.base_url {trimmed:?} cannot carry a path"
            )));
        }

        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| ApiError::InvalidConfig(format!("build HTTP client: {error}")))?;

        Ok(Self {
            base_url,
            resource,
            timeout,
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    pub fn resource(&self) -> ResourcePath {
        self.resource
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn list_applications(&self, token: &SessionToken) -> Result<Vec<Application>, ApiError> {
        let url = self.endpoint(&[self.resource.as_str()]);
        let response = self.send(self.http.get(url.clone()), token, &url)?;
        let body = response.text().map_err(|source| ApiError::Read {
            what: "application list",
            source,
        })?;
        let list: ApplicationList =
            serde_json::from_str(&body).map_err(|source| ApiError::Decode {
                what: "application list",
                source,
            })?;
        let applications = list.into_vec();
        debug!(count = applications.len(), "loaded applications");
        Ok(applications)
    }

    pub fn delete_application(
        &self,
        token: &SessionToken,
        id: &ApplicationId,
    ) -> Result<(), ApiError> {
        let url = self.endpoint(&[self.resource.as_str(), id.as_str()]);
        self.send(self.http.delete(url.clone()), token, &url)?;
        Ok(())
    }

    pub fn download_pdf(
        &self,
        token: &SessionToken,
        id: &ApplicationId,
    ) -> Result<Vec<u8>, ApiError> {
        let url = self.endpoint(&[self.resource.as_str(), id.as_str(), "pdf"]);
        let request = self.http.get(url.clone()).header(ACCEPT, "application/pdf");
        let response = self.send(request, token, &url)?;
        let bytes = response.bytes().map_err(|source| ApiError::Read {
            what: "pdf",
            source,
        })?;
        debug!(bytes = bytes.len(), "downloaded pdf");
        Ok(bytes.to_vec())
    }

    pub fn storage_status(&self, token: &SessionToken) -> Result<StorageStatus, ApiError> {
        let url = self.endpoint(&[STORAGE_STATUS_PATH]);
        let response = self.send(self.http.get(url.clone()), token, &url)?;
        let body = response.text().map_err(|source| ApiError::Read {
            what: "storage status",
            source,
        })?;
        serde_json::from_str(&body).map_err(|source| ApiError::Decode {
            what: "storage status",
            source,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // cannot_be_a_base is rejected in `new`, so path segments are available.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn send(
        &self,
        request: RequestBuilder,
        token: &SessionToken,
        url: &Url,
    ) -> Result<Response, ApiError> {
        let response = request
            .header(AUTHORIZATION, token.bearer())
            .send()
            .map_err(|source| ApiError::Connection {
                base_url: self.base_url().to_owned(),
                source,
            })?;

        let status = response.status();
        debug!(path = url.path(), status = status.as_u16(), "api response");
        if status == StatusCode::UNAUTHORIZED {
            return Err(ApiError::Unauthorized {
                path: url.path().to_owned(),
            });
        }
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(clean_error_response(status, &body));
        }
        Ok(response)
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ApplicationList {
    Bare(Vec<Application>),
    Wrapped {
        #[serde(alias = "data")]
        applications: Vec<Application>,
    },
}

impl ApplicationList {
    fn into_vec(self) -> Vec<Application> {
        match self {
            Self::Bare(applications) | Self::Wrapped { applications } => applications,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    message: Option<String>,
    error: Option<String>,
}

fn clean_error_response(status: StatusCode, body: &str) -> ApiError {
    let status = status.as_u16();
    if let Ok(parsed) = serde_json::from_str::<ErrorEnvelope>(body)
        && let Some(message) = parsed.message.or(parsed.error)
        && !message.is_empty()
    {
        return ApiError::Status { status, message };
    }

    let trimmed = body.trim();
    if !trimmed.is_empty() && trimmed.len() < 100 && !trimmed.contains('{') {
        return ApiError::Status {
            status,
            message: trimmed.to_owned(),
        };
    }

    ApiError::Status {
        status,
        message: format!("server returned {status}"),
    }
}
