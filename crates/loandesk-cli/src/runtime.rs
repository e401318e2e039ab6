// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::session::TokenStore;
use anyhow::{Context, Result, anyhow, bail};
use loandesk_api::{ApiError, Client};
use loandesk_app::{Application, ApplicationId, SessionExpired, SessionToken, StorageStatus};
use loandesk_testkit::{ApplicantFaker, storage_status};
use loandesk_tui::{AppRuntime, InternalEvent, LoadFailure};
use std::fs;
use std::path::PathBuf;
use std::sync::mpsc::Sender;
use std::thread;
use time::OffsetDateTime;
use tracing::{info, warn};

const DEMO_SEED: u64 = 20_261_019;
const DEMO_APPLICATIONS: usize = 45;
const DEMO_CAPACITY: u64 = 50;

/// Runtime backed by the admin REST API and the on-disk token store.
pub struct ApiRuntime {
    client: Client,
    store: TokenStore,
    token: Option<SessionToken>,
    downloads_dir: PathBuf,
    settings: Vec<(String, String)>,
}

impl ApiRuntime {
    pub fn new(
        client: Client,
        store: TokenStore,
        downloads_dir: PathBuf,
        extra_settings: Vec<(String, String)>,
    ) -> Self {
        let mut settings = vec![
            ("api".to_owned(), client.base_url().to_owned()),
            ("resource".to_owned(), format!("/{}", client.resource().as_str())),
            (
                "timeout".to_owned(),
                format!("{}ms", client.timeout().as_millis()),
            ),
            ("token file".to_owned(), store.path().display().to_string()),
            ("downloads".to_owned(), downloads_dir.display().to_string()),
        ];
        settings.extend(extra_settings);

        Self {
            client,
            store,
            token: None,
            downloads_dir,
            settings,
        }
    }

    fn token(&self) -> Result<SessionToken> {
        self.token
            .clone()
            .ok_or_else(|| anyhow::Error::new(SessionExpired).context("no session token"))
    }
}

fn api_failure(error: ApiError) -> anyhow::Error {
    if error.is_unauthorized() {
        warn!(%error, "session rejected by backend");
        return anyhow::Error::new(SessionExpired);
    }
    anyhow::Error::new(error)
}

impl AppRuntime for ApiRuntime {
    fn has_session(&mut self) -> bool {
        match self.store.load() {
            Ok(token) => {
                self.token = token;
                self.token.is_some()
            }
            Err(error) => {
                warn!(error = %format!("{error:#}"), "ignoring unreadable session token");
                self.token = None;
                false
            }
        }
    }

    fn sign_in(&mut self, token: &str) -> Result<()> {
        let token = SessionToken::parse(token)?;
        self.store.save(&token)?;
        self.token = Some(token);
        info!("session token stored");
        Ok(())
    }

    fn sign_out(&mut self) -> Result<()> {
        self.token = None;
        self.store.clear()?;
        info!("session token cleared");
        Ok(())
    }

    fn load_applications(&mut self) -> Result<Vec<Application>> {
        let token = self.token()?;
        self.client.list_applications(&token).map_err(api_failure)
    }

    fn load_storage_status(&mut self) -> Result<StorageStatus> {
        let token = self.token()?;
        self.client.storage_status(&token).map_err(api_failure)
    }

    fn delete_application(&mut self, id: &ApplicationId) -> Result<()> {
        let token = self.token()?;
        self.client
            .delete_application(&token, id)
            .map_err(api_failure)?;
        info!(id = %id, "application deleted");
        Ok(())
    }

    fn download_pdf(&mut self, application: &Application) -> Result<PathBuf> {
        let token = self.token()?;
        let bytes = self
            .client
            .download_pdf(&token, &application.id)
            .map_err(api_failure)?;

        fs::create_dir_all(&self.downloads_dir).with_context(|| {
            format!(
                "create download directory {}; set [downloads].dir",
                self.downloads_dir.display()
            )
        })?;
        let path = self.downloads_dir.join(application.pdf_file_name());
        fs::write(&path, &bytes).with_context(|| format!("write {}", path.display()))?;
        info!(id = %application.id, bytes = bytes.len(), path = %path.display(), "pdf saved");
        Ok(path)
    }

    fn settings_summary(&mut self) -> Vec<(String, String)> {
        self.settings.clone()
    }

    fn spawn_initial_load(&mut self, tx: Sender<InternalEvent>, generation: u64) -> Result<()> {
        let token = self.token()?;

        let client = self.client.clone();
        let list_token = token.clone();
        let list_tx = tx.clone();
        thread::Builder::new()
            .name("load-applications".to_owned())
            .spawn(move || {
                let result = client
                    .list_applications(&list_token)
                    .map_err(api_failure)
                    .map_err(|error| LoadFailure::from_error(&error));
                let _ = list_tx.send(InternalEvent::ApplicationsLoaded { generation, result });
            })
            .context("spawn application loader")?;

        let client = self.client.clone();
        thread::Builder::new()
            .name("load-storage".to_owned())
            .spawn(move || {
                let result = client
                    .storage_status(&token)
                    .map_err(api_failure)
                    .map_err(|error| LoadFailure::from_error(&error));
                let _ = tx.send(InternalEvent::StorageLoaded { generation, result });
            })
            .context("spawn storage loader")?;
        Ok(())
    }
}

/// In-memory runtime seeded with generated applications. No network.
pub struct DemoRuntime {
    token: Option<SessionToken>,
    applications: Vec<Application>,
    capacity: u64,
}

impl DemoRuntime {
    pub fn new(now: OffsetDateTime) -> Self {
        let applications = ApplicantFaker::new(DEMO_SEED).applications(DEMO_APPLICATIONS, now);
        Self {
            token: SessionToken::parse("demo").ok(),
            applications,
            capacity: DEMO_CAPACITY,
        }
    }
}

impl AppRuntime for DemoRuntime {
    fn has_session(&mut self) -> bool {
        self.token.is_some()
    }

    fn sign_in(&mut self, token: &str) -> Result<()> {
        self.token = Some(SessionToken::parse(token)?);
        Ok(())
    }

    fn sign_out(&mut self) -> Result<()> {
        self.token = None;
        Ok(())
    }

    fn load_applications(&mut self) -> Result<Vec<Application>> {
        if self.token.is_none() {
            return Err(anyhow::Error::new(SessionExpired));
        }
        Ok(self.applications.clone())
    }

    fn load_storage_status(&mut self) -> Result<StorageStatus> {
        Ok(storage_status(
            self.applications.len() as u64,
            self.capacity,
        ))
    }

    fn delete_application(&mut self, id: &ApplicationId) -> Result<()> {
        let index = self
            .applications
            .iter()
            .position(|application| &application.id == id)
            .ok_or_else(|| anyhow!("application {id} not found"))?;
        self.applications.remove(index);
        Ok(())
    }

    fn download_pdf(&mut self, application: &Application) -> Result<PathBuf> {
        bail!(
            "demo mode has no backend to render {}; run without --demo",
            application.pdf_file_name()
        )
    }

    fn settings_summary(&mut self) -> Vec<(String, String)> {
        vec![
            ("api".to_owned(), "demo (in-memory)".to_owned()),
            ("capacity".to_owned(), format!("{} documents", self.capacity)),
        ]
    }
}
