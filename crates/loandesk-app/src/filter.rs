// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::collections::BTreeSet;
use time::{Duration, OffsetDateTime};

use crate::model::Application;

pub const RECENT_WINDOW: Duration = Duration::days(7);

/// Search, category and recency predicates. All active predicates must hold.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplicationFilter {
    pub search: String,
    pub category: Option<String>,
    pub recent_only: bool,
}

impl ApplicationFilter {
    pub fn is_identity(&self) -> bool {
        self.search.is_empty() && self.category.is_none() && !self.recent_only
    }

    pub fn matches(&self, application: &Application, now: OffsetDateTime) -> bool {
        self.matches_name(application)
            && self.matches_category(application)
            && self.matches_window(application, now)
    }

    pub fn apply<'a>(
        &self,
        applications: &'a [Application],
        now: OffsetDateTime,
    ) -> Vec<&'a Application> {
        applications
            .iter()
            .filter(|application| self.matches(application, now))
            .collect()
    }

    fn matches_name(&self, application: &Application) -> bool {
        if self.search.is_empty() {
            return true;
        }
        let needle = self.search.to_lowercase();
        application
            .name
            .as_deref()
            .is_some_and(|name| name.to_lowercase().contains(&needle))
    }

    fn matches_category(&self, application: &Application) -> bool {
        match &self.category {
            None => true,
            Some(category) => application.loan_type.as_deref() == Some(category.as_str()),
        }
    }

    fn matches_window(&self, application: &Application, now: OffsetDateTime) -> bool {
        if !self.recent_only {
            return true;
        }
        let cutoff = now - RECENT_WINDOW;
        application
            .submitted_at()
            .is_some_and(|submitted| submitted >= cutoff)
    }
}

pub fn distinct_categories(applications: &[Application]) -> Vec<String> {
    applications
        .iter()
        .filter_map(|application| application.loan_type.as_deref())
        .filter(|category| !category.trim().is_empty())
        .map(str::to_owned)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
