// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use time::OffsetDateTime;

use crate::{
    Application, ApplicationFilter, ApplicationId, Pager, Route, StorageStatus,
    distinct_categories, page_slice,
};

#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    pub route: Route,
    pub applications: Vec<Application>,
    pub storage: Option<StorageStatus>,
    pub filter: ApplicationFilter,
    pub pager: Pager,
    pub selected: Option<ApplicationId>,
    pub pending_delete: Option<ApplicationId>,
    pub loading: bool,
    pub status_line: Option<String>,
    /// Reference instant for the recent-submissions window.
    pub now: OffsetDateTime,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            route: Route::Login,
            applications: Vec::new(),
            storage: None,
            filter: ApplicationFilter::default(),
            pager: Pager::default(),
            selected: None,
            pending_delete: None,
            loading: false,
            status_line: None,
            now: OffsetDateTime::now_utc(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AppCommand {
    Boot { has_token: bool },
    SignedIn,
    Navigate(Route),
    SetSearch(String),
    SetCategory(Option<String>),
    CycleCategory(isize),
    ToggleRecent,
    ClearFilters,
    NextPage,
    PrevPage,
    OpenDetail(ApplicationId),
    CloseDetail,
    RequestDelete(ApplicationId),
    CancelDelete,
    ApplicationsLoaded(Vec<Application>),
    ApplicationsFailed(String),
    StorageLoaded(StorageStatus),
    ApplicationDeleted(ApplicationId),
    SessionExpired,
    Logout,
    SetStatus(String),
    ClearStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    RouteChanged(Route),
    FetchRequested,
    FilterChanged,
    PageChanged(usize),
    DetailOpened(ApplicationId),
    DetailClosed,
    DeleteRequested(ApplicationId),
    DeleteCancelled,
    ApplicationsReplaced(usize),
    ApplicationRemoved(ApplicationId),
    StorageUpdated,
    SessionCleared,
    StatusUpdated(String),
    StatusCleared,
}

impl AppState {
    pub fn dispatch(&mut self, command: AppCommand) -> Vec<AppEvent> {
        match command {
            AppCommand::Boot { has_token } => {
                if has_token {
                    self.enter_dashboard()
                } else {
                    self.route = Route::Login;
                    vec![AppEvent::RouteChanged(Route::Login)]
                }
            }
            AppCommand::SignedIn => {
                let mut events = self.enter_dashboard();
                events.push(self.set_status("signed in"));
                events
            }
            AppCommand::Navigate(route) => {
                if self.route == route {
                    return Vec::new();
                }
                self.route = route;
                vec![AppEvent::RouteChanged(route)]
            }
            AppCommand::SetSearch(search) => {
                if self.filter.search == search {
                    return Vec::new();
                }
                self.filter.search = search;
                self.filter_changed()
            }
            AppCommand::SetCategory(category) => {
                if self.filter.category == category {
                    return Vec::new();
                }
                self.filter.category = category;
                self.filter_changed()
            }
            AppCommand::CycleCategory(delta) => self.cycle_category(delta),
            AppCommand::ToggleRecent => {
                self.filter.recent_only = !self.filter.recent_only;
                let label = if self.filter.recent_only {
                    "showing last 7 days"
                } else {
                    "showing all dates"
                };
                let mut events = self.filter_changed();
                events.push(self.set_status(label));
                events
            }
            AppCommand::ClearFilters => {
                if self.filter.is_identity() {
                    return Vec::new();
                }
                self.filter = ApplicationFilter::default();
                let mut events = self.filter_changed();
                events.push(self.set_status("filters cleared"));
                events
            }
            AppCommand::NextPage => {
                let total = self.filtered_count();
                if self.pager.next(total) {
                    vec![AppEvent::PageChanged(self.pager.page())]
                } else {
                    Vec::new()
                }
            }
            AppCommand::PrevPage => {
                if self.pager.prev() {
                    vec![AppEvent::PageChanged(self.pager.page())]
                } else {
                    Vec::new()
                }
            }
            AppCommand::OpenDetail(id) => {
                if self.find(&id).is_none() {
                    return vec![self.set_status("application not found")];
                }
                self.selected = Some(id.clone());
                vec![AppEvent::DetailOpened(id)]
            }
            AppCommand::CloseDetail => {
                if self.selected.take().is_some() {
                    vec![AppEvent::DetailClosed]
                } else {
                    Vec::new()
                }
            }
            AppCommand::RequestDelete(id) => {
                if self.find(&id).is_none() {
                    return vec![self.set_status("application not found")];
                }
                self.pending_delete = Some(id.clone());
                vec![AppEvent::DeleteRequested(id)]
            }
            AppCommand::CancelDelete => {
                if self.pending_delete.take().is_some() {
                    vec![AppEvent::DeleteCancelled]
                } else {
                    Vec::new()
                }
            }
            AppCommand::ApplicationsLoaded(applications) => {
                self.loading = false;
                self.applications = applications;
                let total = self.filtered_count();
                self.pager.clamp(total);
                vec![AppEvent::ApplicationsReplaced(self.applications.len())]
            }
            AppCommand::ApplicationsFailed(message) => {
                self.loading = false;
                vec![self.set_status(&format!("failed to load applications: {message}"))]
            }
            AppCommand::StorageLoaded(storage) => {
                self.storage = Some(storage);
                vec![AppEvent::StorageUpdated]
            }
            AppCommand::ApplicationDeleted(id) => self.remove_application(&id),
            AppCommand::SessionExpired => {
                let mut events = self.clear_session();
                events.push(self.set_status("session expired; sign in again"));
                events
            }
            AppCommand::Logout => {
                let mut events = self.clear_session();
                events.push(self.set_status("signed out"));
                events
            }
            AppCommand::SetStatus(message) => vec![self.set_status(&message)],
            AppCommand::ClearStatus => {
                self.status_line = None;
                vec![AppEvent::StatusCleared]
            }
        }
    }

    pub fn filtered(&self) -> Vec<&Application> {
        self.filter.apply(&self.applications, self.now)
    }

    pub fn filtered_count(&self) -> usize {
        self.filtered().len()
    }

    pub fn visible_page(&self) -> Vec<&Application> {
        let filtered = self.filtered();
        page_slice(&filtered, self.pager.page()).to_vec()
    }

    pub fn categories(&self) -> Vec<String> {
        distinct_categories(&self.applications)
    }

    pub fn find(&self, id: &ApplicationId) -> Option<&Application> {
        self.applications
            .iter()
            .find(|application| &application.id == id)
    }

    pub fn selected_application(&self) -> Option<&Application> {
        self.selected.as_ref().and_then(|id| self.find(id))
    }

    pub fn pending_delete_application(&self) -> Option<&Application> {
        self.pending_delete.as_ref().and_then(|id| self.find(id))
    }

    fn enter_dashboard(&mut self) -> Vec<AppEvent> {
        self.route = Route::Dashboard;
        self.loading = true;
        vec![
            AppEvent::RouteChanged(Route::Dashboard),
            AppEvent::FetchRequested,
        ]
    }

    fn filter_changed(&mut self) -> Vec<AppEvent> {
        self.pager.reset();
        vec![AppEvent::FilterChanged, AppEvent::PageChanged(1)]
    }

    fn cycle_category(&mut self, delta: isize) -> Vec<AppEvent> {
        let mut options = vec![None];
        options.extend(self.categories().into_iter().map(Some));
        let current = options
            .iter()
            .position(|option| *option == self.filter.category)
            .unwrap_or(0) as isize;
        let len = options.len() as isize;
        let next = (current + delta).rem_euclid(len) as usize;
        let category = options.swap_remove(next);
        let label = match &category {
            Some(category) => format!("category: {category}"),
            None => "category: all".to_owned(),
        };

        let mut events = self.dispatch(AppCommand::SetCategory(category));
        if !events.is_empty() {
            events.push(self.set_status(&label));
        }
        events
    }

    fn remove_application(&mut self, id: &ApplicationId) -> Vec<AppEvent> {
        self.pending_delete = None;
        let Some(index) = self
            .applications
            .iter()
            .position(|application| &application.id == id)
        else {
            return Vec::new();
        };

        let removed = self.applications.remove(index);
        let mut events = vec![AppEvent::ApplicationRemoved(removed.id.clone())];
        if self.selected.as_ref() == Some(id) {
            self.selected = None;
            events.push(AppEvent::DetailClosed);
        }
        let total = self.filtered_count();
        self.pager.clamp(total);
        events.push(self.set_status(&format!("deleted {}", removed.display_name())));
        events
    }

    fn clear_session(&mut self) -> Vec<AppEvent> {
        let now = self.now;
        *self = Self {
            now,
            ..Self::default()
        };
        vec![
            AppEvent::SessionCleared,
            AppEvent::RouteChanged(Route::Login),
        ]
    }

    fn set_status(&mut self, message: &str) -> AppEvent {
        self.status_line = Some(message.to_owned());
        AppEvent::StatusUpdated(message.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::{AppCommand, AppEvent, AppState};
    use crate::{Application, ApplicationId, Route, StorageStatus, StorageTier};
    use time::OffsetDateTime;
    use time::macros::datetime;

    const NOW: OffsetDateTime = datetime!(2026-10-19 12:00 UTC);

    fn loaded_state(count: usize) -> AppState {
        let applications = (0..count)
            .map(|index| {
                let mut application = Application::new(index as i64);
                application.name = Some(format!("Applicant {index}"));
                let loan_type = if index % 9 == 0 { "Gold" } else { "Home" };
                application.loan_type = Some(loan_type.to_owned());
                application.created_at = Some(if index % 2 == 0 {
                    "2026-10-18T10:00:00Z".to_owned()
                } else {
                    "2026-08-01T10:00:00Z".to_owned()
                });
                application
            })
            .collect();

        let mut state = AppState {
            now: NOW,
            ..AppState::default()
        };
        state.dispatch(AppCommand::Boot { has_token: true });
        state.dispatch(AppCommand::ApplicationsLoaded(applications));
        state
    }

    #[test]
    fn boot_without_token_goes_to_login_without_fetch() {
        let mut state = AppState::default();
        let events = state.dispatch(AppCommand::Boot { has_token: false });
        assert_eq!(state.route, Route::Login);
        assert_eq!(events, vec![AppEvent::RouteChanged(Route::Login)]);
        assert!(!events.contains(&AppEvent::FetchRequested));
        assert!(!state.loading);
    }

    #[test]
    fn boot_with_token_requests_fetch() {
        let mut state = AppState::default();
        let events = state.dispatch(AppCommand::Boot { has_token: true });
        assert_eq!(state.route, Route::Dashboard);
        assert!(state.loading);
        assert_eq!(
            events,
            vec![
                AppEvent::RouteChanged(Route::Dashboard),
                AppEvent::FetchRequested,
            ]
        );
    }

    #[test]
    fn forty_five_records_paginate_and_category_resets_page() {
        let mut state = loaded_state(45);
        assert!(!state.loading);
        assert_eq!(state.visible_page().len(), 20);

        state.dispatch(AppCommand::NextPage);
        state.dispatch(AppCommand::NextPage);
        assert_eq!(state.pager.page(), 3);
        assert_eq!(state.visible_page().len(), 5);
        assert!(state.dispatch(AppCommand::NextPage).is_empty());

        let events = state.dispatch(AppCommand::SetCategory(Some("Gold".to_owned())));
        assert_eq!(
            events,
            vec![AppEvent::FilterChanged, AppEvent::PageChanged(1)]
        );
        assert_eq!(state.pager.page(), 1);
        assert_eq!(state.filtered_count(), 5);
        assert_eq!(state.visible_page().len(), 5);
        assert!(!state.pager.has_next(state.filtered_count()));
    }

    #[test]
    fn every_filter_input_resets_the_page() {
        let mut state = loaded_state(45);
        state.dispatch(AppCommand::NextPage);
        state.dispatch(AppCommand::SetSearch("applicant".to_owned()));
        assert_eq!(state.pager.page(), 1);

        state.dispatch(AppCommand::NextPage);
        state.dispatch(AppCommand::ToggleRecent);
        assert_eq!(state.pager.page(), 1);
        assert_eq!(state.filtered_count(), 23);

        state.dispatch(AppCommand::NextPage);
        assert_eq!(state.pager.page(), 2);
        state.dispatch(AppCommand::ClearFilters);
        assert_eq!(state.pager.page(), 1);
    }

    #[test]
    fn prev_page_is_disallowed_on_first_page() {
        let mut state = loaded_state(45);
        assert!(state.dispatch(AppCommand::PrevPage).is_empty());
        assert_eq!(state.pager.page(), 1);
    }

    #[test]
    fn cycle_category_walks_distinct_values_and_back_to_all() {
        let mut state = loaded_state(10);
        state.dispatch(AppCommand::CycleCategory(1));
        assert_eq!(state.filter.category.as_deref(), Some("Gold"));
        state.dispatch(AppCommand::CycleCategory(1));
        assert_eq!(state.filter.category.as_deref(), Some("Home"));
        state.dispatch(AppCommand::CycleCategory(1));
        assert_eq!(state.filter.category, None);
        state.dispatch(AppCommand::CycleCategory(-1));
        assert_eq!(state.filter.category.as_deref(), Some("Home"));
        assert_eq!(state.status_line.as_deref(), Some("category: Home"));
    }

    #[test]
    fn delete_removes_exactly_one_record_and_closes_detail() {
        let mut state = loaded_state(3);
        let target = ApplicationId::from(1);
        state.dispatch(AppCommand::OpenDetail(target.clone()));
        state.dispatch(AppCommand::RequestDelete(target.clone()));
        assert_eq!(state.pending_delete, Some(target.clone()));

        let events = state.dispatch(AppCommand::ApplicationDeleted(target.clone()));
        assert_eq!(
            events,
            vec![
                AppEvent::ApplicationRemoved(target.clone()),
                AppEvent::DetailClosed,
                AppEvent::StatusUpdated("deleted Applicant 1".to_owned()),
            ]
        );
        assert_eq!(state.applications.len(), 2);
        assert!(state.find(&target).is_none());
        assert_eq!(state.selected, None);
        assert_eq!(state.pending_delete, None);
    }

    #[test]
    fn delete_keeps_detail_open_for_other_record() {
        let mut state = loaded_state(3);
        state.dispatch(AppCommand::OpenDetail(ApplicationId::from(2)));
        state.dispatch(AppCommand::ApplicationDeleted(ApplicationId::from(0)));
        assert_eq!(state.selected, Some(ApplicationId::from(2)));
        assert_eq!(state.applications.len(), 2);
    }

    #[test]
    fn deleting_last_record_on_last_page_moves_back() {
        let mut state = loaded_state(21);
        state.dispatch(AppCommand::NextPage);
        assert_eq!(state.pager.page(), 2);
        state.dispatch(AppCommand::ApplicationDeleted(ApplicationId::from(20)));
        assert_eq!(state.pager.page(), 1);
    }

    #[test]
    fn cancel_delete_is_silent() {
        let mut state = loaded_state(2);
        state.dispatch(AppCommand::RequestDelete(ApplicationId::from(0)));
        let events = state.dispatch(AppCommand::CancelDelete);
        assert_eq!(events, vec![AppEvent::DeleteCancelled]);
        assert_eq!(state.status_line, None);
        assert_eq!(state.applications.len(), 2);
    }

    #[test]
    fn session_expiry_clears_data_and_routes_to_login() {
        let mut state = loaded_state(5);
        state.dispatch(AppCommand::StorageLoaded(StorageStatus {
            used_documents: 5,
            max_documents: 100,
            percentage: 5.0,
            status: StorageTier::Normal,
        }));
        state.dispatch(AppCommand::SetSearch("x".to_owned()));

        let events = state.dispatch(AppCommand::SessionExpired);
        assert_eq!(events[0], AppEvent::SessionCleared);
        assert_eq!(state.route, Route::Login);
        assert!(state.applications.is_empty());
        assert!(state.storage.is_none());
        assert!(state.filter.is_identity());
        assert_eq!(state.now, NOW);
        assert_eq!(
            state.status_line.as_deref(),
            Some("session expired; sign in again")
        );
    }

    #[test]
    fn failed_load_leaves_list_empty_with_status() {
        let mut state = AppState::default();
        state.dispatch(AppCommand::Boot { has_token: true });
        state.dispatch(AppCommand::ApplicationsFailed("server returned 500".to_owned()));
        assert!(!state.loading);
        assert!(state.applications.is_empty());
        assert_eq!(
            state.status_line.as_deref(),
            Some("failed to load applications: server returned 500")
        );
    }
}
