use std::sync::Arc;

use log::{info, warn};

use crate::api::{ClientFactory, EquipmentApi};
use crate::background::{spawn_dataset_load, PendingLoad};
use crate::error::{ApiError, AuthError, FetchError, UploadError};
use crate::fetch::{self, SummaryOutcome};
use crate::metrics::{stale_completions_total, ApiMetrics};
use crate::models::{Credentials, DatasetId, ReportDocument, SelectedFile};
use crate::session::{self, Session};
use crate::state::{Notice, ViewState};
use crate::upload::{self, UploadReport};

/// Sesjon + view-state + fabrikk, samlet for et rendering-lag.
///
/// Eier view-state alene; alle skriv går gjennom operasjonene under.
pub struct Dashboard {
    factory: Arc<dyn ClientFactory>,
    session: Option<Session>,
    view: ViewState,
    pending: Vec<PendingLoad>,
    metrics: Option<ApiMetrics>,
}

impl Dashboard {
    pub fn new(factory: Arc<dyn ClientFactory>) -> Self {
        Self {
            factory,
            session: None,
            view: ViewState::new(),
            pending: Vec::new(),
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: ApiMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        self.session.as_ref().map(Session::credentials)
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    /// Uautentisert klient (health-sjekk før innlogging).
    pub fn anonymous_api(&self) -> Arc<dyn EquipmentApi> {
        self.factory.build(&Credentials::default())
    }

    /// Logger inn og laster history + siste summary (begge ikke-fatale).
    /// Er vi allerede innlogget, logges det ut først.
    pub fn login(&mut self, username: &str, password: &str) -> Result<(), AuthError> {
        if self.session.is_some() {
            self.logout();
        }
        self.view.clear_notice();

        let session = match session::login(self.factory.as_ref(), username, password) {
            Ok(s) => s,
            Err(e) => {
                self.view.set_notice(Notice::Error(e.to_string()));
                return Err(e);
            }
        };
        self.session = Some(session);
        self.view.set_notice(Notice::Success("Login successful!".to_string()));

        if let Some(s) = &self.session {
            let _ = fetch::fetch_history(s.api(), &mut self.view);
            fetch::fetch_summary(s.api(), &mut self.view, None);
        }
        Ok(())
    }

    /// Tømmer alt. Ingen nettverk. Idempotent.
    pub fn logout(&mut self) {
        if let Some(s) = self.session.take() {
            info!("🚪 Logged out {}", s.credentials().username);
        }
        // Utestående tråder fullfører, men svarene deres har gammel epoch
        self.pending.clear();
        self.view.clear();
    }

    pub fn select_file(&mut self, file: SelectedFile) {
        self.view.select_file(file);
    }

    pub fn upload(&mut self) -> Result<UploadReport, UploadError> {
        self.view.clear_notice();
        let result = match &self.session {
            Some(s) => upload::upload(s.api(), &mut self.view),
            None if self.view.selected_file().is_none() => Err(UploadError::NoFileSelected),
            None => Err(UploadError::NotAuthenticated),
        };
        match &result {
            Ok(report) => {
                let mut notice = "File uploaded successfully!".to_string();
                if let Err(e) = &report.dataset {
                    notice = format!("{notice} ({e})");
                }
                self.view.set_notice(Notice::Success(notice));
            }
            Err(e) => self.view.set_notice(Notice::Error(e.to_string())),
        }
        result
    }

    pub fn refresh_summary(&mut self, dataset_id: Option<DatasetId>) -> SummaryOutcome {
        match &self.session {
            Some(s) => {
                let outcome = fetch::fetch_summary(s.api(), &mut self.view, dataset_id);
                self.count_stale(outcome == SummaryOutcome::Stale);
                outcome
            }
            None => SummaryOutcome::Failed,
        }
    }

    pub fn refresh_history(&mut self) -> Result<usize, ApiError> {
        match &self.session {
            Some(s) => fetch::fetch_history(s.api(), &mut self.view),
            None => Err(ApiError::NotAuthenticated),
        }
    }

    /// Blokkerende: viser datasettet (rader + summary) når kallet returnerer.
    pub fn open_dataset(&mut self, dataset_id: DatasetId) -> Result<usize, FetchError> {
        let s = self.session.as_ref().ok_or(FetchError::NotAuthenticated)?;
        let result = fetch::fetch_dataset(s.api(), &mut self.view, dataset_id);
        if let Err(e) = &result {
            self.view.set_notice(Notice::Error(e.to_string()));
        }
        result
    }

    /// Uten id: gjeldende datasett, ellers siste fra history.
    pub fn open_current_or_latest(&mut self) -> Result<Option<usize>, FetchError> {
        let s = self.session.as_ref().ok_or(FetchError::NotAuthenticated)?;
        let id = match self.view.current_dataset() {
            Some(id) => Some(id),
            None => fetch::latest_dataset_id(s.api()).map_err(|e| match e {
                ApiError::Timeout => FetchError::Timeout,
                other => FetchError::LatestUnknown(other.user_message()),
            })?,
        };
        match id {
            Some(id) => self.open_dataset(id).map(Some),
            None => {
                warn!("No datasets available. Please upload a CSV file first.");
                Ok(None)
            }
        }
    }

    /// Ikke-blokkerende variant: starter hentingen på en tråd. Resultatet
    /// brukes av [`Dashboard::poll`]. Siste utstedte vinner.
    pub fn request_dataset(&mut self, dataset_id: DatasetId) -> Result<(), FetchError> {
        let api = self
            .session
            .as_ref()
            .map(Session::shared_api)
            .ok_or(FetchError::NotAuthenticated)?;
        let ticket = self.view.select(dataset_id);
        if let Some(pending) = spawn_dataset_load(api, ticket) {
            self.pending.push(pending);
        }
        Ok(())
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Bruker ferdige bakgrunnshentinger. Returnerer antall som ble vist.
    pub fn poll(&mut self) -> usize {
        let mut applied = 0;
        let mut still_running = Vec::with_capacity(self.pending.len());
        for pending in std::mem::take(&mut self.pending) {
            match pending.try_take() {
                Ok(Some(done)) => applied += usize::from(self.apply_completion(done)),
                Ok(None) => still_running.push(pending),
                Err(e) => warn!("Background load for {:?} vanished: {e}", pending.ticket().dataset_id()),
            }
        }
        self.pending = still_running;
        applied
    }

    /// Venter på alle utestående hentinger (CLI/tester).
    pub fn wait_pending(&mut self) -> usize {
        let mut applied = 0;
        for pending in std::mem::take(&mut self.pending) {
            if let Some(done) = pending.wait() {
                applied += usize::from(self.apply_completion(done));
            }
        }
        applied
    }

    fn apply_completion(&mut self, done: crate::background::DatasetCompletion) -> bool {
        match done.result {
            Ok(detail) => {
                let applied = self.view.apply_dataset(&done.ticket, detail);
                self.count_stale(!applied);
                applied
            }
            Err(e) if self.view.is_current(&done.ticket) => {
                self.view.set_notice(Notice::Error(e.to_string()));
                false
            }
            Err(e) => {
                self.count_stale(true);
                warn!("Ignoring failure of superseded load: {e}");
                false
            }
        }
    }

    pub fn download_report(&mut self, dataset_id: DatasetId) -> Result<ReportDocument, FetchError> {
        let s = self.session.as_ref().ok_or(FetchError::NotAuthenticated)?;
        let result = fetch::fetch_report(s.api(), dataset_id);
        if let Err(e) = &result {
            self.view.set_notice(Notice::Error(e.to_string()));
        }
        result
    }

    fn count_stale(&self, stale: bool) {
        if let (true, Some(m)) = (stale, &self.metrics) {
            stale_completions_total(m).inc();
        }
    }
}
