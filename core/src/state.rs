//! View-state: det rendering-laget viser.
//!
//! Én skriver per felt. Alle oppdateringer etter nettverkskall går via en
//! [`SelectionTicket`], slik at et svar for datasett A som kommer etter at
//! B er valgt (eller etter logout) aldri overskriver nyere data.

use log::debug;

use crate::models::{DatasetId, DatasetRow, DatasetSummary, HistoryEntry, SelectedFile};

/// Merkelapp for et utstedt kall. Gyldig så lenge ingen nyere seleksjon
/// eller logout har skjedd.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionTicket {
    epoch: u64,
    generation: u64,
    dataset_id: Option<DatasetId>,
}

impl SelectionTicket {
    pub fn dataset_id(&self) -> Option<DatasetId> {
        self.dataset_id
    }
}

/// Melding til brukeren (suksess- eller feilbanner).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Error(String),
}

/// Rader + summary for ett datasett, hentet sammen.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetDetail {
    pub dataset_id: DatasetId,
    pub rows: Vec<DatasetRow>,
    /// `None` hvis `/summary/{id}/` feilet etter at radene kom.
    pub summary: Option<DatasetSummary>,
}

#[derive(Debug, Default)]
pub struct ViewState {
    summary: Option<DatasetSummary>,
    /// Hvilket datasett summary gjelder. `None` = "siste" uten kjent id.
    summary_dataset: Option<DatasetId>,
    rows: Option<Vec<DatasetRow>>,
    history: Vec<HistoryEntry>,
    current_dataset: Option<DatasetId>,
    selected_file: Option<SelectedFile>,
    notice: Option<Notice>,
    epoch: u64,
    generation: u64,
    stale_dropped: u64,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn summary(&self) -> Option<&DatasetSummary> {
        self.summary.as_ref()
    }

    pub fn summary_dataset(&self) -> Option<DatasetId> {
        self.summary_dataset
    }

    pub fn rows(&self) -> Option<&[DatasetRow]> {
        self.rows.as_deref()
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn current_dataset(&self) -> Option<DatasetId> {
        self.current_dataset
    }

    pub fn selected_file(&self) -> Option<&SelectedFile> {
        self.selected_file.as_ref()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// Antall svar som er forkastet fordi de var utdatert.
    pub fn stale_dropped(&self) -> u64 {
        self.stale_dropped
    }

    pub fn is_empty(&self) -> bool {
        self.summary.is_none()
            && self.rows.is_none()
            && self.history.is_empty()
            && self.current_dataset.is_none()
    }

    pub fn select_file(&mut self, file: SelectedFile) {
        self.selected_file = Some(file);
        self.notice = None;
    }

    pub fn clear_selected_file(&mut self) {
        self.selected_file = None;
    }

    pub fn set_notice(&mut self, notice: Notice) {
        self.notice = Some(notice);
    }

    pub fn clear_notice(&mut self) {
        self.notice = None;
    }

    /// Ny seleksjon: alle eldre billetter blir ugyldige for rader/summary.
    /// Gjeldende datasett endres først når svaret faktisk er brukt.
    pub fn select(&mut self, dataset_id: DatasetId) -> SelectionTicket {
        self.generation += 1;
        SelectionTicket {
            epoch: self.epoch,
            generation: self.generation,
            dataset_id: Some(dataset_id),
        }
    }

    /// Billett uten ny seleksjon (summary/history). Blir ugyldig ved neste
    /// `select` eller logout.
    pub fn snapshot(&self) -> SelectionTicket {
        SelectionTicket {
            epoch: self.epoch,
            generation: self.generation,
            dataset_id: self.current_dataset,
        }
    }

    pub fn is_current(&self, ticket: &SelectionTicket) -> bool {
        ticket.epoch == self.epoch && ticket.generation == self.generation
    }

    fn drop_stale(&mut self, what: &str, ticket: &SelectionTicket) -> bool {
        debug!(
            "Dropping stale {what} (ticket epoch={} gen={} dataset={:?}, now epoch={} gen={})",
            ticket.epoch, ticket.generation, ticket.dataset_id, self.epoch, self.generation
        );
        self.stale_dropped += 1;
        false
    }

    /// Opplasting lyktes: summary og id fra svaret blir gjeldende.
    /// Gamle rader tilhører et annet datasett og forkastes til de er hentet på nytt.
    pub fn commit_upload(&mut self, dataset_id: DatasetId, summary: DatasetSummary) -> SelectionTicket {
        let ticket = self.select(dataset_id);
        self.current_dataset = Some(dataset_id);
        self.summary = Some(summary);
        self.summary_dataset = Some(dataset_id);
        self.rows = None;
        ticket
    }

    /// Rader (og summary for samme id) brukes atomisk, eller ikke i det hele tatt.
    pub fn apply_dataset(&mut self, ticket: &SelectionTicket, detail: DatasetDetail) -> bool {
        if !self.is_current(ticket) || ticket.dataset_id != Some(detail.dataset_id) {
            return self.drop_stale("dataset", ticket);
        }
        let id = detail.dataset_id;
        self.rows = Some(detail.rows);
        self.current_dataset = Some(id);
        match detail.summary {
            Some(summary) => {
                self.summary = Some(summary);
                self.summary_dataset = Some(id);
            }
            None if self.summary_dataset != Some(id) => {
                // Summary for et annet datasett skal ikke stå ved siden av disse radene
                self.summary = None;
                self.summary_dataset = None;
            }
            None => {}
        }
        true
    }

    pub fn apply_summary(&mut self, ticket: &SelectionTicket, summary: DatasetSummary, dataset_id: Option<DatasetId>) -> bool {
        if !self.is_current(ticket) {
            return self.drop_stale("summary", ticket);
        }
        if self.current_dataset != dataset_id {
            // Summary, rader og gjeldende id skal alltid høre til samme datasett
            if self.rows.is_some() {
                debug!("Summary for {dataset_id:?} replaces rows of {:?}", self.current_dataset);
            }
            self.rows = None;
            self.current_dataset = dataset_id;
        }
        self.summary = Some(summary);
        self.summary_dataset = dataset_id;
        true
    }

    /// History er uavhengig av seleksjon; kun logout gjør den utdatert.
    pub fn apply_history(&mut self, ticket: &SelectionTicket, entries: Vec<HistoryEntry>) -> bool {
        if ticket.epoch != self.epoch {
            return self.drop_stale("history", ticket);
        }
        self.history = entries;
        true
    }

    /// Logout: alt tømmes, og alle utestående billetter blir ugyldige.
    pub fn clear(&mut self) {
        let epoch = self.epoch + 1;
        let stale_dropped = self.stale_dropped;
        *self = Self {
            epoch,
            stale_dropped,
            ..Self::default()
        };
    }
}
