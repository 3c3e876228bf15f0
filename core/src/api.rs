use std::sync::Arc;

use crate::error::ApiError;
use crate::models::{
    Credentials, DatasetId, DatasetRow, DatasetSummary, HealthStatus, HistoryEntry, SelectedFile,
    UploadResponse,
};

/// Endepunktene i backend-kontrakten, relativt til base-URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    History,
    Summary(Option<DatasetId>),
    Dataset(DatasetId),
    Upload,
    Report(DatasetId),
    Health,
}

impl Endpoint {
    pub fn path(&self) -> String {
        match self {
            Endpoint::History => "/history/".to_string(),
            Endpoint::Summary(None) => "/summary/".to_string(),
            Endpoint::Summary(Some(id)) => format!("/summary/{id}/"),
            Endpoint::Dataset(id) => format!("/dataset/{id}/"),
            Endpoint::Upload => "/upload/".to_string(),
            Endpoint::Report(id) => format!("/report/{id}/"),
            Endpoint::Health => "/health/".to_string(),
        }
    }

    /// Metrikk-label (uten id, ellers eksploderer kardinaliteten).
    pub fn label(&self) -> &'static str {
        match self {
            Endpoint::History => "history",
            Endpoint::Summary(_) => "summary",
            Endpoint::Dataset(_) => "dataset",
            Endpoint::Upload => "upload",
            Endpoint::Report(_) => "report",
            Endpoint::Health => "health",
        }
    }

    /// Kun GET-er er trygge å prøve på nytt.
    pub fn is_idempotent(&self) -> bool {
        !matches!(self, Endpoint::Upload)
    }
}

/// Én autentisert forbindelse mot backend.
///
/// Prod: `HttpApi` (ureq). Demo: `DemoApi`. Tester bruker en skriptet fake.
/// Credentials er låst når objektet bygges; nye credentials betyr ny klient.
pub trait EquipmentApi: Send + Sync {
    fn history(&self) -> Result<Vec<HistoryEntry>, ApiError>;

    /// `None` = siste datasett.
    fn summary(&self, dataset_id: Option<DatasetId>) -> Result<DatasetSummary, ApiError>;

    fn dataset(&self, dataset_id: DatasetId) -> Result<Vec<DatasetRow>, ApiError>;

    fn upload(&self, file: &SelectedFile) -> Result<UploadResponse, ApiError>;

    fn report(&self, dataset_id: DatasetId) -> Result<Vec<u8>, ApiError>;

    fn health(&self) -> Result<HealthStatus, ApiError>;
}

/// Bygger en ny klient for et gitt credential-par.
pub trait ClientFactory: Send + Sync {
    fn build(&self, credentials: &Credentials) -> Arc<dyn EquipmentApi>;
}
