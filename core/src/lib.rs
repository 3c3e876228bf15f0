//! Klientkjerne for Chemical Equipment-dashboardet: innlogging, opplasting,
//! view-state og rapporter mot backend-APIet.

pub mod api;
pub mod background;
pub mod cli;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod fetch;
pub mod http_api;
pub mod metrics;
pub mod mock;
pub mod models;
pub mod session;
pub mod state;
pub mod upload;

pub use api::{ClientFactory, Endpoint, EquipmentApi};
pub use config::{load_config, save_config, ClientConfig, Environment};
pub use dashboard::Dashboard;
pub use error::{ApiError, AuthError, FetchError, UploadError};
pub use fetch::SummaryOutcome;
pub use http_api::{HttpApi, HttpClientFactory};
pub use models::{
    Credentials, DatasetId, DatasetRow, DatasetSummary, HistoryEntry, ReportDocument, SelectedFile,
};
pub use state::{Notice, SelectionTicket, ViewState};
pub use upload::UploadReport;
