//! Demo-backend uten nettverk (`--demo`).
//!
//! Samme faste data som web-klientens mock: ett datasett med 15 enheter,
//! 5 eksempelrader. Alle credentials med innhold godtas.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use chrono::Utc;

use crate::api::{ClientFactory, EquipmentApi};
use crate::error::ApiError;
use crate::models::{
    Credentials, DatasetId, DatasetRow, DatasetSummary, HealthStatus, HistoryEntry, SelectedFile,
    UploadResponse, UploadedDataset,
};

const DEMO_DATASET_ID: DatasetId = 1;
const DEMO_FILE_NAME: &str = "demo_equipment_data.csv";

pub fn demo_summary() -> DatasetSummary {
    let mut dist = BTreeMap::new();
    dist.insert("Reactor".to_string(), 5);
    dist.insert("Distillation Column".to_string(), 4);
    dist.insert("Heat Exchanger".to_string(), 3);
    dist.insert("Pump".to_string(), 2);
    dist.insert("Valve".to_string(), 1);
    DatasetSummary {
        total_count: 15,
        avg_flowrate: 85.5,
        avg_pressure: 2.8,
        avg_temperature: 175.2,
        equipment_type_distribution: dist,
    }
}

pub fn demo_rows() -> Vec<DatasetRow> {
    [
        ("Reactor-1", "Reactor", 100.5, 3.2, 180.0),
        ("Column-1", "Distillation Column", 85.3, 2.8, 170.0),
        ("HX-1", "Heat Exchanger", 75.2, 2.5, 160.0),
        ("Pump-1", "Pump", 90.1, 3.5, 175.0),
        ("Valve-1", "Valve", 60.8, 2.0, 150.0),
    ]
    .into_iter()
    .map(|(name, kind, flowrate, pressure, temperature)| DatasetRow {
        equipment_name: name.to_string(),
        equipment_type: kind.to_string(),
        flowrate,
        pressure,
        temperature,
    })
    .collect()
}

/// Statisk demo-tilbyder. Opplastinger legges i history (maks 5, nyeste først).
pub struct DemoApi {
    authorized: bool,
    history: Arc<Mutex<Vec<HistoryEntry>>>,
}

impl DemoApi {
    fn history_guard(&self) -> Result<std::sync::MutexGuard<'_, Vec<HistoryEntry>>, ApiError> {
        self.history
            .lock()
            .map_err(|_| ApiError::Transport("demo store poisoned".to_string()))
    }

    fn require_auth(&self) -> Result<(), ApiError> {
        if self.authorized {
            Ok(())
        } else {
            Err(ApiError::Status {
                status: 401,
                message: "Authentication credentials were not provided.".to_string(),
            })
        }
    }

    fn known(&self, dataset_id: DatasetId) -> Result<(), ApiError> {
        if self.history_guard()?.iter().any(|e| e.id == dataset_id) {
            Ok(())
        } else {
            Err(ApiError::Status {
                status: 404,
                message: "Dataset not found".to_string(),
            })
        }
    }
}

impl EquipmentApi for DemoApi {
    fn history(&self) -> Result<Vec<HistoryEntry>, ApiError> {
        self.require_auth()?;
        Ok(self.history_guard()?.clone())
    }

    fn summary(&self, dataset_id: Option<DatasetId>) -> Result<DatasetSummary, ApiError> {
        self.require_auth()?;
        if let Some(id) = dataset_id {
            self.known(id)?;
        }
        Ok(demo_summary())
    }

    fn dataset(&self, dataset_id: DatasetId) -> Result<Vec<DatasetRow>, ApiError> {
        self.require_auth()?;
        self.known(dataset_id)?;
        Ok(demo_rows())
    }

    fn upload(&self, file: &SelectedFile) -> Result<UploadResponse, ApiError> {
        self.require_auth()?;
        if !file.file_name.to_ascii_lowercase().ends_with(".csv") {
            return Err(ApiError::Status {
                status: 400,
                message: "File must be a CSV".to_string(),
            });
        }
        let summary = demo_summary();
        let mut history = self.history_guard()?;
        let id = history.iter().map(|e| e.id).max().unwrap_or(0) + 1;
        history.insert(0, demo_entry(id, &file.file_name, &summary));
        history.truncate(5);
        Ok(UploadResponse {
            message: Some("File uploaded successfully".to_string()),
            dataset: UploadedDataset {
                id,
                name: Some(file.file_name.clone()),
            },
            summary,
        })
    }

    fn report(&self, _dataset_id: DatasetId) -> Result<Vec<u8>, ApiError> {
        self.require_auth()?;
        Err(ApiError::Status {
            status: 501,
            message: "PDF reports are not available in demo mode".to_string(),
        })
    }

    fn health(&self) -> Result<HealthStatus, ApiError> {
        Ok(HealthStatus {
            status: "healthy".to_string(),
            service: Some("equipviz-demo".to_string()),
            version: Some(env!("CARGO_PKG_VERSION").to_string()),
        })
    }
}

fn demo_entry(id: DatasetId, name: &str, summary: &DatasetSummary) -> HistoryEntry {
    HistoryEntry {
        id,
        name: name.to_string(),
        uploaded_at: Utc::now(),
        total_count: summary.total_count,
        avg_flowrate: Some(summary.avg_flowrate),
        avg_pressure: Some(summary.avg_pressure),
        avg_temperature: Some(summary.avg_temperature),
        type_distributions: Vec::new(),
    }
}

/// Alle klienter fra samme fabrikk deler demo-lageret.
pub struct DemoFactory {
    history: Arc<Mutex<Vec<HistoryEntry>>>,
}

impl DemoFactory {
    pub fn new() -> Self {
        let seed = demo_entry(DEMO_DATASET_ID, DEMO_FILE_NAME, &demo_summary());
        Self {
            history: Arc::new(Mutex::new(vec![seed])),
        }
    }
}

impl Default for DemoFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientFactory for DemoFactory {
    fn build(&self, credentials: &Credentials) -> Arc<dyn EquipmentApi> {
        Arc::new(DemoApi {
            authorized: credentials.is_complete(),
            history: Arc::clone(&self.history),
        })
    }
}
