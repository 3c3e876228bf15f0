//! Skriptet backend for integrasjonstestene: registrerer hvert kall og
//! svarer via en closure per test.
#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{TimeZone, Utc};
use equipviz_core::api::{ClientFactory, Endpoint, EquipmentApi};
use equipviz_core::models::{HealthStatus, UploadResponse, UploadedDataset};
use equipviz_core::{
    ApiError, Credentials, DatasetId, DatasetRow, DatasetSummary, HistoryEntry, SelectedFile,
};

pub enum Reply {
    History(Vec<HistoryEntry>),
    Summary(DatasetSummary),
    Rows(Vec<DatasetRow>),
    Uploaded(UploadResponse),
    Bytes(Vec<u8>),
    Health(HealthStatus),
    Fail(ApiError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub endpoint: Endpoint,
    pub username: String,
    pub password: String,
}

type Handler = dyn Fn(Endpoint) -> Reply + Send + Sync;

pub struct FakeBackend {
    calls: Mutex<Vec<Call>>,
    builds: AtomicUsize,
    handler: Box<Handler>,
}

impl FakeBackend {
    pub fn new<F>(handler: F) -> Arc<Self>
    where
        F: Fn(Endpoint) -> Reply + Send + Sync + 'static,
    {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            builds: AtomicUsize::new(0),
            handler: Box::new(handler),
        })
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().expect("calls lock").clone()
    }

    pub fn endpoints(&self) -> Vec<Endpoint> {
        self.calls().into_iter().map(|c| c.endpoint).collect()
    }

    pub fn count(&self, endpoint: Endpoint) -> usize {
        self.endpoints().iter().filter(|e| **e == endpoint).count()
    }

    pub fn builds(&self) -> usize {
        self.builds.load(Ordering::SeqCst)
    }

    pub fn reset_calls(&self) {
        self.calls.lock().expect("calls lock").clear();
    }

    fn respond(&self, credentials: &Credentials, endpoint: Endpoint) -> Reply {
        self.calls.lock().expect("calls lock").push(Call {
            endpoint,
            username: credentials.username.clone(),
            password: credentials.password.clone(),
        });
        (self.handler)(endpoint)
    }
}

pub struct FakeFactory(pub Arc<FakeBackend>);

impl ClientFactory for FakeFactory {
    fn build(&self, credentials: &Credentials) -> Arc<dyn EquipmentApi> {
        self.0.builds.fetch_add(1, Ordering::SeqCst);
        Arc::new(FakeApi {
            backend: Arc::clone(&self.0),
            credentials: credentials.clone(),
        })
    }
}

pub struct FakeApi {
    backend: Arc<FakeBackend>,
    credentials: Credentials,
}

impl FakeApi {
    fn call(&self, endpoint: Endpoint) -> Reply {
        self.backend.respond(&self.credentials, endpoint)
    }
}

fn unexpected(endpoint: Endpoint) -> ApiError {
    ApiError::Decode {
        path: endpoint.path(),
        message: "unexpected reply kind in test script".to_string(),
    }
}

impl EquipmentApi for FakeApi {
    fn history(&self) -> Result<Vec<HistoryEntry>, ApiError> {
        match self.call(Endpoint::History) {
            Reply::History(h) => Ok(h),
            Reply::Fail(e) => Err(e),
            _ => Err(unexpected(Endpoint::History)),
        }
    }

    fn summary(&self, dataset_id: Option<DatasetId>) -> Result<DatasetSummary, ApiError> {
        let ep = Endpoint::Summary(dataset_id);
        match self.call(ep) {
            Reply::Summary(s) => Ok(s),
            Reply::Fail(e) => Err(e),
            _ => Err(unexpected(ep)),
        }
    }

    fn dataset(&self, dataset_id: DatasetId) -> Result<Vec<DatasetRow>, ApiError> {
        let ep = Endpoint::Dataset(dataset_id);
        match self.call(ep) {
            Reply::Rows(r) => Ok(r),
            Reply::Fail(e) => Err(e),
            _ => Err(unexpected(ep)),
        }
    }

    fn upload(&self, _file: &SelectedFile) -> Result<UploadResponse, ApiError> {
        match self.call(Endpoint::Upload) {
            Reply::Uploaded(r) => Ok(r),
            Reply::Fail(e) => Err(e),
            _ => Err(unexpected(Endpoint::Upload)),
        }
    }

    fn report(&self, dataset_id: DatasetId) -> Result<Vec<u8>, ApiError> {
        let ep = Endpoint::Report(dataset_id);
        match self.call(ep) {
            Reply::Bytes(b) => Ok(b),
            Reply::Fail(e) => Err(e),
            _ => Err(unexpected(ep)),
        }
    }

    fn health(&self) -> Result<HealthStatus, ApiError> {
        match self.call(Endpoint::Health) {
            Reply::Health(h) => Ok(h),
            Reply::Fail(e) => Err(e),
            _ => Err(unexpected(Endpoint::Health)),
        }
    }
}

pub fn status(code: u16, message: &str) -> ApiError {
    ApiError::Status {
        status: code,
        message: message.to_string(),
    }
}

pub fn summary(total: u64) -> DatasetSummary {
    let mut dist = BTreeMap::new();
    dist.insert("Pump".to_string(), total);
    DatasetSummary {
        total_count: total,
        avg_flowrate: 100.0,
        avg_pressure: 5.0,
        avg_temperature: 110.0,
        equipment_type_distribution: dist,
    }
}

pub fn rows(dataset_id: DatasetId, n: usize) -> Vec<DatasetRow> {
    (0..n)
        .map(|i| DatasetRow {
            equipment_name: format!("Pump-{dataset_id}-{i}"),
            equipment_type: "Pump".to_string(),
            flowrate: 120.5,
            pressure: 5.2,
            temperature: 110.0,
        })
        .collect()
}

pub fn entry(id: DatasetId, name: &str) -> HistoryEntry {
    HistoryEntry {
        id,
        name: name.to_string(),
        uploaded_at: Utc
            .with_ymd_and_hms(2025, 2, 1, 10, 15, 0)
            .single()
            .expect("valid timestamp"),
        total_count: 3,
        avg_flowrate: Some(100.0),
        avg_pressure: Some(5.0),
        avg_temperature: None,
        type_distributions: Vec::new(),
    }
}

pub fn uploaded(id: DatasetId, total: u64) -> UploadResponse {
    UploadResponse {
        message: Some("File uploaded successfully".to_string()),
        dataset: UploadedDataset {
            id,
            name: Some("equip.csv".to_string()),
        },
        summary: summary(total),
    }
}

/// Backend med ett datasett (`id`) som svarer på alt.
pub fn healthy_backend(id: DatasetId) -> Arc<FakeBackend> {
    FakeBackend::new(move |ep| match ep {
        Endpoint::History => Reply::History(vec![entry(id, "equip.csv")]),
        Endpoint::Summary(_) => Reply::Summary(summary(3)),
        Endpoint::Dataset(d) => Reply::Rows(rows(d, 3)),
        Endpoint::Upload => Reply::Uploaded(uploaded(id + 1, 3)),
        Endpoint::Report(_) => Reply::Bytes(b"%PDF-1.4\n".to_vec()),
        Endpoint::Health => Reply::Health(HealthStatus {
            status: "healthy".to_string(),
            service: None,
            version: None,
        }),
    })
}
