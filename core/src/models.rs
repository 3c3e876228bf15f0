use std::collections::BTreeMap;
use std::fmt;
use std::io;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Backend-ens primærnøkkel for et opplastet datasett.
pub type DatasetId = i64;

/// Brukernavn/passord for basic auth.
///
/// Sendes kun som `Authorization`-header. Derfor ingen `Serialize`, og
/// `Debug` skjuler passordet.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Begge feltene må være satt før vi i det hele tatt prøver backend.
    pub fn is_complete(&self) -> bool {
        !self.username.trim().is_empty() && !self.password.is_empty()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Aggregert statistikk for ett datasett (`/summary/` og `/summary/{id}/`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DatasetSummary {
    pub total_count: u64,
    pub avg_flowrate: f64,
    pub avg_pressure: f64,
    pub avg_temperature: f64,
    #[serde(default)]
    pub equipment_type_distribution: BTreeMap<String, u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeCount {
    pub equipment_type: String,
    pub count: u64,
}

/// Ett element i `/history/` (maks 5, nyeste først – backend bestemmer).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: DatasetId,
    pub name: String,
    pub uploaded_at: DateTime<Utc>,
    pub total_count: u64,
    // nullable i backend-modellen
    pub avg_flowrate: Option<f64>,
    pub avg_pressure: Option<f64>,
    pub avg_temperature: Option<f64>,
    #[serde(default)]
    pub type_distributions: Vec<TypeCount>,
}

/// Én utstyrsrad slik CSV-kolonnene heter på wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetRow {
    #[serde(rename = "Equipment Name", deserialize_with = "string_or_number")]
    pub equipment_name: String,
    #[serde(rename = "Type", deserialize_with = "string_or_number")]
    pub equipment_type: String,
    #[serde(rename = "Flowrate")]
    pub flowrate: f64,
    #[serde(rename = "Pressure")]
    pub pressure: f64,
    #[serde(rename = "Temperature")]
    pub temperature: f64,
}

/// Pandas gjør rene tallkolonner (f.eks. tag-nummer) om til JSON-tall.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Cell {
        Text(String),
        Int(i64),
        Float(f64),
    }

    Ok(match Cell::deserialize(deserializer)? {
        Cell::Text(s) => s,
        Cell::Int(i) => i.to_string(),
        Cell::Float(f) => f.to_string(),
    })
}

/// Svar fra `/dataset/{id}/`.
#[derive(Debug, Clone, Deserialize)]
pub struct DatasetTable {
    pub data: Vec<DatasetRow>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UploadedDataset {
    pub id: DatasetId,
    #[serde(default)]
    pub name: Option<String>,
}

/// Svar fra `POST /upload/`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UploadResponse {
    #[serde(default)]
    pub message: Option<String>,
    pub dataset: UploadedDataset,
    pub summary: DatasetSummary,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub service: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
}

/// Filen brukeren har valgt for opplasting, lest inn i minnet.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedFile {
    pub file_name: String,
    pub content: Vec<u8>,
}

impl SelectedFile {
    pub fn new(file_name: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content,
        }
    }

    /// Leser hele filen før den sendes (samme som desktop-klienten gjør).
    pub fn from_path(path: &Path) -> io::Result<Self> {
        let content = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload.csv".to_string());
        Ok(Self { file_name, content })
    }
}

/// PDF-rapport slik backend leverte den. Bytes tolkes aldri som tekst.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportDocument {
    pub dataset_id: DatasetId,
    pub bytes: Vec<u8>,
}

impl ReportDocument {
    pub fn default_file_name(dataset_id: DatasetId) -> String {
        format!("equipment_report_{dataset_id}.pdf")
    }

    pub fn file_name(&self) -> String {
        Self::default_file_name(self.dataset_id)
    }

    pub fn save_to(&self, path: &Path) -> io::Result<()> {
        std::fs::write(path, &self.bytes)
    }
}
