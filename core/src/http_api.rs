// core/src/http_api.rs
use std::error::Error as StdError;
use std::io::{self, Read};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use ureq::Agent;
use uuid::Uuid;

use crate::api::{ClientFactory, Endpoint, EquipmentApi};
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::metrics::{api_requests_total, api_retries_total, ApiMetrics};
use crate::models::{
    Credentials, DatasetId, DatasetRow, DatasetSummary, DatasetTable, HealthStatus, HistoryEntry,
    SelectedFile, UploadResponse,
};

const UPLOAD_FIELD: &str = "file";
const ERROR_SNIPPET_CHARS: usize = 200;
// DRF forhandler innhold før viewet kjører; uten `*/*` svarer den 406
const REPORT_ACCEPT: &str = "application/pdf, */*";

/// Backend-klient over HTTP – enkel blocking-versjon (ureq).
///
/// Credentials bakes inn som ferdig `Authorization`-header når klienten
/// bygges. Det finnes ingen setter; ny innlogging = ny `HttpApi`.
pub struct HttpApi {
    agent: Agent,
    base_url: String,
    authorization: Option<String>,
    request_timeout: Duration,
    upload_timeout: Duration,
    get_retries: u32,
    retry_backoff: Duration,
    metrics: Option<ApiMetrics>,
}

impl HttpApi {
    pub fn new(config: &ClientConfig, credentials: &Credentials, metrics: Option<ApiMetrics>) -> Self {
        // ureq bruker rustls når "tls" er aktivert
        let agent = ureq::AgentBuilder::new()
            .timeout(config.request_timeout())
            .build();
        let authorization = if credentials.username.is_empty() && credentials.password.is_empty() {
            None
        } else {
            Some(basic_auth_header(credentials))
        };
        Self {
            agent,
            base_url: config.resolved_base_url(),
            authorization,
            request_timeout: config.request_timeout(),
            upload_timeout: config.upload_timeout(),
            get_retries: config.get_retries,
            retry_backoff: config.retry_backoff(),
            metrics,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: Endpoint) -> String {
        format!("{}{}", self.base_url, endpoint.path())
    }

    fn request(&self, method: &str, endpoint: Endpoint, timeout: Duration) -> ureq::Request {
        let req = self.agent.request(method, &self.url(endpoint)).timeout(timeout);
        match &self.authorization {
            Some(auth) => req.set("Authorization", auth),
            None => req,
        }
    }

    fn record(&self, endpoint: Endpoint, result: Result<(), &ApiError>) {
        if let Some(m) = &self.metrics {
            api_requests_total(m, endpoint.label(), &outcome_label(result)).inc();
        }
    }

    /// GET med retry for nettverksfeil. Statusfeil (4xx/5xx) prøves aldri på nytt.
    fn get(&self, endpoint: Endpoint, accept: &str) -> Result<ureq::Response, ApiError> {
        let mut attempt = 0u32;
        loop {
            debug!("GET {}", self.url(endpoint));
            let result = self
                .request("GET", endpoint, self.request_timeout)
                .set("Accept", accept)
                .call()
                .map_err(map_ureq_error);

            match result {
                Err(e) if e.is_transient() && endpoint.is_idempotent() && attempt < self.get_retries => {
                    let delay = backoff_delay(self.retry_backoff, attempt);
                    warn!(
                        "GET {} failed ({e}), retry {}/{} in {:?}",
                        endpoint.path(),
                        attempt + 1,
                        self.get_retries,
                        delay
                    );
                    self.record(endpoint, Err(&e));
                    if let Some(m) = &self.metrics {
                        api_retries_total(m, endpoint.label()).inc();
                    }
                    thread::sleep(delay);
                    attempt += 1;
                }
                other => {
                    self.record(endpoint, other.as_ref().map(|_| ()));
                    return other;
                }
            }
        }
    }

    fn get_json<T: DeserializeOwned>(&self, endpoint: Endpoint) -> Result<T, ApiError> {
        let body = self.get(endpoint, "application/json")?.into_string()?;
        decode(&body)
    }
}

impl EquipmentApi for HttpApi {
    fn history(&self) -> Result<Vec<HistoryEntry>, ApiError> {
        self.get_json(Endpoint::History)
    }

    fn summary(&self, dataset_id: Option<DatasetId>) -> Result<DatasetSummary, ApiError> {
        self.get_json(Endpoint::Summary(dataset_id))
    }

    fn dataset(&self, dataset_id: DatasetId) -> Result<Vec<DatasetRow>, ApiError> {
        let table: DatasetTable = self.get_json(Endpoint::Dataset(dataset_id))?;
        Ok(table.data)
    }

    fn upload(&self, file: &SelectedFile) -> Result<UploadResponse, ApiError> {
        let boundary = format!("equipviz-{}", Uuid::new_v4().simple());
        let body = multipart_body(&boundary, UPLOAD_FIELD, file);
        debug!(
            "POST {} ({} bytes, file={})",
            self.url(Endpoint::Upload),
            body.len(),
            file.file_name
        );

        // Aldri retry her – dobbel innsending gir duplikate datasett.
        let result = self
            .request("POST", Endpoint::Upload, self.upload_timeout)
            .set("Content-Type", &format!("multipart/form-data; boundary={boundary}"))
            .set("Accept", "application/json")
            .send_bytes(&body)
            .map_err(map_ureq_error);
        self.record(Endpoint::Upload, result.as_ref().map(|_| ()));

        let text = result?.into_string()?;
        decode(&text)
    }

    fn report(&self, dataset_id: DatasetId) -> Result<Vec<u8>, ApiError> {
        let resp = self.get(Endpoint::Report(dataset_id), REPORT_ACCEPT)?;
        let mut bytes = Vec::new();
        resp.into_reader().read_to_end(&mut bytes)?;
        Ok(bytes)
    }

    fn health(&self) -> Result<HealthStatus, ApiError> {
        self.get_json(Endpoint::Health)
    }
}

/// Lager en ny `HttpApi` per credential-par.
pub struct HttpClientFactory {
    config: ClientConfig,
    metrics: Option<ApiMetrics>,
}

impl HttpClientFactory {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: ApiMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}

impl ClientFactory for HttpClientFactory {
    fn build(&self, credentials: &Credentials) -> Arc<dyn EquipmentApi> {
        Arc::new(HttpApi::new(&self.config, credentials, self.metrics.clone()))
    }
}

pub fn basic_auth_header(credentials: &Credentials) -> String {
    let raw = format!("{}:{}", credentials.username, credentials.password);
    format!("Basic {}", STANDARD.encode(raw))
}

/// multipart/form-data med ett filfelt.
pub fn multipart_body(boundary: &str, field: &str, file: &SelectedFile) -> Vec<u8> {
    let file_name: String = file
        .file_name
        .chars()
        .filter(|c| *c != '\r' && *c != '\n')
        .collect::<String>()
        .replace('"', "%22");

    let mut body = Vec::with_capacity(file.content.len() + 256);
    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\n")
            .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: text/csv\r\n\r\n");
    body.extend_from_slice(&file.content);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    body
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    detail: Option<String>,
}

/// Feilmelding fra body: `error`, så DRF sin `detail`, ellers rå tekst (kuttet).
pub fn error_message(status: u16, body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        if let Some(msg) = parsed.error.or(parsed.detail) {
            return msg;
        }
    }
    let snippet: String = body.trim().chars().take(ERROR_SNIPPET_CHARS).collect();
    if snippet.is_empty() {
        format!("Error {status}")
    } else {
        format!("Error {status}: {snippet}")
    }
}

pub(crate) fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    let mut de = serde_json::Deserializer::from_str(body);
    serde_path_to_error::deserialize(&mut de).map_err(|e| ApiError::Decode {
        path: e.path().to_string(),
        message: e.inner().to_string(),
    })
}

fn map_ureq_error(err: ureq::Error) -> ApiError {
    match err {
        ureq::Error::Status(status, response) => {
            let body = response.into_string().unwrap_or_default();
            ApiError::Status {
                status,
                message: error_message(status, &body),
            }
        }
        ureq::Error::Transport(transport) => {
            if is_timeout(&transport) {
                ApiError::Timeout
            } else {
                ApiError::Transport(transport.to_string())
            }
        }
    }
}

fn is_timeout(transport: &ureq::Transport) -> bool {
    let mut source = transport.source();
    while let Some(err) = source {
        if let Some(io_err) = err.downcast_ref::<io::Error>() {
            if matches!(io_err.kind(), io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock) {
                return true;
            }
        }
        source = err.source();
    }
    false
}

fn outcome_label(result: Result<(), &ApiError>) -> String {
    match result {
        Ok(()) => "ok".to_string(),
        Err(ApiError::Status { status, .. }) => format!("status_{status}"),
        Err(ApiError::Timeout) => "timeout".to_string(),
        Err(ApiError::Transport(_)) => "transport".to_string(),
        Err(_) => "error".to_string(),
    }
}

fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    base.saturating_mul(1u32 << attempt.min(6))
}
