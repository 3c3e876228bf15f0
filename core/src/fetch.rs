use log::{debug, info, warn};

use crate::api::EquipmentApi;
use crate::error::{ApiError, FetchError};
use crate::models::{DatasetId, HealthStatus, ReportDocument};
use crate::state::{DatasetDetail, ViewState};

/// Utfall av en summary-henting. Ingen av dem er feil for brukeren.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryOutcome {
    Loaded,
    /// 404 på `/summary/`: ingen datasett lastet opp ennå.
    NoDataYet,
    /// Svaret kom etter en nyere seleksjon/logout og ble forkastet.
    Stale,
    Failed,
}

/// Henter summary (`None` = siste datasett). Feil logges, vises ikke.
pub fn fetch_summary(
    api: &dyn EquipmentApi,
    view: &mut ViewState,
    dataset_id: Option<DatasetId>,
) -> SummaryOutcome {
    let ticket = view.snapshot();
    match api.summary(dataset_id) {
        Ok(summary) => {
            if view.apply_summary(&ticket, summary, dataset_id) {
                SummaryOutcome::Loaded
            } else {
                SummaryOutcome::Stale
            }
        }
        // Den eneste 404-en fra `/summary/` uten id er "No datasets available"
        Err(e) if dataset_id.is_none() && e.is_not_found() => {
            info!("No datasets available yet ({})", e.user_message());
            SummaryOutcome::NoDataYet
        }
        Err(e) => {
            warn!("Failed to load summary for {dataset_id:?}: {e}");
            SummaryOutcome::Failed
        }
    }
}

/// Henter history (maks 5, nyeste først). Ikke-fatal: feilen logges og
/// returneres, eksisterende liste beholdes.
pub fn fetch_history(api: &dyn EquipmentApi, view: &mut ViewState) -> Result<usize, ApiError> {
    let ticket = view.snapshot();
    match api.history() {
        Ok(entries) => {
            let n = entries.len();
            view.apply_history(&ticket, entries);
            debug!("History loaded ({n} entries)");
            Ok(n)
        }
        Err(e) => {
            warn!("Failed to load history: {e}");
            Err(e)
        }
    }
}

/// Nettverksdelen av en dataset-henting: rader, så summary for samme id.
/// Rører ikke view-state, så den kan kjøres på en annen tråd.
pub fn load_dataset(api: &dyn EquipmentApi, dataset_id: DatasetId) -> Result<DatasetDetail, FetchError> {
    let rows = api
        .dataset(dataset_id)
        .map_err(|e| dataset_error(dataset_id, e))?;

    let summary = match api.summary(Some(dataset_id)) {
        Ok(s) => Some(s),
        Err(e) => {
            warn!("Rows for dataset {dataset_id} loaded, but summary failed: {e}");
            None
        }
    };

    Ok(DatasetDetail {
        dataset_id,
        rows,
        summary,
    })
}

/// Viser et datasett: ny seleksjon, hent rader + summary, bruk atomisk.
/// Ved feil er gjeldende seleksjon uendret.
pub fn fetch_dataset(
    api: &dyn EquipmentApi,
    view: &mut ViewState,
    dataset_id: DatasetId,
) -> Result<usize, FetchError> {
    let ticket = view.select(dataset_id);
    let detail = load_dataset(api, dataset_id)?;
    let n = detail.rows.len();
    if view.apply_dataset(&ticket, detail) {
        info!("Loaded {n} records for dataset {dataset_id}");
    }
    Ok(n)
}

/// Henter PDF-rapporten. Bytes beholdes uendret; view-state røres ikke.
pub fn fetch_report(api: &dyn EquipmentApi, dataset_id: DatasetId) -> Result<ReportDocument, FetchError> {
    match api.report(dataset_id) {
        Ok(bytes) => {
            info!("Report for dataset {dataset_id} received ({} bytes)", bytes.len());
            Ok(ReportDocument { dataset_id, bytes })
        }
        Err(ApiError::Timeout) => Err(FetchError::Timeout),
        Err(e) => Err(FetchError::ReportGenerationFailed {
            id: dataset_id,
            message: e.user_message(),
        }),
    }
}

/// Id til siste opplastede datasett, via history.
pub fn latest_dataset_id(api: &dyn EquipmentApi) -> Result<Option<DatasetId>, ApiError> {
    Ok(api.history()?.first().map(|entry| entry.id))
}

pub fn health(api: &dyn EquipmentApi) -> Result<HealthStatus, ApiError> {
    api.health()
}

fn dataset_error(dataset_id: DatasetId, e: ApiError) -> FetchError {
    match e {
        ApiError::Timeout => FetchError::Timeout,
        other => FetchError::DatasetUnavailable {
            id: dataset_id,
            message: other.user_message(),
        },
    }
}
