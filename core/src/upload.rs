use log::{info, warn};

use crate::api::EquipmentApi;
use crate::error::{ApiError, FetchError, UploadError};
use crate::fetch::{fetch_dataset, fetch_history};
use crate::models::{DatasetId, DatasetSummary};
use crate::state::ViewState;

/// Resultat av en vellykket opplasting, inkl. utfallet av oppfølgingskallene.
#[derive(Debug)]
pub struct UploadReport {
    pub dataset_id: DatasetId,
    pub summary: DatasetSummary,
    pub message: Option<String>,
    /// Rader for det nye datasettet (eller hvorfor de mangler).
    pub dataset: Result<usize, FetchError>,
    /// Antall history-elementer (eller feilen, som kun er logget).
    pub history: Result<usize, ApiError>,
}

/// Laster opp valgt fil og synker view-state.
///
/// Rekkefølgen er fast: commit summary + id, hent rader (og summary) for
/// id-en, hent history, tøm filvalget. Dataset-steget er ferdig før
/// history-kallet går ut. Feiler selve opplastingen, røres ingenting.
pub fn upload(api: &dyn EquipmentApi, view: &mut ViewState) -> Result<UploadReport, UploadError> {
    let response = {
        let file = view.selected_file().ok_or(UploadError::NoFileSelected)?;
        info!("📤 Uploading {} ({} bytes)", file.file_name, file.content.len());
        api.upload(file).map_err(|e| {
            warn!("Upload failed: {e}");
            match e {
                ApiError::Status { message, .. } => UploadError::Rejected(message),
                other => UploadError::Unreachable(other.to_string()),
            }
        })?
    };

    let dataset_id = response.dataset.id;
    view.commit_upload(dataset_id, response.summary.clone());

    let dataset = fetch_dataset(api, view, dataset_id);
    if let Err(e) = &dataset {
        warn!("Upload of dataset {dataset_id} succeeded, but loading its rows failed: {e}");
    }
    let history = fetch_history(api, view);

    view.clear_selected_file();

    Ok(UploadReport {
        dataset_id,
        summary: response.summary,
        message: response.message,
        dataset,
        history,
    })
}
