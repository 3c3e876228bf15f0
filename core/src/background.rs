use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread;

use log::debug;

use crate::api::EquipmentApi;
use crate::error::FetchError;
use crate::fetch::load_dataset;
use crate::state::{DatasetDetail, SelectionTicket};

/// Ferdig dataset-henting, merket med billetten den ble utstedt med.
#[derive(Debug)]
pub struct DatasetCompletion {
    pub ticket: SelectionTicket,
    pub result: Result<DatasetDetail, FetchError>,
}

/// En henting som kjører på egen tråd. Eieren av view-state poller.
pub struct PendingLoad {
    ticket: SelectionTicket,
    rx: Receiver<DatasetCompletion>,
}

impl PendingLoad {
    pub fn ticket(&self) -> SelectionTicket {
        self.ticket
    }

    /// `Ok(None)` = ikke ferdig ennå.
    pub fn try_take(&self) -> Result<Option<DatasetCompletion>, TryRecvError> {
        match self.rx.try_recv() {
            Ok(done) => Ok(Some(done)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Blokkerer til tråden er ferdig.
    pub fn wait(self) -> Option<DatasetCompletion> {
        self.rx.recv().ok()
    }
}

/// Starter `load_dataset` på en tråd, så rendering-tråden aldri blokkerer.
pub fn spawn_dataset_load(api: Arc<dyn EquipmentApi>, ticket: SelectionTicket) -> Option<PendingLoad> {
    let dataset_id = ticket.dataset_id()?;
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let result = load_dataset(api.as_ref(), dataset_id);
        // Mottaker kan være borte (logout/dashboard droppet) – da er svaret uinteressant
        if tx.send(DatasetCompletion { ticket, result }).is_err() {
            debug!("Dataset {dataset_id} finished after its receiver was dropped");
        }
    });
    Some(PendingLoad { ticket, rx })
}
