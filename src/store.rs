//! Single-slot store for the most recently created function.
//!
//! The submission form is the only writer; the status panel subscribes and
//! reacts to every replacement.

use std::sync::Arc;

use data_model::FunctionRecord;
use tokio::sync::watch;

pub type LatestFunction = Option<Arc<FunctionRecord>>;

#[derive(Debug, Clone)]
pub struct LatestFunctionStore {
    tx: Arc<watch::Sender<LatestFunction>>,
}

impl Default for LatestFunctionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl LatestFunctionStore {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx: Arc::new(tx) }
    }

    /// Replaces the slot wholesale. Subscribers are notified even if an
    /// identical record is published again.
    pub fn publish(&self, record: FunctionRecord) -> Arc<FunctionRecord> {
        let record = Arc::new(record);
        self.tx.send_replace(Some(record.clone()));
        record
    }

    pub fn clear(&self) {
        self.tx.send_replace(None);
    }

    pub fn current(&self) -> LatestFunction {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<LatestFunction> {
        self.tx.subscribe()
    }
}
