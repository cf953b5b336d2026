//! Batch merging and create-or-update against the store
//!
//! Tuples from expansion are merged in memory by observation key. Every
//! `batch_size` source rows the pending records are written to the store as
//! one atomic batch; whatever remains is written by [`UpsertCoordinator::finish`].

use crate::app::models::{ObservationKey, ObservationRecord, ObservationTuple};
use crate::app::services::observation_store::{BatchOutcome, ObservationStore};
use crate::{ImportError, Result};
use std::collections::BTreeMap;
use tracing::{debug, error};

#[derive(Debug)]
pub struct UpsertCoordinator {
    batch_size: usize,
    pending: BTreeMap<ObservationKey, ObservationRecord>,
    rows_in_batch: usize,
    batches_committed: usize,
    replaced_values: usize,
}

impl UpsertCoordinator {
    /// `batch_size` is clamped to at least one row
    pub fn new(batch_size: usize) -> Self {
        Self {
            batch_size: batch_size.max(1),
            pending: BTreeMap::new(),
            rows_in_batch: 0,
            batches_committed: 0,
            replaced_values: 0,
        }
    }

    /// Merge a tuple into the pending batch; a later value for the same key
    /// and field replaces the earlier one
    pub fn accept(&mut self, tuple: ObservationTuple) {
        let record = self
            .pending
            .entry(tuple.key)
            .or_insert_with_key(|key| ObservationRecord::new(key.clone()));
        if record.set(tuple.field, tuple.value).is_some() {
            self.replaced_values += 1;
        }
    }

    /// Count one finished source row, flushing when the batch is full
    pub fn row_completed<S>(&mut self, store: &mut S) -> Result<Option<BatchOutcome>>
    where
        S: ObservationStore + ?Sized,
    {
        self.rows_in_batch += 1;
        if self.rows_in_batch >= self.batch_size {
            self.flush(store).map(Some)
        } else {
            Ok(None)
        }
    }

    /// Write out anything still pending
    pub fn finish<S>(&mut self, store: &mut S) -> Result<Option<BatchOutcome>>
    where
        S: ObservationStore + ?Sized,
    {
        if self.rows_in_batch == 0 && self.pending.is_empty() {
            return Ok(None);
        }
        self.flush(store).map(Some)
    }

    fn flush<S>(&mut self, store: &mut S) -> Result<BatchOutcome>
    where
        S: ObservationStore + ?Sized,
    {
        let batch_number = self.batches_committed + 1;
        let records: Vec<ObservationRecord> = std::mem::take(&mut self.pending).into_values().collect();
        let rows = std::mem::take(&mut self.rows_in_batch);

        match store.apply_batch(&records) {
            Ok(outcome) => {
                self.batches_committed = batch_number;
                debug!(
                    "Committed batch {} ({} rows): {} created, {} updated",
                    batch_number, rows, outcome.created, outcome.updated
                );
                Ok(outcome)
            }
            Err(source) => {
                error!(
                    "Batch {} failed; {} pending records discarded",
                    batch_number,
                    records.len()
                );
                Err(ImportError::storage_failure(batch_number, source))
            }
        }
    }

    pub fn batches_committed(&self) -> usize {
        self.batches_committed
    }

    /// Records waiting for the next flush
    pub fn pending_records(&self) -> usize {
        self.pending.len()
    }

    /// Values overwritten by a later value for the same key and field
    pub fn replaced_values(&self) -> usize {
        self.replaced_values
    }
}
