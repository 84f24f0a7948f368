use vrlat_core::{TelemetryRecord, TrialRecordBatch};

/// Append-only collection of completed trial batches.
///
/// Insertion order is trial completion order. Nothing is removed for the
/// lifetime of a run; consumers take a snapshot once the run is over.
#[derive(Debug, Default)]
pub struct TrialDataStore {
    batches: Vec<TrialRecordBatch>,
}

impl TrialDataStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, batch: TrialRecordBatch) {
        self.batches.push(batch);
    }

    pub fn snapshot(&self) -> &[TrialRecordBatch] {
        &self.batches
    }

    pub fn len(&self) -> usize {
        self.batches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }

    /// Total records across all batches.
    pub fn record_count(&self) -> usize {
        self.batches.iter().map(|b| b.records.len()).sum()
    }

    /// Flat `(trial_index, record)` view in completion order.
    pub fn iter_records(&self) -> impl Iterator<Item = (u64, &TelemetryRecord)> {
        self.batches
            .iter()
            .flat_map(|b| b.records.iter().map(move |r| (b.trial_index, r)))
    }

    pub fn into_batches(self) -> Vec<TrialRecordBatch> {
        self.batches
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch(trial_index: u64, n: usize) -> TrialRecordBatch {
        let records = (0..n)
            .map(|i| TelemetryRecord {
                timestamp_us: i as u32,
                chan1: 0,
                chan2: 0,
            })
            .collect();
        TrialRecordBatch::new(trial_index, records)
    }

    #[test]
    fn test_append_preserves_order() {
        let mut store = TrialDataStore::new();
        store.append(batch(1, 2));
        store.append(batch(2, 2));

        let indices: Vec<u64> = store.snapshot().iter().map(|b| b.trial_index).collect();
        assert_eq!(indices, vec![1, 2]);
        assert_eq!(store.len(), 2);
        assert_eq!(store.record_count(), 4);
    }

    #[test]
    fn test_iter_records_tags_each_row() {
        let mut store = TrialDataStore::new();
        store.append(batch(1, 1));
        store.append(batch(2, 2));

        let tags: Vec<u64> = store.iter_records().map(|(trial, _)| trial).collect();
        assert_eq!(tags, vec![1, 2, 2]);
    }
}
