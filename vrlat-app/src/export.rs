use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use vrlat_experiment::TrialDataStore;

/// Writes the decoded batches as JSON, one object per trial.
pub fn write_json(path: &Path, store: &TrialDataStore) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    serde_json::to_writer_pretty(file, store.snapshot())
        .context("failed to serialize trial batches")?;
    log::info!("wrote {} batches to {}", store.len(), path.display());
    Ok(())
}

/// Writes one row per record: timestamp_us, chan1, chan2, trial.
pub fn write_csv(path: &Path, store: &TrialDataStore) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut writer = csv::Writer::from_writer(file);
    writer
        .write_record(["timestamp_us", "chan1", "chan2", "trial"])
        .context("failed to write CSV header")?;

    for (trial, record) in store.iter_records() {
        writer
            .write_record([
                record.timestamp_us.to_string(),
                record.chan1.to_string(),
                record.chan2.to_string(),
                trial.to_string(),
            ])
            .context("failed to write CSV row")?;
    }
    writer.flush().context("failed to flush CSV output")?;
    log::info!(
        "wrote {} records to {}",
        store.record_count(),
        path.display()
    );
    Ok(())
}
