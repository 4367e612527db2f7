//! Block-by-block traversal of decoded captures
//!
//! Blocks are visited strictly in file order, one at a time. Each visit
//! builds the typed block, decodes its samples, folds it into the running
//! state, then hands it to the caller's visitor (used for per-block exports).
//! Any error aborts the whole file: a partial aggregate is never returned.
//!
//! An optional cancellation flag is polled before every block.
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, info};

use crate::aggregate::{AggregateState, ScanSummary};
use crate::block::{IqBlock, PsdBlock};
use crate::proto::{RawIqFile, ScanFile};
use crate::qformat;
use crate::{Error, Result};

/// Aggregate every PSD block of `file`.
///
/// `on_block` receives the 1-based block index, the typed block and its
/// decoded samples (dB).
pub fn aggregate_psd<F>(
    file: &ScanFile,
    cancel: Option<&AtomicBool>,
    mut on_block: F,
) -> Result<AggregateState>
where
    F: FnMut(usize, &PsdBlock, &[f64]) -> Result<()>,
{
    let mut state: Option<AggregateState> = None;

    for (n, wire) in file.spectral_psd_data.iter().enumerate() {
        let index = n + 1;
        check_cancelled(cancel, n)?;

        let block = PsdBlock::from_wire(index, wire)?;
        let decoded = qformat::decode(&block.samples);
        let state = state.get_or_insert_with(|| AggregateState::from_first_block(&block));
        state.update(&block, &decoded)?;
        debug!(
            block = index,
            kind = %block.reading_kind,
            bins = decoded.len(),
            "aggregated PSD block"
        );

        on_block(index, &block, &decoded)?;
    }

    let state = state.ok_or(Error::EmptyFile)?;
    info!(
        blocks = state.summary().block_count,
        averaged = state.avg_contributor_count(),
        unclassified = state.unclassified_count(),
        "PSD traversal complete"
    );
    Ok(state)
}

/// Summarize every IQ snapshot of `file`.
///
/// `on_block` receives the 1-based block index and the typed snapshot.
pub fn summarize_iq<F>(
    file: &RawIqFile,
    cancel: Option<&AtomicBool>,
    mut on_block: F,
) -> Result<ScanSummary>
where
    F: FnMut(usize, &IqBlock) -> Result<()>,
{
    if file.spectral_iq_data.is_empty() {
        return Err(Error::EmptyFile);
    }

    let mut summary = ScanSummary::new();
    for (n, wire) in file.spectral_iq_data.iter().enumerate() {
        let index = n + 1;
        check_cancelled(cancel, n)?;

        let block = IqBlock::from_wire(index, wire)?;
        summary.observe_iq(&block);
        debug!(block = index, pairs = block.pair_count(), "summarized IQ snapshot");

        on_block(index, &block)?;
    }

    info!(
        blocks = summary.block_count,
        pairs = summary.total_sample_count,
        "IQ traversal complete"
    );
    Ok(summary)
}

fn check_cancelled(cancel: Option<&AtomicBool>, done: usize) -> Result<()> {
    match cancel {
        Some(flag) if flag.load(Ordering::Relaxed) => Err(Error::Cancelled(done)),
        _ => Ok(()),
    }
}
