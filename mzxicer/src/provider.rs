//! A [`ScanProvider`] that reads its scans from any `mzdata` spectrum stream.
use mzdata::prelude::*;
use mzdata::spectrum::bindata::ArrayRetrievalError;
use thiserror::Error;
use tracing::{debug, warn};

use mzxic::{ChromatogramTrace, MassWindow, ScanProvider, ScanRange, TraceAccumulator, TraceSettings};

use crate::types::SpectrumType;

#[derive(Debug, Error)]
pub enum MzDataProviderError {
    #[error("Failed to read the signal arrays of spectrum {index}: {source}")]
    ArrayRetrievalError {
        index: usize,
        #[source]
        source: ArrayRetrievalError,
    },
    #[error("The scan range {0} starts after it ends")]
    InvertedScanRange(ScanRange),
    #[error("The spectrum stream was already consumed by an earlier request")]
    StreamConsumed,
}

/// Visits the spectra of a reader once, in index order, summing the signal
/// inside each mass window.
///
/// Centroid peaks are used when a spectrum carries them, its raw m/z and
/// intensity arrays otherwise.
#[derive(Debug)]
pub struct MzDataScanProvider<R: Iterator<Item = SpectrumType>> {
    reader: R,
    consumed: bool,
}

impl<R: Iterator<Item = SpectrumType>> MzDataScanProvider<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            consumed: false,
        }
    }

    pub fn into_inner(self) -> R {
        self.reader
    }
}

fn observe_spectrum(
    accumulator: &mut TraceAccumulator<'_>,
    spectrum: &SpectrumType,
) -> Result<(), MzDataProviderError> {
    let time = spectrum.start_time();
    if let Some(peaks) = spectrum.peaks.as_ref() {
        let mzs: Vec<f64> = peaks.iter().map(|p| p.mz).collect();
        let intensities: Vec<f32> = peaks.iter().map(|p| p.intensity).collect();
        accumulator.observe_sorted(time, &mzs, &intensities);
    } else if let Some(arrays) = spectrum.arrays.as_ref() {
        let index = spectrum.index();
        let mzs = arrays
            .mzs()
            .map_err(|source| MzDataProviderError::ArrayRetrievalError { index, source })?;
        let intensities = arrays
            .intensities()
            .map_err(|source| MzDataProviderError::ArrayRetrievalError { index, source })?;
        if mzs.len() != intensities.len() {
            warn!(
                "Spectrum {} has {} m/z values but {} intensities",
                spectrum.id(),
                mzs.len(),
                intensities.len()
            );
        }
        if mzs.windows(2).all(|w| w[0] <= w[1]) {
            accumulator.observe_sorted(time, &mzs, &intensities);
        } else {
            accumulator.observe_points(
                time,
                mzs.iter()
                    .copied()
                    .zip(intensities.iter().map(|i| *i as f64)),
            );
        }
    } else {
        accumulator.observe_points(time, std::iter::empty::<(f64, f64)>());
    }
    Ok(())
}

impl<R: Iterator<Item = SpectrumType>> ScanProvider for MzDataScanProvider<R> {
    type Error = MzDataProviderError;

    fn get_traces(
        &mut self,
        windows: &[MassWindow],
        settings: &TraceSettings,
        scan_range: ScanRange,
    ) -> Result<Vec<ChromatogramTrace>, Self::Error> {
        if let (Some(start), Some(end)) = (scan_range.start, scan_range.end) {
            if start > end {
                return Err(MzDataProviderError::InvertedScanRange(scan_range));
            }
        }
        if self.consumed {
            return Err(MzDataProviderError::StreamConsumed);
        }
        self.consumed = true;

        let mut accumulator = TraceAccumulator::new(windows);
        let mut spectra_read = 0usize;
        for spectrum in self.reader.by_ref() {
            spectra_read += 1;
            let index = spectrum.index();
            if scan_range.end.is_some_and(|end| index > end) {
                break;
            }
            if !scan_range.contains(index) || !settings.accepts(spectrum.ms_level()) {
                continue;
            }
            observe_spectrum(&mut accumulator, &spectrum)?;
        }
        debug!(
            "Read {spectra_read} spectra, {} at MS level {} in scans {scan_range}",
            accumulator.scans_observed(),
            settings.ms_level,
        );
        Ok(accumulator.finish())
    }
}
