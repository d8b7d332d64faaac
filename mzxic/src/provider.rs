//! The scan provider abstraction the extractor talks to, and the single-pass
//! mass-window summation concrete providers build their traces with.
use std::convert::Infallible;
use std::error::Error as StdError;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::scan_range::ScanRange;
use crate::trace::ChromatogramTrace;
use crate::window::MassWindow;

/// How the signal inside a mass window is reduced to one intensity per scan
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TraceType {
    /// Sum all intensity inside the m/z window
    #[default]
    MassRange,
}

/// The scan filter passed along with a batch of mass windows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceSettings {
    /// Only scans at this MS level contribute to the traces
    pub ms_level: u8,
    pub trace_type: TraceType,
}

impl TraceSettings {
    pub fn new(ms_level: u8, trace_type: TraceType) -> Self {
        Self {
            ms_level,
            trace_type,
        }
    }

    pub fn accepts(&self, ms_level: u8) -> bool {
        self.ms_level == ms_level
    }
}

impl Default for TraceSettings {
    fn default() -> Self {
        Self::new(1, TraceType::MassRange)
    }
}

/// A source of chromatogram traces over a run.
///
/// Implementations must return exactly one trace per requested window, in
/// the same order as `windows`, each covering `scan_range` in increasing
/// time order.
pub trait ScanProvider {
    type Error: StdError + Send + Sync + 'static;

    fn get_traces(
        &mut self,
        windows: &[MassWindow],
        settings: &TraceSettings,
        scan_range: ScanRange,
    ) -> Result<Vec<ChromatogramTrace>, Self::Error>;
}

impl<P: ScanProvider + ?Sized> ScanProvider for &mut P {
    type Error = P::Error;

    fn get_traces(
        &mut self,
        windows: &[MassWindow],
        settings: &TraceSettings,
        scan_range: ScanRange,
    ) -> Result<Vec<ChromatogramTrace>, Self::Error> {
        (**self).get_traces(windows, settings, scan_range)
    }
}

/// Builds one trace per mass window while scans are visited once, in order.
///
/// Every observed scan appends exactly one sample to every trace, so the
/// traces stay index-aligned with each other and with the windows.
#[derive(Debug, Clone)]
pub struct TraceAccumulator<'a> {
    windows: &'a [MassWindow],
    traces: Vec<ChromatogramTrace>,
    scans_observed: usize,
}

impl<'a> TraceAccumulator<'a> {
    pub fn new(windows: &'a [MassWindow]) -> Self {
        let traces = windows.iter().map(|_| ChromatogramTrace::new()).collect();
        Self {
            windows,
            traces,
            scans_observed: 0,
        }
    }

    pub fn scans_observed(&self) -> usize {
        self.scans_observed
    }

    /// Add a scan whose `mzs` are sorted in ascending order. `intensities`
    /// is paired with `mzs` by position.
    pub fn observe_sorted<I: Copy + Into<f64>>(&mut self, time: f64, mzs: &[f64], intensities: &[I]) {
        let n = mzs.len().min(intensities.len());
        let mzs = &mzs[..n];
        for (window, trace) in self.windows.iter().zip(self.traces.iter_mut()) {
            let start = mzs.partition_point(|mz| *mz < window.lower_bound);
            let end = mzs.partition_point(|mz| *mz <= window.upper_bound);
            let total: f64 = if start < end {
                intensities[start..end]
                    .iter()
                    .map(|i| Into::<f64>::into(*i))
                    .sum()
            } else {
                0.0
            };
            trace.push(time, total);
        }
        self.scans_observed += 1;
    }

    /// Add a scan from `(mz, intensity)` points in any order.
    pub fn observe_points<I: IntoIterator<Item = (f64, f64)>>(&mut self, time: f64, points: I) {
        let mut totals = vec![0.0; self.windows.len()];
        for (mz, intensity) in points {
            for (window, total) in self.windows.iter().zip(totals.iter_mut()) {
                if window.contains(mz) {
                    *total += intensity;
                }
            }
        }
        for (trace, total) in self.traces.iter_mut().zip(totals) {
            trace.push(time, total);
        }
        self.scans_observed += 1;
    }

    pub fn finish(self) -> Vec<ChromatogramTrace> {
        trace!(
            "Accumulated {} traces over {} scans",
            self.traces.len(),
            self.scans_observed
        );
        self.traces
    }
}

/// A scan that has already been decoded into memory
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ScanRecord {
    pub index: usize,
    pub ms_level: u8,
    pub time: f64,
    pub mzs: Vec<f64>,
    pub intensities: Vec<f32>,
}

impl ScanRecord {
    pub fn new(index: usize, ms_level: u8, time: f64, mzs: Vec<f64>, intensities: Vec<f32>) -> Self {
        Self {
            index,
            ms_level,
            time,
            mzs,
            intensities,
        }
    }
}

/// A [`ScanProvider`] over scans held in memory, ordered by time.
///
/// The m/z values of each scan need not be sorted.
#[derive(Debug, Default, Clone)]
pub struct InMemoryScanProvider {
    scans: Vec<ScanRecord>,
}

impl InMemoryScanProvider {
    pub fn new(scans: Vec<ScanRecord>) -> Self {
        Self { scans }
    }

    pub fn len(&self) -> usize {
        self.scans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scans.is_empty()
    }
}

impl FromIterator<ScanRecord> for InMemoryScanProvider {
    fn from_iter<T: IntoIterator<Item = ScanRecord>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl ScanProvider for InMemoryScanProvider {
    type Error = Infallible;

    fn get_traces(
        &mut self,
        windows: &[MassWindow],
        settings: &TraceSettings,
        scan_range: ScanRange,
    ) -> Result<Vec<ChromatogramTrace>, Self::Error> {
        let mut acc = TraceAccumulator::new(windows);
        for scan in self
            .scans
            .iter()
            .filter(|s| scan_range.contains(s.index) && settings.accepts(s.ms_level))
        {
            acc.observe_points(
                scan.time,
                scan.mzs
                    .iter()
                    .copied()
                    .zip(scan.intensities.iter().map(|i| *i as f64)),
            );
        }
        Ok(acc.finish())
    }
}
