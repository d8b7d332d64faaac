use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::error::XicError;
use crate::provider::{ScanProvider, TraceSettings};
use crate::record::{build_records, XicRecord};
use crate::scan_range::ScanRange;
use crate::trace::ChromatogramTrace;
use crate::window::{build_mass_windows, MassWindow};

/// Request the traces for all `windows` from `provider` in a single batch.
///
/// The n-th returned trace belongs to the n-th window. A provider that
/// returns a different number of traces than windows is treated as an error.
#[instrument(level = "debug", skip(provider, windows), fields(windows = windows.len()))]
pub fn extract_chromatograms<P: ScanProvider>(
    provider: &mut P,
    windows: &[MassWindow],
    settings: &TraceSettings,
    scan_range: ScanRange,
) -> Result<Vec<ChromatogramTrace>, XicError> {
    let traces = provider
        .get_traces(windows, settings, scan_range)
        .map_err(XicError::provider)?;
    if traces.len() != windows.len() {
        return Err(XicError::TraceCountMismatch {
            expected: windows.len(),
            received: traces.len(),
        });
    }
    Ok(traces)
}

/// Everything needed to extract the XIC traces of a mass list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct XicRequest {
    pub masses: Vec<f64>,
    pub ppm: f64,
    pub scan_range: ScanRange,
    pub settings: TraceSettings,
}

impl XicRequest {
    pub fn new(masses: Vec<f64>, ppm: f64) -> Self {
        Self {
            masses,
            ppm,
            scan_range: ScanRange::full(),
            settings: TraceSettings::default(),
        }
    }

    pub fn with_scan_range(mut self, scan_range: ScanRange) -> Self {
        self.scan_range = scan_range;
        self
    }

    pub fn with_settings(mut self, settings: TraceSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn windows(&self) -> Vec<MassWindow> {
        build_mass_windows(&self.masses, self.ppm)
    }
}

/// Build the mass windows, extract their traces and keep the positive
/// intensity samples, producing one record per requested mass in order.
pub fn run_xic<P: ScanProvider>(
    provider: &mut P,
    request: &XicRequest,
) -> Result<Vec<XicRecord>, XicError> {
    let windows = request.windows();
    debug!(
        "Built {} mass windows at {} ppm over scans {}",
        windows.len(),
        request.ppm,
        request.scan_range
    );
    let traces = extract_chromatograms(provider, &windows, &request.settings, request.scan_range)?;
    let records = build_records(&request.masses, &traces)?;
    let retained: usize = records.iter().map(|r| r.len()).sum();
    let total: usize = traces.iter().map(|t| t.len()).sum();
    info!(
        "Extracted {} traces, keeping {retained} of {total} samples",
        records.len()
    );
    Ok(records)
}

#[cfg(test)]
mod test {
    use std::io;

    use super::*;

    struct FailingProvider;

    impl ScanProvider for FailingProvider {
        type Error = io::Error;

        fn get_traces(
            &mut self,
            _windows: &[MassWindow],
            _settings: &TraceSettings,
            _scan_range: ScanRange,
        ) -> Result<Vec<ChromatogramTrace>, Self::Error> {
            Err(io::Error::new(io::ErrorKind::InvalidData, "corrupt scan index"))
        }
    }

    #[derive(Default)]
    struct CountingProvider {
        calls: usize,
        windows_seen: Vec<usize>,
        ranges_seen: Vec<ScanRange>,
    }

    impl ScanProvider for CountingProvider {
        type Error = io::Error;

        fn get_traces(
            &mut self,
            windows: &[MassWindow],
            _settings: &TraceSettings,
            scan_range: ScanRange,
        ) -> Result<Vec<ChromatogramTrace>, Self::Error> {
            self.calls += 1;
            self.windows_seen.push(windows.len());
            self.ranges_seen.push(scan_range);
            Ok(windows.iter().map(|_| ChromatogramTrace::new()).collect())
        }
    }

    #[test]
    fn test_single_batched_call() -> Result<(), XicError> {
        let mut provider = CountingProvider::default();
        let request = XicRequest::new(vec![100.0, 200.0, 300.0], 5.0)
            .with_scan_range(ScanRange::new(Some(10), None));
        let records = run_xic(&mut provider, &request)?;
        assert_eq!(records.len(), 3);
        assert_eq!(provider.calls, 1);
        assert_eq!(provider.windows_seen, vec![3]);
        assert_eq!(provider.ranges_seen, vec![ScanRange::new(Some(10), None)]);
        Ok(())
    }

    #[test]
    fn test_provider_error_propagates() {
        let windows = build_mass_windows(&[100.0], 10.0);
        let err = extract_chromatograms(
            &mut FailingProvider,
            &windows,
            &TraceSettings::default(),
            ScanRange::full(),
        )
        .unwrap_err();
        assert!(matches!(err, XicError::ProviderError(_)));
        assert!(err.to_string().contains("corrupt scan index"));
    }
}
