use std::fmt::Display;
use std::error::Error;

use mzxic::{
    records_to_json, run_xic, ChromatogramTrace, InMemoryScanProvider, MassWindow, ScanProvider,
    ScanRange, ScanRecord, TraceSettings, XicError, XicRequest,
};

#[derive(Debug)]
struct ScriptError;

impl Display for ScriptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("script exhausted")
    }
}

impl Error for ScriptError {}

/// Replays a fixed response no matter what is asked for
#[derive(Debug, Clone)]
struct ScriptedProvider {
    response: Vec<ChromatogramTrace>,
    requests: Vec<Vec<MassWindow>>,
}

impl ScriptedProvider {
    fn new(response: Vec<Vec<(f64, f64)>>) -> Self {
        Self {
            response: response.into_iter().map(ChromatogramTrace::from).collect(),
            requests: Vec::new(),
        }
    }
}

impl ScanProvider for ScriptedProvider {
    type Error = ScriptError;

    fn get_traces(
        &mut self,
        windows: &[MassWindow],
        _settings: &TraceSettings,
        _scan_range: ScanRange,
    ) -> Result<Vec<ChromatogramTrace>, Self::Error> {
        self.requests.push(windows.to_vec());
        Ok(self.response.clone())
    }
}

#[test_log::test]
fn test_end_to_end_example() -> Result<(), XicError> {
    let mut provider = ScriptedProvider::new(vec![
        vec![(0.1, 5.0), (0.2, -1.0)],
        vec![(0.1, 0.0), (0.2, 3.0)],
    ]);
    let request = XicRequest::new(vec![500.0, 500.0], 10.0);
    let records = run_xic(&mut provider, &request)?;

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].mass, 500.0);
    assert_eq!(records[0].rt, vec![0.1]);
    assert_eq!(records[0].intensities, vec![5.0]);
    assert_eq!(records[1].mass, 500.0);
    assert_eq!(records[1].rt, vec![0.2]);
    assert_eq!(records[1].intensities, vec![3.0]);

    assert_eq!(provider.requests.len(), 1);
    let windows = &provider.requests[0];
    assert_eq!(windows.len(), 2);
    for window in windows {
        assert!((window.width() - 0.005).abs() < 1e-9);
    }
    Ok(())
}

#[test_log::test]
fn test_order_and_empty_traces() -> Result<(), XicError> {
    let masses = vec![650.5, 120.25, 999.0];
    let mut provider = ScriptedProvider::new(vec![vec![], vec![(1.0, -2.0)], vec![(3.0, 4.0)]]);
    let records = run_xic(&mut provider, &XicRequest::new(masses.clone(), 20.0))?;
    assert_eq!(records.len(), masses.len());
    for (record, mass) in records.iter().zip(masses.iter()) {
        assert_eq!(record.mass, *mass);
        assert_eq!(record.rt.len(), record.intensities.len());
        assert!(record.intensities.iter().all(|i| *i > 0.0));
    }
    assert!(records[0].is_empty());
    assert!(records[1].is_empty());
    assert_eq!(records[2].rt, vec![3.0]);
    Ok(())
}

#[test_log::test]
fn test_empty_mass_list() -> Result<(), XicError> {
    let mut provider = ScriptedProvider::new(vec![]);
    let records = run_xic(&mut provider, &XicRequest::new(vec![], 10.0))?;
    assert!(records.is_empty());
    assert_eq!(records_to_json(&records)?, b"[]\n".to_vec());
    Ok(())
}

#[test_log::test]
fn test_mismatched_response_is_fatal() {
    let mut provider = ScriptedProvider::new(vec![vec![(0.1, 5.0)]]);
    let result = run_xic(&mut provider, &XicRequest::new(vec![500.0, 600.0], 10.0));
    match result {
        Err(XicError::TraceCountMismatch { expected, received }) => {
            assert_eq!(expected, 2);
            assert_eq!(received, 1);
        }
        other => panic!("Expected a trace count mismatch, got {other:?}"),
    }

    let mut provider = ScriptedProvider::new(vec![vec![], vec![], vec![]]);
    let result = run_xic(&mut provider, &XicRequest::new(vec![500.0, 600.0], 10.0));
    assert!(matches!(
        result,
        Err(XicError::TraceCountMismatch {
            expected: 2,
            received: 3
        })
    ));
}

#[test_log::test]
fn test_output_is_deterministic() -> Result<(), XicError> {
    let response = vec![
        vec![(0.05, 12.5), (0.1, 0.0), (0.15, 1.25e6)],
        vec![(0.05, -3.0), (0.1, 7.75)],
    ];
    let request = XicRequest::new(vec![445.12003, 519.13882], 10.0);

    let first = records_to_json(&run_xic(&mut ScriptedProvider::new(response.clone()), &request)?)?;
    let second = records_to_json(&run_xic(&mut ScriptedProvider::new(response), &request)?)?;
    assert_eq!(first, second);
    Ok(())
}

#[test_log::test]
fn test_in_memory_summation() -> Result<(), XicError> {
    let mut provider: InMemoryScanProvider = vec![
        ScanRecord::new(0, 1, 0.5, vec![445.1200, 445.1250, 519.1388], vec![100.0, 50.0, 10.0]),
        ScanRecord::new(1, 2, 0.55, vec![445.1200], vec![1e6]),
        ScanRecord::new(2, 1, 0.6, vec![445.1201, 519.1390], vec![200.0, 20.0]),
        ScanRecord::new(3, 1, 0.7, vec![600.0], vec![30.0]),
    ]
    .into_iter()
    .collect();

    let request = XicRequest::new(vec![445.12, 519.1388], 10.0);
    let records = run_xic(&mut provider, &request)?;
    assert_eq!(records[0].rt, vec![0.5, 0.6]);
    assert_eq!(records[0].intensities, vec![100.0, 200.0]);
    assert_eq!(records[1].rt, vec![0.5, 0.6]);
    assert_eq!(records[1].intensities, vec![10.0, 20.0]);

    let records = run_xic(
        &mut provider,
        &request.clone().with_scan_range(ScanRange::new(Some(1), None)),
    )?;
    assert_eq!(records[0].rt, vec![0.6]);
    Ok(())
}
