//! The per-mass output records and their JSON encoding
use std::io;

use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;

use crate::error::XicError;
use crate::trace::ChromatogramTrace;

/// The filtered trace of one target mass, in the shape written to the
/// output document.
///
/// `rt` and `intensities` are index-aligned and only hold samples with
/// strictly positive intensity.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct XicRecord {
    pub mass: f64,
    pub rt: Vec<f64>,
    pub intensities: Vec<f64>,
}

impl XicRecord {
    pub fn new(mass: f64, rt: Vec<f64>, intensities: Vec<f64>) -> Self {
        Self {
            mass,
            rt,
            intensities,
        }
    }

    pub fn from_trace(mass: f64, trace: &ChromatogramTrace) -> Self {
        let (rt, intensities) = trace.retain_positive().into_parts();
        Self::new(mass, rt, intensities)
    }

    pub fn len(&self) -> usize {
        self.rt.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rt.is_empty()
    }
}

/// Pair each target mass with its trace, in order. The two inputs must
/// have the same length.
pub fn build_records(
    masses: &[f64],
    traces: &[ChromatogramTrace],
) -> Result<Vec<XicRecord>, XicError> {
    if masses.len() != traces.len() {
        return Err(XicError::TraceCountMismatch {
            expected: masses.len(),
            received: traces.len(),
        });
    }
    Ok(masses
        .iter()
        .zip(traces.iter())
        .map(|(mass, trace)| XicRecord::from_trace(*mass, trace))
        .collect())
}

/// Write `records` as a single tab-indented JSON array followed by a newline
pub fn write_records<W: io::Write>(writer: W, records: &[XicRecord]) -> Result<W, XicError> {
    let formatter = PrettyFormatter::with_indent(b"\t");
    let mut serializer = serde_json::Serializer::with_formatter(writer, formatter);
    records.serialize(&mut serializer)?;
    let mut writer = serializer.into_inner();
    writer.write_all(b"\n")?;
    Ok(writer)
}

/// Encode `records` into an in-memory JSON document
pub fn records_to_json(records: &[XicRecord]) -> Result<Vec<u8>, XicError> {
    write_records(Vec::new(), records)
}
