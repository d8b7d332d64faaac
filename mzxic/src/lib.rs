//! Extracted ion chromatograms over mass windows.
//!
//! A list of target masses and a ppm tolerance become [`MassWindow`]s, a
//! [`ScanProvider`] produces one [`ChromatogramTrace`] per window in a single
//! batched request, and the positive-intensity samples of each trace are
//! written out as a JSON array of [`XicRecord`]s.
pub mod error;
pub mod extract;
pub mod mass_list;
pub mod provider;
pub mod record;
pub mod scan_range;
pub mod trace;
pub mod window;

pub use crate::error::XicError;
pub use crate::extract::{extract_chromatograms, run_xic, XicRequest};
pub use crate::mass_list::{read_mass_list, read_mass_list_path};
pub use crate::provider::{
    InMemoryScanProvider, ScanProvider, ScanRecord, TraceAccumulator, TraceSettings, TraceType,
};
pub use crate::record::{build_records, records_to_json, write_records, XicRecord};
pub use crate::scan_range::{ScanRange, ScanRangeParseError};
pub use crate::trace::{ChromatogramTrace, TracePoint};
pub use crate::window::{build_mass_windows, MassWindow};
