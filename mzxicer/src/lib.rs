mod args;
mod driver;
mod info;
mod provider;
mod types;

pub use args::*;
pub use driver::{reader_then, version_string, write_output, MZXicerError, ReaderTask};
pub use info::{
    InstrumentSummary, RunSummary, SampleSummary, SoftwareSummary, SourceFileSummary, SpectrumMark,
};
pub use provider::{MzDataProviderError, MzDataScanProvider};
pub use types::{CPeak, DPeak, SpectrumType};
