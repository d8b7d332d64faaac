use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::time::Instant;

use flate2::write::GzEncoder;
use flate2::Compression;

use tempfile::NamedTempFile;
use thiserror::Error;

use tracing::{debug, info};

#[cfg(feature = "mzmlb")]
use mzdata::io::mzmlb::MzMLbReaderType;
#[cfg(feature = "thermo")]
use mzdata::io::thermo::ThermoRawReaderType;
use mzdata::io::{
    infer_format, infer_from_stream, mgf::MGFReaderType, mzml::MzMLReaderType,
    MassSpectrometryFormat, PreBufferedStream, RestartableGzDecoder, StreamingSpectrumIterator,
};
use mzdata::prelude::*;

use mzxic::{read_mass_list_path, records_to_json, run_xic, ScanRange, XicError, XicRecord, XicRequest};

use crate::args::{Command, InfoArgs, XicArgs, MZXicer};
use crate::info::RunSummary;
use crate::provider::MzDataScanProvider;
use crate::types::{SpectrumType, STDIN_BUFFER_SIZE};

#[derive(Debug, Error)]
pub enum MZXicerError {
    #[error("An IO error occurred: {0}")]
    IOError(
        #[source]
        #[from]
        io::Error,
    ),
    #[error("The input file format for {0} was either unknown or not supported ({1:?})")]
    FormatUnknownOrNotSupportedError(String, MassSpectrometryFormat),
    #[error("The input file format from STDIN was either unknown or not supported ({0:?})")]
    FormatUnknownOrNotSupportedErrorStdIn(MassSpectrometryFormat),
    #[error("The scan range {0} starts after it ends")]
    InvertedScanRange(ScanRange),
    #[error("MS level must be at least 1, got {0}")]
    InvalidMSLevel(u8),
    #[error("The ppm tolerance must be a non-negative number, got {0}")]
    InvalidPPM(f64),
    #[error(transparent)]
    XicError(#[from] XicError),
    #[error("Failed to load configuration: {0}")]
    ConfigurationError(#[from] figment::Error),
    #[error("Failed to serialize the run summary: {0}")]
    SerializationError(#[from] serde_json::Error),
}

pub fn version_string() -> &'static str {
    option_env!("CARGO_PKG_VERSION").unwrap_or("unknown")
}

/// Something done with an opened spectrum stream, whatever its format
pub trait ReaderTask {
    type Output;

    fn run<R: Iterator<Item = SpectrumType> + MSDataFileMetadata>(
        &self,
        reader: R,
    ) -> Result<Self::Output, MZXicerError>;
}

/// Open `input_file`, or STDIN for '-', with a reader for its detected format
/// and hand it to `task`.
pub fn reader_then<T: ReaderTask>(input_file: &str, task: &T) -> Result<T::Output, MZXicerError> {
    if input_file == "-" {
        let mut buffered = PreBufferedStream::new_with_buffer_size(io::stdin(), STDIN_BUFFER_SIZE)?;
        let (ms_format, compressed) = infer_from_stream(&mut buffered)?;
        debug!("Detected {ms_format:?} from STDIN (compressed? {compressed})");
        match ms_format {
            MassSpectrometryFormat::MGF => {
                if compressed {
                    task.run(StreamingSpectrumIterator::new(MGFReaderType::new(
                        RestartableGzDecoder::new(io::BufReader::new(buffered)),
                    )))
                } else {
                    task.run(StreamingSpectrumIterator::new(MGFReaderType::new(buffered)))
                }
            }
            MassSpectrometryFormat::MzML => {
                if compressed {
                    task.run(StreamingSpectrumIterator::new(MzMLReaderType::new(
                        RestartableGzDecoder::new(io::BufReader::new(buffered)),
                    )))
                } else {
                    task.run(StreamingSpectrumIterator::new(MzMLReaderType::new(buffered)))
                }
            }
            _ => Err(MZXicerError::FormatUnknownOrNotSupportedErrorStdIn(ms_format)),
        }
    } else {
        let (ms_format, compressed) = infer_format(input_file)?;
        debug!("Detected {ms_format:?} from path (compressed? {compressed})");
        match ms_format {
            MassSpectrometryFormat::MGF => {
                if compressed {
                    let fh = RestartableGzDecoder::new(io::BufReader::new(fs::File::open(input_file)?));
                    task.run(StreamingSpectrumIterator::new(MGFReaderType::new(fh)))
                } else {
                    task.run(MGFReaderType::open_path(input_file)?)
                }
            }
            MassSpectrometryFormat::MzML => {
                if compressed {
                    let fh = RestartableGzDecoder::new(io::BufReader::new(fs::File::open(input_file)?));
                    task.run(StreamingSpectrumIterator::new(MzMLReaderType::new(fh)))
                } else {
                    task.run(MzMLReaderType::open_path(input_file)?)
                }
            }
            #[cfg(feature = "mzmlb")]
            MassSpectrometryFormat::MzMLb => task.run(MzMLbReaderType::open_path(input_file)?),
            #[cfg(feature = "thermo")]
            MassSpectrometryFormat::ThermoRaw => {
                task.run(ThermoRawReaderType::open_path(input_file)?)
            }
            _ => Err(MZXicerError::FormatUnknownOrNotSupportedError(
                input_file.to_string(),
                ms_format,
            )),
        }
    }
}

/// Write `buffer` to `path` in one go, to STDOUT for '-', gzip compressed
/// when the path ends in `.gz`.
///
/// Files are written to a temporary file next to `path` and moved into place
/// once complete, so a failed write never leaves a truncated output behind.
pub fn write_output(path: &Path, buffer: &[u8]) -> io::Result<()> {
    if path == Path::new("-") {
        let mut stdout = io::stdout().lock();
        stdout.write_all(buffer)?;
        return stdout.flush();
    }
    let compressed = path.extension().is_some_and(|ext| ext == "gz");
    let parent = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let staged = NamedTempFile::new_in(parent)?;
    {
        let mut handle = io::BufWriter::new(staged.as_file());
        if compressed {
            let mut encoder = GzEncoder::new(handle, Compression::best());
            encoder.write_all(buffer)?;
            encoder.finish()?.flush()?;
        } else {
            handle.write_all(buffer)?;
            handle.flush()?;
        }
    }
    staged.persist(path).map_err(|e| e.error)?;
    debug!("Wrote {} bytes to {}", buffer.len(), path.display());
    Ok(())
}

struct XicTask<'a> {
    request: &'a XicRequest,
}

impl ReaderTask for XicTask<'_> {
    type Output = Vec<XicRecord>;

    fn run<R: Iterator<Item = SpectrumType> + MSDataFileMetadata>(
        &self,
        reader: R,
    ) -> Result<Self::Output, MZXicerError> {
        let mut provider = MzDataScanProvider::new(reader);
        Ok(run_xic(&mut provider, self.request)?)
    }
}

impl XicArgs {
    pub fn main(&self) -> Result<(), MZXicerError> {
        info!("mzxicer v{}", version_string());
        info!("Input: {}", self.input_file);
        info!("Mass list: {}", self.mass_list.display());
        info!("Output: {}", self.output_file.display());

        self.validate()?;

        let masses = read_mass_list_path(&self.mass_list)?;
        let request = XicRequest::new(masses, self.ppm)
            .with_scan_range(self.scan_range())
            .with_settings(self.trace_settings());
        info!(
            "Extracting {} masses at {} ppm from MS{} scans {}",
            request.masses.len(),
            request.ppm,
            request.settings.ms_level,
            request.scan_range
        );

        let start = Instant::now();
        let records = reader_then(&self.input_file, &XicTask { request: &request })?;
        let buffer = records_to_json(&records)?;
        write_output(&self.output_file, &buffer)?;
        info!("Total Elapsed Time: {:0.3?}", start.elapsed());
        Ok(())
    }
}

struct InfoTask;

impl ReaderTask for InfoTask {
    type Output = RunSummary;

    fn run<R: Iterator<Item = SpectrumType> + MSDataFileMetadata>(
        &self,
        reader: R,
    ) -> Result<Self::Output, MZXicerError> {
        Ok(RunSummary::from_reader(reader))
    }
}

impl InfoArgs {
    pub fn main(&self) -> Result<(), MZXicerError> {
        debug!("Input: {}", self.input_file);
        let summary = reader_then(&self.input_file, &InfoTask)?;
        let mut stdout = io::stdout().lock();
        if self.json {
            serde_json::to_writer_pretty(&mut stdout, &summary)?;
            writeln!(stdout)?;
        } else {
            write!(stdout, "{summary}")?;
        }
        stdout.flush()?;
        Ok(())
    }
}

impl MZXicer {
    pub fn main(self) -> Result<(), MZXicerError> {
        match self.command {
            Command::Info(args) => args.main(),
            Command::Xic(args) => {
                let args = args.configure(self.config_file.as_deref())?;
                args.main()
            }
            Command::Version => {
                println!("version={}", version_string());
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod test {
    use std::io::Read;

    use flate2::read::GzDecoder;
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_write_output_replaces_destination() -> io::Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("out.json");
        fs::write(&path, b"stale content that is longer than the new one")?;
        write_output(&path, b"[]\n")?;
        assert_eq!(fs::read(&path)?, b"[]\n");
        assert_eq!(fs::read_dir(dir.path())?.count(), 1);
        Ok(())
    }

    #[test]
    fn test_write_output_compressed() -> io::Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("out.json.gz");
        write_output(&path, b"[]\n")?;
        let mut text = String::new();
        GzDecoder::new(fs::File::open(&path)?).read_to_string(&mut text)?;
        assert_eq!(text, "[]\n");
        Ok(())
    }

    #[test]
    fn test_write_output_failure_leaves_nothing() -> io::Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("missing").join("out.json");
        assert!(write_output(&path, b"[]\n").is_err());
        assert!(!path.exists());
        assert_eq!(fs::read_dir(dir.path())?.count(), 0);
        Ok(())
    }
}
