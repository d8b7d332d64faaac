//! Summaries of a run's metadata and spectra for the `info` command
use std::collections::BTreeMap;
use std::fmt::Display;

use mzdata::params::ParamDescribed;
use mzdata::prelude::*;
use serde::{Deserialize, Serialize};

use crate::types::SpectrumType;

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceFileSummary {
    pub id: String,
    pub name: String,
    pub location: String,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentSummary {
    pub id: u32,
    pub components: Vec<String>,
    pub params: Vec<(String, String)>,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleSummary {
    pub id: String,
    pub name: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoftwareSummary {
    pub id: String,
    pub version: String,
}

/// The first or last spectrum seen in a run
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpectrumMark {
    pub index: usize,
    pub id: String,
    pub time: f64,
}

impl SpectrumMark {
    fn from_spectrum(spectrum: &SpectrumType) -> Self {
        Self {
            index: spectrum.index(),
            id: spectrum.id().to_string(),
            time: spectrum.start_time(),
        }
    }
}

/// What `info` reports about a run
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub source_files: Vec<SourceFileSummary>,
    pub instruments: Vec<InstrumentSummary>,
    pub software: Vec<SoftwareSummary>,
    pub samples: Vec<SampleSummary>,
    pub run_id: Option<String>,
    pub start_timestamp: Option<String>,
    pub spectrum_count: usize,
    pub spectra_per_ms_level: BTreeMap<u8, usize>,
    pub first_spectrum: Option<SpectrumMark>,
    pub last_spectrum: Option<SpectrumMark>,
    /// The lowest and highest m/z observed in any spectrum
    pub mass_range: Option<(f64, f64)>,
}

/// The smallest and largest m/z of a spectrum's centroids, or of its raw
/// arrays when it has no centroids.
fn mz_bounds(spectrum: &SpectrumType) -> Option<(f64, f64)> {
    let fold = |acc: Option<(f64, f64)>, mz: f64| match acc {
        Some((low, high)) => Some((low.min(mz), high.max(mz))),
        None => Some((mz, mz)),
    };
    if let Some(peaks) = spectrum.peaks.as_ref() {
        peaks.iter().map(|p| p.mz).fold(None, fold)
    } else {
        let arrays = spectrum.arrays.as_ref()?;
        let mzs = arrays.mzs().ok()?;
        let bounds = mzs.iter().copied().fold(None, fold);
        bounds
    }
}

impl RunSummary {
    /// Read the file level metadata of `reader`, then consume it to count
    /// its spectra.
    pub fn from_reader<R: Iterator<Item = SpectrumType> + MSDataFileMetadata>(reader: R) -> Self {
        let mut summary = Self::from_metadata(&reader);
        for spectrum in reader {
            summary.observe(&spectrum);
        }
        summary
    }

    pub fn from_metadata<R: MSDataFileMetadata>(reader: &R) -> Self {
        let source_files = reader
            .file_description()
            .source_files
            .iter()
            .map(|sf| SourceFileSummary {
                id: sf.id.clone(),
                name: sf.name.clone(),
                location: sf.location.clone(),
            })
            .collect();

        let mut instruments: Vec<InstrumentSummary> = reader
            .instrument_configurations()
            .values()
            .map(|config| InstrumentSummary {
                id: config.id,
                components: config
                    .components
                    .iter()
                    .map(|c| format!("{:?}", c.component_type))
                    .collect(),
                params: config
                    .params()
                    .iter()
                    .map(|p| (p.name.clone(), p.value.to_string()))
                    .collect(),
            })
            .collect();
        instruments.sort_by_key(|i| i.id);

        let software = reader
            .softwares()
            .iter()
            .map(|sw| SoftwareSummary {
                id: sw.id.clone(),
                version: sw.version.clone(),
            })
            .collect();

        let samples = reader
            .samples()
            .iter()
            .map(|sample| SampleSummary {
                id: sample.id.clone(),
                name: sample.name.clone(),
            })
            .collect();

        let (run_id, start_timestamp) = match reader.run_description() {
            Some(run) => (run.id.clone(), run.start_time.map(|t| t.to_rfc3339())),
            None => (None, None),
        };

        Self {
            source_files,
            instruments,
            software,
            samples,
            run_id,
            start_timestamp,
            ..Default::default()
        }
    }

    pub fn observe(&mut self, spectrum: &SpectrumType) {
        self.spectrum_count += 1;
        *self
            .spectra_per_ms_level
            .entry(spectrum.ms_level())
            .or_default() += 1;
        if let Some((low, high)) = mz_bounds(spectrum) {
            self.mass_range = Some(match self.mass_range {
                Some((lo, hi)) => (lo.min(low), hi.max(high)),
                None => (low, high),
            });
        }
        let mark = SpectrumMark::from_spectrum(spectrum);
        if self.first_spectrum.is_none() {
            self.first_spectrum = Some(mark.clone());
        }
        self.last_spectrum = Some(mark);
    }

    pub fn time_range(&self) -> Option<(f64, f64)> {
        match (&self.first_spectrum, &self.last_spectrum) {
            (Some(first), Some(last)) => Some((first.time, last.time)),
            _ => None,
        }
    }
}

impl Display for RunSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "General File Information:")?;
        for sf in self.source_files.iter() {
            writeln!(f, "  Source file: {} ({}) [{}]", sf.name, sf.location, sf.id)?;
        }
        if let Some(run_id) = self.run_id.as_ref() {
            writeln!(f, "  Run: {run_id}")?;
        }
        if let Some(ts) = self.start_timestamp.as_ref() {
            writeln!(f, "  Acquisition started: {ts}")?;
        }
        for sw in self.software.iter() {
            writeln!(f, "  Software: {} {}", sw.id, sw.version)?;
        }
        if !self.samples.is_empty() {
            writeln!(f, "Sample Information:")?;
            for sample in self.samples.iter() {
                match sample.name.as_ref() {
                    Some(name) => writeln!(f, "  Sample: {} ({name})", sample.id)?,
                    None => writeln!(f, "  Sample: {}", sample.id)?,
                }
            }
        }
        for inst in self.instruments.iter() {
            writeln!(f, "Instrument configuration {}:", inst.id)?;
            for component in inst.components.iter() {
                writeln!(f, "  Component: {component}")?;
            }
            for (name, value) in inst.params.iter() {
                if value.is_empty() {
                    writeln!(f, "  {name}")?;
                } else {
                    writeln!(f, "  {name}: {value}")?;
                }
            }
        }
        writeln!(f, "Number of spectra: {}", self.spectrum_count)?;
        for (level, count) in self.spectra_per_ms_level.iter() {
            writeln!(f, "  MS{level}: {count}")?;
        }
        if let (Some(first), Some(last)) = (&self.first_spectrum, &self.last_spectrum) {
            writeln!(f, "Scan range: {} - {}", first.index, last.index)?;
            writeln!(f, "Time range: {:.4} - {:.4}", first.time, last.time)?;
        }
        if let Some((low, high)) = self.mass_range {
            writeln!(f, "Mass range: [{low:.4}, {high:.4}]")?;
        }
        Ok(())
    }
}
